// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

use std::collections::BTreeSet;

use crate::constant::BACKGROUND;

/// An ordered set of live component labels
///
/// The registry always contains the background sentinel `0`. New labels are
/// minted as one greater than the current maximum, so iteration order is
/// the order in which surviving labels were created.
///
/// # Examples
///
/// ```
/// use cohull_core::cv::LabelRegistry;
///
/// let mut registry = LabelRegistry::new();
/// assert_eq!(registry.new_label(), 1);
/// assert_eq!(registry.new_label(), 2);
///
/// registry.remove_label(1);
/// assert_eq!(registry.labels(), vec![0, 2]);
///
/// registry.compact_labels();
/// assert_eq!(registry.labels(), vec![0, 1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRegistry {
    labels: BTreeSet<i32>,
}

impl Default for LabelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelRegistry {
    /// Initialize a registry holding only the background sentinel
    pub fn new() -> Self {
        LabelRegistry {
            labels: BTreeSet::from([BACKGROUND]),
        }
    }

    /// Reset the registry to only the background sentinel
    pub fn clear(&mut self) {
        self.labels.clear();
        self.labels.insert(BACKGROUND);
    }

    /// Mint a label one greater than the largest live label
    pub fn new_label(&mut self) -> i32 {
        let id = self.labels.last().copied().unwrap_or(BACKGROUND) + 1;
        self.labels.insert(id);
        id
    }

    /// Remove a label if present, the sentinel is never removed
    pub fn remove_label(&mut self, id: i32) {
        if id != BACKGROUND {
            self.labels.remove(&id);
        }
    }

    /// Check if a label is currently live
    pub fn contains(&self, id: i32) -> bool {
        self.labels.contains(&id)
    }

    /// Largest live label (0 when only the sentinel is present)
    pub fn max_label(&self) -> i32 {
        self.labels.last().copied().unwrap_or(BACKGROUND)
    }

    /// Live labels in ascending order including the sentinel
    pub fn labels(&self) -> Vec<i32> {
        self.labels.iter().copied().collect()
    }

    /// Iterate live labels in ascending order including the sentinel
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.labels.iter().copied()
    }

    /// Number of live labels including the sentinel
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// A registry is never empty, it always holds the sentinel
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of real components (live labels excluding the sentinel)
    pub fn component_count(&self) -> usize {
        self.labels.len() - 1
    }

    /// Renumber live labels to their positional index `0..k-1`
    pub fn compact_labels(&mut self) {
        let k = self.labels.len() as i32;
        self.labels = (0..k).collect();
    }
}
