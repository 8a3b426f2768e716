// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

use std::ops::Range;

use crate::constant::ROOT;
use crate::error::CohullError;

/// Contiguous per-worker slices of an ordered list of components
///
/// Every worker receives `total / workers` items and the remainder is
/// assigned entirely to the coordinating worker.
///
/// # Examples
///
/// ```
/// use cohull_core::dist::PartitionTable;
///
/// let table = PartitionTable::new(11, 4).unwrap();
/// assert_eq!(table.counts(), [5, 2, 2, 2]);
/// assert_eq!(table.offsets(), [0, 5, 7, 9]);
/// assert_eq!(table.range(2), 7..9);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTable {
    counts: Vec<usize>,
    offsets: Vec<usize>,
}

impl PartitionTable {
    /// Partition `total` items across `workers` workers
    pub fn new(total: usize, workers: usize) -> Result<Self, CohullError> {
        if workers == 0 {
            return Err(CohullError::PartitionError(
                "At least one worker is required".to_string(),
            ));
        }

        let mut counts = vec![total / workers; workers];
        counts[ROOT] += total % workers;

        let mut offsets = vec![0; workers];
        for i in 1..workers {
            offsets[i] = offsets[i - 1] + counts[i - 1];
        }

        Ok(PartitionTable { counts, offsets })
    }

    /// Number of items per worker
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Offset of the first item of each worker
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Number of items assigned to `rank`
    pub fn count(&self, rank: usize) -> usize {
        self.counts.get(rank).copied().unwrap_or(0)
    }

    /// Index range of the items assigned to `rank`
    pub fn range(&self, rank: usize) -> Range<usize> {
        let start = self.offsets.get(rank).copied().unwrap_or(self.total());
        start..start + self.count(rank)
    }

    /// Number of workers in the partition
    pub fn workers(&self) -> usize {
        self.counts.len()
    }

    /// Total number of items across all workers
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_even_split() {
        let table = PartitionTable::new(9, 3).unwrap();
        assert_eq!(table.counts(), [3, 3, 3]);
        assert_eq!(table.offsets(), [0, 3, 6]);
        assert_eq!(table.total(), 9);
    }

    #[test]
    fn test_remainder_goes_to_root() {
        let table = PartitionTable::new(7, 3).unwrap();
        assert_eq!(table.counts(), [3, 2, 2]);
        assert_eq!(table.offsets(), [0, 3, 5]);
    }

    #[test]
    fn test_more_workers_than_items() {
        let table = PartitionTable::new(3, 5).unwrap();
        assert_eq!(table.counts(), [3, 0, 0, 0, 0]);
        assert_eq!(table.offsets(), [0, 3, 3, 3, 3]);
        assert_eq!(table.range(4), 3..3);
    }

    #[test]
    fn test_no_items() {
        let table = PartitionTable::new(0, 4).unwrap();
        assert_eq!(table.counts(), [0, 0, 0, 0]);
        assert_eq!(table.total(), 0);
    }

    #[test]
    fn test_ranges_cover_items() {
        for total in 0..20 {
            for workers in 1..8 {
                let table = PartitionTable::new(total, workers).unwrap();
                let covered: Vec<usize> = (0..workers).flat_map(|r| table.range(r)).collect();
                assert_eq!(covered, (0..total).collect::<Vec<usize>>());
            }
        }
    }

    #[test]
    fn test_zero_workers() {
        assert!(PartitionTable::new(4, 0).is_err());
    }
}
