// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constant::SUPPORTED_HULL_FORMATS;
use crate::error::CohullError;

/// Flattened convex hulls for every component of a mask
///
/// Each hull is stored as `[x0, y0, x1, y1, ...]` in counter-clockwise
/// order. Hulls are ordered by component label.
///
/// # Examples
///
/// ```
/// use cohull_core::im::Hulls;
///
/// let hulls = Hulls::new(4, 4, vec![vec![0, 0], vec![1, 3, 3, 3, 2, 1]]).unwrap();
/// assert_eq!(hulls.len(), 2);
/// assert_eq!(hulls.vertex_counts(), [1, 3]);
///
/// let hulls = Hulls::new(4, 4, vec![vec![0, 0, 1]]);
/// assert!(hulls.is_err()); // Odd number of coordinates
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hulls {
    width: usize,
    height: usize,
    hulls: Vec<Vec<i32>>,
}

impl Hulls {
    /// Initialize a new hull container
    ///
    /// # Arguments
    ///
    /// * `width` - Width of the source mask
    /// * `height` - Height of the source mask
    /// * `hulls` - Flattened hulls in component order
    pub fn new(width: usize, height: usize, hulls: Vec<Vec<i32>>) -> Result<Self, CohullError> {
        if hulls.iter().any(|hull| hull.len() % 2 != 0) {
            return Err(CohullError::HullsReadError);
        }

        Ok(Hulls {
            width,
            height,
            hulls,
        })
    }

    /// Width of the source mask
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the source mask
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of hulls
    pub fn len(&self) -> usize {
        self.hulls.len()
    }

    /// Check if there are no hulls
    pub fn is_empty(&self) -> bool {
        self.hulls.is_empty()
    }

    /// Flattened hulls in component order
    pub fn as_slice(&self) -> &[Vec<i32>] {
        &self.hulls
    }

    /// Number of vertices of each hull
    pub fn vertex_counts(&self) -> Vec<usize> {
        self.hulls.iter().map(|hull| hull.len() / 2).collect()
    }
}

// >>> I/O METHODS

impl Hulls {
    /// Open hulls from a json file
    ///
    /// ```no_run
    /// use cohull_core::im::Hulls;
    /// let hulls = Hulls::open("hulls.json");
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Hulls, CohullError> {
        check_extension(path.as_ref(), CohullError::HullsReadError)?;

        let file = File::open(path).map_err(|_| CohullError::HullsReadError)?;
        let hulls: Hulls = serde_json::from_reader(BufReader::new(file))
            .map_err(|_| CohullError::HullsReadError)?;

        Hulls::new(hulls.width, hulls.height, hulls.hulls)
    }

    /// Save hulls to a json file
    ///
    /// ```no_run
    /// use cohull_core::im::Hulls;
    /// let hulls = Hulls::new(2, 2, vec![vec![0, 1]]).unwrap();
    /// hulls.save("hulls.json").unwrap();
    /// ```
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CohullError> {
        check_extension(path.as_ref(), CohullError::HullsWriteError)?;

        let file = File::create(path).map_err(|_| CohullError::HullsWriteError)?;
        serde_json::to_writer(BufWriter::new(file), self).map_err(|_| CohullError::HullsWriteError)
    }
}

// <<< I/O METHODS

fn check_extension(path: &Path, error: CohullError) -> Result<(), CohullError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());

    match extension {
        Some(ext) if SUPPORTED_HULL_FORMATS.contains(&ext.as_str()) => Ok(()),
        _ => Err(error),
    }
}
