// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

use std::fmt;

use crate::constant::BACKGROUND;
use crate::cv::LabelRegistry;
use crate::error::CohullError;

/// A pixel location carrying either a raw intensity or a component label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    pub value: i32,
}

impl Point {
    pub fn new(x: i32, y: i32, value: i32) -> Self {
        Point { x, y, value }
    }

    /// True if the point is background (value of zero)
    pub fn is_background(&self) -> bool {
        self.value == BACKGROUND
    }
}

/// A row-major grid of labeled points with a registry of live labels
///
/// The grid owns every point for the duration of labeling. The length of
/// the input buffer must be equal to the product of `width` * `height`.
///
/// # Examples
///
/// ```
/// use cohull_core::im::PixelGrid;
///
/// let grid = PixelGrid::new(vec![0, 1, 1, 0, 0, 1], 3, 2).unwrap();
/// assert_eq!(grid.get(1, 0).value, 1);
/// assert_eq!(grid.get(0, 1).value, 0);
///
/// let grid = PixelGrid::new(vec![0, 1, 1], 3, 2);
/// assert!(grid.is_err()); // Buffer size does not match dimensions
/// ```
#[derive(Debug, Clone)]
pub struct PixelGrid {
    w: usize,
    h: usize,
    points: Vec<Point>,
    registry: LabelRegistry,
}

impl PixelGrid {
    /// Initializes a grid from a row-major pixel buffer
    ///
    /// # Arguments
    ///
    /// * `data` - Pixel values where 0 is background
    /// * `width` - Grid width
    /// * `height` - Grid height
    pub fn new(data: Vec<i32>, width: usize, height: usize) -> Result<PixelGrid, CohullError> {
        if width.checked_mul(height) != Some(data.len()) {
            return Err(CohullError::BufferSizeError);
        }

        let points = data
            .into_iter()
            .enumerate()
            .map(|(i, value)| Point::new((i % width) as i32, (i / width) as i32, value))
            .collect();

        Ok(PixelGrid {
            w: width,
            h: height,
            points,
            registry: LabelRegistry::new(),
        })
    }

    /// Initializes a grid from signed dimensions as supplied by a caller
    ///
    /// Negative dimensions are rejected before any other work is done.
    ///
    /// # Examples
    ///
    /// ```
    /// use cohull_core::im::PixelGrid;
    ///
    /// assert!(PixelGrid::from_signed(vec![], -1, 0).is_err());
    /// assert!(PixelGrid::from_signed(vec![], 0, 0).is_ok());
    /// ```
    pub fn from_signed(data: Vec<i32>, width: i64, height: i64) -> Result<PixelGrid, CohullError> {
        if !valid_dimensions(width, height) {
            return Err(CohullError::DimensionError);
        }

        Self::new(data, width as usize, height as usize)
    }
}

/// Check that caller-supplied dimensions are non-negative
pub fn valid_dimensions(width: i64, height: i64) -> bool {
    width >= 0 && height >= 0
}

// >>> PROPERTY METHODS

impl PixelGrid {
    /// Width of the grid
    pub fn width(&self) -> usize {
        self.w
    }

    /// Height of the grid
    pub fn height(&self) -> usize {
        self.h
    }

    /// Number of points in the grid
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if grid has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points in row-major order
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// All point values in row-major order
    pub fn values(&self) -> Vec<i32> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Live labels including the background sentinel
    pub fn labels(&self) -> Vec<i32> {
        self.registry.labels()
    }

    /// Read-only access to the label registry
    pub fn registry(&self) -> &LabelRegistry {
        &self.registry
    }

    /// Mutable access to the label registry
    pub fn registry_mut(&mut self) -> &mut LabelRegistry {
        &mut self.registry
    }
}

// <<< PROPERTY METHODS

// >>> ACCESS METHODS

impl PixelGrid {
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            Some(y as usize * self.w + x as usize)
        } else {
            None
        }
    }

    /// Get the point at `(x, y)`
    ///
    /// Coordinates outside of `[0, width) x [0, height)` yield a synthetic
    /// background point at the requested location.
    ///
    /// # Examples
    ///
    /// ```
    /// use cohull_core::im::{PixelGrid, Point};
    ///
    /// let grid = PixelGrid::new(vec![5; 4], 2, 2).unwrap();
    /// assert_eq!(grid.get(-1, 0), Point::new(-1, 0, 0));
    /// assert_eq!(grid.get(2, 0), Point::new(2, 0, 0));
    /// assert_eq!(grid.get(1, 1), Point::new(1, 1, 5));
    /// ```
    pub fn get(&self, x: i32, y: i32) -> Point {
        match self.index(x, y) {
            Some(idx) => self.points[idx],
            None => Point::new(x, y, BACKGROUND),
        }
    }

    /// Set the value at `(x, y)`
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside of the grid.
    pub fn set(&mut self, x: i32, y: i32, value: i32) {
        let idx = self
            .index(x, y)
            .unwrap_or_else(|| panic!("({}, {}) is outside of the grid", x, y));
        self.points[idx].value = value;
    }

    /// Mutable iterator over all points in row-major order
    pub(crate) fn points_mut(&mut self) -> std::slice::IterMut<'_, Point> {
        self.points.iter_mut()
    }

    /// Consume the grid returning its points in row-major order
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

// <<< ACCESS METHODS

// >>> LABEL METHODS

impl PixelGrid {
    /// Mint a new label one greater than the largest live label
    pub fn new_label(&mut self) -> i32 {
        self.registry.new_label()
    }

    /// Remove a label from the registry if present
    pub fn remove_label(&mut self, id: i32) {
        self.registry.remove_label(id);
    }

    /// Renumber live labels to `0..k-1`
    pub fn compact_labels(&mut self) {
        self.registry.compact_labels();
    }
}

// <<< LABEL METHODS

impl fmt::Display for PixelGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.points.chunks(self.w.max(1)) {
            let line: Vec<String> = row.iter().map(|p| p.value.to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_row_major_coordinates() {
        let grid = PixelGrid::new((0..6).collect(), 3, 2).unwrap();
        for (i, point) in grid.points().iter().enumerate() {
            assert_eq!(point.x, (i % 3) as i32);
            assert_eq!(point.y, (i / 3) as i32);
            assert_eq!(point.value, i as i32);
        }
    }

    #[test]
    fn test_boundary_lookup_is_strict() {
        let grid = PixelGrid::new(vec![1; 9], 3, 3).unwrap();

        // One past the end on either axis is background, not a wrapped read
        assert_eq!(grid.get(3, 0).value, 0);
        assert_eq!(grid.get(0, 3).value, 0);
        assert_eq!(grid.get(3, 3).value, 0);
        assert_eq!(grid.get(2, 2).value, 1);
        assert_eq!(grid.get(-1, -1).value, 0);
    }

    #[test]
    fn test_set_in_place() {
        let mut grid = PixelGrid::new(vec![0; 4], 2, 2).unwrap();
        grid.set(1, 0, 7);
        assert_eq!(grid.values(), vec![0, 7, 0, 0]);
    }

    #[test]
    #[should_panic]
    fn test_set_out_of_range() {
        let mut grid = PixelGrid::new(vec![0; 4], 2, 2).unwrap();
        grid.set(2, 0, 1);
    }

    #[test]
    fn test_dimension_validation() {
        assert!(valid_dimensions(0, 0));
        assert!(!valid_dimensions(-1, 3));
        assert!(!valid_dimensions(3, -1));
        assert_eq!(
            PixelGrid::from_signed(vec![1], 1, -1).unwrap_err(),
            CohullError::DimensionError
        );
    }

    #[test]
    fn test_label_operations() {
        let mut grid = PixelGrid::new(vec![0; 4], 2, 2).unwrap();
        assert_eq!(grid.new_label(), 1);
        assert_eq!(grid.new_label(), 2);
        grid.remove_label(1);
        grid.remove_label(1);
        assert_eq!(grid.labels(), vec![0, 2]);
        grid.compact_labels();
        assert_eq!(grid.labels(), vec![0, 1]);
    }

    #[test]
    fn test_display() {
        let grid = PixelGrid::new(vec![0, 1, 2, 3], 2, 2).unwrap();
        assert_eq!(grid.to_string(), "0 1\n2 3\n");
    }
}
