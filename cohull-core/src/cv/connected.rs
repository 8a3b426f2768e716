// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

use crate::constant::BACKGROUND;
use crate::im::{PixelGrid, Point};

/// A provisional merge of two labels found during the raster scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Equivalence {
    pub replaceable: i32,
    pub replacement: i32,
}

/// A union-find structure for resolving label equivalences
///
/// Merges are directed: the set containing `from` is attached beneath the
/// root of the set containing `into`, so the surviving root is always the
/// replacement side of a merge.
pub struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    /// Initialize a new union-find object with `n` elements in `n` sets
    pub fn new(n: usize) -> Self {
        UnionFind {
            parent: (0..n).collect(),
        }
    }

    /// Find the root of the set containing `x`
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        // Path compression
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }

        root
    }

    /// Attach the set containing `from` beneath the root of `into`
    pub fn merge_into(&mut self, from: usize, into: usize) {
        let root_from = self.find(from);
        let root_into = self.find(into);

        if root_from != root_into {
            self.parent[root_from] = root_into;
        }
    }
}

/// Assign provisional labels in a single raster scan (1st pass)
///
/// The upper-left diagonal neighbour takes priority over the left and upper
/// neighbours. When left and up carry different labels the pixel takes the
/// upper label and a `left -> up` equivalence is recorded.
pub fn provisional_labels(grid: &mut PixelGrid) -> Vec<Equivalence> {
    let mut equivalences = Vec::new();

    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            if grid.get(x, y).is_background() {
                continue;
            }

            let diag = grid.get(x - 1, y - 1).value;
            let left = grid.get(x - 1, y).value;
            let up = grid.get(x, y - 1).value;

            let label = if diag != BACKGROUND {
                diag
            } else {
                match (left, up) {
                    (BACKGROUND, BACKGROUND) => grid.new_label(),
                    (BACKGROUND, up) => up,
                    (left, BACKGROUND) => left,
                    (left, up) => {
                        if left != up {
                            equivalences.push(Equivalence {
                                replaceable: left,
                                replacement: up,
                            });
                        }
                        up
                    }
                }
            };

            grid.set(x, y, label);
        }
    }

    equivalences
}

/// Resolve equivalences and prune merged labels from the registry (2nd pass)
///
/// Records are applied in descending order of their replaceable label.
pub fn resolve_equivalences(grid: &mut PixelGrid, mut equivalences: Vec<Equivalence>) -> UnionFind {
    let mut uf = UnionFind::new(grid.registry().max_label() as usize + 1);

    equivalences.sort_by(|a, b| b.replaceable.cmp(&a.replaceable));
    for eq in equivalences.iter() {
        uf.merge_into(eq.replaceable as usize, eq.replacement as usize);
    }

    let merged: Vec<i32> = grid
        .registry()
        .iter()
        .filter(|&label| uf.find(label as usize) != label as usize)
        .collect();

    for label in merged {
        grid.remove_label(label);
    }

    uf
}

/// Relabel every pixel to the dense index of its root label (3rd pass)
pub fn compact_labels(grid: &mut PixelGrid, uf: &mut UnionFind) {
    let mut position = vec![BACKGROUND; grid.registry().max_label() as usize + 1];
    for (idx, label) in grid.registry().iter().enumerate() {
        position[label as usize] = idx as i32;
    }

    for point in grid.points_mut() {
        if point.value != BACKGROUND {
            point.value = position[uf.find(point.value as usize)];
        }
    }

    grid.compact_labels();
}

/// Label connected foreground regions in place
///
/// Returns the number of components. After labeling, every foreground pixel
/// holds a label in `1..=count` and the registry holds `0..=count`.
///
/// # Examples
///
/// ```
/// use cohull_core::cv::label_components;
/// use cohull_core::im::PixelGrid;
///
/// let mut grid = PixelGrid::new(vec![9, 9, 0, 0, 0, 0, 0, 9, 9], 3, 3).unwrap();
/// let count = label_components(&mut grid);
///
/// assert_eq!(count, 2);
/// assert_eq!(grid.values(), [1, 1, 0, 0, 0, 0, 0, 2, 2]);
/// ```
pub fn label_components(grid: &mut PixelGrid) -> usize {
    grid.registry_mut().clear();

    let equivalences = provisional_labels(grid);
    let mut uf = resolve_equivalences(grid, equivalences);
    compact_labels(grid, &mut uf);

    grid.registry().component_count()
}

/// Collect the points of each component of a labeled grid
///
/// Component `i` holds every point labeled `i + 1` in raster order.
pub fn extract_components(grid: &PixelGrid) -> Vec<Vec<Point>> {
    let mut components: Vec<Vec<Point>> = vec![Vec::new(); grid.registry().component_count()];

    for point in grid.points() {
        if point.value > BACKGROUND {
            if let Some(component) = components.get_mut(point.value as usize - 1) {
                component.push(*point);
            }
        }
    }

    components
}

/// Label a grid and return the points of every component
///
/// # Examples
///
/// ```
/// use cohull_core::cv::connected_components;
/// use cohull_core::im::PixelGrid;
///
/// let grid = PixelGrid::new(vec![0; 16], 4, 4).unwrap();
/// assert!(connected_components(grid).is_empty());
/// ```
pub fn connected_components(mut grid: PixelGrid) -> Vec<Vec<Point>> {
    label_components(&mut grid);
    extract_components(&grid)
}

#[cfg(test)]
mod test {

    use super::*;

    /// Count components by walking the neighbour rule directly
    fn simulate(width: usize, height: usize, buffer: &[i32]) -> usize {
        let n = width * height;
        let foreground = |x: i64, y: i64| -> Option<usize> {
            if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
                return None;
            }
            let idx = y as usize * width + x as usize;
            (buffer[idx] != 0).then_some(idx)
        };

        let mut edges: Vec<Vec<usize>> = vec![Vec::new(); n];
        for y in 0..height as i64 {
            for x in 0..width as i64 {
                let Some(idx) = foreground(x, y) else {
                    continue;
                };

                let linked: Vec<usize> = match foreground(x - 1, y - 1) {
                    Some(diag) => vec![diag],
                    None => [foreground(x - 1, y), foreground(x, y - 1)]
                        .into_iter()
                        .flatten()
                        .collect(),
                };

                for other in linked {
                    edges[idx].push(other);
                    edges[other].push(idx);
                }
            }
        }

        let mut seen = vec![false; n];
        let mut count = 0;
        for start in 0..n {
            if buffer[start] == 0 || seen[start] {
                continue;
            }
            count += 1;
            let mut stack = vec![start];
            seen[start] = true;
            while let Some(node) = stack.pop() {
                for &next in &edges[node] {
                    if !seen[next] {
                        seen[next] = true;
                        stack.push(next);
                    }
                }
            }
        }

        count
    }

    fn random_mask(width: usize, height: usize, seed: u64, density: u64) -> Vec<i32> {
        let mut state = seed;
        (0..width * height)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                if (state >> 33) % 100 < density { 255 } else { 0 }
            })
            .collect()
    }

    #[test]
    fn test_all_background() {
        let mut grid = PixelGrid::new(vec![0; 12], 4, 3).unwrap();
        assert_eq!(label_components(&mut grid), 0);
        assert_eq!(grid.labels(), vec![0]);
        assert!(extract_components(&grid).is_empty());
    }

    #[test]
    fn test_single_pixels() {
        let buffer = vec![1, 0, 1, 0, 0, 0, 1, 0, 1];
        let mut grid = PixelGrid::new(buffer, 3, 3).unwrap();
        assert_eq!(label_components(&mut grid), 4);
        assert_eq!(grid.values(), vec![1, 0, 2, 0, 0, 0, 3, 0, 4]);
    }

    #[test]
    fn test_merge_through_left_and_up() {
        // A U-shape: the bottom row joins two separately started columns
        let buffer = vec![1, 0, 1, 1, 0, 1, 1, 1, 1];
        let mut grid = PixelGrid::new(buffer, 3, 3).unwrap();
        assert_eq!(label_components(&mut grid), 1);
        assert_eq!(grid.values(), vec![1, 0, 1, 1, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn test_merge_chain() {
        // Three columns started separately and joined along the bottom row
        #[rustfmt::skip]
        let buffer = vec![
            1, 0, 1, 0, 1,
            1, 0, 1, 0, 1,
            1, 1, 1, 1, 1,
        ];
        let mut grid = PixelGrid::new(buffer, 5, 3).unwrap();
        assert_eq!(label_components(&mut grid), 1);

        let mut labels = grid.values();
        labels.sort();
        labels.dedup();
        assert_eq!(labels, vec![0, 1]);
    }

    #[test]
    fn test_diagonal_neighbours() {
        // Only the upper-left diagonal is inspected, so an upper-right
        // diagonal touch starts a new component
        let mut grid = PixelGrid::new(vec![1, 0, 0, 1], 2, 2).unwrap();
        assert_eq!(label_components(&mut grid), 1);

        let mut grid = PixelGrid::new(vec![0, 1, 1, 0], 2, 2).unwrap();
        assert_eq!(label_components(&mut grid), 2);
        assert_eq!(grid.values(), vec![0, 1, 2, 0]);

        #[rustfmt::skip]
        let buffer = vec![
            0, 1, 0,
            1, 0, 1,
        ];
        let mut grid = PixelGrid::new(buffer.clone(), 3, 2).unwrap();
        assert_eq!(label_components(&mut grid), 2);
        assert_eq!(simulate(3, 2, &buffer), 2);
    }

    #[test]
    fn test_matches_simulation() {
        for seed in 0..40u64 {
            let (width, height) = (7 + (seed as usize % 5), 6 + (seed as usize % 4));
            let buffer = random_mask(width, height, seed, 30 + seed % 40);

            let mut grid = PixelGrid::new(buffer.clone(), width, height).unwrap();
            let count = label_components(&mut grid);

            assert_eq!(count, simulate(width, height, &buffer), "seed {}", seed);

            let mut labels = grid.values();
            labels.sort();
            labels.dedup();
            let expected: Vec<i32> = (0..=count as i32).collect();
            if buffer.contains(&0) {
                assert_eq!(labels, expected);
            }
            assert_eq!(grid.labels(), expected);
        }
    }

    #[test]
    fn test_extract_components() {
        #[rustfmt::skip]
        let buffer = vec![
            0, 3, 0, 0, 0,
            3, 3, 0, 0, 3,
            0, 0, 0, 3, 3,
        ];
        let components = connected_components(PixelGrid::new(buffer, 5, 3).unwrap());
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].len(), 3);
        assert_eq!(components[1].len(), 3);
        assert!(components[0].iter().all(|p| p.value == 1));
        assert!(components[1].iter().all(|p| p.value == 2));
        assert_eq!(components[1][0], Point::new(4, 1, 2));
    }

    #[test]
    fn test_union_find() {
        let mut uf = UnionFind::new(5);
        uf.merge_into(4, 2);
        uf.merge_into(2, 1);
        assert_eq!(uf.find(4), uf.find(1));
        assert_eq!(uf.find(4), 1);
        assert_ne!(uf.find(0), uf.find(3));
        assert_eq!(uf.find(2), 1);
    }
}
