// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

use std::sync::Mutex;

use crate::cv::{connected_components, graham_scan, linearize};
use crate::dist::{Communicator, LocalGroup, PartitionTable};
use crate::error::CohullError;
use crate::im::{PixelGrid, Point};

/// Compute one hull per component across a worker group
///
/// The coordinator supplies the ordered components and builds the partition
/// table. The table is broadcast, the components are scattered, every worker
/// hulls its own slice, and the hulls are gathered back in component order.
/// Every worker must call this function, including workers that end up with
/// no components.
pub fn distribute_hulls<C: Communicator>(
    comm: &C,
    components: Option<Vec<Vec<Point>>>,
) -> Result<Option<Vec<Vec<Point>>>, CohullError> {
    let table = if comm.is_root() {
        let total = components.as_ref().map_or(0, |c| c.len());
        Some(PartitionTable::new(total, comm.size())?)
    } else {
        None
    };

    let table = comm.broadcast(table)?;
    let local = comm.scatterv(components, &table)?;

    let hulls: Vec<Vec<Point>> = local.iter().map(|component| graham_scan(component)).collect();

    comm.gatherv(hulls, &table)
}

/// Label a grid on the coordinator and compute flattened hulls on the group
///
/// Only the coordinator passes a grid. Returns `Some` hulls on the
/// coordinator, each as `[x0, y0, x1, y1, ...]`, and `None` elsewhere.
///
/// # Examples
///
/// ```
/// use cohull_core::convex_hulls;
/// use cohull_core::dist::{Communicator, LocalGroup};
/// use cohull_core::im::PixelGrid;
///
/// let results = LocalGroup::run(2, |comm| {
///     let grid = comm
///         .is_root()
///         .then(|| PixelGrid::new(vec![1, 1, 0, 0, 1, 1, 0, 1], 4, 2).unwrap());
///     convex_hulls(&comm, grid).unwrap()
/// })
/// .unwrap();
///
/// assert_eq!(results[0], Some(vec![vec![0, 1, 1, 1, 1, 0, 0, 0], vec![3, 1]]));
/// assert_eq!(results[1], None);
/// ```
pub fn convex_hulls<C: Communicator>(
    comm: &C,
    grid: Option<PixelGrid>,
) -> Result<Option<Vec<Vec<i32>>>, CohullError> {
    let components = if comm.is_root() {
        let grid = grid.ok_or_else(|| {
            CohullError::GroupError("The coordinator must provide a pixel grid".to_string())
        })?;
        Some(connected_components(grid))
    } else {
        None
    };

    let hulls = distribute_hulls(comm, components)?;

    Ok(hulls.map(|hulls| hulls.iter().map(|hull| linearize(hull)).collect()))
}

/// Compute flattened hulls for a grid on a new in-process group
///
/// # Examples
///
/// ```
/// use cohull_core::dist::convex_hulls_local;
/// use cohull_core::im::PixelGrid;
///
/// let grid = PixelGrid::new(vec![1, 0, 0, 1], 2, 2).unwrap();
/// let hulls = convex_hulls_local(grid, 4).unwrap();
/// assert_eq!(hulls, [vec![1, 1, 0, 0]]);
/// ```
pub fn convex_hulls_local(grid: PixelGrid, workers: usize) -> Result<Vec<Vec<i32>>, CohullError> {
    let grid = Mutex::new(Some(grid));

    let results = LocalGroup::run(workers, |comm| {
        let grid = if comm.is_root() {
            grid.lock().ok().and_then(|mut grid| grid.take())
        } else {
            None
        };
        convex_hulls(&comm, grid)
    })?;

    let mut hulls = None;
    for result in results {
        if let Some(root_hulls) = result? {
            hulls = Some(root_hulls);
        }
    }

    hulls.ok_or_else(|| CohullError::GroupError("The coordinator returned no hulls".to_string()))
}

/// Label a grid and compute flattened hulls on the calling thread
///
/// # Examples
///
/// ```
/// use cohull_core::convex_hulls_sequential;
/// use cohull_core::im::PixelGrid;
///
/// let grid = PixelGrid::new(vec![0; 9], 3, 3).unwrap();
/// assert!(convex_hulls_sequential(grid).is_empty());
/// ```
pub fn convex_hulls_sequential(grid: PixelGrid) -> Vec<Vec<i32>> {
    connected_components(grid)
        .iter()
        .map(|component| linearize(&graham_scan(component)))
        .collect()
}
