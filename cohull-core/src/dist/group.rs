// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

use std::any::Any;
use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

use crate::constant::ROOT;
use crate::dist::PartitionTable;
use crate::error::CohullError;

type Payload = Box<dyn Any + Send>;

/// A fixed group of workers exchanging owned messages
///
/// Implementors provide point-to-point `send` and `recv`. The collective
/// operations are built on top of them and must be entered by every worker
/// of the group in the same order. Worker `ROOT` is the coordinator, and
/// collectives only exchange messages between it and each other worker.
pub trait Communicator {
    /// Rank of this worker within the group
    fn rank(&self) -> usize;

    /// Number of workers in the group
    fn size(&self) -> usize;

    /// Send a value to worker `dest`
    fn send<T: Send + 'static>(&self, dest: usize, value: T) -> Result<(), CohullError>;

    /// Receive the next value sent by worker `source`
    fn recv<T: Send + 'static>(&self, source: usize) -> Result<T, CohullError>;

    /// True if this worker is the coordinator
    fn is_root(&self) -> bool {
        self.rank() == ROOT
    }

    /// Share the coordinator's value with every worker
    fn broadcast<T: Clone + Send + 'static>(&self, value: Option<T>) -> Result<T, CohullError> {
        if !self.is_root() {
            return self.recv(ROOT);
        }

        let value = value.ok_or_else(|| {
            CohullError::GroupError("The coordinator must provide a value to broadcast".to_string())
        })?;

        for dest in (0..self.size()).filter(|&rank| rank != ROOT) {
            self.send(dest, value.clone())?;
        }

        Ok(value)
    }

    /// Split the coordinator's items into contiguous slices per `table`
    fn scatterv<T: Send + 'static>(
        &self,
        data: Option<Vec<T>>,
        table: &PartitionTable,
    ) -> Result<Vec<T>, CohullError> {
        check_table(self, table)?;

        if !self.is_root() {
            let local: Vec<T> = self.recv(ROOT)?;
            return check_count(local, table.count(self.rank()), self.rank());
        }

        let data = data.ok_or_else(|| {
            CohullError::GroupError("The coordinator must provide items to scatter".to_string())
        })?;

        if data.len() != table.total() {
            return Err(CohullError::PartitionError(format!(
                "Expected {} items to scatter but received {}",
                table.total(),
                data.len()
            )));
        }

        let mut items = data.into_iter();
        let mut local = Vec::new();
        let mut consumed = 0;

        for rank in 0..self.size() {
            let range = table.range(rank);
            if range.start != consumed {
                return Err(CohullError::PartitionError(format!(
                    "Offset of worker {} is not contiguous",
                    rank
                )));
            }

            let chunk: Vec<T> = items.by_ref().take(range.len()).collect();
            consumed = range.end;

            if rank == ROOT {
                local = chunk;
            } else {
                self.send(rank, chunk)?;
            }
        }

        Ok(local)
    }

    /// Collect every worker's items on the coordinator in rank order
    ///
    /// Returns `Some` on the coordinator and `None` on every other worker.
    fn gatherv<T: Send + 'static>(
        &self,
        local: Vec<T>,
        table: &PartitionTable,
    ) -> Result<Option<Vec<T>>, CohullError> {
        check_table(self, table)?;

        let local = check_count(local, table.count(self.rank()), self.rank())?;

        if !self.is_root() {
            self.send(ROOT, local)?;
            return Ok(None);
        }

        let mut local = Some(local);
        let mut gathered = Vec::with_capacity(table.total());

        for rank in 0..self.size() {
            if rank == ROOT {
                gathered.extend(local.take().unwrap_or_default());
            } else {
                let chunk: Vec<T> = self.recv(rank)?;
                gathered.extend(check_count(chunk, table.count(rank), rank)?);
            }
        }

        Ok(Some(gathered))
    }
}

fn check_table<C: Communicator + ?Sized>(comm: &C, table: &PartitionTable) -> Result<(), CohullError> {
    if table.workers() != comm.size() {
        return Err(CohullError::PartitionError(format!(
            "Partition has {} workers but the group has {}",
            table.workers(),
            comm.size()
        )));
    }
    Ok(())
}

fn check_count<T>(items: Vec<T>, expected: usize, rank: usize) -> Result<Vec<T>, CohullError> {
    if items.len() != expected {
        return Err(CohullError::PartitionError(format!(
            "Worker {} holds {} items but the partition assigns {}",
            rank,
            items.len(),
            expected
        )));
    }
    Ok(items)
}

/// One worker's handle on an in-process group
///
/// The coordinator holds a channel pair with every worker, and every other
/// worker holds a single pair with the coordinator. Messages from one source
/// are received in the order they were sent. Workers other than the
/// coordinator cannot message each other.
pub struct LocalComm {
    rank: usize,
    size: usize,
    senders: HashMap<usize, Sender<Payload>>,
    receivers: HashMap<usize, Receiver<Payload>>,
}

impl Communicator for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send<T: Send + 'static>(&self, dest: usize, value: T) -> Result<(), CohullError> {
        let sender = self.senders.get(&dest).ok_or_else(|| {
            CohullError::GroupError(format!(
                "Worker {} has no channel to worker {}",
                self.rank, dest
            ))
        })?;

        sender
            .send(Box::new(value))
            .map_err(|_| CohullError::GroupError(format!("Worker {} is no longer receiving", dest)))
    }

    fn recv<T: Send + 'static>(&self, source: usize) -> Result<T, CohullError> {
        let receiver = self.receivers.get(&source).ok_or_else(|| {
            CohullError::GroupError(format!(
                "Worker {} has no channel from worker {}",
                self.rank, source
            ))
        })?;

        let payload = receiver.recv().map_err(|_| {
            CohullError::GroupError(format!("Worker {} disconnected", source))
        })?;

        payload.downcast::<T>().map(|value| *value).map_err(|_| {
            CohullError::GroupError(format!("Unexpected message type from worker {}", source))
        })
    }
}

/// An in-process worker group with one thread per rank
///
/// # Examples
///
/// ```
/// use cohull_core::dist::{Communicator, LocalGroup};
///
/// let ranks = LocalGroup::run(3, |comm| {
///     let value = comm.broadcast(comm.is_root().then_some(42)).unwrap();
///     (comm.rank(), value)
/// })
/// .unwrap();
///
/// assert_eq!(ranks, [(0, 42), (1, 42), (2, 42)]);
/// ```
pub struct LocalGroup;

impl LocalGroup {
    /// Create connected handles for a group of `size` workers
    ///
    /// Only the coordinator is wired to every worker, so a group of `size`
    /// workers holds `2 * (size - 1)` channels.
    pub fn communicators(size: usize) -> Result<Vec<LocalComm>, CohullError> {
        if size == 0 {
            return Err(CohullError::GroupError(
                "A group requires at least one worker".to_string(),
            ));
        }

        let mut root = LocalComm {
            rank: ROOT,
            size,
            senders: HashMap::with_capacity(size - 1),
            receivers: HashMap::with_capacity(size - 1),
        };

        let mut workers: Vec<LocalComm> = Vec::with_capacity(size - 1);

        for rank in (0..size).filter(|&rank| rank != ROOT) {
            let (to_worker, from_root) = channel();
            let (to_root, from_worker) = channel();

            root.senders.insert(rank, to_worker);
            root.receivers.insert(rank, from_worker);

            workers.push(LocalComm {
                rank,
                size,
                senders: HashMap::from([(ROOT, to_root)]),
                receivers: HashMap::from([(ROOT, from_root)]),
            });
        }

        let mut comms = Vec::with_capacity(size);
        comms.push(root);
        comms.extend(workers);
        comms.sort_by_key(|comm| comm.rank);

        Ok(comms)
    }

    /// Run `f` on every worker of a new group and return results by rank
    ///
    /// A panicking worker drops its channels, so peers blocked on it observe
    /// a `GroupError` and the whole run reports the failure.
    pub fn run<F, R>(size: usize, f: F) -> Result<Vec<R>, CohullError>
    where
        F: Fn(LocalComm) -> R + Sync,
        R: Send,
    {
        let comms = Self::communicators(size)?;

        thread::scope(|scope| {
            let handles: Vec<_> = comms
                .into_iter()
                .map(|comm| {
                    let f = &f;
                    scope.spawn(move || f(comm))
                })
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(rank, handle)| {
                    handle
                        .join()
                        .map_err(|_| CohullError::GroupError(format!("Worker {} panicked", rank)))
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_single_worker_group() {
        let results = LocalGroup::run(1, |comm| {
            let table = PartitionTable::new(3, comm.size()).unwrap();
            let local = comm.scatterv(Some(vec![1, 2, 3]), &table).unwrap();
            comm.gatherv(local, &table).unwrap()
        })
        .unwrap();

        assert_eq!(results, vec![Some(vec![1, 2, 3])]);
    }

    #[test]
    fn test_scatter_follows_table() {
        let results = LocalGroup::run(3, |comm| {
            let table = PartitionTable::new(8, comm.size()).unwrap();
            let data = comm.is_root().then(|| (0..8).collect::<Vec<i32>>());
            comm.scatterv(data, &table).unwrap()
        })
        .unwrap();

        assert_eq!(results, vec![vec![0, 1, 2, 3], vec![4, 5], vec![6, 7]]);
    }

    #[test]
    fn test_gather_restores_order() {
        for size in 1..7 {
            let results = LocalGroup::run(size, |comm| {
                let table = PartitionTable::new(10, comm.size()).unwrap();
                let data = comm.is_root().then(|| (0..10).collect::<Vec<i32>>());
                let local = comm.scatterv(data, &table).unwrap();
                let doubled: Vec<i32> = local.into_iter().map(|v| v * 2).collect();
                comm.gatherv(doubled, &table).unwrap()
            })
            .unwrap();

            let expected: Vec<i32> = (0..10).map(|v| v * 2).collect();
            assert_eq!(results[0], Some(expected));
            assert!(results[1..].iter().all(|r| r.is_none()));
        }
    }

    #[test]
    fn test_empty_workers_participate() {
        let results = LocalGroup::run(4, |comm| {
            let table = comm
                .broadcast(comm.is_root().then(|| PartitionTable::new(0, 4).unwrap()))
                .unwrap();
            let local: Vec<u8> = comm.scatterv(comm.is_root().then(Vec::new), &table).unwrap();
            comm.gatherv(local, &table).unwrap()
        })
        .unwrap();

        assert_eq!(results[0], Some(vec![]));
    }

    #[test]
    fn test_mismatched_table() {
        let results = LocalGroup::run(2, |comm| {
            let table = PartitionTable::new(4, 3).unwrap();
            comm.scatterv(comm.is_root().then(|| vec![0; 4]), &table)
        })
        .unwrap();

        assert!(results.iter().all(|r| r.is_err()));
    }

    #[test]
    fn test_unexpected_type() {
        let results = LocalGroup::run(2, |comm| {
            if comm.is_root() {
                comm.send(1, 7u8).map(|_| 0)
            } else {
                comm.recv::<i64>(ROOT)
            }
        })
        .unwrap();

        assert!(results[1].is_err());
    }

    #[test]
    fn test_panicking_worker() {
        let results = LocalGroup::run(3, |comm| {
            if comm.rank() == 2 {
                panic!("worker failure");
            }
            let _ = comm.broadcast(comm.is_root().then_some(1u32));
        });

        assert!(matches!(results, Err(CohullError::GroupError(_))));
    }

    #[test]
    fn test_empty_group() {
        assert!(LocalGroup::communicators(0).is_err());
    }

    #[test]
    fn test_star_wiring() {
        let comms = LocalGroup::communicators(5).unwrap();
        assert_eq!(comms.iter().map(|c| c.rank()).collect::<Vec<_>>(), [0, 1, 2, 3, 4]);

        assert_eq!(comms[ROOT].senders.len(), 4);
        assert_eq!(comms[ROOT].receivers.len(), 4);
        for comm in &comms[1..] {
            assert_eq!(comm.senders.len(), 1);
            assert_eq!(comm.receivers.len(), 1);
        }

        assert!(matches!(comms[1].send(2, 0u8), Err(CohullError::GroupError(_))));
        assert!(matches!(comms[2].recv::<u8>(1), Err(CohullError::GroupError(_))));
        assert!(matches!(comms[ROOT].send(ROOT, 0u8), Err(CohullError::GroupError(_))));
    }

    #[test]
    fn test_large_group_setup() {
        let start = std::time::Instant::now();
        let comms = LocalGroup::communicators(4000).unwrap();
        let elapsed = start.elapsed();

        assert_eq!(comms.len(), 4000);
        let channels: usize = comms.iter().map(|c| c.senders.len()).sum();
        assert_eq!(channels, 2 * 3999);
        assert!(elapsed < std::time::Duration::from_secs(2), "setup took {:?}", elapsed);
    }

    #[test]
    fn test_large_group_collectives() {
        let results = LocalGroup::run(1000, |comm| {
            let table = comm
                .broadcast(comm.is_root().then(|| PartitionTable::new(10, 1000).unwrap()))
                .unwrap();
            let data = comm.is_root().then(|| (0..10).collect::<Vec<u32>>());
            let local = comm.scatterv(data, &table).unwrap();
            comm.gatherv(local, &table).unwrap()
        })
        .unwrap();

        assert_eq!(results[0], Some((0..10).collect::<Vec<u32>>()));
        assert!(results[1..].iter().all(|r| r.is_none()));
    }
}
