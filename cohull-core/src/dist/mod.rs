mod distribute;
mod group;
mod partition;

pub use distribute::{convex_hulls, convex_hulls_local, convex_hulls_sequential, distribute_hulls};
pub use group::{Communicator, LocalComm, LocalGroup};
pub use partition::PartitionTable;
