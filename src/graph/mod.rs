//! Drainage-network topology and the traversal primitive shared by validation and propagation.
pub mod storage;
pub mod topology;
pub mod traversal;

// Re-export key types for convenient access
pub use topology::{Topology, TopologyError, TopologyOptions, TopologyRecord};
pub use traversal::{Descend, Step, WalkStats, Walker};
