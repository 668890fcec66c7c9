//! Core of a drainage-network toolkit.
//!
//! A drainage network is a rooted tree of links: every link drains into at
//! most one downstream link, and the outlet drains into nothing. This crate
//! holds that tree in memory (`graph`), audits its structure (`validation`),
//! and propagates per-link attributes along flow paths (`propagation`).
//! File formats live in `io`; the command-line tools in `cli` and `src/bin`.

pub mod cli;
pub mod graph;
pub mod io;
pub mod propagation;
pub mod store;
pub mod validation;

pub use graph::{Topology, TopologyOptions, TopologyRecord};
pub use propagation::{accumulate, accumulate_downstream, accumulate_upstream, CumulativeMap, PropagationError};
pub use store::{AttributeMap, Direction, LinkId};
pub use validation::{CheckSelection, TopologyValidator, ValidationReport};
