//! cumulative.rs
//! Output of a propagation pass, kept in visitation order.

use crate::store::LinkId;
use std::collections::HashMap;

pub use self::error::{MissingFrom, PropagationError};
mod error {
    use super::*;
    use std::fmt;
    use thiserror::Error;

    /// Which input lacked the requested outlet.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MissingFrom {
        Attributes,
        Topology,
    }

    impl fmt::Display for MissingFrom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                MissingFrom::Attributes => f.write_str("attributes"),
                MissingFrom::Topology => f.write_str("topology"),
            }
        }
    }

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum PropagationError {
        #[error("Outlet link id {link} not found in {map}")]
        OutletNotFound { link: LinkId, map: MissingFrom },
        #[error("Link {link} has no attribute value; cannot accumulate upstream")]
        MissingAttribute { link: LinkId },
        #[error("Link {link} is not described in the topology; cannot accumulate upstream")]
        UndeclaredLink { link: LinkId },
        #[error("Cycle detected: contributor {link} was not complete when its downstream link was")]
        CycleDetected { link: LinkId },
    }
}

/// Aggregated value per link, in the order the propagation pass produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CumulativeMap {
    entries: Vec<(LinkId, f64)>,
    index: HashMap<LinkId, usize>,
}

impl CumulativeMap {
    pub fn new() -> Self { Self::default() }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity), index: HashMap::with_capacity(capacity) }
    }

    /// Records the value of `link`. A second insert overwrites in place.
    pub(crate) fn insert(&mut self, link: LinkId, value: f64) {
        match self.index.get(&link) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(link, self.entries.len());
                self.entries.push((link, value));
            }
        }
    }

    #[inline(always)]
    pub fn get(&self, link: LinkId) -> Option<f64> {
        self.index.get(&link).map(|&pos| self.entries[pos].1)
    }

    pub fn contains(&self, link: LinkId) -> bool { self.index.contains_key(&link) }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Entries in visitation order.
    pub fn iter(&self) -> impl Iterator<Item = (LinkId, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// The largest value and its link (first one wins on ties).
    pub fn max_entry(&self) -> Option<(LinkId, f64)> {
        self.entries.iter().copied().fold(None, |best, (link, value)| match best {
            Some((_, b)) if b >= value => best,
            _ => Some((link, value)),
        })
    }
}
