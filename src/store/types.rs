use serde::{Serialize, Deserialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of a single channel segment (link) in the drainage network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub u32);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LinkId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(LinkId)
    }
}

/// Propagation direction along the flow path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Leaves to root: each link sums everything draining into it.
    Upstream,
    /// Root to leaves: each link adds its value to what its downstream link carries.
    Downstream,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Upstream => f.write_str("up"),
            Direction::Downstream => f.write_str("down"),
        }
    }
}
