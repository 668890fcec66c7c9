//! Plain value types shared by every layer: link identifiers and attribute maps.
pub mod attributes;
pub mod types;

pub use attributes::AttributeMap;
pub use types::{Direction, LinkId};
