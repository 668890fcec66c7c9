//! Directional attribute propagation over the drainage tree.
pub mod cumulative;
pub mod downstream;
pub mod upstream;

pub use cumulative::{CumulativeMap, MissingFrom, PropagationError};
pub use downstream::accumulate_downstream;
pub use upstream::accumulate_upstream;

use crate::graph::Topology;
use crate::store::{AttributeMap, Direction, LinkId};
use tracing::info;

/// Runs the propagation pass selected by `direction`.
pub fn accumulate(
    direction: Direction,
    outlet: LinkId,
    topology: &Topology,
    attributes: &AttributeMap,
) -> Result<CumulativeMap, PropagationError> {
    match direction {
        Direction::Upstream => accumulate_upstream(outlet, topology, attributes),
        Direction::Downstream => accumulate_downstream(outlet, topology, attributes),
    }
}

/// The outlet must be known to both inputs. Attributes are checked first.
pub(crate) fn require_outlet(
    outlet: LinkId,
    topology: &Topology,
    attributes: &AttributeMap,
) -> Result<f64, PropagationError> {
    let value = attributes
        .get(outlet)
        .ok_or(PropagationError::OutletNotFound { link: outlet, map: MissingFrom::Attributes })?;
    if !topology.contains(outlet) {
        return Err(PropagationError::OutletNotFound { link: outlet, map: MissingFrom::Topology });
    }
    Ok(value)
}

pub(crate) fn log_summary(cumulative: &CumulativeMap) {
    info!(links = cumulative.len(), "Defined cumulative values for {} links", cumulative.len());
    if let Some((link, value)) = cumulative.max_entry() {
        info!(link = %link, value, "Maximum cumulative value is {} (link {})", value, link);
    }
}
