//! Leaves-to-root accumulation (e.g. drainage area, discharge, load).

use super::cumulative::{CumulativeMap, PropagationError};
use super::{log_summary, require_outlet};
use crate::graph::{traversal, Topology};
use crate::store::{AttributeMap, LinkId};
use tracing::{debug, info, warn};

/// Accumulates the attribute from the headwaters toward the outlet.
///
/// `cumulative[n] = attributes[n] + sum(cumulative[c])` over the contributors
/// of `n`; a headwater carries only its own value.
///
/// Strict: every visited link must have an attribute and a record, otherwise
/// the whole call fails and nothing is returned.
pub fn accumulate_upstream(
    outlet: LinkId,
    topology: &Topology,
    attributes: &AttributeMap,
) -> Result<CumulativeMap, PropagationError> {
    let outlet_value = require_outlet(outlet, topology, attributes)?;
    info!(
        outlet = %outlet,
        value = outlet_value,
        "Accumulating upstream into {} <- {:?}",
        outlet,
        topology.upstream_of(outlet).unwrap_or_default()
    );

    let mut cumulative = CumulativeMap::with_capacity(topology.len());

    let stats = traversal::post_order::<PropagationError, _>(topology, outlet, |step| {
        let own = attributes
            .get(step.link)
            .ok_or(PropagationError::MissingAttribute { link: step.link })?;
        if !step.declared {
            return Err(PropagationError::UndeclaredLink { link: step.link });
        }

        // Post-order guarantees every contributor is done, unless the input loops.
        let mut total = own;
        for &contributor in topology.upstream_of(step.link).unwrap_or_default() {
            total += cumulative
                .get(contributor)
                .ok_or(PropagationError::CycleDetected { link: contributor })?;
        }
        cumulative.insert(step.link, total);
        Ok(())
    })?;

    if stats.revisits > 0 {
        warn!(revisits = stats.revisits, "Links shared by several downstream links were counted more than once");
    }
    debug!(?stats, "Upstream pass finished");
    log_summary(&cumulative);
    Ok(cumulative)
}
