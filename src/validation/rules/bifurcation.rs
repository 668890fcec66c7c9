//! Rule: a link drains into at most one downstream link.

use crate::graph::Topology;
use crate::store::LinkId;
use crate::validation::error::ValidationError;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Counts, for every contributor, how many distinct downstream links claim it.
///
/// Every link with more than one claimant yields an error, in ascending id
/// order. The check never stops early.
pub(crate) fn check_downstream_bifurcation(topology: &Topology) -> Vec<ValidationError> {
    let mut claims: BTreeMap<LinkId, usize> = BTreeMap::new();

    for link in topology.links() {
        // A record listing the same contributor twice is still a single claimant.
        let mut contributors: SmallVec<[LinkId; 8]> =
            SmallVec::from_slice(topology.upstream_of(link).unwrap_or_default());
        contributors.sort_unstable();
        contributors.dedup();

        for contributor in contributors {
            *claims.entry(contributor).or_insert(0) += 1;
        }
    }

    let errors: Vec<ValidationError> = claims
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(link, count)| {
            warn!(link = %link, count, "FAIL: Link {} is the upstream of {} links", link, count);
            ValidationError::bifurcation(link, count)
        })
        .collect();

    if errors.is_empty() {
        info!("Downstream bifurcation check: SUCCESS");
    } else {
        info!(failures = errors.len(), "Downstream bifurcation check: FAIL");
    }
    errors
}
