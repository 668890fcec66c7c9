//! Root-to-leaves distribution (e.g. flow distance from the outlet).

use super::cumulative::{CumulativeMap, PropagationError};
use super::{log_summary, require_outlet};
use crate::graph::{traversal, Descend, Topology};
use crate::store::{AttributeMap, LinkId};
use std::convert::Infallible;
use tracing::{debug, info, warn};

/// Distributes the attribute from the outlet outward.
///
/// `cumulative[outlet] = attributes[outlet]` and, for each contributor `c` of
/// a computed link `n`, `cumulative[c] = cumulative[n] + attributes[c]`.
///
/// Best effort below the outlet: a link with no attribute is left unset and
/// nothing upstream of it is computed. Only a missing outlet is an error.
pub fn accumulate_downstream(
    outlet: LinkId,
    topology: &Topology,
    attributes: &AttributeMap,
) -> Result<CumulativeMap, PropagationError> {
    let outlet_value = require_outlet(outlet, topology, attributes)?;
    info!(
        outlet = %outlet,
        value = outlet_value,
        "Accumulating downstream from {} -> {:?}",
        outlet,
        topology.upstream_of(outlet).unwrap_or_default()
    );

    let mut cumulative = CumulativeMap::with_capacity(topology.len());
    let mut unset = 0usize;

    let stats = traversal::pre_order::<Infallible, _>(topology, outlet, |step| {
        let Some(value) = attributes.get(step.link) else {
            warn!(link = %step.link, "No attribute for link {}; its upstream branch is left unset", step.link);
            unset += 1;
            return Ok(Descend::Prune);
        };

        let carried = step.parent.and_then(|p| cumulative.get(p)).unwrap_or(0.0);
        cumulative.insert(step.link, carried + value);

        if !step.declared {
            warn!(link = %step.link, "Missing link {} in topology", step.link);
        }
        Ok(Descend::Continue)
    })
    .unwrap_or_default();

    if stats.revisits > 0 {
        warn!(revisits = stats.revisits, "Links reached more than once were skipped; run the topology checks");
    }
    debug!(?stats, unset, "Downstream pass finished");
    log_summary(&cumulative);
    Ok(cumulative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TopologyRecord;
    use crate::propagation::MissingFrom;

    fn rec(link: u32, contributors: &[u32]) -> TopologyRecord {
        let c: Vec<LinkId> = contributors.iter().map(|&v| LinkId(v)).collect();
        TopologyRecord::new(LinkId(link), &c)
    }

    fn uniform(links: impl IntoIterator<Item = u32>, value: f64) -> AttributeMap {
        links.into_iter().map(|l| (LinkId(l), value)).collect()
    }

    #[test]
    fn test_reference_scenario() {
        let topo = Topology::from_records(vec![rec(1, &[2, 3]), rec(2, &[4]), rec(3, &[]), rec(4, &[])]);
        let attrs = uniform(1..=4, 1.0);

        let acc = accumulate_downstream(LinkId(1), &topo, &attrs).unwrap();
        assert_eq!(
            acc.iter().collect::<Vec<_>>(),
            vec![(LinkId(1), 1.0), (LinkId(2), 2.0), (LinkId(4), 3.0), (LinkId(3), 2.0)]
        );
        assert_eq!(acc.max_entry(), Some((LinkId(4), 3.0)));
    }

    #[test]
    fn test_uniform_path_grows_linearly_with_depth() {
        let k = 50u32;
        let topo = Topology::from_records((0..=k).map(|i| if i < k { rec(i, &[i + 1]) } else { rec(i, &[]) }));
        let a = 2.5;
        let acc = accumulate_downstream(LinkId(0), &topo, &uniform(0..=k, a)).unwrap();

        for depth in 0..=k {
            assert_eq!(acc.get(LinkId(depth)), Some((depth as f64 + 1.0) * a));
        }
    }

    #[test]
    fn test_missing_attribute_leaves_branch_unset() {
        // 1 <- {2, 3}, 2 <- {4}; link 2 has no attribute.
        let topo = Topology::from_records(vec![rec(1, &[2, 3]), rec(2, &[4]), rec(3, &[]), rec(4, &[])]);
        let attrs: AttributeMap = [(LinkId(1), 1.0), (LinkId(3), 4.0), (LinkId(4), 1.0)].into_iter().collect();

        let acc = accumulate_downstream(LinkId(1), &topo, &attrs).unwrap();
        assert_eq!(acc.len(), 2);
        assert_eq!(acc.get(LinkId(3)), Some(5.0));
        assert!(!acc.contains(LinkId(2)));
        assert!(!acc.contains(LinkId(4)));
    }

    #[test]
    fn test_undeclared_contributor_gets_value_without_descent() {
        let topo = Topology::from_records(vec![rec(1, &[7])]);
        let attrs = uniform([1, 7], 1.0);
        let acc = accumulate_downstream(LinkId(1), &topo, &attrs).unwrap();
        assert_eq!(acc.get(LinkId(7)), Some(2.0));
    }

    #[test]
    fn test_outlet_must_be_in_both_maps() {
        let topo = Topology::from_records(vec![rec(1, &[2]), rec(2, &[])]);

        let err = accumulate_downstream(LinkId(1), &topo, &uniform([2], 1.0)).unwrap_err();
        assert_eq!(err, PropagationError::OutletNotFound { link: LinkId(1), map: MissingFrom::Attributes });

        let err = accumulate_downstream(LinkId(5), &topo, &uniform([5], 1.0)).unwrap_err();
        assert_eq!(err, PropagationError::OutletNotFound { link: LinkId(5), map: MissingFrom::Topology });
    }

    #[test]
    fn test_cycle_does_not_hang() {
        let topo = Topology::from_records(vec![rec(1, &[5]), rec(5, &[3]), rec(3, &[5])]);
        let acc = accumulate_downstream(LinkId(1), &topo, &uniform([1, 3, 5], 1.0)).unwrap();
        assert_eq!(acc.len(), 3);
    }
}
