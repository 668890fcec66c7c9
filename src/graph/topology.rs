//! topology.rs
//! Read-only drainage tree, queryable upstream (contributors) and downstream (parent).

use super::storage::{LinkArena, NO_SLOT};
use crate::store::LinkId;
use smallvec::SmallVec;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// One declared link and the links draining directly into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyRecord {
    pub link: LinkId,
    /// Ordered upstream contributors. Empty marks a headwater.
    pub contributors: SmallVec<[LinkId; 4]>,
}

impl TopologyRecord {
    pub fn new(link: LinkId, contributors: &[LinkId]) -> Self {
        Self { link, contributors: SmallVec::from_slice(contributors) }
    }

    pub fn headwater(link: LinkId) -> Self {
        Self { link, contributors: SmallVec::new() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopologyOptions {
    /// Abort construction when the declared node count differs from the parsed one.
    pub strict_node_count: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Topology declares {declared} links but {parsed} records were parsed")]
    NodeCountMismatch { declared: usize, parsed: usize },
}

#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub(crate) arena: LinkArena,
    declared_count: Option<usize>,
}

impl Topology {
    /// Builds a topology from records without a declared node count.
    pub fn from_records(records: impl IntoIterator<Item = TopologyRecord>) -> Self {
        Self::assemble(None, records)
    }

    /// Builds a topology and audits the declared node count (e.g. an RVR header).
    ///
    /// A mismatch is a warning unless `options.strict_node_count` is set.
    pub fn build(
        declared_count: Option<usize>,
        records: impl IntoIterator<Item = TopologyRecord>,
        options: TopologyOptions,
    ) -> Result<Self, TopologyError> {
        let topology = Self::assemble(declared_count, records);

        if let Some(declared) = declared_count {
            let parsed = topology.len();
            if declared != parsed {
                if options.strict_node_count {
                    return Err(TopologyError::NodeCountMismatch { declared, parsed });
                }
                warn!(declared, parsed, "Node count mismatch: tracked {} of {} declared links", parsed, declared);
            }
        }
        Ok(topology)
    }

    /// Builds a topology from `(link, downstream_link)` pairs.
    ///
    /// A link has one downstream link, so a repeated link keeps its last pair
    /// (at the position of its first mention) and a warning names it. Every id
    /// mentioned on either side becomes a declared link; records keep
    /// first-mention order and contributors keep pair order.
    pub fn from_downstream_pairs(pairs: impl IntoIterator<Item = (LinkId, LinkId)>) -> Self {
        let mut edges: Vec<(LinkId, LinkId)> = Vec::new();
        let mut edge_of: HashMap<LinkId, usize> = HashMap::new();
        for (link, downstream) in pairs {
            match edge_of.get(&link) {
                Some(&pos) => {
                    if edges[pos].1 != downstream {
                        warn!(
                            link = %link,
                            "Link {} redefined: drains into {} instead of {}",
                            link, downstream, edges[pos].1
                        );
                    }
                    edges[pos].1 = downstream;
                }
                None => {
                    edge_of.insert(link, edges.len());
                    edges.push((link, downstream));
                }
            }
        }

        let mut records: Vec<TopologyRecord> = Vec::new();
        let mut index: HashMap<LinkId, usize> = HashMap::new();
        let mut slot_for = |link: LinkId, records: &mut Vec<TopologyRecord>| -> usize {
            *index.entry(link).or_insert_with(|| {
                records.push(TopologyRecord::headwater(link));
                records.len() - 1
            })
        };

        for (link, downstream) in edges {
            let d = slot_for(downstream, &mut records);
            slot_for(link, &mut records);
            records[d].contributors.push(link);
        }
        Self::assemble(None, records)
    }

    fn assemble(declared_count: Option<usize>, records: impl IntoIterator<Item = TopologyRecord>) -> Self {
        // A link declared twice keeps its last record, at its first position.
        let mut ordered: Vec<TopologyRecord> = Vec::new();
        let mut seen: HashMap<LinkId, usize> = HashMap::new();
        for record in records {
            match seen.get(&record.link) {
                Some(&pos) => {
                    warn!(link = %record.link, "Link {} declared more than once; keeping the last record", record.link);
                    ordered[pos] = record;
                }
                None => {
                    seen.insert(record.link, ordered.len());
                    ordered.push(record);
                }
            }
        }

        let mut arena = LinkArena::new();
        for record in &ordered {
            for (contributor, first) in arena.declare(record.link, &record.contributors) {
                warn!(
                    link = %contributor,
                    "Link {} drains into both {} and {}; keeping {} as its downstream link",
                    contributor, first, record.link, first
                );
            }
        }

        debug!(links = ordered.len(), slots = arena.slot_count(), "Topology assembled");
        Self { arena, declared_count }
    }

    // --- Queries ---

    /// Direct upstream contributors of `link`; `None` if `link` is not declared.
    pub fn upstream_of(&self, link: LinkId) -> Option<&[LinkId]> {
        let slot = self.declared_slot(link)?;
        Some(self.arena.contributors(slot))
    }

    /// The single link `link` drains into; `None` for outlets and unknown ids.
    pub fn downstream_of(&self, link: LinkId) -> Option<LinkId> {
        let slot = self.arena.slot(link)?;
        match self.arena.downstream[slot as usize] {
            NO_SLOT => None,
            d => Some(self.arena.ids[d as usize]),
        }
    }

    pub fn contains(&self, link: LinkId) -> bool {
        self.declared_slot(link).is_some()
    }

    /// Number of declared links.
    pub fn len(&self) -> usize { self.arena.declaration_order.len() }
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Node count announced by the source, if any.
    pub fn declared_count(&self) -> Option<usize> { self.declared_count }

    /// Declared links in declaration order.
    pub fn links(&self) -> impl Iterator<Item = LinkId> + '_ {
        self.arena.declaration_order.iter().map(move |&s| self.arena.ids[s as usize])
    }

    /// Every declared edge as `(downstream, contributor)`, in declaration order.
    pub fn edges(&self) -> impl Iterator<Item = (LinkId, LinkId)> + '_ {
        self.arena.declaration_order.iter().flat_map(move |&s| {
            let down = self.arena.ids[s as usize];
            self.arena.contributors(s).iter().map(move |&up| (down, up))
        })
    }

    /// Ids referenced as contributors but never declared.
    pub fn undeclared(&self) -> impl Iterator<Item = LinkId> + '_ {
        self.arena
            .ids
            .iter()
            .zip(&self.arena.declared)
            .filter(|&(_, &declared)| !declared)
            .map(|(&id, _)| id)
    }

    /// Declared links that drain into nothing.
    pub fn outlets(&self) -> impl Iterator<Item = LinkId> + '_ {
        self.arena
            .declaration_order
            .iter()
            .filter(move |&&s| self.arena.downstream[s as usize] == NO_SLOT)
            .map(move |&s| self.arena.ids[s as usize])
    }

    /// Declared links with no contributors.
    pub fn headwaters(&self) -> impl Iterator<Item = LinkId> + '_ {
        self.arena
            .declaration_order
            .iter()
            .filter(move |&&s| self.arena.contributors(s).is_empty())
            .map(move |&s| self.arena.ids[s as usize])
    }

    /// Records in declaration order, e.g. for writing back to disk.
    pub fn records(&self) -> impl Iterator<Item = TopologyRecord> + '_ {
        self.links().map(move |link| {
            TopologyRecord::new(link, self.upstream_of(link).unwrap_or_default())
        })
    }

    #[inline(always)]
    fn declared_slot(&self, link: LinkId) -> Option<u32> {
        self.arena.slot(link).filter(|&s| self.arena.is_declared(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<LinkId> { raw.iter().map(|&v| LinkId(v)).collect() }

    fn sample() -> Topology {
        // 1 <- {2, 3}, 2 <- {4}, 3 and 4 are headwaters
        Topology::from_records(vec![
            TopologyRecord::new(LinkId(1), &ids(&[2, 3])),
            TopologyRecord::new(LinkId(2), &ids(&[4])),
            TopologyRecord::headwater(LinkId(3)),
            TopologyRecord::headwater(LinkId(4)),
        ])
    }

    #[test]
    fn test_round_trip_matches_edge_list() {
        let edges: Vec<(u32, Vec<u32>)> = vec![
            (10, vec![11, 12, 13]),
            (11, vec![]),
            (12, vec![14, 15]),
            (13, vec![]),
            (14, vec![]),
            (15, vec![16]),
            (16, vec![]),
        ];
        let topo = Topology::from_records(
            edges.iter().map(|(l, c)| TopologyRecord::new(LinkId(*l), &ids(c))),
        );

        for (link, contributors) in &edges {
            assert_eq!(topo.upstream_of(LinkId(*link)).unwrap(), ids(contributors).as_slice());
            for c in contributors {
                assert_eq!(topo.downstream_of(LinkId(*c)), Some(LinkId(*link)));
            }
        }
        assert_eq!(topo.downstream_of(LinkId(10)), None);
        assert_eq!(topo.outlets().collect::<Vec<_>>(), ids(&[10]));
        assert_eq!(topo.edges().count(), 6);
    }

    #[test]
    fn test_headwater_vs_unknown() {
        let topo = sample();
        assert_eq!(topo.upstream_of(LinkId(3)), Some(&[][..]));
        assert_eq!(topo.upstream_of(LinkId(99)), None);
        assert!(topo.contains(LinkId(4)));
        assert!(!topo.contains(LinkId(99)));
        assert_eq!(topo.headwaters().collect::<Vec<_>>(), ids(&[3, 4]));
    }

    #[test]
    fn test_undeclared_contributor_is_tracked_but_not_contained() {
        let topo = Topology::from_records(vec![TopologyRecord::new(LinkId(1), &ids(&[2, 7]))]);
        assert!(!topo.contains(LinkId(7)));
        assert_eq!(topo.downstream_of(LinkId(7)), Some(LinkId(1)));
        let mut missing: Vec<_> = topo.undeclared().collect();
        missing.sort();
        assert_eq!(missing, ids(&[2, 7]));
    }

    #[test]
    fn test_node_count_mismatch_is_warning_by_default() {
        let records = sample().records().collect::<Vec<_>>();
        let topo = Topology::build(Some(10), records, TopologyOptions::default()).unwrap();
        assert_eq!(topo.len(), 4);
        assert_eq!(topo.declared_count(), Some(10));
    }

    #[test]
    fn test_node_count_mismatch_aborts_in_strict_mode() {
        let records = sample().records().collect::<Vec<_>>();
        let err = Topology::build(Some(10), records, TopologyOptions { strict_node_count: true }).unwrap_err();
        assert_eq!(err, TopologyError::NodeCountMismatch { declared: 10, parsed: 4 });
    }

    #[test]
    fn test_duplicate_declaration_keeps_last_record() {
        let topo = Topology::from_records(vec![
            TopologyRecord::new(LinkId(1), &ids(&[2])),
            TopologyRecord::headwater(LinkId(2)),
            TopologyRecord::new(LinkId(1), &ids(&[2, 3])),
            TopologyRecord::headwater(LinkId(3)),
        ]);
        assert_eq!(topo.len(), 3);
        assert_eq!(topo.upstream_of(LinkId(1)).unwrap(), ids(&[2, 3]).as_slice());
        assert_eq!(topo.links().collect::<Vec<_>>(), ids(&[1, 2, 3]));
    }

    #[test]
    fn test_from_downstream_pairs() {
        // (contributor, downstream)
        let topo = Topology::from_downstream_pairs(vec![
            (LinkId(2), LinkId(1)),
            (LinkId(3), LinkId(1)),
            (LinkId(4), LinkId(2)),
        ]);
        assert_eq!(topo.links().collect::<Vec<_>>(), ids(&[1, 2, 3, 4]));
        assert_eq!(topo.upstream_of(LinkId(1)).unwrap(), ids(&[2, 3]).as_slice());
        assert_eq!(topo.upstream_of(LinkId(2)).unwrap(), ids(&[4]).as_slice());
        assert_eq!(topo.upstream_of(LinkId(4)).unwrap(), &[] as &[LinkId]);
        assert_eq!(topo.undeclared().count(), 0);
    }

    #[test]
    fn test_repeated_pair_yields_single_edge() {
        let topo = Topology::from_downstream_pairs(vec![(LinkId(2), LinkId(1)), (LinkId(2), LinkId(1))]);
        assert_eq!(topo.upstream_of(LinkId(1)).unwrap(), ids(&[2]).as_slice());
        assert_eq!(topo.edges().count(), 1);
    }

    #[test]
    fn test_redefined_link_keeps_last_downstream() {
        let topo = Topology::from_downstream_pairs(vec![
            (LinkId(2), LinkId(1)),
            (LinkId(3), LinkId(1)),
            (LinkId(2), LinkId(3)),
        ]);
        assert_eq!(topo.downstream_of(LinkId(2)), Some(LinkId(3)));
        assert_eq!(topo.upstream_of(LinkId(1)).unwrap(), ids(&[3]).as_slice());
        assert_eq!(topo.upstream_of(LinkId(3)).unwrap(), ids(&[2]).as_slice());
        assert_eq!(topo.links().collect::<Vec<_>>(), ids(&[3, 2, 1]));
    }
}
