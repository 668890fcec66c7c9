//! traversal.rs
//! Iterative depth-first walks over the upstream-contributor tree.
//!
//! Real networks contain single chains tens of thousands of links long, so no
//! walk here recurses. Pending work lives in a heap-allocated frame stack and
//! visited marks live in an epoch-stamped array that is reused across walks.

use super::storage::NO_SLOT;
use super::topology::Topology;
use crate::store::LinkId;
use std::convert::Infallible;

/// Returned by pre-order visitors to control descent below the visited link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descend {
    Continue,
    /// Skip every contributor of the visited link.
    Prune,
}

/// A single visit handed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub link: LinkId,
    /// The link this one was reached from (its downstream link along the walk).
    pub parent: Option<LinkId>,
    /// Distance in edges from the walk root.
    pub depth: usize,
    /// False for ids that are only referenced as contributors.
    pub declared: bool,
    pub(crate) slot: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub visited: usize,
    /// Contributors reached a second time. Always 0 on a well-formed tree.
    pub revisits: usize,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    slot: u32,
    parent: u32,
    depth: usize,
    /// Next contributor to expand (post-order only).
    cursor: usize,
}

/// Reusable walking state bound to one topology.
pub struct Walker<'t> {
    topology: &'t Topology,
    stack: Vec<Frame>,
    marks: Vec<u32>,
    epoch: u32,
}

impl<'t> Walker<'t> {
    pub fn new(topology: &'t Topology) -> Self {
        Self {
            topology,
            stack: Vec::new(),
            marks: vec![0; topology.arena.slot_count()],
            epoch: 0,
        }
    }

    /// Visits `root` and then, depth first, every link upstream of it, each
    /// before its own contributors. Contributors are visited in declared order.
    ///
    /// An unknown `root` yields an empty walk.
    pub fn pre_order<E, F>(&mut self, root: LinkId, mut visit: F) -> Result<WalkStats, E>
    where
        F: FnMut(&Step) -> Result<Descend, E>,
    {
        let mut stats = WalkStats::default();
        let Some(root_slot) = self.begin(root) else { return Ok(stats) };
        let topology = self.topology;
        let arena = &topology.arena;

        self.stack.push(Frame { slot: root_slot, parent: NO_SLOT, depth: 0, cursor: 0 });
        while let Some(frame) = self.stack.pop() {
            stats.visited += 1;
            stats.max_depth = stats.max_depth.max(frame.depth);

            if visit(&self.step(&frame))? == Descend::Prune || !arena.is_declared(frame.slot) {
                continue;
            }

            // Reverse push so the first contributor is popped first.
            for &child in arena.contributor_slots(frame.slot).iter().rev() {
                if !self.mark(child) {
                    stats.revisits += 1;
                    continue;
                }
                self.stack.push(Frame { slot: child, parent: frame.slot, depth: frame.depth + 1, cursor: 0 });
            }
        }
        Ok(stats)
    }

    /// Visits every link upstream of `root` and then `root` itself, each after
    /// all of its own contributors.
    ///
    /// An unknown `root` yields an empty walk.
    pub fn post_order<E, F>(&mut self, root: LinkId, mut visit: F) -> Result<WalkStats, E>
    where
        F: FnMut(&Step) -> Result<(), E>,
    {
        let mut stats = WalkStats::default();
        let Some(root_slot) = self.begin(root) else { return Ok(stats) };
        let topology = self.topology;
        let arena = &topology.arena;

        self.stack.push(Frame { slot: root_slot, parent: NO_SLOT, depth: 0, cursor: 0 });
        loop {
            let (slot, cursor, depth) = match self.stack.last() {
                Some(top) => (top.slot, top.cursor, top.depth),
                None => break,
            };

            let children = if arena.is_declared(slot) { arena.contributor_slots(slot) } else { &[] };
            if let Some(&child) = children.get(cursor) {
                if let Some(top) = self.stack.last_mut() {
                    top.cursor += 1;
                }
                if !self.mark(child) {
                    stats.revisits += 1;
                    continue;
                }
                self.stack.push(Frame { slot: child, parent: slot, depth: depth + 1, cursor: 0 });
                continue;
            }

            // All contributors done.
            if let Some(frame) = self.stack.pop() {
                stats.visited += 1;
                stats.max_depth = stats.max_depth.max(frame.depth);
                visit(&self.step(&frame))?;
            }
        }
        Ok(stats)
    }

    /// Links reachable upstream from `root` (inclusive), in pre-order.
    pub fn reachable(&mut self, root: LinkId) -> Vec<LinkId> {
        let mut out = Vec::new();
        let _ = self.pre_order::<Infallible, _>(root, |step| {
            out.push(step.link);
            Ok(Descend::Continue)
        });
        out
    }

    // --- Internals ---

    /// Starts a fresh walk: clears leftovers, bumps the epoch and marks the root.
    fn begin(&mut self, root: LinkId) -> Option<u32> {
        self.stack.clear();
        if self.epoch == u32::MAX {
            self.marks.iter_mut().for_each(|m| *m = 0);
            self.epoch = 0;
        }
        self.epoch += 1;

        let slot = self.topology.arena.slot(root)?;
        self.mark(slot);
        Some(slot)
    }

    /// Marks `slot` visited in the current walk. Returns false if it already was.
    #[inline(always)]
    fn mark(&mut self, slot: u32) -> bool {
        let m = &mut self.marks[slot as usize];
        if *m == self.epoch {
            return false;
        }
        *m = self.epoch;
        true
    }

    fn step(&self, frame: &Frame) -> Step {
        let arena = &self.topology.arena;
        Step {
            link: arena.ids[frame.slot as usize],
            parent: (frame.parent != NO_SLOT).then(|| arena.ids[frame.parent as usize]),
            depth: frame.depth,
            declared: arena.is_declared(frame.slot),
            slot: frame.slot,
        }
    }
}

/// Convenience wrapper for a one-off pre-order walk.
pub fn pre_order<E, F>(topology: &Topology, root: LinkId, visit: F) -> Result<WalkStats, E>
where
    F: FnMut(&Step) -> Result<Descend, E>,
{
    Walker::new(topology).pre_order(root, visit)
}

/// Convenience wrapper for a one-off post-order walk.
pub fn post_order<E, F>(topology: &Topology, root: LinkId, visit: F) -> Result<WalkStats, E>
where
    F: FnMut(&Step) -> Result<(), E>,
{
    Walker::new(topology).post_order(root, visit)
}
