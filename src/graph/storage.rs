//! storage.rs
//! Dense arena for the drainage tree: one slot per link id, contributors in CSR form.

use crate::store::LinkId;
use std::collections::HashMap;

/// Sentinel for "no slot" in the index-based inverse mapping.
pub(crate) const NO_SLOT: u32 = u32::MAX;

#[derive(Debug, Clone, Default)]
pub struct LinkArena {
    // Slot <-> id
    pub ids: Vec<LinkId>,
    pub slot_of: HashMap<LinkId, u32>,
    /// False for ids that are only ever referenced as a contributor.
    pub declared: Vec<bool>,

    // Dense Topology (CSR). Ids and slots share the same ranges.
    pub contributors_flat: Vec<LinkId>,
    pub contributor_slots_flat: Vec<u32>,
    pub contributor_ranges: Vec<(u32, u32)>,

    // Inverse mapping (contributor -> downstream slot)
    pub downstream: Vec<u32>,

    /// Declared slots, in the order their records were declared.
    pub declaration_order: Vec<u32>,
}

impl LinkArena {
    pub fn new() -> Self { Self::default() }
    pub fn slot_count(&self) -> usize { self.ids.len() }

    /// Returns the slot of `link`, allocating an undeclared one if needed.
    fn intern(&mut self, link: LinkId) -> u32 {
        if let Some(&slot) = self.slot_of.get(&link) {
            return slot;
        }
        let slot = self.ids.len() as u32;
        self.ids.push(link);
        self.slot_of.insert(link, slot);
        self.declared.push(false);
        self.contributor_ranges.push((0, 0));
        self.downstream.push(NO_SLOT);
        slot
    }

    /// Declares `link` with its ordered contributors.
    ///
    /// Returns every contributor that was already claimed by a different
    /// downstream link, paired with that earlier claimant. The first claim
    /// wins in the inverse mapping.
    pub fn declare(&mut self, link: LinkId, contributors: &[LinkId]) -> Vec<(LinkId, LinkId)> {
        let slot = self.intern(link);
        let mut conflicts = Vec::new();

        // 1. Contributors (CSR append)
        let start = self.contributors_flat.len() as u32;
        for &contributor in contributors {
            let c_slot = self.intern(contributor);
            self.contributors_flat.push(contributor);
            self.contributor_slots_flat.push(c_slot);

            // 2. Inverse mapping
            let current = self.downstream[c_slot as usize];
            if current == NO_SLOT {
                self.downstream[c_slot as usize] = slot;
            } else if current != slot {
                conflicts.push((contributor, self.ids[current as usize]));
            }
        }
        self.contributor_ranges[slot as usize] = (start, contributors.len() as u32);

        // 3. Metadata
        self.declared[slot as usize] = true;
        self.declaration_order.push(slot);

        conflicts
    }

    #[inline(always)]
    pub fn slot(&self, link: LinkId) -> Option<u32> {
        self.slot_of.get(&link).copied()
    }

    #[inline(always)]
    pub fn is_declared(&self, slot: u32) -> bool {
        self.declared[slot as usize]
    }

    #[inline(always)]
    pub fn contributors(&self, slot: u32) -> &[LinkId] {
        let (start, count) = self.contributor_ranges[slot as usize];
        &self.contributors_flat[start as usize..(start + count) as usize]
    }

    #[inline(always)]
    pub fn contributor_slots(&self, slot: u32) -> &[u32] {
        let (start, count) = self.contributor_ranges[slot as usize];
        &self.contributor_slots_flat[start as usize..(start + count) as usize]
    }
}
