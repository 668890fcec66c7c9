//! attributes.rs
//! Marginal per-link values fed into propagation.

use super::types::LinkId;
use std::collections::HashMap;

/// Scalar marginal value per link (length, local discharge, load, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap {
    values: HashMap<LinkId, f64>,
}

impl AttributeMap {
    pub fn new() -> Self { Self::default() }

    /// Sets the value of `link`, returning the previous one if any.
    pub fn insert(&mut self, link: LinkId, value: f64) -> Option<f64> {
        self.values.insert(link, value)
    }

    #[inline(always)]
    pub fn get(&self, link: LinkId) -> Option<f64> {
        self.values.get(&link).copied()
    }

    pub fn contains(&self, link: LinkId) -> bool { self.values.contains_key(&link) }
    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (LinkId, f64)> + '_ {
        self.values.iter().map(|(&k, &v)| (k, v))
    }
}

impl FromIterator<(LinkId, f64)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (LinkId, f64)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}
