//! Folding ownership edges into the per-country shapes reports consume.
//!
//! Every map is a `BTreeMap` so two folds over the same edges produce
//! identical output ordering. Values are summed on key collision; nothing
//! is filtered here.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::ownership::{Attributions, DomesticStake, EntityType, OwnershipEdge};
use crate::CountryId;

pub type CountryTotals<T> = BTreeMap<CountryId, T>;
pub type CountryMatrix<T> = BTreeMap<CountryId, BTreeMap<CountryId, T>>;

/// Owning entity as reported: its type plus the owning building type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityKey {
    pub entity_type: EntityType,
    pub building_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OwnershipLedger {
    /// owner → host → value
    pub invested: CountryMatrix<f64>,
    /// host → owner → value
    pub foreign_owned: CountryMatrix<f64>,
    /// Value of stakes held by the hosting country itself.
    pub domestic: CountryTotals<f64>,
    pub levels_abroad: CountryTotals<i64>,
    pub levels_foreign_owned: CountryTotals<i64>,
    /// owner → host → entity → levels
    pub entity_levels: BTreeMap<CountryId, BTreeMap<CountryId, BTreeMap<EntityKey, i64>>>,
    /// owner → host → owned building type → levels
    pub building_levels: BTreeMap<CountryId, BTreeMap<CountryId, BTreeMap<String, i64>>>,
}

impl OwnershipLedger {
    pub fn from_attributions(attributions: &Attributions) -> Self {
        Self::fold(&attributions.foreign, &attributions.domestic)
    }

    pub fn fold(edges: &[OwnershipEdge], domestic: &[DomesticStake]) -> Self {
        let mut ledger = Self::default();
        for edge in edges {
            ledger.add_edge(edge);
        }
        for stake in domestic {
            *ledger.domestic.entry(stake.country).or_default() += stake.value;
        }
        ledger
    }

    fn add_edge(&mut self, edge: &OwnershipEdge) {
        *self
            .invested
            .entry(edge.owner)
            .or_default()
            .entry(edge.host)
            .or_default() += edge.value;
        *self
            .foreign_owned
            .entry(edge.host)
            .or_default()
            .entry(edge.owner)
            .or_default() += edge.value;

        *self.levels_abroad.entry(edge.owner).or_default() += edge.levels;
        *self.levels_foreign_owned.entry(edge.host).or_default() += edge.levels;

        let key = EntityKey {
            entity_type: edge.entity_type,
            building_type: edge.owner_building_type.clone(),
        };
        *self
            .entity_levels
            .entry(edge.owner)
            .or_default()
            .entry(edge.host)
            .or_default()
            .entry(key)
            .or_default() += edge.levels;
        *self
            .building_levels
            .entry(edge.owner)
            .or_default()
            .entry(edge.host)
            .or_default()
            .entry(edge.building_type.clone())
            .or_default() += edge.levels;
    }

    /// Total value `country` holds in other countries.
    pub fn invested_abroad(&self, country: CountryId) -> f64 {
        self.invested.get(&country).map_or(0.0, |m| m.values().sum())
    }

    /// Total value foreigners hold inside `country`.
    pub fn foreign_owned_within(&self, country: CountryId) -> f64 {
        self.foreign_owned
            .get(&country)
            .map_or(0.0, |m| m.values().sum())
    }

    /// Hosts `country` invests in, largest first.
    pub fn targets(&self, country: CountryId) -> Vec<(CountryId, f64)> {
        self.invested.get(&country).map(sorted_desc).unwrap_or_default()
    }

    /// Foreign owners inside `country`, largest first.
    pub fn owners(&self, country: CountryId) -> Vec<(CountryId, f64)> {
        self.foreign_owned
            .get(&country)
            .map(sorted_desc)
            .unwrap_or_default()
    }

    /// Every country that appears as an owner or host of a foreign stake.
    pub fn countries(&self) -> impl Iterator<Item = CountryId> {
        let mut all: Vec<CountryId> = self
            .invested
            .keys()
            .chain(self.foreign_owned.keys())
            .copied()
            .collect();
        all.sort();
        all.dedup();
        all.into_iter()
    }
}

/// Entries sorted by value descending, ties broken by key ascending.
pub fn sorted_desc<K, V>(map: &BTreeMap<K, V>) -> Vec<(K, V)>
where
    K: Clone + Ord,
    V: Copy + PartialOrd,
{
    let mut entries: Vec<(K, V)> = map.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    entries
}

/// Sum of nested level maps (e.g. one host's entity breakdown).
pub fn sum_levels<K>(map: &BTreeMap<K, i64>) -> i64 {
    map.values().sum()
}
