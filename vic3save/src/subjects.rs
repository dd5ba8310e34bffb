//! Overlord → subject relationships read from diplomatic pacts.
//!
//! Six pact actions make the second target a subject of the first. The
//! [`SubjectGraph`] keeps the direct adjacency exactly as the pacts list it
//! and precomputes, per overlord, every country reachable through chains of
//! subjection (a dominion's puppet counts as a subject of the dominion's
//! overlord).
//!
//! ## Cycles
//!
//! Save data is expected to be a forest, but nothing enforces that. The
//! closure walk keeps a visited set seeded with the overlord itself, so a
//! cycle (`A → B → A`) ends the walk along that path and an overlord never
//! lists itself.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::save::Pact;
use crate::CountryId;

/// Pact actions that create an overlord/subject relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    Dominion,
    Puppet,
    Protectorate,
    Colony,
    PersonalUnion,
    CharteredCompany,
}

impl SubjectType {
    pub const ALL: [SubjectType; 6] = [
        SubjectType::Dominion,
        SubjectType::Puppet,
        SubjectType::Protectorate,
        SubjectType::Colony,
        SubjectType::PersonalUnion,
        SubjectType::CharteredCompany,
    ];

    /// Pact action tag as written in the save.
    pub fn action(self) -> &'static str {
        match self {
            SubjectType::Dominion => "dominion",
            SubjectType::Puppet => "puppet",
            SubjectType::Protectorate => "protectorate",
            SubjectType::Colony => "colony",
            SubjectType::PersonalUnion => "personal_union",
            SubjectType::CharteredCompany => "chartered_company",
        }
    }

    /// `None` for every other pact action (alliances, trade agreements, ...).
    pub fn from_action(action: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.action() == action)
    }
}

/// A single overlord/subject relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectPact {
    pub overlord: CountryId,
    pub subject: CountryId,
    pub subject_type: SubjectType,
}

impl SubjectPact {
    /// `None` if the pact is not a subject relationship or lacks a target.
    pub fn from_pact(pact: &Pact) -> Option<Self> {
        let subject_type = SubjectType::from_action(&pact.action)?;
        Some(Self {
            overlord: pact.targets.first?,
            subject: pact.targets.second?,
            subject_type,
        })
    }
}

/// Direct and transitive overlord → subjects mapping.
#[derive(Debug, Clone, Default)]
pub struct SubjectGraph {
    /// Immediate subjects in pact order, duplicates preserved.
    direct: BTreeMap<CountryId, Vec<CountryId>>,
    /// All reachable subjects in discovery order, each listed once.
    transitive: BTreeMap<CountryId, Vec<CountryId>>,
    /// Immediate overlord of each subject (first pact wins).
    overlord_of: BTreeMap<CountryId, CountryId>,
}

impl SubjectGraph {
    /// Build from raw save pacts, ignoring non-subject actions.
    pub fn from_pacts<'a, I>(pacts: I) -> Self
    where
        I: IntoIterator<Item = &'a Pact>,
    {
        Self::from_subject_pacts(pacts.into_iter().filter_map(SubjectPact::from_pact))
    }

    pub fn from_subject_pacts<I>(pacts: I) -> Self
    where
        I: IntoIterator<Item = SubjectPact>,
    {
        let mut direct: BTreeMap<CountryId, Vec<CountryId>> = BTreeMap::new();
        let mut overlord_of = BTreeMap::new();

        for pact in pacts {
            direct.entry(pact.overlord).or_default().push(pact.subject);
            overlord_of.entry(pact.subject).or_insert(pact.overlord);
        }

        let transitive = direct
            .keys()
            .map(|&overlord| (overlord, closure(&direct, overlord)))
            .collect();

        let graph = Self {
            direct,
            transitive,
            overlord_of,
        };
        log::debug!(
            "Subject graph: {} overlords, {} subjects",
            graph.direct.len(),
            graph.overlord_of.len()
        );
        graph
    }

    /// Immediate subjects (empty if `overlord` has none).
    pub fn direct_subjects(&self, overlord: CountryId) -> &[CountryId] {
        self.direct.get(&overlord).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Direct and indirect subjects, each listed once, never `overlord` itself.
    pub fn all_subjects(&self, overlord: CountryId) -> &[CountryId] {
        self.transitive.get(&overlord).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn overlord_of(&self, subject: CountryId) -> Option<CountryId> {
        self.overlord_of.get(&subject).copied()
    }

    pub fn is_subject(&self, country: CountryId) -> bool {
        self.overlord_of.contains_key(&country)
    }

    /// Overlords in ID order with their transitive subject lists.
    pub fn iter(&self) -> impl Iterator<Item = (CountryId, &[CountryId])> {
        self.transitive.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.direct.is_empty()
    }
}

/// Pre-order walk from `overlord`, stack-based so deep chains can't overflow.
fn closure(direct: &BTreeMap<CountryId, Vec<CountryId>>, overlord: CountryId) -> Vec<CountryId> {
    let mut visited = HashSet::from([overlord]);
    let mut found = Vec::new();
    let mut stack: Vec<CountryId> = Vec::new();

    if let Some(subjects) = direct.get(&overlord) {
        stack.extend(subjects.iter().rev());
    }

    while let Some(country) = stack.pop() {
        if !visited.insert(country) {
            continue;
        }
        found.push(country);
        if let Some(subjects) = direct.get(&country) {
            stack.extend(subjects.iter().rev());
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::PactTargets;

    fn pact(action: &str, first: u64, second: u64) -> Pact {
        Pact {
            action: action.to_string(),
            targets: PactTargets {
                first: Some(CountryId(first)),
                second: Some(CountryId(second)),
            },
        }
    }

    fn ids(raw: &[u64]) -> Vec<CountryId> {
        raw.iter().copied().map(CountryId).collect()
    }

    #[test]
    fn test_subject_actions() {
        for t in SubjectType::ALL {
            assert_eq!(SubjectType::from_action(t.action()), Some(t));
        }
        assert_eq!(SubjectType::from_action("alliance"), None);
        assert_eq!(SubjectType::from_action("PUPPET"), None);
    }

    #[test]
    fn test_non_subject_pacts_ignored() {
        let pacts = [
            pact("alliance", 1, 2),
            pact("customs_union", 1, 3),
            Pact {
                action: "puppet".into(),
                targets: PactTargets {
                    first: Some(CountryId(1)),
                    second: None,
                },
            },
        ];
        let graph = SubjectGraph::from_pacts(&pacts);
        assert!(graph.is_empty());
        assert!(graph.all_subjects(CountryId(1)).is_empty());
    }

    #[test]
    fn test_transitive_chain() {
        // GBR(1) -> CAN(2) dominion, CAN(2) -> NFL(3) puppet, NFL(3) -> X(4) colony
        let pacts = [
            pact("dominion", 1, 2),
            pact("puppet", 2, 3),
            pact("colony", 3, 4),
        ];
        let graph = SubjectGraph::from_pacts(&pacts);

        assert_eq!(graph.direct_subjects(CountryId(1)), ids(&[2]).as_slice());
        assert_eq!(graph.all_subjects(CountryId(1)), ids(&[2, 3, 4]).as_slice());
        assert_eq!(graph.all_subjects(CountryId(2)), ids(&[3, 4]).as_slice());
        assert_eq!(graph.overlord_of(CountryId(3)), Some(CountryId(2)));
        assert!(graph.is_subject(CountryId(4)));
        assert!(!graph.is_subject(CountryId(1)));
    }

    #[test]
    fn test_discovery_order_is_preorder() {
        // 1 -> [2, 5], 2 -> [3], 3 -> [4]
        let pacts = [
            pact("puppet", 1, 2),
            pact("puppet", 1, 5),
            pact("protectorate", 2, 3),
            pact("dominion", 3, 4),
        ];
        let graph = SubjectGraph::from_pacts(&pacts);
        assert_eq!(graph.all_subjects(CountryId(1)), ids(&[2, 3, 4, 5]).as_slice());
    }

    #[test]
    fn test_cycle_terminates_without_self() {
        let pacts = [pact("puppet", 1, 2), pact("puppet", 2, 1)];
        let graph = SubjectGraph::from_pacts(&pacts);

        assert_eq!(graph.all_subjects(CountryId(1)), ids(&[2]).as_slice());
        assert_eq!(graph.all_subjects(CountryId(2)), ids(&[1]).as_slice());
    }

    #[test]
    fn test_duplicates_kept_direct_but_not_transitive() {
        let pacts = [
            pact("puppet", 1, 2),
            pact("personal_union", 1, 2),
            pact("colony", 1, 3),
            pact("colony", 2, 3),
        ];
        let graph = SubjectGraph::from_pacts(&pacts);

        assert_eq!(graph.direct_subjects(CountryId(1)), ids(&[2, 2, 3]).as_slice());
        assert_eq!(graph.all_subjects(CountryId(1)), ids(&[2, 3]).as_slice());
    }

    #[test]
    fn test_deep_chain() {
        let pacts: Vec<Pact> = (0..2_000).map(|i| pact("puppet", i, i + 1)).collect();
        let graph = SubjectGraph::from_pacts(&pacts);
        assert_eq!(graph.all_subjects(CountryId(0)).len(), 2_000);
    }

    #[test]
    fn test_transitivity_and_no_self_subjection_hold_everywhere() {
        let pacts = [
            pact("puppet", 1, 2),
            pact("dominion", 2, 3),
            pact("colony", 3, 1),
            pact("chartered_company", 4, 5),
            pact("puppet", 5, 2),
        ];
        let graph = SubjectGraph::from_pacts(&pacts);

        for (overlord, subjects) in graph.iter() {
            assert!(!subjects.contains(&overlord));
            for &s in subjects {
                for t in graph.direct_subjects(s) {
                    assert!(*t == overlord || subjects.contains(t));
                }
            }
        }
    }
}
