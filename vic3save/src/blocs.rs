//! Power bloc membership, with subjects counted towards their overlord's bloc.
//!
//! Core members come from each country's `power_bloc_as_core`. Subjects of a
//! member (transitively, via [`SubjectGraph`]) join the same bloc unless they
//! are already core members somewhere. Blocs are filled in ID order, so a
//! subject reachable from two blocs lands in the lower-ID one.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::save::{PowerBloc, SaveDocument};
use crate::subjects::SubjectGraph;
use crate::{CountryId, PowerBlocId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlocMember {
    pub country: CountryId,
    pub gdp: f64,
    pub is_leader: bool,
    /// Set for members that are in the bloc only as someone's subject.
    pub overlord: Option<CountryId>,
}

impl BlocMember {
    pub fn is_subject(&self) -> bool {
        self.overlord.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlocSummary {
    pub id: PowerBlocId,
    pub name: String,
    /// Raw identity key, e.g. `identity_trade_league`; empty when unknown.
    pub identity: String,
    /// Raw principle keys in save order.
    pub principles: Vec<String>,
    pub founding_date: Option<String>,
    pub mandate_progress: f64,
    pub leader: Option<CountryId>,
    /// Leader first, then core members by GDP, then subjects by GDP.
    pub members: Vec<BlocMember>,
}

impl BlocSummary {
    pub fn total_gdp(&self) -> f64 {
        self.members.iter().map(|m| m.gdp).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlocOverview {
    /// Blocs sorted by total GDP, largest first.
    pub blocs: Vec<BlocSummary>,
    /// Countries with GDP that belong to no bloc, largest first.
    pub independent: Vec<(CountryId, f64)>,
}

/// Display name of a bloc: its custom name, or `Power Bloc <id>`.
pub fn bloc_name(doc: &SaveDocument, id: PowerBlocId) -> String {
    doc.power_blocs
        .get(&id)
        .and_then(|b| b.custom_name())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Power Bloc {}", id))
}

pub fn group_blocs(
    doc: &SaveDocument,
    subjects: &SubjectGraph,
    gdp: &BTreeMap<CountryId, f64>,
) -> BlocOverview {
    let gdp_of = |c: CountryId| gdp.get(&c).copied().unwrap_or(0.0);

    let active: BTreeMap<PowerBlocId, &PowerBloc> = doc
        .power_blocs
        .iter()
        .filter(|(_, b)| b.is_active())
        .map(|(id, b)| (*id, b))
        .collect();

    let mut core: BTreeMap<PowerBlocId, Vec<CountryId>> = BTreeMap::new();
    for (id, country) in &doc.countries {
        if let Some(bloc) = country.power_bloc_as_core {
            if active.contains_key(&bloc) {
                core.entry(bloc).or_default().push(*id);
            }
        }
    }

    let mut placed: BTreeSet<CountryId> = core.values().flatten().copied().collect();
    let mut blocs = Vec::new();

    for (&bloc_id, &bloc) in &active {
        let leader = bloc.leader;
        let direct = core.get(&bloc_id).map(Vec::as_slice).unwrap_or(&[]);
        if direct.is_empty() {
            continue;
        }

        let mut members: Vec<BlocMember> = direct
            .iter()
            .map(|&c| BlocMember {
                country: c,
                gdp: gdp_of(c),
                is_leader: Some(c) == leader,
                overlord: None,
            })
            .collect();

        for &member in direct {
            for &subject in subjects.all_subjects(member) {
                if !placed.insert(subject) {
                    continue;
                }
                members.push(BlocMember {
                    country: subject,
                    gdp: gdp_of(subject),
                    is_leader: false,
                    overlord: Some(subjects.overlord_of(subject).unwrap_or(member)),
                });
            }
        }

        members.sort_by(member_order);
        blocs.push(BlocSummary {
            id: bloc_id,
            name: bloc_name(doc, bloc_id),
            identity: bloc.identity.clone(),
            principles: bloc.principles(),
            founding_date: bloc.founding_date.clone(),
            mandate_progress: bloc.mandate_progress,
            leader,
            members,
        });
    }

    blocs.sort_by(|a, b| {
        b.total_gdp()
            .partial_cmp(&a.total_gdp())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut independent: Vec<(CountryId, f64)> = gdp
        .iter()
        .filter(|(c, g)| **g > 0.0 && !placed.contains(*c))
        .map(|(c, g)| (*c, *g))
        .collect();
    independent.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    log::debug!(
        "Grouped {} active blocs, {} independent countries",
        blocs.len(),
        independent.len()
    );

    BlocOverview { blocs, independent }
}

fn member_order(a: &BlocMember, b: &BlocMember) -> Ordering {
    b.is_leader
        .cmp(&a.is_leader)
        .then_with(|| a.is_subject().cmp(&b.is_subject()))
        .then_with(|| b.gdp.partial_cmp(&a.gdp).unwrap_or(Ordering::Equal))
        .then_with(|| a.country.cmp(&b.country))
}
