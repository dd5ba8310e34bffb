//! Foreign building levels broken down by the kind of entity holding them.

use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

use vic3save::aggregate::{sorted_desc, sum_levels, EntityKey};
use vic3save::CountryId;

use super::{BuildingLevels, Report};
use crate::format::{banner, building_display_name};
use crate::Analysis;

const TOP_HOSTS: usize = 5;
const TOP_BUILDINGS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityLevels {
    /// `Company (Company Basic Steel)`, or just the type for direct stakes.
    pub entity: String,
    pub levels: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostEntities {
    pub tag: String,
    pub levels: i64,
    pub entities: Vec<EntityLevels>,
    /// Most-owned building types in this host.
    pub top_buildings: Vec<BuildingLevels>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvestorEntities {
    pub tag: String,
    pub total_levels: i64,
    pub hosts: Vec<HostEntities>,
    /// Hosts left out of `hosts`.
    pub more_hosts: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EntityReport {
    /// Set when the report is limited to owners inside one country.
    pub focus: Option<String>,
    pub investors: Vec<InvestorEntities>,
}

#[derive(Serialize)]
struct EntityRow<'a> {
    owner: &'a str,
    host: &'a str,
    entity: &'a str,
    levels: i64,
}

pub fn entity_label(key: &EntityKey) -> String {
    match &key.building_type {
        Some(tag) => {
            let name = building_display_name(tag);
            if name == key.entity_type.label() {
                name
            } else {
                format!("{} ({})", key.entity_type, name)
            }
        }
        None => key.entity_type.label().to_string(),
    }
}

/// Every owner's stakes abroad, or with `focus`, every foreign owner's
/// stakes inside that one country.
pub fn build(analysis: &Analysis, focus: Option<&str>) -> Result<EntityReport> {
    let focus_id = match focus {
        Some(tag) => match analysis.doc.find_country(tag) {
            Some(id) => Some(id),
            None => bail!("Country {} not found in save", tag),
        },
        None => None,
    };

    let mut investors: Vec<InvestorEntities> = analysis
        .ledger
        .entity_levels
        .iter()
        .filter(|(owner, _)| analysis.includes(**owner))
        .filter_map(|(&owner, by_host)| {
            let hosts: Vec<CountryId> = match focus_id {
                Some(id) if by_host.contains_key(&id) => vec![id],
                Some(_) => return None,
                None => host_order(by_host),
            };
            Some(investor(analysis, owner, by_host, &hosts))
        })
        .collect();

    investors.sort_by(|a, b| b.total_levels.cmp(&a.total_levels).then_with(|| a.tag.cmp(&b.tag)));

    Ok(EntityReport {
        focus: focus_id.map(|id| analysis.tag(id)),
        investors,
    })
}

fn host_order(by_host: &BTreeMap<CountryId, BTreeMap<EntityKey, i64>>) -> Vec<CountryId> {
    let totals: BTreeMap<CountryId, i64> = by_host.iter().map(|(h, e)| (*h, sum_levels(e))).collect();
    sorted_desc(&totals).into_iter().map(|(h, _)| h).collect()
}

fn investor(
    analysis: &Analysis,
    owner: CountryId,
    by_host: &BTreeMap<CountryId, BTreeMap<EntityKey, i64>>,
    hosts: &[CountryId],
) -> InvestorEntities {
    let total_levels: i64 = hosts.iter().filter_map(|h| by_host.get(h)).map(sum_levels).sum();
    let buildings = analysis.ledger.building_levels.get(&owner);

    let shown: Vec<HostEntities> = hosts
        .iter()
        .take(TOP_HOSTS)
        .filter_map(|&host| {
            let entities = by_host.get(&host)?;
            let top_buildings = buildings
                .and_then(|b| b.get(&host))
                .map(|b| {
                    sorted_desc(b)
                        .into_iter()
                        .take(TOP_BUILDINGS)
                        .map(|(tag, levels)| BuildingLevels {
                            building: building_display_name(&tag),
                            levels,
                        })
                        .collect()
                })
                .unwrap_or_default();
            Some(HostEntities {
                tag: analysis.tag(host),
                levels: sum_levels(entities),
                entities: sorted_desc(entities)
                    .into_iter()
                    .map(|(key, levels)| EntityLevels {
                        entity: entity_label(&key),
                        levels,
                    })
                    .collect(),
                top_buildings,
            })
        })
        .collect();

    InvestorEntities {
        tag: analysis.tag(owner),
        total_levels,
        more_hosts: hosts.len().saturating_sub(shown.len()),
        hosts: shown,
    }
}

impl Report for EntityReport {
    fn write_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        match &self.focus {
            Some(tag) => {
                writeln!(w, "{}", banner(&format!("FOREIGN OWNERSHIP IN {} BY ENTITY", tag), 80))?;
                for inv in &self.investors {
                    writeln!(w)?;
                    writeln!(w, "{}: {} levels", inv.tag, inv.total_levels)?;
                    for host in &inv.hosts {
                        for e in &host.entities {
                            writeln!(w, "  {:<50} {:>6}", e.entity, e.levels)?;
                        }
                        if !host.top_buildings.is_empty() {
                            let names: Vec<String> = host
                                .top_buildings
                                .iter()
                                .map(|b| format!("{} ({})", b.building, b.levels))
                                .collect();
                            writeln!(w, "  Top buildings: {}", names.join(", "))?;
                        }
                    }
                }
            }
            None => {
                writeln!(w, "{}", banner("FOREIGN OWNERSHIP BY ENTITY", 80))?;
                for inv in &self.investors {
                    writeln!(w)?;
                    writeln!(w, "{} ({} levels abroad)", inv.tag, inv.total_levels)?;
                    writeln!(w, "{}", "-".repeat(40))?;
                    for host in &inv.hosts {
                        writeln!(w, "  In {}: {} levels", host.tag, host.levels)?;
                        for e in &host.entities {
                            writeln!(w, "    {:<48} {:>6}", e.entity, e.levels)?;
                        }
                    }
                    if inv.more_hosts > 0 {
                        writeln!(w, "  ... and {} more countries", inv.more_hosts)?;
                    }
                }
            }
        }

        if self.investors.is_empty() {
            writeln!(w)?;
            writeln!(w, "No foreign ownership found.")?;
        }
        Ok(())
    }

    fn write_csv<W: Write>(&self, w: &mut csv::Writer<W>) -> csv::Result<()> {
        for inv in &self.investors {
            for host in &inv.hosts {
                for e in &host.entities {
                    w.serialize(EntityRow {
                        owner: &inv.tag,
                        host: &host.tag,
                        entity: &e.entity,
                        levels: e.levels,
                    })?;
                }
            }
        }
        Ok(())
    }
}
