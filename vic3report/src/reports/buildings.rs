//! Foreign stakes by owned building type, from both sides of the border.

use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

use vic3save::aggregate::{sorted_desc, sum_levels};
use vic3save::CountryId;

use super::{BuildingLevels, Report};
use crate::format::{banner, building_display_name};
use crate::Analysis;

const TOP_COUNTERPARTS: usize = 10;
const TOP_TYPES: usize = 5;

type LevelsByType = BTreeMap<String, i64>;
type NestedLevels = BTreeMap<CountryId, BTreeMap<CountryId, LevelsByType>>;

#[derive(Debug, Clone, Serialize)]
pub struct CounterpartBuildings {
    pub tag: String,
    pub levels: i64,
    /// Every owned building type, largest first.
    pub buildings: Vec<BuildingLevels>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountryBuildings {
    pub tag: String,
    pub total_levels: i64,
    /// All counterparts combined, by building type.
    pub by_type: Vec<BuildingLevels>,
    /// Every counterpart, largest first. Text output shows only the top ones.
    pub counterparts: Vec<CounterpartBuildings>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildingReport {
    /// Per owner: what it holds abroad, by host.
    pub abroad: Vec<CountryBuildings>,
    /// Per host: what foreigners hold inside it, by owner.
    pub within: Vec<CountryBuildings>,
}

#[derive(Serialize)]
struct BuildingRow<'a> {
    direction: &'static str,
    country: &'a str,
    counterpart: &'a str,
    building: &'a str,
    levels: i64,
}

pub fn build(analysis: &Analysis) -> BuildingReport {
    let by_owner = &analysis.ledger.building_levels;

    let mut by_host: NestedLevels = BTreeMap::new();
    for (owner, hosts) in by_owner {
        for (host, types) in hosts {
            by_host.entry(*host).or_default().insert(*owner, types.clone());
        }
    }

    BuildingReport {
        abroad: summarize(analysis, by_owner),
        within: summarize(analysis, &by_host),
    }
}

fn summarize(analysis: &Analysis, nested: &NestedLevels) -> Vec<CountryBuildings> {
    let mut rows: Vec<CountryBuildings> = nested
        .iter()
        .filter(|(country, _)| analysis.includes(**country))
        .map(|(&country, counterparts)| {
            let mut combined = LevelsByType::new();
            for types in counterparts.values() {
                for (tag, levels) in types {
                    *combined.entry(tag.clone()).or_default() += levels;
                }
            }

            let totals: BTreeMap<CountryId, i64> =
                counterparts.iter().map(|(c, t)| (*c, sum_levels(t))).collect();
            let ranked: Vec<CounterpartBuildings> = sorted_desc(&totals)
                .into_iter()
                .map(|(other, levels)| CounterpartBuildings {
                    tag: analysis.tag(other),
                    levels,
                    buildings: ranked_types(&counterparts[&other]),
                })
                .collect();

            CountryBuildings {
                tag: analysis.tag(country),
                total_levels: sum_levels(&combined),
                by_type: ranked_types(&combined),
                counterparts: ranked,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.total_levels.cmp(&a.total_levels).then_with(|| a.tag.cmp(&b.tag)));
    rows
}

fn ranked_types(types: &LevelsByType) -> Vec<BuildingLevels> {
    sorted_desc(types)
        .into_iter()
        .map(|(tag, levels)| BuildingLevels {
            building: building_display_name(&tag),
            levels,
        })
        .collect()
}

fn write_section(
    w: &mut dyn Write,
    title: &str,
    relation: &str,
    rows: &[CountryBuildings],
) -> std::io::Result<()> {
    writeln!(w)?;
    writeln!(w, "{}", banner(title, 80))?;
    if rows.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for row in rows {
        writeln!(w)?;
        writeln!(w, "{} ({} levels)", row.tag, row.total_levels)?;
        for c in row.counterparts.iter().take(TOP_COUNTERPARTS) {
            writeln!(w, "  {} {}: {} levels", relation, c.tag, c.levels)?;
            for b in c.buildings.iter().take(TOP_TYPES) {
                writeln!(w, "    {:<40} {:>6}", b.building, b.levels)?;
            }
        }
        let more = row.counterparts.len().saturating_sub(TOP_COUNTERPARTS);
        if more > 0 {
            writeln!(w, "  ... and {} more countries", more)?;
        }
    }
    Ok(())
}

impl Report for BuildingReport {
    fn write_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        write_section(w, "BUILDINGS OWNED ABROAD", "In", &self.abroad)?;
        write_section(w, "FOREIGN-OWNED BUILDINGS", "Owned by", &self.within)
    }

    fn write_csv<W: Write>(&self, w: &mut csv::Writer<W>) -> csv::Result<()> {
        let sections = [("abroad", &self.abroad), ("within", &self.within)];
        for (direction, rows) in sections {
            for row in rows {
                for c in &row.counterparts {
                    for b in &c.buildings {
                        w.serialize(BuildingRow {
                            direction,
                            country: &row.tag,
                            counterpart: &c.tag,
                            building: &b.building,
                            levels: b.levels,
                        })?;
                    }
                }
            }
        }
        Ok(())
    }
}
