//! Value invested abroad and foreign-owned within, relative to GDP.

use serde::Serialize;
use std::io::Write;

use vic3save::CountryId;

use super::{Report, Share};
use crate::format::{banner, format_money, percent};
use crate::Analysis;

pub const DEFAULT_TOP: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct CountryForeignOwnership {
    pub tag: String,
    pub gdp: f64,
    pub invested_abroad: f64,
    /// `invested_abroad` as % of own GDP.
    pub invested_pct: f64,
    pub foreign_owned: f64,
    pub foreign_owned_pct: f64,
    /// Largest investment targets; `pct` is of the target's GDP.
    pub targets: Vec<Share>,
    /// Largest foreign owners; `pct` is of this country's GDP.
    pub owners: Vec<Share>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ForeignSummary {
    pub countries: usize,
    pub investing_abroad: usize,
    pub with_foreign_owners: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ForeignOwnershipReport {
    pub countries: Vec<CountryForeignOwnership>,
    pub summary: ForeignSummary,
}

#[derive(Serialize)]
struct ForeignRow<'a> {
    tag: &'a str,
    gdp: f64,
    invested_abroad: f64,
    invested_pct: f64,
    foreign_owned: f64,
    foreign_owned_pct: f64,
}

pub fn build(analysis: &Analysis, top: usize) -> ForeignOwnershipReport {
    let ledger = &analysis.ledger;
    let share = |country: CountryId, value: f64, base: f64| Share {
        tag: analysis.tag(country),
        value,
        pct: percent(value, base),
    };

    let countries: Vec<CountryForeignOwnership> = analysis
        .countries_by_gdp()
        .into_iter()
        .map(|(country, gdp)| {
            let invested_abroad = ledger.invested_abroad(country);
            let foreign_owned = ledger.foreign_owned_within(country);
            CountryForeignOwnership {
                tag: analysis.tag(country),
                gdp,
                invested_abroad,
                invested_pct: percent(invested_abroad, gdp),
                foreign_owned,
                foreign_owned_pct: percent(foreign_owned, gdp),
                targets: ledger
                    .targets(country)
                    .into_iter()
                    .take(top)
                    .map(|(host, v)| share(host, v, analysis.gdp(host)))
                    .collect(),
                owners: ledger
                    .owners(country)
                    .into_iter()
                    .take(top)
                    .map(|(owner, v)| share(owner, v, gdp))
                    .collect(),
            }
        })
        .collect();

    let summary = ForeignSummary {
        countries: countries.len(),
        investing_abroad: countries.iter().filter(|c| c.invested_abroad > 0.0).count(),
        with_foreign_owners: countries.iter().filter(|c| c.foreign_owned > 0.0).count(),
    };

    ForeignOwnershipReport { countries, summary }
}

impl Report for ForeignOwnershipReport {
    fn write_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", banner("FOREIGN OWNERSHIP REPORT", 80))?;
        writeln!(w)?;
        writeln!(w, "Values are estimated from building cash, profit and levels.")?;
        writeln!(w, "Percentages compare owned value against GDP.")?;
        writeln!(w, "{}", "-".repeat(80))?;

        for c in &self.countries {
            writeln!(w)?;
            writeln!(w, "{}", c.tag)?;
            writeln!(w, "{}", "=".repeat(c.tag.len()))?;
            writeln!(w, "GDP: {}", format_money(c.gdp))?;

            if c.invested_abroad > 0.0 {
                writeln!(
                    w,
                    "Foreign investments: {} ({:.1}% of GDP)",
                    format_money(c.invested_abroad),
                    c.invested_pct
                )?;
                writeln!(w, "  Invests in:")?;
                for t in &c.targets {
                    writeln!(
                        w,
                        "    - {}: {} ({:.1}% of {}'s GDP)",
                        t.tag,
                        format_money(t.value),
                        t.pct,
                        t.tag
                    )?;
                }
            }

            if c.foreign_owned > 0.0 {
                writeln!(
                    w,
                    "Foreign-owned: {} ({:.1}% of GDP)",
                    format_money(c.foreign_owned),
                    c.foreign_owned_pct
                )?;
                writeln!(w, "  Owned by:")?;
                for o in &c.owners {
                    writeln!(
                        w,
                        "    - {}: {} ({:.1}% of GDP)",
                        o.tag,
                        format_money(o.value),
                        o.pct
                    )?;
                }
            }

            if c.invested_abroad <= 0.0 && c.foreign_owned <= 0.0 {
                writeln!(w, "No foreign investment either way.")?;
            }
        }

        writeln!(w)?;
        writeln!(w, "{}", "-".repeat(80))?;
        writeln!(
            w,
            "Countries: {} | Investing abroad: {} | With foreign owners: {}",
            self.summary.countries, self.summary.investing_abroad, self.summary.with_foreign_owners
        )?;
        Ok(())
    }

    fn write_csv<W: Write>(&self, w: &mut csv::Writer<W>) -> csv::Result<()> {
        for c in &self.countries {
            w.serialize(ForeignRow {
                tag: &c.tag,
                gdp: c.gdp,
                invested_abroad: c.invested_abroad,
                invested_pct: c.invested_pct,
                foreign_owned: c.foreign_owned,
                foreign_owned_pct: c.foreign_owned_pct,
            })?;
        }
        Ok(())
    }
}
