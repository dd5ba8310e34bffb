//! Building levels owned abroad and foreign-owned within, per country.

use serde::Serialize;
use std::io::Write;

use vic3save::aggregate::{sorted_desc, CountryTotals};

use super::Report;
use crate::format::banner;
use crate::Analysis;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelTotal {
    pub tag: String,
    pub levels: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TotalsReport {
    /// Levels each country owns in other countries, largest first.
    pub abroad: Vec<LevelTotal>,
    /// Levels foreigners own inside each country, largest first.
    pub within: Vec<LevelTotal>,
}

#[derive(Serialize)]
struct TotalsRow<'a> {
    direction: &'static str,
    tag: &'a str,
    levels: i64,
}

pub fn build(analysis: &Analysis) -> TotalsReport {
    let collect = |totals: &CountryTotals<i64>| -> Vec<LevelTotal> {
        sorted_desc(totals)
            .into_iter()
            .filter(|(c, levels)| *levels > 0 && analysis.includes(*c))
            .map(|(c, levels)| LevelTotal {
                tag: analysis.tag(c),
                levels,
            })
            .collect()
    };

    TotalsReport {
        abroad: collect(&analysis.ledger.levels_abroad),
        within: collect(&analysis.ledger.levels_foreign_owned),
    }
}

impl Report for TotalsReport {
    fn write_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", banner("FOREIGN OWNERSHIP TOTALS (building levels)", 60))?;

        for (title, rows) in [
            ("Owned abroad", &self.abroad),
            ("Foreign-owned within", &self.within),
        ] {
            writeln!(w)?;
            writeln!(w, "--- {} ---", title)?;
            if rows.is_empty() {
                writeln!(w, "  (none)")?;
            }
            for row in rows {
                writeln!(w, "  {:<6} {:>8}", row.tag, row.levels)?;
            }
        }
        Ok(())
    }

    fn write_csv<W: Write>(&self, w: &mut csv::Writer<W>) -> csv::Result<()> {
        let abroad = self.abroad.iter().map(|r| ("abroad", r));
        let within = self.within.iter().map(|r| ("within", r));
        for (direction, row) in abroad.chain(within) {
            w.serialize(TotalsRow {
                direction,
                tag: &row.tag,
                levels: row.levels,
            })?;
        }
        Ok(())
    }
}
