//! Effective GDP: the economy a country controls, at home and abroad.
//!
//! `domestic = base - foreign-owned within`, `total = domestic + owned abroad`.

use serde::Serialize;
use std::cmp::Ordering;
use std::io::Write;

use super::Report;
use crate::format::{banner, format_money};
use crate::Analysis;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveGdp {
    pub tag: String,
    pub base_gdp: f64,
    pub foreign_owned: f64,
    pub domestic: f64,
    pub abroad: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EffectiveGdpReport {
    /// Largest total first.
    pub countries: Vec<EffectiveGdp>,
}

pub fn build(analysis: &Analysis) -> EffectiveGdpReport {
    let mut countries: Vec<EffectiveGdp> = analysis
        .countries_by_gdp()
        .into_iter()
        .map(|(country, base_gdp)| {
            let foreign_owned = analysis.ledger.foreign_owned_within(country);
            let abroad = analysis.ledger.invested_abroad(country);
            let domestic = base_gdp - foreign_owned;
            EffectiveGdp {
                tag: analysis.tag(country),
                base_gdp,
                foreign_owned,
                domestic,
                abroad,
                total: domestic + abroad,
            }
        })
        .collect();

    countries.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.tag.cmp(&b.tag))
    });

    EffectiveGdpReport { countries }
}

impl Report for EffectiveGdpReport {
    fn write_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", banner("EFFECTIVE GDP REPORT", 70))?;
        writeln!(w, "Economic control including foreign investment")?;
        writeln!(w)?;
        writeln!(
            w,
            "{:<6} {:>12} {:>12} {:>12} {:>12}",
            "Tag", "Base GDP", "Domestic", "Abroad", "Total Eff."
        )?;
        writeln!(w, "{}", "-".repeat(70))?;

        for c in &self.countries {
            writeln!(
                w,
                "{:<6} {:>12} {:>12} {:>12} {:>12}",
                c.tag,
                format_money(c.base_gdp),
                format_money(c.domestic),
                format_money(c.abroad),
                format_money(c.total)
            )?;
        }

        writeln!(w)?;
        writeln!(w, "Domestic: base GDP less the value foreigners own inside the country")?;
        writeln!(w, "Abroad: value the country owns in foreign countries")?;
        Ok(())
    }

    fn write_csv<W: Write>(&self, w: &mut csv::Writer<W>) -> csv::Result<()> {
        for c in &self.countries {
            w.serialize(c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{render_csv, render_text, sample_analysis, SAMPLE_SAVE};
    use vic3save::gdp::GdpSource;
    use vic3save::SaveDocument;

    #[test]
    fn test_effective_gdp() {
        let report = build(&sample_analysis());
        let order: Vec<&str> = report.countries.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(order, vec!["USA", "GBR", "FRA", "CAN"]);

        let gbr = &report.countries[1];
        assert_eq!(gbr.base_gdp, 1_000_000.0);
        assert_eq!(gbr.domestic, 850_000.0);
        assert_eq!(gbr.abroad, 56_000.0);
        assert_eq!(gbr.total, 906_000.0);

        let can = &report.countries[3];
        assert_eq!(can.domestic, 48_000.0);
    }

    #[test]
    fn test_effective_gdp_on_credit_figure() {
        let doc = SaveDocument::from_json_str(SAMPLE_SAVE).unwrap();
        let report = build(&Analysis::new(doc, GdpSource::Credit, None));

        // CAN has no credit, so drops out entirely
        let order: Vec<&str> = report.countries.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(order, vec!["USA", "GBR", "FRA"]);

        let gbr = &report.countries[1];
        assert_eq!(gbr.base_gdp, 1_599_200.0);
        assert_eq!(gbr.total, 1_505_200.0);
    }

    #[test]
    fn test_text_and_csv() {
        let report = build(&sample_analysis());

        let text = render_text(&report);
        assert!(text.contains("EFFECTIVE GDP REPORT"));
        assert!(text.contains("£906K"));

        let csv = render_csv(&report);
        assert!(csv.starts_with("tag,base_gdp,foreign_owned,domestic,abroad,total\n"));
        let gbr = csv.lines().nth(2).unwrap();
        assert!(gbr.starts_with("GBR,1000000"));
    }
}
