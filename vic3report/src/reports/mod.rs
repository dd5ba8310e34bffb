//! Report models. Each `build` function reads an [`Analysis`] and returns a
//! plain, serialisable struct; [`render`] turns it into the requested format.
//!
//! [`Analysis`]: crate::Analysis

pub mod blocs;
pub mod buildings;
pub mod compare;
pub mod effective;
pub mod entities;
pub mod foreign;
pub mod subjects;
pub mod totals;

use serde::Serialize;
use std::io::Write;

use crate::OutputFormat;

/// A report that can be written as text or flattened into CSV rows.
///
/// JSON output serialises the report struct itself.
pub trait Report: Serialize {
    fn write_text(&self, w: &mut dyn Write) -> std::io::Result<()>;

    fn write_csv<W: Write>(&self, w: &mut csv::Writer<W>) -> csv::Result<()>;
}

pub fn render<R: Report>(report: &R, format: OutputFormat, w: &mut dyn Write) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => report.write_text(w)?,
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut *w);
            report.write_csv(&mut writer)?;
            writer.flush()?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *w, report)?;
            writeln!(w)?;
        }
    }
    Ok(())
}

/// Tag and amount, used wherever a report lists counterparties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub tag: String,
    pub value: f64,
    /// Percentage of the GDP the row is compared against.
    pub pct: f64,
}

/// Building type (display name) and levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildingLevels {
    pub building: String,
    pub levels: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_analysis;

    #[test]
    fn test_json_render_is_valid() {
        let analysis = sample_analysis();
        let report = totals::build(&analysis);
        let mut out = Vec::new();
        render(&report, OutputFormat::Json, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert!(value["abroad"].is_array());
    }

    #[test]
    fn test_csv_render_has_header() {
        let analysis = sample_analysis();
        let report = totals::build(&analysis);
        let mut out = Vec::new();
        render(&report, OutputFormat::Csv, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("direction,tag,levels\n"));
    }
}
