//! Per-country change in one metric between two saves of the same campaign.
//!
//! Countries are matched by tag, since IDs are not stable across sessions.

use clap::ValueEnum;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use vic3save::metrics::{construction_usage, military_scores};
use vic3save::CountryId;

use super::{effective, Report};
use crate::format::banner;
use crate::Analysis;

const SAVE_SUFFIX: &str = "_extracted.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// GDP as configured by --gdp
    #[default]
    Gdp,
    /// Effective GDP: domestic control plus investments abroad
    EffectiveGdp,
    /// Construction points drawn by queued projects
    Construction,
    /// Unit count weighted by average offense and defense
    Military,
}

impl Metric {
    fn title(self) -> &'static str {
        match self {
            Metric::Gdp => "GDP COMPARISON BETWEEN SESSIONS",
            Metric::EffectiveGdp => "EFFECTIVE GDP COMPARISON BETWEEN SESSIONS",
            Metric::Construction => "CONSTRUCTION COMPARISON BETWEEN SESSIONS",
            Metric::Military => "MILITARY SCORE COMPARISON BETWEEN SESSIONS",
        }
    }

    /// Text output shows money in millions and everything else as is.
    fn is_money(self) -> bool {
        matches!(self, Metric::Gdp | Metric::EffectiveGdp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    pub tag: String,
    pub first: f64,
    pub second: f64,
    pub net_change: f64,
    /// Relative to `first`; 0 when `first` is not positive.
    pub pct_change: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub metric: Metric,
    pub first_label: String,
    pub second_label: String,
    /// Largest percentage growth first.
    pub rows: Vec<Change>,
}

/// `saves/1870_extracted.json` → `1870`.
pub fn session_label(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    match name.strip_suffix(SAVE_SUFFIX) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}

/// Metric value per tag, for countries passing the human filter.
pub fn metric_values(analysis: &Analysis, metric: Metric) -> BTreeMap<String, f64> {
    match metric {
        Metric::Gdp => analysis
            .countries_by_gdp()
            .into_iter()
            .map(|(country, gdp)| (analysis.tag(country), gdp))
            .collect(),
        Metric::EffectiveGdp => effective::build(analysis)
            .countries
            .into_iter()
            .map(|c| (c.tag, c.total))
            .collect(),
        Metric::Construction => by_tag(analysis, construction_usage(&analysis.doc)),
        Metric::Military => by_tag(analysis, military_scores(&analysis.doc)),
    }
}

fn by_tag(analysis: &Analysis, values: BTreeMap<CountryId, f64>) -> BTreeMap<String, f64> {
    values
        .into_iter()
        .filter(|(country, _)| analysis.includes(*country))
        .map(|(country, value)| (analysis.tag(country), value))
        .collect()
}

pub fn build(
    metric: Metric,
    (first_label, first): (&str, &Analysis),
    (second_label, second): (&str, &Analysis),
) -> ComparisonReport {
    let before = metric_values(first, metric);
    let after = metric_values(second, metric);

    let mut tags: Vec<&String> = before.keys().chain(after.keys()).collect();
    tags.sort();
    tags.dedup();

    let mut rows: Vec<Change> = tags
        .into_iter()
        .filter_map(|tag| {
            let first = before.get(tag).copied().unwrap_or(0.0);
            let second = after.get(tag).copied().unwrap_or(0.0);
            if first <= 0.0 && second <= 0.0 {
                return None;
            }
            let net_change = second - first;
            let pct_change = if first > 0.0 {
                net_change / first * 100.0
            } else {
                0.0
            };
            Some(Change {
                tag: tag.clone(),
                first,
                second,
                net_change,
                pct_change,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.pct_change
            .partial_cmp(&a.pct_change)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.tag.cmp(&b.tag))
    });

    log::debug!(
        "Compared {} countries between {} and {}",
        rows.len(),
        first_label,
        second_label
    );

    ComparisonReport {
        metric,
        first_label: first_label.to_string(),
        second_label: second_label.to_string(),
        rows,
    }
}

fn column(label: &str) -> String {
    label.chars().take(9).collect()
}

impl Report for ComparisonReport {
    fn write_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", banner(self.metric.title(), 60))?;
        let unit = if self.metric.is_money() { " (millions)" } else { "" };
        writeln!(w, "Comparing: {} vs {}{}", self.first_label, self.second_label, unit)?;
        writeln!(w)?;
        writeln!(
            w,
            "| Rank | Tag  | {:^9} | {:^9} | {:^9} | {:^8} |",
            column(&self.first_label),
            column(&self.second_label),
            "Net",
            "% Chg"
        )?;
        writeln!(w, "|------|------|-----------|-----------|-----------|----------|")?;

        let (divisor, precision) = if self.metric.is_money() { (1e6, 1) } else { (1.0, 0) };
        for (rank, row) in self.rows.iter().enumerate() {
            writeln!(
                w,
                "| {:4} | {:4} | {:9.p$} | {:9.p$} | {:+9.p$} | {:7.1}% |",
                rank + 1,
                row.tag,
                row.first / divisor,
                row.second / divisor,
                row.net_change / divisor,
                row.pct_change,
                p = precision
            )?;
        }
        Ok(())
    }

    fn write_csv<W: Write>(&self, w: &mut csv::Writer<W>) -> csv::Result<()> {
        for row in &self.rows {
            w.serialize(row)?;
        }
        Ok(())
    }
}
