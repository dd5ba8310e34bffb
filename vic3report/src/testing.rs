use vic3save::gdp::GdpSource;
use vic3save::humans::HumanFilter;
use vic3save::SaveDocument;

use crate::Analysis;

/// GBR(1) and FRA(2) in an Entente bloc, CAN(4) a GBR dominion, USA(3)
/// independent. Shared with the CLI tests.
pub const SAMPLE_SAVE: &str = include_str!("../tests/fixtures/sample_extracted.json");

pub fn sample_analysis() -> Analysis {
    let doc = SaveDocument::from_json_str(SAMPLE_SAVE).unwrap();
    Analysis::new(doc, GdpSource::Stored, None)
}

pub fn sample_analysis_for(humans: &str) -> Analysis {
    let doc = SaveDocument::from_json_str(SAMPLE_SAVE).unwrap();
    Analysis::new(doc, GdpSource::Stored, Some(HumanFilter::parse(humans)))
}

pub fn render_text<R: crate::Report>(report: &R) -> String {
    let mut out = Vec::new();
    report.write_text(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

pub fn render_csv<R: crate::Report>(report: &R) -> String {
    let mut out = Vec::new();
    crate::render(report, crate::OutputFormat::Csv, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}
