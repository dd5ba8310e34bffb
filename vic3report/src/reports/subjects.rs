//! Overlords with their direct and transitive subjects.

use serde::Serialize;
use std::io::Write;

use vic3save::CountryId;

use super::Report;
use crate::format::banner;
use crate::Analysis;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlordRow {
    pub tag: String,
    /// Immediate subjects, each listed once.
    pub direct: Vec<String>,
    /// Subjects of subjects, in discovery order.
    pub indirect: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SubjectReport {
    pub overlords: Vec<OverlordRow>,
}

#[derive(Serialize)]
struct SubjectCsvRow<'a> {
    overlord: &'a str,
    subject: &'a str,
    relation: &'static str,
}

/// Overlords by number of subjects, then tag.
pub fn build(analysis: &Analysis) -> SubjectReport {
    let graph = &analysis.subjects;

    let mut overlords: Vec<OverlordRow> = graph
        .iter()
        .filter(|(overlord, _)| analysis.includes(*overlord))
        .map(|(overlord, all)| {
            let mut direct: Vec<CountryId> = Vec::new();
            for &s in graph.direct_subjects(overlord) {
                if !direct.contains(&s) && s != overlord {
                    direct.push(s);
                }
            }
            let indirect = all.iter().filter(|s| !direct.contains(*s));
            OverlordRow {
                tag: analysis.tag(overlord),
                indirect: indirect.map(|&s| analysis.tag(s)).collect(),
                direct: direct.iter().map(|&s| analysis.tag(s)).collect(),
            }
        })
        .collect();

    overlords.sort_by(|a, b| {
        let count = |r: &OverlordRow| r.direct.len() + r.indirect.len();
        count(b).cmp(&count(a)).then_with(|| a.tag.cmp(&b.tag))
    });

    SubjectReport { overlords }
}

impl Report for SubjectReport {
    fn write_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", banner("SUBJECT RELATIONSHIPS", 60))?;
        if self.overlords.is_empty() {
            writeln!(w)?;
            writeln!(w, "No subject relationships found.")?;
        }
        for row in &self.overlords {
            writeln!(w)?;
            writeln!(w, "{}", row.tag)?;
            writeln!(w, "  Direct:   {}", row.direct.join(", "))?;
            if !row.indirect.is_empty() {
                writeln!(w, "  Indirect: {}", row.indirect.join(", "))?;
            }
        }
        Ok(())
    }

    fn write_csv<W: Write>(&self, w: &mut csv::Writer<W>) -> csv::Result<()> {
        for row in &self.overlords {
            let direct = row.direct.iter().map(|s| (s, "direct"));
            let indirect = row.indirect.iter().map(|s| (s, "indirect"));
            for (subject, relation) in direct.chain(indirect) {
                w.serialize(SubjectCsvRow {
                    overlord: &row.tag,
                    subject,
                    relation,
                })?;
            }
        }
        Ok(())
    }
}
