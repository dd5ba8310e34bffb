//! Power blocs with their members' GDP; subjects count towards their
//! overlord's bloc.

use serde::Serialize;
use std::io::Write;

use vic3save::blocs::{group_blocs, BlocMember};

use super::Report;
use crate::format::{banner, format_identity, format_money, format_principle, percent};
use crate::Analysis;

pub const INDEPENDENT: &str = "Independent";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberRow {
    pub tag: String,
    pub gdp: f64,
    /// `Leader`, `Member` or `Subject of <TAG>`.
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlocRow {
    pub name: String,
    /// Display form, e.g. `Trade League`.
    pub identity: String,
    pub principles: Vec<String>,
    pub founding_date: Option<String>,
    pub mandate_progress: f64,
    pub leader: Option<String>,
    pub total_gdp: f64,
    pub members: Vec<MemberRow>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BlocReport {
    pub blocs: Vec<BlocRow>,
    pub independent: Vec<MemberRow>,
    /// GDP of every country listed, for share-of-world figures.
    pub world_gdp: f64,
}

#[derive(Serialize)]
struct BlocCsvRow<'a> {
    bloc: &'a str,
    identity: &'a str,
    tag: &'a str,
    gdp: f64,
    role: &'a str,
}

fn member_row(analysis: &Analysis, member: &BlocMember) -> MemberRow {
    let role = if member.is_leader {
        "Leader".to_string()
    } else if let Some(overlord) = member.overlord {
        format!("Subject of {}", analysis.tag(overlord))
    } else {
        "Member".to_string()
    };
    MemberRow {
        tag: analysis.tag(member.country),
        gdp: member.gdp,
        role,
    }
}

/// With a human filter, only blocs with at least one human member are kept.
pub fn build(analysis: &Analysis) -> BlocReport {
    let overview = group_blocs(&analysis.doc, &analysis.subjects, &analysis.gdp);

    let blocs: Vec<BlocRow> = overview
        .blocs
        .iter()
        .filter(|b| b.members.iter().any(|m| analysis.includes(m.country)))
        .map(|b| BlocRow {
            name: b.name.clone(),
            identity: format_identity(&b.identity),
            principles: b.principles.iter().map(|p| format_principle(p)).collect(),
            founding_date: b.founding_date.clone(),
            mandate_progress: b.mandate_progress,
            leader: b.leader.map(|l| analysis.tag(l)),
            total_gdp: b.total_gdp(),
            members: b.members.iter().map(|m| member_row(analysis, m)).collect(),
        })
        .collect();

    let independent: Vec<MemberRow> = overview
        .independent
        .iter()
        .filter(|(c, _)| analysis.includes(*c))
        .map(|&(c, gdp)| MemberRow {
            tag: analysis.tag(c),
            gdp,
            role: INDEPENDENT.to_string(),
        })
        .collect();

    let world_gdp = blocs.iter().map(|b| b.total_gdp).sum::<f64>()
        + independent.iter().map(|m| m.gdp).sum::<f64>();

    BlocReport {
        blocs,
        independent,
        world_gdp,
    }
}

impl Report for BlocReport {
    fn write_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", banner("POWER BLOC REPORT", 80))?;

        for bloc in &self.blocs {
            writeln!(w)?;
            writeln!(
                w,
                "{} ({}) - {} ({:.1}% of listed GDP), {} members",
                bloc.name,
                bloc.identity,
                format_money(bloc.total_gdp),
                percent(bloc.total_gdp, self.world_gdp),
                bloc.members.len()
            )?;
            if let Some(leader) = &bloc.leader {
                writeln!(w, "Leader: {}", leader)?;
            }
            writeln!(w, "Founded: {}", bloc.founding_date.as_deref().unwrap_or("Unknown"))?;
            writeln!(w, "Mandate Progress: {:.1}", bloc.mandate_progress)?;
            if !bloc.principles.is_empty() {
                writeln!(w, "Principles:")?;
                for principle in &bloc.principles {
                    writeln!(w, "  - {}", principle)?;
                }
            }
            writeln!(w, "{}", "-".repeat(60))?;
            for m in &bloc.members {
                writeln!(w, "  {:<6} {:>12}  {}", m.tag, format_money(m.gdp), m.role)?;
            }
        }

        if !self.independent.is_empty() {
            let total: f64 = self.independent.iter().map(|m| m.gdp).sum();
            writeln!(w)?;
            writeln!(
                w,
                "{} - {} ({:.1}% of listed GDP), {} countries",
                INDEPENDENT,
                format_money(total),
                percent(total, self.world_gdp),
                self.independent.len()
            )?;
            writeln!(w, "{}", "-".repeat(60))?;
            for m in &self.independent {
                writeln!(w, "  {:<6} {:>12}", m.tag, format_money(m.gdp))?;
            }
        }
        Ok(())
    }

    fn write_csv<W: Write>(&self, w: &mut csv::Writer<W>) -> csv::Result<()> {
        let blocs = self
            .blocs
            .iter()
            .flat_map(|b| {
                b.members
                    .iter()
                    .map(move |m| (b.name.as_str(), b.identity.as_str(), m))
            });
        let independent = self.independent.iter().map(|m| (INDEPENDENT, "", m));

        for (bloc, identity, m) in blocs.chain(independent) {
            w.serialize(BlocCsvRow {
                bloc,
                identity,
                tag: &m.tag,
                gdp: m.gdp,
                role: &m.role,
            })?;
        }
        Ok(())
    }
}
