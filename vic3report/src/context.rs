use std::collections::BTreeMap;

use vic3save::aggregate::OwnershipLedger;
use vic3save::gdp::{gdp_table, GdpSource};
use vic3save::humans::HumanFilter;
use vic3save::ownership::{attribute_all, Attributions};
use vic3save::subjects::SubjectGraph;
use vic3save::{CountryId, SaveDocument};

/// Everything the reports read, computed once per run.
pub struct Analysis {
    pub doc: SaveDocument,
    pub subjects: SubjectGraph,
    pub attributions: Attributions,
    pub ledger: OwnershipLedger,
    pub gdp: BTreeMap<CountryId, f64>,
    pub gdp_source: GdpSource,
    /// `None` unless human-only output was requested and the file loaded.
    pub humans: Option<HumanFilter>,
}

impl Analysis {
    pub fn new(doc: SaveDocument, gdp_source: GdpSource, humans: Option<HumanFilter>) -> Self {
        let subjects = SubjectGraph::from_pacts(doc.pacts.values());
        let attributions = attribute_all(&doc);
        let ledger = OwnershipLedger::from_attributions(&attributions);
        let gdp = gdp_table(&doc, gdp_source);

        log::info!(
            "Analysis ready: {} countries with GDP ({:?}), {} overlords",
            gdp.len(),
            gdp_source,
            subjects.iter().count()
        );

        Self {
            doc,
            subjects,
            attributions,
            ledger,
            gdp,
            gdp_source,
            humans,
        }
    }

    pub fn tag(&self, country: CountryId) -> String {
        self.doc.country_tag(country)
    }

    pub fn gdp(&self, country: CountryId) -> f64 {
        self.gdp.get(&country).copied().unwrap_or(0.0)
    }

    /// Whether `country` passes the human filter, if one is active.
    pub fn includes(&self, country: CountryId) -> bool {
        match &self.humans {
            Some(filter) => filter.allows(&self.tag(country)),
            None => true,
        }
    }

    /// Countries with positive GDP that pass the filter, largest GDP first.
    pub fn countries_by_gdp(&self) -> Vec<(CountryId, f64)> {
        let mut rows: Vec<(CountryId, f64)> = self
            .gdp
            .iter()
            .filter(|(c, g)| **g > 0.0 && self.includes(**c))
            .map(|(c, g)| (*c, *g))
            .collect();
        rows.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        rows
    }
}
