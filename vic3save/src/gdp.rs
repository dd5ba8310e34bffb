//! Country GDP, either as stored by the game or derived from credit.
//!
//! The stored figure is the last sample of the newest GDP channel. The
//! derived figure inverts the credit-limit define:
//! `credit = MIN_CREDIT_BASE + building cash reserves + GDP * CREDIT_SCALE`.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::ownership::locate_building;
use crate::save::{Country, SaveDocument};
use crate::CountryId;

/// `COUNTRY_MIN_CREDIT_BASE`
pub const MIN_CREDIT_BASE: f64 = 100_000.0;
/// `COUNTRY_MIN_CREDIT_SCALED`
pub const CREDIT_SCALE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GdpSource {
    /// Latest value of the game's GDP time series.
    #[default]
    Stored,
    /// Reconstructed from the country's credit limit.
    Credit,
}

/// Latest stored GDP: the newest channel's last sample, else a bare scalar,
/// else 0.
pub fn stored_gdp(country: &Country) -> f64 {
    country
        .gdp
        .channels
        .values()
        .filter_map(|c| c.0.as_ref())
        .max_by_key(|c| c.index)
        .and_then(|c| c.values.last().copied())
        .or(country.gdp.scalar)
        .unwrap_or(0.0)
}

/// Cash reserves of all buildings located in each country.
pub fn building_reserves(doc: &SaveDocument) -> BTreeMap<CountryId, f64> {
    let mut reserves = BTreeMap::new();
    for (id, building) in &doc.buildings {
        if building.cash_reserves <= 0.0 {
            continue;
        }
        if let Ok(country) = locate_building(doc, *id) {
            *reserves.entry(country).or_default() += building.cash_reserves;
        }
    }
    reserves
}

/// GDP per country from `source`, keeping only positive values.
pub fn gdp_table(doc: &SaveDocument, source: GdpSource) -> BTreeMap<CountryId, f64> {
    let table: BTreeMap<CountryId, f64> = match source {
        GdpSource::Stored => doc
            .countries
            .iter()
            .map(|(id, c)| (*id, stored_gdp(c)))
            .filter(|(_, gdp)| *gdp > 0.0)
            .collect(),
        GdpSource::Credit => {
            let reserves = building_reserves(doc);
            doc.countries
                .iter()
                .filter(|(_, c)| c.budget.credit > 0.0)
                .map(|(id, c)| {
                    let held = reserves.get(id).copied().unwrap_or(0.0);
                    (*id, (c.budget.credit - MIN_CREDIT_BASE - held) / CREDIT_SCALE)
                })
                .filter(|(_, gdp)| *gdp > 0.0)
                .collect()
        }
    };
    log::debug!("GDP ({:?}): {} countries with positive GDP", source, table.len());
    table
}
