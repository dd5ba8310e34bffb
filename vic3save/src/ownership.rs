//! Attribution of building ownership stakes to countries.
//!
//! Every ownership record names a building and an [`Identity`]. The building
//! sits in a state, and the state's owner is the **host** country. The
//! identity resolves to the **owner** country either directly (a government
//! stake) or through an owning building such as a company HQ or a financial
//! district, whose own state decides which country it belongs to.
//!
//! Resolution is total: a dangling reference anywhere along the way yields a
//! [`Skip`] instead of an error, so one inconsistent row never aborts a run.
//!
//! ## Valuation
//!
//! Stakes are valued with a fixed heuristic so numbers stay comparable with
//! older reports:
//!
//! | building has          | value                                          |
//! |-----------------------|------------------------------------------------|
//! | cash reserves > 0     | `cash_reserves * ratio`                        |
//! | weekly profit > 0     | `profit_after_reserves * 52 * ratio * 10`      |
//! | neither               | `levels * 50_000` (ratio not applied)          |
//!
//! where `ratio = levels / building levels`, or 0 for a zero-level building.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::save::{Building, Identity, OwnershipRecord, SaveDocument};
use crate::{BuildingId, CountryId, StateId};

/// Weeks per year used to annualise weekly profit.
pub const WEEKS_PER_YEAR: f64 = 52.0;
/// Capital value assumed per unit of annual profit.
pub const PROFIT_MULTIPLIER: f64 = 10.0;
/// Flat per-level value when a building has neither cash nor profit.
pub const FALLBACK_VALUE_PER_LEVEL: f64 = 50_000.0;

/// What kind of entity holds a stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EntityType {
    #[serde(rename = "Direct Government")]
    DirectGovernment,
    #[serde(rename = "Financial District")]
    FinancialDistrict,
    #[serde(rename = "Manor House")]
    ManorHouse,
    #[serde(rename = "Regional Company HQ")]
    RegionalCompanyHq,
    #[serde(rename = "Company")]
    Company,
    #[serde(rename = "Other Building")]
    OtherBuilding,
}

impl EntityType {
    /// Classify an owning building by its type tag.
    ///
    /// Case-insensitive substring match, first hit wins, so
    /// `building_regional_company_x` is a regional HQ rather than a company.
    pub fn classify(building_type: &str) -> Self {
        let tag = building_type.to_lowercase();
        if tag.contains("financial_district") {
            EntityType::FinancialDistrict
        } else if tag.contains("manor_house") {
            EntityType::ManorHouse
        } else if tag.contains("regional_company") {
            EntityType::RegionalCompanyHq
        } else if tag.contains("company") {
            EntityType::Company
        } else {
            EntityType::OtherBuilding
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityType::DirectGovernment => "Direct Government",
            EntityType::FinancialDistrict => "Financial District",
            EntityType::ManorHouse => "Manor House",
            EntityType::RegionalCompanyHq => "Regional Company HQ",
            EntityType::Company => "Company",
            EntityType::OtherBuilding => "Other Building",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a record produced no attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Skip {
    /// `levels <= 0`.
    NoLevels,
    /// Record names no building.
    NoTarget,
    /// Record has no usable identity.
    NoIdentity,
    MissingBuilding(BuildingId),
    /// Building has no `state` field.
    Unlocated(BuildingId),
    MissingState(StateId),
    /// State has no `country` field.
    Unowned(StateId),
}

impl Skip {
    /// Coarse reason, without IDs, for tallying.
    pub fn reason(self) -> &'static str {
        match self {
            Skip::NoLevels => "no levels",
            Skip::NoTarget => "no target building",
            Skip::NoIdentity => "no identity",
            Skip::MissingBuilding(_) => "missing building",
            Skip::Unlocated(_) => "building without state",
            Skip::MissingState(_) => "missing state",
            Skip::Unowned(_) => "state without owner",
        }
    }
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::MissingBuilding(id) | Skip::Unlocated(id) => write!(f, "{} ({})", self.reason(), id),
            Skip::MissingState(id) | Skip::Unowned(id) => write!(f, "{} ({})", self.reason(), id),
            _ => f.write_str(self.reason()),
        }
    }
}

/// The resolved holder of a stake.
#[derive(Debug, Clone, PartialEq)]
pub struct Owner {
    pub country: CountryId,
    pub entity_type: EntityType,
    /// Type tag of the owning building; `None` for direct government stakes.
    pub building_type: Option<String>,
}

/// A stake whose owner country differs from its host country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnershipEdge {
    pub owner: CountryId,
    pub host: CountryId,
    pub entity_type: EntityType,
    pub value: f64,
    pub levels: i64,
    /// Type tag of the owned building.
    pub building_type: String,
    /// Type tag of the owning building, if the stake is held through one.
    pub owner_building_type: Option<String>,
}

/// A stake held by the country that also hosts the building.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomesticStake {
    pub country: CountryId,
    pub entity_type: EntityType,
    pub value: f64,
    pub levels: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attribution {
    Foreign(OwnershipEdge),
    Domestic(DomesticStake),
}

/// Country whose territory contains `building`: building → state → owner.
pub fn locate_building(doc: &SaveDocument, building: BuildingId) -> Result<CountryId, Skip> {
    let record = doc.building(building).ok_or(Skip::MissingBuilding(building))?;
    locate(doc, building, record)
}

fn locate(doc: &SaveDocument, id: BuildingId, building: &Building) -> Result<CountryId, Skip> {
    let state_id = building.state.ok_or(Skip::Unlocated(id))?;
    let state = doc.state(state_id).ok_or(Skip::MissingState(state_id))?;
    state.country.ok_or(Skip::Unowned(state_id))
}

/// Host country of the building an ownership record targets.
pub fn resolve_host(doc: &SaveDocument, record: &OwnershipRecord) -> Result<CountryId, Skip> {
    let target = record.building.ok_or(Skip::NoTarget)?;
    locate_building(doc, target)
}

/// Owner country and entity type behind an identity.
pub fn resolve_owner(doc: &SaveDocument, identity: Identity) -> Result<Owner, Skip> {
    match identity {
        Identity::DirectCountry(country) => Ok(Owner {
            country,
            entity_type: EntityType::DirectGovernment,
            building_type: None,
        }),
        Identity::BuildingOwner(id) => {
            let building = doc.building(id).ok_or(Skip::MissingBuilding(id))?;
            let country = locate(doc, id, building)?;
            Ok(Owner {
                country,
                entity_type: EntityType::classify(&building.building),
                building_type: Some(building.building.clone()),
            })
        }
    }
}

/// Share of `building` represented by `levels`; 0 for a zero-level building.
pub fn ownership_ratio(building: &Building, levels: i64) -> f64 {
    if building.levels > 0 {
        levels as f64 / building.levels as f64
    } else {
        0.0
    }
}

/// Heuristic value of holding `levels` levels of `building`.
pub fn estimate_value(building: &Building, levels: i64) -> f64 {
    let ratio = ownership_ratio(building, levels);

    if building.cash_reserves > 0.0 {
        building.cash_reserves * ratio
    } else if building.profit_after_reserves > 0.0 {
        building.profit_after_reserves * WEEKS_PER_YEAR * ratio * PROFIT_MULTIPLIER
    } else {
        // Deliberately not scaled by ratio; matches the long-standing reports
        levels as f64 * FALLBACK_VALUE_PER_LEVEL
    }
}

/// Attribute a single ownership record.
pub fn attribute(doc: &SaveDocument, record: &OwnershipRecord) -> Result<Attribution, Skip> {
    if record.levels <= 0 {
        return Err(Skip::NoLevels);
    }
    let target_id = record.building.ok_or(Skip::NoTarget)?;
    let target = doc
        .building(target_id)
        .ok_or(Skip::MissingBuilding(target_id))?;
    let host = locate(doc, target_id, target)?;

    let identity = record.identity.ok_or(Skip::NoIdentity)?;
    let owner = resolve_owner(doc, identity)?;

    let value = estimate_value(target, record.levels);

    if owner.country == host {
        return Ok(Attribution::Domestic(DomesticStake {
            country: host,
            entity_type: owner.entity_type,
            value,
            levels: record.levels,
        }));
    }

    Ok(Attribution::Foreign(OwnershipEdge {
        owner: owner.country,
        host,
        entity_type: owner.entity_type,
        value,
        levels: record.levels,
        building_type: target.building.clone(),
        owner_building_type: owner.building_type,
    }))
}

/// Result of attributing every ownership record in a save.
#[derive(Debug, Clone, Default)]
pub struct Attributions {
    pub foreign: Vec<OwnershipEdge>,
    pub domestic: Vec<DomesticStake>,
    /// Count of skipped records per [`Skip::reason`].
    pub skipped: BTreeMap<&'static str, usize>,
}

impl Attributions {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// Attribute every ownership record, in record ID order.
pub fn attribute_all(doc: &SaveDocument) -> Attributions {
    let mut out = Attributions::default();

    for (id, record) in &doc.ownerships {
        match attribute(doc, record) {
            Ok(Attribution::Foreign(edge)) => out.foreign.push(edge),
            Ok(Attribution::Domestic(stake)) => out.domestic.push(stake),
            Err(skip) => {
                log::trace!("Ownership {} skipped: {}", id, skip);
                *out.skipped.entry(skip.reason()).or_default() += 1;
            }
        }
    }

    log::info!(
        "Attributed ownership: {} foreign, {} domestic, {} skipped",
        out.foreign.len(),
        out.domestic.len(),
        out.skipped_total()
    );
    for (reason, count) in &out.skipped {
        log::debug!("  skipped ({}): {}", reason, count);
    }

    out
}

#[cfg(test)]
#[path = "ownership_tests.rs"]
mod tests;
