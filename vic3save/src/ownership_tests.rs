//! Unit tests for ownership attribution and valuation.

use super::*;
use crate::save::{Building, Country, State};

/// Small in-memory save: countries, states at 10*country, and whatever
/// buildings/ownerships a test adds.
struct Fixture {
    doc: SaveDocument,
}

impl Fixture {
    fn new(countries: &[(u64, &str)]) -> Self {
        let mut doc = SaveDocument::default();
        for &(id, tag) in countries {
            doc.countries.insert(
                CountryId(id),
                Country {
                    definition: Some(tag.to_string()),
                    ..Default::default()
                },
            );
            doc.states.insert(
                StateId(id * 10),
                State {
                    country: Some(CountryId(id)),
                },
            );
        }
        Self { doc }
    }

    fn building(mut self, id: u64, tag: &str, country: u64, levels: i64, cash: f64, profit: f64) -> Self {
        self.doc.buildings.insert(
            BuildingId(id),
            Building {
                building: tag.to_string(),
                state: Some(StateId(country * 10)),
                levels,
                cash_reserves: cash,
                profit_after_reserves: profit,
            },
        );
        self
    }

    fn owns(mut self, id: u64, target: u64, levels: i64, identity: Identity) -> Self {
        self.doc.ownerships.insert(
            crate::OwnershipId(id),
            OwnershipRecord {
                building: Some(BuildingId(target)),
                levels,
                identity: Some(identity),
            },
        );
        self
    }

    fn record(&self, id: u64) -> &OwnershipRecord {
        &self.doc.ownerships[&crate::OwnershipId(id)]
    }
}

fn foreign(result: Result<Attribution, Skip>) -> OwnershipEdge {
    match result {
        Ok(Attribution::Foreign(edge)) => edge,
        other => panic!("expected foreign edge, got {:?}", other),
    }
}

// -------------------------------------------------------------------------
// Classification
// -------------------------------------------------------------------------

#[test]
fn test_classify_priority_order() {
    assert_eq!(
        EntityType::classify("building_financial_district"),
        EntityType::FinancialDistrict
    );
    assert_eq!(EntityType::classify("building_manor_house"), EntityType::ManorHouse);
    assert_eq!(
        EntityType::classify("building_regional_company_east_india"),
        EntityType::RegionalCompanyHq
    );
    assert_eq!(
        EntityType::classify("building_company_us_steel"),
        EntityType::Company
    );
    assert_eq!(EntityType::classify("building_iron_mine"), EntityType::OtherBuilding);
    assert_eq!(EntityType::classify(""), EntityType::OtherBuilding);
}

#[test]
fn test_classify_case_insensitive() {
    assert_eq!(
        EntityType::classify("Building_Financial_District"),
        EntityType::FinancialDistrict
    );
    assert_eq!(EntityType::classify("BUILDING_COMPANY_BASIC"), EntityType::Company);
}

// -------------------------------------------------------------------------
// Valuation
// -------------------------------------------------------------------------

#[test]
fn test_value_from_cash_reserves() {
    let b = Building {
        levels: 10,
        cash_reserves: 1000.0,
        profit_after_reserves: 99.0,
        ..Default::default()
    };
    assert_eq!(estimate_value(&b, 4), 400.0);
}

#[test]
fn test_value_from_profit() {
    let b = Building {
        levels: 5,
        profit_after_reserves: 100.0,
        ..Default::default()
    };
    // 100 * 52 * (2/5) * 10
    assert!((estimate_value(&b, 2) - 20_800.0).abs() < 1e-9);
}

#[test]
fn test_value_fallback_ignores_ratio() {
    let b = Building {
        levels: 30,
        ..Default::default()
    };
    assert_eq!(estimate_value(&b, 3), 150_000.0);
}

#[test]
fn test_zero_level_building_ratio() {
    let b = Building {
        levels: 0,
        cash_reserves: 5000.0,
        ..Default::default()
    };
    assert_eq!(ownership_ratio(&b, 3), 0.0);
    assert_eq!(estimate_value(&b, 3), 0.0);
}

#[test]
fn test_negative_cash_falls_through_to_profit() {
    let b = Building {
        levels: 1,
        cash_reserves: -10.0,
        profit_after_reserves: 1.0,
        ..Default::default()
    };
    assert_eq!(estimate_value(&b, 1), 520.0);
}

// -------------------------------------------------------------------------
// Attribution scenarios
// -------------------------------------------------------------------------

#[test]
fn test_direct_government_ownership() {
    let fx = Fixture::new(&[(1, "GBR"), (2, "FRA")])
        .building(100, "building_textile_mills", 2, 10, 1000.0, 0.0)
        .owns(1, 100, 4, Identity::DirectCountry(CountryId(1)));

    let edge = foreign(attribute(&fx.doc, fx.record(1)));
    assert_eq!(edge.owner, CountryId(1));
    assert_eq!(edge.host, CountryId(2));
    assert_eq!(edge.entity_type, EntityType::DirectGovernment);
    assert_eq!(edge.value, 400.0);
    assert_eq!(edge.levels, 4);
    assert_eq!(edge.building_type, "building_textile_mills");
    assert_eq!(edge.owner_building_type, None);
}

#[test]
fn test_indirect_company_ownership() {
    let fx = Fixture::new(&[(1, "USA"), (2, "MEX")])
        .building(200, "building_company_basic_metal", 1, 1, 0.0, 0.0)
        .building(300, "building_iron_mine", 2, 5, 0.0, 100.0)
        .owns(1, 300, 2, Identity::BuildingOwner(BuildingId(200)));

    let edge = foreign(attribute(&fx.doc, fx.record(1)));
    assert_eq!(edge.owner, CountryId(1));
    assert_eq!(edge.host, CountryId(2));
    assert_eq!(edge.entity_type, EntityType::Company);
    assert!((edge.value - 100.0 * 52.0 * (2.0 / 5.0) * 10.0).abs() < 1e-9);
    assert_eq!(
        edge.owner_building_type.as_deref(),
        Some("building_company_basic_metal")
    );
}

#[test]
fn test_fallback_valuation_through_financial_district() {
    let fx = Fixture::new(&[(1, "GBR"), (2, "ARG")])
        .building(10, "building_financial_district", 1, 3, 0.0, 0.0)
        .building(20, "building_railway", 2, 8, 0.0, 0.0)
        .owns(1, 20, 3, Identity::BuildingOwner(BuildingId(10)));

    let edge = foreign(attribute(&fx.doc, fx.record(1)));
    assert_eq!(edge.entity_type, EntityType::FinancialDistrict);
    assert_eq!(edge.value, 150_000.0);
}

#[test]
fn test_domestic_stake_is_not_an_edge() {
    let fx = Fixture::new(&[(1, "PRU")])
        .building(10, "building_manor_house", 1, 1, 0.0, 0.0)
        .building(20, "building_rye_farm", 1, 4, 200.0, 0.0)
        .owns(1, 20, 2, Identity::BuildingOwner(BuildingId(10)))
        .owns(2, 20, 2, Identity::DirectCountry(CountryId(1)));

    for id in [1, 2] {
        match attribute(&fx.doc, fx.record(id)) {
            Ok(Attribution::Domestic(stake)) => {
                assert_eq!(stake.country, CountryId(1));
                assert_eq!(stake.value, 100.0);
            }
            other => panic!("expected domestic stake, got {:?}", other),
        }
    }

    let all = attribute_all(&fx.doc);
    assert!(all.foreign.is_empty());
    assert_eq!(all.domestic.len(), 2);
}

#[test]
fn test_owner_building_abroad_decides_owner_country() {
    // A company HQ physically in country 2 investing into country 3
    // belongs to country 2, whoever founded it.
    let fx = Fixture::new(&[(1, "GBR"), (2, "IND"), (3, "PER")])
        .building(10, "building_regional_company_east_india", 2, 1, 0.0, 0.0)
        .building(20, "building_oil_rig", 3, 2, 0.0, 0.0)
        .owns(1, 20, 1, Identity::BuildingOwner(BuildingId(10)));

    let edge = foreign(attribute(&fx.doc, fx.record(1)));
    assert_eq!(edge.owner, CountryId(2));
    assert_eq!(edge.entity_type, EntityType::RegionalCompanyHq);
}

// -------------------------------------------------------------------------
// Skips
// -------------------------------------------------------------------------

#[test]
fn test_skip_non_positive_levels() {
    let fx = Fixture::new(&[(1, "GBR"), (2, "FRA")])
        .building(100, "building_port", 2, 1, 0.0, 0.0)
        .owns(1, 100, 0, Identity::DirectCountry(CountryId(1)))
        .owns(2, 100, -3, Identity::DirectCountry(CountryId(1)));

    assert_eq!(attribute(&fx.doc, fx.record(1)), Err(Skip::NoLevels));
    assert_eq!(attribute(&fx.doc, fx.record(2)), Err(Skip::NoLevels));
}

#[test]
fn test_skip_dangling_references() {
    let mut fx = Fixture::new(&[(1, "GBR"), (2, "FRA")])
        .building(100, "building_port", 2, 1, 0.0, 0.0)
        .owns(1, 999, 1, Identity::DirectCountry(CountryId(1)))
        .owns(2, 100, 1, Identity::BuildingOwner(BuildingId(555)));

    // Building in a state that doesn't exist
    fx.doc.buildings.insert(
        BuildingId(101),
        Building {
            state: Some(StateId(77)),
            levels: 1,
            ..Default::default()
        },
    );
    // Building with no state at all
    fx.doc.buildings.insert(
        BuildingId(102),
        Building {
            levels: 1,
            ..Default::default()
        },
    );
    // State with no owner
    fx.doc.states.insert(StateId(88), State { country: None });
    fx.doc.buildings.insert(
        BuildingId(103),
        Building {
            state: Some(StateId(88)),
            levels: 1,
            ..Default::default()
        },
    );
    let fx = fx
        .owns(3, 101, 1, Identity::DirectCountry(CountryId(1)))
        .owns(4, 102, 1, Identity::DirectCountry(CountryId(1)))
        .owns(5, 103, 1, Identity::DirectCountry(CountryId(1)));

    assert_eq!(
        attribute(&fx.doc, fx.record(1)),
        Err(Skip::MissingBuilding(BuildingId(999)))
    );
    assert_eq!(
        attribute(&fx.doc, fx.record(2)),
        Err(Skip::MissingBuilding(BuildingId(555)))
    );
    assert_eq!(
        attribute(&fx.doc, fx.record(3)),
        Err(Skip::MissingState(StateId(77)))
    );
    assert_eq!(
        attribute(&fx.doc, fx.record(4)),
        Err(Skip::Unlocated(BuildingId(102)))
    );
    assert_eq!(
        attribute(&fx.doc, fx.record(5)),
        Err(Skip::Unowned(StateId(88)))
    );

    let all = attribute_all(&fx.doc);
    assert!(all.foreign.is_empty());
    assert_eq!(all.skipped_total(), 5);
    assert_eq!(all.skipped["missing building"], 2);
}

#[test]
fn test_skip_missing_identity() {
    let mut fx = Fixture::new(&[(1, "GBR"), (2, "FRA")]).building(100, "building_port", 2, 1, 0.0, 0.0);
    fx.doc.ownerships.insert(
        crate::OwnershipId(1),
        OwnershipRecord {
            building: Some(BuildingId(100)),
            levels: 1,
            identity: None,
        },
    );
    assert_eq!(attribute(&fx.doc, fx.record(1)), Err(Skip::NoIdentity));
}

#[test]
fn test_resolve_host_and_owner() {
    let fx = Fixture::new(&[(1, "GBR"), (2, "FRA")])
        .building(10, "building_manor_house", 1, 1, 0.0, 0.0)
        .building(100, "building_port", 2, 1, 0.0, 0.0)
        .owns(1, 100, 1, Identity::BuildingOwner(BuildingId(10)));

    assert_eq!(resolve_host(&fx.doc, fx.record(1)), Ok(CountryId(2)));
    let owner = resolve_owner(&fx.doc, Identity::BuildingOwner(BuildingId(10))).unwrap();
    assert_eq!(owner.country, CountryId(1));
    assert_eq!(owner.entity_type, EntityType::ManorHouse);
}

// -------------------------------------------------------------------------
// Whole-document properties
// -------------------------------------------------------------------------

fn mixed_fixture() -> Fixture {
    Fixture::new(&[(1, "GBR"), (2, "FRA"), (3, "PRU")])
        .building(10, "building_financial_district", 1, 2, 0.0, 0.0)
        .building(11, "building_company_steel", 3, 1, 0.0, 0.0)
        .building(20, "building_steel_mills", 2, 10, 5000.0, 0.0)
        .building(21, "building_coal_mine", 3, 4, 0.0, 25.0)
        .building(22, "building_railway", 1, 6, 0.0, 0.0)
        .owns(1, 20, 3, Identity::BuildingOwner(BuildingId(10)))
        .owns(2, 21, 2, Identity::DirectCountry(CountryId(1)))
        .owns(3, 22, 1, Identity::BuildingOwner(BuildingId(11)))
        .owns(4, 20, 2, Identity::DirectCountry(CountryId(2)))
        .owns(5, 21, 2, Identity::BuildingOwner(BuildingId(11)))
}

#[test]
fn test_edges_are_foreign_and_non_negative() {
    let fx = mixed_fixture();
    let all = attribute_all(&fx.doc);

    assert_eq!(all.foreign.len(), 3);
    assert_eq!(all.domestic.len(), 2);
    for edge in &all.foreign {
        assert_ne!(edge.owner, edge.host);
        assert!(edge.value >= 0.0);
    }
}

#[test]
fn test_attribution_is_idempotent() {
    let fx = mixed_fixture();
    let first = attribute_all(&fx.doc);
    let second = attribute_all(&fx.doc);

    assert_eq!(first.foreign, second.foreign);
    assert_eq!(first.domestic, second.domestic);
    assert_eq!(first.skipped, second.skipped);
}
