//! Per-country scalar metrics besides GDP: construction in use and a rough
//! military strength score.

use std::collections::BTreeMap;

use crate::save::SaveDocument;
use crate::CountryId;

/// Average of offense and defense per combat unit type.
pub const UNIT_STRENGTH: &[(&str, f64)] = &[
    ("combat_unit_type_irregular_infantry", 10.0),
    ("combat_unit_type_line_infantry", 22.5),
    ("combat_unit_type_skirmish_infantry", 30.0),
    ("combat_unit_type_trench_infantry", 35.0),
    ("combat_unit_type_squad_infantry", 45.0),
    ("combat_unit_type_mechanized_infantry", 55.0),
    ("combat_unit_type_cannon_artillery", 20.0),
    ("combat_unit_type_mobile_artillery", 22.5),
    ("combat_unit_type_shrapnel_artillery", 35.0),
    ("combat_unit_type_siege_artillery", 42.5),
    ("combat_unit_type_heavy_tank", 52.5),
    ("combat_unit_type_hussars", 12.5),
    ("combat_unit_type_dragoons", 22.5),
    ("combat_unit_type_cuirassiers", 22.5),
    ("combat_unit_type_lancers", 25.0),
    ("combat_unit_type_light_tanks", 45.0),
    ("combat_unit_type_frigate", 12.5),
    ("combat_unit_type_monitor", 25.0),
    ("combat_unit_type_destroyer", 35.0),
    ("combat_unit_type_torpedo_boat", 35.0),
    ("combat_unit_type_scout_cruiser", 50.0),
    ("combat_unit_type_man_o_war", 25.0),
    ("combat_unit_type_ironclad", 50.0),
    ("combat_unit_type_dreadnought", 80.0),
    ("combat_unit_type_battleship", 100.0),
    ("combat_unit_type_submarine", 40.0),
    ("combat_unit_type_carrier", 90.0),
];

pub fn unit_strength(unit_type: &str) -> Option<f64> {
    UNIT_STRENGTH
        .iter()
        .find(|(tag, _)| *tag == unit_type)
        .map(|(_, strength)| *strength)
}

/// Construction points drawn by the government and private queues.
/// Countries with nothing queued are left out.
pub fn construction_usage(doc: &SaveDocument) -> BTreeMap<CountryId, f64> {
    doc.countries
        .iter()
        .map(|(id, c)| {
            let used = c.government_queue.used_construction() + c.private_queue.used_construction();
            (*id, used)
        })
        .filter(|(_, used)| *used > 0.0)
        .collect()
}

/// Sum of unit strengths over every unit in the country's formations.
/// Unknown unit types and units without a formation count for nothing.
pub fn military_scores(doc: &SaveDocument) -> BTreeMap<CountryId, f64> {
    let mut scores: BTreeMap<CountryId, f64> = BTreeMap::new();
    let mut unknown = 0usize;

    for unit in doc.combat_units.values() {
        let Some(country) = unit
            .formation
            .and_then(|f| doc.formations.get(&f))
            .and_then(|f| f.country)
        else {
            continue;
        };
        match unit_strength(&unit.unit_type) {
            Some(strength) => *scores.entry(country).or_default() += strength,
            None => unknown += 1,
        }
    }

    if unknown > 0 {
        log::debug!("{} combat units of unknown type ignored", unknown);
    }
    scores.retain(|_, score| *score > 0.0);
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAVE: &str = r#"{
        "country_manager": { "database": {
            "1": { "definition": "GBR",
                   "government_queue": { "construction_elements": [
                       { "base_construction_speed": 12.5 }, { "base_construction_speed": "7.5" }, "none"
                   ]},
                   "private_queue": { "construction_elements": [ { "base_construction_speed": 5 } ] } },
            "2": { "definition": "FRA", "government_queue": { "construction_elements": [] } },
            "3": { "definition": "PRU", "private_queue": "none" }
        }},
        "military_formation_manager": { "database": {
            "50": { "country": 1 },
            "51": { "country": 2 },
            "52": { "country": 1 }
        }},
        "new_combat_unit_manager": { "database": {
            "1": { "formation": 50, "type": "combat_unit_type_line_infantry" },
            "2": { "formation": 50, "type": "combat_unit_type_line_infantry" },
            "3": { "formation": 52, "type": "combat_unit_type_ironclad" },
            "4": { "formation": 51, "type": "combat_unit_type_imaginary" },
            "5": { "formation": 99, "type": "combat_unit_type_battleship" },
            "6": { "type": "combat_unit_type_battleship" }
        }}
    }"#;

    #[test]
    fn test_construction_usage() {
        let doc = SaveDocument::from_json_str(SAVE).unwrap();
        let usage = construction_usage(&doc);
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[&CountryId(1)], 25.0);
    }

    #[test]
    fn test_military_scores() {
        let doc = SaveDocument::from_json_str(SAVE).unwrap();
        let scores = military_scores(&doc);
        // Two line infantry and an ironclad; FRA's only unit is unknown
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[&CountryId(1)], 95.0);
    }

    #[test]
    fn test_unit_strength_lookup() {
        assert_eq!(unit_strength("combat_unit_type_carrier"), Some(90.0));
        assert_eq!(unit_strength("carrier"), None);
    }
}
