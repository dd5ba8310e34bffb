//! Loading an extracted save into typed tables.
//!
//! The extractor writes every game database as `{ "database": { "<id>": {..} } }`.
//! Deleted rows show up as bare strings (`"none"`), and the shape of a row
//! drifts between game versions, so every table is read leniently: a row that
//! does not fit is dropped and counted, and a missing section is an empty table.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::{
    BuildingId, CombatUnitId, CountryId, FormationId, LoadError, OwnershipId, PactId, PowerBlocId,
    StateId,
};

pub const COUNTRY_SECTION: &str = "country_manager";
pub const STATE_SECTION: &str = "states";
pub const BUILDING_SECTION: &str = "building_manager";
pub const OWNERSHIP_SECTION: &str = "building_ownership_manager";
pub const PACT_SECTION: &str = "pacts";
pub const POWER_BLOC_SECTION: &str = "power_bloc_manager";
pub const FORMATION_SECTION: &str = "military_formation_manager";
pub const COMBAT_UNIT_SECTION: &str = "new_combat_unit_manager";

/// Suffix the extraction step gives converted saves.
pub const EXTRACTED_SUFFIX: &str = "_extracted.json";

/// Integer ID → record, ordered by ID so every pass over a table is deterministic.
pub type Table<K, V> = BTreeMap<K, V>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Country {
    /// Country tag, e.g. "GBR".
    #[serde(deserialize_with = "lenient_or_default")]
    pub definition: Option<String>,
    #[serde(deserialize_with = "lenient_or_default")]
    pub budget: Budget,
    pub gdp: GdpHistory,
    /// Bloc this country is a core member of.
    #[serde(deserialize_with = "lenient_or_default")]
    pub power_bloc_as_core: Option<PowerBlocId>,
    #[serde(deserialize_with = "lenient_or_default")]
    pub government_queue: ConstructionQueue,
    #[serde(deserialize_with = "lenient_or_default")]
    pub private_queue: ConstructionQueue,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConstructionQueue {
    pub construction_elements: Vec<Lenient<ConstructionElement>>,
}

impl ConstructionQueue {
    /// Construction points the queued projects are drawing.
    pub fn used_construction(&self) -> f64 {
        self.construction_elements
            .iter()
            .filter_map(|e| e.0.as_ref())
            .map(|e| e.base_construction_speed)
            .sum()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConstructionElement {
    #[serde(deserialize_with = "lenient_f64")]
    pub base_construction_speed: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Budget {
    #[serde(deserialize_with = "lenient_f64")]
    pub credit: f64,
}

/// GDP time series. Freshly formed countries sometimes carry a bare number
/// (or nothing usable) instead of channels.
#[derive(Debug, Clone, Default)]
pub struct GdpHistory {
    pub channels: BTreeMap<String, Lenient<GdpChannel>>,
    pub scalar: Option<f64>,
}

impl<'de> Deserialize<'de> for GdpHistory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Default, Deserialize)]
        #[serde(default)]
        struct Series {
            channels: BTreeMap<String, Lenient<GdpChannel>>,
        }

        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => GdpHistory {
                channels: BTreeMap::new(),
                scalar: n.as_f64(),
            },
            value @ Value::Object(_) => GdpHistory {
                channels: Series::deserialize(value)
                    .map(|s| s.channels)
                    .unwrap_or_default(),
                scalar: None,
            },
            _ => GdpHistory::default(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GdpChannel {
    pub index: i64,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct State {
    pub country: Option<CountryId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Building {
    /// Building type tag, e.g. "building_financial_district".
    pub building: String,
    pub state: Option<StateId>,
    #[serde(deserialize_with = "lenient_i64")]
    pub levels: i64,
    #[serde(deserialize_with = "lenient_f64")]
    pub cash_reserves: f64,
    /// Weekly profit left over after cash reserves are topped up.
    #[serde(deserialize_with = "lenient_f64")]
    pub profit_after_reserves: f64,
}

/// A claim of `levels` levels of `building` held by `identity`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OwnershipRecord {
    pub building: Option<BuildingId>,
    #[serde(deserialize_with = "lenient_i64")]
    pub levels: i64,
    pub identity: Option<Identity>,
}

/// Who holds an ownership stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawIdentity")]
pub enum Identity {
    /// The government of a country holds the stake directly.
    DirectCountry(CountryId),
    /// A building (company, financial district, manor house, ...) holds it.
    BuildingOwner(BuildingId),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawIdentity {
    country: Option<CountryId>,
    building: Option<BuildingId>,
}

impl TryFrom<RawIdentity> for Identity {
    type Error = String;

    fn try_from(raw: RawIdentity) -> Result<Self, Self::Error> {
        match (raw.country, raw.building) {
            (Some(country), _) => Ok(Identity::DirectCountry(country)),
            (None, Some(building)) => Ok(Identity::BuildingOwner(building)),
            (None, None) => Err("identity has neither country nor building".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Pact {
    pub action: String,
    pub targets: PactTargets,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PactTargets {
    pub first: Option<CountryId>,
    pub second: Option<CountryId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PowerBloc {
    pub status: String,
    pub leader: Option<CountryId>,
    /// Either `{ "custom": .. }` or `{ "name": { "custom": .. } }`.
    pub name: Value,
    /// e.g. `identity_trade_league`.
    #[serde(deserialize_with = "lenient_or_default")]
    pub identity: String,
    /// Either `{ "value": [..] }` or a bare list.
    pub principles: Value,
    #[serde(deserialize_with = "lenient_or_default")]
    pub founding_date: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub mandate_progress: f64,
}

impl PowerBloc {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    pub fn custom_name(&self) -> Option<&str> {
        let name = self.name.get("name").unwrap_or(&self.name);
        name.get("custom").and_then(Value::as_str)
    }

    /// Principle keys in save order.
    pub fn principles(&self) -> Vec<String> {
        let list = self.principles.get("value").unwrap_or(&self.principles);
        list.as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Formation {
    pub country: Option<CountryId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CombatUnit {
    pub formation: Option<FormationId>,
    /// e.g. `combat_unit_type_line_infantry`.
    #[serde(rename = "type", deserialize_with = "lenient_or_default")]
    pub unit_type: String,
}

/// The tables of an extracted save that the analysis passes read.
#[derive(Debug, Clone, Default)]
pub struct SaveDocument {
    pub countries: Table<CountryId, Country>,
    pub states: Table<StateId, State>,
    pub buildings: Table<BuildingId, Building>,
    pub ownerships: Table<OwnershipId, OwnershipRecord>,
    pub pacts: Table<PactId, Pact>,
    pub power_blocs: Table<PowerBlocId, PowerBloc>,
    pub formations: Table<FormationId, Formation>,
    pub combat_units: Table<CombatUnitId, CombatUnit>,
}

impl SaveDocument {
    /// Build the typed tables from an already-parsed document.
    pub fn from_value(root: &Value) -> Result<Self, LoadError> {
        if !root.is_object() {
            return Err(LoadError::NotAnObject);
        }

        let doc = SaveDocument {
            countries: read_table(root, COUNTRY_SECTION),
            states: read_table(root, STATE_SECTION),
            buildings: read_table(root, BUILDING_SECTION),
            ownerships: read_table(root, OWNERSHIP_SECTION),
            pacts: read_table(root, PACT_SECTION),
            power_blocs: read_table(root, POWER_BLOC_SECTION),
            formations: read_table(root, FORMATION_SECTION),
            combat_units: read_table(root, COMBAT_UNIT_SECTION),
        };

        log::info!(
            "Loaded {} countries, {} states, {} buildings, {} ownership records, {} pacts, {} power blocs, {} combat units",
            doc.countries.len(),
            doc.states.len(),
            doc.buildings.len(),
            doc.ownerships.len(),
            doc.pacts.len(),
            doc.power_blocs.len(),
            doc.combat_units.len()
        );

        Ok(doc)
    }

    pub fn from_json_str(text: &str) -> Result<Self, LoadError> {
        let root: Value = serde_json::from_str(text)?;
        Self::from_value(&root)
    }

    pub fn country(&self, id: CountryId) -> Option<&Country> {
        self.countries.get(&id)
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(&id)
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(&id)
    }

    /// Country tag, or `ID_<id>` when the country is unknown or untagged.
    pub fn country_tag(&self, id: CountryId) -> String {
        self.country(id)
            .and_then(|c| c.definition.as_deref())
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("ID_{}", id))
    }

    /// Reverse tag lookup (first match in ID order).
    pub fn find_country(&self, tag: &str) -> Option<CountryId> {
        self.countries
            .iter()
            .find(|(_, c)| c.definition.as_deref() == Some(tag))
            .map(|(id, _)| *id)
    }
}

/// Load and parse an extracted save file.
pub fn load_save(path: &Path) -> Result<SaveDocument, LoadError> {
    log::info!("Loading save file: {}", path.display());

    let file = fs::File::open(path).map_err(|e| LoadError::io(path, e))?;
    let root: Value = serde_json::from_reader(BufReader::new(file))?;

    SaveDocument::from_value(&root)
}

/// Most recently modified `*_extracted.json` in `dir`.
pub fn latest_save(dir: &Path) -> Result<PathBuf, LoadError> {
    let entries = fs::read_dir(dir).map_err(|e| LoadError::io(dir, e))?;

    let mut latest: Option<(std::time::SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(|e| LoadError::io(dir, e))?;
        let path = entry.path();
        let is_extracted = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(EXTRACTED_SUFFIX));
        if !is_extracted {
            continue;
        }

        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .map_err(|e| LoadError::io(&path, e))?;
        if latest.as_ref().map_or(true, |(best, _)| modified > *best) {
            latest = Some((modified, path));
        }
    }

    latest
        .map(|(_, path)| path)
        .ok_or_else(|| LoadError::NoSaveFound(dir.to_path_buf()))
}

fn read_table<K, V>(root: &Value, section: &str) -> Table<K, V>
where
    K: From<u64> + Ord,
    V: DeserializeOwned,
{
    let Some(database) = root
        .get(section)
        .and_then(|s| s.get("database"))
        .and_then(Value::as_object)
    else {
        log::debug!("Section {} missing, treating as empty", section);
        return Table::new();
    };

    let mut table = Table::new();
    let mut skipped = 0usize;
    for (key, entry) in database {
        let Ok(id) = key.trim().parse::<u64>() else {
            skipped += 1;
            continue;
        };
        if !entry.is_object() {
            skipped += 1;
            continue;
        }
        match V::deserialize(entry) {
            Ok(record) => {
                table.insert(K::from(id), record);
            }
            Err(e) => {
                log::debug!("{}[{}] does not fit: {}", section, key, e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        log::debug!("{}: kept {}, skipped {}", section, table.len(), skipped);
    }
    table
}

/// A value that is `None` when the underlying JSON does not fit `T`,
/// instead of failing the enclosing record.
#[derive(Debug, Clone, Default)]
pub struct Lenient<T>(pub Option<T>);

impl<'de, T: DeserializeOwned> Deserialize<'de> for Lenient<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Lenient(T::deserialize(value).ok()))
    }
}

/// Default instead of failing the record when a field has the wrong shape.
fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Numbers occasionally arrive as floats or quoted strings.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}
