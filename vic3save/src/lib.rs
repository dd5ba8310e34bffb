//! Typed view over an extracted (JSON) Victoria 3 save, plus the analysis
//! passes the report tooling is built on:
//!
//! - [`save`]: loading the document into typed tables
//! - [`subjects`]: overlord → subject graph with transitive closure
//! - [`ownership`]: resolving who owns each building stake, and where
//! - [`aggregate`]: folding ownership edges into per-country totals
//! - [`gdp`], [`blocs`], [`humans`], [`metrics`]: supporting lookups

pub mod aggregate;
pub mod blocs;
pub mod error;
pub mod gdp;
pub mod humans;
pub mod metrics;
pub mod ownership;
pub mod save;
pub mod subjects;

use serde::{Deserialize, Serialize};

pub use error::LoadError;
pub use save::SaveDocument;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Hash, Eq, PartialEq, Clone, Copy, Debug, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                $name(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Key into `country_manager.database`.
    CountryId
);
entity_id!(
    /// Key into `states.database`.
    StateId
);
entity_id!(
    /// Key into `building_manager.database`.
    BuildingId
);
entity_id!(
    /// Key into `building_ownership_manager.database`.
    OwnershipId
);
entity_id!(PactId);
entity_id!(PowerBlocId);
entity_id!(
    /// Key into `military_formation_manager.database`.
    FormationId
);
entity_id!(CombatUnitId);
