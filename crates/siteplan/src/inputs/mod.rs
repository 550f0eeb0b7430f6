//! Typed inputs and their normalization from loosely-keyed JSON.
//!
//! Callers hand in dictionaries whose keys may be snake_case or camelCase
//! (`greenSpace` vs `green_space`). Everything is parsed once, here, into
//! typed structs; the engines never look at raw JSON.

pub mod design;
pub mod subdivision;
pub mod terrain;
pub mod zoning;

pub use design::{ConnectorMode, DesignParameters, PathfindingMode, SynthesisLimits};
pub use subdivision::{LotSize, ResolvedSubdivision, SubdivisionConfig, SubdivisionMethod};
pub use terrain::{SlopeSummary, TerrainData};
pub use zoning::{Zone, ZoneType, ZoningData};

/// Treat JSON `null` as "use every default".
pub(crate) fn or_empty_object(value: &serde_json::Value) -> serde_json::Value {
    if value.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        value.clone()
    }
}
