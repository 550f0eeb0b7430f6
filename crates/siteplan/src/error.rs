// ---------------------------------------------------------------------------
// Error types for layout calls and per-item geometry failures
// ---------------------------------------------------------------------------

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;
use tracing::warn;

/// Failure of a single geometric item (one cell, one parcel, one road).
///
/// These never abort a call: they are collected in a [`SkipReport`] and the
/// remaining items are processed.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The operation produced no area or no vertices.
    EmptyResult,
    /// Input or output geometry is degenerate (too few vertices, zero length).
    Degenerate(String),
    /// A coordinate was NaN or infinite.
    NonFinite,
    /// The underlying geometry kernel panicked on this input.
    OperationPanicked(String),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::EmptyResult => write!(f, "operation produced an empty geometry"),
            GeometryError::Degenerate(msg) => write!(f, "degenerate geometry: {msg}"),
            GeometryError::NonFinite => write!(f, "non-finite coordinate"),
            GeometryError::OperationPanicked(msg) => {
                write!(f, "geometry kernel failed: {msg}")
            }
        }
    }
}

impl std::error::Error for GeometryError {}

/// Call-level failures surfaced to the caller as `{success: false, error}`.
#[derive(Debug)]
pub enum SiteError {
    /// Boundary geometry is not a Polygon or MultiPolygon.
    InvalidGeometryType(String),
    /// Input is not valid GeoJSON.
    InvalidGeoJson(String),
    /// Configuration could not be parsed or is inconsistent.
    InvalidConfig(String),
    /// The operation needs a boundary and none was supplied.
    MissingBoundary,
    /// The boundary holds no usable polygon at all.
    NoGeometry,
    /// The caller cancelled the run.
    Cancelled,
}

impl fmt::Display for SiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteError::InvalidGeometryType(found) => write!(
                f,
                "Invalid geometry type: {found}. Expected Polygon or MultiPolygon"
            ),
            SiteError::InvalidGeoJson(msg) => write!(f, "Invalid GeoJSON: {msg}"),
            SiteError::InvalidConfig(msg) => write!(f, "Invalid configuration: {msg}"),
            SiteError::MissingBoundary => write!(f, "A site boundary is required"),
            SiteError::NoGeometry => write!(f, "Boundary contains no usable polygon"),
            SiteError::Cancelled => write!(f, "Operation cancelled"),
        }
    }
}

impl std::error::Error for SiteError {}

impl From<serde_json::Error> for SiteError {
    fn from(e: serde_json::Error) -> Self {
        SiteError::InvalidConfig(e.to_string())
    }
}

impl From<geojson::Error> for SiteError {
    fn from(e: geojson::Error) -> Self {
        SiteError::InvalidGeoJson(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Skip report
// ---------------------------------------------------------------------------

/// One item that was dropped because its geometry operation failed.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedItem {
    pub stage: &'static str,
    pub index: usize,
    pub reason: String,
}

/// Items skipped during a call. Partial failure is the default policy, so
/// this is how callers learn what was lost.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SkipReport {
    pub items: Vec<SkippedItem>,
}

impl SkipReport {
    pub fn record(&mut self, stage: &'static str, index: usize, reason: &dyn fmt::Display) {
        warn!("{stage}: skipping item {index}: {reason}");
        self.items.push(SkippedItem {
            stage,
            index,
            reason: reason.to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn merge(&mut self, other: SkipReport) {
        self.items.extend(other.items);
    }
}

/// Run a geometry kernel, turning a panic into [`GeometryError::OperationPanicked`].
pub fn guarded<T>(op: impl FnOnce() -> T) -> Result<T, GeometryError> {
    catch_unwind(AssertUnwindSafe(op)).map_err(|payload| {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        GeometryError::OperationPanicked(msg)
    })
}
