//! # Feed records
//!
//! Typed records produced by a feed adapter after decoding the raw vehicle
//! position and trip update feeds.

use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Whether both components are finite and inside the WGS84 range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Exact component-wise equality.
    ///
    /// Positions re-emitted by the feed are compared bit-for-bit; no
    /// tolerance is applied.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn same_as(&self, other: &Self) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }
}

const fn missing_coordinate() -> f64 {
    f64::NAN
}

/// Vehicle position report as decoded from the vehicle positions feed.
///
/// A feed adapter that cannot resolve a coordinate leaves it unset
/// (non-finite); such reports are dropped before reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleReport {
    pub id: String,
    #[serde(default = "missing_coordinate")]
    pub latitude: f64,
    #[serde(default = "missing_coordinate")]
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f32>,
    /// Ground speed in metres per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stop_sequence: Option<u32>,
}

impl VehicleReport {
    /// Minimal report used by adapters and tests; optional fields are unset.
    #[must_use]
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64, timestamp: i64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            bearing: None,
            speed: None,
            trip_id: None,
            route_id: None,
            label: None,
            timestamp,
            current_status: None,
            stop_id: None,
            current_stop_sequence: None,
        }
    }

    #[must_use]
    pub fn with_trip(mut self, trip_id: impl Into<String>) -> Self {
        self.trip_id = Some(trip_id.into());
        self
    }

    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Schedule deviation for a trip, from the trip updates feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDelay {
    pub trip_id: String,
    /// Signed seconds; positive means late.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}
