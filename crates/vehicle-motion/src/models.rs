use std::collections::BTreeMap;

use realtime::{Coordinate, VehicleReport};
use serde::{Deserialize, Serialize};

/// A vehicle report enriched with its trip's schedule delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedVehicle {
    #[serde(flatten)]
    pub report: VehicleReport,
    /// Signed seconds; positive means late. `None` when the trip has no update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<i32>,
}

impl MergedVehicle {
    #[must_use]
    pub const fn new(report: VehicleReport, delay: Option<i32>) -> Self {
        Self { report, delay }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.report.id
    }

    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        self.report.coordinate()
    }

    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.report.timestamp
    }
}

impl From<VehicleReport> for MergedVehicle {
    fn from(report: VehicleReport) -> Self {
        Self { report, delay: None }
    }
}

/// One stored trail position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: i64,
}

impl HistoryPoint {
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

impl From<&MergedVehicle> for HistoryPoint {
    fn from(vehicle: &MergedVehicle) -> Self {
        Self {
            latitude: vehicle.report.latitude,
            longitude: vehicle.report.longitude,
            timestamp: vehicle.report.timestamp,
        }
    }
}

/// Trail positions per vehicle id, oldest first.
pub type VehicleHistory = BTreeMap<String, Vec<HistoryPoint>>;

/// A marker position produced by an animation tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerUpdate {
    pub id: String,
    pub coordinate: Coordinate,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn merged_vehicle_wire_shape() {
        let mut report = VehicleReport::new("v1", -36.85, 174.76, 1_700_000_000);
        report.trip_id = Some("t1".to_string());
        let vehicle = MergedVehicle::new(report, Some(-30));

        let value = serde_json::to_value(&vehicle).expect("should serialize");

        assert_eq!(value["id"], json!("v1"));
        assert_eq!(value["tripId"], json!("t1"));
        assert_eq!(value["delay"], json!(-30));
        assert_eq!(value["timestamp"], json!(1_700_000_000));

        let back: MergedVehicle = serde_json::from_value(value).expect("should deserialize");
        assert_eq!(back, vehicle);
    }

    #[test]
    fn missing_delay_is_omitted() {
        let vehicle = MergedVehicle::from(VehicleReport::new("v1", 1.0, 2.0, 3));
        let value = serde_json::to_value(&vehicle).expect("should serialize");
        assert!(value.get("delay").is_none());
    }
}
