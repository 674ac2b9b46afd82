//! # Merge
//!
//! Joins vehicle position reports with trip delay records.

use std::collections::HashMap;

use realtime::{TripDelay, VehicleReport};
use tracing::debug;

use crate::models::MergedVehicle;

/// Attach each report's trip delay, preserving report order.
///
/// When several delay records share a trip id the last one wins. Reports
/// without a usable coordinate are dropped here so they never reach
/// reconciliation.
#[must_use]
pub fn merge(vehicles: Vec<VehicleReport>, delays: &[TripDelay]) -> Vec<MergedVehicle> {
    let by_trip: HashMap<&str, Option<i32>> =
        delays.iter().map(|update| (update.trip_id.as_str(), update.delay)).collect();

    vehicles
        .into_iter()
        .filter(|report| {
            let valid = report.coordinate().is_valid();
            if !valid {
                debug!(vehicle_id = %report.id, "dropping report without a usable position");
            }
            valid
        })
        .map(|report| {
            let delay = report.trip_id.as_deref().and_then(|trip| by_trip.get(trip).copied()).flatten();
            MergedVehicle::new(report, delay)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn report(id: &str, trip: Option<&str>) -> VehicleReport {
        let mut report = VehicleReport::new(id, 48.0, 0.2, 1_700_000_000);
        report.trip_id = trip.map(ToString::to_string);
        report
    }

    fn delay(trip: &str, secs: Option<i32>) -> TripDelay {
        TripDelay { trip_id: trip.to_string(), delay: secs, timestamp: None }
    }

    #[test]
    fn attaches_delay_by_trip() {
        let merged = merge(
            vec![report("a", Some("t1")), report("b", Some("t2")), report("c", None)],
            &[delay("t2", Some(-30)), delay("t1", Some(120))],
        );

        let delays: Vec<_> = merged.iter().map(|v| (v.id(), v.delay)).collect();
        assert_eq!(delays, vec![("a", Some(120)), ("b", Some(-30)), ("c", None)]);
    }

    #[test]
    fn last_duplicate_trip_wins() {
        let merged =
            merge(vec![report("a", Some("t1"))], &[delay("t1", Some(60)), delay("t1", Some(90))]);

        assert_eq!(merged[0].delay, Some(90));
    }

    #[test]
    fn unknown_trip_has_no_delay() {
        let merged = merge(vec![report("a", Some("t9"))], &[delay("t1", Some(60))]);
        assert_eq!(merged[0].delay, None);
    }

    #[test]
    fn preserves_count_and_fields() {
        let mut full = report("a", Some("t1"));
        full.bearing = Some(270.0);
        full.speed = Some(8.5);
        full.route_id = Some("T2".to_string());
        full.label = Some("1042".to_string());
        full.current_status = Some("IN_TRANSIT_TO".to_string());
        full.stop_id = Some("STOP-17".to_string());
        full.current_stop_sequence = Some(4);
        let vehicles = vec![full, report("b", None), report("c", Some("t1"))];

        let merged = merge(vehicles.clone(), &[delay("t1", Some(45))]);

        assert_eq!(merged.len(), vehicles.len());
        for (vehicle, original) in merged.iter().zip(&vehicles) {
            assert_eq!(&vehicle.report, original);
        }
    }

    #[test]
    fn drops_reports_without_position() {
        let mut missing = report("a", None);
        missing.latitude = f64::NAN;

        let merged = merge(vec![missing, report("b", None)], &[]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id(), "b");
    }

    #[test]
    fn empty_inputs() {
        assert!(merge(Vec::new(), &[delay("t1", Some(1))]).is_empty());
    }
}
