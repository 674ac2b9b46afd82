//! # History
//!
//! Bounded position trail per vehicle.

use std::collections::HashSet;

use realtime::Coordinate;

use crate::config::{HistoryConfig, secs};
use crate::models::{HistoryPoint, MergedVehicle, VehicleHistory};

/// Fold a merged poll into the trail history.
///
/// A position is appended only when it differs from the vehicle's last stored
/// point, each trail keeps its most recent `max_points` points, and points
/// older than `max_age` are dropped. No two consecutive points share a
/// position, and no vehicle is left with an empty trail. Trails of vehicles
/// missing from `merged` linger until their newest point ages out. The input
/// is left untouched.
#[must_use]
pub fn update_history(
    history: &VehicleHistory, merged: &[MergedVehicle], now: i64, config: &HistoryConfig,
) -> VehicleHistory {
    let max_age = secs(config.max_age);
    let is_young = |point: &HistoryPoint| now.saturating_sub(point.timestamp) < max_age;

    let mut next = history.clone();

    for vehicle in merged {
        let trail = next.entry(vehicle.id().to_string()).or_default();
        let point = HistoryPoint::from(vehicle);

        let moved = trail.last().is_none_or(|last| !last.coordinate().same_as(&point.coordinate()));
        if moved {
            trail.push(point);
            if trail.len() > config.max_points {
                let excess = trail.len() - config.max_points;
                trail.drain(..excess);
            }
        }

        prune(trail, is_young);
    }

    let current: HashSet<&str> = merged.iter().map(MergedVehicle::id).collect();
    next.retain(|id, trail| {
        if !current.contains(id.as_str()) {
            prune(trail, is_young);
        }
        !trail.is_empty()
    });

    next
}

// Out-of-order timestamps can leave equal neighbours once a stale point goes.
fn prune(trail: &mut Vec<HistoryPoint>, is_young: impl Fn(&HistoryPoint) -> bool) {
    trail.retain(is_young);
    trail.dedup_by(|later, earlier| later.coordinate().same_as(&earlier.coordinate()));
}

/// Path-layer coordinates for one vehicle, oldest first.
///
/// Returns `None` when there are fewer than two points to draw.
#[must_use]
pub fn trail(history: &VehicleHistory, id: &str) -> Option<Vec<Coordinate>> {
    let points = history.get(id)?;
    if points.len() < 2 {
        return None;
    }
    Some(points.iter().map(HistoryPoint::coordinate).collect())
}
