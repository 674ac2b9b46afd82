//! # Reconcile
//!
//! Builds the next displayed vehicle set from the previous one and a freshly
//! merged poll.
//!
//! Vehicles that miss a single poll stay on the map so the feed's jitter does
//! not make markers blink; vehicles missing for longer than the configured
//! age are treated as out of service and removed. Vehicles already displayed
//! keep their relative order and new vehicles are appended after them.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use serde::Serialize;

use crate::config::secs;
use crate::models::MergedVehicle;

/// Counts describing how a poll changed the displayed set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSummary {
    /// Previously displayed vehicles refreshed by the poll.
    pub updated: usize,
    /// Previously displayed vehicles kept although absent from the poll.
    pub ghosts: usize,
    /// Previously displayed vehicles removed as stale.
    pub expired: usize,
    /// Vehicles displayed for the first time.
    pub added: usize,
}

/// Next displayed vehicle set.
///
/// `now` is seconds since the Unix epoch; a vehicle absent from `incoming`
/// survives while `now - timestamp < max_age`.
#[must_use]
pub fn reconcile(
    previous: &[MergedVehicle], incoming: &[MergedVehicle], now: i64, max_age: Duration,
) -> Vec<MergedVehicle> {
    reconcile_with_summary(previous, incoming, now, max_age).0
}

/// As [`reconcile`], also reporting what changed.
#[must_use]
pub fn reconcile_with_summary(
    previous: &[MergedVehicle], incoming: &[MergedVehicle], now: i64, max_age: Duration,
) -> (Vec<MergedVehicle>, ReconcileSummary) {
    let max_age = secs(max_age);
    let mut summary = ReconcileSummary::default();

    // last occurrence wins for duplicate ids
    let mut fresh: HashMap<&str, &MergedVehicle> =
        incoming.iter().map(|vehicle| (vehicle.id(), vehicle)).collect();

    let mut emitted: HashSet<&str> = HashSet::with_capacity(previous.len() + incoming.len());
    let mut next = Vec::with_capacity(previous.len().max(incoming.len()));

    for vehicle in previous {
        if emitted.contains(vehicle.id()) {
            continue;
        }
        if let Some(update) = fresh.remove(vehicle.id()) {
            emitted.insert(vehicle.id());
            next.push(update.clone());
            summary.updated += 1;
        } else if now.saturating_sub(vehicle.timestamp()) < max_age {
            emitted.insert(vehicle.id());
            next.push(vehicle.clone());
            summary.ghosts += 1;
        } else {
            summary.expired += 1;
        }
    }

    for vehicle in incoming {
        // each remaining id is emitted once, at its first position
        if let Some(update) = fresh.remove(vehicle.id()) {
            next.push(update.clone());
            summary.added += 1;
        }
    }

    (next, summary)
}
