//! # Provider
//!
//! Provider defines external data interfaces for the crate.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::feed::{Coordinate, TripDelay, VehicleReport};

/// The `FeedSource` trait defines the behavior for fetching decoded feed
/// records from the upstream transit agency.
pub trait FeedSource: Send + Sync {
    /// Fetch the latest vehicle position reports.
    fn vehicle_positions(&self) -> impl Future<Output = Result<Vec<VehicleReport>>> + Send;

    /// Fetch the latest trip delay records.
    fn trip_delays(&self) -> impl Future<Output = Result<Vec<TripDelay>>> + Send;
}

/// The `RenderSurface` trait is implemented by the map widget that displays
/// vehicle markers and trails.
///
/// Operations on unknown ids are no-ops; the boolean results report whether
/// a marker was actually touched.
pub trait RenderSurface: Send {
    /// Place a new marker, replacing any marker already registered for `id`.
    fn add_marker(&mut self, id: &str, at: Coordinate);

    fn remove_marker(&mut self, id: &str) -> bool;

    fn move_marker(&mut self, id: &str, to: Coordinate) -> bool;

    /// Current on-screen coordinate of the marker.
    fn marker_position(&self, id: &str) -> Option<Coordinate>;

    fn marker_ids(&self) -> Vec<String>;

    /// Replace the trail drawn behind a vehicle.
    fn set_path(&mut self, id: &str, path: &[Coordinate]);

    fn clear_path(&mut self, id: &str) -> bool;
}

/// The `Clock` trait supplies time to the engine so that poll and frame
/// behaviour can be driven deterministically under test.
pub trait Clock: Send + Sync {
    /// Wall-clock time, compared against feed timestamps.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Monotonic seconds used to time marker transitions.
    fn monotonic_secs(&self) -> f64;

    /// Wall-clock time as seconds since the Unix epoch.
    fn unix_secs(&self) -> i64 {
        self.now_utc().timestamp()
    }
}
