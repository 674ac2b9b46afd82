#![allow(missing_docs)]
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use realtime::{Coordinate, FeedSource, RenderSurface, TripDelay, VehicleReport};

/// Scripted feed. Every poll returns the current script until it is changed.
#[derive(Clone, Default)]
pub struct MockFeed {
    inner: Arc<Mutex<Script>>,
}

#[derive(Default)]
struct Script {
    vehicles: Vec<VehicleReport>,
    delays: Vec<TripDelay>,
    vehicles_down: bool,
    delays_down: bool,
    requests: usize,
}

impl MockFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_vehicles(&self, vehicles: Vec<VehicleReport>) {
        let mut script = self.inner.lock().expect("should lock");
        script.vehicles = vehicles;
        script.vehicles_down = false;
    }

    pub fn set_delays(&self, delays: Vec<TripDelay>) {
        self.inner.lock().expect("should lock").delays = delays;
    }

    pub fn fail_vehicles(&self) {
        self.inner.lock().expect("should lock").vehicles_down = true;
    }

    pub fn fail_delays(&self) {
        self.inner.lock().expect("should lock").delays_down = true;
    }

    #[must_use]
    pub fn requests(&self) -> usize {
        self.inner.lock().expect("should lock").requests
    }
}

impl FeedSource for MockFeed {
    async fn vehicle_positions(&self) -> Result<Vec<VehicleReport>> {
        let mut script = self.inner.lock().expect("should lock");
        script.requests += 1;
        if script.vehicles_down {
            return Err(anyhow!("vehicle feed unavailable"));
        }
        Ok(script.vehicles.clone())
    }

    async fn trip_delays(&self) -> Result<Vec<TripDelay>> {
        let script = self.inner.lock().expect("should lock");
        if script.delays_down {
            return Err(anyhow!("trip updates unavailable"));
        }
        Ok(script.delays.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Add(String, Coordinate),
    Remove(String),
    Move(String, Coordinate),
    SetPath(String, usize),
    ClearPath(String),
}

/// Map surface that records every call made against it.
#[derive(Debug, Default)]
pub struct MockSurface {
    pub markers: BTreeMap<String, Coordinate>,
    pub paths: BTreeMap<String, Vec<Coordinate>>,
    pub calls: Vec<Call>,
}

impl MockSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn at(&self, id: &str) -> Option<Coordinate> {
        self.markers.get(id).copied()
    }

    #[must_use]
    pub fn moves(&self, id: &str) -> usize {
        self.calls.iter().filter(|call| matches!(call, Call::Move(moved, _) if moved == id)).count()
    }
}

impl RenderSurface for MockSurface {
    fn add_marker(&mut self, id: &str, at: Coordinate) {
        self.calls.push(Call::Add(id.to_string(), at));
        self.markers.insert(id.to_string(), at);
    }

    fn remove_marker(&mut self, id: &str) -> bool {
        self.calls.push(Call::Remove(id.to_string()));
        self.markers.remove(id).is_some()
    }

    fn move_marker(&mut self, id: &str, to: Coordinate) -> bool {
        let Some(marker) = self.markers.get_mut(id) else {
            return false;
        };
        *marker = to;
        self.calls.push(Call::Move(id.to_string(), to));
        true
    }

    fn marker_position(&self, id: &str) -> Option<Coordinate> {
        self.markers.get(id).copied()
    }

    fn marker_ids(&self) -> Vec<String> {
        self.markers.keys().cloned().collect()
    }

    fn set_path(&mut self, id: &str, path: &[Coordinate]) {
        self.calls.push(Call::SetPath(id.to_string(), path.len()));
        self.paths.insert(id.to_string(), path.to_vec());
    }

    fn clear_path(&mut self, id: &str) -> bool {
        self.calls.push(Call::ClearPath(id.to_string()));
        self.paths.remove(id).is_some()
    }
}

#[must_use]
pub fn report(id: &str, latitude: f64, longitude: f64, timestamp: i64) -> VehicleReport {
    VehicleReport::new(id, latitude, longitude, timestamp)
}
