use std::collections::{BTreeMap, HashMap, HashSet};

use realtime::{Coordinate, RenderSurface};
use tracing::{debug, trace};

use crate::animation::state::{AnimationState, Sample};
use crate::config::AnimationConfig;
use crate::models::{MarkerUpdate, MergedVehicle};

/// What [`MotionAnimator::set_transition`] did with a report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// First sighting; the marker was placed at the reported position.
    Placed,
    /// The report repeats the previous position.
    Unchanged,
    /// Animation is off; the marker jumped to the reported position.
    Jumped,
    /// A transition of the given length (seconds) was started.
    Started(f64),
}

#[derive(Debug, Clone, Copy)]
struct LastReport {
    coordinate: Coordinate,
    timestamp: i64,
}

/// Per-vehicle marker interpolation between polls.
///
/// Each vehicle is either idle, with its marker resting at the last reported
/// position, or animating towards it. The animator only ever moves markers
/// through the [`RenderSurface`] it is handed and reads the on-screen
/// position back from it whenever a transition starts, so an interrupted
/// transition continues from wherever the marker actually is.
#[derive(Debug)]
pub struct MotionAnimator {
    config: AnimationConfig,
    enabled: bool,
    active: BTreeMap<String, AnimationState>,
    reports: HashMap<String, LastReport>,
}

impl MotionAnimator {
    #[must_use]
    pub fn new(config: AnimationConfig) -> Self {
        let enabled = config.enabled;
        Self { config, enabled, active: BTreeMap::new(), reports: HashMap::new() }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// No transition is in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn state(&self, id: &str) -> Option<&AnimationState> {
        self.active.get(id)
    }

    /// React to a vehicle's latest reconciled report.
    pub fn set_transition<S: RenderSurface + ?Sized>(
        &mut self, surface: &mut S, vehicle: &MergedVehicle, now: f64,
    ) -> Transition {
        let id = vehicle.id();
        let target = vehicle.coordinate();
        let timestamp = vehicle.timestamp();

        let Some(on_screen) = surface.marker_position(id) else {
            surface.add_marker(id, target);
            self.active.remove(id);
            self.reports.insert(id.to_string(), LastReport { coordinate: target, timestamp });
            return Transition::Placed;
        };

        let previous = self.reports.insert(id.to_string(), LastReport { coordinate: target, timestamp });
        let last_reported = previous.map_or(on_screen, |report| report.coordinate);
        if last_reported.same_as(&target) {
            return Transition::Unchanged;
        }

        if !self.enabled {
            self.active.remove(id);
            surface.move_marker(id, target);
            return Transition::Jumped;
        }

        if on_screen.same_as(&target) {
            self.active.remove(id);
            return Transition::Unchanged;
        }

        let delta = self.config.delta_secs(previous.map(|report| report.timestamp), timestamp);
        let duration = self.config.duration_secs(delta);
        self.active.insert(id.to_string(), AnimationState::new(on_screen, target, now, duration));

        trace!(vehicle_id = %id, delta, duration, "transition started");
        Transition::Started(duration)
    }

    /// Apply a reconciled vehicle set to the surface.
    ///
    /// Markers for vehicles no longer in `vehicles` are removed along with any
    /// transition they had; every remaining vehicle goes through
    /// [`Self::set_transition`] in order.
    pub fn sync<S: RenderSurface + ?Sized>(
        &mut self, surface: &mut S, vehicles: &[MergedVehicle], now: f64,
    ) -> usize {
        let current: HashSet<&str> = vehicles.iter().map(MergedVehicle::id).collect();

        for id in surface.marker_ids() {
            if !current.contains(id.as_str()) {
                surface.remove_marker(&id);
                self.forget(&id);
            }
        }
        self.reports.retain(|id, _| current.contains(id.as_str()));

        vehicles
            .iter()
            .filter(|vehicle| matches!(self.set_transition(surface, vehicle, now), Transition::Started(_)))
            .count()
    }

    /// Advance every transition to `now`, moving markers on the surface.
    ///
    /// Finished transitions land exactly on their destination and retire. A
    /// transition whose marker has disappeared from the surface is dropped.
    pub fn on_animation_tick<S: RenderSurface + ?Sized>(
        &mut self, surface: &mut S, now: f64,
    ) -> Vec<MarkerUpdate> {
        let min_span = self.config.min_span;
        let mut updates = Vec::with_capacity(self.active.len());

        self.active.retain(|id, state| {
            let (coordinate, done) = match state.sample(now, min_span) {
                Sample::Moving(at) => (at, false),
                Sample::Arrived(at) => (at, true),
            };
            if !surface.move_marker(id, coordinate) {
                debug!(vehicle_id = %id, "marker gone, dropping transition");
                return false;
            }
            updates.push(MarkerUpdate { id: id.clone(), coordinate });
            !done
        });

        updates
    }

    /// Turn animation on or off.
    ///
    /// Switching off lands every animating marker on its destination and
    /// clears all transitions.
    pub fn set_enabled<S: RenderSurface + ?Sized>(
        &mut self, surface: &mut S, enabled: bool,
    ) -> Vec<MarkerUpdate> {
        self.enabled = enabled;
        if enabled {
            return Vec::new();
        }

        let updates = std::mem::take(&mut self.active)
            .into_iter()
            .filter(|(id, state)| surface.move_marker(id, state.to))
            .map(|(id, state)| MarkerUpdate { id, coordinate: state.to })
            .collect::<Vec<_>>();

        debug!(snapped = updates.len(), "animation disabled");
        updates
    }

    /// Drop everything known about a vehicle.
    pub fn forget(&mut self, id: &str) {
        self.active.remove(id);
        self.reports.remove(id);
    }
}
