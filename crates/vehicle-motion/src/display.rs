//! # Display
//!
//! The live map: everything the view layer owns, behind a single lock.
//!
//! Polls and animation frames both go through [`LiveMap`], so a poll landing
//! mid-frame can never interleave with a tick. Feed requests are made by the
//! caller before it takes the lock.

use std::collections::HashSet;
use std::sync::Arc;

use realtime::{RenderSurface, TripDelay, VehicleReport};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::animation::MotionAnimator;
use crate::config::Config;
use crate::frame_loop::{FrameLease, FrameLoop};
use crate::history::{trail, update_history};
use crate::merge::merge;
use crate::models::{MarkerUpdate, MergedVehicle, VehicleHistory};
use crate::reconcile::{ReconcileSummary, reconcile_with_summary};

/// The live map shared between the poller, the frame loop and readers.
pub type SharedMap<S> = Arc<Mutex<LiveMap<S>>>;

/// Feed health as seen by the poller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollStatus {
    pub polls: u64,
    /// Unix seconds of the last completed poll.
    pub last_poll: Option<i64>,
    /// Vehicle feed error from the last poll, cleared on success.
    pub last_error: Option<String>,
    /// No poll has completed yet.
    pub loading: bool,
}

/// What one poll did to the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOutcome {
    #[serde(flatten)]
    pub summary: ReconcileSummary,
    pub vehicles: usize,
    pub transitions: usize,
    pub trails: usize,
}

#[derive(Debug)]
pub struct LiveMap<S> {
    config: Config,
    surface: S,
    vehicles: Arc<Vec<MergedVehicle>>,
    history: Arc<VehicleHistory>,
    animator: MotionAnimator,
    frames: FrameLoop,
    trails: HashSet<String>,
    status: PollStatus,
}

impl<S: RenderSurface> LiveMap<S> {
    pub fn new(config: Config, surface: S) -> Self {
        let animator = MotionAnimator::new(config.animation.clone());
        let frames = FrameLoop::new(config.frame_interval);
        Self {
            config,
            surface,
            vehicles: Arc::default(),
            history: Arc::default(),
            animator,
            frames,
            trails: HashSet::new(),
            status: PollStatus { loading: true, ..PollStatus::default() },
        }
    }

    /// Wrap in the shared handle used by the poller and frame loop.
    pub fn shared(self) -> SharedMap<S> {
        Arc::new(Mutex::new(self))
    }

    /// Apply one poll's results.
    ///
    /// A failed vehicle fetch is passed in as an empty `reports` list together
    /// with its `error`, so vehicles still age out while the feed is down.
    pub fn apply_poll(
        &mut self, reports: Vec<VehicleReport>, delays: &[TripDelay], now_unix: i64, now_mono: f64,
        error: Option<String>,
    ) -> PollOutcome {
        let merged = merge(reports, delays);
        let (next, summary) =
            reconcile_with_summary(&self.vehicles, &merged, now_unix, self.config.max_vehicle_age);
        let history = update_history(&self.history, &merged, now_unix, &self.config.history);

        let transitions = self.animator.sync(&mut self.surface, &next, now_mono);
        let trails = self.draw_trails(&history);

        let outcome = PollOutcome { summary, vehicles: next.len(), transitions, trails };
        self.vehicles = Arc::new(next);
        self.history = Arc::new(history);

        self.status.polls += 1;
        self.status.last_poll = Some(now_unix);
        self.status.last_error = error;
        self.status.loading = false;

        info!(
            vehicles = outcome.vehicles,
            updated = summary.updated,
            ghosts = summary.ghosts,
            expired = summary.expired,
            added = summary.added,
            transitions,
            "poll applied"
        );
        outcome
    }

    fn draw_trails(&mut self, history: &VehicleHistory) -> usize {
        let mut drawn = HashSet::with_capacity(history.len());
        for id in history.keys() {
            if let Some(path) = trail(history, id) {
                self.surface.set_path(id, &path);
                drawn.insert(id.clone());
            }
        }
        for stale in self.trails.difference(&drawn) {
            self.surface.clear_path(stale);
        }
        self.trails = drawn;
        self.trails.len()
    }

    /// Advance animations to `now` (monotonic seconds).
    pub fn tick(&mut self, now: f64) -> Vec<MarkerUpdate> {
        self.animator.on_animation_tick(&mut self.surface, now)
    }

    /// Turn animation on or off; switching off lands every marker at once.
    pub fn set_animation(&mut self, enabled: bool) -> Vec<MarkerUpdate> {
        let updates = self.animator.set_enabled(&mut self.surface, enabled);
        if !enabled {
            self.frames.cancel();
        }
        updates
    }

    /// Clear the map and stop the frame loop.
    pub fn shutdown(&mut self) {
        self.frames.cancel();
        for id in self.surface.marker_ids() {
            self.surface.remove_marker(&id);
            self.animator.forget(&id);
        }
        for id in self.trails.drain() {
            self.surface.clear_path(&id);
        }
        debug!("live map cleared");
    }

    /// A lease for a new frame loop, when transitions are pending and no
    /// loop is running.
    pub fn claim_frames(&mut self) -> Option<FrameLease> {
        if self.animator.is_idle() {
            return None;
        }
        self.frames.claim()
    }

    pub(crate) fn release_frames(&mut self, generation: u64) -> bool {
        self.frames.release(generation)
    }

    #[must_use]
    pub fn frames_running(&self) -> bool {
        self.frames.is_running()
    }

    /// Currently displayed vehicles. Replaced wholesale by every poll.
    #[must_use]
    pub fn vehicles(&self) -> Arc<Vec<MergedVehicle>> {
        Arc::clone(&self.vehicles)
    }

    #[must_use]
    pub fn vehicle(&self, id: &str) -> Option<&MergedVehicle> {
        self.vehicles.iter().find(|vehicle| vehicle.id() == id)
    }

    /// Trail history. Replaced wholesale by every poll.
    #[must_use]
    pub fn history(&self) -> Arc<VehicleHistory> {
        Arc::clone(&self.history)
    }

    #[must_use]
    pub const fn animator(&self) -> &MotionAnimator {
        &self.animator
    }

    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub const fn status(&self) -> &PollStatus {
        &self.status
    }
}
