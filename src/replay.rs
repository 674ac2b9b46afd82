//! Recorded feed playback.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use realtime::{Clock, Error, FeedSource, TripDelay, VehicleReport, feed_error};
use serde::Deserialize;
use tracing::debug;

/// One recorded poll.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub vehicles: Vec<VehicleReport>,
    #[serde(default)]
    pub delays: Vec<TripDelay>,
    /// The vehicle request failed when this poll was recorded.
    #[serde(default)]
    pub outage: bool,
}

/// Serves recorded snapshots in order, starting over after the last one.
///
/// The two feed lists advance independently, like two separate upstream
/// endpoints would.
pub struct ReplayFeed {
    snapshots: Vec<Snapshot>,
    vehicle_cursor: AtomicUsize,
    delay_cursor: AtomicUsize,
    rebase: Option<Arc<dyn Clock>>,
}

impl ReplayFeed {
    /// Snapshots must be non-empty.
    pub fn new(snapshots: Vec<Snapshot>) -> Result<Self> {
        if snapshots.is_empty() {
            return Err(Error::EmptyRecording).context("replay has no snapshots");
        }
        Ok(Self {
            snapshots,
            vehicle_cursor: AtomicUsize::new(0),
            delay_cursor: AtomicUsize::new(0),
            rebase: None,
        })
    }

    /// Read a JSON array of snapshots from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading replay file {}", path.display()))?;
        let snapshots: Vec<Snapshot> = serde_json::from_str(&raw)
            .map_err(Error::from)
            .with_context(|| format!("decoding replay file {}", path.display()))?;
        debug!(snapshots = snapshots.len(), path = %path.display(), "replay loaded");
        Self::new(snapshots)
    }

    /// Shift each snapshot's timestamps so its newest report is `clock`'s
    /// current time. Gaps between reports within a snapshot are kept.
    #[must_use]
    pub fn rebased(mut self, clock: Arc<dyn Clock>) -> Self {
        self.rebase = Some(clock);
        self
    }

    fn advance(&self, cursor: &AtomicUsize) -> (usize, &Snapshot) {
        let index = cursor.fetch_add(1, Ordering::SeqCst) % self.snapshots.len();
        (index, &self.snapshots[index])
    }
}

impl FeedSource for ReplayFeed {
    async fn vehicle_positions(&self) -> Result<Vec<VehicleReport>> {
        let (index, snapshot) = self.advance(&self.vehicle_cursor);
        if snapshot.outage {
            return Err(feed_error!("recorded outage at snapshot {index}").into());
        }

        let mut vehicles = snapshot.vehicles.clone();
        if let Some(clock) = &self.rebase {
            let now = clock.unix_secs();
            let newest = vehicles.iter().map(|report| report.timestamp).max().unwrap_or(now);
            let shift = now.saturating_sub(newest);
            for report in &mut vehicles {
                report.timestamp = report.timestamp.saturating_add(shift);
            }
        }
        Ok(vehicles)
    }

    async fn trip_delays(&self) -> Result<Vec<TripDelay>> {
        Ok(self.advance(&self.delay_cursor).1.delays.clone())
    }
}
