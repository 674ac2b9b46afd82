//! # Frame loop
//!
//! Drives animation ticks while any marker is in transition.
//!
//! At most one loop runs per map. The loop is claimed under the map lock when
//! a poll starts a transition, exits by itself once the animator has nothing
//! left to move, and is cancelled when animation is switched off or the map
//! is torn down.

use std::sync::Arc;
use std::time::Duration;

use realtime::{Clock, RenderSurface};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::display::{LiveMap, SharedMap};

/// Bookkeeping for the map's frame loop.
#[derive(Debug)]
pub struct FrameLoop {
    interval: Duration,
    generation: u64,
    running: Option<(u64, CancellationToken)>,
}

/// Permission to run one frame loop, handed out by [`FrameLoop::claim`].
#[derive(Debug)]
pub struct FrameLease {
    generation: u64,
    token: CancellationToken,
    interval: Duration,
}

impl FrameLoop {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval, generation: 0, running: None }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Hand out a lease unless a loop is already running.
    pub fn claim(&mut self) -> Option<FrameLease> {
        if self.running.is_some() {
            return None;
        }
        self.generation += 1;
        let token = CancellationToken::new();
        self.running = Some((self.generation, token.clone()));
        Some(FrameLease { generation: self.generation, token, interval: self.interval })
    }

    /// Mark the loop holding `generation` as finished.
    ///
    /// A stale lease (from a loop already cancelled and replaced) releases
    /// nothing.
    pub fn release(&mut self, generation: u64) -> bool {
        match &self.running {
            Some((current, _)) if *current == generation => {
                self.running = None;
                true
            }
            _ => false,
        }
    }

    /// Stop the running loop, if any.
    pub fn cancel(&mut self) {
        if let Some((generation, token)) = self.running.take() {
            trace!(generation, "cancelling frame loop");
            token.cancel();
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Start a frame loop for `map` when it has transitions and none is running.
///
/// Must be called with the map lock held (`guard` is the locked map) so that
/// the check and the claim cannot race a loop that is exiting.
pub fn ensure_running<S, C>(
    map: &SharedMap<S>, guard: &mut LiveMap<S>, clock: &Arc<C>,
) -> Option<JoinHandle<()>>
where
    S: RenderSurface + 'static,
    C: Clock + 'static,
{
    let lease = guard.claim_frames()?;
    Some(spawn(Arc::clone(map), Arc::clone(clock), lease))
}

fn spawn<S, C>(map: SharedMap<S>, clock: Arc<C>, lease: FrameLease) -> JoinHandle<()>
where
    S: RenderSurface + 'static,
    C: Clock + 'static,
{
    let FrameLease { generation, token, interval } = lease;
    debug!(generation, "frame loop started");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frames: u64 = 0;

        loop {
            tokio::select! {
                () = token.cancelled() => break,
                _ = ticker.tick() => {
                    let mut guard = map.lock().await;
                    if token.is_cancelled() {
                        break;
                    }
                    guard.tick(clock.monotonic_secs());
                    frames += 1;
                    if guard.animator().is_idle() {
                        guard.release_frames(generation);
                        break;
                    }
                }
            }
        }

        debug!(generation, frames, "frame loop stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_lease_at_a_time() {
        let mut frames = FrameLoop::new(Duration::from_millis(16));

        let lease = frames.claim().expect("first claim");
        assert!(frames.claim().is_none());
        assert!(frames.is_running());

        assert!(frames.release(lease.generation));
        assert!(!frames.is_running());
        assert!(frames.claim().is_some());
    }

    #[test]
    fn stale_release_is_ignored() {
        let mut frames = FrameLoop::new(Duration::from_millis(16));

        let first = frames.claim().expect("first claim");
        frames.cancel();
        assert!(first.token.is_cancelled());

        let second = frames.claim().expect("second claim");
        assert!(!frames.release(first.generation));
        assert!(frames.is_running());
        assert!(frames.release(second.generation));
    }
}
