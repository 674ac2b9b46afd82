//! # Poll
//!
//! Periodic feed fetch feeding the live map.

use std::sync::Arc;
use std::time::Duration;

use realtime::{Clock, FeedSource, RenderSurface};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::display::{PollOutcome, SharedMap};
use crate::frame_loop;

/// Fetch both feeds and apply them to `map`.
///
/// The two requests run concurrently and without the map lock. Either list
/// failing is logged and treated as empty; a failed vehicle list is also
/// recorded on the map's [`PollStatus`](crate::PollStatus).
pub async fn poll_once<F, S, C>(feed: &F, map: &SharedMap<S>, clock: &Arc<C>) -> PollOutcome
where
    F: FeedSource,
    S: RenderSurface + 'static,
    C: Clock + 'static,
{
    let (vehicles, delays) = tokio::join!(feed.vehicle_positions(), feed.trip_delays());

    let mut error = None;
    let vehicles = vehicles.unwrap_or_else(|err| {
        warn!(error = %err, "fetching vehicle positions failed");
        error = Some(err.to_string());
        Vec::new()
    });
    let delays = delays.unwrap_or_else(|err| {
        warn!(error = %err, "fetching trip delays failed");
        Vec::new()
    });

    let mut guard = map.lock().await;
    let outcome =
        guard.apply_poll(vehicles, &delays, clock.unix_secs(), clock.monotonic_secs(), error);
    frame_loop::ensure_running(map, &mut guard, clock);
    outcome
}

/// Poll every `interval` until `shutdown` is cancelled. The first poll is
/// immediate.
pub async fn run<F, S, C>(
    feed: F, map: SharedMap<S>, clock: Arc<C>, interval: Duration, shutdown: CancellationToken,
) where
    F: FeedSource,
    S: RenderSurface + 'static,
    C: Clock + 'static,
{
    info!(interval_secs = interval.as_secs_f64(), "feed poller started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    _ = poll_once(&feed, &map, &clock) => {}
                }
            }
        }
    }

    info!("feed poller stopped");
}
