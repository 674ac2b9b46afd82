use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use live_transit::{MarkerLayer, ReplayFeed, server};
use realtime::Clock;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use vehicle_motion::{Config, LiveMap, SystemClock, poll};

#[derive(Parser)]
#[command(name = "live-transit")]
#[command(about = "Live vehicle map over a recorded transit feed")]
struct Args {
    /// Port to run the HTTP server on
    #[arg(short, long, env = "SERVER_PORT", default_value = "8080")]
    port: u16,

    /// JSON file of recorded poll snapshots
    #[arg(short, long, env = "REPLAY_FILE")]
    replay: PathBuf,

    /// Serve recorded timestamps as-is instead of shifting them to now
    #[arg(long)]
    keep_timestamps: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();

    let config = Config::from_env();
    let clock = Arc::new(SystemClock::new());

    let mut feed = ReplayFeed::load(&args.replay)?;
    if !args.keep_timestamps {
        feed = feed.rebased(Arc::clone(&clock) as Arc<dyn Clock>);
    }

    let map = LiveMap::new(config.clone(), MarkerLayer::new()).shared();
    let shutdown = CancellationToken::new();

    let poller = tokio::spawn(poll::run(
        feed,
        Arc::clone(&map),
        Arc::clone(&clock),
        config.poll_interval,
        shutdown.clone(),
    ));

    tokio::spawn(watch_signals(shutdown.clone()));

    let listener = TcpListener::bind(("0.0.0.0", args.port))
        .await
        .with_context(|| format!("binding port {}", args.port))?;
    let served = server::serve(listener, server::router(Arc::clone(&map)), shutdown.clone()).await;

    shutdown.cancel();
    poller.await.context("poller task failed")?;
    map.lock().await.shutdown();
    info!("live map stopped");

    served
}

async fn watch_signals(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                warn!(error = %err, "listening for ctrl-c failed");
                return;
            }
            info!("shutdown requested");
            shutdown.cancel();
        }
        () = shutdown.cancelled() => {}
    }
}
