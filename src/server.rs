use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use http::StatusCode;
use realtime::{HttpError, not_found};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use vehicle_motion::{MergedVehicle, PollStatus, SharedMap, VehicleHistory};

use crate::surface::MarkerLayer;

type Map = SharedMap<MarkerLayer>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclesReply {
    pub count: usize,
    pub vehicles: Vec<MergedVehicle>,
}

#[derive(Debug, Deserialize)]
pub struct AnimationToggle {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationReply {
    pub enabled: bool,
    /// Markers landed on their destination by switching animation off.
    pub landed: usize,
}

pub fn router(map: Map) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/vehicles", get(vehicles))
        .route("/vehicles/{vehicle_id}", get(vehicle))
        .route("/history", get(history))
        .route("/markers", get(markers))
        .route("/animation", put(animation))
        .with_state(map)
}

/// Serve `router` until `shutdown` is cancelled.
pub async fn serve(listener: TcpListener, router: Router, shutdown: CancellationToken) -> Result<()> {
    let addr = listener.local_addr().context("reading listener address")?;
    info!(%addr, "http server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("http server failed")
}

async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

#[axum::debug_handler]
async fn status(State(map): State<Map>) -> Json<PollStatus> {
    Json(map.lock().await.status().clone())
}

#[axum::debug_handler]
async fn vehicles(State(map): State<Map>) -> Json<VehiclesReply> {
    let vehicles = map.lock().await.vehicles();
    Json(VehiclesReply { count: vehicles.len(), vehicles: vehicles.to_vec() })
}

#[axum::debug_handler]
async fn vehicle(
    State(map): State<Map>, Path(vehicle_id): Path<String>,
) -> Result<Json<MergedVehicle>, HttpError> {
    let guard = map.lock().await;
    let vehicle = guard
        .vehicle(&vehicle_id)
        .ok_or_else(|| not_found!("vehicle {} is not on the map", vehicle_id))?;
    Ok(Json(vehicle.clone()))
}

#[axum::debug_handler]
async fn history(State(map): State<Map>) -> Json<VehicleHistory> {
    let history = map.lock().await.history();
    Json(history.as_ref().clone())
}

#[axum::debug_handler]
async fn markers(State(map): State<Map>) -> Json<MarkerLayer> {
    Json(map.lock().await.surface().clone())
}

#[axum::debug_handler]
async fn animation(
    State(map): State<Map>, Json(toggle): Json<AnimationToggle>,
) -> Json<AnimationReply> {
    let landed = map.lock().await.set_animation(toggle.enabled).len();
    info!(enabled = toggle.enabled, landed, "animation toggled");
    Json(AnimationReply { enabled: toggle.enabled, landed })
}
