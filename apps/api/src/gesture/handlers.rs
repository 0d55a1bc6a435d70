use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::gesture::shake::{AccelerationSample, ShakeEvent};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct MotionBatch {
    pub samples: Vec<AccelerationSample>,
}

#[derive(Serialize)]
pub struct MotionResponse {
    pub shakes: Vec<ShakeEvent>,
}

/// POST /api/v1/devices/:device_id/motion
/// Samples are processed in the order given, continuing from the device's
/// previous batch.
pub async fn handle_motion(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(batch): Json<MotionBatch>,
) -> Result<Json<MotionResponse>, AppError> {
    let mut detectors = state.shake_detectors.lock().await;
    let (shakes, last_shake_ms) = detectors.process(&device_id, &batch.samples, Instant::now());
    let tracked = detectors.device_count();
    drop(detectors);

    debug!(
        "Device {device_id}: {} samples, {} shakes, last shake at {last_shake_ms:?} ({tracked} devices tracked)",
        batch.samples.len(),
        shakes.len()
    );
    if !shakes.is_empty() {
        info!("Shake detected on device {device_id}");
    }
    Ok(Json(MotionResponse { shakes }))
}

/// DELETE /api/v1/devices/:device_id/motion
/// Forgets the device's detector, as when its sensor listener is unregistered.
pub async fn handle_reset_motion(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> StatusCode {
    if state.shake_detectors.lock().await.remove(&device_id) {
        debug!("Device {device_id}: detector dropped");
    }
    StatusCode::NO_CONTENT
}
