use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct LiveStatus {
    pub status: String,
}

pub async fn liveness_handler() -> Json<LiveStatus> {
    // Nothing much to check, if it hits this function, it's alive
    Json(LiveStatus {
        status: "UP".to_string(),
    })
}
