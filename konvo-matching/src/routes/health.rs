use axum::Json;

use konvo_shared::types::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        "konvo-matching",
        env!("CARGO_PKG_VERSION"),
    ))
}
