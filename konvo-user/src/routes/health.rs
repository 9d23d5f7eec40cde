use axum::Json;

use konvo_shared::types::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        "konvo-user",
        env!("CARGO_PKG_VERSION"),
    ))
}
