use axum::response::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse),
    ),
    tag = "Health"
)]
pub async fn handle_healthz() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}
