pub mod point_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::cors_layer;
use crate::state::AppState;

/// Router completo de la API
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health_check))
        // Ruta usada por los clientes web y móvil existentes
        .nest("/api/puntos", point_routes::create_point_router())
        .nest("/points", point_routes::create_point_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "reusosmart-backend",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
