// src/web/handlers/system_handlers.rs

use crate::auth::OptionalAuth;
use crate::web::types::{HealthResponse, ServerConfig};

use rocket::serde::json::Json;
use rocket::State;

pub async fn health_handler(auth: OptionalAuth, server: &State<ServerConfig>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "hirematch".to_string(),
        authenticated: auth.user.is_some(),
        offline_mode: server.offline_mode,
    })
}
