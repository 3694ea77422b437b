// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use types::*;

use crate::auth::{AuthConfig, AuthenticatedUser, OptionalAuth};
use crate::config::ConfigManager;
use crate::database::DatabaseConfig;
use crate::insight::InsightClient;
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{
    catchers, delete, get, options, post, put, routes, Build, Request, Response, Rocket, State,
};
use tracing::info;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

#[get("/jobs?<limit>")]
pub async fn jobs_feed(
    limit: Option<u32>,
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
    insight: &State<InsightClient>,
    server: &State<ServerConfig>,
) -> Result<Json<FeedResponse>, Custom<Json<ErrorResponse>>> {
    handlers::jobs_feed_handler(limit, auth, db_config, insight, server).await
}

#[get("/candidates?<limit>")]
pub async fn candidates_feed(
    limit: Option<u32>,
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
    insight: &State<InsightClient>,
    server: &State<ServerConfig>,
) -> Result<Json<FeedResponse>, Custom<Json<ErrorResponse>>> {
    handlers::candidates_feed_handler(limit, auth, db_config, insight, server).await
}

#[post("/swipe", data = "<request>")]
pub async fn record_swipe(
    request: Json<SwipeRequest>,
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<SwipeResponse>, Custom<Json<ErrorResponse>>> {
    handlers::record_swipe_handler(request, auth, db_config).await
}

#[get("/matches")]
pub async fn list_matches(
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<MatchesResponse>, Custom<Json<ErrorResponse>>> {
    handlers::list_matches_handler(auth, db_config).await
}

#[get("/auth/profile")]
pub async fn get_profile(
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<ProfileResponse>, Custom<Json<ErrorResponse>>> {
    handlers::get_profile_handler(auth, db_config).await
}

#[post("/auth/profile", data = "<request>")]
pub async fn upsert_profile(
    request: Json<ProfileUpsertRequest>,
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<ProfileResponse>, Custom<Json<ErrorResponse>>> {
    handlers::upsert_profile_handler(request, auth, db_config).await
}

#[post("/jobs", data = "<request>")]
pub async fn create_job(
    request: Json<JobCreateRequest>,
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<crate::types::JobCard>, Custom<Json<ErrorResponse>>> {
    handlers::create_job_handler(request, auth, db_config).await
}

#[get("/jobs/<job_id>")]
pub async fn get_job(
    job_id: String,
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<crate::types::JobCard>, Custom<Json<ErrorResponse>>> {
    handlers::get_job_handler(job_id, auth, db_config).await
}

#[put("/jobs/<job_id>", data = "<request>")]
pub async fn update_job(
    job_id: String,
    request: Json<JobUpdateRequest>,
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<crate::types::JobCard>, Custom<Json<ErrorResponse>>> {
    handlers::update_job_handler(job_id, request, auth, db_config).await
}

#[delete("/jobs/<job_id>")]
pub async fn delete_job(
    job_id: String,
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<ActionResponse>, Custom<Json<ErrorResponse>>> {
    handlers::delete_job_handler(job_id, auth, db_config).await
}

#[get("/health")]
pub async fn health(auth: OptionalAuth, server: &State<ServerConfig>) -> Json<HealthResponse> {
    handlers::health_handler(auth, server).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(401)]
pub fn unauthorized() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Authentication required".to_string(),
        "UNAUTHORIZED".to_string(),
        vec!["Provide a valid Bearer token in the Authorization header".to_string()],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

/// Assemble the rocket instance. Split out of `start_web_server` so the
/// integration tests can drive it with a local client.
pub fn build_rocket(
    db_config: DatabaseConfig,
    auth_config: AuthConfig,
    insight: InsightClient,
    server_config: ServerConfig,
) -> Rocket<Build> {
    rocket::build()
        .attach(Cors)
        .manage(server_config)
        .manage(auth_config)
        .manage(db_config)
        .manage(insight)
        .register("/api", catchers![bad_request, unauthorized, internal_error])
        .mount(
            "/api",
            routes![
                jobs_feed,
                candidates_feed,
                record_swipe,
                list_matches,
                get_profile,
                upsert_profile,
                create_job,
                get_job,
                update_job,
                delete_job,
                health,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: &ConfigManager) -> Result<()> {
    let mut db_config = DatabaseConfig::new(config.environment.database_path.clone());

    if config.runtime.offline_mode {
        db_config.init_in_memory().await?;
    } else {
        db_config.init_pool().await?;
    }
    db_config.migrate().await?;

    let auth_config = AuthConfig::new(config.runtime.jwt_secret.clone());
    let insight = InsightClient::new(config.service.insight_url.clone())?;
    let server_config = ServerConfig {
        offline_mode: config.runtime.offline_mode,
    };

    info!("Starting HireMatch API server");
    info!("Database: {}", db_config.database_path.display());
    if config.runtime.offline_mode {
        info!("Offline mode: serving tagged sample feeds");
    }

    let _rocket = build_rocket(db_config, auth_config, insight, server_config)
        .launch()
        .await?;

    Ok(())
}
