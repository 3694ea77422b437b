// src/web/handlers/match_handlers.rs

use crate::auth::AuthenticatedUser;
use crate::database::DatabaseConfig;
use crate::matching::MatchRepository;
use crate::web::types::{ErrorResponse, MatchesResponse};

use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use tracing::error;

pub async fn list_matches_handler(
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<MatchesResponse>, Custom<Json<ErrorResponse>>> {
    let Some(identity) = auth.identity() else {
        return Err(Custom(
            Status::Forbidden,
            Json(ErrorResponse::profile_required()),
        ));
    };

    let pool = match db_config.pool() {
        Ok(pool) => pool,
        Err(e) => {
            error!("Database connection failed: {}", e);
            return Err(Custom(
                Status::InternalServerError,
                Json(ErrorResponse::database_error()),
            ));
        }
    };

    match MatchRepository::new(pool).list_for(&identity).await {
        Ok(matches) => Ok(Json(MatchesResponse { matches })),
        Err(e) => {
            error!("Match listing failed for {}: {}", identity.user_id, e);
            Err(Custom(
                Status::InternalServerError,
                Json(ErrorResponse::database_error()),
            ))
        }
    }
}
