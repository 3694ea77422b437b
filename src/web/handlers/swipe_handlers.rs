// src/web/handlers/swipe_handlers.rs

use crate::auth::AuthenticatedUser;
use crate::database::DatabaseConfig;
use crate::errors::LedgerError;
use crate::ledger::SwipeLedger;
use crate::matching::{MatchDetector, MatchOutcome};
use crate::web::types::{ErrorResponse, SwipeRequest, SwipeResponse};

use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

pub async fn record_swipe_handler(
    request: Json<SwipeRequest>,
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<SwipeResponse>, Custom<Json<ErrorResponse>>> {
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

    info!(
        "Recording swipe: user={}, target={}, direction={}",
        identity.user_id,
        request.target_id,
        request.direction.as_str()
    );

    let ledger = SwipeLedger::new(pool);
    let recorded = match ledger
        .record_swipe(
            &identity,
            &request.target_id,
            request.target_type,
            request.direction,
        )
        .await
    {
        Ok(recorded) => recorded,
        Err(LedgerError::DuplicateSwipe) => {
            return Err(Custom(
                Status::Conflict,
                Json(ErrorResponse::new(
                    "A swipe for this target was already recorded".to_string(),
                    "DUPLICATE_SWIPE".to_string(),
                    vec!["Refresh the feed; decided cards are excluded".to_string()],
                )),
            ));
        }
        Err(LedgerError::Unavailable(reason)) => {
            error!("Swipe ledger unavailable: {}", reason);
            return Err(Custom(
                Status::ServiceUnavailable,
                Json(ErrorResponse::new(
                    "Swipe could not be stored".to_string(),
                    "LEDGER_UNAVAILABLE".to_string(),
                    vec!["Try again in a few moments".to_string()],
                )),
            ));
        }
    };

    // Reciprocal check only applies to right swipes. Indeterminate is
    // reported as pending, never silently downgraded to "no match".
    let mut is_match = false;
    let mut match_id = None;
    let mut match_pending = false;

    if recorded.check_reciprocal {
        match MatchDetector::new(pool).check_match(&recorded.swipe).await {
            MatchOutcome::Matched(record) => {
                is_match = true;
                match_id = Some(record.id);
            }
            MatchOutcome::NoMatch => {}
            MatchOutcome::Indeterminate(reason) => {
                error!(
                    "Match check indeterminate for swipe {}: {}",
                    recorded.swipe.id, reason
                );
                match_pending = true;
            }
        }
    }

    let message = if is_match {
        "Match!".to_string()
    } else {
        "Swipe recorded".to_string()
    };

    Ok(Json(SwipeResponse {
        swipe_id: recorded.swipe.id,
        is_match,
        match_id,
        match_pending,
        message,
    }))
}
