// src/web/handlers/feed_handlers.rs

use crate::auth::AuthenticatedUser;
use crate::database::DatabaseConfig;
use crate::feed::{self, FeedBatch, FeedOrigin, FeedService};
use crate::insight::InsightClient;
use crate::types::{Card, UserRole};
use crate::web::types::{ErrorResponse, FeedResponse, ServerConfig};

use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use tracing::error;

const DEFAULT_FEED_LIMIT: u32 = 20;

pub async fn jobs_feed_handler(
    limit: Option<u32>,
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
    insight: &State<InsightClient>,
    server: &State<ServerConfig>,
) -> Result<Json<FeedResponse>, Custom<Json<ErrorResponse>>> {
    let identity = require_role(&auth, UserRole::Seeker)?;
    let limit = limit.unwrap_or(DEFAULT_FEED_LIMIT);

    let batch = match db_config.pool() {
        Ok(pool) => {
            FeedService::new(pool, insight, server.offline_mode)
                .fetch_jobs(&identity, limit)
                .await
        }
        Err(e) => {
            // Degrade, not fail: a broken pool serves the tagged sample deck.
            error!("Database connection failed, serving sample jobs: {}", e);
            sample_batch(feed::sample_jobs().into_iter().map(Card::Job), limit)
        }
    };

    Ok(Json(FeedResponse {
        origin: batch.origin,
        count: batch.cards.len(),
        cards: batch.cards,
    }))
}

pub async fn candidates_feed_handler(
    limit: Option<u32>,
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
    insight: &State<InsightClient>,
    server: &State<ServerConfig>,
) -> Result<Json<FeedResponse>, Custom<Json<ErrorResponse>>> {
    let identity = require_role(&auth, UserRole::Recruiter)?;
    let limit = limit.unwrap_or(DEFAULT_FEED_LIMIT);

    let batch = match db_config.pool() {
        Ok(pool) => {
            FeedService::new(pool, insight, server.offline_mode)
                .fetch_candidates(&identity, limit)
                .await
        }
        Err(e) => {
            error!("Database connection failed, serving sample candidates: {}", e);
            sample_batch(
                feed::sample_candidates().into_iter().map(Card::Candidate),
                limit,
            )
        }
    };

    Ok(Json(FeedResponse {
        origin: batch.origin,
        count: batch.cards.len(),
        cards: batch.cards,
    }))
}

fn sample_batch(cards: impl Iterator<Item = Card>, limit: u32) -> FeedBatch {
    FeedBatch {
        origin: FeedOrigin::Sample,
        cards: cards.take(limit as usize).collect(),
    }
}

pub(super) fn require_role(
    auth: &AuthenticatedUser,
    role: UserRole,
) -> Result<crate::types::Identity, Custom<Json<ErrorResponse>>> {
    let Some(identity) = auth.identity() else {
        return Err(Custom(
            Status::Forbidden,
            Json(ErrorResponse::profile_required()),
        ));
    };

    if identity.role != role {
        return Err(Custom(
            Status::Forbidden,
            Json(ErrorResponse::new(
                format!("This endpoint requires the {} role", role.as_str()),
                "ROLE_MISMATCH".to_string(),
                vec![format!("Your profile role is {}", identity.role.as_str())],
            )),
        ));
    }

    Ok(identity)
}
