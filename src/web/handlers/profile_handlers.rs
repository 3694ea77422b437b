// src/web/handlers/profile_handlers.rs

use crate::auth::AuthenticatedUser;
use crate::database::DatabaseConfig;
use crate::profiles::{ProfileRepository, SeekerProfileRepository};
use crate::types::UserRole;
use crate::web::types::{ErrorResponse, ProfileResponse, ProfileUpsertRequest};

use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

pub async fn get_profile_handler(
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<ProfileResponse>, Custom<Json<ErrorResponse>>> {
    let Some(profile) = auth.profile else {
        return Err(Custom(
            Status::NotFound,
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

    let seeker_profile = match profile.role {
        UserRole::Seeker => match SeekerProfileRepository::new(pool).find(&profile.user_id).await {
            Ok(seeker) => seeker,
            Err(e) => {
                error!("Seeker profile lookup failed: {}", e);
                return Err(Custom(
                    Status::InternalServerError,
                    Json(ErrorResponse::database_error()),
                ));
            }
        },
        UserRole::Recruiter => None,
    };

    Ok(Json(ProfileResponse {
        user_id: profile.user_id,
        full_name: profile.full_name,
        email: profile.email,
        role: profile.role,
        seeker_profile,
    }))
}

pub async fn upsert_profile_handler(
    request: Json<ProfileUpsertRequest>,
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<ProfileResponse>, Custom<Json<ErrorResponse>>> {
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
        "Profile upsert: user={}, role={}",
        auth.user_id,
        request.role.as_str()
    );

    let profile = match ProfileRepository::new(pool)
        .upsert(
            &auth.user_id,
            request.full_name.as_deref(),
            &request.email,
            request.role,
        )
        .await
    {
        Ok(profile) => profile,
        Err(e) => {
            error!("Profile upsert failed for {}: {}", auth.user_id, e);
            return Err(Custom(
                Status::InternalServerError,
                Json(ErrorResponse::database_error()),
            ));
        }
    };

    // Seekers always get a card row, even an empty shell, so they appear
    // in the recruiter feed immediately.
    let seeker_profile = match profile.role {
        UserRole::Seeker => {
            match SeekerProfileRepository::new(pool)
                .upsert(
                    &auth.user_id,
                    request.title.as_deref(),
                    request.bio.as_deref(),
                    request.location.as_deref(),
                    request.experience.as_deref(),
                    &request.skills,
                )
                .await
            {
                Ok(seeker) => Some(seeker),
                Err(e) => {
                    error!("Seeker profile upsert failed for {}: {}", auth.user_id, e);
                    return Err(Custom(
                        Status::InternalServerError,
                        Json(ErrorResponse::database_error()),
                    ));
                }
            }
        }
        UserRole::Recruiter => None,
    };

    Ok(Json(ProfileResponse {
        user_id: profile.user_id,
        full_name: profile.full_name,
        email: profile.email,
        role: profile.role,
        seeker_profile,
    }))
}
