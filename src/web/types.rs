// src/web/types.rs

use rocket::serde::{Deserialize, Serialize};

use crate::feed::FeedOrigin;
use crate::profiles::SeekerProfile;
use crate::types::{Card, MatchRecord, SwipeDirection, TargetType, UserRole};

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl ErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            success: false,
            error,
            error_code,
            suggestions,
        }
    }

    pub fn database_error() -> Self {
        Self::new(
            "Database connection failed".to_string(),
            "DATABASE_ERROR".to_string(),
            vec!["Try again in a few moments".to_string()],
        )
    }

    pub fn profile_required() -> Self {
        Self::new(
            "Profile not found".to_string(),
            "PROFILE_NOT_FOUND".to_string(),
            vec!["Create a profile via POST /api/auth/profile first".to_string()],
        )
    }
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct SwipeRequest {
    pub target_id: String,
    pub target_type: TargetType,
    pub direction: SwipeDirection,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SwipeResponse {
    pub swipe_id: String,
    pub is_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<String>,
    /// True when the reciprocal check could not be completed. Not the same
    /// as "no match": the match may surface later.
    pub match_pending: bool,
    pub message: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ProfileUpsertRequest {
    pub full_name: Option<String>,
    pub email: String,
    pub role: UserRole,
    // Seeker card fields; ignored for recruiters.
    pub title: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ProfileResponse {
    pub user_id: String,
    pub full_name: Option<String>,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seeker_profile: Option<SeekerProfile>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct JobCreateRequest {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct JobUpdateRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct FeedResponse {
    pub origin: FeedOrigin,
    pub count: usize,
    pub cards: Vec<Card>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct MatchesResponse {
    pub matches: Vec<MatchRecord>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub authenticated: bool,
    pub offline_mode: bool,
}

/// Runtime flags the handlers need besides the managed state structs.
pub struct ServerConfig {
    pub offline_mode: bool,
}
