// src/web/handlers/job_handlers.rs

use crate::auth::AuthenticatedUser;
use crate::database::DatabaseConfig;
use crate::jobs::{JobRepository, JobUpdate, NewJob};
use crate::types::{JobCard, UserRole};
use crate::web::handlers::feed_handlers::require_role;
use crate::web::types::{ActionResponse, ErrorResponse, JobCreateRequest, JobUpdateRequest};

use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use sqlx::SqlitePool;
use tracing::error;

pub async fn create_job_handler(
    request: Json<JobCreateRequest>,
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<JobCard>, Custom<Json<ErrorResponse>>> {
    let identity = require_role(&auth, UserRole::Recruiter)?;

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

    let request = request.into_inner();
    let new_job = NewJob {
        title: request.title,
        company: request.company,
        location: request.location,
        salary: request.salary,
        description: request.description,
        requirements: request.requirements,
    };

    match JobRepository::new(pool).create(&identity.user_id, new_job).await {
        Ok(job) => Ok(Json(job)),
        Err(e) => {
            error!("Job creation failed for {}: {}", identity.user_id, e);
            Err(Custom(
                Status::InternalServerError,
                Json(ErrorResponse::database_error()),
            ))
        }
    }
}

pub async fn get_job_handler(
    job_id: String,
    _auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<JobCard>, Custom<Json<ErrorResponse>>> {
    let pool = pool_or_error(db_config)?;

    match JobRepository::new(pool).find(&job_id).await {
        Ok(Some(job)) => Ok(Json(job)),
        Ok(None) => Err(job_not_found()),
        Err(e) => {
            error!("Job lookup failed for {}: {}", job_id, e);
            Err(Custom(
                Status::InternalServerError,
                Json(ErrorResponse::database_error()),
            ))
        }
    }
}

pub async fn update_job_handler(
    job_id: String,
    request: Json<JobUpdateRequest>,
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<JobCard>, Custom<Json<ErrorResponse>>> {
    let identity = require_role(&auth, UserRole::Recruiter)?;
    let pool = pool_or_error(db_config)?;
    let repo = JobRepository::new(pool);

    require_ownership(&repo, &job_id, &identity.user_id).await?;

    let request = request.into_inner();
    let changes = JobUpdate {
        title: request.title,
        company: request.company,
        location: request.location,
        salary: request.salary,
        description: request.description,
        requirements: request.requirements,
    };

    match repo.update(&job_id, &identity.user_id, changes).await {
        Ok(Some(job)) => Ok(Json(job)),
        Ok(None) => Err(job_not_found()),
        Err(e) => {
            error!("Job update failed for {}: {}", job_id, e);
            Err(Custom(
                Status::InternalServerError,
                Json(ErrorResponse::database_error()),
            ))
        }
    }
}

pub async fn delete_job_handler(
    job_id: String,
    auth: AuthenticatedUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<ActionResponse>, Custom<Json<ErrorResponse>>> {
    let identity = require_role(&auth, UserRole::Recruiter)?;
    let pool = pool_or_error(db_config)?;
    let repo = JobRepository::new(pool);

    require_ownership(&repo, &job_id, &identity.user_id).await?;

    match repo.close(&job_id, &identity.user_id).await {
        Ok(true) => Ok(Json(ActionResponse {
            success: true,
            message: "Job deleted successfully".to_string(),
        })),
        Ok(false) => Err(job_not_found()),
        Err(e) => {
            error!("Job close failed for {}: {}", job_id, e);
            Err(Custom(
                Status::InternalServerError,
                Json(ErrorResponse::database_error()),
            ))
        }
    }
}

// Missing listings answer 404, someone else's answer 403, matching the
// managed-store behavior clients already rely on.
async fn require_ownership(
    repo: &JobRepository<'_>,
    job_id: &str,
    recruiter_id: &str,
) -> Result<(), Custom<Json<ErrorResponse>>> {
    let owner = match repo.recruiter_of(job_id).await {
        Ok(owner) => owner,
        Err(e) => {
            error!("Job ownership lookup failed for {}: {}", job_id, e);
            return Err(Custom(
                Status::InternalServerError,
                Json(ErrorResponse::database_error()),
            ));
        }
    };

    match owner {
        None => Err(job_not_found()),
        Some(owner) if owner != recruiter_id => Err(Custom(
            Status::Forbidden,
            Json(ErrorResponse::new(
                "Not authorized to manage this job".to_string(),
                "NOT_JOB_OWNER".to_string(),
                vec!["Only the posting recruiter can edit or close a listing".to_string()],
            )),
        )),
        Some(_) => Ok(()),
    }
}

fn job_not_found() -> Custom<Json<ErrorResponse>> {
    Custom(
        Status::NotFound,
        Json(ErrorResponse::new(
            "Job not found".to_string(),
            "JOB_NOT_FOUND".to_string(),
            vec![],
        )),
    )
}

fn pool_or_error(
    db_config: &State<DatabaseConfig>,
) -> Result<&SqlitePool, Custom<Json<ErrorResponse>>> {
    db_config.pool().map_err(|e| {
        error!("Database connection failed: {}", e);
        Custom(
            Status::InternalServerError,
            Json(ErrorResponse::database_error()),
        )
    })
}
