// src/jobs.rs
//! Job listings: recruiter-owned, immediately active on creation.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::types::JobCard;

#[derive(Debug, Clone, sqlx::FromRow)]
struct JobRow {
    id: String,
    recruiter_id: String,
    title: String,
    company: String,
    location: String,
    salary: Option<String>,
    description: String,
    requirements: String,
    #[allow(dead_code)]
    status: String,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
}

impl JobRow {
    fn into_card(self) -> JobCard {
        JobCard {
            id: self.id,
            recruiter_id: self.recruiter_id,
            title: self.title,
            company: self.company,
            location: self.location,
            salary: self.salary,
            description: self.description,
            requirements: serde_json::from_str(&self.requirements).unwrap_or_default(),
            match_score: None,
            match_reason: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub description: String,
    pub requirements: Vec<String>,
}

/// Partial edit of an existing listing. Absent fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
}

pub struct JobRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, recruiter_id: &str, job: NewJob) -> Result<JobCard> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let requirements_json = serde_json::to_string(&job.requirements)?;

        sqlx::query(
            r#"
            INSERT INTO jobs
                (id, recruiter_id, title, company, location, salary,
                 description, requirements, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'active', ?, ?)
            "#,
        )
        .bind(&id)
        .bind(recruiter_id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.location)
        .bind(&job.salary)
        .bind(&job.description)
        .bind(&requirements_json)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        info!("Job created: {} by recruiter {}", id, recruiter_id);

        Ok(JobCard {
            id,
            recruiter_id: recruiter_id.to_string(),
            title: job.title,
            company: job.company,
            location: job.location,
            salary: job.salary,
            description: job.description,
            requirements: job.requirements,
            match_score: None,
            match_reason: None,
        })
    }

    /// Single listing by id, regardless of status.
    pub async fn find(&self, job_id: &str) -> Result<Option<JobCard>> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, recruiter_id, title, company, location, salary,
                   description, requirements, status, created_at
            FROM jobs
            WHERE id = ?
            "#,
        )
        .bind(job_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(JobRow::into_card))
    }

    /// Apply a partial edit to an owned listing. Returns None when the id
    /// does not belong to `recruiter_id`.
    pub async fn update(
        &self,
        job_id: &str,
        recruiter_id: &str,
        changes: JobUpdate,
    ) -> Result<Option<JobCard>> {
        let requirements_json = changes
            .requirements
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let result = sqlx::query(
            r#"
            UPDATE jobs SET
                title = COALESCE(?, title),
                company = COALESCE(?, company),
                location = COALESCE(?, location),
                salary = COALESCE(?, salary),
                description = COALESCE(?, description),
                requirements = COALESCE(?, requirements),
                updated_at = ?
            WHERE id = ? AND recruiter_id = ?
            "#,
        )
        .bind(&changes.title)
        .bind(&changes.company)
        .bind(&changes.location)
        .bind(&changes.salary)
        .bind(&changes.description)
        .bind(&requirements_json)
        .bind(Utc::now())
        .bind(job_id)
        .bind(recruiter_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        info!("Job updated: {} by recruiter {}", job_id, recruiter_id);
        self.find(job_id).await
    }

    /// Soft delete: the listing leaves the active feed but its id stays
    /// valid for existing swipes and matches.
    pub async fn close(&self, job_id: &str, recruiter_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE jobs SET status = 'closed', updated_at = ? WHERE id = ? AND recruiter_id = ?",
        )
        .bind(Utc::now())
        .bind(job_id)
        .bind(recruiter_id)
        .execute(self.pool)
        .await?;

        let closed = result.rows_affected() > 0;
        if closed {
            info!("Job closed: {} by recruiter {}", job_id, recruiter_id);
        }
        Ok(closed)
    }

    /// Owner of a job listing, if the job exists.
    pub async fn recruiter_of(&self, job_id: &str) -> Result<Option<String>> {
        let recruiter: Option<String> =
            sqlx::query_scalar("SELECT recruiter_id FROM jobs WHERE id = ?")
                .bind(job_id)
                .fetch_optional(self.pool)
                .await?;

        Ok(recruiter)
    }

    /// Ids of all jobs owned by a recruiter.
    pub async fn ids_for_recruiter(&self, recruiter_id: &str) -> Result<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM jobs WHERE recruiter_id = ?")
            .bind(recruiter_id)
            .fetch_all(self.pool)
            .await?;

        Ok(ids)
    }

    /// Active jobs, newest first.
    pub async fn list_active(&self, limit: i64) -> Result<Vec<JobCard>> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, recruiter_id, title, company, location, salary,
                   description, requirements, status, created_at
            FROM jobs
            WHERE status = 'active'
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(JobRow::into_card).collect())
    }
}
