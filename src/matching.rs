// src/matching.rs
//! Reciprocal-swipe match detection. Deterministic only: a match exists
//! exactly when both directions of a mutual right swipe are committed.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::jobs::JobRepository;
use crate::ledger::SwipeRepository;
use crate::types::{Identity, MatchRecord, Swipe, SwipeDirection, TargetType, UserRole};

const MATCH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Result of a reciprocal check. Indeterminate is not "no match": the
/// check could not be completed and must not be conflated with a negative.
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    Matched(MatchRecord),
    NoMatch,
    Indeterminate(String),
}

impl MatchOutcome {
    pub fn matched(&self) -> Option<&MatchRecord> {
        match self {
            MatchOutcome::Matched(record) => Some(record),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct MatchRow {
    id: String,
    seeker_id: String,
    recruiter_id: String,
    job_id: String,
    matched_at: DateTime<Utc>,
    status: String,
}

impl From<MatchRow> for MatchRecord {
    fn from(row: MatchRow) -> Self {
        MatchRecord {
            id: row.id,
            seeker_id: row.seeker_id,
            recruiter_id: row.recruiter_id,
            job_id: row.job_id,
            matched_at: row.matched_at,
            status: row.status,
        }
    }
}

pub struct MatchRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MatchRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create-if-absent on the canonical (seeker, recruiter, job) key.
    /// Under concurrent writers both trigger paths race the same unique
    /// constraint; the loser's INSERT is ignored and the re-select returns
    /// the winner's row.
    pub async fn create_if_absent(
        &self,
        seeker_id: &str,
        recruiter_id: &str,
        job_id: &str,
    ) -> Result<MatchRecord> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO matches (id, seeker_id, recruiter_id, job_id, matched_at, status)
            VALUES (?, ?, ?, ?, ?, 'active')
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(seeker_id)
        .bind(recruiter_id)
        .bind(job_id)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        let row = sqlx::query_as::<_, MatchRow>(
            r#"
            SELECT id, seeker_id, recruiter_id, job_id, matched_at, status
            FROM matches
            WHERE seeker_id = ? AND recruiter_id = ? AND job_id = ?
            "#,
        )
        .bind(seeker_id)
        .bind(recruiter_id)
        .bind(job_id)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Active matches for a user, scoped by their side of the pairing.
    pub async fn list_for(&self, identity: &Identity) -> Result<Vec<MatchRecord>> {
        let column = match identity.role {
            UserRole::Seeker => "seeker_id",
            UserRole::Recruiter => "recruiter_id",
        };

        let rows = sqlx::query_as::<_, MatchRow>(&format!(
            r#"
            SELECT id, seeker_id, recruiter_id, job_id, matched_at, status
            FROM matches
            WHERE {} = ? AND status = 'active'
            ORDER BY matched_at DESC
            "#,
            column
        ))
        .bind(&identity.user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(MatchRecord::from).collect())
    }
}

pub struct MatchDetector<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MatchDetector<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Run the reciprocal check for a freshly recorded right swipe.
    /// Fails closed: if the ledger cannot be queried the outcome is
    /// Indeterminate, never a guessed negative or positive.
    pub async fn check_match(&self, swipe: &Swipe) -> MatchOutcome {
        if swipe.direction != SwipeDirection::Right {
            return MatchOutcome::NoMatch;
        }

        let check = self.reciprocal_check(swipe);
        match tokio::time::timeout(Duration::from_secs(MATCH_CHECK_TIMEOUT_SECS), check).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                warn!("Match check could not be completed: {}", e);
                MatchOutcome::Indeterminate(e.to_string())
            }
            Err(_) => {
                warn!("Match check timed out for swipe {}", swipe.id);
                MatchOutcome::Indeterminate("match check timed out".to_string())
            }
        }
    }

    async fn reciprocal_check(&self, swipe: &Swipe) -> Result<MatchOutcome> {
        let swipes = SwipeRepository::new(self.pool);
        let jobs = JobRepository::new(self.pool);
        let matches = MatchRepository::new(self.pool);

        match swipe.target_type {
            // Seeker right-swiped a job: mutual if the job's recruiter has
            // already right-swiped this seeker.
            TargetType::Job => {
                let Some(recruiter_id) = jobs.recruiter_of(&swipe.target_id).await? else {
                    warn!("Swipe target job not found: {}", swipe.target_id);
                    return Ok(MatchOutcome::NoMatch);
                };

                let reciprocal = swipes
                    .has_right_swipe(&recruiter_id, &swipe.swiper_id, TargetType::Candidate)
                    .await?;

                if !reciprocal {
                    return Ok(MatchOutcome::NoMatch);
                }

                let record = matches
                    .create_if_absent(&swipe.swiper_id, &recruiter_id, &swipe.target_id)
                    .await?;
                info!(
                    "Match detected: seeker={} recruiter={} job={}",
                    record.seeker_id, record.recruiter_id, record.job_id
                );
                Ok(MatchOutcome::Matched(record))
            }
            // Recruiter right-swiped a candidate: mutual if that seeker has
            // already right-swiped any of the recruiter's jobs. The first
            // such job scopes the match.
            TargetType::Candidate => {
                for job_id in jobs.ids_for_recruiter(&swipe.swiper_id).await? {
                    if swipes
                        .has_right_swipe(&swipe.target_id, &job_id, TargetType::Job)
                        .await?
                    {
                        let record = matches
                            .create_if_absent(&swipe.target_id, &swipe.swiper_id, &job_id)
                            .await?;
                        info!(
                            "Match detected: seeker={} recruiter={} job={}",
                            record.seeker_id, record.recruiter_id, record.job_id
                        );
                        return Ok(MatchOutcome::Matched(record));
                    }
                }
                Ok(MatchOutcome::NoMatch)
            }
        }
    }
}
