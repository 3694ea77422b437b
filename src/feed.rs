// src/feed.rs
//! Card feed assembly: excludes already-swiped targets, ranks by heuristic
//! match score, and degrades to a clearly tagged sample deck when the
//! backing store is unreachable. Degrade-not-fail is deliberate policy;
//! sample batches are never mistakable for live data.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::errors::FeedError;
use crate::insight::{self, InsightClient};
use crate::jobs::JobRepository;
use crate::ledger::SwipeRepository;
use crate::profiles::SeekerProfileRepository;
use crate::types::{Card, CandidateCard, Identity, JobCard, TargetType, UserRole};

/// How many active listings are pulled into one ranking pass.
const FEED_SCAN_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedOrigin {
    Live,
    /// Fallback deck served while the store is unavailable or when the
    /// service runs in explicit offline mode.
    Sample,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedBatch {
    pub origin: FeedOrigin,
    pub cards: Vec<Card>,
}

/// Client-side seam for the card stack controller. The live service and
/// the test fakes both implement it.
pub trait CardFeed {
    fn fetch_feed(
        &self,
        identity: &Identity,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<FeedBatch, FeedError>> + Send;

    /// Invalidate any locally cached feed state. Never touches the ledger.
    fn refresh(&self, identity: &Identity) -> impl std::future::Future<Output = ()> + Send;
}

pub struct FeedService<'a> {
    pool: &'a SqlitePool,
    insight: &'a InsightClient,
    offline: bool,
}

impl<'a> FeedService<'a> {
    pub fn new(pool: &'a SqlitePool, insight: &'a InsightClient, offline: bool) -> Self {
        Self {
            pool,
            insight,
            offline,
        }
    }

    /// Job cards for a seeker, highest match score first.
    pub async fn fetch_jobs(&self, identity: &Identity, limit: u32) -> FeedBatch {
        if self.offline {
            return sample_job_batch(limit);
        }

        match self.try_fetch_jobs(identity, limit).await {
            Ok(cards) => FeedBatch {
                origin: FeedOrigin::Live,
                cards,
            },
            Err(e) => {
                warn!("Job feed unavailable, serving sample deck: {}", e);
                sample_job_batch(limit)
            }
        }
    }

    /// Candidate cards for a recruiter.
    pub async fn fetch_candidates(&self, identity: &Identity, limit: u32) -> FeedBatch {
        if self.offline {
            return sample_candidate_batch(limit);
        }

        match self.try_fetch_candidates(identity, limit).await {
            Ok(cards) => FeedBatch {
                origin: FeedOrigin::Live,
                cards,
            },
            Err(e) => {
                warn!("Candidate feed unavailable, serving sample deck: {}", e);
                sample_candidate_batch(limit)
            }
        }
    }

    async fn try_fetch_jobs(&self, identity: &Identity, limit: u32) -> Result<Vec<Card>> {
        let swiped: HashSet<String> = SwipeRepository::new(self.pool)
            .swiped_target_ids(&identity.user_id, TargetType::Job)
            .await
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .into_iter()
            .collect();

        let seeker_skills = SeekerProfileRepository::new(self.pool)
            .find(&identity.user_id)
            .await?
            .map(|profile| profile.skills)
            .unwrap_or_default();

        // Scan window: every fetched card is scored before the truncation
        // to `limit`, so a well-matched older listing outranks a fresh
        // mismatch instead of falling off the recency cutoff.
        let fetch_limit = FEED_SCAN_LIMIT.max(limit as i64 + swiped.len() as i64);
        let jobs = JobRepository::new(self.pool).list_active(fetch_limit).await?;

        let mut cards: Vec<JobCard> = jobs
            .into_iter()
            .filter(|job| !swiped.contains(&job.id) && job.recruiter_id != identity.user_id)
            .map(|mut job| {
                job.match_score = Some(insight::match_score(&seeker_skills, &job.requirements));
                job
            })
            .collect();

        cards.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        cards.truncate(limit as usize);

        // Remote insight text is fetched for the whole batch at once. Every
        // task resolves to the heuristic reason on failure, so a dead
        // insight service delays the feed by at most one client timeout.
        let tasks: Vec<_> = cards
            .iter()
            .map(|job| {
                let client = self.insight.clone();
                let fallback = insight::match_reason(&seeker_skills, &job.requirements);
                let prompt = format!(
                    "In one sentence, why does the job '{}' fit a candidate with skills {:?}?",
                    job.title, seeker_skills
                );
                tokio::spawn(async move { client.generate_or(&prompt, fallback).await })
            })
            .collect();

        for (job, task) in cards.iter_mut().zip(tasks) {
            job.match_reason = Some(match task.await {
                Ok(reason) => reason,
                Err(_) => insight::match_reason(&seeker_skills, &job.requirements),
            });
        }

        info!(
            "Job feed assembled for {}: {} cards ({} excluded)",
            identity.user_id,
            cards.len(),
            swiped.len()
        );

        Ok(cards.into_iter().map(Card::Job).collect())
    }

    async fn try_fetch_candidates(&self, identity: &Identity, limit: u32) -> Result<Vec<Card>> {
        let swiped: HashSet<String> = SwipeRepository::new(self.pool)
            .swiped_target_ids(&identity.user_id, TargetType::Candidate)
            .await
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .into_iter()
            .collect();

        let fetch_limit = limit as i64 + swiped.len() as i64;
        let seekers = SeekerProfileRepository::new(self.pool)
            .list_with_names(fetch_limit)
            .await?;

        let mut cards: Vec<Card> = Vec::new();
        for (profile, name) in seekers {
            if swiped.contains(&profile.user_id) || profile.user_id == identity.user_id {
                continue;
            }

            cards.push(Card::Candidate(CandidateCard {
                id: profile.user_id,
                name,
                title: profile.title,
                location: profile.location,
                experience: profile.experience,
                skills: profile.skills,
                bio: profile.bio,
                match_score: None,
                match_reason: None,
            }));

            if cards.len() as u32 >= limit {
                break;
            }
        }

        info!(
            "Candidate feed assembled for {}: {} cards ({} excluded)",
            identity.user_id,
            cards.len(),
            swiped.len()
        );

        Ok(cards)
    }
}

impl<'a> CardFeed for FeedService<'a> {
    async fn fetch_feed(&self, identity: &Identity, limit: u32) -> Result<FeedBatch, FeedError> {
        let batch = match identity.role {
            UserRole::Seeker => self.fetch_jobs(identity, limit).await,
            UserRole::Recruiter => self.fetch_candidates(identity, limit).await,
        };
        Ok(batch)
    }

    async fn refresh(&self, identity: &Identity) {
        // Stateless service: nothing cached server-side. The controller
        // discards its stack; the ledger is untouched.
        info!("Feed refresh requested by {}", identity.user_id);
    }
}

fn sample_job_batch(limit: u32) -> FeedBatch {
    let mut cards: Vec<Card> = sample_jobs().into_iter().map(Card::Job).collect();
    cards.truncate(limit as usize);
    FeedBatch {
        origin: FeedOrigin::Sample,
        cards,
    }
}

fn sample_candidate_batch(limit: u32) -> FeedBatch {
    let mut cards: Vec<Card> = sample_candidates()
        .into_iter()
        .map(Card::Candidate)
        .collect();
    cards.truncate(limit as usize);
    FeedBatch {
        origin: FeedOrigin::Sample,
        cards,
    }
}

pub fn sample_jobs() -> Vec<JobCard> {
    vec![
        JobCard {
            id: "sample-job-1".to_string(),
            recruiter_id: "sample-recruiter".to_string(),
            title: "Backend Engineer".to_string(),
            company: "Northwind Labs".to_string(),
            location: "Remote".to_string(),
            salary: Some("$120k-$150k".to_string()),
            description: "Own the services behind a high-traffic matching platform.".to_string(),
            requirements: vec!["rust".to_string(), "sql".to_string(), "docker".to_string()],
            match_score: None,
            match_reason: None,
        },
        JobCard {
            id: "sample-job-2".to_string(),
            recruiter_id: "sample-recruiter".to_string(),
            title: "Data Engineer".to_string(),
            company: "Brightline".to_string(),
            location: "Berlin".to_string(),
            salary: None,
            description: "Build the pipelines that feed our ranking models.".to_string(),
            requirements: vec!["python".to_string(), "sql".to_string()],
            match_score: None,
            match_reason: None,
        },
        JobCard {
            id: "sample-job-3".to_string(),
            recruiter_id: "sample-recruiter".to_string(),
            title: "Platform Engineer".to_string(),
            company: "Harbor".to_string(),
            location: "Lisbon".to_string(),
            salary: Some("€80k".to_string()),
            description: "Keep deployments boring for forty product teams.".to_string(),
            requirements: vec!["kubernetes".to_string(), "terraform".to_string()],
            match_score: None,
            match_reason: None,
        },
    ]
}

pub fn sample_candidates() -> Vec<CandidateCard> {
    vec![
        CandidateCard {
            id: "sample-candidate-1".to_string(),
            name: "Jordan Avery".to_string(),
            title: Some("Full-stack Engineer".to_string()),
            location: Some("Remote".to_string()),
            experience: Some("6 years".to_string()),
            skills: vec!["rust".to_string(), "react".to_string(), "sql".to_string()],
            bio: Some("Shipped three products from prototype to scale.".to_string()),
            match_score: None,
            match_reason: None,
        },
        CandidateCard {
            id: "sample-candidate-2".to_string(),
            name: "Sam Okafor".to_string(),
            title: Some("Site Reliability Engineer".to_string()),
            location: Some("London".to_string()),
            experience: Some("4 years".to_string()),
            skills: vec!["kubernetes".to_string(), "go".to_string()],
            bio: Some("On-call veteran, automation first.".to_string()),
            match_score: None,
            match_reason: None,
        },
    ]
}
