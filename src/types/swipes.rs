// src/types/swipes.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    /// Pass / reject.
    Left,
    /// Like / interest.
    Right,
}

impl SwipeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
        }
    }
}

impl FromStr for SwipeDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(SwipeDirection::Left),
            "right" => Ok(SwipeDirection::Right),
            other => anyhow::bail!("Unknown swipe direction: {}", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Job,
    Candidate,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Job => "job",
            TargetType::Candidate => "candidate",
        }
    }
}

impl FromStr for TargetType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "job" => Ok(TargetType::Job),
            "candidate" => Ok(TargetType::Candidate),
            other => anyhow::bail!("Unknown target type: {}", other),
        }
    }
}

/// One immutable swipe decision. Swipes are append-only and never deleted;
/// the (swiper_id, target_id) pair is unique across the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swipe {
    pub id: String,
    pub swiper_id: String,
    pub target_id: String,
    pub target_type: TargetType,
    pub direction: SwipeDirection,
    pub created_at: DateTime<Utc>,
}

/// A mutual-interest match between a seeker and a recruiter, scoped by the
/// job that connected them. Unique per (seeker, recruiter, job) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: String,
    pub seeker_id: String,
    pub recruiter_id: String,
    pub job_id: String,
    pub matched_at: DateTime<Utc>,
    pub status: String,
}
