// src/types/mod.rs

pub mod cards;
pub mod swipes;

pub use cards::{Card, CandidateCard, JobCard};
pub use swipes::{MatchRecord, Swipe, SwipeDirection, TargetType};

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Seeker,
    Recruiter,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Seeker => "SEEKER",
            UserRole::Recruiter => "RECRUITER",
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SEEKER" => Ok(UserRole::Seeker),
            "RECRUITER" => Ok(UserRole::Recruiter),
            other => anyhow::bail!("Unknown user role: {}", other),
        }
    }
}

/// Authenticated identity for the duration of a session.
/// Immutable once issued; a new login produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub role: UserRole,
    pub display_name: String,
}

impl Identity {
    pub fn new(
        user_id: impl Into<String>,
        role: UserRole,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            display_name: display_name.into(),
        }
    }
}
