// src/types/cards.rs
//! Swipeable card variants. Jobs and candidates share a base contract
//! (id, title, subtitle, tags, description) dispatched by matching on the
//! tagged enum rather than guessing at field shapes.

use serde::{Deserialize, Serialize};

use super::TargetType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCard {
    pub id: String,
    pub recruiter_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub description: String,
    pub requirements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateCard {
    pub id: String,
    pub name: String,
    pub title: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub skills: Vec<String>,
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "card_type", rename_all = "lowercase")]
pub enum Card {
    Job(JobCard),
    Candidate(CandidateCard),
}

impl Card {
    pub fn id(&self) -> &str {
        match self {
            Card::Job(job) => &job.id,
            Card::Candidate(candidate) => &candidate.id,
        }
    }

    pub fn target_type(&self) -> TargetType {
        match self {
            Card::Job(_) => TargetType::Job,
            Card::Candidate(_) => TargetType::Candidate,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Card::Job(job) => &job.title,
            Card::Candidate(candidate) => &candidate.name,
        }
    }

    /// Secondary line under the title: company for jobs, role for candidates.
    pub fn subtitle(&self) -> &str {
        match self {
            Card::Job(job) => &job.company,
            Card::Candidate(candidate) => candidate.title.as_deref().unwrap_or(""),
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Card::Job(job) => Some(&job.location),
            Card::Candidate(candidate) => candidate.location.as_deref(),
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            Card::Job(job) => &job.requirements,
            Card::Candidate(candidate) => &candidate.skills,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Card::Job(job) => &job.description,
            Card::Candidate(candidate) => candidate.bio.as_deref().unwrap_or(""),
        }
    }
}
