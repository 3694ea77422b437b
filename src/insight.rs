// src/insight.rs
//! AI insight collaborator plus the heuristic scoring that backs it up.
//! Insight text is cosmetic: any failure falls back to generated text and
//! never blocks card rendering or swiping.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

const GENERATE_ENDPOINT: &str = "/generate";
/// Insight text is cosmetic, so the client gives up quickly; callers fall
/// back to the heuristic reason rather than wait.
const INSIGHT_TIMEOUT_SECS: u64 = 2;

#[derive(Deserialize)]
struct GenerateResponse {
    text: String,
}

#[derive(Clone)]
pub struct InsightClient {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl InsightClient {
    /// `base_url = None` disables remote calls entirely; every request
    /// resolves to its fallback.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(INSIGHT_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, base_url })
    }

    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let base_url = self
            .base_url
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Insight service not configured"))?;
        let url = format!("{}{}", base_url, GENERATE_ENDPOINT);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await
            .context("Insight request failed")?;

        let status = response.status();
        if status.is_success() {
            let body: GenerateResponse = response
                .json()
                .await
                .context("Failed to parse insight response")?;
            Ok(body.text)
        } else {
            anyhow::bail!("Insight service returned status {}", status)
        }
    }

    /// Fire-and-forget variant: remote text when available, the supplied
    /// fallback otherwise.
    pub async fn generate_or(&self, prompt: &str, fallback: String) -> String {
        match self.generate(prompt).await {
            Ok(text) => text,
            Err(e) => {
                if self.base_url.is_some() {
                    warn!("Insight generation failed, using fallback: {}", e);
                }
                fallback
            }
        }
    }
}

/// Skill-overlap score, 0-100. Pure heuristic, no remote calls, so it can
/// run per card during feed assembly.
pub fn match_score(seeker_skills: &[String], job_requirements: &[String]) -> f64 {
    if seeker_skills.is_empty() || job_requirements.is_empty() {
        return 50.0;
    }

    let seeker: std::collections::HashSet<String> = seeker_skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .collect();
    let required: std::collections::HashSet<String> = job_requirements
        .iter()
        .map(|s| s.trim().to_lowercase())
        .collect();

    if required.is_empty() {
        return 50.0;
    }

    let overlap = seeker.intersection(&required).count();
    let percentage = overlap as f64 / required.len() as f64 * 100.0;
    percentage.min(100.0)
}

/// Human-readable one-liner explaining the score. Doubles as the fallback
/// text for the remote insight service.
pub fn match_reason(seeker_skills: &[String], job_requirements: &[String]) -> String {
    let seeker: std::collections::HashSet<String> = seeker_skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .collect();
    let required: std::collections::HashSet<String> = job_requirements
        .iter()
        .map(|s| s.trim().to_lowercase())
        .collect();

    let mut overlap: Vec<&String> = seeker.intersection(&required).collect();
    overlap.sort();

    if overlap.len() >= 3 {
        let skills: Vec<&str> = overlap.iter().take(3).map(|s| s.as_str()).collect();
        format!(
            "Strong match: your skills in {} align with the requirements.",
            skills.join(", ")
        )
    } else if !overlap.is_empty() {
        let skills: Vec<&str> = overlap.iter().map(|s| s.as_str()).collect();
        format!(
            "Good fit: your experience with {} matches the role.",
            skills.join(", ")
        )
    } else {
        "This role could help you expand your skill set.".to_string()
    }
}
