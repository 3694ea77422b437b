// src/profiles.rs
//! Profile storage: the base identity row plus the seeker-side card data.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

use crate::types::{Identity, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub full_name: Option<String>,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn identity(&self) -> Identity {
        Identity::new(
            self.user_id.clone(),
            self.role,
            self.full_name.clone().unwrap_or_else(|| self.email.clone()),
        )
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ProfileRow {
    user_id: String,
    full_name: Option<String>,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> Result<Profile> {
        Ok(Profile {
            user_id: self.user_id,
            full_name: self.full_name,
            email: self.email,
            role: UserRole::from_str(&self.role)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeekerProfile {
    pub user_id: String,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SeekerProfileRow {
    user_id: String,
    title: Option<String>,
    bio: Option<String>,
    location: Option<String>,
    experience: Option<String>,
    skills: String,
}

impl SeekerProfileRow {
    fn into_seeker_profile(self) -> SeekerProfile {
        SeekerProfile {
            user_id: self.user_id,
            title: self.title,
            bio: self.bio,
            location: self.location,
            experience: self.experience,
            skills: serde_json::from_str(&self.skills).unwrap_or_default(),
        }
    }
}

pub struct ProfileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, user_id: &str) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, full_name, email, role, created_at, updated_at
            FROM profiles
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(ProfileRow::into_profile).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, full_name, email, role, created_at, updated_at
            FROM profiles
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(ProfileRow::into_profile).transpose()
    }

    /// Create or update the base profile for an authenticated user.
    pub async fn upsert(
        &self,
        user_id: &str,
        full_name: Option<&str>,
        email: &str,
        role: UserRole,
    ) -> Result<Profile> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, full_name, email, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                full_name = excluded.full_name,
                email = excluded.email,
                role = excluded.role,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(full_name)
        .bind(email)
        .bind(role.as_str())
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        info!("Profile upserted for user: {}", user_id);

        self.find(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Profile missing after upsert: {}", user_id))
    }
}

pub struct SeekerProfileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SeekerProfileRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, user_id: &str) -> Result<Option<SeekerProfile>> {
        let row = sqlx::query_as::<_, SeekerProfileRow>(
            r#"
            SELECT user_id, title, bio, location, experience, skills
            FROM seeker_profiles
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(SeekerProfileRow::into_seeker_profile))
    }

    /// Create or update the seeker-side card data. Called on profile upsert
    /// for SEEKER users; a bare shell row is enough to appear in the
    /// recruiter feed.
    pub async fn upsert(
        &self,
        user_id: &str,
        title: Option<&str>,
        bio: Option<&str>,
        location: Option<&str>,
        experience: Option<&str>,
        skills: &[String],
    ) -> Result<SeekerProfile> {
        let now = Utc::now();
        let skills_json = serde_json::to_string(skills)?;

        sqlx::query(
            r#"
            INSERT INTO seeker_profiles
                (user_id, title, bio, location, experience, skills, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                title = COALESCE(excluded.title, seeker_profiles.title),
                bio = COALESCE(excluded.bio, seeker_profiles.bio),
                location = COALESCE(excluded.location, seeker_profiles.location),
                experience = COALESCE(excluded.experience, seeker_profiles.experience),
                skills = CASE WHEN excluded.skills = '[]'
                              THEN seeker_profiles.skills
                              ELSE excluded.skills END,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(bio)
        .bind(location)
        .bind(experience)
        .bind(&skills_json)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        self.find(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Seeker profile missing after upsert: {}", user_id))
    }

    /// All seekers with their display names, for the recruiter feed.
    pub async fn list_with_names(&self, limit: i64) -> Result<Vec<(SeekerProfile, String)>> {
        #[derive(sqlx::FromRow)]
        struct JoinedRow {
            user_id: String,
            title: Option<String>,
            bio: Option<String>,
            location: Option<String>,
            experience: Option<String>,
            skills: String,
            full_name: Option<String>,
            email: String,
        }

        let rows = sqlx::query_as::<_, JoinedRow>(
            r#"
            SELECT sp.user_id, sp.title, sp.bio, sp.location, sp.experience, sp.skills,
                   p.full_name, p.email
            FROM seeker_profiles sp
            JOIN profiles p ON p.user_id = sp.user_id
            ORDER BY sp.updated_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let name = row.full_name.clone().unwrap_or_else(|| row.email.clone());
                let profile = SeekerProfileRow {
                    user_id: row.user_id,
                    title: row.title,
                    bio: row.bio,
                    location: row.location,
                    experience: row.experience,
                    skills: row.skills,
                }
                .into_seeker_profile();
                (profile, name)
            })
            .collect())
    }
}
