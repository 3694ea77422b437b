// src/database.rs
use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug)]
pub struct DatabaseConfig {
    pub database_path: PathBuf,
    pub pool: Option<SqlitePool>,
}

impl DatabaseConfig {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            database_path,
            pool: None,
        }
    }

    /// Initialize the database connection pool
    pub async fn init_pool(&mut self) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", self.database_path.display());

        let pool = SqlitePool::connect(&database_url)
            .await
            .context("Failed to connect to SQLite database")?;
        self.pool = Some(pool);

        info!("Database connection pool initialized: {}", database_url);
        Ok(())
    }

    /// Initialize an in-memory database for offline/demo runs and tests.
    /// Single connection: separate pool connections would each see their
    /// own empty memory database.
    pub async fn init_in_memory(&mut self) -> Result<()> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory SQLite database")?;
        self.pool = Some(pool);

        info!("In-memory database initialized");
        Ok(())
    }

    /// Get the database pool
    pub fn pool(&self) -> Result<&SqlitePool> {
        self.pool.as_ref().ok_or_else(|| {
            anyhow::anyhow!("Database pool not initialized. Call init_pool() first.")
        })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        let pool = self.pool()?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                user_id TEXT PRIMARY KEY,
                full_name TEXT,
                email TEXT NOT NULL UNIQUE,
                role TEXT NOT NULL CHECK (role IN ('SEEKER', 'RECRUITER')),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS seeker_profiles (
                user_id TEXT PRIMARY KEY REFERENCES profiles(user_id),
                title TEXT,
                bio TEXT,
                location TEXT,
                experience TEXT,
                skills TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id TEXT PRIMARY KEY,
                recruiter_id TEXT NOT NULL,
                title TEXT NOT NULL,
                company TEXT NOT NULL,
                location TEXT NOT NULL,
                salary TEXT,
                description TEXT NOT NULL,
                requirements TEXT NOT NULL DEFAULT '[]',
                status TEXT NOT NULL DEFAULT 'active',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Append-only swipe ledger. The unique pair constraint enforces
        // at-most-one decision per (swiper, target); concurrent duplicate
        // submissions are rejected here, not by client-side locking.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS swipes (
                id TEXT PRIMARY KEY,
                swiper_id TEXT NOT NULL,
                target_id TEXT NOT NULL,
                target_type TEXT NOT NULL CHECK (target_type IN ('job', 'candidate')),
                direction TEXT NOT NULL CHECK (direction IN ('left', 'right')),
                created_at TEXT NOT NULL,
                UNIQUE (swiper_id, target_id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Matches are unique per (seeker, recruiter, job). Both reciprocal
        // trigger paths converge on this key via INSERT OR IGNORE.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS matches (
                id TEXT PRIMARY KEY,
                seeker_id TEXT NOT NULL,
                recruiter_id TEXT NOT NULL,
                job_id TEXT NOT NULL,
                matched_at TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'active',
                UNIQUE (seeker_id, recruiter_id, job_id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_swipes_swiper
            ON swipes(swiper_id, target_type);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_jobs_recruiter
            ON jobs(recruiter_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_matches_seeker
            ON matches(seeker_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_matches_recruiter
            ON matches(recruiter_id);
            "#,
        )
        .execute(pool)
        .await?;

        info!("Database migrations completed successfully");
        Ok(())
    }
}

#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let mut config = DatabaseConfig::new(PathBuf::from(":memory:"));
    config.init_in_memory().await.unwrap();
    config.migrate().await.unwrap();
    config.pool.unwrap()
}
