// src/ledger.rs
//! Append-only swipe ledger. One decision per (swiper, target) pair,
//! enforced by the storage constraint so it holds under concurrent writers.

use chrono::Utc;
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::errors::LedgerError;
use crate::types::{Identity, Swipe, SwipeDirection, TargetType};

/// Bounded wait for ledger writes; expiry degrades to Unavailable instead
/// of hanging the caller.
const LEDGER_TIMEOUT_SECS: u64 = 5;

/// A successfully stored swipe plus whether the reciprocal check applies.
#[derive(Debug, Clone)]
pub struct RecordedSwipe {
    pub swipe: Swipe,
    /// Only right swipes can complete a mutual pair.
    pub check_reciprocal: bool,
}

pub struct SwipeRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SwipeRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one immutable swipe row. A second row for the same
    /// (swiper, target) pair is rejected by the unique constraint.
    pub async fn insert(&self, swipe: &Swipe) -> Result<(), LedgerError> {
        let result = sqlx::query(
            r#"
            INSERT INTO swipes (id, swiper_id, target_id, target_type, direction, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&swipe.id)
        .bind(&swipe.swiper_id)
        .bind(&swipe.target_id)
        .bind(swipe.target_type.as_str())
        .bind(swipe.direction.as_str())
        .bind(swipe.created_at)
        .execute(self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(LedgerError::DuplicateSwipe)
            }
            Err(e) => Err(LedgerError::Unavailable(e.to_string())),
        }
    }

    /// Whether a right swipe exists from `swiper_id` on `target_id`.
    pub async fn has_right_swipe(
        &self,
        swiper_id: &str,
        target_id: &str,
        target_type: TargetType,
    ) -> Result<bool, LedgerError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM swipes
            WHERE swiper_id = ? AND target_id = ? AND target_type = ? AND direction = 'right'
            "#,
        )
        .bind(swiper_id)
        .bind(target_id)
        .bind(target_type.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| LedgerError::Unavailable(e.to_string()))?;

        Ok(count > 0)
    }

    /// Every target id the user has already decided on, for feed exclusion.
    pub async fn swiped_target_ids(
        &self,
        swiper_id: &str,
        target_type: TargetType,
    ) -> Result<Vec<String>, LedgerError> {
        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT target_id FROM swipes
            WHERE swiper_id = ? AND target_type = ?
            "#,
        )
        .bind(swiper_id)
        .bind(target_type.as_str())
        .fetch_all(self.pool)
        .await
        .map_err(|e| LedgerError::Unavailable(e.to_string()))?;

        Ok(ids)
    }
}

pub struct SwipeLedger<'a> {
    repo: SwipeRepository<'a>,
}

impl<'a> SwipeLedger<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            repo: SwipeRepository::new(pool),
        }
    }

    /// Record a swipe decision for the authenticated identity. The swiper
    /// id always comes from `identity`; callers cannot record swipes on
    /// behalf of others.
    pub async fn record_swipe(
        &self,
        identity: &Identity,
        target_id: &str,
        target_type: TargetType,
        direction: SwipeDirection,
    ) -> Result<RecordedSwipe, LedgerError> {
        let swipe = Swipe {
            id: Uuid::new_v4().to_string(),
            swiper_id: identity.user_id.clone(),
            target_id: target_id.to_string(),
            target_type,
            direction,
            created_at: Utc::now(),
        };

        let insert = self.repo.insert(&swipe);
        match tokio::time::timeout(Duration::from_secs(LEDGER_TIMEOUT_SECS), insert).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(LedgerError::Unavailable(
                    "ledger write timed out".to_string(),
                ))
            }
        }

        info!(
            "Swipe recorded: {} -> {} ({}, {})",
            swipe.swiper_id,
            swipe.target_id,
            swipe.target_type.as_str(),
            swipe.direction.as_str()
        );

        Ok(RecordedSwipe {
            check_reciprocal: direction == SwipeDirection::Right,
            swipe,
        })
    }

    pub fn repository(&self) -> &SwipeRepository<'a> {
        &self.repo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;
    use crate::types::UserRole;

    fn alice() -> Identity {
        Identity::new("alice", UserRole::Seeker, "Alice")
    }

    #[tokio::test]
    async fn second_swipe_on_same_target_is_rejected() {
        let pool = test_pool().await;
        let ledger = SwipeLedger::new(&pool);

        let first = ledger
            .record_swipe(&alice(), "j1", TargetType::Job, SwipeDirection::Right)
            .await
            .unwrap();
        assert!(first.check_reciprocal);

        // Same pair, even with the opposite direction: no second row.
        let second = ledger
            .record_swipe(&alice(), "j1", TargetType::Job, SwipeDirection::Left)
            .await;
        assert!(matches!(second, Err(LedgerError::DuplicateSwipe)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM swipes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn left_swipes_skip_the_reciprocal_check() {
        let pool = test_pool().await;
        let ledger = SwipeLedger::new(&pool);

        let recorded = ledger
            .record_swipe(&alice(), "j2", TargetType::Job, SwipeDirection::Left)
            .await
            .unwrap();
        assert!(!recorded.check_reciprocal);
    }

    #[tokio::test]
    async fn swiped_targets_are_tracked_per_type() {
        let pool = test_pool().await;
        let ledger = SwipeLedger::new(&pool);

        ledger
            .record_swipe(&alice(), "j1", TargetType::Job, SwipeDirection::Right)
            .await
            .unwrap();
        ledger
            .record_swipe(&alice(), "j2", TargetType::Job, SwipeDirection::Left)
            .await
            .unwrap();

        let mut ids = ledger
            .repository()
            .swiped_target_ids("alice", TargetType::Job)
            .await
            .unwrap();
        ids.sort();
        assert_eq!(ids, vec!["j1", "j2"]);

        assert!(ledger
            .repository()
            .swiped_target_ids("alice", TargetType::Candidate)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn right_swipe_lookup_matches_direction() {
        let pool = test_pool().await;
        let ledger = SwipeLedger::new(&pool);

        ledger
            .record_swipe(&alice(), "j1", TargetType::Job, SwipeDirection::Right)
            .await
            .unwrap();
        ledger
            .record_swipe(&alice(), "j2", TargetType::Job, SwipeDirection::Left)
            .await
            .unwrap();

        let repo = ledger.repository();
        assert!(repo.has_right_swipe("alice", "j1", TargetType::Job).await.unwrap());
        assert!(!repo.has_right_swipe("alice", "j2", TargetType::Job).await.unwrap());
        assert!(!repo.has_right_swipe("alice", "j3", TargetType::Job).await.unwrap());
    }
}
