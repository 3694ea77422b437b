// src/stack.rs
//! Card stack controller: the client-side state machine that pulls cards
//! from a feed, dispatches swipes to the ledger, and reacts to match
//! detection. Card removal is optimistic: UI responsiveness wins over
//! ledger latency, and a failed write degrades to telemetry, never to a
//! blocked gesture.

use std::future::Future;
use tracing::{debug, info, warn};

use crate::errors::{FeedError, LedgerError};
use crate::feed::{CardFeed, FeedBatch, FeedOrigin};
use crate::ledger::{RecordedSwipe, SwipeLedger};
use crate::matching::{MatchDetector, MatchOutcome};
use crate::types::{Card, Identity, MatchRecord, Swipe, SwipeDirection, TargetType};

/// Client-side seam over swipe recording plus the reciprocal check.
pub trait SwipeEngine {
    fn record_swipe(
        &self,
        identity: &Identity,
        target_id: &str,
        target_type: TargetType,
        direction: SwipeDirection,
    ) -> impl Future<Output = Result<RecordedSwipe, LedgerError>> + Send;

    fn check_match(&self, swipe: &Swipe) -> impl Future<Output = MatchOutcome> + Send;
}

/// Live binding of the client seam to the SQL-backed services.
pub struct LiveSwipeEngine<'a> {
    ledger: SwipeLedger<'a>,
    detector: MatchDetector<'a>,
}

impl<'a> LiveSwipeEngine<'a> {
    pub fn new(pool: &'a sqlx::SqlitePool) -> Self {
        Self {
            ledger: SwipeLedger::new(pool),
            detector: MatchDetector::new(pool),
        }
    }
}

impl<'a> SwipeEngine for LiveSwipeEngine<'a> {
    async fn record_swipe(
        &self,
        identity: &Identity,
        target_id: &str,
        target_type: TargetType,
        direction: SwipeDirection,
    ) -> Result<RecordedSwipe, LedgerError> {
        self.ledger
            .record_swipe(identity, target_id, target_type, direction)
            .await
    }

    async fn check_match(&self, swipe: &Swipe) -> MatchOutcome {
        self.detector.check_match(swipe).await
    }
}

/// Transient match overlay. Purely presentational; nothing is persisted
/// beyond display.
#[derive(Debug, Clone, Default)]
pub enum MatchOverlay {
    #[default]
    Hidden,
    Showing(MatchRecord),
}

impl MatchOverlay {
    pub fn notify(&mut self, record: &MatchRecord) {
        *self = MatchOverlay::Showing(record.clone());
    }

    pub fn dismiss(&mut self) {
        *self = MatchOverlay::Hidden;
    }

    pub fn visible(&self) -> Option<&MatchRecord> {
        match self {
            MatchOverlay::Showing(record) => Some(record),
            MatchOverlay::Hidden => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum StackState {
    Loading,
    Ready { cards: Vec<Card>, origin: FeedOrigin },
    Empty,
}

impl StackState {
    pub fn is_loading(&self) -> bool {
        matches!(self, StackState::Loading)
    }
}

pub struct CardStackController<F, E> {
    identity: Identity,
    feed: F,
    engine: E,
    feed_limit: u32,
    state: StackState,
    overlay: MatchOverlay,
    /// Bumped on every load/refresh; a completed fetch only applies if its
    /// token still matches, so a stale in-flight fetch can never overwrite
    /// a newer stack.
    generation: u64,
    /// Swipes shown to the user but not confirmed by the ledger.
    unsynced_swipes: u64,
}

impl<F: CardFeed, E: SwipeEngine> CardStackController<F, E> {
    pub fn new(identity: Identity, feed: F, engine: E, feed_limit: u32) -> Self {
        Self {
            identity,
            feed,
            engine,
            feed_limit,
            state: StackState::Loading,
            overlay: MatchOverlay::Hidden,
            generation: 0,
            unsynced_swipes: 0,
        }
    }

    pub fn state(&self) -> &StackState {
        &self.state
    }

    pub fn overlay(&self) -> &MatchOverlay {
        &self.overlay
    }

    pub fn dismiss_overlay(&mut self) {
        self.overlay.dismiss();
    }

    pub fn unsynced_swipes(&self) -> u64 {
        self.unsynced_swipes
    }

    pub fn top_card(&self) -> Option<&Card> {
        match &self.state {
            StackState::Ready { cards, .. } => cards.first(),
            _ => None,
        }
    }

    /// Enter LOADING and hand out the token the eventual fetch result must
    /// present. Exposed separately from `load` so callers with overlapping
    /// fetches keep last-request-wins semantics.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.state = StackState::Loading;
        self.generation
    }

    /// Apply a fetch result. Stale tokens are dropped; errors and empty
    /// batches terminate in EMPTY rather than hanging in LOADING.
    pub fn complete_load(&mut self, token: u64, result: Result<FeedBatch, FeedError>) {
        if token != self.generation {
            debug!("Dropping superseded feed fetch (token {})", token);
            return;
        }

        match result {
            Ok(batch) if !batch.cards.is_empty() => {
                info!(
                    "Stack ready for {}: {} cards ({:?})",
                    self.identity.user_id,
                    batch.cards.len(),
                    batch.origin
                );
                self.state = StackState::Ready {
                    cards: batch.cards,
                    origin: batch.origin,
                };
            }
            Ok(_) => {
                self.state = StackState::Empty;
            }
            Err(e) => {
                warn!("Feed fetch failed, stack empty: {}", e);
                self.state = StackState::Empty;
            }
        }
    }

    pub async fn load(&mut self) {
        let token = self.begin_load();
        let result = self.feed.fetch_feed(&self.identity, self.feed_limit).await;
        self.complete_load(token, result);
    }

    /// Discard the current stack and re-fetch. The swipe ledger is not
    /// touched; already-swiped cards stay excluded upstream.
    pub async fn refresh(&mut self) {
        self.feed.refresh(&self.identity).await;
        self.load().await;
    }

    /// Swipe the top card. The card leaves the stack before the ledger
    /// write resolves; a write failure is surfaced as telemetry only.
    pub async fn swipe(&mut self, direction: SwipeDirection) {
        let Some(card) = self.pop_top_card() else {
            debug!("Swipe ignored: no card on the stack");
            return;
        };

        let recorded = self
            .engine
            .record_swipe(&self.identity, card.id(), card.target_type(), direction)
            .await;

        match recorded {
            Ok(recorded) => {
                if recorded.check_reciprocal {
                    match self.engine.check_match(&recorded.swipe).await {
                        MatchOutcome::Matched(record) => self.overlay.notify(&record),
                        MatchOutcome::NoMatch => {}
                        MatchOutcome::Indeterminate(reason) => {
                            // Unknown, not "no match". The card is gone
                            // either way; a later session sees the match.
                            warn!("Match check indeterminate: {}", reason);
                        }
                    }
                }
            }
            Err(LedgerError::DuplicateSwipe) => {
                debug!("Target {} already decided; treating as no-op", card.id());
            }
            Err(LedgerError::Unavailable(reason)) => {
                self.unsynced_swipes += 1;
                warn!(
                    "Swipe on {} not confirmed by ledger ({}); {} unsynced",
                    card.id(),
                    reason,
                    self.unsynced_swipes
                );
            }
        }
    }

    fn pop_top_card(&mut self) -> Option<Card> {
        let StackState::Ready { cards, .. } = &mut self.state else {
            return None;
        };

        let card = cards.remove(0);
        if cards.is_empty() {
            self.state = StackState::Empty;
        }
        Some(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;
    use crate::feed::{sample_jobs, FeedService};
    use crate::insight::InsightClient;
    use crate::jobs::{JobRepository, NewJob};
    use crate::types::{Swipe, UserRole};
    use chrono::Utc;
    use std::sync::Mutex;
    use uuid::Uuid;

    fn seeker(id: &str) -> Identity {
        Identity::new(id, UserRole::Seeker, id)
    }

    fn job_cards(n: usize) -> Vec<Card> {
        sample_jobs().into_iter().take(n).map(Card::Job).collect()
    }

    struct FakeFeed {
        batches: Mutex<Vec<Result<FeedBatch, FeedError>>>,
    }

    impl FakeFeed {
        fn new(batches: Vec<Result<FeedBatch, FeedError>>) -> Self {
            Self {
                batches: Mutex::new(batches),
            }
        }
    }

    impl CardFeed for FakeFeed {
        async fn fetch_feed(&self, _: &Identity, _: u32) -> Result<FeedBatch, FeedError> {
            let mut batches = self.batches.lock().unwrap();
            if batches.is_empty() {
                Ok(FeedBatch {
                    origin: FeedOrigin::Live,
                    cards: vec![],
                })
            } else {
                batches.remove(0)
            }
        }

        async fn refresh(&self, _: &Identity) {}
    }

    #[derive(Default)]
    struct FakeEngine {
        ledger_down: bool,
        duplicate: bool,
        match_on_right: Option<MatchRecord>,
        recorded: Mutex<Vec<(String, SwipeDirection)>>,
    }

    impl SwipeEngine for FakeEngine {
        async fn record_swipe(
            &self,
            identity: &Identity,
            target_id: &str,
            target_type: TargetType,
            direction: SwipeDirection,
        ) -> Result<RecordedSwipe, LedgerError> {
            if self.ledger_down {
                return Err(LedgerError::Unavailable("store offline".to_string()));
            }
            if self.duplicate {
                return Err(LedgerError::DuplicateSwipe);
            }
            self.recorded
                .lock()
                .unwrap()
                .push((target_id.to_string(), direction));
            Ok(RecordedSwipe {
                check_reciprocal: direction == SwipeDirection::Right,
                swipe: Swipe {
                    id: Uuid::new_v4().to_string(),
                    swiper_id: identity.user_id.clone(),
                    target_id: target_id.to_string(),
                    target_type,
                    direction,
                    created_at: Utc::now(),
                },
            })
        }

        async fn check_match(&self, _: &Swipe) -> MatchOutcome {
            match &self.match_on_right {
                Some(record) => MatchOutcome::Matched(record.clone()),
                None => MatchOutcome::NoMatch,
            }
        }
    }

    fn live_batch(n: usize) -> Result<FeedBatch, FeedError> {
        Ok(FeedBatch {
            origin: FeedOrigin::Live,
            cards: job_cards(n),
        })
    }

    #[tokio::test]
    async fn swiping_through_the_stack_reaches_empty() {
        let feed = FakeFeed::new(vec![live_batch(2)]);
        let engine = FakeEngine::default();
        let mut controller = CardStackController::new(seeker("alice"), feed, engine, 10);

        controller.load().await;
        assert!(matches!(controller.state(), StackState::Ready { .. }));

        controller.swipe(SwipeDirection::Left).await;
        assert!(matches!(controller.state(), StackState::Ready { .. }));
        controller.swipe(SwipeDirection::Right).await;
        assert!(matches!(controller.state(), StackState::Empty));

        let recorded = controller.engine.recorded.lock().unwrap();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].1, SwipeDirection::Left);
        assert_eq!(recorded[1].1, SwipeDirection::Right);
    }

    #[tokio::test]
    async fn ledger_outage_still_removes_the_card() {
        let feed = FakeFeed::new(vec![live_batch(1)]);
        let engine = FakeEngine {
            ledger_down: true,
            ..Default::default()
        };
        let mut controller = CardStackController::new(seeker("alice"), feed, engine, 10);

        controller.load().await;
        controller.swipe(SwipeDirection::Right).await;

        // Optimistic removal happened and the miss is tracked.
        assert!(matches!(controller.state(), StackState::Empty));
        assert_eq!(controller.unsynced_swipes(), 1);
    }

    #[tokio::test]
    async fn duplicate_swipe_is_a_benign_no_op() {
        let feed = FakeFeed::new(vec![live_batch(1)]);
        let engine = FakeEngine {
            duplicate: true,
            ..Default::default()
        };
        let mut controller = CardStackController::new(seeker("alice"), feed, engine, 10);

        controller.load().await;
        controller.swipe(SwipeDirection::Right).await;

        assert!(matches!(controller.state(), StackState::Empty));
        assert_eq!(controller.unsynced_swipes(), 0);
        assert!(controller.overlay().visible().is_none());
    }

    #[tokio::test]
    async fn match_raises_the_overlay_until_dismissed() {
        let record = MatchRecord {
            id: "m1".to_string(),
            seeker_id: "alice".to_string(),
            recruiter_id: "bob".to_string(),
            job_id: "j1".to_string(),
            matched_at: Utc::now(),
            status: "active".to_string(),
        };
        let feed = FakeFeed::new(vec![live_batch(1)]);
        let engine = FakeEngine {
            match_on_right: Some(record),
            ..Default::default()
        };
        let mut controller = CardStackController::new(seeker("alice"), feed, engine, 10);

        controller.load().await;
        controller.swipe(SwipeDirection::Right).await;

        assert_eq!(controller.overlay().visible().unwrap().id, "m1");
        controller.dismiss_overlay();
        assert!(controller.overlay().visible().is_none());
    }

    #[tokio::test]
    async fn feed_error_terminates_in_empty_not_loading() {
        let feed = FakeFeed::new(vec![Err(FeedError::Unavailable("boom".to_string()))]);
        let mut controller =
            CardStackController::new(seeker("alice"), feed, FakeEngine::default(), 10);

        controller.load().await;
        assert!(matches!(controller.state(), StackState::Empty));
        assert!(!controller.state().is_loading());
    }

    #[tokio::test]
    async fn stale_fetch_cannot_overwrite_a_newer_stack() {
        let feed = FakeFeed::new(vec![]);
        let mut controller =
            CardStackController::new(seeker("alice"), feed, FakeEngine::default(), 10);

        let stale = controller.begin_load();
        let fresh = controller.begin_load();

        controller.complete_load(fresh, live_batch(1));
        assert!(matches!(controller.state(), StackState::Ready { .. }));

        // The superseded fetch resolves late with a bigger batch; ignored.
        controller.complete_load(stale, live_batch(3));
        match controller.state() {
            StackState::Ready { cards, .. } => assert_eq!(cards.len(), 1),
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[tokio::test]
    async fn refresh_leaves_the_ledger_intact_and_excludes_swiped_cards() {
        let pool = test_pool().await;
        let insight = InsightClient::new(None).unwrap();
        let jobs = JobRepository::new(&pool);
        for title in ["One", "Two"] {
            jobs.create(
                "bob",
                NewJob {
                    title: title.to_string(),
                    company: "Acme".to_string(),
                    location: "Remote".to_string(),
                    salary: None,
                    description: "Work.".to_string(),
                    requirements: vec![],
                },
            )
            .await
            .unwrap();
        }

        let feed = FeedService::new(&pool, &insight, false);
        let engine = LiveSwipeEngine::new(&pool);
        let mut controller = CardStackController::new(seeker("alice"), feed, engine, 10);

        controller.load().await;
        controller.swipe(SwipeDirection::Left).await;
        controller.refresh().await;

        // One job decided, one left; the refreshed feed excludes the first.
        match controller.state() {
            StackState::Ready { cards, origin } => {
                assert_eq!(*origin, FeedOrigin::Live);
                assert_eq!(cards.len(), 1);
            }
            other => panic!("unexpected state: {:?}", other),
        }

        let swipe_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM swipes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(swipe_count, 1);
    }
}
