// src/errors.rs
//! Domain error taxonomy. Everything here is recoverable: the swiping
//! experience degrades, it never hard-stops on a backend hiccup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization token required")]
    MissingToken,
    #[error("Invalid authorization token format")]
    InvalidToken,
    #[error("Token verification failed")]
    TokenVerificationFailed,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Account not verified")]
    AccountUnverified,
    #[error("Database error occurred")]
    DatabaseError,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The (swiper, target) pair already has a recorded decision.
    /// Benign from the UI's perspective; never creates a second row.
    #[error("A swipe for this target was already recorded")]
    DuplicateSwipe,
    /// Storage write failed or timed out. The authoritative record may be
    /// missing; callers decide whether to degrade optimistically.
    #[error("Swipe ledger unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Card feed unavailable: {0}")]
    Unavailable(String),
}
