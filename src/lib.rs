// src/lib.rs

pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod feed;
pub mod insight;
pub mod jobs;
pub mod ledger;
pub mod matching;
pub mod profiles;
pub mod session;
pub mod stack;
pub mod types;
pub mod web;

pub use config::ConfigManager;
pub use database::DatabaseConfig;
pub use errors::{AuthError, FeedError, LedgerError};
