// src/web/handlers/mod.rs

pub mod feed_handlers;
pub mod job_handlers;
pub mod match_handlers;
pub mod profile_handlers;
pub mod swipe_handlers;
pub mod system_handlers;

pub use feed_handlers::*;
pub use job_handlers::*;
pub use match_handlers::*;
pub use profile_handlers::*;
pub use swipe_handlers::*;
pub use system_handlers::*;
