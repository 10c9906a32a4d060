//! The paginated video feed.
//!
//! - [`engine`] - fetch, enrich, dedup and append pages; owns the cursor and load state
//! - [`enrich`] - per-user ownership status for fetched videos
//! - [`trigger`] - near-bottom signals from the viewport
//!
//! The trigger only signals. Its consumer calls
//! [`PaginationEngine::load_next_page`], which decides whether a fetch
//! actually happens.

mod engine;
mod enrich;
mod trigger;

pub use engine::{merge_page, FeedSnapshot, LoadOutcome, LoadState, PaginationEngine};
pub use enrich::Enricher;
pub use trigger::{load_trigger, LoadSignals, LoadTrigger};
