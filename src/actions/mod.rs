//! User actions against a single video: purchase, gift and comments.
//!
//! Every flow follows the same order: session check, per-video guard, user
//! prompt, network call, notification. The flows are methods on
//! [`Controller`](crate::controller::Controller); this module holds the
//! guard, the outcome type and the user-facing wording.

mod comments;
mod gift;
pub mod guard;
pub mod messages;
mod purchase;

pub use guard::{ActionGuard, ActionKind, GuardError, GuardLock};

/// How a user action ended. The user has already been notified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// No session token; nothing was sent.
    NotAuthenticated,
    /// The same action is already running for this video.
    AlreadyPending,
    /// The user declined or dismissed the prompt.
    Cancelled,
    /// The service rejected the action or could not be reached.
    Failed(String),
    /// The video is not in the loaded feed.
    UnknownVideo,
}

impl ActionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ActionOutcome::Completed)
    }
}
