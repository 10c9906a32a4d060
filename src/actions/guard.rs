use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Monetary actions that must not overlap for the same video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Purchase,
    Gift,
}

impl ActionKind {
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::Purchase => "purchase",
            ActionKind::Gift => "gift",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardError {
    #[error("A {} is already in progress for video {video_id}", kind.label())]
    AlreadyPending { kind: ActionKind, video_id: String },
}

#[derive(Default)]
struct PendingSets {
    purchases: HashSet<String>,
    gifts: HashSet<String>,
}

impl PendingSets {
    fn for_kind(&mut self, kind: ActionKind) -> &mut HashSet<String> {
        match kind {
            ActionKind::Purchase => &mut self.purchases,
            ActionKind::Gift => &mut self.gifts,
        }
    }
}

/// Per-video lock for in-flight purchases and gifts.
///
/// A purchase and a gift of the same video may run at the same time; two
/// actions of the same kind may not.
#[derive(Clone, Default)]
pub struct ActionGuard {
    pending: Arc<Mutex<PendingSets>>,
}

impl ActionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `video_id` as pending for `kind`. The returned lock releases it on drop.
    pub fn begin(&self, kind: ActionKind, video_id: &str) -> Result<GuardLock, GuardError> {
        let inserted = self
            .pending
            .lock()
            .for_kind(kind)
            .insert(video_id.to_owned());
        if !inserted {
            tracing::debug!(video_id = %video_id, kind = kind.label(), "Action already pending");
            return Err(GuardError::AlreadyPending {
                kind,
                video_id: video_id.to_owned(),
            });
        }
        Ok(GuardLock {
            pending: Arc::clone(&self.pending),
            kind,
            video_id: video_id.to_owned(),
        })
    }

    pub fn is_pending(&self, kind: ActionKind, video_id: &str) -> bool {
        self.pending.lock().for_kind(kind).contains(video_id)
    }

    /// Whether any action of either kind is in flight for `video_id`.
    pub fn is_busy(&self, video_id: &str) -> bool {
        let mut pending = self.pending.lock();
        pending.for_kind(ActionKind::Purchase).contains(video_id)
            || pending.for_kind(ActionKind::Gift).contains(video_id)
    }
}

/// Held for the duration of one action; releases the video on every exit path.
#[must_use = "the action is released as soon as the lock is dropped"]
pub struct GuardLock {
    pending: Arc<Mutex<PendingSets>>,
    kind: ActionKind,
    video_id: String,
}

impl Drop for GuardLock {
    fn drop(&mut self) {
        self.pending
            .lock()
            .for_kind(self.kind)
            .remove(&self.video_id);
        tracing::trace!(video_id = %self.video_id, kind = self.kind.label(), "Action released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_fails_until_release() {
        let guard = ActionGuard::new();
        let lock = guard.begin(ActionKind::Purchase, "v1").unwrap();
        assert!(guard.is_pending(ActionKind::Purchase, "v1"));

        let err = guard.begin(ActionKind::Purchase, "v1").err().unwrap();
        assert_eq!(
            err,
            GuardError::AlreadyPending {
                kind: ActionKind::Purchase,
                video_id: "v1".to_string()
            }
        );

        drop(lock);
        assert!(!guard.is_pending(ActionKind::Purchase, "v1"));
        assert!(guard.begin(ActionKind::Purchase, "v1").is_ok());
    }

    #[test]
    fn test_kinds_are_independent() {
        let guard = ActionGuard::new();
        let _purchase = guard.begin(ActionKind::Purchase, "v1").unwrap();
        let _gift = guard.begin(ActionKind::Gift, "v1").unwrap();
        assert!(guard.is_busy("v1"));
        assert!(!guard.is_busy("v2"));
    }

    #[test]
    fn test_different_videos_do_not_block() {
        let guard = ActionGuard::new();
        let _a = guard.begin(ActionKind::Gift, "v1").unwrap();
        assert!(guard.begin(ActionKind::Gift, "v2").is_ok());
    }

    #[test]
    fn test_release_on_early_return() {
        fn failing_action(guard: &ActionGuard) -> Result<(), &'static str> {
            let _lock = guard.begin(ActionKind::Purchase, "v9").map_err(|_| "pending")?;
            Err("network down")
        }

        let guard = ActionGuard::new();
        assert_eq!(failing_action(&guard), Err("network down"));
        assert!(!guard.is_pending(ActionKind::Purchase, "v9"));
    }

    #[test]
    fn test_clones_share_state() {
        let guard = ActionGuard::new();
        let other = guard.clone();
        let _lock = guard.begin(ActionKind::Purchase, "v1").unwrap();
        assert!(other.begin(ActionKind::Purchase, "v1").is_err());
    }
}
