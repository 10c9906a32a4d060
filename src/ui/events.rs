//! Application event handling.
//!
//! This module processes background task completion events: page loads,
//! purchase and gift results, and comment thread changes.

use crate::app::{App, AppEvent, CommentsState};
use boomfeed::actions::ActionOutcome;
use boomfeed::feed::LoadOutcome;

/// Handle application events from background tasks.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::PageLoaded(outcome) => {
            app.refresh_feed();
            match outcome {
                LoadOutcome::Appended { page, added, .. } => {
                    tracing::debug!(page, added, total = app.feed.videos.len(), "Feed grew");
                    // The page may be too short to fill the screen; ask again.
                    app.observe_position();
                }
                LoadOutcome::Exhausted => tracing::debug!("Feed exhausted"),
                LoadOutcome::Failed(e) => tracing::debug!(error = %e, "Feed load failed"),
                LoadOutcome::Discarded | LoadOutcome::Skipped(_) => {}
            }
        }

        AppEvent::ActionFinished {
            kind,
            video_id,
            outcome,
        } => {
            app.actions_in_flight = app.actions_in_flight.saturating_sub(1);
            tracing::debug!(kind = kind.label(), video_id = %video_id, ?outcome, "Action finished");
            app.refresh_feed();

            if outcome.is_completed() {
                let owned = app
                    .controller
                    .engine()
                    .video(&video_id)
                    .is_some_and(|v| v.purchased);
                if let Some(view) = app.video_view.as_mut() {
                    if view.video.id == video_id && owned {
                        view.video.purchased = true;
                    }
                }
            }
            if matches!(outcome, ActionOutcome::AlreadyPending) {
                app.set_status(format!("A {} is already in progress", kind.label()));
            }
        }

        AppEvent::CommentsLoaded {
            video_id,
            generation,
            comments,
        } => {
            if generation != app.comments_generation {
                tracing::debug!(video_id = %video_id, generation, "Discarding stale comments");
                return;
            }
            if let Some(view) = app.video_view.as_mut() {
                if view.video.id == video_id {
                    view.comments = CommentsState::Loaded(comments);
                    view.selected_comment = 0;
                }
            }
        }

        AppEvent::CommentPosted { video_id, comment } => {
            let Some(view) = app.video_view.as_mut() else {
                return;
            };
            if view.video.id != video_id {
                return;
            }
            view.posting = false;
            if let Some(comment) = comment {
                view.compose = None;
                match &mut view.comments {
                    CommentsState::Loaded(comments) => comments.push(comment),
                    other => *other = CommentsState::Loaded(vec![comment]),
                }
                view.selected_comment = view.comments().len().saturating_sub(1);
            }
        }

        AppEvent::CommentDeleted {
            video_id,
            comment_id,
            outcome,
        } => {
            if !outcome.is_completed() {
                return;
            }
            let Some(view) = app.video_view.as_mut() else {
                return;
            };
            if view.video.id != video_id {
                return;
            }
            if let CommentsState::Loaded(comments) = &mut view.comments {
                comments.retain(|c| c.id != comment_id);
                let len = comments.len();
                if view.selected_comment >= len {
                    view.selected_comment = len.saturating_sub(1);
                }
            }
        }

        AppEvent::TaskPanicked { task, error } => {
            if task == "purchase" || task == "gift" {
                app.actions_in_flight = app.actions_in_flight.saturating_sub(1);
            }
            if task == "comment_post" {
                if let Some(view) = app.video_view.as_mut() {
                    view.posting = false;
                }
            }
            app.set_status(format!("Internal error in {}: {}", task, error));
        }
    }
}
