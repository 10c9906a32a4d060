use super::{messages, ActionOutcome};
use crate::api::Comment;
use crate::controller::Controller;

impl Controller {
    /// Comments for `video_id`, newest first. Failures notify and yield an empty list.
    pub async fn load_comments(&self, video_id: &str) -> Vec<Comment> {
        let Some(token) = self.session.token() else {
            self.notifications.info("Please log in to view comments.");
            return Vec::new();
        };

        match self.api.list_comments(video_id, &token).await {
            Ok(mut comments) => {
                comments.reverse();
                tracing::debug!(video_id = %video_id, count = comments.len(), "Comments loaded");
                comments
            }
            Err(e) => {
                tracing::error!(video_id = %video_id, error = %e, "Failed to load comments");
                self.notifications.error("Failed to load comments.");
                Vec::new()
            }
        }
    }

    /// Post `text` on `video_id`. Returns the stored comment on success.
    pub async fn post_comment(&self, video_id: &str, text: &str) -> Option<Comment> {
        let Some(token) = self.session.token() else {
            self.notifications.info("You must be logged in to comment.");
            return None;
        };
        if text.trim().is_empty() {
            self.notifications.warning("Comment cannot be empty.");
            return None;
        }

        match self.api.post_comment(video_id, text, &token).await {
            Ok(comment) => {
                self.notifications.success("Comment posted successfully!");
                Some(comment)
            }
            Err(e) => {
                tracing::error!(video_id = %video_id, error = %e, "Failed to post comment");
                self.notifications.error(messages::post_comment_error(&e));
                None
            }
        }
    }

    /// Delete `comment_id` after the user confirms.
    pub async fn delete_comment(&self, comment_id: &str) -> ActionOutcome {
        let Some(token) = self.session.token() else {
            self.notifications
                .info("You must be logged in to delete comments.");
            return ActionOutcome::NotAuthenticated;
        };

        match self
            .confirmations
            .request("Are you sure you want to delete this comment?")
            .await
        {
            Ok(true) => {}
            Ok(false) => return ActionOutcome::Cancelled,
            Err(e) => {
                tracing::warn!(comment_id = %comment_id, error = %e, "Delete prompt unavailable");
                return ActionOutcome::Cancelled;
            }
        }

        match self.api.delete_comment(comment_id, &token).await {
            Ok(()) => {
                self.notifications.success("Comment deleted successfully!");
                ActionOutcome::Completed
            }
            Err(e) => {
                tracing::error!(comment_id = %comment_id, error = %e, "Failed to delete comment");
                let (message, severity) = messages::delete_comment_error(&e);
                self.notifications.push(message.clone(), severity);
                ActionOutcome::Failed(message)
            }
        }
    }
}
