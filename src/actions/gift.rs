use super::{messages, ActionKind, ActionOutcome};
use crate::controller::Controller;

impl Controller {
    /// Send a gift for `video_id` with an amount the user enters.
    ///
    /// Only HTTP 201 counts as success. Nothing in the feed changes.
    pub async fn gift(&self, video_id: &str) -> ActionOutcome {
        let Some(token) = self.session.token() else {
            self.notifications.info("Please log in to gift videos.");
            return ActionOutcome::NotAuthenticated;
        };

        if self.engine.video(video_id).is_none() {
            tracing::warn!(video_id = %video_id, "Gift requested for unknown video");
            return ActionOutcome::UnknownVideo;
        }

        let Ok(_lock) = self.guard.begin(ActionKind::Gift, video_id) else {
            return ActionOutcome::AlreadyPending;
        };

        let amount = match self
            .amounts
            .request("Enter the amount you wish to gift:")
            .await
        {
            Ok(Some(amount)) => amount,
            Ok(None) => {
                self.notifications.info("Gift transaction cancelled.");
                return ActionOutcome::Cancelled;
            }
            Err(e) => {
                tracing::warn!(video_id = %video_id, error = %e, "Gift prompt unavailable");
                return ActionOutcome::Cancelled;
            }
        };

        tracing::info!(video_id = %video_id, amount, "Sending gift");
        match self.api.gift(video_id, amount, &token).await {
            Ok(response) if response.status == 201 => {
                self.notifications
                    .success(format!("Gift of {} sent successfully!", amount));
                ActionOutcome::Completed
            }
            Ok(response) => {
                let message = messages::unexpected_status("Failed to send gift", &response.body);
                tracing::warn!(video_id = %video_id, status = response.status, "Unexpected gift status");
                self.notifications.error(message.clone());
                ActionOutcome::Failed(message)
            }
            Err(e) => {
                tracing::error!(video_id = %video_id, error = %e, "Gift failed");
                let message = messages::gift_error(&e);
                self.notifications.error(message.clone());
                ActionOutcome::Failed(message)
            }
        }
    }
}
