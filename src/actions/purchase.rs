use super::{messages, ActionKind, ActionOutcome};
use crate::controller::Controller;

impl Controller {
    /// Buy `video_id` after the user confirms the price.
    ///
    /// On success the video is flipped to purchased in the feed. The guard
    /// lock is held from before the prompt until the flow returns.
    pub async fn purchase(&self, video_id: &str) -> ActionOutcome {
        let Some(token) = self.session.token() else {
            self.notifications
                .info("You must be logged in to purchase videos.");
            return ActionOutcome::NotAuthenticated;
        };

        let Some(video) = self.engine.video(video_id) else {
            tracing::warn!(video_id = %video_id, "Purchase requested for unknown video");
            return ActionOutcome::UnknownVideo;
        };

        let Ok(_lock) = self.guard.begin(ActionKind::Purchase, video_id) else {
            return ActionOutcome::AlreadyPending;
        };

        let prompt = format!(
            "Are you sure you want to buy this video for {}{}?",
            self.currency, video.price
        );
        match self.confirmations.request(prompt).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(video_id = %video_id, "Purchase declined");
                return ActionOutcome::Cancelled;
            }
            Err(e) => {
                tracing::warn!(video_id = %video_id, error = %e, "Purchase prompt unavailable");
                return ActionOutcome::Cancelled;
            }
        }

        tracing::info!(video_id = %video_id, price = video.price, "Purchasing video");
        match self.api.purchase(video_id, &token).await {
            Ok(response) if matches!(response.status, 200 | 201) => {
                self.engine.mark_purchased(video_id);
                self.notifications.success("Video purchased successfully!");
                ActionOutcome::Completed
            }
            Ok(response) => {
                let message = messages::unexpected_status("Purchase failed", &response.body);
                tracing::warn!(video_id = %video_id, status = response.status, "Unexpected purchase status");
                self.notifications.error(message.clone());
                ActionOutcome::Failed(message)
            }
            Err(e) => {
                tracing::error!(video_id = %video_id, error = %e, "Purchase failed");
                let message = messages::purchase_error(&e);
                self.notifications.error(message.clone());
                ActionOutcome::Failed(message)
            }
        }
    }
}
