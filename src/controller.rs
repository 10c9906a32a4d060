//! Facade the front end talks to.
//!
//! `Controller` owns one handle to each shared component. It is cheap to
//! clone, and every clone sees the same feed, guard, dialogs and
//! notifications, so spawned tasks take their own copy.

use crate::actions::{messages, ActionGuard};
use crate::api::{ApiClient, ApiError, Video};
use crate::config::Config;
use crate::dialog::{AmountPromptBridge, ConfirmationBridge};
use crate::feed::{Enricher, FeedSnapshot, LoadOutcome, PaginationEngine};
use crate::notify::NotificationQueue;
use crate::session::{Session, SessionError};

/// Whether a video can be opened for viewing or commenting.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchDecision {
    Allowed(Video),
    /// Priced and not purchased.
    Locked,
    /// Commenting needs a session.
    LoginRequired,
    Unknown,
}

#[derive(Clone)]
pub struct Controller {
    pub(crate) api: ApiClient,
    pub(crate) session: Session,
    pub(crate) engine: PaginationEngine,
    pub(crate) guard: ActionGuard,
    pub(crate) confirmations: ConfirmationBridge,
    pub(crate) amounts: AmountPromptBridge,
    pub(crate) notifications: NotificationQueue,
    pub(crate) currency: String,
}

impl Controller {
    pub fn new(config: &Config, session: Session) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api_base_url, config.request_timeout())?;
        Ok(Self::with_api(api, config, session))
    }

    /// Build around an existing client (tests point it at a mock server).
    pub fn with_api(api: ApiClient, config: &Config, session: Session) -> Self {
        let enricher = Enricher::new(api.clone(), config.ownership_check_concurrency);
        let engine = PaginationEngine::new(api.clone(), enricher, session.clone(), config.page_size);
        Self {
            api,
            session,
            engine,
            guard: ActionGuard::new(),
            confirmations: ConfirmationBridge::new(),
            amounts: AmountPromptBridge::new(),
            notifications: NotificationQueue::new(config.notification_ttl()),
            currency: config.currency_symbol.clone(),
        }
    }

    /// Load the next feed page, notifying the user if it fails.
    pub async fn load_next_page(&self) -> LoadOutcome {
        let outcome = self.engine.load_next_page().await;
        if let LoadOutcome::Failed(e) = &outcome {
            self.notifications.error(messages::page_load_error(e));
        }
        outcome
    }

    /// Drop the loaded feed and start again from page 1.
    pub fn reset(&self) {
        self.engine.reset();
    }

    /// Forget the session and reload the feed, since ownership is per user.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.session.clear()?;
        self.engine.reset();
        self.notifications.info("You have been logged out.");
        tracing::info!("Logged out");
        Ok(())
    }

    /// Decide whether `video_id` can be played.
    pub fn watch(&self, video_id: &str) -> WatchDecision {
        let Some(video) = self.engine.video(video_id) else {
            tracing::warn!(video_id = %video_id, "Watch requested for unknown video");
            return WatchDecision::Unknown;
        };
        if video.is_locked() {
            self.notifications.info("Please purchase the video to watch it.");
            return WatchDecision::Locked;
        }
        WatchDecision::Allowed(video)
    }

    /// Decide whether the comment thread of `video_id` can be opened.
    pub fn open_comments(&self, video_id: &str) -> WatchDecision {
        if !self.session.is_logged_in() {
            self.notifications.info("Please log in to comment.");
            return WatchDecision::LoginRequired;
        }
        match self.engine.video(video_id) {
            Some(video) => WatchDecision::Allowed(video),
            None => WatchDecision::Unknown,
        }
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.engine.snapshot()
    }

    pub fn engine(&self) -> &PaginationEngine {
        &self.engine
    }

    pub fn guard(&self) -> &ActionGuard {
        &self.guard
    }

    pub fn confirmations(&self) -> &ConfirmationBridge {
        &self.confirmations
    }

    pub fn amounts(&self) -> &AmountPromptBridge {
        &self.amounts
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn controller_with_page(server: &MockServer, token: Option<&str>) -> Controller {
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "_id": "free", "title": "Free", "price": 0 },
                { "_id": "paid", "title": "Paid", "price": 30 }
            ])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/videos/paid/purchased"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "purchased": false })))
            .mount(server)
            .await;

        let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let controller = Controller::with_api(
            api,
            &Config::default(),
            Session::in_memory(token, None),
        );
        controller.load_next_page().await;
        controller
    }

    #[tokio::test]
    async fn test_watch_locked_and_allowed() {
        let server = MockServer::start().await;
        let controller = controller_with_page(&server, Some("tok")).await;

        assert!(matches!(controller.watch("free"), WatchDecision::Allowed(v) if v.id == "free"));
        assert_eq!(controller.watch("paid"), WatchDecision::Locked);
        assert_eq!(controller.watch("missing"), WatchDecision::Unknown);

        let messages: Vec<String> = controller
            .notifications()
            .active()
            .into_iter()
            .map(|n| n.message)
            .collect();
        assert_eq!(messages, vec!["Please purchase the video to watch it."]);
    }

    #[tokio::test]
    async fn test_open_comments_requires_login() {
        let server = MockServer::start().await;
        let controller = controller_with_page(&server, None).await;

        assert_eq!(controller.open_comments("free"), WatchDecision::LoginRequired);
        assert_eq!(
            controller.notifications().active()[0].message,
            "Please log in to comment."
        );
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_feed() {
        let server = MockServer::start().await;
        let controller = controller_with_page(&server, Some("tok")).await;
        assert_eq!(controller.snapshot().videos.len(), 2);

        controller.logout().unwrap();
        assert!(!controller.session().is_logged_in());
        assert!(controller.snapshot().videos.is_empty());
        assert_eq!(controller.snapshot().page, 1);
    }
}
