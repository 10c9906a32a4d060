use boomfeed::actions::{ActionKind, ActionOutcome};
use boomfeed::api::{Comment, Video};
use boomfeed::controller::Controller;
use boomfeed::feed::{FeedSnapshot, LoadOutcome, LoadTrigger};
use std::borrow::Cow;
use tokio::time::Instant;

/// How long a status-bar hint stays visible.
const STATUS_TTL_SECS: u64 = 3;

// ============================================================================
// Views
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Feed,
    Video,
}

/// Comment thread of the open video.
#[derive(Debug, Clone, PartialEq)]
pub enum CommentsState {
    /// Not logged in; the thread is not fetched.
    Unavailable,
    Loading,
    Loaded(Vec<Comment>),
}

/// The video opened from the feed, with its comment thread.
pub struct VideoView {
    pub video: Video,
    pub comments: CommentsState,
    pub selected_comment: usize,
    /// Text being composed; `Some` while the compose line has focus.
    pub compose: Option<String>,
    pub posting: bool,
}

impl VideoView {
    pub fn new(video: Video, logged_in: bool) -> Self {
        Self {
            video,
            comments: if logged_in {
                CommentsState::Loading
            } else {
                CommentsState::Unavailable
            },
            selected_comment: 0,
            compose: None,
            posting: false,
        }
    }

    pub fn comments(&self) -> &[Comment] {
        match &self.comments {
            CommentsState::Loaded(comments) => comments,
            _ => &[],
        }
    }

    pub fn selected_comment(&self) -> Option<&Comment> {
        self.comments().get(self.selected_comment)
    }
}

// ============================================================================
// Background Events
// ============================================================================

/// Results sent back to the UI loop by spawned tasks.
#[derive(Debug)]
pub enum AppEvent {
    PageLoaded(LoadOutcome),
    ActionFinished {
        kind: ActionKind,
        video_id: String,
        outcome: ActionOutcome,
    },
    /// Comments for the video view opened at `generation`.
    CommentsLoaded {
        video_id: String,
        generation: u64,
        comments: Vec<Comment>,
    },
    CommentPosted {
        video_id: String,
        comment: Option<Comment>,
    },
    CommentDeleted {
        video_id: String,
        comment_id: String,
        outcome: ActionOutcome,
    },
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

// ============================================================================
// App State
// ============================================================================

pub struct App {
    pub controller: Controller,
    pub trigger: LoadTrigger,
    pub view: View,
    /// Last rendered copy of the feed; refreshed after every feed change.
    pub feed: FeedSnapshot,
    pub selected: usize,
    pub video_view: Option<VideoView>,
    /// Bumped whenever a video view opens, so late comment loads for an
    /// earlier view are dropped.
    pub comments_generation: u64,
    /// Raw text typed into the gift amount prompt.
    pub amount_input: String,
    pub amount_error: Option<String>,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    pub spinner_frame: usize,
    /// Monetary actions spawned and not yet reported back.
    pub actions_in_flight: usize,
    /// What the overlays looked like at the last tick; a change forces a redraw.
    pub overlay_fingerprint: (Option<u64>, usize, bool, bool),
}

impl App {
    pub fn new(controller: Controller, trigger: LoadTrigger) -> Self {
        let feed = controller.snapshot();
        Self {
            controller,
            trigger,
            view: View::Feed,
            feed,
            selected: 0,
            video_view: None,
            comments_generation: 0,
            amount_input: String::new(),
            amount_error: None,
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
            actions_in_flight: 0,
            overlay_fingerprint: (None, 0, false, false),
        }
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear status message if expired. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    /// Re-read the feed from the engine and keep the selection in range.
    pub fn refresh_feed(&mut self) {
        self.feed = self.controller.snapshot();
        self.clamp_selection();
        self.needs_redraw = true;
    }

    pub fn clamp_selection(&mut self) {
        let len = self.feed.videos.len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    pub fn selected_video(&self) -> Option<&Video> {
        self.feed.videos.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.feed.videos.len() {
            self.selected += 1;
        }
        self.observe_position();
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Report the selection to the load trigger.
    pub fn observe_position(&self) {
        self.trigger
            .observe(self.selected, self.feed.videos.len());
    }

    /// Start a fresh feed session and request page 1.
    pub fn reload_feed(&mut self) {
        self.controller.reset();
        self.selected = 0;
        self.refresh_feed();
        self.trigger.fire();
    }

    /// Open the video view for `video`. Returns the generation for its comment load.
    pub fn open_video(&mut self, video: Video) -> u64 {
        self.comments_generation = self.comments_generation.wrapping_add(1);
        let logged_in = self.controller.session().is_logged_in();
        self.video_view = Some(VideoView::new(video, logged_in));
        self.view = View::Video;
        self.needs_redraw = true;
        self.comments_generation
    }

    pub fn close_video(&mut self) {
        self.video_view = None;
        self.view = View::Feed;
        self.needs_redraw = true;
    }

    /// Whether a dialog overlay currently owns the keyboard.
    pub fn dialog_open(&self) -> bool {
        self.controller.confirmations().is_open() || self.controller.amounts().is_open()
    }

    /// Cheap summary of toast and dialog visibility.
    pub fn current_overlay_fingerprint(&self) -> (Option<u64>, usize, bool, bool) {
        let toasts = self.controller.notifications().active();
        (
            toasts.last().map(|n| n.id),
            toasts.len(),
            self.controller.confirmations().is_open(),
            self.controller.amounts().is_open(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boomfeed::api::ApiClient;
    use boomfeed::config::Config;
    use boomfeed::feed::load_trigger;
    use boomfeed::session::Session;
    use std::time::Duration;

    fn test_app() -> App {
        let api = ApiClient::new("http://127.0.0.1:9/api", Duration::from_secs(1)).unwrap();
        let controller = Controller::with_api(api, &Config::default(), Session::in_memory(None, None));
        let (trigger, _signals) = load_trigger(2);
        App::new(controller, trigger)
    }

    #[tokio::test]
    async fn test_set_status_triggers_redraw() {
        let mut app = test_app();
        app.needs_redraw = false;
        app.set_status("Hello");
        assert!(app.needs_redraw);
        assert!(!app.clear_expired_status());
    }

    #[tokio::test]
    async fn test_selection_on_empty_feed() {
        let mut app = test_app();
        app.select_next();
        app.select_prev();
        assert_eq!(app.selected, 0);
        assert!(app.selected_video().is_none());
    }

    #[tokio::test]
    async fn test_open_video_without_session_skips_comments() {
        let mut app = test_app();
        let video: Video = Video::from_raw(
            serde_json::from_value(serde_json::json!({ "_id": "v1", "price": 0 })).unwrap(),
            true,
        );
        let first = app.open_video(video.clone());
        let second = app.open_video(video);
        assert!(second > first);
        assert_eq!(app.view, View::Video);
        assert_eq!(
            app.video_view.as_ref().map(|v| v.comments.clone()),
            Some(CommentsState::Unavailable)
        );

        app.close_video();
        assert_eq!(app.view, View::Feed);
        assert!(app.video_view.is_none());
    }
}
