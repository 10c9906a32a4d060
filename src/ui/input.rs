//! Input handling for the TUI.
//!
//! Dialog overlays capture every key while open. Otherwise keys go to the
//! handler for the current view.

use crate::app::{App, AppEvent, View};
use anyhow::Result;
use boomfeed::actions::ActionKind;
use boomfeed::controller::WatchDecision;
use boomfeed::util::validate_url_for_open;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{
    spawn_action, spawn_comment_delete, spawn_comment_post, spawn_comments_load,
};
use super::Action;

/// Longest gift amount input accepted, in characters.
const MAX_AMOUNT_INPUT: usize = 12;
/// Longest comment accepted, in characters.
const MAX_COMMENT_LENGTH: usize = 500;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Ok(Action::Quit);
    }

    if app.controller.amounts().is_open() {
        handle_amount_input(app, code);
        return Ok(Action::Continue);
    }
    if app.controller.confirmations().is_open() {
        handle_confirm_input(app, code);
        return Ok(Action::Continue);
    }

    match app.view {
        View::Feed => handle_feed_input(app, code, event_tx),
        View::Video => {
            let composing = app
                .video_view
                .as_ref()
                .is_some_and(|v| v.compose.is_some());
            if composing {
                handle_compose_input(app, code, event_tx);
                Ok(Action::Continue)
            } else {
                handle_video_input(app, code, event_tx)
            }
        }
    }
}

/// y/Enter confirms; n/Esc cancels.
fn handle_confirm_input(app: &App, code: KeyCode) {
    let confirmations = app.controller.confirmations();
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            confirmations.confirm();
        }
        KeyCode::Char('n') | KeyCode::Char('N') => {
            confirmations.cancel();
        }
        KeyCode::Esc => {
            confirmations.dismiss();
        }
        _ => {}
    }
}

fn handle_amount_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
            if app.amount_input.len() < MAX_AMOUNT_INPUT {
                app.amount_input.push(c);
                app.amount_error = None;
            }
        }
        KeyCode::Backspace => {
            app.amount_input.pop();
            app.amount_error = None;
        }
        KeyCode::Enter => match app.controller.amounts().submit_input(&app.amount_input) {
            Ok(_) => {
                app.amount_input.clear();
                app.amount_error = None;
            }
            Err(e) => app.amount_error = Some(e.to_string()),
        },
        KeyCode::Esc => {
            app.controller.amounts().dismiss();
            app.amount_input.clear();
            app.amount_error = None;
        }
        _ => {}
    }
}

fn handle_feed_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    match code {
        KeyCode::Char('q') => return Ok(Action::Quit),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Char('b') => {
            let Some(video) = app.selected_video() else {
                return Ok(Action::Continue);
            };
            if !video.is_locked() {
                let msg = if video.is_free() {
                    "This video is free"
                } else {
                    "You already own this video"
                };
                app.set_status(msg);
            } else {
                spawn_action(app, ActionKind::Purchase, event_tx);
            }
        }
        KeyCode::Char('g') => {
            app.amount_input.clear();
            app.amount_error = None;
            spawn_action(app, ActionKind::Gift, event_tx);
        }
        KeyCode::Enter | KeyCode::Char('w') => {
            let Some(video_id) = app.selected_video().map(|v| v.id.clone()) else {
                return Ok(Action::Continue);
            };
            if let WatchDecision::Allowed(video) = app.controller.watch(&video_id) {
                open_video_view(app, video, event_tx);
            }
        }
        KeyCode::Char('c') => {
            let Some(video) = app.selected_video() else {
                return Ok(Action::Continue);
            };
            if video.is_locked() {
                app.set_status("Buy this video to join the conversation");
                return Ok(Action::Continue);
            }
            let video_id = video.id.clone();
            if let WatchDecision::Allowed(video) = app.controller.open_comments(&video_id) {
                open_video_view(app, video, event_tx);
            }
        }
        KeyCode::Char('r') => {
            app.reload_feed();
            app.set_status("Reloading feed...");
        }
        KeyCode::Char('L') => {
            if !app.controller.session().is_logged_in() {
                app.set_status("Not logged in");
                return Ok(Action::Continue);
            }
            app.controller.logout()?;
            app.selected = 0;
            app.refresh_feed();
            app.trigger.fire();
        }
        KeyCode::Char('x') => {
            app.controller.notifications().dismiss_oldest();
        }
        _ => {}
    }
    Ok(Action::Continue)
}

fn open_video_view(
    app: &mut App,
    video: boomfeed::api::Video,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    tracing::debug!(video_id = %video.id, "Opening video view");
    app.open_video(video);
    if app.controller.session().is_logged_in() {
        spawn_comments_load(app, event_tx);
    }
}

fn handle_video_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    let Some(view) = app.video_view.as_mut() else {
        app.close_video();
        return Ok(Action::Continue);
    };

    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => app.close_video(),
        KeyCode::Char('j') | KeyCode::Down => {
            if view.selected_comment + 1 < view.comments().len() {
                view.selected_comment += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view.selected_comment = view.selected_comment.saturating_sub(1);
        }
        KeyCode::Char('i') | KeyCode::Enter => {
            if !view.posting {
                view.compose.get_or_insert_with(String::new);
            }
        }
        KeyCode::Char('d') => {
            if view.selected_comment().is_some() {
                spawn_comment_delete(app, event_tx);
            }
        }
        KeyCode::Char('r') => {
            app.comments_generation = app.comments_generation.wrapping_add(1);
            if let Some(view) = app.video_view.as_mut() {
                view.comments = crate::app::CommentsState::Loading;
            }
            spawn_comments_load(app, event_tx);
        }
        KeyCode::Char('o') => {
            let url = view.video.video_url.clone();
            open_video_url(app, url.as_deref());
        }
        KeyCode::Char('x') => {
            app.controller.notifications().dismiss_oldest();
        }
        _ => {}
    }
    Ok(Action::Continue)
}

fn handle_compose_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(view) = app.video_view.as_mut() else {
        return;
    };
    if view.posting {
        // Keep the text stable until the post settles
        if code == KeyCode::Esc {
            view.compose = None;
        }
        return;
    }
    let Some(text) = view.compose.as_mut() else {
        return;
    };

    match code {
        KeyCode::Esc => view.compose = None,
        KeyCode::Enter => spawn_comment_post(app, event_tx),
        KeyCode::Backspace => {
            text.pop();
        }
        KeyCode::Char(c) => {
            if text.chars().count() < MAX_COMMENT_LENGTH {
                text.push(c);
            }
        }
        _ => {}
    }
}

/// Validate the video's URL and hand it to the system browser.
fn open_video_url(app: &mut App, url: Option<&str>) {
    let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
        app.set_status("This video has no URL");
        return;
    };
    match validate_url_for_open(url) {
        Ok(url) => match open::that(url.as_str()) {
            Ok(()) => app.set_status("Opened in browser"),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to open browser");
                app.set_status(format!("Failed to open browser: {}", e));
            }
        },
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Refusing to open video URL");
            app.set_status(format!("Cannot open URL: {}", e));
        }
    }
}
