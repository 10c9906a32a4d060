//! Render functions for the TUI.
//!
//! This module handles all rendering logic, dispatching to the appropriate
//! view based on application state.

use crate::app::{App, View};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    widgets::Paragraph,
    Frame,
};

use super::{feed_list, overlays, status, video};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 12;

/// Main render dispatch function.
///
/// Routes to the appropriate view renderer, then draws toasts and any open
/// dialog on top.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    match app.view {
        View::Feed => feed_list::render(f, app, chunks[0]),
        View::Video => video::render(f, app, chunks[0]),
    }
    status::render(f, app, chunks[1]);

    let toasts = app.controller.notifications().active();
    if !toasts.is_empty() {
        overlays::render_toasts(f, &toasts);
    }

    // Only one dialog can be open at a time; the amount prompt wins if both are.
    if let Some(message) = app.controller.amounts().message() {
        overlays::render_amount(f, app, &message);
    } else if let Some(message) = app.controller.confirmations().message() {
        overlays::render_confirm(f, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boomfeed::api::ApiClient;
    use boomfeed::config::Config;
    use boomfeed::controller::Controller;
    use boomfeed::feed::load_trigger;
    use boomfeed::session::Session;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Duration;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn test_app() -> App {
        let api = ApiClient::new("http://127.0.0.1:9/api", Duration::from_secs(1)).unwrap();
        let controller =
            Controller::with_api(api, &Config::default(), Session::in_memory(None, None));
        let (trigger, _signals) = load_trigger(2);
        App::new(controller, trigger)
    }

    #[tokio::test]
    async fn test_small_terminal_shows_notice() {
        let app = test_app();
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        assert!(buffer_text(&terminal).contains("Terminal too small"));
    }

    #[tokio::test]
    async fn test_feed_view_renders_toasts() {
        let app = test_app();
        app.controller.notifications().success("Video purchased successfully!");
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Videos - 0"));
        assert!(text.contains("Video purchased successfully!"));
    }
}
