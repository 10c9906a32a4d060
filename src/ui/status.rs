use crate::app::{App, View};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let composing = app
        .video_view
        .as_ref()
        .is_some_and(|v| v.compose.is_some());

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(&**msg)
    } else if app.dialog_open() {
        Cow::Borrowed("Answer the dialog to continue")
    } else {
        match app.view {
            View::Feed => {
                if app.controller.session().is_logged_in() {
                    Cow::Borrowed(
                        "[j/k]move [Enter]watch [b]uy [g]ift [c]omments [r]eload [x]dismiss [L]ogout [q]uit",
                    )
                } else {
                    Cow::Borrowed("[j/k]move [Enter]watch [r]eload [x]dismiss [q]uit  (run with --set-token to log in)")
                }
            }
            View::Video if composing => Cow::Borrowed("Type your comment | ENTER post | ESC cancel"),
            View::Video => Cow::Borrowed(
                "[Esc]back [j/k]select [i]comment [d]elete [r]eload [o]pen in browser [q]back",
            ),
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}
