//! Toast stack and dialog overlays drawn on top of every view.

use crate::app::App;
use boomfeed::notify::{Notification, Severity};
use boomfeed::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const TOAST_WIDTH: u16 = 44;
const MAX_TOASTS: usize = 4;

pub(super) fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Blue,
        Severity::Success => Color::Green,
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
    }
}

/// Centered rect of at most `width` x `height`, or `None` if it would be unusable.
fn centered(area: Rect, width: u16, height: u16) -> Option<Rect> {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    if width < 10 || height < 5 {
        return None;
    }
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Some(Rect::new(x, y, width, height))
}

/// Newest toasts stacked in the top-right corner.
pub fn render_toasts(f: &mut Frame, toasts: &[Notification]) {
    let area = f.area();
    let width = TOAST_WIDTH.min(area.width.saturating_sub(2));
    if width < 10 {
        return;
    }
    let x = area.x + area.width.saturating_sub(width + 1);
    let mut y = area.y + 1;

    for toast in toasts.iter().rev().take(MAX_TOASTS) {
        if y + 3 > area.y + area.height {
            break;
        }
        let rect = Rect::new(x, y, width, 3);
        let color = severity_color(toast.severity);
        let text = strip_control_chars(&toast.message).into_owned();
        let text = truncate_to_width(&text, width.saturating_sub(4) as usize).into_owned();

        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(text).style(Style::default().fg(color)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            ),
            rect,
        );
        y += 3;
    }
}

pub fn render_confirm(f: &mut Frame, message: &str) {
    let Some(overlay) = centered(f.area(), 56, 7) else {
        return;
    };

    f.render_widget(Clear, overlay);
    let text = format!(
        "{}\n\n(y/Enter) Confirm  (n) Cancel  (Esc) Close",
        strip_control_chars(message)
    );
    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Confirm "),
        );
    f.render_widget(paragraph, overlay);
}

pub fn render_amount(f: &mut Frame, app: &App, message: &str) {
    let Some(overlay) = centered(f.area(), 50, 9) else {
        return;
    };

    f.render_widget(Clear, overlay);
    let mut lines = vec![
        Line::from(strip_control_chars(message).into_owned()),
        Line::from(""),
        Line::from(vec![
            Span::raw(format!("{} ", app.controller.currency())),
            Span::styled(
                format!("{}_", app.amount_input),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
    ];
    if let Some(err) = &app.amount_error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from("(Enter) Send  (Esc) Cancel"));
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta))
            .title(" Send a gift "),
    );
    f.render_widget(paragraph, overlay);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_fits_inside_area() {
        let area = Rect::new(0, 0, 80, 24);
        let rect = centered(area, 56, 7).unwrap();
        assert_eq!(rect, Rect::new(12, 8, 56, 7));
    }

    #[test]
    fn test_centered_rejects_tiny_area() {
        assert!(centered(Rect::new(0, 0, 12, 6), 56, 7).is_none());
    }
}
