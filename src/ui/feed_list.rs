use crate::app::App;
use boomfeed::actions::{ActionGuard, ActionKind};
use boomfeed::api::Video;
use boomfeed::feed::{FeedSnapshot, LoadState};
use boomfeed::util::{strip_control_chars, time_ago, truncate_to_width};
use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::borrow::Cow;

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Text under the list describing where pagination stands, if anything.
pub(super) fn footer_text(feed: &FeedSnapshot) -> Option<Cow<'static, str>> {
    match feed.state {
        LoadState::Loading => Some(Cow::Borrowed("Loading videos...")),
        LoadState::Exhausted if feed.videos.is_empty() => Some(Cow::Borrowed(
            "No videos available at the moment. Please check back later.",
        )),
        LoadState::Exhausted => Some(Cow::Borrowed("You've reached the end of the feed!")),
        LoadState::Failed if feed.videos.is_empty() => Some(Cow::Owned(
            feed.error
                .clone()
                .unwrap_or_else(|| "Failed to load videos.".to_string()),
        )),
        LoadState::Failed => Some(Cow::Borrowed("Press r to reload the feed")),
        LoadState::Idle => None,
    }
}

/// Right-hand label for a feed row.
fn badge(video: &Video, guard: &ActionGuard, currency: &str, frame: usize) -> (String, Style) {
    let spinner = SPINNER[frame % SPINNER.len()];
    if guard.is_pending(ActionKind::Purchase, &video.id) {
        return (
            format!("{} Purchasing...", spinner),
            Style::default().fg(Color::Yellow),
        );
    }
    if guard.is_pending(ActionKind::Gift, &video.id) {
        return (
            format!("{} Gifting...", spinner),
            Style::default().fg(Color::Magenta),
        );
    }
    if video.is_free() {
        ("Free".to_string(), Style::default().fg(Color::Green))
    } else if video.purchased {
        ("Owned".to_string(), Style::default().fg(Color::Cyan))
    } else {
        (
            format!("Buy for {}{}", currency, video.price),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )
    }
}

/// Title style for a row; rows with a purchase or gift in flight are dimmed.
fn title_style(video: &Video, selected: bool, busy: bool) -> Style {
    let style = if selected {
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else if video.is_locked() {
        Style::default().fg(Color::Gray)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    if busy {
        style.add_modifier(Modifier::DIM | Modifier::ITALIC)
    } else {
        style
    }
}

fn video_item<'a>(app: &App, video: &'a Video, selected: bool, width: usize) -> ListItem<'a> {
    let (badge_text, badge_style) = badge(
        video,
        app.controller.guard(),
        app.controller.currency(),
        app.spinner_frame,
    );

    let title_style = title_style(video, selected, app.controller.guard().is_busy(&video.id));

    let max_title = width.saturating_sub(badge_text.chars().count() + 4);
    let title = strip_control_chars(&video.title).into_owned();
    let title = truncate_to_width(&title, max_title).into_owned();

    let posted = video
        .created_at
        .map(|at| time_ago(at, Utc::now()))
        .unwrap_or_default();
    let mut meta = strip_control_chars(video.creator_display()).into_owned();
    if !posted.is_empty() {
        meta.push_str(" · ");
        meta.push_str(&posted);
    }
    meta.push_str(" · ");
    meta.push_str(video.kind.label());

    let lock = if video.is_locked() { "🔒 " } else { "" };

    ListItem::new(vec![
        Line::from(vec![
            Span::raw(lock),
            Span::styled(title, title_style),
            Span::raw("  "),
            Span::styled(badge_text, badge_style),
        ]),
        Line::from(Span::styled(meta, Style::default().fg(Color::DarkGray))),
        Line::from(""),
    ])
}

/// Render the video feed panel
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let footer = footer_text(&app.feed);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(if footer.is_some() { 1 } else { 0 }),
        ])
        .split(area);

    let inner_width = chunks[0].width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = app
        .feed
        .videos
        .iter()
        .enumerate()
        .map(|(i, video)| video_item(app, video, i == app.selected, inner_width))
        .collect();

    let logged_in = if app.controller.session().is_logged_in() {
        ""
    } else {
        " (not logged in)"
    };
    let title = format!(" Videos - {}{} ", app.feed.videos.len(), logged_in);

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
    );
    let mut state = ListState::default();
    if !app.feed.videos.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, chunks[0], &mut state);

    if let Some(text) = footer {
        let style = match app.feed.state {
            LoadState::Failed => Style::default().fg(Color::Red),
            _ => Style::default().fg(Color::DarkGray),
        };
        f.render_widget(
            Paragraph::new(text)
                .style(style)
                .alignment(ratatui::layout::Alignment::Center),
            chunks[1],
        );
    }
}
