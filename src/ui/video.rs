use crate::app::{App, CommentsState, VideoView};
use boomfeed::api::Comment;
use boomfeed::util::{strip_control_chars, time_ago};
use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Author label for a comment; the current user's own comments are marked.
pub(super) fn author_label(comment: &Comment, current_user: Option<&str>) -> String {
    let name = strip_control_chars(comment.author_name()).into_owned();
    match (comment.author_id(), current_user) {
        (Some(author), Some(me)) if author == me => format!("{} (You)", name),
        _ => name,
    }
}

/// Render the video detail view with its comment thread
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let Some(view) = app.video_view.as_ref() else {
        let paragraph = Paragraph::new("No video selected")
            .block(Block::default().borders(Borders::ALL).title("Video"));
        f.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Min(3),
            Constraint::Length(if view.compose.is_some() { 3 } else { 0 }),
        ])
        .split(area);

    render_details(f, app, view, chunks[0]);
    render_comments(f, app, view, chunks[1]);
    if let Some(text) = &view.compose {
        render_compose(f, view, text, chunks[2]);
    }
}

fn render_details(f: &mut Frame, app: &App, view: &VideoView, area: Rect) {
    let video = &view.video;
    let posted = video
        .created_at
        .map(|at| time_ago(at, Utc::now()))
        .unwrap_or_default();

    let price = if video.is_free() {
        "Free".to_string()
    } else {
        format!("{}{}", app.controller.currency(), video.price)
    };

    let mut lines = vec![
        Line::from(Span::styled(
            strip_control_chars(&video.title).into_owned(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "{} · {} · {} · {}",
                strip_control_chars(video.creator_display()),
                posted,
                video.kind.label(),
                price
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if let Some(url) = video.video_url.as_deref() {
        lines.push(Line::from(Span::styled(
            strip_control_chars(url).into_owned(),
            Style::default().fg(Color::Blue),
        )));
    }
    if let Some(desc) = video.description.as_deref() {
        lines.push(Line::from(""));
        lines.push(Line::from(strip_control_chars(desc).into_owned()));
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Video "),
        );
    f.render_widget(paragraph, area);
}

fn render_comments(f: &mut Frame, app: &App, view: &VideoView, area: Rect) {
    let current_user = app.controller.session().user_id();

    let items: Vec<ListItem> = match &view.comments {
        CommentsState::Unavailable => vec![ListItem::new("Log in to view and post comments.")],
        CommentsState::Loading => vec![ListItem::new("Loading comments...")],
        CommentsState::Loaded(comments) if comments.is_empty() => {
            vec![ListItem::new("No comments yet. Be the first to comment!")]
        }
        CommentsState::Loaded(comments) => comments
            .iter()
            .enumerate()
            .map(|(i, comment)| {
                let posted = comment
                    .created_at
                    .map(|at| time_ago(at, Utc::now()))
                    .unwrap_or_default();
                let author_style = if i == view.selected_comment {
                    Style::default()
                        .bg(Color::DarkGray)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().add_modifier(Modifier::BOLD)
                };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(
                            author_label(comment, current_user.as_deref()),
                            author_style,
                        ),
                        Span::styled(
                            format!("  {}", posted),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ]),
                    Line::from(strip_control_chars(&comment.text).into_owned()),
                ])
            })
            .collect(),
    };

    let title = format!(" Comments ({}) ", view.comments().len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));

    let mut state = ListState::default();
    if !view.comments().is_empty() {
        state.select(Some(view.selected_comment));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn render_compose(f: &mut Frame, view: &VideoView, text: &str, area: Rect) {
    let (title, body) = if view.posting {
        (" Posting... ", text.to_string())
    } else {
        (" New comment (Enter post, Esc cancel) ", format!("{}_", text))
    };
    let paragraph = Paragraph::new(body).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title),
    );
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(author: serde_json::Value) -> Comment {
        serde_json::from_value(serde_json::json!({
            "_id": "c1",
            "text": "nice",
            "userId": author,
        }))
        .unwrap()
    }

    #[test]
    fn test_own_comment_is_marked() {
        let c = comment(serde_json::json!({ "_id": "u1", "username": "asha" }));
        assert_eq!(author_label(&c, Some("u1")), "asha (You)");
        assert_eq!(author_label(&c, Some("u2")), "asha");
        assert_eq!(author_label(&c, None), "asha");
    }

    #[test]
    fn test_unpopulated_author_is_unknown() {
        let c = comment(serde_json::json!("u1"));
        assert_eq!(author_label(&c, Some("u1")), "Unknown User (You)");
    }
}
