//! Helper functions for UI operations.
//!
//! Background work is spawned here. Every task reports back through an
//! [`AppEvent`], including when it panics.

use crate::app::{App, AppEvent};
use boomfeed::actions::ActionKind;
use boomfeed::controller::Controller;
use boomfeed::feed::{LoadOutcome, LoadSignals};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of the task silently disappearing (caught by Tokio's runtime but
/// not handled), panics are converted to `Err(String)` containing the panic
/// message.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Spawn `future` and send the event it produces, or `TaskPanicked` if it panics.
pub(super) fn spawn_reporting<F>(
    task: &'static str,
    tx: mpsc::Sender<AppEvent>,
    future: F,
) -> JoinHandle<()>
where
    F: Future<Output = AppEvent> + Send + 'static,
{
    tokio::spawn(async move {
        let event = match catch_task_panic(future).await {
            Ok(event) => event,
            Err(panic_msg) => {
                tracing::error!(task, error = %panic_msg, "Background task panicked");
                AppEvent::TaskPanicked {
                    task,
                    error: panic_msg,
                }
            }
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(task, error = %e, "Channel send failed (receiver dropped)");
        }
    })
}

/// Consume near-bottom signals for as long as the UI runs.
///
/// Queued signals are coalesced, and the engine decides whether a fetch
/// happens, so a burst of scrolling costs at most one request.
pub(super) fn spawn_page_loader(
    controller: Controller,
    mut signals: LoadSignals,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(coalesced) = signals.recv().await {
            tracing::trace!(coalesced, "Near-bottom signal");
            let event = match catch_task_panic(controller.load_next_page()).await {
                Ok(LoadOutcome::Skipped(state)) => {
                    tracing::trace!(?state, "Load not started");
                    continue;
                }
                Ok(outcome) => AppEvent::PageLoaded(outcome),
                Err(panic_msg) => {
                    tracing::error!(task = "page_load", error = %panic_msg, "Background task panicked");
                    AppEvent::TaskPanicked {
                        task: "page_load",
                        error: panic_msg,
                    }
                }
            };
            if tx.send(event).await.is_err() {
                tracing::debug!("Page loader stopping, receiver dropped");
                break;
            }
        }
    })
}

/// Run a purchase or gift for the selected video in the background.
pub(super) fn spawn_action(app: &mut App, kind: ActionKind, tx: &mpsc::Sender<AppEvent>) {
    let Some(video) = app.selected_video() else {
        return;
    };
    let video_id = video.id.clone();
    let controller = app.controller.clone();
    app.actions_in_flight += 1;

    spawn_reporting(kind.label(), tx.clone(), async move {
        let outcome = match kind {
            ActionKind::Purchase => controller.purchase(&video_id).await,
            ActionKind::Gift => controller.gift(&video_id).await,
        };
        AppEvent::ActionFinished {
            kind,
            video_id,
            outcome,
        }
    });
}

/// Fetch the comment thread for the open video view.
pub(super) fn spawn_comments_load(app: &App, tx: &mpsc::Sender<AppEvent>) {
    let Some(view) = &app.video_view else {
        return;
    };
    let video_id = view.video.id.clone();
    let generation = app.comments_generation;
    let controller = app.controller.clone();

    spawn_reporting("comments_load", tx.clone(), async move {
        let comments = controller.load_comments(&video_id).await;
        AppEvent::CommentsLoaded {
            video_id,
            generation,
            comments,
        }
    });
}

pub(super) fn spawn_comment_post(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let Some(view) = &mut app.video_view else {
        return;
    };
    let Some(text) = view.compose.clone() else {
        return;
    };
    view.posting = true;
    let video_id = view.video.id.clone();
    let controller = app.controller.clone();

    spawn_reporting("comment_post", tx.clone(), async move {
        let comment = controller.post_comment(&video_id, &text).await;
        AppEvent::CommentPosted { video_id, comment }
    });
}

pub(super) fn spawn_comment_delete(app: &App, tx: &mpsc::Sender<AppEvent>) {
    let Some(view) = &app.video_view else {
        return;
    };
    let Some(comment) = view.selected_comment() else {
        return;
    };
    let video_id = view.video.id.clone();
    let comment_id = comment.id.clone();
    let controller = app.controller.clone();

    spawn_reporting("comment_delete", tx.clone(), async move {
        let outcome = controller.delete_comment(&comment_id).await;
        AppEvent::CommentDeleted {
            video_id,
            comment_id,
            outcome,
        }
    });
}
