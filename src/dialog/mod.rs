//! Modal prompts exposed as awaitable requests.
//!
//! A flow calls `request(message)` and suspends; the UI sees the open prompt
//! through `message()` and answers it with the bridge's resolve methods. Each
//! bridge wraps a [`PromptSlot`]: a single-slot record of the open prompt
//! paired with a `tokio::sync::oneshot` reply channel.
//!
//! Every request resolves exactly once. If the answering side drops the reply
//! sender, the request resolves with the cancellation value; if the
//! requesting future is dropped, the slot is cleared so the UI stops showing
//! a prompt nobody is waiting on.

mod amount;
mod confirm;

pub use amount::{parse_amount, AmountError, AmountPromptBridge};
pub use confirm::ConfirmationBridge;

use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DialogError {
    /// The UI only shows one dialog of each kind; callers must not stack requests.
    #[error("A dialog of this kind is already open")]
    AlreadyOpen,
}

struct Pending<T> {
    ticket: u64,
    message: String,
    reply: oneshot::Sender<T>,
}

struct SlotState<T> {
    next_ticket: u64,
    pending: Option<Pending<T>>,
}

pub(crate) struct PromptSlot<T> {
    state: Arc<Mutex<SlotState<T>>>,
}

impl<T> Clone for PromptSlot<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Default for PromptSlot<T> {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(SlotState {
                next_ticket: 0,
                pending: None,
            })),
        }
    }
}

/// Clears the slot if the request that opened it is dropped before an answer.
struct ClearOnDrop<T> {
    state: Arc<Mutex<SlotState<T>>>,
    ticket: u64,
}

impl<T> Drop for ClearOnDrop<T> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if state.pending.as_ref().is_some_and(|p| p.ticket == self.ticket) {
            state.pending = None;
            tracing::debug!(ticket = self.ticket, "Prompt abandoned by requester");
        }
    }
}

impl<T> PromptSlot<T> {
    /// Open the slot with `message` and wait for the answer.
    ///
    /// Resolves with `on_cancel` if the reply side goes away unanswered.
    pub(crate) async fn request(&self, message: String, on_cancel: T) -> Result<T, DialogError> {
        let (reply, answer) = oneshot::channel();
        let ticket = {
            let mut state = self.state.lock();
            if state.pending.is_some() {
                tracing::warn!(message = %message, "Prompt requested while another is open");
                return Err(DialogError::AlreadyOpen);
            }
            let ticket = state.next_ticket;
            state.next_ticket += 1;
            state.pending = Some(Pending {
                ticket,
                message,
                reply,
            });
            ticket
        };

        let _clear = ClearOnDrop {
            state: Arc::clone(&self.state),
            ticket,
        };
        Ok(answer.await.unwrap_or(on_cancel))
    }

    /// Answer the open prompt. Returns false if none was open.
    pub(crate) fn resolve(&self, value: T) -> bool {
        let pending = self.state.lock().pending.take();
        match pending {
            Some(pending) => {
                if pending.reply.send(value).is_err() {
                    tracing::debug!(ticket = pending.ticket, "Prompt answered after requester left");
                }
                true
            }
            None => false,
        }
    }

    pub(crate) fn message(&self) -> Option<String> {
        self.state
            .lock()
            .pending
            .as_ref()
            .map(|p| p.message.clone())
    }

    pub(crate) fn is_open(&self) -> bool {
        self.state.lock().pending.is_some()
    }
}
