use super::{DialogError, PromptSlot};

/// Yes/no confirmation as an awaitable result.
///
/// Cancel and dismiss are the same answer: `false`.
#[derive(Clone, Default)]
pub struct ConfirmationBridge {
    slot: PromptSlot<bool>,
}

impl ConfirmationBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `message` and wait for the user's answer.
    pub async fn request(&self, message: impl Into<String>) -> Result<bool, DialogError> {
        self.slot.request(message.into(), false).await
    }

    pub fn confirm(&self) -> bool {
        self.slot.resolve(true)
    }

    pub fn cancel(&self) -> bool {
        self.slot.resolve(false)
    }

    /// Closing the dialog without choosing.
    pub fn dismiss(&self) -> bool {
        self.cancel()
    }

    /// The prompt currently shown, if any.
    pub fn message(&self) -> Option<String> {
        self.slot.message()
    }

    pub fn is_open(&self) -> bool {
        self.slot.is_open()
    }
}
