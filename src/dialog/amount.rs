use super::{DialogError, PromptSlot};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("Please enter a valid positive amount.")]
    Invalid,
}

/// Parse user input into a gift amount: finite and strictly positive.
pub fn parse_amount(input: &str) -> Result<f64, AmountError> {
    let amount: f64 = input.trim().parse().map_err(|_| AmountError::Invalid)?;
    validate(amount)
}

fn validate(amount: f64) -> Result<f64, AmountError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(AmountError::Invalid)
    }
}

/// Numeric-input prompt as an awaitable result.
///
/// Resolves `Some(amount)` on submit and `None` on cancel or dismissal. An
/// invalid submission leaves the prompt open.
#[derive(Clone, Default)]
pub struct AmountPromptBridge {
    slot: PromptSlot<Option<f64>>,
}

impl AmountPromptBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn request(&self, message: impl Into<String>) -> Result<Option<f64>, DialogError> {
        self.slot.request(message.into(), None).await
    }

    /// Answer with `amount`. `Ok(false)` if no prompt was open.
    pub fn submit(&self, amount: f64) -> Result<bool, AmountError> {
        let amount = validate(amount)?;
        Ok(self.slot.resolve(Some(amount)))
    }

    /// Parse `input` and answer with it.
    pub fn submit_input(&self, input: &str) -> Result<bool, AmountError> {
        let amount = parse_amount(input)?;
        Ok(self.slot.resolve(Some(amount)))
    }

    pub fn cancel(&self) -> bool {
        self.slot.resolve(None)
    }

    /// Close the prompt without an amount; same as `cancel`.
    pub fn dismiss(&self) -> bool {
        self.cancel()
    }

    pub fn message(&self) -> Option<String> {
        self.slot.message()
    }

    pub fn is_open(&self) -> bool {
        self.slot.is_open()
    }
}
