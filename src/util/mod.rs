//! Text and URL helpers for rendering service data in the terminal.

mod text;
mod url_validator;

pub use text::{display_width, strip_control_chars, time_ago, truncate_to_width};
pub use url_validator::{validate_url_for_open, UrlValidationError};
