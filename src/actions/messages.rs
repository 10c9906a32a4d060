//! User-facing wording for failed calls against the video service.

use crate::api::{ApiError, ErrorBody};
use crate::notify::Severity;

pub const NO_RESPONSE: &str = "No response from server. Check your network or server status.";
pub const AUTH_FAILED: &str = "Authentication failed. Please log in again.";
const UNEXPECTED: &str = "An unexpected error occurred.";

fn body_message(body: &ErrorBody) -> Option<String> {
    body.message().map(str::to_owned)
}

fn body_error(body: &ErrorBody) -> Option<String> {
    body.error().map(str::to_owned)
}

/// Errors that never produced a usable response.
fn fallback(err: &ApiError, unexpected: &str) -> String {
    if err.is_no_response() {
        NO_RESPONSE.to_string()
    } else {
        unexpected.to_string()
    }
}

pub fn page_load_error(err: &ApiError) -> String {
    err.body()
        .and_then(body_message)
        .unwrap_or_else(|| "Failed to load videos. Please try again later.".to_string())
}

pub fn purchase_error(err: &ApiError) -> String {
    let ApiError::Server { status, body } = err else {
        return fallback(err, "An unexpected error occurred during purchase.");
    };
    match status {
        401 => AUTH_FAILED.to_string(),
        403 => "Access denied. You might not have permission.".to_string(),
        400 => body_message(body)
            .unwrap_or_else(|| "Bad request. Check video ID or user balance.".to_string()),
        404 => "Video not found or purchase endpoint invalid.".to_string(),
        _ => body_message(body).unwrap_or_else(|| format!("Server error: {}", status)),
    }
}

pub fn gift_error(err: &ApiError) -> String {
    let ApiError::Server { status, body } = err else {
        return fallback(err, UNEXPECTED);
    };
    match status {
        401 => AUTH_FAILED.to_string(),
        400 => body_error(body)
            .or_else(|| body_message(body))
            .unwrap_or_else(|| "Invalid request for gifting.".to_string()),
        404 => "Video not found or gift endpoint invalid.".to_string(),
        500 => body_error(body)
            .unwrap_or_else(|| "Server error. Could not complete gift transaction.".to_string()),
        _ => body_message(body).unwrap_or_else(|| format!("Server error: {}", status)),
    }
}

/// Message for a non-success 2xx answer to a monetary action.
pub fn unexpected_status(prefix: &str, body: &ErrorBody) -> String {
    format!(
        "{}: {}",
        prefix,
        body.message().unwrap_or("Unknown response status.")
    )
}

pub fn post_comment_error(err: &ApiError) -> String {
    err.body()
        .and_then(|body| body_error(body).or_else(|| body_message(body)))
        .unwrap_or_else(|| "Failed to post comment.".to_string())
}

/// Deleting a comment reports some rejections as warnings or info rather than errors.
pub fn delete_comment_error(err: &ApiError) -> (String, Severity) {
    let ApiError::Server { status, body } = err else {
        return (fallback(err, UNEXPECTED), Severity::Error);
    };
    match status {
        401 => (AUTH_FAILED.to_string(), Severity::Error),
        403 => (
            body_error(body)
                .unwrap_or_else(|| "You are not authorized to delete this comment.".to_string()),
            Severity::Warning,
        ),
        404 => (
            body_error(body).unwrap_or_else(|| "Comment not found.".to_string()),
            Severity::Info,
        ),
        _ => (
            body_error(body)
                .or_else(|| body_message(body))
                .unwrap_or_else(|| format!("Server error: {}", status)),
            Severity::Error,
        ),
    }
}
