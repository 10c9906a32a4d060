//! Client for the video service's HTTP contract.
//!
//! - [`client`] - `ApiClient` with one method per endpoint
//! - [`error`] - `ApiError` and the service's error payload
//! - [`types`] - wire types (`RawVideo`, `Comment`) and the enriched `Video`

mod client;
mod error;
mod types;

pub use client::{ActionResponse, ApiClient};
pub use error::{ApiError, ErrorBody};
pub use types::{Comment, RawVideo, UserRef, Video, VideoKind};
