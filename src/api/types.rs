//! Wire and domain types for the video service.
//!
//! `RawVideo` is what the listing endpoint returns. `Video` is the enriched
//! form held by the feed: it carries the per-user `purchased` flag and can
//! only be built through [`Video::from_raw`], which enforces that free videos
//! are always considered purchased.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Short-form videos play inline; long-form videos are gated behind purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoKind {
    Short,
    #[default]
    #[serde(other)]
    Long,
}

impl VideoKind {
    pub fn label(self) -> &'static str {
        match self {
            VideoKind::Short => "short",
            VideoKind::Long => "long",
        }
    }
}

/// A user reference as returned by the service.
///
/// Populated references are objects; unpopulated ones are a bare id string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Populated {
        #[serde(rename = "_id", default)]
        id: Option<String>,
        #[serde(default)]
        username: Option<String>,
    },
    Id(String),
}

impl UserRef {
    pub fn id(&self) -> Option<&str> {
        match self {
            UserRef::Populated { id, .. } => id.as_deref(),
            UserRef::Id(id) => Some(id),
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            UserRef::Populated { username, .. } => username.as_deref(),
            UserRef::Id(_) => None,
        }
    }
}

/// A video exactly as the listing endpoint returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVideo {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: VideoKind,
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(rename = "creatorId", default)]
    pub creator: Option<UserRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A feed entry enriched with the current user's ownership status.
#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub kind: VideoKind,
    pub price: u64,
    pub purchased: bool,
    pub creator_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub video_url: Option<String>,
}

impl Video {
    /// Build an enriched video. Free videos are purchased regardless of `purchased`.
    pub fn from_raw(raw: RawVideo, purchased: bool) -> Self {
        Self {
            purchased: raw.price == 0 || purchased,
            creator_name: raw
                .creator
                .as_ref()
                .and_then(UserRef::username)
                .map(str::to_owned),
            id: raw.id,
            title: raw.title,
            kind: raw.kind,
            price: raw.price,
            created_at: raw.created_at,
            description: raw.description,
            video_url: raw.video_url,
        }
    }

    pub fn is_free(&self) -> bool {
        self.price == 0
    }

    /// Priced and not yet owned: watching and commenting are unavailable.
    pub fn is_locked(&self) -> bool {
        !self.purchased && self.price > 0
    }

    pub fn creator_display(&self) -> &str {
        self.creator_name.as_deref().unwrap_or("Unknown")
    }
}

/// A comment on a video.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "userId", default)]
    pub author: Option<UserRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn author_id(&self) -> Option<&str> {
        self.author.as_ref().and_then(UserRef::id)
    }

    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .and_then(UserRef::username)
            .unwrap_or("Unknown User")
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PurchasedStatus {
    #[serde(default)]
    pub purchased: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostedComment {
    pub comment: Comment,
}

#[derive(Debug, Serialize)]
pub(crate) struct GiftRequest {
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct CommentRequest<'a> {
    pub text: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_video_deserializes_populated_creator() {
        let json = r#"{
            "_id": "v1",
            "title": "Intro",
            "type": "short",
            "price": 0,
            "videoUrl": "https://cdn.example.com/v1.mp4",
            "creatorId": {"_id": "u1", "username": "asha"},
            "createdAt": "2024-05-01T10:00:00Z"
        }"#;
        let raw: RawVideo = serde_json::from_str(json).unwrap();
        assert_eq!(raw.id, "v1");
        assert_eq!(raw.kind, VideoKind::Short);
        assert_eq!(raw.creator.as_ref().and_then(UserRef::username), Some("asha"));
        assert!(raw.created_at.is_some());
    }

    #[test]
    fn test_raw_video_tolerates_bare_creator_id_and_unknown_kind() {
        let json = r#"{"_id": "v2", "title": "Deep dive", "type": "feature", "price": 50, "creatorId": "u9"}"#;
        let raw: RawVideo = serde_json::from_str(json).unwrap();
        assert_eq!(raw.kind, VideoKind::Long);
        assert_eq!(raw.creator.as_ref().and_then(UserRef::id), Some("u9"));

        let video = Video::from_raw(raw, false);
        assert_eq!(video.creator_display(), "Unknown");
        assert!(video.is_locked());
    }

    #[test]
    fn test_free_video_is_always_purchased() {
        let raw: RawVideo =
            serde_json::from_str(r#"{"_id": "v3", "title": "Free", "price": 0}"#).unwrap();
        let video = Video::from_raw(raw, false);
        assert!(video.purchased);
        assert!(video.is_free());
        assert!(!video.is_locked());
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let result: Result<RawVideo, _> =
            serde_json::from_str(r#"{"_id": "v4", "title": "Bad", "price": -1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_comment_author_fallbacks() {
        let comment: Comment =
            serde_json::from_str(r#"{"_id": "c1", "text": "nice", "userId": {"_id": "u1"}}"#)
                .unwrap();
        assert_eq!(comment.author_id(), Some("u1"));
        assert_eq!(comment.author_name(), "Unknown User");
    }
}
