use super::enrich::Enricher;
use crate::actions::messages;
use crate::api::{ApiClient, ApiError, Video};
use crate::session::Session;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Where the feed is in its load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    /// The service returned an empty page. Terminal until reset.
    Exhausted,
    /// A page failed to load. Terminal until reset.
    Failed,
}

impl LoadState {
    pub fn can_load(self) -> bool {
        self == LoadState::Idle
    }
}

/// Result of one `load_next_page` call.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Nothing was fetched because the engine was not idle.
    Skipped(LoadState),
    Appended {
        page: u32,
        added: usize,
        duplicates: usize,
    },
    Exhausted,
    Failed(ApiError),
    /// The feed was reset or torn down while the fetch was in flight.
    Discarded,
}

/// Read-only view of the feed for rendering.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub videos: Arc<Vec<Video>>,
    /// Next page to fetch.
    pub page: u32,
    pub state: LoadState,
    /// Message of the failed load, if any.
    pub error: Option<String>,
}

struct EngineState {
    videos: Arc<Vec<Video>>,
    page: u32,
    state: LoadState,
    error: Option<String>,
    generation: u64,
}

impl EngineState {
    fn new(generation: u64) -> Self {
        Self {
            videos: Arc::new(Vec::new()),
            page: 1,
            state: LoadState::Idle,
            error: None,
            generation,
        }
    }
}

/// Append `incoming` to `existing`, dropping any video whose id is already present.
///
/// The first occurrence wins, including between duplicates inside `incoming`.
/// Returns `(added, duplicates)`.
pub fn merge_page(existing: &mut Vec<Video>, incoming: Vec<Video>) -> (usize, usize) {
    let mut seen: HashSet<String> = existing.iter().map(|v| v.id.clone()).collect();
    let mut duplicates = 0;
    let before = existing.len();

    for video in incoming {
        if seen.insert(video.id.clone()) {
            existing.push(video);
        } else {
            duplicates += 1;
        }
    }

    (existing.len() - before, duplicates)
}

/// Incremental loader for the video feed.
///
/// At most one fetch runs at a time: `load_next_page` moves the engine to
/// `Loading` before awaiting anything, and every later call is skipped until
/// the fetch settles.
#[derive(Clone)]
pub struct PaginationEngine {
    api: ApiClient,
    enricher: Enricher,
    session: Session,
    page_size: u32,
    state: Arc<Mutex<EngineState>>,
}

impl PaginationEngine {
    pub fn new(api: ApiClient, enricher: Enricher, session: Session, page_size: u32) -> Self {
        Self {
            api,
            enricher,
            session,
            page_size: page_size.max(1),
            state: Arc::new(Mutex::new(EngineState::new(0))),
        }
    }

    /// Fetch, enrich and merge the next page.
    pub async fn load_next_page(&self) -> LoadOutcome {
        let (page, generation) = {
            let mut state = self.state.lock();
            if !state.state.can_load() {
                tracing::trace!(state = ?state.state, "Load skipped");
                return LoadOutcome::Skipped(state.state);
            }
            state.state = LoadState::Loading;
            (state.page, state.generation)
        };

        tracing::debug!(page, generation, "Loading feed page");
        let result = match self.api.list_videos(page, self.page_size).await {
            Ok(raw) if raw.is_empty() => Ok(Vec::new()),
            Ok(raw) => {
                let token = self.session.token();
                Ok(self.enricher.enrich(raw, token.as_ref()).await)
            }
            Err(e) => Err(e),
        };

        let mut state = self.state.lock();
        if state.generation != generation {
            tracing::debug!(page, generation, current = state.generation, "Discarding stale page");
            return LoadOutcome::Discarded;
        }

        match result {
            Ok(videos) if videos.is_empty() => {
                state.state = LoadState::Exhausted;
                tracing::info!(page, "Feed exhausted");
                LoadOutcome::Exhausted
            }
            Ok(videos) => {
                let (added, duplicates) = merge_page(Arc::make_mut(&mut state.videos), videos);
                state.page += 1;
                state.state = LoadState::Idle;
                tracing::debug!(page, added, duplicates, "Page merged");
                LoadOutcome::Appended {
                    page,
                    added,
                    duplicates,
                }
            }
            Err(e) => {
                tracing::error!(page, error = %e, "Failed to load feed page");
                state.state = LoadState::Failed;
                state.error = Some(messages::page_load_error(&e));
                LoadOutcome::Failed(e)
            }
        }
    }

    /// Start a new feed session: page 1, no videos, idle.
    ///
    /// A fetch still in flight is discarded when it completes.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        let generation = state.generation + 1;
        *state = EngineState::new(generation);
        tracing::info!(generation, "Feed reset");
    }

    /// Invalidate any in-flight fetch without clearing the loaded videos.
    pub fn deactivate(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
        if state.state == LoadState::Loading {
            state.state = LoadState::Idle;
        }
    }

    /// Flip a held video to purchased. Returns false if the id is unknown.
    pub fn mark_purchased(&self, video_id: &str) -> bool {
        let mut state = self.state.lock();
        let Some(index) = state.videos.iter().position(|v| v.id == video_id) else {
            return false;
        };
        Arc::make_mut(&mut state.videos)[index].purchased = true;
        true
    }

    pub fn video(&self, video_id: &str) -> Option<Video> {
        self.state
            .lock()
            .videos
            .iter()
            .find(|v| v.id == video_id)
            .cloned()
    }

    pub fn state(&self) -> LoadState {
        self.state.lock().state
    }

    pub fn page(&self) -> u32 {
        self.state.lock().page
    }

    pub fn len(&self) -> usize {
        self.state.lock().videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.state.lock();
        FeedSnapshot {
            videos: Arc::clone(&state.videos),
            page: state.page,
            state: state.state,
            error: state.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RawVideo;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn video(id: &str, title: &str) -> Video {
        let raw: RawVideo = serde_json::from_value(serde_json::json!({
            "_id": id,
            "title": title,
            "price": 0
        }))
        .unwrap();
        Video::from_raw(raw, true)
    }

    fn ids(videos: &[Video]) -> Vec<&str> {
        videos.iter().map(|v| v.id.as_str()).collect()
    }

    #[test]
    fn test_merge_drops_existing_ids() {
        let mut existing = vec![video("a", "first"), video("b", "first")];
        let (added, duplicates) =
            merge_page(&mut existing, vec![video("b", "second"), video("c", "second")]);

        assert_eq!((added, duplicates), (1, 1));
        assert_eq!(ids(&existing), vec!["a", "b", "c"]);
        assert_eq!(existing[1].title, "first");
    }

    #[test]
    fn test_merge_dedups_within_page() {
        let mut existing = Vec::new();
        let (added, duplicates) = merge_page(
            &mut existing,
            vec![video("x", "1"), video("x", "2"), video("y", "1")],
        );
        assert_eq!((added, duplicates), (2, 1));
        assert_eq!(existing[0].title, "1");
    }

    proptest! {
        #[test]
        fn prop_merge_keeps_prefix_and_unique_ids(
            first in prop::collection::vec(0u8..20, 0..15),
            second in prop::collection::vec(0u8..20, 0..15),
        ) {
            let mut existing = Vec::new();
            merge_page(&mut existing, first.iter().map(|n| video(&n.to_string(), "old")).collect());
            let before: Vec<Video> = existing.clone();

            let incoming: Vec<Video> = second.iter().map(|n| video(&n.to_string(), "new")).collect();
            let incoming_len = incoming.len();
            let (added, duplicates) = merge_page(&mut existing, incoming);

            // Existing entries never move or change
            prop_assert_eq!(&existing[..before.len()], &before[..]);
            prop_assert_eq!(added + duplicates, incoming_len);

            let unique: HashSet<&str> = existing.iter().map(|v| v.id.as_str()).collect();
            prop_assert_eq!(unique.len(), existing.len());
        }
    }
}
