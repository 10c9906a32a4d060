use crate::api::{ApiClient, RawVideo, Video};
use futures::stream::{self, StreamExt};
use secrecy::SecretString;

/// Adds the current user's ownership status to freshly fetched videos.
#[derive(Clone, Debug)]
pub struct Enricher {
    api: ApiClient,
    concurrency: usize,
}

impl Enricher {
    pub fn new(api: ApiClient, concurrency: usize) -> Self {
        Self {
            api,
            concurrency: concurrency.max(1),
        }
    }

    /// Enrich one page.
    ///
    /// Free videos are purchased without a network call. Without a token
    /// every priced video is unpurchased. Otherwise ownership checks run
    /// concurrently (bounded), and a failed check counts as not purchased.
    /// The output keeps the input order and is returned only once every
    /// check has settled.
    pub async fn enrich(&self, raw: Vec<RawVideo>, token: Option<&SecretString>) -> Vec<Video> {
        let Some(token) = token else {
            return raw
                .into_iter()
                .map(|video| Video::from_raw(video, false))
                .collect();
        };

        stream::iter(raw)
            .map(|video| self.enrich_one(video, token))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn enrich_one(&self, raw: RawVideo, token: &SecretString) -> Video {
        if raw.price == 0 {
            return Video::from_raw(raw, true);
        }

        let purchased = match self.api.check_purchased(&raw.id, token).await {
            Ok(purchased) => purchased,
            Err(e) => {
                tracing::warn!(video_id = %raw.id, error = %e, "Ownership check failed, assuming not purchased");
                false
            }
        };
        Video::from_raw(raw, purchased)
    }
}
