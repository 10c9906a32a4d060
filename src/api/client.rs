use super::error::{ApiError, ErrorBody};
use super::types::{
    Comment, CommentRequest, GiftRequest, PostedComment, PurchasedStatus, RawVideo,
};
use futures::StreamExt;
use reqwest::redirect::Policy;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

const MAX_BODY_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Status and payload of a 2xx response to a monetary action.
///
/// Purchase and gift accept different success codes, so the flow decides
/// what counts as success rather than the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub status: u16,
    pub body: ErrorBody,
}

/// Redirect policy: at most 3 hops, loops rejected.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// HTTP client for the video service.
///
/// Cheap to clone: `reqwest::Client` is reference counted internally.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Build a client rooted at `base_url` (e.g. `https://host/api`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(timeout)
            .build()
            .map_err(ApiError::from_reqwest)?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        Ok(Self { http, base })
    }

    /// Join percent-encoded path segments onto the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base was rejected in the constructor
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `GET /videos?page=N&limit=L`. No credentials are sent for the listing.
    pub async fn list_videos(&self, page: u32, limit: u32) -> Result<Vec<RawVideo>, ApiError> {
        let mut url = self.endpoint(&["videos"]);
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());

        tracing::debug!(page, limit, "Fetching video page");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        decode_json(check_status(response).await?).await
    }

    /// `GET /videos/{id}/purchased`.
    pub async fn check_purchased(
        &self,
        video_id: &str,
        token: &SecretString,
    ) -> Result<bool, ApiError> {
        let url = self.endpoint(&["videos", video_id, "purchased"]);
        let response = self
            .http
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        let status: PurchasedStatus = decode_json(check_status(response).await?).await?;
        Ok(status.purchased)
    }

    /// `POST /videos/{id}/purchase` with an empty JSON object.
    pub async fn purchase(
        &self,
        video_id: &str,
        token: &SecretString,
    ) -> Result<ActionResponse, ApiError> {
        let url = self.endpoint(&["videos", video_id, "purchase"]);
        let response = self
            .http
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        action_response(check_status(response).await?).await
    }

    /// `POST /videos/{id}/gift` with `{amount}`.
    pub async fn gift(
        &self,
        video_id: &str,
        amount: f64,
        token: &SecretString,
    ) -> Result<ActionResponse, ApiError> {
        let url = self.endpoint(&["videos", video_id, "gift"]);
        let response = self
            .http
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(&GiftRequest { amount })
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        action_response(check_status(response).await?).await
    }

    /// `GET /videos/{id}/comments`, in server order.
    pub async fn list_comments(
        &self,
        video_id: &str,
        token: &SecretString,
    ) -> Result<Vec<Comment>, ApiError> {
        let url = self.endpoint(&["videos", video_id, "comments"]);
        let response = self
            .http
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        decode_json(check_status(response).await?).await
    }

    /// `POST /videos/{id}/comments` with `{text}`; returns the stored comment.
    pub async fn post_comment(
        &self,
        video_id: &str,
        text: &str,
        token: &SecretString,
    ) -> Result<Comment, ApiError> {
        let url = self.endpoint(&["videos", video_id, "comments"]);
        let response = self
            .http
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(&CommentRequest { text })
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        let posted: PostedComment = decode_json(check_status(response).await?).await?;
        Ok(posted.comment)
    }

    /// `DELETE /videos/comments/{id}`.
    pub async fn delete_comment(
        &self,
        comment_id: &str,
        token: &SecretString,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["videos", "comments", comment_id]);
        let response = self
            .http
            .delete(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        check_status(response).await?;
        Ok(())
    }
}

/// Turn 4xx/5xx responses into [`ApiError::Server`] carrying the error payload.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        let bytes = read_limited_bytes(response, MAX_BODY_SIZE)
            .await
            .unwrap_or_default();
        let body = ErrorBody::parse(&bytes);
        tracing::debug!(status = status.as_u16(), ?body, "Request rejected by server");
        return Err(ApiError::Server {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let bytes = read_limited_bytes(response, MAX_BODY_SIZE).await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

async fn action_response(response: reqwest::Response) -> Result<ActionResponse, ApiError> {
    let status = response.status().as_u16();
    let bytes = read_limited_bytes(response, MAX_BODY_SIZE).await?;
    Ok(ActionResponse {
        status,
        body: ErrorBody::parse(&bytes),
    })
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ApiError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ApiError::from_reqwest)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token() -> SecretString {
        SecretString::from("test-token".to_string())
    }

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let api = ApiClient::new("https://example.com/api/", Duration::from_secs(1)).unwrap();
        let url = api.endpoint(&["videos", "abc", "purchased"]);
        assert_eq!(url.as_str(), "https://example.com/api/videos/abc/purchased");
    }

    #[test]
    fn test_endpoint_percent_encodes_ids() {
        let api = ApiClient::new("https://example.com/api", Duration::from_secs(1)).unwrap();
        let url = api.endpoint(&["videos", "a/b c", "purchase"]);
        assert_eq!(url.as_str(), "https://example.com/api/videos/a%2Fb%20c/purchase");
    }

    #[test]
    fn test_rejects_cannot_be_base_url() {
        assert!(ApiClient::new("mailto:someone@example.com", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_list_videos_sends_page_and_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("page", "3"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"_id": "v1", "title": "One", "price": 0}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let videos = client(&server).list_videos(3, 5).await.unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].id, "v1");
    }

    #[tokio::test]
    async fn test_check_purchased_uses_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos/v9/purchased"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"purchased": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        assert!(client(&server).check_purchased("v9", &token()).await.unwrap());
    }

    #[tokio::test]
    async fn test_server_rejection_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/videos/v2/gift"))
            .and(body_json(serde_json::json!({"amount": 100.0})))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "insufficient balance"})),
            )
            .mount(&server)
            .await;

        let err = client(&server).gift("v2", 100.0, &token()).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(
            err.body().and_then(ErrorBody::error),
            Some("insufficient balance")
        );
    }

    #[tokio::test]
    async fn test_purchase_returns_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/videos/v1/purchase"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let response = client(&server).purchase("v1", &token()).await.unwrap();
        assert_eq!(response.status, 201);
    }

    #[tokio::test]
    async fn test_malformed_listing_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server).list_videos(1, 5).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_post_comment_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/videos/v1/comments"))
            .and(body_json(serde_json::json!({"text": "great"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "comment": {"_id": "c1", "text": "great", "userId": {"_id": "u1", "username": "asha"}}
            })))
            .mount(&server)
            .await;

        let comment = client(&server)
            .post_comment("v1", "great", &token())
            .await
            .unwrap();
        assert_eq!(comment.id, "c1");
        assert_eq!(comment.author_name(), "asha");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Port 9 (discard) on localhost is almost never listening
        let api = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = api.list_videos(1, 5).await.unwrap_err();
        assert!(err.is_no_response());
    }
}
