//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use boomfeed::api::ApiClient;
use boomfeed::config::Config;
use boomfeed::controller::Controller;
use boomfeed::notify::Severity;
use boomfeed::session::Session;
use serde_json::Value;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn controller(server: &MockServer, token: Option<&str>) -> Controller {
    let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
    Controller::with_api(api, &Config::default(), Session::in_memory(token, Some("me")))
}

/// Serve `videos` for `GET /videos?page={page}`.
pub async fn mount_page(server: &MockServer, page: u32, videos: Value) {
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(videos))
        .mount(server)
        .await;
}

pub async fn mount_ownership(server: &MockServer, video_id: &str, purchased: bool) {
    Mock::given(method("GET"))
        .and(path(format!("/videos/{}/purchased", video_id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "purchased": purchased })),
        )
        .mount(server)
        .await;
}

/// Active notification messages, oldest first.
pub fn messages(controller: &Controller) -> Vec<String> {
    controller
        .notifications()
        .active()
        .into_iter()
        .map(|n| n.message)
        .collect()
}

pub fn last_notification(controller: &Controller) -> Option<(String, Severity)> {
    controller
        .notifications()
        .active()
        .pop()
        .map(|n| (n.message, n.severity))
}

/// Poll `condition` until it holds, failing the test after five seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
