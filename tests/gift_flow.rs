//! Integration tests for gifting: the amount prompt, success on 201 only,
//! and error wording taken from the service payload.

mod common;

use boomfeed::actions::{ActionKind, ActionOutcome};
use boomfeed::controller::Controller;
use boomfeed::notify::Severity;
use common::{controller, last_notification, messages, mount_page, wait_until};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn loaded(server: &MockServer, token: Option<&str>) -> Controller {
    mount_page(server, 1, json!([{ "_id": "v2", "title": "Free", "price": 0 }])).await;
    let controller = controller(server, token);
    controller.load_next_page().await;
    controller
}

fn spawn_gift(controller: &Controller) -> tokio::task::JoinHandle<ActionOutcome> {
    let controller = controller.clone();
    tokio::spawn(async move { controller.gift("v2").await })
}

/// Run a gift of 100 against `response` and return the outcome.
async fn gift_100(response: ResponseTemplate) -> (ActionOutcome, Controller) {
    let server = MockServer::start().await;
    let controller = loaded(&server, Some("tok")).await;
    Mock::given(method("POST"))
        .and(path("/videos/v2/gift"))
        .and(body_json(json!({ "amount": 100.0 })))
        .respond_with(response)
        .expect(1)
        .mount(&server)
        .await;

    let task = spawn_gift(&controller);
    wait_until(|| controller.amounts().is_open()).await;
    assert_eq!(
        controller.amounts().message().as_deref(),
        Some("Enter the amount you wish to gift:")
    );
    assert!(controller.guard().is_pending(ActionKind::Gift, "v2"));
    assert_eq!(controller.amounts().submit_input(" 100 "), Ok(true));

    let outcome = task.await.unwrap();
    assert!(!controller.guard().is_busy("v2"));
    (outcome, controller)
}

#[tokio::test]
async fn test_gift_created() {
    let (outcome, controller) = gift_100(ResponseTemplate::new(201)).await;
    assert_eq!(outcome, ActionOutcome::Completed);
    assert_eq!(
        last_notification(&controller),
        Some(("Gift of 100 sent successfully!".to_string(), Severity::Success))
    );
}

#[tokio::test]
async fn test_gift_rejected_with_service_message() {
    let (outcome, controller) = gift_100(
        ResponseTemplate::new(400).set_body_json(json!({ "error": "insufficient balance" })),
    )
    .await;
    assert_eq!(
        outcome,
        ActionOutcome::Failed("insufficient balance".to_string())
    );
    assert_eq!(
        last_notification(&controller),
        Some(("insufficient balance".to_string(), Severity::Error))
    );
}

#[tokio::test]
async fn test_gift_200_is_not_success() {
    let (outcome, controller) =
        gift_100(ResponseTemplate::new(200).set_body_json(json!({ "message": "pending review" })))
            .await;
    assert_eq!(
        outcome,
        ActionOutcome::Failed("Failed to send gift: pending review".to_string())
    );
    assert_eq!(
        messages(&controller),
        vec!["Failed to send gift: pending review"]
    );
}

#[tokio::test]
async fn test_gift_server_error_uses_error_field() {
    let (outcome, _) =
        gift_100(ResponseTemplate::new(500).set_body_json(json!({ "error": "ledger offline" })))
            .await;
    assert_eq!(outcome, ActionOutcome::Failed("ledger offline".to_string()));

    let (outcome, _) = gift_100(ResponseTemplate::new(500)).await;
    assert_eq!(
        outcome,
        ActionOutcome::Failed("Server error. Could not complete gift transaction.".to_string())
    );
}

#[tokio::test]
async fn test_gift_cancelled_at_prompt() {
    let server = MockServer::start().await;
    let controller = loaded(&server, Some("tok")).await;
    Mock::given(method("POST"))
        .and(path("/videos/v2/gift"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let task = spawn_gift(&controller);
    wait_until(|| controller.amounts().is_open()).await;

    // Invalid input keeps the prompt open
    assert!(controller.amounts().submit_input("-5").is_err());
    assert!(controller.amounts().is_open());

    controller.amounts().cancel();
    assert_eq!(task.await.unwrap(), ActionOutcome::Cancelled);
    assert_eq!(
        last_notification(&controller),
        Some(("Gift transaction cancelled.".to_string(), Severity::Info))
    );
}

#[tokio::test]
async fn test_gift_requires_login() {
    let server = MockServer::start().await;
    let controller = loaded(&server, None).await;

    assert_eq!(controller.gift("v2").await, ActionOutcome::NotAuthenticated);
    assert_eq!(messages(&controller), vec!["Please log in to gift videos."]);
    assert!(!controller.amounts().is_open());
}

#[tokio::test]
async fn test_gift_and_purchase_guards_are_independent() {
    let server = MockServer::start().await;
    let controller = loaded(&server, Some("tok")).await;

    let task = spawn_gift(&controller);
    wait_until(|| controller.amounts().is_open()).await;

    assert_eq!(controller.gift("v2").await, ActionOutcome::AlreadyPending);
    assert!(!controller.guard().is_pending(ActionKind::Purchase, "v2"));

    controller.amounts().cancel();
    assert_eq!(task.await.unwrap(), ActionOutcome::Cancelled);
}
