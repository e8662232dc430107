//! Polling for asynchronous results against a local mock server.
#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::*;
use scanii::{PollPolicy, poll_for_result};
use std::time::Duration;

fn fast_policy(max_attempts: u32) -> PollPolicy {
    PollPolicy::default()
        .with_max_attempts(max_attempts)
        .with_base_delay(Duration::from_millis(5))
        .with_max_delay(Duration::from_millis(20))
}

fn file_path() -> String {
    format!("/files/{FILE_ID}")
}

#[tokio::test]
async fn test_poll_returns_ready_result_immediately() {
    init_logging();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", file_path().as_str())
        .with_status(200)
        .with_body(FINISHED_SCAN)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let result = poll_for_result(&client, FILE_ID, &fast_policy(3))
        .await
        .expect("result ready");

    mock.assert_async().await;
    assert_eq!(result.findings, vec![FINDING.to_string()]);
}

#[tokio::test]
async fn test_poll_gives_up_after_max_attempts() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", file_path().as_str())
        .with_status(404)
        .expect(4)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = poll_for_result(&client, FILE_ID, &fast_policy(3))
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_poll_stops_on_other_errors() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", file_path().as_str())
        .with_status(500)
        .with_body("boom")
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = poll_for_result(&client, FILE_ID, &fast_policy(5))
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_process_async_then_poll() {
    let mut server = mockito::Server::new_async().await;
    let submit = server
        .mock("POST", "/files/async")
        .with_status(202)
        .with_header("location", &file_location(&server))
        .with_body(PENDING)
        .create_async()
        .await;
    let retrieve = server
        .mock("GET", file_path().as_str())
        .with_status(200)
        .with_body(FINISHED_SCAN)
        .create_async()
        .await;

    let client = client_for(&server);
    let pending = client
        .process_async(
            scanii::ScanSource::bytes(EICAR),
            &scanii::SubmitOptions::new().with_metadata("hello", "world"),
        )
        .await
        .expect("submitted");
    let result = poll_for_result(&client, &pending.resource_id, &fast_policy(3))
        .await
        .expect("result ready");

    submit.assert_async().await;
    retrieve.assert_async().await;
    assert_eq!(result.resource_id, pending.resource_id);
    assert_eq!(result.metadata.get("hello").map(String::as_str), Some("world"));
}
