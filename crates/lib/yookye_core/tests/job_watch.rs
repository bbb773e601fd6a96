//! Watching a recommendation job end to end against a mock server.
//!
//! Timings are shrunk so a full poll cycle fits in milliseconds; the
//! sequencing logic under test is timing-independent.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use yookye_core::api::ApiClient;
use yookye_core::config::ClientConfig;
use yookye_core::jobs::{self, JobError, JobEvent, JobPoller, JobStatus, PollPolicy};
use yookye_core::models::travel::{TravelForm, ValidationError};
use yookye_core::session::SessionStore;
use yookye_core::travel::{TravelApi, TravelError};

fn travel_for(server_uri: &str, dir: &TempDir) -> TravelApi {
    let store = Arc::new(SessionStore::new(dir.path().join("session.json")));
    let client =
        ApiClient::new(&ClientConfig::default().with_base_url(server_uri), store).expect("client");
    TravelApi::new(client)
}

fn fast_policy() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(25),
        probe_delay: Duration::from_millis(5),
        max_attempts: 5,
        network_retries: 0,
    }
}

fn status_body(status: &str) -> serde_json::Value {
    json!({"job_id": "j1", "status": status})
}

fn minimal_form() -> TravelForm {
    TravelForm {
        passions: vec!["enogastronomia".into()],
        specific_places: None,
        places_to_visit: None,
        preferred_destinations: None,
        travel_pace: None,
        accommodation_level: None,
        accommodation_type: None,
        adults: 2,
        children: 0,
        infants: 0,
        rooms: 1,
        traveler_type: None,
        check_in: None,
        check_out: None,
        transportation_known: None,
        arrival_departure: None,
        budget: None,
        special_services: None,
        email: "traveler@example.com".into(),
    }
}

#[tokio::test]
async fn processing_then_completed_delivers_the_result() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let travel = travel_for(&server.uri(), &dir);

    // First two checks see PROCESSING, then the job completes.
    Mock::given(method("GET"))
        .and(path("/travel/job/j1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("PROCESSING")))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/travel/job/j1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("COMPLETED")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/travel/job/j1/result"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"packages": [{"id": "pkg-1"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut handle = JobPoller::spawn(travel, "j1", fast_policy());

    match handle.next_event().await.expect("probe event") {
        JobEvent::Status {
            status,
            attempt,
            progress,
        } => {
            assert_eq!(status, JobStatus::Processing);
            assert_eq!(attempt, 0);
            assert_eq!(progress, 20);
        }
        other => panic!("unexpected event: {other:?}"),
    }
    match handle.next_event().await.expect("first tick") {
        JobEvent::Status {
            attempt, progress, ..
        } => {
            assert_eq!(attempt, 1);
            assert_eq!(progress, 25);
        }
        other => panic!("unexpected event: {other:?}"),
    }
    match handle.next_event().await.expect("terminal event") {
        JobEvent::Done { result } => {
            assert_eq!(result["packages"][0]["id"], "pkg-1");
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(handle.next_event().await.is_none(), "worker stopped");
}

#[tokio::test]
async fn attempt_bound_produces_timeout_with_bounded_calls() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let travel = travel_for(&server.uri(), &dir);

    // One probe plus max_attempts scheduled checks, never more.
    Mock::given(method("GET"))
        .and(path("/travel/job/j1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("RUNNING")))
        .expect(6)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/travel/job/j1/result"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let handle = JobPoller::spawn(travel, "j1", fast_policy());
    let err = handle.wait().await.expect_err("must time out");
    assert!(matches!(err, JobError::Timeout { attempts: 5 }), "got {err:?}");
}

#[tokio::test]
async fn cancel_stops_events_immediately() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let travel = travel_for(&server.uri(), &dir);

    Mock::given(method("GET"))
        .and(path("/travel/job/j1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("PROCESSING")))
        .mount(&server)
        .await;

    let mut handle = JobPoller::spawn(travel, "j1", fast_policy());
    assert!(matches!(
        handle.next_event().await,
        Some(JobEvent::Status { .. })
    ));

    handle.cancel();
    // The channel drains to None; no event may follow cancellation.
    assert!(handle.next_event().await.is_none());
}

#[tokio::test]
async fn cancel_during_an_inflight_check_delivers_nothing() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let travel = travel_for(&server.uri(), &dir);

    // The status response arrives long after cancellation.
    Mock::given(method("GET"))
        .and(path("/travel/job/j1/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(status_body("COMPLETED"))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/travel/job/j1/result"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"packages": []})))
        .expect(0)
        .mount(&server)
        .await;

    let mut handle = JobPoller::spawn(travel, "j1", fast_policy());

    // Let the probe request go out, then cancel while it is in flight.
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.cancel();

    // The late COMPLETED response is a no-op: no event, no result fetch.
    assert!(handle.next_event().await.is_none());
}

#[tokio::test]
async fn unknown_status_keeps_polling_until_terminal() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let travel = travel_for(&server.uri(), &dir);

    Mock::given(method("GET"))
        .and(path("/travel/job/j1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "QUEUED"})))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/travel/job/j1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("COMPLETED")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/travel/job/j1/result"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"packages": []})))
        .mount(&server)
        .await;

    let mut handle = JobPoller::spawn(travel, "j1", fast_policy());

    // Unrecognized vocabulary is treated as still-pending, not an error.
    match handle.next_event().await.expect("probe event") {
        JobEvent::Status { status, .. } => assert_eq!(status, JobStatus::Pending),
        other => panic!("unexpected event: {other:?}"),
    }
    match handle.next_event().await.expect("first tick") {
        JobEvent::Status { status, progress, .. } => {
            assert_eq!(status, JobStatus::Pending);
            assert_eq!(progress, 22);
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(matches!(
        handle.next_event().await,
        Some(JobEvent::Done { .. })
    ));
}

#[tokio::test]
async fn failed_status_surfaces_the_user_facing_message() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let travel = travel_for(&server.uri(), &dir);

    Mock::given(method("GET"))
        .and(path("/travel/job/j1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("FAILED")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/travel/job/j1/result"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let handle = JobPoller::spawn(travel, "j1", fast_policy());
    match handle.wait().await.expect_err("failed job") {
        JobError::Failed(message) => {
            assert_eq!(message, "The search process failed. Please try again later.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn result_fetch_failure_is_reported_and_not_retried() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let travel = travel_for(&server.uri(), &dir);

    Mock::given(method("GET"))
        .and(path("/travel/job/j1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("COMPLETED")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/travel/job/j1/result"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "storage down"})))
        .expect(1)
        .mount(&server)
        .await;

    let handle = JobPoller::spawn(travel, "j1", fast_policy());
    match handle.wait().await.expect_err("fetch failure") {
        JobError::Failed(message) => {
            assert!(message.starts_with("Result fetch failed:"), "got {message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn network_failure_without_retry_budget_fails_the_watch() {
    let dir = tempfile::tempdir().expect("tempdir");
    // Discard port: every status check is a connection error.
    let travel = travel_for("http://127.0.0.1:9", &dir);

    let handle = JobPoller::spawn(travel, "j1", fast_policy());
    match handle.wait().await.expect_err("network failure") {
        JobError::Failed(message) => {
            assert!(message.starts_with("Status check failed:"), "got {message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn submit_and_watch_runs_the_launched_job_to_completion() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let travel = travel_for(&server.uri(), &dir);

    Mock::given(method("POST"))
        .and(path("/travel/submit-form"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Travel request submitted successfully",
            "travel_id": "t-1",
            "external_job_id": "j1",
            "status": "submitted",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/travel/job/j1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("COMPLETED")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/travel/job/j1/result"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"packages": []})))
        .mount(&server)
        .await;

    let (response, watcher) = jobs::submit_and_watch(&travel, &minimal_form(), fast_policy())
        .await
        .expect("submission");
    assert_eq!(response.travel_id, "t-1");

    let result = watcher
        .expect("a job was launched")
        .wait()
        .await
        .expect("job completes");
    assert!(result["packages"].is_array());
}

#[tokio::test]
async fn submission_without_a_job_id_yields_no_watcher() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let travel = travel_for(&server.uri(), &dir);

    Mock::given(method("POST"))
        .and(path("/travel/submit-form"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Travel request submitted successfully",
            "travel_id": "t-2",
            "status": "submitted",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/travel/job/j1/status"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (response, watcher) = jobs::submit_and_watch(&travel, &minimal_form(), fast_policy())
        .await
        .expect("submission");
    assert_eq!(response.travel_id, "t-2");
    assert!(watcher.is_none());
}

#[tokio::test]
async fn invalid_form_never_reaches_the_server() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let travel = travel_for(&server.uri(), &dir);

    Mock::given(method("POST"))
        .and(path("/travel/submit-form"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut form = minimal_form();
    form.passions.clear();

    let err = jobs::submit_and_watch(&travel, &form, fast_policy())
        .await
        .expect_err("rejected client-side");
    assert!(
        matches!(err, TravelError::Validation(ValidationError::NoPassions)),
        "got {err:?}"
    );
}
