//! End-to-end server lifecycle scenarios.
//!
//! Each test drives the full harness stack against a mocked compute
//! endpoint, verifying:
//!
//! 1. Create confirmed with 202 and the envelope on the wire
//! 2. Teardown registered with the cleanup tracker as soon as the
//!    resource exists
//! 3. Polling until `ACTIVE`, or failing fast on `ERROR`
//! 4. Teardown deleting the server and confirming absence, even when the
//!    test body fails
//!
//! ## Running
//!
//! ```bash
//! cargo test -p stratus-e2e --test server_lifecycle
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stratus_cleanup::{guarded, CleanupTracker};
use stratus_envelope::{fields, ResourceKind};
use stratus_rest::{ApiError, ClientConfig, ResourceHandle, RestClient, StaticToken, StatusCode};
use stratus_waiter::{wait_for_absence, wait_for_status, StateSet, WaitError, WaitSpec, WaitTimings};

const SERVER: ResourceKind = ResourceKind::new("server", "servers");
const SERVERS_PATH: &str = "/v2.1/servers";

/// Short timings so scenarios finish quickly against the mock endpoint.
fn quick() -> WaitTimings {
    WaitTimings::new(Duration::from_millis(25), Duration::from_secs(5))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stratus_rest=debug,stratus_waiter=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

fn client_for(endpoint: &MockServer) -> RestClient {
    RestClient::new(
        ClientConfig::new(endpoint.uri()),
        Arc::new(StaticToken::new("e2e-token")),
    )
    .unwrap()
}

fn active_spec(handle: &ResourceHandle) -> WaitSpec {
    WaitSpec::new(format!("server {}", handle.id()), StateSet::of(["ACTIVE"]))
        .with_failure(StateSet::of(["ERROR"]))
        .with_timings(quick())
}

/// Registers the standard teardown: delete the server, then poll until
/// the service confirms it gone.
fn track_server(tracker: &CleanupTracker, handle: ResourceHandle) {
    let label = format!("delete server {}", handle.id());
    tracker.register(label, move || async move {
        handle.delete(StatusCode::NO_CONTENT).await?;
        let absent = WaitSpec::new(format!("server {}", handle.id()), StateSet::new())
            .with_failure(StateSet::of(["ERROR"]))
            .with_timings(quick());
        wait_for_absence(&handle, &absent).await?;
        Ok(())
    });
}

async fn mount_create(endpoint: &MockServer, id: &str, name: &str) {
    Mock::given(method("POST"))
        .and(path(SERVERS_PATH))
        .and(header("x-auth-token", "e2e-token"))
        .and(body_partial_json(json!({"server": {"name": name}})))
        .respond_with(
            ResponseTemplate::new(202)
                .insert_header("x-compute-request-id", "req-create-1")
                .set_body_json(json!({"server": {"id": id, "status": "BUILD"}})),
        )
        .expect(1)
        .mount(endpoint)
        .await;
}

// ===========================================================================
// Scenario: create, wait for ACTIVE, tear down, confirm absence
// ===========================================================================
#[tokio::test]
async fn test_server_builds_to_active_and_cleanup_confirms_absence() {
    init_tracing();
    let endpoint = MockServer::start().await;
    let id = Uuid::new_v4().to_string();
    let server_path = format!("{SERVERS_PATH}/{id}");

    mount_create(&endpoint, &id, "e2e-vm").await;

    // Three polls see BUILD, the fourth sees ACTIVE. Once both mocks are
    // exhausted, further GETs fall through to the endpoint's 404, which
    // is exactly what the absence wait expects after the delete.
    Mock::given(method("GET"))
        .and(path(&server_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"server": {"id": id, "status": "BUILD", "progress": 40}}),
        ))
        .up_to_n_times(3)
        .expect(3)
        .mount(&endpoint)
        .await;
    Mock::given(method("GET"))
        .and(path(&server_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"server": {"id": id, "status": "ACTIVE", "progress": 100}}),
        ))
        .up_to_n_times(1)
        .expect(1)
        .mount(&endpoint)
        .await;
    Mock::given(method("DELETE"))
        .and(path(&server_path))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&endpoint)
        .await;

    let client = client_for(&endpoint);
    let tracker = CleanupTracker::new();

    let outcome = guarded(tracker.clone(), {
        let client = client.clone();
        let tracker = tracker.clone();
        async move {
            let created = client
                .create(
                    SERVER,
                    SERVERS_PATH,
                    &fields! {
                        "name" => "e2e-vm",
                        "flavor" => "m1.small",
                        "key_name" => null,
                    },
                    StatusCode::ACCEPTED,
                )
                .await?;
            assert_eq!(created.status, StatusCode::ACCEPTED);
            assert_eq!(created.request_id(), Some("req-create-1"));
            assert_eq!(created.body.str("status")?, "BUILD");

            let handle =
                ResourceHandle::from_create(client.clone(), SERVER, SERVERS_PATH, &created.body)?;
            track_server(&tracker, handle.clone());

            let body = wait_for_status(&handle, &active_spec(&handle)).await?;
            assert_eq!(body.str("status")?, "ACTIVE");
            assert_eq!(body.int("progress")?, 100);
            anyhow::Ok(())
        }
    })
    .await;

    outcome.unwrap();
    endpoint.verify().await;
}

// ===========================================================================
// Scenario: resource lands in ERROR, wait fails fast, teardown still runs
// ===========================================================================
#[tokio::test]
async fn test_server_entering_error_fails_fast_and_still_cleans_up() {
    init_tracing();
    let endpoint = MockServer::start().await;
    let id = Uuid::new_v4().to_string();
    let server_path = format!("{SERVERS_PATH}/{id}");

    mount_create(&endpoint, &id, "e2e-doomed").await;

    Mock::given(method("GET"))
        .and(path(&server_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"server": {"id": id, "status": "BUILD"}}),
        ))
        .up_to_n_times(1)
        .mount(&endpoint)
        .await;
    Mock::given(method("GET"))
        .and(path(&server_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "server": {
                "id": id,
                "status": "ERROR",
                "fault": {"code": 500, "message": "No valid host was found"}
            }
        })))
        .up_to_n_times(1)
        .mount(&endpoint)
        .await;
    Mock::given(method("DELETE"))
        .and(path(&server_path))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&endpoint)
        .await;

    let client = client_for(&endpoint);
    let tracker = CleanupTracker::new();

    let outcome = guarded(tracker.clone(), {
        let client = client.clone();
        let tracker = tracker.clone();
        async move {
            let created = client
                .create(
                    SERVER,
                    SERVERS_PATH,
                    &fields! { "name" => "e2e-doomed" },
                    StatusCode::ACCEPTED,
                )
                .await?;
            let handle =
                ResourceHandle::from_create(client.clone(), SERVER, SERVERS_PATH, &created.body)?;
            track_server(&tracker, handle.clone());

            let err = wait_for_status(&handle, &active_spec(&handle))
                .await
                .unwrap_err();
            match err {
                WaitError::ErrorState { status, body, .. } => {
                    assert_eq!(status, "ERROR");
                    // The final body rides along so the fault is diagnosable.
                    assert_eq!(
                        body.object("fault")?.str("message")?,
                        "No valid host was found"
                    );
                }
                other => panic!("wrong kind: {other:?}"),
            }
            anyhow::Ok(())
        }
    })
    .await;

    outcome.unwrap();
    // Only two polls happened: the ERROR ended the wait immediately.
    endpoint.verify().await;
}

// ===========================================================================
// Scenario: teardown runs in LIFO order and survives a failing delete
// ===========================================================================
#[tokio::test]
async fn test_teardown_is_lifo_and_continues_past_failures() {
    init_tracing();
    let endpoint = MockServer::start().await;
    let client = client_for(&endpoint);
    let tracker = CleanupTracker::new();

    let ids = ["srv-a", "srv-b", "srv-c"];
    for id in ids {
        let server_path = format!("{SERVERS_PATH}/{id}");
        if id == "srv-b" {
            Mock::given(method("DELETE"))
                .and(path(&server_path))
                .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                    "conflictingRequest": {
                        "message": "Instance srv-b is locked",
                        "code": 409
                    }
                })))
                .expect(1)
                .mount(&endpoint)
                .await;
        } else {
            Mock::given(method("DELETE"))
                .and(path(&server_path))
                .respond_with(ResponseTemplate::new(204))
                .expect(1)
                .mount(&endpoint)
                .await;
        }
    }

    for id in ids {
        track_server(&tracker, client.handle(SERVER, SERVERS_PATH, id));
    }

    let report = tracker.run_all().await;

    assert_eq!(report.executed, 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "delete server srv-b");
    assert!(report.failures[0].1.contains("is locked"));

    // Reverse registration order: c, then b, then a.
    let deletes: Vec<String> = endpoint
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.method.to_string() == "DELETE")
        .map(|request| request.url.path().to_string())
        .collect();
    assert_eq!(
        deletes,
        vec![
            format!("{SERVERS_PATH}/srv-c"),
            format!("{SERVERS_PATH}/srv-b"),
            format!("{SERVERS_PATH}/srv-a"),
        ]
    );
    endpoint.verify().await;
}

// ===========================================================================
// Scenario: a panicking test body still releases what it created
// ===========================================================================
#[tokio::test]
async fn test_panicking_body_still_deletes_the_server() {
    init_tracing();
    let endpoint = MockServer::start().await;
    let id = Uuid::new_v4().to_string();
    let server_path = format!("{SERVERS_PATH}/{id}");

    mount_create(&endpoint, &id, "e2e-panics").await;
    Mock::given(method("DELETE"))
        .and(path(&server_path))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&endpoint)
        .await;

    let client = client_for(&endpoint);
    let tracker = CleanupTracker::new();

    let body = {
        let client = client.clone();
        let tracker = tracker.clone();
        async move {
            let created = client
                .create(
                    SERVER,
                    SERVERS_PATH,
                    &fields! { "name" => "e2e-panics" },
                    StatusCode::ACCEPTED,
                )
                .await
                .unwrap();
            let handle =
                ResourceHandle::from_create(client.clone(), SERVER, SERVERS_PATH, &created.body)
                    .unwrap();
            track_server(&tracker, handle);

            panic!("simulated assertion failure");
        }
    };

    let join = tokio::spawn(guarded(tracker.clone(), body));
    let err = join.await.unwrap_err();
    assert!(err.is_panic());

    // The delete went out despite the panic.
    endpoint.verify().await;
    assert!(tracker.is_empty());
}

// ===========================================================================
// Scenario: a rejected create maps onto the typed fault taxonomy
// ===========================================================================
#[tokio::test]
async fn test_rejected_create_leaves_nothing_to_clean() {
    init_tracing();
    let endpoint = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SERVERS_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "overLimit": {
                "message": "Quota exceeded for instances: already used 10 of 10",
                "code": 403
            }
        })))
        .expect(1)
        .mount(&endpoint)
        .await;

    let client = client_for(&endpoint);
    let tracker = CleanupTracker::new();

    let err = client
        .create(
            SERVER,
            SERVERS_PATH,
            &fields! { "name" => "one-too-many" },
            StatusCode::ACCEPTED,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::OverLimit { .. }));
    assert!(err.to_string().contains("Quota exceeded"));

    // Nothing was created, so teardown has nothing to do.
    let report = tracker.run_all().await;
    assert_eq!(report.executed, 0);
    endpoint.verify().await;
}
