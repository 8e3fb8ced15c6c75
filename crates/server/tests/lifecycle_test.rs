//! End-to-end harness tests
//!
//! These drive the control surface the way a publisher resilience test
//! would: start the receiver, deliver batches with the test publisher,
//! disrupt the lifecycle, and assert on counts across the boundaries.

use std::time::Duration;

use tokio::net::TcpListener;
use tokio::time::timeout;

use faultline_client::{test_batch, Credentials, EventBatch, TestPublisher};
use faultline_server::{ControlError, LifecycleState, TestServer};

/// Install a test subscriber so RUST_LOG surfaces harness logs
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Find an available port for testing
async fn find_available_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Deliver one batch and close the connection
async fn deliver(port: u16, batch: &EventBatch) {
    let mut publisher = TestPublisher::connect(&format!("127.0.0.1:{port}"))
        .await
        .expect("failed to connect to receiver");
    publisher.send(batch).await.expect("failed to send batch");
    publisher.flush().await.expect("failed to flush");
    publisher.close().await.expect("failed to close");
}

/// Poll until the server has counted `expected` events
async fn wait_for_count(server: &TestServer, expected: u64) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while server.events_received() < expected && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(server.events_received(), expected);
}

#[tokio::test]
async fn test_counts_batch_then_refuses_after_stop() {
    init_tracing();
    let server = TestServer::default();
    let port = find_available_port().await;

    server.start(port).await.expect("start failed");

    deliver(port, &test_batch(3)).await;
    wait_for_count(&server, 3).await;

    server.stop().await;

    // Delivery attempts are refused while stopped; the count is untouched
    let result = TestPublisher::connect(&format!("127.0.0.1:{port}")).await;
    assert!(result.is_err(), "connect should be refused after stop");
    assert_eq!(server.events_received(), 3);
}

#[tokio::test]
async fn test_n_batches_of_k_events() {
    init_tracing();
    let server = TestServer::default();
    let port = find_available_port().await;

    server.start(port).await.expect("start failed");

    // 4 batches x 5 events over one connection
    let mut publisher = TestPublisher::connect(&format!("127.0.0.1:{port}"))
        .await
        .expect("failed to connect");
    for _ in 0..4 {
        publisher
            .send(&test_batch(5))
            .await
            .expect("failed to send");
    }
    publisher.flush().await.expect("failed to flush");
    publisher.close().await.expect("failed to close");

    wait_for_count(&server, 20).await;

    server.stop().await;
}

#[tokio::test]
async fn test_reset_returns_count_to_zero() {
    init_tracing();
    let server = TestServer::default();
    let port = find_available_port().await;

    server.start(port).await.expect("start failed");
    deliver(port, &test_batch(6)).await;
    wait_for_count(&server, 6).await;

    server.reset_received_events();
    assert_eq!(server.events_received(), 0);

    // Subsequent increments resume from zero
    deliver(port, &test_batch(2)).await;
    wait_for_count(&server, 2).await;

    server.stop().await;
}

#[tokio::test]
async fn test_restart_preserves_count_and_resumes_delivery() {
    init_tracing();
    let server = TestServer::default();
    let port = find_available_port().await;

    server.start(port).await.expect("start failed");

    // 5 events land before the scheduled stop fires
    deliver(port, &test_batch(5)).await;
    wait_for_count(&server, 5).await;

    server
        .schedule_restart(port, Duration::from_millis(100), Duration::from_millis(100))
        .expect("schedule failed");

    timeout(Duration::from_secs(5), server.wait_for_restart())
        .await
        .expect("restart did not complete");

    assert_eq!(server.events_before_last_restart().unwrap(), 5);
    assert_eq!(server.state(), LifecycleState::Running);

    // The receiver accepts again and the count continues, no implicit reset
    deliver(port, &test_batch(4)).await;
    wait_for_count(&server, 9).await;
    assert_eq!(server.events_before_last_restart().unwrap(), 5);

    server.stop().await;
}

#[tokio::test]
async fn test_count_before_restart_unavailable() {
    init_tracing();
    let server = TestServer::default();

    let err = server.events_before_last_restart().unwrap_err();

    assert!(matches!(err, ControlError::RestartNotCompleted));
}

#[tokio::test]
async fn test_overlapping_restart_schedules_rejected() {
    init_tracing();
    let server = TestServer::default();
    let port = find_available_port().await;

    server.start(port).await.expect("start failed");

    server
        .schedule_restart(port, Duration::from_millis(200), Duration::from_millis(50))
        .expect("first schedule failed");

    let err = server
        .schedule_restart(port, Duration::from_millis(200), Duration::from_millis(50))
        .unwrap_err();
    assert!(matches!(err, ControlError::RestartInProgress));

    timeout(Duration::from_secs(5), server.wait_for_restart())
        .await
        .expect("restart did not complete");

    server.stop().await;
}

#[tokio::test]
async fn test_cancelled_restart_keeps_receiver_running() {
    init_tracing();
    let server = TestServer::default();
    let port = find_available_port().await;

    server.start(port).await.expect("start failed");

    server
        .schedule_restart(port, Duration::from_secs(30), Duration::from_millis(10))
        .expect("schedule failed");
    server.cancel_restart();

    timeout(Duration::from_secs(5), server.wait_for_restart())
        .await
        .expect("cancelled task did not finish");

    assert_eq!(server.state(), LifecycleState::Running);
    deliver(port, &test_batch(1)).await;
    wait_for_count(&server, 1).await;

    server.stop().await;
}

#[tokio::test]
async fn test_port_zero_rejected() {
    init_tracing();
    let server = TestServer::default();

    assert!(matches!(
        server.start(0).await.unwrap_err(),
        ControlError::InvalidPort { port: 0 }
    ));
    assert!(matches!(
        server
            .schedule_restart(0, Duration::ZERO, Duration::ZERO)
            .unwrap_err(),
        ControlError::InvalidPort { port: 0 }
    ));
}

#[tokio::test]
async fn test_stream_definition_registration() {
    init_tracing();
    let server = TestServer::default();

    let definition = r#"{
        "name": "org.sample.stats",
        "version": "1.0.0",
        "payloadData": [{"name": "count", "type": "long"}]
    }"#;

    let key = server
        .add_stream_definition(definition)
        .expect("registration failed");
    assert_eq!(key.as_str(), "org.sample.stats:1.0.0");

    // The store's duplicate policy: identical re-registration fails
    let err = server.add_stream_definition(definition).unwrap_err();
    assert!(matches!(err, ControlError::Schema(_)));

    // Malformed definitions are rejected without partial registration
    assert!(server.add_stream_definition("{broken").is_err());
    assert_eq!(server.registry().store().len(), 1);
}

#[tokio::test]
async fn test_custom_credentials_accepted_by_stub() {
    init_tracing();
    let server = TestServer::default();
    let port = find_available_port().await;

    server.start(port).await.expect("start failed");

    // The accept-all stub does not care what credentials are presented
    let batch = EventBatch::from_payloads(
        Credentials::new("nobody", "wrong-password"),
        vec![&b"event"[..]],
    );
    deliver(port, &batch).await;
    wait_for_count(&server, 1).await;

    server.stop().await;
}
