//! Failure injection tests for probing and relay failover.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;
use failover_router::health::HealthProbe;
use failover_router::load_balancer::{InstanceAddr, InstancePool};
use failover_router::routing::{RelayError, RelayRequest, Router};

mod common;

const TIMEOUT: Duration = Duration::from_millis(300);

fn instance_addr(addr: SocketAddr) -> InstanceAddr {
    InstanceAddr::new(addr.ip().to_string(), addr.port())
}

fn new_pool() -> Arc<InstancePool> {
    Arc::new(InstancePool::new(HealthProbe::new("/health", TIMEOUT)))
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_relay_on_empty_pool_fails_immediately() {
    let router = Router::new(new_pool(), TIMEOUT);

    let start = Instant::now();
    let result = router.relay(&RelayRequest::get("/process")).await;
    assert!(matches!(result, Err(RelayError::NoBackends)));
    assert!(start.elapsed() < Duration::from_millis(100));
}

#[tokio::test]
async fn test_relay_fails_over_after_timeout() {
    let slow = common::start_hanging_backend().await;
    let fast = common::start_mock_backend("b").await;

    let pool = new_pool();
    let a = pool.register(instance_addr(slow));
    let b = pool.register(instance_addr(fast));
    a.set_healthy(true);
    b.set_healthy(true);

    let router = Router::new(pool.clone(), TIMEOUT);
    let response = router.relay(&RelayRequest::get("/process")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["backend"], "b");
    assert_eq!(body["path"], "/process");
    assert!(!a.is_healthy(), "timed-out instance should be marked unhealthy");
    assert!(b.is_healthy());

    // The failed instance is skipped until a probe revives it.
    let response = router.relay(&RelayRequest::get("/again")).await.unwrap();
    assert_eq!(json_body(response).await["backend"], "b");
}

#[tokio::test]
async fn test_relay_exhausts_pool_and_marks_every_failure() {
    let refused = common::closed_addr().await;
    let not_json = common::start_programmable_backend(|_| async {
        (200, "plain text".to_string())
    })
    .await;

    let pool = new_pool();
    let a = pool.register(instance_addr(refused));
    let b = pool.register(instance_addr(not_json));
    a.set_healthy(true);
    b.set_healthy(true);

    let router = Router::new(pool, TIMEOUT);
    let result = router.relay(&RelayRequest::get("/process")).await;

    assert!(matches!(result, Err(RelayError::NoBackends)));
    assert!(!a.is_healthy());
    assert!(!b.is_healthy());
}

#[tokio::test]
async fn test_relay_skips_unhealthy_without_network_calls() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let backend = common::start_programmable_backend(move |_| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            (200, "{}".to_string())
        }
    })
    .await;

    let pool = new_pool();
    pool.register(instance_addr(backend));
    pool.register(instance_addr(backend));

    let router = Router::new(pool, TIMEOUT);
    let result = router.relay(&RelayRequest::get("/process")).await;

    assert!(matches!(result, Err(RelayError::NoBackends)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_relay_returns_backend_status_verbatim() {
    let backend = common::start_programmable_backend(|_| async {
        (500, r#"{"error":"boom"}"#.to_string())
    })
    .await;

    let pool = new_pool();
    let instance = pool.register(instance_addr(backend));
    instance.set_healthy(true);

    let router = Router::new(pool, TIMEOUT);
    let response = router.relay(&RelayRequest::get("/process")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "boom");
    assert!(instance.is_healthy(), "a decodable answer is not a forward failure");
}

#[tokio::test]
async fn test_relay_keeps_backend_headers() {
    let backend = common::start_mock_backend("a").await;

    let pool = new_pool();
    pool.register(instance_addr(backend)).set_healthy(true);

    let router = Router::new(pool, TIMEOUT);
    let response = router.relay(&RelayRequest::get("/process")).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-mock-backend").unwrap(), "1");
    assert_eq!(headers.get("content-type").unwrap(), "application/json");
    assert!(headers.get("connection").is_none(), "hop-by-hop headers are stripped");
    assert!(headers.get("content-length").is_none());
}

#[tokio::test]
async fn test_relay_follows_round_robin_order() {
    let a = common::start_mock_backend("a").await;
    let b = common::start_mock_backend("b").await;

    let pool = new_pool();
    for addr in [a, b] {
        pool.register(instance_addr(addr)).set_healthy(true);
    }

    let router = Router::new(pool, TIMEOUT);
    let mut seen = Vec::new();
    for _ in 0..4 {
        let response = router.relay(&RelayRequest::get("/process")).await.unwrap();
        seen.push(json_body(response).await["backend"].as_str().unwrap().to_string());
    }
    assert_eq!(seen, ["a", "b", "a", "b"]);
}

#[tokio::test]
async fn test_health_check_is_idempotent() {
    let up = common::start_mock_backend("up").await;
    let failing = common::start_programmable_backend(|_| async {
        (503, "{}".to_string())
    })
    .await;
    let down = common::closed_addr().await;

    let pool = new_pool();
    let up = pool.register(instance_addr(up));
    let failing = pool.register(instance_addr(failing));
    let down = pool.register(instance_addr(down));

    for _ in 0..2 {
        assert!(pool.health_check_one(&up).await);
        assert!(!pool.health_check_one(&failing).await);
        assert!(!pool.health_check_one(&down).await);
    }
    assert!(up.is_healthy());
    assert!(!failing.is_healthy());
    assert!(!down.is_healthy());
}

#[tokio::test]
async fn test_health_check_times_out() {
    let slow = common::start_hanging_backend().await;
    let pool = new_pool();
    let instance = pool.register(instance_addr(slow));
    instance.set_healthy(true);

    let start = Instant::now();
    assert!(!pool.health_check_one(&instance).await);
    assert!(start.elapsed() < Duration::from_secs(2));
    assert!(!instance.is_healthy());
}

#[tokio::test]
async fn test_add_probes_before_returning() {
    let up = common::start_mock_backend("up").await;
    let down = common::closed_addr().await;

    let pool = new_pool();
    assert!(pool.add(instance_addr(up)).await);
    assert!(!pool.add(instance_addr(down)).await);

    let snapshot = pool.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert!(snapshot[0].is_healthy());
    assert!(!snapshot[1].is_healthy());
}

#[tokio::test]
async fn test_health_check_all_revives_instance() {
    let up = common::start_mock_backend("up").await;
    let pool = new_pool();
    let instance = pool.register(instance_addr(up));
    assert!(!instance.is_healthy());

    pool.health_check_all().await;
    assert!(instance.is_healthy());
    assert!(pool.select_next().is_some());
}
