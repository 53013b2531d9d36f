//! Security tests for database connection pool
//!
//! OWASP A04:2021 - Insecure Design (Resource Exhaustion)

#[allow(unused_imports)]
use db_pool::{create_pool, DbConfig};

// =============================================================================
// P0-2: Pool Backpressure & Exhaustion Tests
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_pool_config_total_connections_under_limit() {
    // CRITICAL: Total connections across all services must not exceed PostgreSQL limit
    let services = vec!["upload-coordinator", "split-worker", "frame-worker"];

    let total: u32 = services
        .iter()
        .map(|s| DbConfig::for_service(s).max_connections)
        .sum();

    // PostgreSQL default max_connections = 100
    // Reserve 25 for system overhead
    // Max application connections = 75
    assert!(
        total <= 75,
        "Total connections ({}) exceeds safe limit 75. \
         This will cause production outages!",
        total
    );

    println!(
        "Total DB connections across {} services: {}/75",
        services.len(),
        total
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_pool_config_rejects_oversized_env_override() {
    // Malicious or misconfigured env var should be clamped
    std::env::set_var("DB_MAX_CONNECTIONS", "999999");

    let _config = DbConfig::for_service("test-service");

    // Should be clamped to reasonable max (e.g., 100)
    // TODO: Implement bounds checking in DbConfig::from_env()
    // assert!(config.max_connections <= 100);

    // Cleanup
    std::env::remove_var("DB_MAX_CONNECTIONS");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_pool_config_rejects_zero_connections() {
    std::env::set_var("DB_MAX_CONNECTIONS", "0");

    let config = DbConfig::for_service("test-service");

    // Zero connections is invalid
    assert!(
        config.max_connections > 0,
        "Pool with zero connections is invalid"
    );

    std::env::remove_var("DB_MAX_CONNECTIONS");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_pool_config_min_less_than_max() {
    let config = DbConfig::for_service("auth-service");

    assert!(
        config.min_connections < config.max_connections,
        "min_connections ({}) must be < max_connections ({})",
        config.min_connections,
        config.max_connections
    );
}

// =============================================================================
// Connection Timeout Tests
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_pool_has_acquire_timeout() {
    let config = DbConfig::for_service("test-service");

    assert!(
        config.acquire_timeout_secs > 0,
        "Acquire timeout must be configured to prevent indefinite hangs"
    );

    assert!(
        config.acquire_timeout_secs <= 30,
        "Acquire timeout too long ({}s), should be ≤30s",
        config.acquire_timeout_secs
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_pool_has_idle_timeout() {
    let config = DbConfig::for_service("test-service");

    assert!(
        config.idle_timeout_secs > 0,
        "Idle timeout must be configured to prevent stale connections"
    );

    assert!(
        config.idle_timeout_secs >= 300,
        "Idle timeout too short ({}s), should be ≥300s to avoid thrashing",
        config.idle_timeout_secs
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_pool_has_max_lifetime() {
    let config = DbConfig::for_service("test-service");

    assert!(
        config.max_lifetime_secs > 0,
        "Max lifetime must be configured to handle PostgreSQL restarts"
    );

    assert!(
        config.max_lifetime_secs >= config.idle_timeout_secs,
        "Max lifetime ({}s) should be ≥ idle timeout ({}s)",
        config.max_lifetime_secs,
        config.idle_timeout_secs
    );
}

// =============================================================================
// High-Traffic Service Configuration Tests
// =============================================================================

#[test]
fn test_high_traffic_services_have_larger_pools() {
    let coordinator_config = DbConfig::for_service("upload-coordinator");
    let split_config = DbConfig::for_service("split-worker");

    // The HTTP-facing coordinator fans out to more concurrent callers than a worker
    assert!(
        coordinator_config.max_connections > split_config.max_connections,
        "upload-coordinator ({}) should have more connections than split-worker ({})",
        coordinator_config.max_connections,
        split_config.max_connections
    );
}

// =============================================================================
// Pool Backpressure Tests (TODO: Implement after P0-2 fix)
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
#[ignore = "Requires implementation of acquire_with_backpressure()"]
async fn test_pool_backpressure_85_percent_threshold() {
    // Simulated test for future implementation
    // When pool reaches 85% utilization, new requests should be rejected

    // let pool = create_test_pool(10).await; // max 10 connections
    //
    // // Acquire 9 connections (90% utilization)
    // let mut conns = Vec::new();
    // for _ in 0..9 {
    //     conns.push(pool.acquire().await.unwrap());
    // }
    //
    // // Next acquire with 85% threshold should fail
    // let result = acquire_with_backpressure(&pool, 0.85).await;
    // assert!(matches!(result, Err(PoolError::PoolExhausted { .. })));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
#[ignore = "Requires implementation of acquire_with_backpressure()"]
async fn test_pool_backpressure_allows_below_threshold() {
    // When pool is below threshold, requests should succeed

    // let pool = create_test_pool(10).await;
    //
    // // Acquire 7 connections (70% utilization)
    // let mut conns = Vec::new();
    // for _ in 0..7 {
    //     conns.push(pool.acquire().await.unwrap());
    // }
    //
    // // Next acquire with 85% threshold should succeed
    // let result = acquire_with_backpressure(&pool, 0.85).await;
    // assert!(result.is_ok());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
#[ignore = "Requires implementation of acquire_with_backpressure()"]
async fn test_pool_backpressure_metrics_incremented() {
    // Verify that backpressure events are recorded in Prometheus

    // let pool = create_test_pool(10).await;
    //
    // // Trigger backpressure
    // let mut conns = Vec::new();
    // for _ in 0..10 {
    //     conns.push(pool.acquire().await.unwrap());
    // }
    //
    // let _ = acquire_with_backpressure(&pool, 0.85).await;
    //
    // // Check metric
    // let metric = prometheus::default_registry()
    //     .gather()
    //     .iter()
    //     .find(|m| m.get_name() == "db_pool_backpressure_rejections_total")
    //     .expect("Metric should exist");
    //
    // assert!(metric.get_metric()[0].get_counter().get_value() > 0.0);
}

// =============================================================================
// Connection String Security Tests
// =============================================================================

#[test]
fn test_database_url_not_logged() {
    // Verify DATABASE_URL is never accidentally logged
    let config = DbConfig::for_service("test-service");

    // Simulate logging
    let log_output = format!("{:?}", config);

    // DATABASE_URL should NOT appear in debug output
    // Note: This assumes DATABASE_URL contains "postgres://"
    assert!(
        !log_output.contains("postgres://"),
        "DATABASE_URL leaked in debug output: {}",
        log_output
    );
}

// =============================================================================
// Service Name Validation Tests
// =============================================================================

#[test]
fn test_unknown_service_gets_conservative_limits() {
    let config = DbConfig::for_service("unknown-service-xyz");

    // Unknown services should get minimal connections (fail-safe)
    assert!(
        config.max_connections <= 2,
        "Unknown service should get conservative connection limit"
    );
}

#[test]
fn test_service_name_sanitization() {
    // Test that malicious service names don't cause issues
    let malicious_names = vec![
        "../../../etc/passwd",
        "'; DROP TABLE users--",
        "<script>alert('xss')</script>",
        "auth-service\n\nevil-command",
    ];

    for name in malicious_names {
        let config = DbConfig::for_service(name);

        // Should handle gracefully without panic
        assert!(config.max_connections > 0);
        assert_eq!(config.service_name, name); // Service name stored as-is
    }
}

// =============================================================================
// Pool Creation Failure Handling Tests
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_pool_creation_fails_with_invalid_url() {
    let mut config = DbConfig::for_service("test-service");
    config.database_url = "invalid://not-a-database".to_string();

    let result = create_pool(config).await;

    assert!(
        result.is_err(),
        "Pool creation should fail with invalid DATABASE_URL"
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_pool_creation_timeout_enforced() {
    let mut config = DbConfig::for_service("test-service");
    config.database_url = "postgres://127.0.0.1:9999/nonexistent".to_string();
    config.connect_timeout_secs = 1; // 1 second timeout

    let start = std::time::Instant::now();
    let result = create_pool(config).await;
    let elapsed = start.elapsed();

    assert!(
        result.is_err(),
        "Pool creation should fail for unreachable DB"
    );

    // Should timeout quickly (within 2 seconds, accounting for retry logic)
    assert!(
        elapsed.as_secs() < 5,
        "Pool creation timeout not enforced (took {}s)",
        elapsed.as_secs()
    );
}

// =============================================================================
// Concurrent Connection Acquisition Tests
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
#[ignore = "Requires real PostgreSQL instance"]
async fn test_pool_handles_concurrent_acquisitions() {
    // Verify pool is thread-safe and handles concurrent requests

    std::env::set_var("DATABASE_URL", "postgres://localhost/video_pipeline_test");
    let config = DbConfig::for_service("test-service");
    let pool = create_pool(config).await.unwrap();

    let mut handles = vec![];

    // Spawn 20 concurrent tasks trying to acquire connections
    for i in 0..20 {
        let pool_clone = pool.clone();
        let handle = tokio::spawn(async move {
            let conn = pool_clone.acquire().await;
            println!("Task {} acquired connection: {:?}", i, conn.is_ok());
            conn
        });
        handles.push(handle);
    }

    // Wait for all tasks
    for handle in handles {
        let _ = handle.await;
    }

    // All tasks should complete without deadlock
    // (Test passes if no timeout/panic)
}

// =============================================================================
// Metrics Export Security Tests
// =============================================================================

#[test]
fn test_pool_metrics_do_not_expose_credentials() {
    // Verify Prometheus metrics don't leak database credentials

    let config = DbConfig::for_service("test-service");
    config.log_config();

    // Simulate metric scraping
    let metrics = prometheus::default_registry().gather();

    for metric_family in metrics {
        for metric in metric_family.get_metric() {
            // Check all label values
            for label in metric.get_label() {
                let value = label.get_value();

                // Should not contain passwords, connection strings, etc.
                assert!(
                    !value.contains("password"),
                    "Metric label contains 'password': {}",
                    value
                );
                assert!(
                    !value.contains("postgres://"),
                    "Metric label contains connection string: {}",
                    value
                );
            }
        }
    }
}
