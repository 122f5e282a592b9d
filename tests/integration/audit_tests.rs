//! End-to-end audit runs against a mock site

use crate::{create_test_config, mount_login, mount_node};
use mixed_audit::checkpoint::read_log;
use mixed_audit::crawler::{run_audit, AuditOptions, AuditOutcome};
use mixed_audit::session::Credentials;
use mixed_audit::AuditError;
use std::fs;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> Credentials {
    Credentials::new("auditor", "secret")
}

#[tokio::test]
async fn test_full_audit_records_every_outcome() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_node(&server, "1", 200, "<html><body>published</body></html>").await;
    mount_node(
        &server,
        "2",
        200,
        r#"<html><body><div class="node-unpublished">draft</div></body></html>"#,
    )
    .await;
    mount_node(&server, "3", 404, "<html>not found</html>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    fs::write(&config.files.targets, "1\n2\n3\n").unwrap();
    let root = Url::parse(&server.uri()).unwrap();

    let outcome = run_audit(
        &config,
        &root,
        &AuditOptions::default(),
        &credentials(),
        CancellationToken::new(),
    )
    .await
    .expect("Audit should complete");

    let stats = match outcome {
        AuditOutcome::Completed(stats) => stats,
        other => panic!("Expected completed run, got {:?}", other),
    };
    assert_eq!(stats.checked, 3);
    assert_eq!(stats.success, 2);
    assert_eq!(stats.failure, 1);
    assert_eq!(stats.unpublished, 1);

    assert_eq!(read_log(&config.files.checked).unwrap(), "1\n2\n");
    assert_eq!(
        read_log(&config.files.errors).unwrap(),
        "Error,3,Status code: 404\n"
    );
    assert_eq!(read_log(&config.files.error_list).unwrap(), "3\n");
    assert_eq!(
        read_log(&config.files.results).unwrap(),
        "Unpublished Page,2,\n"
    );
}

#[tokio::test]
async fn test_second_run_has_no_new_targets() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_node(&server, "1", 200, "<html>ok</html>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    fs::write(&config.files.targets, "1\n").unwrap();
    let root = Url::parse(&server.uri()).unwrap();

    let first = run_audit(
        &config,
        &root,
        &AuditOptions::default(),
        &credentials(),
        CancellationToken::new(),
    )
    .await
    .unwrap();
    assert!(matches!(first, AuditOutcome::Completed(_)));

    let requests_after_first = server.received_requests().await.unwrap().len();

    let second = run_audit(
        &config,
        &root,
        &AuditOptions::default(),
        &credentials(),
        CancellationToken::new(),
    )
    .await
    .unwrap();
    assert!(matches!(second, AuditOutcome::NoNewTargets));

    // No login and no navigation on the second run
    assert_eq!(
        server.received_requests().await.unwrap().len(),
        requests_after_first
    );
}

#[tokio::test]
async fn test_empty_target_list_never_touches_the_site() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    fs::write(&config.files.targets, "\n\n").unwrap();
    let root = Url::parse(&server.uri()).unwrap();

    let outcome = run_audit(
        &config,
        &root,
        &AuditOptions::default(),
        &credentials(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(matches!(outcome, AuditOutcome::NoNewTargets));
    // Checkpoint files are created even when nothing runs
    assert!(config.files.checked.exists());
    assert!(config.files.results.exists());
}

#[tokio::test]
async fn test_resume_skips_checked_and_retries_errors() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_node(&server, "2", 200, "<html>ok</html>").await;
    mount_node(&server, "3", 200, "<html>ok</html>").await;
    Mock::given(method("GET"))
        .and(path("/node/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    fs::write(&config.files.targets, "1\n2\n3\n").unwrap();
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(&config.files.checked, "1\n").unwrap();
    fs::write(&config.files.errors, "Error,2,Status code: 500\n").unwrap();
    fs::write(&config.files.error_list, "2\n").unwrap();
    let root = Url::parse(&server.uri()).unwrap();

    let outcome = run_audit(
        &config,
        &root,
        &AuditOptions::default(),
        &credentials(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.stats().map(|s| s.checked), Some(2));
    assert_eq!(read_log(&config.files.checked).unwrap(), "1\n2\n3\n");
    // Earlier error records stay; the retry appends to the checked log
    assert_eq!(read_log(&config.files.error_list).unwrap(), "2\n");
}

#[tokio::test]
async fn test_skip_errors_leaves_failed_ids_out() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_node(&server, "3", 200, "<html>ok</html>").await;
    Mock::given(method("GET"))
        .and(path("/node/2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    fs::write(&config.files.targets, "2\n3\n").unwrap();
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(&config.files.error_list, "2\n").unwrap();
    let root = Url::parse(&server.uri()).unwrap();

    let options = AuditOptions {
        clear_data: false,
        skip_errors: true,
    };
    let outcome = run_audit(
        &config,
        &root,
        &options,
        &credentials(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.stats().map(|s| s.checked), Some(1));
    assert_eq!(read_log(&config.files.checked).unwrap(), "3\n");
}

#[tokio::test]
async fn test_clear_data_restarts_from_scratch() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_node(&server, "1", 200, "<html>ok</html>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    fs::write(&config.files.targets, "1\n").unwrap();
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(&config.files.checked, "1\n").unwrap();
    fs::write(&config.files.results, "Blockable,1,http://old/a.js\n").unwrap();
    fs::write(&config.files.errors, "Error,9,Status code: 500\n").unwrap();
    fs::write(&config.files.error_list, "9\n").unwrap();
    let root = Url::parse(&server.uri()).unwrap();

    let options = AuditOptions {
        clear_data: true,
        skip_errors: false,
    };
    let outcome = run_audit(
        &config,
        &root,
        &options,
        &credentials(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(matches!(outcome, AuditOutcome::Completed(_)));
    assert_eq!(read_log(&config.files.checked).unwrap(), "1\n");
    assert_eq!(read_log(&config.files.results).unwrap(), "");
    assert_eq!(read_log(&config.files.errors).unwrap(), "");
    assert_eq!(read_log(&config.files.error_list).unwrap(), "");
}

#[tokio::test]
async fn test_rejected_login_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_string(crate::LOGIN_PAGE))
        .mount(&server)
        .await;
    // Bad credentials re-render the login form instead of redirecting
    Mock::given(method("POST"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_string(crate::LOGIN_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/node/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    fs::write(&config.files.targets, "1\n").unwrap();
    let root = Url::parse(&server.uri()).unwrap();

    let result = run_audit(
        &config,
        &root,
        &AuditOptions::default(),
        &credentials(),
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(AuditError::Auth(_))));
    assert_eq!(read_log(&config.files.checked).unwrap(), "");
}

#[tokio::test]
async fn test_missing_login_form_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    fs::write(&config.files.targets, "1\n").unwrap();
    let root = Url::parse(&server.uri()).unwrap();

    let result = run_audit(
        &config,
        &root,
        &AuditOptions::default(),
        &credentials(),
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(AuditError::Auth(_))));
}

#[tokio::test]
async fn test_cancelled_run_writes_nothing_for_pending_ids() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_node(&server, "1", 200, "<html>ok</html>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    fs::write(&config.files.targets, "1\n2\n").unwrap();
    let root = Url::parse(&server.uri()).unwrap();

    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let outcome = run_audit(
        &config,
        &root,
        &AuditOptions::default(),
        &credentials(),
        shutdown,
    )
    .await
    .unwrap();

    assert!(matches!(outcome, AuditOutcome::Interrupted(_)));
    assert_eq!(read_log(&config.files.checked).unwrap(), "");
    assert_eq!(read_log(&config.files.error_list).unwrap(), "");
}

#[tokio::test]
async fn test_slow_page_times_out_into_error_log() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/node/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html>late</html>")
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    mount_node(&server, "2", 200, "<html>ok</html>").await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), dir.path());
    config.session.navigation_timeout_ms = 1_000;
    fs::write(&config.files.targets, "1\n2\n").unwrap();
    let root = Url::parse(&server.uri()).unwrap();

    let outcome = run_audit(
        &config,
        &root,
        &AuditOptions::default(),
        &credentials(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(matches!(outcome, AuditOutcome::Completed(_)));
    assert_eq!(
        read_log(&config.files.errors).unwrap(),
        "Error,1,Navigation timeout of 1000 ms exceeded\n"
    );
    assert_eq!(read_log(&config.files.checked).unwrap(), "2\n");
}
