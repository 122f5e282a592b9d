//! Aggregation over logs produced by a real audit run

use crate::{create_test_config, mount_login, mount_node};
use mixed_audit::crawler::{run_audit, AuditOptions};
use mixed_audit::output::{export_tally, TallyTotals};
use mixed_audit::session::Credentials;
use std::fs;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::MockServer;

#[tokio::test]
async fn test_audit_then_tally() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_node(&server, "10", 200, "<html>ok</html>").await;
    mount_node(
        &server,
        "11",
        200,
        r#"<html><body class="node-unpublished">draft</body></html>"#,
    )
    .await;
    mount_node(&server, "12", 500, "<html>boom</html>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    fs::write(&config.files.targets, "10\n11\n12\n").unwrap();
    let root = Url::parse(&server.uri()).unwrap();

    run_audit(
        &config,
        &root,
        &AuditOptions::default(),
        &Credentials::new("auditor", "secret"),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let report = export_tally(&config.files).unwrap();

    // Successful pages without findings never get a bucket
    assert!(report.get("10").is_none());
    assert!(!report.get("11").unwrap().published);
    assert!(report.get("12").unwrap().error);
    assert_eq!(
        report.totals(),
        TallyTotals {
            blockable: 0,
            optionally_blockable: 0,
            published: 1,
            unpublished: 1,
            errors: 1,
        }
    );

    let csv = fs::read_to_string(&config.files.tally).unwrap();
    assert_eq!(
        csv,
        "ID,Blockable,Optionally Blockable,Published,Unpublished,Error\n\
         Total,0,0,1,1,1\n\
         12,0,0,true,false,true\n\
         11,0,0,false,true,false"
    );
}

#[test]
fn test_tally_with_hand_written_logs() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config("https://publish.example.com", dir.path());
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(
        &config.files.results,
        "Blockable,1,http://cdn.example.com/a.js\n\
         Unpublished Page,2,\n\
         Blockable,1,http://cdn.example.com/b.js\n\
         Optionally Blockable,4,http://img.example.com/c.png\n",
    )
    .unwrap();
    fs::write(&config.files.error_list, "3\n").unwrap();

    let report = export_tally(&config.files).unwrap();

    assert_eq!(report.get("1").unwrap().blockable, 2);
    assert_eq!(report.get("4").unwrap().optionally_blockable, 1);
    assert_eq!(
        report.totals(),
        TallyTotals {
            blockable: 2,
            optionally_blockable: 1,
            published: 3,
            unpublished: 1,
            errors: 1,
        }
    );
}

#[test]
fn test_tally_of_missing_logs_is_empty() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config("https://publish.example.com", dir.path());

    let report = export_tally(&config.files).unwrap();

    assert!(report.is_empty());
    assert!(config.files.tally.exists());
}
