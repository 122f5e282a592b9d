//! Integration tests for the audit run and the tally stage
//!
//! These tests use wiremock to stand in for the audited site and tempfile
//! for the checkpoint logs.

mod audit_tests;
mod tally_tests;

use mixed_audit::config::{Config, FilesConfig, SessionConfig, SiteConfig};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LOGIN_PAGE: &str = r#"<html><body>
<form action="/user" method="post" id="user-login">
  <input type="text" name="name">
  <input type="password" name="pass">
  <input type="hidden" name="form_id" value="user_login">
  <input type="submit" name="op" value="Log in">
</form>
</body></html>"#;

/// Creates a test configuration rooted at `base_url` with all files under `dir`
pub fn create_test_config(base_url: &str, dir: &Path) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            teams: vec![],
        },
        session: SessionConfig {
            navigation_timeout_ms: 2_000,
            ..SessionConfig::default()
        },
        files: FilesConfig {
            targets: dir.join("targets.txt"),
            checked: dir.join("data/checked.txt"),
            errors: dir.join("data/errors.txt"),
            error_list: dir.join("data/error-list.txt"),
            results: dir.join("data/results.txt"),
            tally: dir.join("data/todo.csv"),
        },
    }
}

/// Mounts a login form that accepts any credentials and lands on /admin
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(303).insert_header("location", "/admin"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>dashboard</html>"))
        .mount(server)
        .await;
}

/// Mounts a content page at /node/{id}
pub async fn mount_node(server: &MockServer, id: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/node/{}", id)))
        .respond_with(ResponseTemplate::new(status).set_body_string(body.to_string()))
        .mount(server)
        .await;
}
