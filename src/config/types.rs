use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Mixed-Audit
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub files: FilesConfig,
}

/// The site being audited
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root URL of the site, without trailing slash
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Allowed values for `--team`; empty means any (or none)
    #[serde(default)]
    pub teams: Vec<String>,
}

/// Login and navigation behaviour of the site session
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SessionConfig {
    /// Per-navigation timeout (milliseconds)
    pub navigation_timeout_ms: u64,

    /// Path of the login form, relative to the site base
    pub login_path: String,

    /// Path the site redirects to after a successful login
    pub admin_path: String,

    /// Path prefix for content pages; targets load from `{base}/{node-path}/{id}`
    pub node_path: String,

    /// Name attribute of the login form's username input
    pub username_field: String,

    /// Name attribute of the login form's password input
    pub password_field: String,

    /// CSS selector whose presence marks a page as unpublished
    pub unpublished_selector: String,
}

impl SessionConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 15_000,
            login_path: "user".to_string(),
            admin_path: "admin".to_string(),
            node_path: "node".to_string(),
            username_field: "name".to_string(),
            password_field: "pass".to_string(),
            unpublished_selector: ".node-unpublished".to_string(),
        }
    }
}

/// Locations of the target list, checkpoint logs and tally output
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FilesConfig {
    /// Newline-delimited list of identifiers to audit
    pub targets: PathBuf,

    /// Identifiers that loaded successfully
    #[serde(default = "default_checked")]
    pub checked: PathBuf,

    /// `Error,<id>,<detail>` records
    #[serde(default = "default_errors")]
    pub errors: PathBuf,

    /// Bare identifiers that failed
    #[serde(default = "default_error_list")]
    pub error_list: PathBuf,

    /// `<category>,<id>,<detail>` findings
    #[serde(default = "default_results")]
    pub results: PathBuf,

    /// Aggregated tally table
    #[serde(default = "default_tally")]
    pub tally: PathBuf,
}

fn default_checked() -> PathBuf {
    PathBuf::from("data/checked.txt")
}

fn default_errors() -> PathBuf {
    PathBuf::from("data/errors.txt")
}

fn default_error_list() -> PathBuf {
    PathBuf::from("data/error-list.txt")
}

fn default_results() -> PathBuf {
    PathBuf::from("data/results.txt")
}

fn default_tally() -> PathBuf {
    PathBuf::from("data/todo.csv")
}
