use crate::config::types::{Config, FilesConfig, SessionConfig, SiteConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_session_config(&config.session)?;
    validate_files_config(&config.files)?;
    Ok(())
}

/// Validates the site section
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    for team in &config.teams {
        validate_path_segment("team", team)?;
    }

    Ok(())
}

/// Validates the session section
fn validate_session_config(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.navigation_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "navigation-timeout-ms must be >= 1000ms, got {}ms",
            config.navigation_timeout_ms
        )));
    }

    for (name, value) in [
        ("login-path", &config.login_path),
        ("admin-path", &config.admin_path),
        ("node-path", &config.node_path),
        ("username-field", &config.username_field),
        ("password-field", &config.password_field),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Selector::parse(&config.unpublished_selector).map_err(|_| {
        ConfigError::Validation(format!(
            "unpublished-selector '{}' is not a valid CSS selector",
            config.unpublished_selector
        ))
    })?;

    Ok(())
}

/// Validates the files section
fn validate_files_config(config: &FilesConfig) -> Result<(), ConfigError> {
    let paths = [
        ("targets", &config.targets),
        ("checked", &config.checked),
        ("errors", &config.errors),
        ("error-list", &config.error_list),
        ("results", &config.results),
        ("tally", &config.tally),
    ];

    for (name, path) in &paths {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!("{} path cannot be empty", name)));
        }
    }

    // The targets file is read-only input; the logs must not alias it or each other
    for (i, (name_a, a)) in paths.iter().enumerate() {
        for (name_b, b) in &paths[i + 1..] {
            if a == b {
                return Err(ConfigError::Validation(format!(
                    "{} and {} point at the same file '{}'",
                    name_a,
                    name_b,
                    a.display()
                )));
            }
        }
    }

    Ok(())
}

/// A team becomes a URL path segment, so keep it to a safe alphabet
fn validate_path_segment(what: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", what)));
    }

    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "{} must contain only alphanumeric characters, '-' and '_', got '{}'",
            what, value
        )));
    }

    Ok(())
}

/// Resolves the effective site root for a run
///
/// With a team the root is `{base-url}/{team}`. When the config lists
/// allowed teams, a team is required and must be one of them.
pub fn resolve_base_url(site: &SiteConfig, team: Option<&str>) -> Result<Url, ConfigError> {
    let base = site.base_url.trim_end_matches('/');

    let root = match team {
        Some(team) => {
            validate_path_segment("team", team)?;
            if !site.teams.is_empty() && !site.teams.iter().any(|t| t == team) {
                return Err(ConfigError::Validation(format!(
                    "Unknown team '{}'; expected one of: {}",
                    team,
                    site.teams.join(", ")
                )));
            }
            format!("{}/{}", base, team)
        }
        None if !site.teams.is_empty() => {
            return Err(ConfigError::Validation(format!(
                "A team is required; expected one of: {}",
                site.teams.join(", ")
            )));
        }
        None => base.to_string(),
    };

    Url::parse(&root).map_err(|e| ConfigError::InvalidUrl(format!("Invalid site root: {}", e)))
}
