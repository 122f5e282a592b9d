//! reqwest-backed site session
//!
//! Logs in through the site's HTML login form with a cookie-holding client,
//! then loads pages with plain GETs. A plain HTTP client never fetches
//! sub-resources, so the network events a browser would report are derived
//! from the served markup: every sub-resource is announced, and insecure
//! ones on a secure page carry the browser's mixed-content verdict.

use crate::config::SessionConfig;
use crate::session::events::{
    BlockedReason, EventSender, MixedContentType, NetworkEvent, RequestId,
};
use crate::session::{Credentials, PageLoad, SiteSession};
use crate::{AuthError, NavigationError};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// Sub-resources a browser refuses to load over `http:` from an `https:` page
const BLOCKABLE: &[(&str, &str)] = &[
    ("script[src]", "src"),
    ("link[rel~='stylesheet'][href]", "href"),
    ("iframe[src]", "src"),
    ("frame[src]", "src"),
    ("object[data]", "data"),
    ("embed[src]", "src"),
];

/// Passive sub-resources a browser still loads, with a warning
const OPTIONALLY_BLOCKABLE: &[(&str, &str)] = &[
    ("img[src]", "src"),
    ("audio[src]", "src"),
    ("video[src]", "src"),
    ("video[poster]", "poster"),
    ("audio source[src]", "src"),
    ("video source[src]", "src"),
    ("track[src]", "src"),
    ("img[srcset]", "srcset"),
    ("picture source[srcset]", "srcset"),
];

/// Joins path segments onto the site root
///
/// `site_url(https://host/heat, "node/12")` is `https://host/heat/node/12`,
/// unlike `Url::join`, which would drop the last segment of the root.
pub fn site_url(root: &Url, path: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
        "{}/{}",
        root.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

/// Login form fields scraped from the login page
#[derive(Debug, Clone, PartialEq)]
struct LoginForm {
    action: Url,
    fields: Vec<(String, String)>,
}

/// Session against a site over plain HTTP(S)
pub struct HttpSession {
    client: Client,
    timeout: Duration,
    events: EventSender,
    next_request: u64,
    terminated: bool,
}

impl HttpSession {
    /// Logs in and returns an authenticated session
    ///
    /// # Request Flow
    ///
    /// 1. GET `{root}/{login-path}`; a non-2xx answer is fatal
    /// 2. Find the form holding both credential inputs
    /// 3. POST its hidden inputs, submit button and the credentials
    /// 4. Follow redirects; the final URL must be `{root}/{admin-path}`
    pub async fn login(
        root: &Url,
        config: &SessionConfig,
        credentials: &Credentials,
        events: EventSender,
    ) -> Result<Self, AuthError> {
        let timeout = config.navigation_timeout();
        let client = build_http_client(timeout).map_err(|source| AuthError::Request {
            url: root.to_string(),
            source,
        })?;

        let login_url = site_url(root, &config.login_path).map_err(|source| AuthError::InvalidUrl {
            path: config.login_path.clone(),
            source,
        })?;
        let admin_url = site_url(root, &config.admin_path).map_err(|source| AuthError::InvalidUrl {
            path: config.admin_path.clone(),
            source,
        })?;

        tracing::info!("Logging into {}", login_url);
        let response = client
            .get(login_url.clone())
            .send()
            .await
            .map_err(|source| AuthError::Request {
                url: login_url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Status {
                url: login_url.to_string(),
                status: status.as_u16(),
            });
        }

        let page_url = response.url().clone();
        let body = response.text().await.map_err(|source| AuthError::Request {
            url: login_url.to_string(),
            source,
        })?;

        let mut form = find_login_form(
            &body,
            &page_url,
            &config.username_field,
            &config.password_field,
        )
        .ok_or_else(|| AuthError::MissingLoginForm {
            url: page_url.to_string(),
            username_field: config.username_field.clone(),
            password_field: config.password_field.clone(),
        })?;

        form.fields
            .push((config.username_field.clone(), credentials.username.clone()));
        form.fields
            .push((config.password_field.clone(), credentials.password.clone()));

        tracing::debug!("Submitting login form to {}", form.action);
        let response = client
            .post(form.action.clone())
            .form(&form.fields)
            .send()
            .await
            .map_err(|source| AuthError::Request {
                url: form.action.to_string(),
                source,
            })?;

        let landed = response.url().clone();
        if !same_location(&landed, &admin_url) {
            return Err(AuthError::Rejected {
                expected: admin_url.to_string(),
                actual: landed.to_string(),
            });
        }

        tracing::info!("Logged in, landed on {}", landed);
        Ok(Self {
            client,
            timeout,
            events,
            next_request: 0,
            terminated: false,
        })
    }

    fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        format!("req-{}", self.next_request)
    }

    fn emit(&self, event: NetworkEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Network event queue closed; dropping event");
        }
    }

    /// Reports the page's sub-resources as a browser would while loading it
    fn announce_subresources(&mut self, body: &str, page_url: &Url) {
        for (resource, mixed_content) in scan_subresources(body, page_url) {
            let request_id = self.next_request_id();
            self.emit(NetworkEvent::RequestWillBeSent {
                request_id: request_id.clone(),
                url: resource.to_string(),
                mixed_content,
            });
            if mixed_content == MixedContentType::Blockable {
                self.emit(NetworkEvent::LoadingFailed {
                    request_id,
                    blocked_reason: Some(BlockedReason::MixedContent),
                });
            }
        }
    }

    fn classify_error(&self, error: reqwest::Error) -> NavigationError {
        if error.is_timeout() {
            NavigationError::Timeout(self.timeout)
        } else if error.is_connect() {
            NavigationError::Network(format!("Connection failed: {}", error))
        } else {
            NavigationError::Network(error.to_string())
        }
    }
}

#[async_trait]
impl SiteSession for HttpSession {
    async fn navigate(&mut self, url: &Url) -> Result<PageLoad, NavigationError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify_error(e))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| self.classify_error(e))?;

        // Error pages load their sub-resources too
        self.announce_subresources(&body, &final_url);

        Ok(PageLoad {
            status,
            url: final_url,
            body,
        })
    }

    fn navigation_timeout(&self) -> Duration {
        self.timeout
    }

    async fn terminate(&mut self) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        tracing::debug!("Session terminated after {} sub-resource requests", self.next_request);
    }
}

/// Builds the cookie-holding client used for the whole session
fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("mixed-audit/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

fn same_location(a: &Url, b: &Url) -> bool {
    a.as_str().trim_end_matches('/') == b.as_str().trim_end_matches('/')
}

/// Lists a page's sub-resources with their mixed-content verdict
///
/// Only an `http:` resource on an `https:` page is mixed. Relative and
/// protocol-relative references inherit the page scheme and never are.
/// Every occurrence is reported, in document order per resource kind.
pub fn scan_subresources(html: &str, page_url: &Url) -> Vec<(Url, MixedContentType)> {
    let document = Html::parse_document(html);
    let page_secure = page_url.scheme() == "https";
    let mut found = Vec::new();

    let kinds = BLOCKABLE
        .iter()
        .map(|kind| (kind, MixedContentType::Blockable))
        .chain(
            OPTIONALLY_BLOCKABLE
                .iter()
                .map(|kind| (kind, MixedContentType::OptionallyBlockable)),
        );

    for ((selector, attr), verdict) in kinds {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        for element in document.select(&selector) {
            let Some(raw) = element.value().attr(attr) else {
                continue;
            };
            let references = if *attr == "srcset" {
                srcset_urls(raw)
            } else {
                vec![raw.trim()]
            };
            for reference in references {
                let Ok(resource) = page_url.join(reference) else {
                    tracing::trace!("Skipping unparseable sub-resource '{}'", reference);
                    continue;
                };
                let mixed = if page_secure && resource.scheme() == "http" {
                    verdict
                } else {
                    MixedContentType::None
                };
                found.push((resource, mixed));
            }
        }
    }

    found
}

/// Candidate URLs of a `srcset` list (`a.png 1x, b.png 2x`)
fn srcset_urls(srcset: &str) -> Vec<&str> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .collect()
}

/// Finds the form carrying both credential inputs and collects what it submits
fn find_login_form(
    html: &str,
    page_url: &Url,
    username_field: &str,
    password_field: &str,
) -> Option<LoginForm> {
    let document = Html::parse_document(html);
    let form_selector = Selector::parse("form").ok()?;
    let user_selector = Selector::parse(&format!("input[name=\"{}\"]", username_field)).ok()?;
    let pass_selector = Selector::parse(&format!("input[name=\"{}\"]", password_field)).ok()?;
    let hidden_selector = Selector::parse("input[type=\"hidden\"][name]").ok()?;
    let submit_selector =
        Selector::parse("input[type=\"submit\"][name], button[type=\"submit\"][name]").ok()?;

    let form = document.select(&form_selector).find(|form| {
        form.select(&user_selector).next().is_some() && form.select(&pass_selector).next().is_some()
    })?;

    let action = match form.value().attr("action").map(str::trim) {
        Some(action) if !action.is_empty() => page_url.join(action).ok()?,
        _ => page_url.clone(),
    };

    let mut fields: Vec<(String, String)> = form
        .select(&hidden_selector)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or("");
            Some((name.to_string(), value.to_string()))
        })
        .collect();

    if let Some(submit) = form.select(&submit_selector).next() {
        if let Some(name) = submit.value().attr("name") {
            let value = submit.value().attr("value").unwrap_or("");
            fields.push((name.to_string(), value.to_string()));
        }
    }

    Some(LoginForm { action, fields })
}
