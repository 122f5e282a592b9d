//! Session module: one authenticated connection to the audited site
//!
//! The crawl driver only needs three things from a session: load a page,
//! know how long a load may take, and shut down. [`SiteSession`] is that
//! seam. Network activity seen during a load is pushed onto the event queue
//! from [`events`] rather than returned, the same way a browser reports it.

pub mod events;
mod http;

pub use events::{
    event_queue, BlockedReason, EventReceiver, EventSender, MixedContentType, NetworkEvent,
    RequestId,
};
pub use http::{scan_subresources, site_url, HttpSession};

use crate::NavigationError;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Login credentials for the site
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// True when either half is missing
    pub fn is_empty(&self) -> bool {
        self.username.trim().is_empty() || self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Result of loading one page
#[derive(Debug, Clone)]
pub struct PageLoad {
    /// HTTP status of the main document
    pub status: u16,
    /// Final URL after redirects
    pub url: Url,
    /// Document markup as served
    pub body: String,
}

impl PageLoad {
    /// 2xx responses only
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// An authenticated page context on the audited site
#[async_trait]
pub trait SiteSession: Send {
    /// Loads `url`, reporting its network activity on the event queue
    async fn navigate(&mut self, url: &Url) -> Result<PageLoad, NavigationError>;

    /// Upper bound for a single navigation
    fn navigation_timeout(&self) -> Duration;

    /// Releases the session; calling it again does nothing
    async fn terminate(&mut self);
}
