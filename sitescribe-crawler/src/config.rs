use crate::error::{CrawlError, Result};
use std::time::Duration;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; sitescribe/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// How a candidate path is compared against the base path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathMatch {
    /// The path must equal the base path or continue it with a `/`.
    #[default]
    Segment,
    /// Plain string prefix, so `/docs` also admits `/docs-archive`.
    Prefix,
}

/// Crawl settings derived from the seed URL. Fixed for the whole run.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    seed: Url,
    origin_host: String,
    base_path: String,
    request_timeout: Duration,
    min_request_interval: Duration,
    user_agent: String,
    path_match: PathMatch,
}

impl SeedConfig {
    pub fn from_seed(seed: &str) -> Result<Self> {
        let parsed = Url::parse(seed.trim())
            .map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", seed, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CrawlError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                seed
            )));
        }

        let origin_host = authority(&parsed)
            .ok_or_else(|| CrawlError::InvalidUrl(format!("{}: missing host", seed)))?;

        let mut seed_url = parsed;
        seed_url.set_fragment(None);

        Ok(Self {
            base_path: seed_url.path().trim_end_matches('/').to_string(),
            seed: seed_url,
            origin_host,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            min_request_interval: DEFAULT_MIN_INTERVAL,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            path_match: PathMatch::default(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_path_match(mut self, path_match: PathMatch) -> Self {
        self.path_match = path_match;
        self
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    pub fn origin_host(&self) -> &str {
        &self.origin_host
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn min_request_interval(&self) -> Duration {
        self.min_request_interval
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn path_match(&self) -> PathMatch {
        self.path_match
    }
}

/// `host[:port]` as it appears in the URL, with default ports elided.
pub(crate) fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
