use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Text extracted from one fetched, in-scope HTML page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub text: String,
}

impl PageRecord {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
        }
    }
}

/// What happened when a single URL was fetched.
#[derive(Debug)]
pub enum FetchOutcome {
    Success {
        body: String,
        content_type: String,
        /// Where the request ended up after redirects.
        final_url: Url,
    },
    /// The server answered, but not with an in-scope web page.
    Skipped { reason: SkipReason },
    Failed { error: FetchError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Content type missing or not HTML.
    NotHtml { content_type: String },
    /// Redirects led outside the crawl scope.
    LeftScope { final_url: Url },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotHtml { content_type } if content_type.is_empty() => {
                write!(f, "no content type")
            }
            SkipReason::NotHtml { content_type } => write!(f, "content type {}", content_type),
            SkipReason::LeftScope { final_url } => {
                write!(f, "redirected out of scope to {}", final_url)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    pub pages_recorded: usize,
    pub skipped_non_html: usize,
    pub fetch_failures: usize,
    pub redirected_out_of_scope: usize,
    pub out_of_scope: usize,
}

impl CrawlStats {
    pub fn fetch_attempts(&self) -> usize {
        self.pages_recorded
            + self.skipped_non_html
            + self.redirected_out_of_scope
            + self.fetch_failures
    }

    pub(crate) fn record_outcome(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Success { .. } => self.pages_recorded += 1,
            FetchOutcome::Skipped {
                reason: SkipReason::NotHtml { .. },
            } => self.skipped_non_html += 1,
            FetchOutcome::Skipped {
                reason: SkipReason::LeftScope { .. },
            } => self.redirected_out_of_scope += 1,
            FetchOutcome::Failed { .. } => self.fetch_failures += 1,
        }
    }
}

/// Everything a finished (or interrupted) crawl produced.
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Records in discovery order.
    pub records: Vec<PageRecord>,
    pub stats: CrawlStats,
    /// True when a stop signal ended the crawl before the queue drained.
    pub interrupted: bool,
}

impl CrawlReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
