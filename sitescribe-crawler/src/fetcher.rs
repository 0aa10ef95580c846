use crate::config::SeedConfig;
use crate::error::{CrawlError, FetchError, Result};
use crate::result::{FetchOutcome, SkipReason};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Issues the GET requests for a crawl. One client, one attempt per URL.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(config: &SeedConfig) -> Result<Self> {
        let timeout = config.request_timeout();
        let client = Client::builder()
            .user_agent(config.user_agent())
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .cookie_store(true)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(CrawlError::ClientBuild)?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &Url) -> FetchOutcome {
        debug!("Fetching {}", url);

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                return FetchOutcome::Failed {
                    error: FetchError::Transport(e),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            return FetchOutcome::Failed {
                error: FetchError::Status(status.as_u16()),
            };
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !is_html(&content_type) {
            return FetchOutcome::Skipped {
                reason: SkipReason::NotHtml { content_type },
            };
        }

        let final_url = response.url().clone();
        match response.text().await {
            Ok(body) => FetchOutcome::Success {
                body,
                content_type,
                final_url,
            },
            Err(e) => FetchOutcome::Failed {
                error: FetchError::Body(e),
            },
        }
    }
}

fn is_html(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("html")
}
