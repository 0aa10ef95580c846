use indicatif::{ProgressBar, ProgressStyle};
use sitescribe_crawler::config::{DEFAULT_MIN_INTERVAL, DEFAULT_TIMEOUT_SECS};
use sitescribe_crawler::{
    CrawlError, CrawlReport, CrawlStats, Crawler, PathMatch, ProgressCallback, SeedConfig,
    StopSignal,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use url::Url;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub seed: String,
    pub workers: usize,
    pub timeout: Duration,
    pub min_interval: Duration,
    pub user_agent: Option<String>,
    pub path_match: PathMatch,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            workers: 1,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            min_interval: DEFAULT_MIN_INTERVAL,
            user_agent: None,
            path_match: PathMatch::default(),
            show_progress_bars: false,
        }
    }

    pub fn seed_config(&self) -> Result<SeedConfig, CrawlError> {
        let config = SeedConfig::from_seed(&self.seed)?
            .with_timeout(self.timeout)
            .with_min_interval(self.min_interval)
            .with_path_match(self.path_match);

        Ok(match self.user_agent {
            Some(ref user_agent) => config.with_user_agent(user_agent.clone()),
            None => config,
        })
    }
}

/// How a crawl ended, as far as the caller is concerned.
#[derive(Debug)]
pub enum CrawlOutcome {
    /// At least one page was recorded.
    Pages(CrawlReport),
    /// The crawl finished without recording a single page.
    NoContent { stats: CrawlStats, interrupted: bool },
}

impl CrawlOutcome {
    pub fn from_report(report: CrawlReport) -> Self {
        if report.is_empty() {
            CrawlOutcome::NoContent {
                stats: report.stats,
                interrupted: report.interrupted,
            }
        } else {
            CrawlOutcome::Pages(report)
        }
    }

    pub fn stats(&self) -> &CrawlStats {
        match self {
            CrawlOutcome::Pages(report) => &report.stats,
            CrawlOutcome::NoContent { stats, .. } => stats,
        }
    }

    pub fn was_interrupted(&self) -> bool {
        match self {
            CrawlOutcome::Pages(report) => report.interrupted,
            CrawlOutcome::NoContent { interrupted, .. } => *interrupted,
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Process exit status after a forced interrupt.
pub const INTERRUPT_EXIT_CODE: i32 = 130;

/// Returns a stop signal that is raised when the user presses Ctrl-C.
///
/// Once the handler is installed Ctrl-C no longer terminates the process by
/// itself, so a second press (or any press after the crawl has dropped its
/// receiver) exits with [`INTERRUPT_EXIT_CODE`].
pub fn interrupt_on_ctrl_c() -> StopSignal {
    let (interrupt_tx, interrupt_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if interrupt_tx.send(()).is_err() {
                break;
            }
        }
    });
    stop_on_interrupts(interrupt_rx, || {
        std::process::exit(INTERRUPT_EXIT_CODE);
    })
}

/// First interrupt raises the stop signal; the next one calls `force_exit`.
fn stop_on_interrupts(
    mut interrupts: mpsc::UnboundedReceiver<()>,
    force_exit: impl FnOnce() + Send + 'static,
) -> StopSignal {
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if interrupts.recv().await.is_none() {
            return;
        }
        if stop_tx.send(true).is_ok() {
            warn!("Interrupt received, stopping crawl (Ctrl-C again to exit now)");
            if interrupts.recv().await.is_none() {
                return;
            }
        }
        warn!("Interrupted, exiting");
        force_exit();
    });
    stop_rx
}

/// Execute a crawl with the given options
pub async fn execute_crawl(
    options: CrawlOptions,
    stop_signal: Option<StopSignal>,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlOutcome, CrawlError> {
    let config = options.seed_config()?;

    let progress_bar = if options.show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let fetched_count = Arc::new(AtomicUsize::new(0));
    let count_clone = fetched_count.clone();
    let pb_clone = progress_bar.clone();
    let user_callback = progress_callback.clone();
    let internal_progress_callback: ProgressCallback =
        Arc::new(move |_worker_id: usize, url: String| {
            let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref pb) = pb_clone {
                pb.set_message(format!(
                    "Crawling... {} URLs fetched ({})",
                    count,
                    extract_url_path(&url)
                ));
            }
            if let Some(ref callback) = user_callback {
                callback(format!("Extracting: {}", url));
            }
        });

    let mut crawler = Crawler::new(config)?
        .with_workers(options.workers)
        .with_progress_callback(internal_progress_callback);
    if let Some(stop_signal) = stop_signal {
        crawler = crawler.with_stop_signal(stop_signal);
    }

    let result = crawler.crawl().await;

    if let Some(ref pb) = progress_bar {
        let total = fetched_count.load(Ordering::Relaxed);
        pb.finish_and_clear();
        info!("Crawl finished after {} fetches", total);
    }

    Ok(CrawlOutcome::from_report(result?))
}

/// Generate a plain summary of a finished crawl
pub fn generate_crawl_summary(outcome: &CrawlOutcome) -> String {
    let stats = outcome.stats();

    let mut summary = String::new();
    summary.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    summary.push_str("# Summary:\n");
    summary.push_str(&format!("  Pages recorded: {}\n", stats.pages_recorded));
    summary.push_str(&format!("  Non-HTML skipped: {}\n", stats.skipped_non_html));
    summary.push_str(&format!(
        "  Redirected out of scope: {}\n",
        stats.redirected_out_of_scope
    ));
    summary.push_str(&format!("  Fetch failures: {}\n", stats.fetch_failures));
    summary.push_str(&format!("  Out-of-scope links: {}\n", stats.out_of_scope));
    if outcome.was_interrupted() {
        summary.push_str("  Interrupted before the queue drained\n");
    }
    summary.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    if let CrawlOutcome::Pages(report) = outcome {
        summary.push('\n');
        for (position, record) in report.records.iter().enumerate() {
            summary.push_str(&format!(
                "  {:>4}. {} ({} lines)\n",
                position + 1,
                extract_url_path(&record.url),
                record.text.lines().count()
            ));
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;
    use tokio::time::timeout;

    #[test]
    fn test_options_defaults() {
        let options = CrawlOptions::new("http://example.com/docs");
        assert_eq!(options.workers, 1);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.min_interval, Duration::from_millis(500));
        assert!(!options.show_progress_bars);
    }

    #[test]
    fn test_seed_config_carries_options() {
        let mut options = CrawlOptions::new("http://example.com/docs/");
        options.timeout = Duration::from_secs(3);
        options.min_interval = Duration::from_millis(250);
        options.user_agent = Some("agent/2".to_string());
        options.path_match = PathMatch::Prefix;

        let config = options.seed_config().unwrap();
        assert_eq!(config.base_path(), "/docs");
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.min_request_interval(), Duration::from_millis(250));
        assert_eq!(config.user_agent(), "agent/2");
        assert_eq!(config.path_match(), PathMatch::Prefix);
    }

    #[test]
    fn test_seed_config_rejects_bad_seed() {
        let options = CrawlOptions::new("ftp://example.com");
        assert!(matches!(
            options.seed_config(),
            Err(CrawlError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_first_interrupt_stops_second_exits() {
        let (interrupt_tx, interrupt_rx) = mpsc::unbounded_channel();
        let (exit_tx, mut exit_rx) = oneshot::channel();
        let mut stop = stop_on_interrupts(interrupt_rx, move || {
            let _ = exit_tx.send(());
        });

        interrupt_tx.send(()).unwrap();
        stop.wait_for(|stopped| *stopped).await.unwrap();
        assert!(exit_rx.try_recv().is_err());

        interrupt_tx.send(()).unwrap();
        timeout(Duration::from_secs(1), exit_rx)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_interrupt_after_crawl_exits_immediately() {
        let (interrupt_tx, interrupt_rx) = mpsc::unbounded_channel();
        let (exit_tx, exit_rx) = oneshot::channel();
        let stop = stop_on_interrupts(interrupt_rx, move || {
            let _ = exit_tx.send(());
        });
        drop(stop);

        interrupt_tx.send(()).unwrap();
        timeout(Duration::from_secs(1), exit_rx)
            .await
            .unwrap()
            .unwrap();
    }
}
