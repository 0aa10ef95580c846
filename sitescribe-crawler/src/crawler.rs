use crate::config::SeedConfig;
use crate::error::Result;
use crate::extract::{HtmlExtractor, LinkExtractor};
use crate::fetcher::PageFetcher;
use crate::pacing::Pacer;
use crate::result::{CrawlReport, CrawlStats, FetchOutcome, PageRecord, SkipReason};
use crate::scope::ScopeFilter;
use futures::future;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify, watch};
use tracing::{debug, info, trace, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Receiver side of a stop signal; the crawl winds down once it reads `true`.
pub type StopSignal = watch::Receiver<bool>;

pub struct Crawler {
    config: SeedConfig,
    scope: ScopeFilter,
    fetcher: PageFetcher,
    extractor: Arc<dyn LinkExtractor>,
    progress_callback: Option<ProgressCallback>,
    workers: usize,
    stop_signal: Option<StopSignal>,
}

/// The parts every worker needs, shared read-only across tasks.
struct Engine {
    scope: ScopeFilter,
    fetcher: PageFetcher,
    extractor: Arc<dyn LinkExtractor>,
    pacer: Pacer,
    progress_callback: Option<ProgressCallback>,
}

struct QueuedUrl {
    url: Url,
    /// Position at which the URL was first queued.
    index: usize,
}

/// Work queue plus visited set for one run.
#[derive(Default)]
struct Frontier {
    queue: VecDeque<QueuedUrl>,
    pending: HashSet<String>,
    visited: HashSet<String>,
    next_index: usize,
    in_flight: usize,
    abandoned: bool,
    records: Vec<(usize, PageRecord)>,
    stats: CrawlStats,
}

enum Claim {
    Work(QueuedUrl),
    Wait,
    Done,
}

impl Crawler {
    pub fn new(config: SeedConfig) -> Result<Self> {
        let fetcher = PageFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, fetcher))
    }

    pub fn with_fetcher(config: SeedConfig, fetcher: PageFetcher) -> Self {
        Self {
            scope: ScopeFilter::new(&config),
            fetcher,
            extractor: Arc::new(HtmlExtractor),
            progress_callback: None,
            workers: 1,
            stop_signal: None,
            config,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn LinkExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_stop_signal(mut self, stop_signal: StopSignal) -> Self {
        self.stop_signal = Some(stop_signal);
        self
    }

    /// Fresh per-run engine; the pacer starts with no reserved slots.
    fn engine(&self) -> Arc<Engine> {
        Arc::new(Engine {
            scope: self.scope.clone(),
            fetcher: self.fetcher.clone(),
            extractor: self.extractor.clone(),
            pacer: Pacer::new(self.config.min_request_interval()),
            progress_callback: self.progress_callback.clone(),
        })
    }

    /// Crawls the site from the seed URL until the queue drains or the stop
    /// signal is raised.
    pub async fn crawl(&self) -> Result<CrawlReport> {
        info!(
            "Starting crawl of {} with {} workers",
            self.config.seed(),
            self.workers
        );

        let engine = self.engine();
        let report = if self.workers == 1 {
            self.crawl_sequential(&engine).await
        } else {
            self.crawl_concurrent(engine).await?
        };

        info!(
            "Crawl complete. Recorded {} pages ({} skipped, {} failed)",
            report.records.len(),
            report.stats.skipped_non_html,
            report.stats.fetch_failures
        );
        Ok(report)
    }

    async fn crawl_sequential(&self, engine: &Engine) -> CrawlReport {
        let mut frontier = Frontier::seeded(self.config.seed().clone());
        let mut stop = self.stop_signal.clone();
        let interval = self.config.min_request_interval();

        loop {
            if is_stopped(&stop) {
                frontier.abandoned = true;
                break;
            }

            let Some(item) = frontier.claim() else {
                break;
            };

            let outcome = engine.fetch(0, &item.url).await;
            engine.absorb(item, outcome, &mut frontier);

            if frontier.queue.is_empty() {
                break;
            }

            let paced = tokio::select! {
                _ = tokio::time::sleep(interval) => true,
                _ = wait_for_stop(&mut stop) => false,
            };
            if !paced {
                frontier.abandoned = true;
                break;
            }
        }

        frontier.into_report()
    }

    async fn crawl_concurrent(&self, engine: Arc<Engine>) -> Result<CrawlReport> {
        let shared = Arc::new(Shared {
            frontier: Mutex::new(Frontier::seeded(self.config.seed().clone())),
            notify: Notify::new(),
        });

        let mut worker_handles = Vec::new();
        for worker_id in 0..self.workers {
            let engine = engine.clone();
            let shared = shared.clone();
            let stop = self.stop_signal.clone();
            worker_handles.push(tokio::spawn(run_worker(worker_id, engine, shared, stop)));
        }

        for handle in worker_handles {
            handle.await?;
        }

        let frontier = std::mem::take(&mut *shared.frontier.lock().await);
        Ok(frontier.into_report())
    }
}

struct Shared {
    frontier: Mutex<Frontier>,
    /// Wakes idle workers when the frontier changes.
    notify: Notify,
}

async fn run_worker(
    worker_id: usize,
    engine: Arc<Engine>,
    shared: Arc<Shared>,
    mut stop: Option<StopSignal>,
) {
    debug!("Worker {} started", worker_id);

    loop {
        if is_stopped(&stop) {
            let mut frontier = shared.frontier.lock().await;
            if !frontier.queue.is_empty() {
                frontier.abandoned = true;
            }
            break;
        }

        // Registered before the lock so a notify_waiters between unlock and
        // await is not lost.
        let notified = shared.notify.notified();

        let claim = {
            let mut frontier = shared.frontier.lock().await;
            match frontier.claim() {
                Some(item) => {
                    frontier.in_flight += 1;
                    Claim::Work(item)
                }
                None if frontier.in_flight == 0 => Claim::Done,
                None => Claim::Wait,
            }
        };

        match claim {
            Claim::Work(item) => {
                let paced = tokio::select! {
                    _ = engine.pacer.acquire() => true,
                    _ = wait_for_stop(&mut stop) => false,
                };

                let outcome = if paced {
                    Some(engine.fetch(worker_id, &item.url).await)
                } else {
                    None
                };

                {
                    let mut frontier = shared.frontier.lock().await;
                    frontier.in_flight -= 1;
                    match outcome {
                        Some(outcome) => engine.absorb(item, outcome, &mut frontier),
                        None => frontier.abandoned = true,
                    }
                }
                shared.notify.notify_waiters();
            }
            Claim::Wait => {
                tokio::select! {
                    _ = notified => {}
                    _ = wait_for_stop(&mut stop) => {}
                }
            }
            Claim::Done => {
                shared.notify.notify_waiters();
                break;
            }
        }
    }

    debug!("Worker {} finished", worker_id);
}

impl Engine {
    async fn fetch(&self, worker_id: usize, url: &Url) -> FetchOutcome {
        if let Some(ref callback) = self.progress_callback {
            callback(worker_id, url.to_string());
        }
        match self.fetcher.fetch(url).await {
            FetchOutcome::Success { final_url, .. }
                if !self.scope.is_in_scope(final_url.as_str()) =>
            {
                FetchOutcome::Skipped {
                    reason: SkipReason::LeftScope { final_url },
                }
            }
            outcome => outcome,
        }
    }

    /// Turns a fetch outcome into a record and new queue entries.
    fn absorb(&self, item: QueuedUrl, outcome: FetchOutcome, frontier: &mut Frontier) {
        frontier.stats.record_outcome(&outcome);

        let (body, final_url) = match outcome {
            FetchOutcome::Success {
                body, final_url, ..
            } => (body, final_url),
            FetchOutcome::Skipped { reason } => {
                info!("Skipping {}: {}", item.url, reason);
                return;
            }
            FetchOutcome::Failed { error } => {
                warn!("Crawl error for {}: {}", item.url, error);
                return;
            }
        };

        let page = self.extractor.extract(&body, &final_url);
        debug!("{} yielded {} links", item.url, page.links.len());

        frontier
            .records
            .push((item.index, PageRecord::new(item.url.as_str(), page.text)));

        for link in page.links {
            let candidate = strip_fragment(&link).trim();
            match self.scope.admit(candidate) {
                Some(url) => {
                    if frontier.enqueue(url) {
                        trace!("  -> queued {}", candidate);
                    }
                }
                None => {
                    frontier.stats.out_of_scope += 1;
                    trace!("  -> out of scope {}", candidate);
                }
            }
        }
    }
}

impl Frontier {
    fn seeded(seed: Url) -> Self {
        let mut frontier = Self::default();
        frontier.enqueue(seed);
        frontier
    }

    /// Queues `url` unless it was already visited or queued.
    fn enqueue(&mut self, url: Url) -> bool {
        let key = url.as_str();
        if self.visited.contains(key) || self.pending.contains(key) {
            return false;
        }

        self.pending.insert(key.to_string());
        self.queue.push_back(QueuedUrl {
            url,
            index: self.next_index,
        });
        self.next_index += 1;
        true
    }

    /// Pops the next unvisited URL and marks it visited in the same step.
    fn claim(&mut self) -> Option<QueuedUrl> {
        while let Some(item) = self.queue.pop_front() {
            let key = item.url.as_str();
            self.pending.remove(key);
            if self.visited.insert(key.to_string()) {
                return Some(item);
            }
            debug!("Discarding already visited {}", key);
        }
        None
    }

    fn into_report(mut self) -> CrawlReport {
        self.records.sort_by_key(|(index, _)| *index);
        CrawlReport {
            records: self.records.into_iter().map(|(_, record)| record).collect(),
            stats: self.stats,
            interrupted: self.abandoned,
        }
    }
}

fn strip_fragment(link: &str) -> &str {
    link.split_once('#').map_or(link, |(head, _)| head)
}

fn is_stopped(stop: &Option<StopSignal>) -> bool {
    stop.as_ref().is_some_and(|rx| *rx.borrow())
}

/// Resolves once the stop signal reads `true`; never resolves without one.
async fn wait_for_stop(stop: &mut Option<StopSignal>) {
    if let Some(rx) = stop
        && rx.wait_for(|stopped| *stopped).await.is_ok()
    {
        return;
    }
    future::pending::<()>().await;
}
