pub mod config;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod pacing;
pub mod result;
pub mod scope;

pub use config::{PathMatch, SeedConfig};
pub use crawler::{Crawler, ProgressCallback, StopSignal};
pub use error::{CrawlError, FetchError};
pub use extract::{ExtractedPage, HtmlExtractor, LinkExtractor};
pub use fetcher::PageFetcher;
pub use pacing::Pacer;
pub use result::{CrawlReport, CrawlStats, FetchOutcome, PageRecord, SkipReason};
pub use scope::ScopeFilter;
