pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    check_output_writable, is_valid_seed_url, normalize_seed_input, resolve_output_path,
};

// Re-export crawl functionality from sitescribe-core
pub use sitescribe_core::crawl::{
    CrawlOptions, CrawlOutcome, CrawlProgressCallback, execute_crawl, extract_url_path,
    generate_crawl_summary,
};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
