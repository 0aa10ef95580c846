pub mod crawl;
pub mod render;

use colored::Colorize;

pub use sitescribe_crawler::{CrawlReport, CrawlStats, PageRecord, PathMatch};

const BANNER: &str = r#"
     _ _                      _ _
 ___(_) |_ ___  ___  ___ _ __(_) |__   ___
/ __| | __/ _ \/ __|/ __| '__| | '_ \ / _ \
\__ \ | ||  __/\__ \ (__| |  | | |_) |  __/
|___/_|\__\___||___/\___|_|  |_|_.__/ \___|
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "one site in, one document out".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
