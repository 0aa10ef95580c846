use anyhow::{Context, bail};
use clap::ArgMatches;
use colored::Colorize;
use regex::Regex;
use sitescribe_core::crawl::{
    CrawlOptions, CrawlOutcome, INTERRUPT_EXIT_CODE, execute_crawl, generate_crawl_summary,
    interrupt_on_ctrl_c,
};
use sitescribe_core::render::{RenderFormat, render_to_file};
use sitescribe_crawler::PathMatch;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_NO_CONTENT: i32 = 2;
pub const EXIT_INTERRUPTED: i32 = INTERRUPT_EXIT_CODE;

static SEED_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(http|https)://((([A-Za-z0-9-]+\.)+[A-Za-z]{2,})|localhost)(:\d+)?(/.*)?$",
    )
    .expect("static seed pattern")
});

// Helper functions for crawl handler

/// Trim whitespace and any leading `@` pasted along with the URL
pub fn normalize_seed_input(raw: &str) -> String {
    raw.trim().trim_start_matches('@').trim().to_string()
}

/// Check a seed URL against `scheme://host[:port][/path]`
pub fn is_valid_seed_url(url: &str) -> bool {
    SEED_URL_PATTERN.is_match(url)
}

/// Expand `~` and append the format's extension when it is missing
pub fn resolve_output_path(raw: &str, format: RenderFormat) -> PathBuf {
    let expanded = shellexpand::tilde(raw.trim()).into_owned();
    let suffix = format!(".{}", format.extension());
    if expanded.to_lowercase().ends_with(&suffix) {
        PathBuf::from(expanded)
    } else {
        PathBuf::from(expanded + &suffix)
    }
}

/// Make sure the document can be written before spending time on the crawl.
/// An existing file is opened for append only, so its contents survive.
pub fn check_output_writable(path: &Path) -> Result<(), String> {
    let opened = if path.exists() {
        OpenOptions::new().append(true).open(path).map(drop)
    } else {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .and_then(|_| fs::remove_file(path))
    };
    opened.map_err(|e| format!("Cannot create {}: {}", path.display(), e))
}

/// Convert a `--interval` value in seconds into a duration
pub fn interval_from_secs(secs: f64) -> Result<Duration, String> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| format!("Invalid interval {}: must be a non-negative number", secs))
}

pub fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn print_prompt(msg: &str, input: &mut impl BufRead) -> io::Result<String> {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush()?;
    let mut response = String::new();
    if input.read_line(&mut response)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
    }
    Ok(response.trim().to_string())
}

/// Ask for a seed URL until a valid one is entered
pub fn prompt_seed_url(input: &mut impl BufRead) -> io::Result<String> {
    loop {
        let url = normalize_seed_input(&print_prompt(
            "Seed URL (must start with http:// or https://):",
            input,
        )?);
        if is_valid_seed_url(&url) {
            return Ok(url);
        }
        println!("{} Invalid URL, please try again.", "✗".red().bold());
    }
}

/// Ask for an output file until a writable one is entered
pub fn prompt_output_path(format: RenderFormat, input: &mut impl BufRead) -> io::Result<PathBuf> {
    loop {
        let raw = print_prompt("Output file name:", input)?;
        if raw.is_empty() {
            println!("{} Please enter a file name.", "✗".red().bold());
            continue;
        }
        let path = resolve_output_path(&raw, format);
        match check_output_writable(&path) {
            Ok(()) => return Ok(path),
            Err(e) => println!("{} {}", "✗".red().bold(), e),
        }
    }
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) -> i32 {
    match run_crawl(sub_matches, quiet).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            EXIT_FAILURE
        }
    }
}

async fn run_crawl(sub_matches: &ArgMatches, quiet: bool) -> anyhow::Result<i32> {
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| RenderFormat::from_str(f))
        .unwrap_or(RenderFormat::Text);
    let workers = *sub_matches.get_one::<usize>("workers").unwrap_or(&1);
    let timeout_secs = *sub_matches.get_one::<u64>("timeout").unwrap_or(&10);
    let interval_secs = *sub_matches.get_one::<f64>("interval").unwrap_or(&0.5);
    let discard_on_interrupt = sub_matches.get_flag("discard-on-interrupt");
    let path_match = if sub_matches.get_flag("literal-prefix") {
        PathMatch::Prefix
    } else {
        PathMatch::Segment
    };

    let min_interval = interval_from_secs(interval_secs).map_err(anyhow::Error::msg)?;

    let stdin = io::stdin();
    let seed = match sub_matches.get_one::<String>("url") {
        Some(raw) => {
            let url = normalize_seed_input(raw);
            if !is_valid_seed_url(&url) {
                bail!("Invalid URL '{}': expected http(s)://host[:port][/path]", raw);
            }
            url
        }
        None => prompt_seed_url(&mut stdin.lock()).context("Failed to read seed URL")?,
    };

    let output = match sub_matches.get_one::<String>("output") {
        Some(raw) => {
            let path = resolve_output_path(raw, format);
            check_output_writable(&path).map_err(anyhow::Error::msg)?;
            path
        }
        None => prompt_output_path(format, &mut stdin.lock())
            .context("Failed to read output file name")?,
    };

    let mut options = CrawlOptions::new(seed.clone());
    options.workers = workers;
    options.timeout = Duration::from_secs(timeout_secs);
    options.min_interval = min_interval;
    options.user_agent = sub_matches.get_one::<String>("user-agent").cloned();
    options.path_match = path_match;
    options.show_progress_bars = !quiet;
    debug!(
        "Crawl options: workers={} timeout={}s interval={:?} path_match={:?}",
        workers, timeout_secs, min_interval, path_match
    );

    if !quiet {
        println!("\n🕷️  Crawling {}", seed);
        println!("Workers: {}", workers);
        println!("Interval: {:?}", min_interval);
        println!("Output: {} ({:?})\n", output.display(), format);
    }

    let outcome = execute_crawl(options, Some(interrupt_on_ctrl_c()), None)
        .await
        .context("Crawl failed")?;

    if !quiet {
        print!("{}", generate_crawl_summary(&outcome));
    }

    if outcome.was_interrupted() && discard_on_interrupt {
        println!("\n{} Crawl interrupted by user; nothing written.", "✗".yellow().bold());
        return Ok(EXIT_INTERRUPTED);
    }

    let report = match outcome {
        CrawlOutcome::Pages(report) => report,
        CrawlOutcome::NoContent { .. } => {
            println!(
                "\n{} No content could be extracted from {}",
                "✗".yellow().bold(),
                seed
            );
            return Ok(EXIT_NO_CONTENT);
        }
    };

    render_to_file(&output, format, &report.records)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Rendered {} pages as {:?}", report.records.len(), format);

    if report.interrupted {
        println!(
            "\n{} Crawl interrupted; wrote the {} pages collected so far to {}",
            "!".yellow().bold(),
            report.records.len(),
            output.display()
        );
    } else {
        println!(
            "\n{} Wrote {} pages to {}",
            "✓".green().bold(),
            report.records.len(),
            output.display()
        );
    }

    Ok(EXIT_OK)
}
