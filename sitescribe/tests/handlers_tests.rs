use sitescribe::commands::command_argument_builder;
use sitescribe::handlers::*;
use sitescribe_core::render::RenderFormat;
use std::io::Cursor;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_seed_url_accepts_domains_and_localhost() {
    assert!(is_valid_seed_url("http://example.com"));
    assert!(is_valid_seed_url("https://docs.example-site.org/guide/intro"));
    assert!(is_valid_seed_url("http://sub.domain123.co.uk:8080/path?q=1"));
    assert!(is_valid_seed_url("http://localhost"));
    assert!(is_valid_seed_url("http://localhost:3000/docs"));
}

#[test]
fn test_seed_url_rejects_other_shapes() {
    assert!(!is_valid_seed_url("ftp://example.com"));
    assert!(!is_valid_seed_url("example.com"));
    assert!(!is_valid_seed_url("http://example"));
    assert!(!is_valid_seed_url("http://127.0.0.1/"));
    assert!(!is_valid_seed_url("http://example.c"));
    assert!(!is_valid_seed_url("http://exa mple.com"));
    assert!(!is_valid_seed_url(""));
}

#[test]
fn test_normalize_seed_input() {
    assert_eq!(normalize_seed_input("  https://example.com  "), "https://example.com");
    assert_eq!(normalize_seed_input("@https://example.com"), "https://example.com");
    assert_eq!(normalize_seed_input("@@ http://example.com/a"), "http://example.com/a");
}

#[test]
fn test_resolve_output_path_appends_extension() {
    assert_eq!(
        resolve_output_path("site", RenderFormat::Text).to_string_lossy(),
        "site.txt"
    );
    assert_eq!(
        resolve_output_path("site.TXT", RenderFormat::Text).to_string_lossy(),
        "site.TXT"
    );
    assert_eq!(
        resolve_output_path("site.txt", RenderFormat::Json).to_string_lossy(),
        "site.txt.json"
    );
    assert_eq!(
        resolve_output_path(" notes.md ", RenderFormat::Markdown).to_string_lossy(),
        "notes.md"
    );
}

#[test]
fn test_resolve_output_path_expands_tilde() {
    let path = resolve_output_path("~/site", RenderFormat::Text);
    assert!(!path.to_string_lossy().starts_with('~'));
    assert!(path.to_string_lossy().ends_with("site.txt"));
}

#[test]
fn test_check_output_writable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.txt");

    assert!(check_output_writable(&path).is_ok());
    // The test file must not be left behind
    assert!(!path.exists());

    let missing = dir.path().join("missing").join("out.txt");
    let err = check_output_writable(&missing).unwrap_err();
    assert!(err.contains("Cannot create"));
}

#[test]
fn test_check_output_writable_keeps_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("existing.txt");
    std::fs::write(&path, "previous document").unwrap();

    assert!(check_output_writable(&path).is_ok());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous document");
}

#[test]
fn test_interval_from_secs() {
    assert_eq!(interval_from_secs(0.5).unwrap(), Duration::from_millis(500));
    assert_eq!(interval_from_secs(0.0).unwrap(), Duration::ZERO);
    assert!(interval_from_secs(-1.0).is_err());
    assert!(interval_from_secs(f64::NAN).is_err());
}

#[test]
fn test_prompt_seed_url_retries_until_valid() {
    let mut input = Cursor::new("not a url\nftp://example.com\n@https://example.com/docs\n");
    let url = prompt_seed_url(&mut input).unwrap();
    assert_eq!(url, "https://example.com/docs");
}

#[test]
fn test_prompt_seed_url_eof_is_error() {
    let mut input = Cursor::new("garbage\n");
    assert!(prompt_seed_url(&mut input).is_err());
}

#[test]
fn test_prompt_output_path_retries_until_writable() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("missing").join("doc");
    let good = dir.path().join("doc");
    let script = format!("\n{}\n{}\n", bad.display(), good.display());

    let mut input = Cursor::new(script);
    let path = prompt_output_path(RenderFormat::Text, &mut input).unwrap();
    assert_eq!(path, dir.path().join("doc.txt"));
}

#[test]
fn test_crawl_command_defaults() {
    let matches = command_argument_builder()
        .try_get_matches_from(["sitescribe", "crawl", "-u", "http://example.com"])
        .unwrap();
    let (name, crawl) = matches.subcommand().unwrap();

    assert_eq!(name, "crawl");
    assert_eq!(crawl.get_one::<String>("format").unwrap(), "text");
    assert_eq!(*crawl.get_one::<usize>("workers").unwrap(), 1);
    assert_eq!(*crawl.get_one::<u64>("timeout").unwrap(), 10);
    assert_eq!(*crawl.get_one::<f64>("interval").unwrap(), 0.5);
    assert!(!crawl.get_flag("literal-prefix"));
    assert!(!crawl.get_flag("discard-on-interrupt"));
    assert_eq!(matches.get_count("verbose"), 0);
}

#[test]
fn test_crawl_command_rejects_unknown_format() {
    let result = command_argument_builder().try_get_matches_from([
        "sitescribe",
        "crawl",
        "-u",
        "http://example.com",
        "-f",
        "pdf",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_verbose_is_global() {
    let matches = command_argument_builder()
        .try_get_matches_from(["sitescribe", "crawl", "-vv", "--literal-prefix"])
        .unwrap();
    assert_eq!(matches.get_count("verbose"), 2);

    let (_, crawl) = matches.subcommand().unwrap();
    assert!(crawl.get_flag("literal-prefix"));
}
