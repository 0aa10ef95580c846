// Document rendering from crawl records

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sitescribe_crawler::PageRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Width of the rule that closes each page in the text layouts.
const SEPARATOR_WIDTH: usize = 80;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormat {
    Text,
    Latin1,
    Markdown,
    Json,
}

impl RenderFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(RenderFormat::Text),
            "latin1" | "latin-1" | "iso-8859-1" => Some(RenderFormat::Latin1),
            "markdown" | "md" => Some(RenderFormat::Markdown),
            "json" => Some(RenderFormat::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            RenderFormat::Text | RenderFormat::Latin1 => "txt",
            RenderFormat::Markdown => "md",
            RenderFormat::Json => "json",
        }
    }

    pub fn renderer(&self) -> Box<dyn Renderer> {
        match self {
            RenderFormat::Text => Box::new(TextRenderer),
            RenderFormat::Latin1 => Box::new(Latin1Renderer),
            RenderFormat::Markdown => Box::new(MarkdownRenderer),
            RenderFormat::Json => Box::new(JsonRenderer),
        }
    }
}

/// Persists an ordered sequence of page records.
pub trait Renderer {
    fn render(&self, records: &[PageRecord], out: &mut dyn Write) -> Result<(), RenderError>;
}

/// `URL: <url>`, the page text, then a rule of `=`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, records: &[PageRecord], out: &mut dyn Write) -> Result<(), RenderError> {
        out.write_all(text_document(records).as_bytes())?;
        Ok(())
    }
}

/// The text layout squeezed into ISO-8859-1; anything wider becomes `?`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latin1Renderer;

impl Renderer for Latin1Renderer {
    fn render(&self, records: &[PageRecord], out: &mut dyn Write) -> Result<(), RenderError> {
        out.write_all(&to_latin1(&text_document(records)))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, records: &[PageRecord], out: &mut dyn Write) -> Result<(), RenderError> {
        writeln!(out, "# Site capture\n")?;
        writeln!(
            out,
            "_{} pages, generated {}_\n",
            records.len(),
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;

        for record in records {
            writeln!(out, "## <{}>\n", record.url)?;
            for line in record.text.lines() {
                writeln!(out, "{}  ", line)?;
            }
            writeln!(out, "\n---\n")?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
    generated_at: String,
    page_count: usize,
    pages: &'a [PageRecord],
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, records: &[PageRecord], out: &mut dyn Write) -> Result<(), RenderError> {
        let document = JsonDocument {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            page_count: records.len(),
            pages: records,
        };
        serde_json::to_writer_pretty(&mut *out, &document)?;
        writeln!(out)?;
        Ok(())
    }
}

pub fn text_document(records: &[PageRecord]) -> String {
    let rule = "=".repeat(SEPARATOR_WIDTH);
    let mut document = String::new();
    for record in records {
        document.push_str(&format!("URL: {}\n{}\n{}\n", record.url, record.text, rule));
    }
    document
}

/// Encodes `text` as ISO-8859-1, replacing unrepresentable characters with `?`.
pub fn to_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Renders `records` into the file at `path`, replacing its contents.
pub fn render_to_file(
    path: &Path,
    format: RenderFormat,
    records: &[PageRecord],
) -> Result<(), RenderError> {
    let io_error = |source| RenderError::Io {
        path: path.display().to_string(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    format.renderer().render(records, &mut writer)?;
    writer.flush().map_err(io_error)?;
    Ok(())
}
