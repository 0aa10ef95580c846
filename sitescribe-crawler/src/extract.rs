use scraper::{Html, Node, Selector};
use std::sync::LazyLock;
use url::Url;

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Readable text and outbound links of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    pub text: String,
    /// Absolute link targets in the order they appear in the markup.
    pub links: Vec<String>,
}

/// Turns a fetched page body into text plus candidate links.
pub trait LinkExtractor: Send + Sync {
    fn extract(&self, body: &str, page_url: &Url) -> ExtractedPage;
}

/// Default extractor built on `scraper`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl LinkExtractor for HtmlExtractor {
    fn extract(&self, body: &str, page_url: &Url) -> ExtractedPage {
        let document = Html::parse_document(body);
        ExtractedPage {
            text: extract_text(&document),
            links: extract_links(&document, page_url),
        }
    }
}

fn extract_text(document: &Html) -> String {
    let mut lines = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed);
        }
    }

    lines.join("\n")
}

fn extract_links(document: &Html, page_url: &Url) -> Vec<String> {
    document
        .select(&LINK_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_href(page_url, href))
        .collect()
}

fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    // Skip empty, javascript:, mailto:, tel: and same-page anchors
    if href.is_empty()
        || href.starts_with('#')
        || starts_with_ignore_case(href, "javascript:")
        || starts_with_ignore_case(href, "mailto:")
        || starts_with_ignore_case(href, "tel:")
    {
        return None;
    }

    base.join(href).ok().map(|url| url.to_string())
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("http://example.com/docs/index.html").unwrap()
    }

    #[test]
    fn test_links_resolved_in_markup_order() {
        let html = r#"<html><body>
            <a href="b.html">B</a>
            <a href="/docs/a.html">A</a>
            <a href="http://other.com/c">C</a>
            <a href="../up">Up</a>
        </body></html>"#;

        let page = HtmlExtractor.extract(html, &page_url());
        assert_eq!(
            page.links,
            vec![
                "http://example.com/docs/b.html",
                "http://example.com/docs/a.html",
                "http://other.com/c",
                "http://example.com/up",
            ]
        );
    }

    #[test]
    fn test_pseudo_links_are_dropped() {
        let html = r##"<body>
            <a href="">empty</a>
            <a href="#top">anchor</a>
            <a href="javascript:void(0)">js</a>
            <a href="MAILTO:me@example.com">mail</a>
            <a href="tel:+123">call</a>
            <a>no href</a>
            <a href="  next.html  ">next</a>
        </body>"##;

        let page = HtmlExtractor.extract(html, &page_url());
        assert_eq!(page.links, vec!["http://example.com/docs/next.html"]);
    }

    #[test]
    fn test_fragments_survive_extraction() {
        let html = r#"<a href="x#section2">x</a>"#;
        let page = HtmlExtractor.extract(html, &page_url());
        assert_eq!(page.links, vec!["http://example.com/docs/x#section2"]);
    }

    #[test]
    fn test_text_one_line_per_block() {
        let html = r#"<html><head><title>Guide</title>
            <style>body { color: red }</style>
            <script>var x = 1;</script></head>
            <body>
              <h1>  Welcome  </h1>
              <p>First paragraph.</p>
              <noscript>Enable JS</noscript>
              <ul><li>One</li><li>Two</li></ul>
            </body></html>"#;

        let page = HtmlExtractor.extract(html, &page_url());
        assert_eq!(page.text, "Guide\nWelcome\nFirst paragraph.\nOne\nTwo");
    }

    #[test]
    fn test_unicode_text_is_kept() {
        let html = "<p>Café – 東京</p>";
        let page = HtmlExtractor.extract(html, &page_url());
        assert_eq!(page.text, "Café – 東京");
    }

    #[test]
    fn test_empty_body() {
        let page = HtmlExtractor.extract("", &page_url());
        assert_eq!(page, ExtractedPage::default());
    }
}
