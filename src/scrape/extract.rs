use crate::scrape::Document;
use crate::SkimmerError;
use chrono::Utc;
use scraper::{Html, Selector};
use url::Url;

/// Tag set used when a seed entry configures none
const DEFAULT_TAGS: &[&str] = &["p", "div"];

/// Extracts a [`Document`] from a fetched page body
///
/// Missing elements never fail extraction; an absent `<title>` or
/// `<meta name="description">` simply yields an empty string. The only error
/// is a tag list entry that does not parse as a CSS selector.
///
/// # Arguments
///
/// * `body` - The raw HTML body
/// * `source` - The canonical URL the body was fetched from
/// * `tags` - Tag selectors to pull content from; empty means the default
///   `p` + `div` set
pub fn extract(body: &str, source: &Url, tags: &[String]) -> Result<Document, SkimmerError> {
    let dom = Html::parse_document(body);

    let content = if tags.is_empty() {
        default_content(&dom)
    } else {
        tagged_content(&dom, tags, source)?
    };

    Ok(Document {
        id: String::new(),
        title: extract_title(&dom),
        description: extract_description(&dom),
        content,
        link: source.to_string(),
        tag: page_tag(source.host_str().unwrap_or_default()),
        fetched_at: Utc::now(),
    })
}

/// Text of the first `<title>` inside `<head>`, whitespace-collapsed
fn extract_title(dom: &Html) -> String {
    if let Ok(selector) = Selector::parse("head title") {
        if let Some(element) = dom.select(&selector).next() {
            return collapse_whitespace(&element.text().collect::<String>());
        }
    }
    String::new()
}

/// Content attribute of the first `<meta name="description">`
///
/// The name match is case-insensitive.
fn extract_description(dom: &Html) -> String {
    if let Ok(selector) = Selector::parse("meta") {
        for element in dom.select(&selector) {
            let name = element.value().attr("name").unwrap_or("");
            if name.eq_ignore_ascii_case("description") {
                return collapse_whitespace(element.value().attr("content").unwrap_or(""));
            }
        }
    }
    String::new()
}

/// Concatenated text of all elements matching each configured tag selector,
/// in list order, within `<body>`
fn tagged_content(dom: &Html, tags: &[String], source: &Url) -> Result<String, SkimmerError> {
    let mut parts = Vec::new();
    for tag in tags {
        let selector =
            Selector::parse(&format!("body {}", tag)).map_err(|e| SkimmerError::Scrape {
                url: source.to_string(),
                message: format!("invalid tag selector '{}': {:?}", tag, e),
            })?;
        collect_text(dom, &selector, &mut parts);
    }
    Ok(parts.join(" "))
}

/// Default content: all `<p>` text, then all `<div>` text, within `<body>`
fn default_content(dom: &Html) -> String {
    let mut parts = Vec::new();
    for tag in DEFAULT_TAGS {
        if let Ok(selector) = Selector::parse(&format!("body {}", tag)) {
            collect_text(dom, &selector, &mut parts);
        }
    }
    parts.join(" ")
}

fn collect_text(dom: &Html, selector: &Selector, parts: &mut Vec<String>) {
    for element in dom.select(selector) {
        let text = collapse_whitespace(&element.text().collect::<String>());
        if !text.is_empty() {
            parts.push(text);
        }
    }
}

/// Derives the coarse classification label for a page from its hostname
///
/// The label is the first dot-separated host label, or the second when the
/// host starts with `www`.
///
/// # Examples
///
/// ```
/// use skimmer::scrape::page_tag;
///
/// assert_eq!(page_tag("blog.example.com"), "blog");
/// assert_eq!(page_tag("www.example.com"), "example");
/// ```
pub fn page_tag(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    match labels.as_slice() {
        ["www", second, ..] => (*second).to_string(),
        [first, ..] => (*first).to_string(),
        [] => String::new(),
    }
}

/// Reduces newlines and runs of spaces to single spaces, then trims
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
