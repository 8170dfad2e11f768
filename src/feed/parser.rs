use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::xml::{Document, Element, XmlError};
use crate::util::{rfc822_to_iso8601, strip_html};

/// Atom 1.0 namespace. Atom elements outside it are ignored.
pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

#[derive(Debug, Error)]
pub enum ParseError {
    /// The body is not well-formed XML.
    #[error("Malformed feed: {0}")]
    Malformed(#[from] XmlError),
}

/// A normalized feed entry.
///
/// Field order is the key order of the JSON snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    /// Attached media (cover image), empty when the entry has none.
    pub enclosure: String,
    /// ISO-8601 UTC for RFC-822 RSS dates, otherwise the feed's own string.
    pub published_at: String,
    pub summary: String,
    pub category: String,
    pub tags: Vec<String>,
}

/// Feed family, decided from the root element's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Atom,
    Rss,
    /// Neither; both extractions are attempted.
    Unknown,
}

impl FeedKind {
    pub fn detect(root: &Element) -> Self {
        let name = root.name();
        if name.ends_with("feed") {
            FeedKind::Atom
        } else if name.ends_with("rss") {
            FeedKind::Rss
        } else {
            FeedKind::Unknown
        }
    }
}

/// Per-run knobs for normalization.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Category given to entries without any tag.
    pub default_category: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            default_category: "その他".to_string(),
        }
    }
}

/// Outcome of parsing one feed document.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub kind: FeedKind,
    /// Qualifying articles in document order.
    pub articles: Vec<Article>,
    /// Entries dropped for lacking a title or URL.
    pub skipped: usize,
}

#[derive(Debug, Default)]
struct Extraction {
    articles: Vec<Article>,
    skipped: usize,
}

impl Extraction {
    fn push(&mut self, article: Option<Article>) {
        match article {
            Some(article) => self.articles.push(article),
            None => self.skipped += 1,
        }
    }
}

/// Parses feed bytes into normalized articles.
///
/// Atom roots yield their `entry` elements, RSS roots the `item` elements of
/// their `channel`. Any other root is tried as Atom first and as RSS when
/// Atom finds nothing.
///
/// # Errors
///
/// [`ParseError::Malformed`] when the bytes are not well-formed XML. A
/// well-formed document without qualifying entries is not an error here; the
/// result simply has no articles.
pub fn parse_feed(bytes: &[u8], options: &ParseOptions) -> Result<ParseResult, ParseError> {
    let document = Document::parse(bytes)?;
    let root = document.root();
    let kind = FeedKind::detect(root);

    let extraction = match kind {
        FeedKind::Atom => extract_atom(root, options),
        FeedKind::Rss => extract_rss(root, options),
        FeedKind::Unknown => {
            let atom = extract_atom(root, options);
            if atom.articles.is_empty() {
                tracing::debug!(root = %root.name(), "No Atom entries under unknown root, trying RSS");
                extract_rss(root, options)
            } else {
                atom
            }
        }
    };

    Ok(ParseResult {
        kind,
        articles: extraction.articles,
        skipped: extraction.skipped,
    })
}

/// Articles from every Atom `entry` below `root`.
pub fn parse_atom(root: &Element, options: &ParseOptions) -> Vec<Article> {
    extract_atom(root, options).articles
}

/// Articles from the `item` elements of `root`'s `channel`.
pub fn parse_rss(root: &Element, options: &ParseOptions) -> Vec<Article> {
    extract_rss(root, options).articles
}

fn extract_atom(root: &Element, options: &ParseOptions) -> Extraction {
    let mut extraction = Extraction::default();
    for entry in root.descendants(Some(ATOM_NS), "entry") {
        extraction.push(atom_entry(entry, options));
    }
    extraction
}

fn atom_entry(entry: &Element, options: &ParseOptions) -> Option<Article> {
    let atom = Some(ATOM_NS);

    let title = trimmed_text(entry.child(atom, "title"));

    let links: Vec<&Element> = entry.children(atom, "link").collect();
    let url = links
        .iter()
        .find(|l| l.attr("rel") == Some("alternate"))
        .or_else(|| links.first())
        .and_then(|l| l.attr("href"))
        .unwrap_or_default()
        .to_string();

    if title.is_empty() || url.is_empty() {
        return None;
    }

    let enclosure = links
        .iter()
        .find(|l| l.attr("rel") == Some("enclosure"))
        .and_then(|l| l.attr("href"))
        .unwrap_or_default()
        .to_string();

    let published_at = first_non_empty(entry, &["published", "updated"])
        .trim()
        .to_string();
    let summary = strip_html(&first_non_empty(entry, &["summary", "content"]));

    let tags: Vec<String> = entry
        .children(atom, "category")
        .filter_map(|c| {
            let term = match c.attr("term") {
                Some(term) if !term.is_empty() => term.to_string(),
                _ => c.text(),
            };
            non_empty_trimmed(&term)
        })
        .collect();

    Some(Article {
        category: first_or_default(&tags, options),
        title,
        url,
        enclosure,
        published_at,
        summary,
        tags,
    })
}

fn extract_rss(root: &Element, options: &ParseOptions) -> Extraction {
    let mut extraction = Extraction::default();
    if let Some(channel) = root.child(None, "channel") {
        for item in channel.children(None, "item") {
            extraction.push(rss_item(item, options));
        }
    }
    extraction
}

fn rss_item(item: &Element, options: &ParseOptions) -> Option<Article> {
    let title = trimmed_text(item.child(None, "title"));
    let url = trimmed_text(item.child(None, "link"));

    if title.is_empty() || url.is_empty() {
        return None;
    }

    let enclosure = item
        .child(None, "enclosure")
        .and_then(|e| e.attr("url"))
        .unwrap_or_default()
        .to_string();

    let pub_date = trimmed_text(item.child(None, "pubDate"));
    let published_at = rfc822_to_iso8601(&pub_date);

    // content:encoded (any namespace) overrides description when it has text
    let description = item
        .elements()
        .filter(|e| e.name().ends_with("encoded"))
        .map(Element::text)
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| item.child(None, "description").map(Element::text).unwrap_or_default());
    let summary = strip_html(&description);

    let tags: Vec<String> = item
        .children(None, "category")
        .filter_map(|c| non_empty_trimmed(&c.text()))
        .collect();

    Some(Article {
        category: first_or_default(&tags, options),
        title,
        url,
        enclosure,
        published_at,
        summary,
        tags,
    })
}

fn trimmed_text(element: Option<&Element>) -> String {
    element.map(|e| e.text().trim().to_string()).unwrap_or_default()
}

/// Text of the first Atom child, among `names` in order, that has any text.
fn first_non_empty(entry: &Element, names: &[&str]) -> String {
    names
        .iter()
        .filter_map(|name| entry.child(Some(ATOM_NS), name))
        .map(Element::text)
        .find(|text| !text.trim().is_empty())
        .unwrap_or_default()
}

fn non_empty_trimmed(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn first_or_default(tags: &[String], options: &ParseOptions) -> String {
    tags.first()
        .cloned()
        .unwrap_or_else(|| options.default_category.clone())
}
