//! Document handle: the parsed DOM, the navigation URL, and optional timing.
//!
//! Every inspector reads the page through the helpers here. A selector that
//! fails to parse matches nothing, so missing or malformed markup always
//! surfaces as "absent" rather than as an error.

mod text;
pub mod timing;

pub use timing::{NavigationTiming, TimingMetrics};

use scraper::{ElementRef, Html, Selector};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

/// Errors raised while loading a page. The analysis itself never fails.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid page URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid navigation timing in {}: {source}", path.display())]
    Timing {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A fixed CSS selector, parsed on first use and shared for the life of the process
pub struct StaticSelector {
    css: &'static str,
    parsed: OnceLock<Option<Selector>>,
}

impl StaticSelector {
    pub const fn new(css: &'static str) -> Self {
        Self {
            css,
            parsed: OnceLock::new(),
        }
    }

    /// The parsed selector, or `None` when `css` is not valid
    pub fn get(&self) -> Option<&Selector> {
        self.parsed
            .get_or_init(|| Selector::parse(self.css).ok())
            .as_ref()
    }
}

static TITLE: StaticSelector = StaticSelector::new("title");

/// A loaded HTML document plus its browsing context
#[derive(Debug)]
pub struct Page {
    html: Html,
    source_len: usize,
    url: Option<Url>,
    timing: Option<NavigationTiming>,
}

impl Page {
    /// Parse an HTML string. Never fails: garbage yields an empty document.
    pub fn parse(source: &str, url: Option<Url>) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Self {
            html: Html::parse_document(source),
            source_len: source.len(),
            url,
            timing: None,
        }
    }

    /// Parse an HTML string with a URL given as text
    pub fn parse_with_url(source: &str, url: &str) -> Result<Self, PageError> {
        Ok(Self::parse(source, Some(parse_url(url)?)))
    }

    /// Read and parse an HTML file
    pub fn from_file(path: &Path, url: Option<Url>) -> Result<Self, PageError> {
        let bytes = std::fs::read(path).map_err(|source| PageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes), url))
    }

    /// Read and parse HTML from a reader (e.g. stdin)
    pub fn from_reader<R: Read>(mut reader: R, url: Option<Url>) -> Result<Self, PageError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|source| PageError::Read {
                path: PathBuf::from("-"),
                source,
            })?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes), url))
    }

    /// Attach navigation timing collected by the host
    pub fn with_timing(mut self, timing: NavigationTiming) -> Self {
        self.timing = Some(timing);
        self
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn timing(&self) -> Option<&NavigationTiming> {
        self.timing.as_ref()
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Size of the parsed source in bytes
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// All elements matching a fixed selector, in document order
    pub fn select(&self, selector: &StaticSelector) -> Vec<ElementRef<'_>> {
        match selector.get() {
            Some(selector) => self.html.select(selector).collect(),
            None => Vec::new(),
        }
    }

    /// First element matching a fixed selector
    pub fn select_first(&self, selector: &StaticSelector) -> Option<ElementRef<'_>> {
        self.html.select(selector.get()?).next()
    }

    /// First element matching a selector built at runtime
    pub fn query_first(&self, css: &str) -> Option<ElementRef<'_>> {
        let selector = Selector::parse(css).ok()?;
        self.html.select(&selector).next()
    }

    /// Trimmed `content` of `<meta name="...">`, or "" when absent
    pub fn meta_content(&self, name: &str) -> String {
        self.query_first(&format!(r#"meta[name="{}"]"#, name))
            .and_then(|el| el.value().attr("content"))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    /// Attribute of the root `<html>` element
    pub fn root_attr(&self, name: &str) -> Option<&str> {
        self.html.root_element().value().attr(name)
    }

    /// The document title with whitespace collapsed, as a browser reports it
    pub fn title(&self) -> String {
        self.select_first(&TITLE)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default()
    }

    /// Rendered text of `<body>`, skipping scripts, styles and hidden subtrees
    pub fn visible_text(&self) -> String {
        text::visible_text(&self.html)
    }

    /// Resolve an href against the page URL (returned unchanged when no URL is known)
    pub fn resolve(&self, href: &str) -> String {
        match self.url.as_ref().and_then(|base| base.join(href).ok()) {
            Some(url) => url.to_string(),
            None => href.to_string(),
        }
    }
}

/// Parse a URL, mapping the error to [`PageError::InvalidUrl`]
pub fn parse_url(url: &str) -> Result<Url, PageError> {
    Url::parse(url).map_err(|source| PageError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

/// Trimmed text content of an element
pub(crate) fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
