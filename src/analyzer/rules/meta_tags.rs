//! Head metadata: title, description, robots, canonical, language, charset,
//! viewport, favicon, and the page URL itself.

use crate::page::StaticSelector;
use crate::{CheckKey, CheckResult, Page, Status};
use regex::Regex;
use std::sync::OnceLock;

static CANONICAL: StaticSelector = StaticSelector::new(r#"link[rel="canonical"]"#);
static META_CHARSET: StaticSelector = StaticSelector::new("meta[charset]");
static META_HTTP_EQUIV: StaticSelector = StaticSelector::new("meta[http-equiv]");
static VIEWPORT: StaticSelector = StaticSelector::new(r#"meta[name="viewport"]"#);
static ICONS: StaticSelector = StaticSelector::new(r#"link[rel*="icon"]"#);

pub const TITLE_MIN_LEN: usize = 10;
pub const TITLE_MAX_LEN: usize = 60;
pub const DESCRIPTION_MIN_LEN: usize = 50;
pub const DESCRIPTION_MAX_LEN: usize = 160;

pub fn title(page: &Page) -> CheckResult {
    let title = page.title();
    let len = title.chars().count();
    let key = CheckKey::Title;
    if title.is_empty() {
        CheckResult::fail(key, Status::NeedsWork, "Title is missing.", title)
    } else if len < TITLE_MIN_LEN {
        CheckResult::fail(key, Status::NeedsWork, "Title is too short.", title)
    } else if len > TITLE_MAX_LEN {
        CheckResult::fail(key, Status::Good, "Title is too long.", title)
    } else {
        CheckResult::pass(key, "Title length is optimal.", title)
    }
}

pub fn page_url(page: &Page) -> CheckResult {
    match page.url() {
        Some(url) => CheckResult::pass(CheckKey::Url, "URL is present.", url.as_str()),
        None => CheckResult::fail(CheckKey::Url, Status::NeedsWork, "URL missing.", ""),
    }
}

pub fn meta_description(page: &Page) -> CheckResult {
    let value = page.meta_content("description");
    let len = value.chars().count();
    let key = CheckKey::MetaDescription;
    if value.is_empty() {
        CheckResult::fail(key, Status::NeedsWork, "Meta description is missing.", value)
    } else if len < DESCRIPTION_MIN_LEN {
        CheckResult::fail(key, Status::NeedsWork, "Meta description too short.", value)
    } else if len > DESCRIPTION_MAX_LEN {
        CheckResult::fail(key, Status::Good, "Meta description too long.", value)
    } else {
        CheckResult::pass(key, "Meta description length is optimal.", value)
    }
}

pub fn meta_robots(page: &Page) -> CheckResult {
    let value = page.meta_content("robots");
    let key = CheckKey::MetaRobots;
    if value.is_empty() {
        CheckResult::pass(
            key,
            "No robots meta tag found; default is index, follow.",
            value,
        )
    } else if is_noindex(&value) {
        CheckResult::fail(
            key,
            Status::NeedsWork,
            "Page is marked noindex (won't be indexed).",
            value,
        )
    } else {
        CheckResult::pass(key, "Page is indexable.", value)
    }
}

/// Whether a robots directive blocks indexing
pub fn is_noindex(robots: &str) -> bool {
    robots.to_ascii_lowercase().contains("noindex")
}

pub fn canonical(page: &Page) -> CheckResult {
    let href = page
        .select_first(&CANONICAL)
        .and_then(|el| el.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty());
    match href {
        Some(href) => CheckResult::pass(
            CheckKey::Canonical,
            "Canonical URL is set.",
            page.resolve(href),
        ),
        None => CheckResult::fail(
            CheckKey::Canonical,
            Status::NeedsWork,
            "Canonical URL is missing.",
            "",
        ),
    }
}

pub fn language(page: &Page) -> CheckResult {
    let value = page.root_attr("lang").unwrap_or_default().trim().to_string();
    if value.is_empty() {
        CheckResult::fail(
            CheckKey::Language,
            Status::NeedsWork,
            "HTML lang attribute missing.",
            value,
        )
    } else {
        CheckResult::pass(CheckKey::Language, "HTML lang attribute present.", value)
    }
}

pub fn charset(page: &Page) -> CheckResult {
    let value = declared_charset(page).unwrap_or_default();
    let key = CheckKey::Charset;
    if value.eq_ignore_ascii_case("utf-8") {
        CheckResult::pass(key, "Charset is UTF-8.", value)
    } else if value.is_empty() {
        CheckResult::fail(key, Status::NeedsWork, "Charset missing.", value)
    } else {
        CheckResult::fail(key, Status::NeedsWork, "Charset is not UTF-8.", value)
    }
}

/// `<meta charset>`, falling back to the legacy `http-equiv="Content-Type"` form
fn declared_charset(page: &Page) -> Option<String> {
    if let Some(el) = page.select_first(&META_CHARSET) {
        return el.value().attr("charset").map(|s| s.trim().to_string());
    }

    static CONTENT_TYPE_CHARSET: OnceLock<Option<Regex>> = OnceLock::new();
    let re = CONTENT_TYPE_CHARSET
        .get_or_init(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^\s;"']+)"#).ok())
        .as_ref()?;

    page.select(&META_HTTP_EQUIV)
        .into_iter()
        .filter(|el| {
            el.value()
                .attr("http-equiv")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("content-type"))
        })
        .find_map(|el| {
            let content = el.value().attr("content")?;
            re.captures(content).map(|caps| caps[1].to_string())
        })
}

pub fn mobile_viewport(page: &Page) -> CheckResult {
    let value = page
        .select_first(&VIEWPORT)
        .and_then(|el| el.value().attr("content"))
        .unwrap_or_default()
        .to_string();
    let compact: String = value.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.contains("width=device-width") {
        CheckResult::pass(CheckKey::MobileFriendly, "Mobile viewport set.", value)
    } else {
        CheckResult::fail(
            CheckKey::MobileFriendly,
            Status::NeedsWork,
            "No mobile viewport meta tag.",
            value,
        )
    }
}

pub fn favicon(page: &Page) -> CheckResult {
    let present = !page.select(&ICONS).is_empty();
    if present {
        CheckResult::pass(CheckKey::HasFavicon, "Favicon is present.", true)
    } else {
        CheckResult::fail(
            CheckKey::HasFavicon,
            Status::NeedsWork,
            "Favicon missing.",
            false,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(inner: &str) -> Page {
        Page::parse(&format!("<html><head>{}</head><body></body></html>", inner), None)
    }

    fn titled(title: &str) -> CheckResult {
        super::title(&head(&format!("<title>{}</title>", title)))
    }

    #[test]
    fn test_title_tiers() {
        let missing = titled("");
        assert!(!missing.passed);
        assert_eq!(missing.status, Status::NeedsWork);
        assert_eq!(missing.message, "Title is missing.");

        let short = titled("Hello");
        assert!(!short.passed);
        assert_eq!(short.status, Status::NeedsWork);
        assert_eq!(short.message, "Title is too short.");

        let long = titled(&"a".repeat(65));
        assert!(!long.passed);
        assert_eq!(long.status, Status::Good);

        let ideal = titled(&"a".repeat(30));
        assert!(ideal.passed);
        assert_eq!(ideal.status, Status::Excellent);
    }

    #[test]
    fn test_title_boundaries() {
        assert!(titled(&"a".repeat(10)).passed);
        assert!(titled(&"a".repeat(60)).passed);
        assert!(!titled(&"a".repeat(9)).passed);
        assert!(!titled(&"a".repeat(61)).passed);
    }

    #[test]
    fn test_title_length_counts_characters_not_bytes() {
        // 13 characters, 39 bytes
        let result = titled("日本語のページタイトルです");
        assert!(result.passed);
    }

    #[test]
    fn test_meta_description_tiers() {
        let desc = |n: usize| {
            meta_description(&head(&format!(
                r#"<meta name="description" content="{}">"#,
                "d".repeat(n)
            )))
        };
        assert_eq!(meta_description(&head("")).message, "Meta description is missing.");
        assert_eq!(desc(49).status, Status::NeedsWork);
        assert!(desc(50).passed);
        assert!(desc(160).passed);
        let long = desc(161);
        assert!(!long.passed);
        assert_eq!(long.status, Status::Good);
    }

    #[test]
    fn test_meta_robots() {
        let absent = meta_robots(&head(""));
        assert!(absent.passed);
        assert_eq!(absent.status, Status::Excellent);

        let blocked = meta_robots(&head(r#"<meta name="robots" content="NoIndex, follow">"#));
        assert!(!blocked.passed);
        assert_eq!(blocked.status, Status::NeedsWork);

        let indexable = meta_robots(&head(r#"<meta name="robots" content="index, follow">"#));
        assert!(indexable.passed);
        assert_eq!(indexable.message, "Page is indexable.");
    }

    #[test]
    fn test_canonical_resolved_against_page_url() {
        let page = Page::parse_with_url(
            r#"<head><link rel="canonical" href="/post"></head>"#,
            "https://example.com/post?utm=1",
        )
        .unwrap();
        let result = canonical(&page);
        assert!(result.passed);
        assert_eq!(result.value.as_text(), "https://example.com/post");
    }

    #[test]
    fn test_canonical_blank_href_is_missing() {
        let result = canonical(&head(r#"<link rel="canonical" href="  ">"#));
        assert!(!result.passed);
        assert_eq!(result.status, Status::NeedsWork);
    }

    #[test]
    fn test_language() {
        let with = language(&Page::parse(r#"<html lang="de"></html>"#, None));
        assert!(with.passed);
        assert_eq!(with.value.as_text(), "de");
        let without = language(&Page::parse("<html></html>", None));
        assert!(!without.passed);
    }

    #[test]
    fn test_charset_variants() {
        assert!(charset(&head(r#"<meta charset="UTF-8">"#)).passed);
        let latin = charset(&head(r#"<meta charset="ISO-8859-1">"#));
        assert!(!latin.passed);
        assert_eq!(latin.message, "Charset is not UTF-8.");
        let missing = charset(&head(""));
        assert_eq!(missing.message, "Charset missing.");
    }

    #[test]
    fn test_charset_from_http_equiv() {
        let result = charset(&head(
            r#"<meta http-equiv="Content-Type" content="text/html; charset=utf-8">"#,
        ));
        assert!(result.passed);
        assert_eq!(result.value.as_text(), "utf-8");
    }

    #[test]
    fn test_mobile_viewport() {
        assert!(mobile_viewport(&head(
            r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#
        ))
        .passed);
        assert!(mobile_viewport(&head(r#"<meta name="viewport" content="width = device-width">"#)).passed);
        assert!(!mobile_viewport(&head(r#"<meta name="viewport" content="width=1024">"#)).passed);
        assert!(!mobile_viewport(&head("")).passed);
    }

    #[test]
    fn test_favicon_variants() {
        assert!(favicon(&head(r#"<link rel="icon" href="/f.ico">"#)).passed);
        assert!(favicon(&head(r#"<link rel="shortcut icon" href="/f.ico">"#)).passed);
        assert!(favicon(&head(r#"<link rel="apple-touch-icon" href="/a.png">"#)).passed);
        assert!(!favicon(&head(r#"<link rel="stylesheet" href="/s.css">"#)).passed);
    }

    #[test]
    fn test_page_url() {
        let page = Page::parse_with_url("", "https://example.com/").unwrap();
        assert!(page_url(&page).passed);
        assert!(!page_url(&Page::parse("", None)).passed);
    }
}
