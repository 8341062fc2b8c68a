//! Social sharing tags (Open Graph and Twitter Card)

use crate::page::StaticSelector;
use crate::{CheckKey, CheckResult, Page, Status};
use std::collections::BTreeMap;

static OPEN_GRAPH: StaticSelector = StaticSelector::new(r#"meta[property^="og:"]"#);
static TWITTER: StaticSelector = StaticSelector::new(r#"meta[name^="twitter:"]"#);

pub fn open_graph(page: &Page) -> CheckResult {
    let tags = collect_tags(page, &OPEN_GRAPH, "property");
    if tags.is_empty() {
        CheckResult::fail(CheckKey::OpenGraph, Status::NeedsWork, "No Open Graph tags.", tags)
    } else {
        CheckResult::pass(CheckKey::OpenGraph, "Open Graph tags present.", tags)
    }
}

/// Informational only. A page without Twitter tags falls back to Open Graph.
pub fn twitter_card(page: &Page) -> CheckResult {
    let tags = collect_tags(page, &TWITTER, "name");
    if tags.is_empty() {
        CheckResult::fail(CheckKey::TwitterCard, Status::Good, "No Twitter Card tags.", tags)
    } else {
        CheckResult::pass(CheckKey::TwitterCard, "Twitter Card tags present.", tags)
    }
}

// Last occurrence of a repeated property wins.
fn collect_tags(page: &Page, selector: &StaticSelector, name_attr: &str) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    for el in page.select(selector) {
        let Some(name) = el.value().attr(name_attr) else {
            continue;
        };
        let content = el.value().attr("content").unwrap_or_default().trim();
        tags.insert(name.to_string(), content.to_string());
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CheckValue;

    #[test]
    fn test_open_graph_collects_properties() {
        let page = Page::parse(
            r#"<head>
                <meta property="og:title" content="Hello">
                <meta property="og:image" content="/a.png">
                <meta property="og:image" content="/b.png">
                <meta name="description" content="ignored">
            </head>"#,
            None,
        );
        let result = open_graph(&page);
        assert!(result.passed);
        let CheckValue::Tags(tags) = &result.value else {
            panic!("expected tags, got {:?}", result.value);
        };
        assert_eq!(tags.len(), 2);
        assert_eq!(tags["og:image"], "/b.png");
    }

    #[test]
    fn test_missing_open_graph_needs_work() {
        let result = open_graph(&Page::parse("<head></head>", None));
        assert!(!result.passed);
        assert_eq!(result.status, Status::NeedsWork);
    }

    #[test]
    fn test_missing_twitter_card_is_only_good() {
        let result = twitter_card(&Page::parse("<head></head>", None));
        assert!(!result.passed);
        assert_eq!(result.status, Status::Good);

        let present = twitter_card(&Page::parse(
            r#"<meta name="twitter:card" content="summary">"#,
            None,
        ));
        assert!(present.passed);
        assert_eq!(present.status, Status::Excellent);
    }
}
