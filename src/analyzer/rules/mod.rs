//! Field inspectors
//!
//! Each inspector is a pure `fn(&Page) -> CheckResult` reading an isolated
//! region of the document. They never fail: absent markup produces a failing
//! result with an explanatory message.

pub mod content;
pub mod headings;
pub mod links;
pub mod media;
pub mod meta_tags;
pub mod social;

use super::structured_data;
use crate::{CheckKey, CheckResult, Page};

/// A single field inspector
pub type Inspector = fn(&Page) -> CheckResult;

/// The inspector responsible for a check
pub fn inspector(key: CheckKey) -> Inspector {
    match key {
        CheckKey::Title => meta_tags::title,
        CheckKey::Url => meta_tags::page_url,
        CheckKey::MetaDescription => meta_tags::meta_description,
        CheckKey::MetaRobots => meta_tags::meta_robots,
        CheckKey::Canonical => meta_tags::canonical,
        CheckKey::OpenGraph => social::open_graph,
        CheckKey::TwitterCard => social::twitter_card,
        CheckKey::Language => meta_tags::language,
        CheckKey::Charset => meta_tags::charset,
        CheckKey::MobileFriendly => meta_tags::mobile_viewport,
        CheckKey::HasFavicon => meta_tags::favicon,
        CheckKey::StructuredData => structured_data::check,
        CheckKey::H1 => headings::h1,
        CheckKey::H2 => headings::h2,
        CheckKey::HeadingHierarchy => headings::hierarchy,
        CheckKey::Images => media::images,
        CheckKey::Links => links::links,
        CheckKey::WordCount => content::word_count,
    }
}

/// Every inspector, in inspection order
pub const INSPECTORS: [(CheckKey, Inspector); 18] = [
    (CheckKey::Title, meta_tags::title),
    (CheckKey::Url, meta_tags::page_url),
    (CheckKey::MetaDescription, meta_tags::meta_description),
    (CheckKey::MetaRobots, meta_tags::meta_robots),
    (CheckKey::Canonical, meta_tags::canonical),
    (CheckKey::OpenGraph, social::open_graph),
    (CheckKey::TwitterCard, social::twitter_card),
    (CheckKey::Language, meta_tags::language),
    (CheckKey::Charset, meta_tags::charset),
    (CheckKey::MobileFriendly, meta_tags::mobile_viewport),
    (CheckKey::HasFavicon, meta_tags::favicon),
    (CheckKey::StructuredData, structured_data::check),
    (CheckKey::H1, headings::h1),
    (CheckKey::H2, headings::h2),
    (CheckKey::HeadingHierarchy, headings::hierarchy),
    (CheckKey::Images, media::images),
    (CheckKey::Links, links::links),
    (CheckKey::WordCount, content::word_count),
];

/// Run one inspector against the page
pub fn inspect(key: CheckKey, page: &Page) -> CheckResult {
    inspector(key)(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_inspector_reports_its_own_key() {
        let page = Page::parse("<html><body><p>hello</p></body></html>", None);
        for (key, inspect) in INSPECTORS {
            assert_eq!(inspect(&page).key, key, "inspector for {} mislabeled", key);
        }
    }

    #[test]
    fn test_table_matches_dispatch_order() {
        let keys: Vec<CheckKey> = INSPECTORS.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, CheckKey::ALL.to_vec());
        let page = Page::parse("<title>Some page title</title><h1>Hi</h1>", None);
        for (key, inspect) in INSPECTORS {
            assert_eq!(inspect(&page), super::inspect(key, &page));
        }
    }

    #[test]
    fn test_empty_document_fails_every_scored_check() {
        let page = Page::parse("", None);
        for key in CheckKey::ALL {
            let result = inspect(key, &page);
            if key.is_scored() && key != CheckKey::MetaRobots {
                assert!(!result.passed, "{} should fail on an empty document", key);
            }
        }
        // No robots tag means "index, follow"
        assert!(inspect(CheckKey::MetaRobots, &page).passed);
    }
}
