//! Human-readable fixes, in a fixed field order

use super::rules::meta_tags::{
    is_noindex, DESCRIPTION_MAX_LEN, DESCRIPTION_MIN_LEN, TITLE_MAX_LEN, TITLE_MIN_LEN,
};
use super::rules::content::MIN_WORDS;
use crate::{CheckValue, ImageStats, LinkStats, PageChecks};

/// Recommendations for every failing field.
///
/// Order: title, description, robots, headings, content length, heading
/// hierarchy, images, links, canonical, social, mobile, favicon, structured
/// data, language, charset.
pub fn generate(checks: &PageChecks) -> Vec<String> {
    let mut recs = Vec::new();

    let title_len = checks.title.value.as_text().chars().count();
    if title_len == 0 {
        recs.push("Add a page title".to_string());
    } else if title_len > TITLE_MAX_LEN {
        recs.push("Title too long".to_string());
    } else if title_len < TITLE_MIN_LEN {
        recs.push("Title too short".to_string());
    }

    let description_len = checks.meta_description.value.as_text().chars().count();
    if description_len == 0 {
        recs.push("Add a meta description".to_string());
    } else if description_len < DESCRIPTION_MIN_LEN {
        recs.push("Meta description too short".to_string());
    } else if description_len > DESCRIPTION_MAX_LEN {
        recs.push("Meta description too long".to_string());
    }

    if is_noindex(checks.meta_robots.value.as_text()) {
        recs.push("Page is marked noindex".to_string());
    }

    let headings = checks.headings.value;
    if headings.h1 == 0 {
        recs.push("Add one H1 heading".to_string());
    }
    if headings.h1 > 1 {
        recs.push("Only use one H1 per page".to_string());
    }
    if headings.h2 == 0 {
        recs.push("Add at least one H2 heading".to_string());
    }

    if checks.word_count() < MIN_WORDS {
        recs.push("Add more content".to_string());
    }

    if !checks.heading_hierarchy.passed {
        recs.push(checks.heading_hierarchy.message.clone());
    }

    let images = match &checks.images.value {
        CheckValue::Images(stats) => *stats,
        _ => ImageStats::default(),
    };
    if images.total == 0 {
        recs.push("Add images".to_string());
    }
    if images.missing_alt > 0 {
        recs.push(format!("{} images missing alt text", images.missing_alt));
    }

    let links = match &checks.links.value {
        CheckValue::Links(stats) => stats.clone(),
        _ => LinkStats::default(),
    };
    if links.total_links == 0 {
        recs.push("Add links".to_string());
    }
    if links.inactive_links_count > 0 {
        recs.push(format!("{} inactive links", links.inactive_links_count));
    }

    if checks.canonical.value.as_text().is_empty() {
        recs.push("Add a canonical link".to_string());
    }
    if !checks.open_graph.passed {
        recs.push("Add Open Graph meta tags".to_string());
    }
    if !checks.mobile_friendly.passed {
        recs.push("Add mobile viewport meta tag".to_string());
    }
    if !checks.has_favicon.passed {
        recs.push("Add a favicon".to_string());
    }
    if !checks.structured_data.passed {
        recs.push("Add structured data (JSON-LD)".to_string());
    }
    if checks.language.value.as_text().is_empty() {
        recs.push("Declare HTML language".to_string());
    }
    if !checks.charset.value.as_text().eq_ignore_ascii_case("utf-8") {
        recs.push("Use UTF-8 charset".to_string());
    }

    recs
}
