//! Anchor activity

use crate::page::{element_text, StaticSelector};
use crate::{CheckKey, CheckResult, InactiveLink, LinkStats, Page, Status};

static ANCHORS: StaticSelector = StaticSelector::new("a");

/// Whether an href goes nowhere: missing, blank, `#`, or a `javascript:` URL
pub fn is_inactive(href: Option<&str>) -> bool {
    let Some(href) = href.map(str::trim) else {
        return true;
    };
    href.is_empty()
        || href == "#"
        || href
            .get(..10)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript"))
}

pub fn links(page: &Page) -> CheckResult {
    let anchors = page.select(&ANCHORS);
    let inactive_links: Vec<InactiveLink> = anchors
        .iter()
        .filter_map(|a| {
            let href = a.value().attr("href");
            is_inactive(href).then(|| InactiveLink {
                text: element_text(a),
                href: href.map(str::to_string),
            })
        })
        .collect();

    let stats = LinkStats {
        total_links: anchors.len(),
        active_links: anchors.len() - inactive_links.len(),
        inactive_links_count: inactive_links.len(),
        inactive_links,
    };

    if stats.total_links == 0 {
        CheckResult::fail(
            CheckKey::Links,
            Status::NeedsWork,
            "No links found. Consider adding relevant internal and external links.",
            stats,
        )
    } else if stats.inactive_links_count > 0 {
        let message = format!(
            "{} inactive or placeholder link(s) detected.",
            stats.inactive_links_count
        );
        CheckResult::fail(CheckKey::Links, Status::NeedsWork, message, stats)
    } else {
        CheckResult::pass(
            CheckKey::Links,
            "All links appear to be active and useful.",
            stats,
        )
    }
}
