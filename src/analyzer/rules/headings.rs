//! Heading counts, H1/H2 presence, and outline ordering

use crate::page::{element_text, StaticSelector};
use crate::{CheckKey, CheckResult, HeadingCounts, HeadingEntry, HeadingsReport, Page, Status};

static HEADINGS: StaticSelector = StaticSelector::new("h1, h2, h3, h4, h5, h6");
static H1: StaticSelector = StaticSelector::new("h1");
static H2: StaticSelector = StaticSelector::new("h2");

/// Count headings at every level
pub fn counts(page: &Page) -> HeadingCounts {
    let mut counts = HeadingCounts::default();
    for entry in outline(page) {
        match entry.level {
            1 => counts.h1 += 1,
            2 => counts.h2 += 1,
            3 => counts.h3 += 1,
            4 => counts.h4 += 1,
            5 => counts.h5 += 1,
            _ => counts.h6 += 1,
        }
    }
    counts
}

/// Every heading in document order
pub fn outline(page: &Page) -> Vec<HeadingEntry> {
    page.select(&HEADINGS)
        .iter()
        .filter_map(|el| {
            let name = el.value().name();
            let level = name.strip_prefix('h')?.parse::<u8>().ok()?;
            Some(HeadingEntry {
                tag: name.to_ascii_uppercase(),
                level,
                text: element_text(el),
            })
        })
        .collect()
}

/// Heading counts plus the H1 and H2 verdicts
pub fn report(page: &Page) -> HeadingsReport {
    HeadingsReport {
        value: counts(page),
        h1: h1(page),
        h2: h2(page),
    }
}

pub fn h1(page: &Page) -> CheckResult {
    let count = page.select(&H1).len();
    match count {
        0 => CheckResult::fail(CheckKey::H1, Status::NeedsWork, "No H1 heading found.", count),
        1 => CheckResult::pass(CheckKey::H1, "Exactly one H1 heading.", count),
        _ => CheckResult::fail(CheckKey::H1, Status::Good, "Multiple H1 headings found.", count),
    }
}

pub fn h2(page: &Page) -> CheckResult {
    let count = page.select(&H2).len();
    if count >= 1 {
        CheckResult::pass(CheckKey::H2, "At least one H2 heading.", count)
    } else {
        CheckResult::fail(CheckKey::H2, Status::NeedsWork, "No H2 headings found.", count)
    }
}

pub fn hierarchy(page: &Page) -> CheckResult {
    evaluate_hierarchy(outline(page))
}

/// Judge a heading outline.
///
/// Rules are tried in order and the first one violated supplies the status and
/// message; any violation fails the check:
///
/// 1. no headings at all (NeedsWork)
/// 2. the first heading is not an H1 (NeedsWork)
/// 3. more than one H1 (Good)
/// 4. a level jump of more than one, e.g. H2 to H4 (Good, first jump only)
pub fn evaluate_hierarchy(outline: Vec<HeadingEntry>) -> CheckResult {
    let key = CheckKey::HeadingHierarchy;
    let Some(first) = outline.first() else {
        return CheckResult::fail(key, Status::NeedsWork, "No headings found on the page.", outline);
    };

    let h1_count = outline.iter().filter(|h| h.level == 1).count();
    let jump = outline
        .windows(2)
        .find(|pair| pair[1].level > pair[0].level + 1)
        .map(|pair| (pair[0].level, pair[1].level));

    let violation = if first.level != 1 {
        Some((
            Status::NeedsWork,
            "The first heading is not an H1. Always start with a single H1.".to_string(),
        ))
    } else if h1_count > 1 {
        Some((
            Status::Good,
            format!(
                "Multiple H1 tags found ({}). Use a single H1 for the main title.",
                h1_count
            ),
        ))
    } else {
        jump.map(|(from, to)| {
            (
                Status::Good,
                format!(
                    "Heading level jumped from H{} to H{}. Avoid skipping levels.",
                    from, to
                ),
            )
        })
    };

    match violation {
        Some((status, message)) => CheckResult::fail(key, status, message, outline),
        None => CheckResult::pass(key, "Heading hierarchy is valid.", outline),
    }
}
