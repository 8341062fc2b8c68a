//! Body copy length

use crate::{CheckKey, CheckResult, Page, Status};

pub const MIN_WORDS: usize = 150;
pub const TARGET_WORDS: usize = 300;

/// Whitespace-delimited words of the page's visible text
pub fn count_words(page: &Page) -> usize {
    page.visible_text().split_whitespace().count()
}

pub fn word_count(page: &Page) -> CheckResult {
    let words = count_words(page);
    if words < MIN_WORDS {
        CheckResult::fail(CheckKey::WordCount, Status::NeedsWork, "Not enough content.", words)
    } else if words < TARGET_WORDS {
        CheckResult::fail(CheckKey::WordCount, Status::Good, "Content a bit short.", words)
    } else {
        CheckResult::pass(CheckKey::WordCount, "Good content length.", words)
    }
}
