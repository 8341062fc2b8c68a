//! Additive SEO score and the pass/metadata summaries

use crate::{CheckKey, MetaCount, MetaSummary, PageChecks, PassSummary, ScoreLabel, Status};
use std::collections::BTreeMap;

/// Highest score a page can reach
pub const MAX_SCORE: u8 = 100;

/// Checks tallied by the metadata summary
const META_CHECKS: [CheckKey; 3] = [
    CheckKey::Title,
    CheckKey::MetaDescription,
    CheckKey::Canonical,
];

/// Calculator for page scores
pub struct ScoreCalculator;

impl ScoreCalculator {
    /// Sum the weights of every passing check, capped at [`MAX_SCORE`]
    pub fn calculate(checks: &PageChecks) -> u8 {
        let total: u32 = CheckKey::ALL
            .iter()
            .filter(|key| checks.get(**key).passed)
            .map(|key| u32::from(key.weight()))
            .sum();
        total.min(u32::from(MAX_SCORE)) as u8
    }

    /// Tally the scored checks
    pub fn pass_summary(checks: &PageChecks) -> PassSummary {
        let tally: BTreeMap<CheckKey, bool> = CheckKey::ALL
            .iter()
            .filter(|key| key.is_scored())
            .map(|key| (*key, checks.get(*key).passed))
            .collect();

        let total_checks = tally.len();
        let passed = tally.values().filter(|passed| **passed).count();

        PassSummary {
            passed,
            total_checks,
            passed_out_of: format!("{}/{}", passed, total_checks),
            pass_percent: pass_percent(passed, total_checks),
            checks: tally,
            page_word_count: checks.word_count(),
        }
    }

    /// Title, meta description and canonical at a glance
    pub fn meta_summary(checks: &PageChecks) -> MetaSummary {
        let ok = META_CHECKS
            .iter()
            .filter(|key| checks.get(**key).passed)
            .count();
        let total = META_CHECKS.len();
        let status = match ok {
            3 => Status::Excellent,
            2 => Status::Good,
            _ => Status::NeedsWork,
        };
        MetaSummary {
            passed: ok >= 2,
            status,
            value: MetaCount { ok, total },
        }
    }

    /// Get a description of the score label
    pub fn label_description(label: ScoreLabel) -> &'static str {
        match label {
            ScoreLabel::Excellent => "Excellent - The page is well optimized for search",
            ScoreLabel::Good => "Good - Solid fundamentals with a few gaps",
            ScoreLabel::Fair => "Fair - Several important signals are missing",
            ScoreLabel::Poor => "Poor - The page needs significant SEO work",
        }
    }
}

/// Percentage of passing checks, rounded half up (0 when nothing was checked)
fn pass_percent(passed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((passed * 200 + total) / (total * 2)).min(100) as u8
}
