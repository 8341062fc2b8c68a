//! Analysis engine - runs every inspector and assembles the report

use crate::{AnalysisResult, Page, PageChecks, ScoreLabel};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use url::Url;

use super::{recommendations, rules, ScoreCalculator};

/// A page file plus the URL it is served from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSource {
    pub path: PathBuf,
    pub url: Option<Url>,
}

impl PageSource {
    pub fn new(path: impl Into<PathBuf>, url: Option<Url>) -> Self {
        Self {
            path: path.into(),
            url,
        }
    }
}

/// Main analysis engine. Stateless: results are returned, never retained.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageAnalyzer;

impl PageAnalyzer {
    /// Create a new analyzer
    pub fn new() -> Self {
        Self
    }

    /// Analyze a loaded page, stamped with the current time
    pub fn analyze(&self, page: &Page) -> AnalysisResult {
        self.analyze_at(page, Utc::now())
    }

    /// Analyze a loaded page with an explicit capture time
    pub fn analyze_at(&self, page: &Page, timestamp: DateTime<Utc>) -> AnalysisResult {
        let checks = PageChecks::from_fn(rules::headings::counts(page), |key| {
            rules::inspect(key, page)
        });

        AnalysisResult {
            seo_score: ScoreCalculator::calculate(&checks),
            recommendations: recommendations::generate(&checks),
            pass_summary: ScoreCalculator::pass_summary(&checks),
            meta_summary: ScoreCalculator::meta_summary(&checks),
            timing: page.timing().map(|timing| timing.metrics()),
            checks,
            timestamp,
        }
    }

    /// Analyze an HTML string
    pub fn analyze_html(&self, html: &str, url: Option<Url>) -> AnalysisResult {
        self.analyze(&Page::parse(html, url))
    }

    /// Read and analyze an HTML file
    pub fn analyze_file(&self, path: &Path, url: Option<Url>) -> Result<AnalysisResult> {
        let page = Page::from_file(path, url)
            .with_context(|| format!("Failed to load page {}", path.display()))?;
        Ok(self.analyze(&page))
    }

    /// Analyze multiple pages sequentially
    pub fn analyze_many(&self, sources: &[PageSource]) -> Vec<Result<AnalysisResult>> {
        sources
            .iter()
            .map(|s| self.analyze_file(&s.path, s.url.clone()))
            .collect()
    }

    /// Analyze multiple pages in parallel using rayon
    pub fn analyze_parallel(&self, sources: &[PageSource]) -> Vec<Result<AnalysisResult>> {
        use rayon::prelude::*;

        sources
            .par_iter()
            .map(|s| self.analyze_file(&s.path, s.url.clone()))
            .collect()
    }

    /// Get aggregate stats from multiple results
    pub fn aggregate_stats(results: &[AnalysisResult]) -> AggregateStats {
        if results.is_empty() {
            return AggregateStats::default();
        }

        let total_score: u32 = results.iter().map(|r| u32::from(r.seo_score)).sum();
        let average_score = (total_score / results.len() as u32) as u8;

        AggregateStats {
            pages_analyzed: results.len(),
            average_score,
            average_label: ScoreLabel::from_score(average_score),
            total_recommendations: results.iter().map(|r| r.recommendations.len()).sum(),
            total_passed: results.iter().map(|r| r.pass_summary.passed).sum(),
            total_checks: results.iter().map(|r| r.pass_summary.total_checks).sum(),
        }
    }
}

/// Aggregate statistics from multiple page analyses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    /// Number of pages analyzed
    pub pages_analyzed: usize,
    /// Average score across all pages (rounded down)
    pub average_score: u8,
    pub average_label: ScoreLabel,
    /// Total number of recommendations across all pages
    pub total_recommendations: usize,
    /// Passing scored checks across all pages
    pub total_passed: usize,
    pub total_checks: usize,
}

impl Default for AggregateStats {
    fn default() -> Self {
        Self {
            pages_analyzed: 0,
            average_score: 0,
            average_label: ScoreLabel::Poor,
            total_recommendations: 0,
            total_passed: 0,
            total_checks: 0,
        }
    }
}
