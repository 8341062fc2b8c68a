//! JSON reporter for machine-readable output

use super::PageReport;
use crate::analyzer::engine::AggregateStats;
use crate::DisplayAnalysis;
use serde::Serialize;

/// Reporter for JSON output
pub struct JsonReporter {
    /// Whether to pretty-print JSON
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T, fallback: &str) -> String {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        json.unwrap_or_else(|_| fallback.to_string())
    }

    /// Report a single page: the analysis plus its display fields
    pub fn report(&self, page: &PageReport) -> String {
        self.to_json(&page.result.display(page.delta()), "{}")
    }

    /// Report multiple pages as a JSON array
    pub fn report_many(&self, pages: &[PageReport]) -> String {
        let entries: Vec<JsonPage<'_>> = pages.iter().map(JsonPage::from).collect();
        self.to_json(&entries, "[]")
    }

    /// Report multiple pages with an aggregate summary
    pub fn report_with_summary(&self, pages: &[PageReport], stats: &AggregateStats) -> String {
        let output = JsonOutput {
            results: pages.iter().map(JsonPage::from).collect(),
            summary: stats,
        };
        self.to_json(&output, "{}")
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonPage<'a> {
    source: &'a str,
    #[serde(flatten)]
    analysis: DisplayAnalysis<'a>,
}

impl<'a> From<&'a PageReport> for JsonPage<'a> {
    fn from(page: &'a PageReport) -> Self {
        Self {
            source: &page.source,
            analysis: page.result.display(page.delta()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    results: Vec<JsonPage<'a>>,
    summary: &'a AggregateStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::PageAnalyzer;

    fn make_page(source: &str, html: &str) -> PageReport {
        PageReport::new(source, PageAnalyzer::new().analyze_html(html, None))
    }

    #[test]
    fn test_json_single_page_has_display_fields() {
        let page = make_page("index.html", "<title>A reasonably long title</title>")
            .with_previous_score(Some(5));

        let json = JsonReporter::new().report(&page);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["title"]["passed"], true);
        assert_eq!(parsed["seoScore"], 15);
        assert_eq!(parsed["scoreLabel"], "Poor");
        assert_eq!(parsed["scoreColor"], "#ef4444");
        assert_eq!(parsed["scoreTextColor"], "#dc2626");
        assert_eq!(parsed["delta"], 10);
        assert!(parsed["recommendations"].is_array());
    }

    #[test]
    fn test_json_omits_delta_without_history() {
        let json = JsonReporter::new().report(&make_page("index.html", ""));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("delta").is_none());
    }

    #[test]
    fn test_json_pretty_output() {
        let json = JsonReporter::new()
            .pretty()
            .report(&make_page("index.html", ""));
        assert!(json.contains('\n'), "pretty JSON should have newlines");
        assert!(json.contains("  "), "pretty JSON should have indentation");
    }

    #[test]
    fn test_json_report_many() {
        let pages = vec![make_page("a.html", ""), make_page("b.html", "")];
        let json = JsonReporter::new().report_many(&pages);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        let arr = parsed.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["source"], "a.html");
        assert_eq!(arr[1]["source"], "b.html");
        assert_eq!(arr[1]["seoScore"], 5);
    }

    #[test]
    fn test_json_report_with_summary() {
        let pages = vec![
            make_page("a.html", "<title>A reasonably long title</title>"),
            make_page("b.html", ""),
        ];
        let results: Vec<_> = pages.iter().map(|p| p.result.clone()).collect();
        let stats = PageAnalyzer::aggregate_stats(&results);

        let json = JsonReporter::new().report_with_summary(&pages, &stats);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        let summary = &parsed["summary"];
        assert_eq!(summary["pagesAnalyzed"], 2);
        assert_eq!(summary["averageScore"], 10);
        assert_eq!(summary["averageLabel"], "Poor");
        assert_eq!(parsed["results"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_json_report_many_empty() {
        let json = JsonReporter::new().report_many(&[]);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.as_array().unwrap().is_empty());
    }
}
