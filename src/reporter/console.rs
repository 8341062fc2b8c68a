//! Console reporter with colored output

use super::PageReport;
use crate::analyzer::engine::AggregateStats;
use crate::analyzer::scoring::ScoreCalculator;
use crate::history::format_delta;
use crate::{AnalysisResult, CheckResult, CheckValue, ScoreLabel, Status};
use colored::Colorize;

/// Reporter for terminal output
pub struct ConsoleReporter {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to show verbose output
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a new console reporter
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
        }
    }

    /// Disable colors
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    /// Enable verbose output
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Report a single page
    pub fn report(&self, page: &PageReport) {
        let result = &page.result;
        self.print_header(page);
        self.print_score(page);
        self.print_summaries(result);
        self.print_checks(result);

        if self.verbose {
            self.print_details(result);
        }

        self.print_timing(result);
        self.print_recommendations(result);
        println!();
    }

    /// Report multiple pages with summary
    pub fn report_many(&self, pages: &[PageReport], stats: &AggregateStats) {
        for page in pages {
            self.report(page);
            println!("{}", "─".repeat(60));
        }

        self.print_summary(stats);
    }

    /// Report in quiet mode (just score)
    pub fn report_quiet(&self, page: &PageReport) {
        let score = page.result.seo_score;
        println!(
            "{}: {} ({}){}",
            page.source,
            score,
            self.colorize_label(page.result.score_label()),
            format_delta(page.previous_score, score)
        );
    }

    fn print_header(&self, page: &PageReport) {
        println!();
        println!("{}", format!("🔎 SEO Analysis: {}", page.source).bold());
        let url = page.result.page_url();
        if !url.is_empty() && url != page.source {
            println!("   URL: {}", url);
        }
        println!();
    }

    fn print_score(&self, page: &PageReport) {
        let score = page.result.seo_score;
        let label = page.result.score_label();
        let delta = format_delta(page.previous_score, score);

        println!(
            "   Score: {} {}{}",
            self.create_score_bar(score),
            self.colorize_label(label).bold(),
            delta.dimmed()
        );
        println!(
            "   {}",
            ScoreCalculator::label_description(label).dimmed()
        );
        println!();
    }

    fn print_summaries(&self, result: &AnalysisResult) {
        let pass = &result.pass_summary;
        let meta = &result.meta_summary;
        println!(
            "   Checks passed: {} ({}%) | Metadata: {}/{} {}",
            pass.passed_out_of.bold(),
            pass.pass_percent,
            meta.value.ok,
            meta.value.total,
            self.colorize_status(meta.status)
        );
        println!();
    }

    fn print_checks(&self, result: &AnalysisResult) {
        println!("   {}", "Checks:".bold());
        for check in result.checks.iter() {
            let weight = check.key.weight();
            let points = if weight == 0 {
                "  -".to_string()
            } else if check.passed {
                format!("+{:>2}", weight)
            } else {
                format!(" {:>2}", 0)
            };
            println!(
                "   {} {:<18} {} {}",
                self.check_icon(check),
                check.key.label(),
                points.dimmed(),
                check.message
            );
        }
        println!();
    }

    fn print_details(&self, result: &AnalysisResult) {
        if let CheckValue::Outline(outline) = &result.checks.heading_hierarchy.value {
            if !outline.is_empty() {
                println!("   {}", "Heading outline:".bold());
                for heading in outline {
                    let indent = "  ".repeat(usize::from(heading.level.saturating_sub(1)));
                    println!("     {}{} {}", indent, heading.tag.dimmed(), heading.text);
                }
                println!();
            }
        }

        if let CheckValue::Links(links) = &result.checks.links.value {
            if !links.inactive_links.is_empty() {
                println!("   {}", "Inactive links:".bold());
                for link in &links.inactive_links {
                    let href = link.href.as_deref().unwrap_or("(no href)");
                    let text = if link.text.is_empty() {
                        "(no text)"
                    } else {
                        link.text.as_str()
                    };
                    println!("     {} {} {}", "•".yellow(), text, href.dimmed());
                }
                println!();
            }
        }

        if let CheckValue::StructuredData(report) = &result.checks.structured_data.value {
            if !report.entries.is_empty() {
                println!("   {}", "Structured data:".bold());
                for entry in &report.entries {
                    let kind = entry
                        .data
                        .get("@type")
                        .map(|t| match t {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .unwrap_or_else(|| "(untyped)".to_string());
                    println!("     {} {} {}", "•".cyan(), kind, entry.source_type.to_string().dimmed());
                }
                println!();
            }
        }
    }

    fn print_timing(&self, result: &AnalysisResult) {
        let Some(ref timing) = result.timing else {
            return;
        };

        let fmt_ms = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |ms| format!("{:.0} ms", ms));
        let mut line = format!(
            "   Timing: TTFB {} | DOMContentLoaded {} | Load {}",
            fmt_ms(timing.ttfb_ms),
            fmt_ms(timing.dom_content_loaded_ms),
            fmt_ms(timing.load_ms)
        );
        if let Some(bytes) = timing.transfer_size {
            line.push_str(&format!(" | Transfer {} B", bytes));
        }
        println!("{}", line.dimmed());
        println!();
    }

    fn print_recommendations(&self, result: &AnalysisResult) {
        if result.recommendations.is_empty() {
            return;
        }
        println!("   {}", "Recommendations:".bold());
        let shown = if self.verbose {
            result.recommendations.len()
        } else {
            5
        };
        for rec in result.recommendations.iter().take(shown) {
            println!("   {} {}", "→".cyan(), rec);
        }
        let hidden = result.recommendations.len().saturating_sub(shown);
        if hidden > 0 {
            println!("   {}", format!("... and {} more (use --verbose)", hidden).dimmed());
        }
    }

    fn print_summary(&self, stats: &AggregateStats) {
        println!();
        println!("{}", "═".repeat(60));
        println!("{}", "Summary".bold());
        println!("{}", "═".repeat(60));
        println!(
            "   Pages analyzed:  {}",
            stats.pages_analyzed.to_string().bold()
        );
        println!(
            "   Average score:   {} ({})",
            stats.average_score.to_string().bold(),
            self.colorize_label(stats.average_label)
        );
        println!(
            "   Checks passed:   {}/{}",
            stats.total_passed, stats.total_checks
        );
        println!("   Recommendations: {}", stats.total_recommendations);
        println!();
    }

    fn check_icon(&self, check: &CheckResult) -> colored::ColoredString {
        if check.passed {
            "✓".green()
        } else {
            match check.status {
                Status::NeedsWork => "✗".red(),
                _ => "⚠".yellow(),
            }
        }
    }

    fn colorize_status(&self, status: Status) -> colored::ColoredString {
        let s = status.as_str();
        match status {
            Status::Excellent => s.green(),
            Status::Good => s.yellow(),
            Status::NeedsWork => s.red(),
        }
    }

    fn colorize_label(&self, label: ScoreLabel) -> colored::ColoredString {
        let s = label.to_string();
        match label {
            ScoreLabel::Excellent => s.green().bold(),
            ScoreLabel::Good => s.green(),
            ScoreLabel::Fair => s.yellow(),
            ScoreLabel::Poor => s.red().bold(),
        }
    }

    fn create_score_bar(&self, score: u8) -> String {
        let filled = (usize::from(score.min(100)) * 20) / 100;
        let empty = 20 - filled;

        let bar = format!("[{}{}] {:>3}%", "█".repeat(filled), "░".repeat(empty), score);

        if self.use_colors {
            if score >= 80 {
                bar.green().to_string()
            } else if score >= 60 {
                bar.yellow().to_string()
            } else {
                bar.red().to_string()
            }
        } else {
            bar
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}
