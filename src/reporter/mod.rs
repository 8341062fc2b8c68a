//! Reporter module for output formatting

pub mod console;
pub mod json;

pub use console::ConsoleReporter;
pub use json::JsonReporter;

use crate::AnalysisResult;

/// One analyzed page, as handed to the reporters
#[derive(Debug, Clone)]
pub struct PageReport {
    /// File path, "-" for stdin, or the page URL
    pub source: String,
    pub result: AnalysisResult,
    /// Last recorded score for this page, if history is enabled
    pub previous_score: Option<u8>,
}

impl PageReport {
    pub fn new(source: impl Into<String>, result: AnalysisResult) -> Self {
        Self {
            source: source.into(),
            result,
            previous_score: None,
        }
    }

    pub fn with_previous_score(mut self, previous: Option<u8>) -> Self {
        self.previous_score = previous;
        self
    }

    /// Score change since the previous visit
    pub fn delta(&self) -> Option<i16> {
        self.previous_score
            .map(|prev| i16::from(self.result.seo_score) - i16::from(prev))
    }
}
