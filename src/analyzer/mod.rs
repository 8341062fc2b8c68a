//! Analyzer module - page analysis engine

pub mod engine;
pub mod recommendations;
pub mod rules;
pub mod scoring;
pub mod structured_data;

pub use engine::{AggregateStats, PageAnalyzer, PageSource};
pub use scoring::ScoreCalculator;
