//! Score history - the previous score of each page URL, persisted to
//! `.seolens-history.json`

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

pub const HISTORY_FILENAME: &str = ".seolens-history.json";
/// Scores older than this are ignored and dropped
pub const DEFAULT_MAX_AGE_DAYS: u32 = 30;

/// One remembered score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub score: u8,
    /// Unix milliseconds
    pub timestamp: i64,
}

/// Previous scores keyed by normalized URL.
///
/// Entries are kept as raw JSON so a single corrupt record is dropped on
/// access instead of discarding the whole file.
#[derive(Debug)]
pub struct ScoreHistory {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
    max_age: Duration,
    dirty: bool,
}

/// Strip query and fragment; input that is not an absolute URL is returned as is
pub fn normalize_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => raw.to_string(),
    }
}

/// Find project root (directory containing a history or config file, or `.git`)
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut dir = if start.is_file() {
        start.parent()?
    } else {
        start
    };

    loop {
        if dir.join(HISTORY_FILENAME).exists()
            || dir.join(crate::config::CONFIG_FILENAME).exists()
            || dir.join(".git").exists()
        {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

impl ScoreHistory {
    /// Load history from a project root. Missing or corrupt files start empty.
    pub fn load(project_root: &Path) -> Self {
        let path = project_root.join(HISTORY_FILENAME);
        let entries = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();

        Self {
            path,
            entries,
            max_age: Duration::days(i64::from(DEFAULT_MAX_AGE_DAYS)),
            dirty: false,
        }
    }

    pub fn with_max_age_days(mut self, days: u32) -> Self {
        self.max_age = Duration::days(i64::from(days));
        self
    }

    /// Write the history if anything changed
    pub fn save(&self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let content =
            serde_json::to_string_pretty(&self.entries).context("Failed to serialize history")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write history to {}", self.path.display()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn live_entry(&self, key: &str, now: DateTime<Utc>) -> Option<HistoryEntry> {
        let entry: HistoryEntry = serde_json::from_value(self.entries.get(key)?.clone()).ok()?;
        let age = now.timestamp_millis() - entry.timestamp;
        (age <= self.max_age.num_milliseconds()).then_some(entry)
    }

    /// The last recorded score for a URL, if still fresh
    pub fn previous_score(&self, url: &str, now: DateTime<Utc>) -> Option<u8> {
        self.live_entry(&normalize_url(url), now).map(|e| e.score)
    }

    /// Record a new score and return the change since the previous one.
    ///
    /// Returns 0 when there was no fresh previous score, when the score is
    /// unchanged (nothing is written), or when the score is out of range
    /// (nothing is written). Expired and unreadable records are removed.
    pub fn record(&mut self, url: &str, score: u8, now: DateTime<Utc>) -> i16 {
        if score > 100 {
            return 0;
        }

        let key = normalize_url(url);
        let previous = self.live_entry(&key, now).map(|e| e.score);
        if previous.is_none() && self.entries.remove(&key).is_some() {
            self.dirty = true;
        }

        if previous == Some(score) {
            return 0;
        }

        let entry = HistoryEntry {
            score,
            timestamp: now.timestamp_millis(),
        };
        if let Ok(value) = serde_json::to_value(entry) {
            self.entries.insert(key, value);
            self.dirty = true;
        }

        previous.map_or(0, |prev| i16::from(score) - i16::from(prev))
    }
}

/// Format delta for console: " [was 82, down 4]", " [was 82, up 2]" or ""
pub fn format_delta(previous: Option<u8>, current: u8) -> String {
    let Some(prev) = previous else {
        return String::new();
    };
    if prev == current {
        return format!(" [unchanged at {}]", current);
    }
    let diff = i16::from(current) - i16::from(prev);
    if diff > 0 {
        format!(" [was {}, up {}]", prev, diff)
    } else {
        format!(" [was {}, down {}]", prev, -diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(i64::from(day))
    }

    // --- normalize_url ---

    #[test]
    fn normalize_url_strips_query_and_fragment() {
        assert_eq!(
            normalize_url("https://example.com/post?utm_source=x#comments"),
            "https://example.com/post"
        );
    }

    #[test]
    fn normalize_url_returns_unparsable_input() {
        assert_eq!(normalize_url("not a url"), "not a url");
        assert_eq!(normalize_url("/relative/path"), "/relative/path");
    }

    // --- format_delta ---

    #[test]
    fn format_delta_variants() {
        assert_eq!(format_delta(None, 85), "");
        assert_eq!(format_delta(Some(80), 83), " [was 80, up 3]");
        assert_eq!(format_delta(Some(90), 86), " [was 90, down 4]");
        assert_eq!(format_delta(Some(75), 75), " [unchanged at 75]");
        assert_eq!(format_delta(Some(0), 100), " [was 0, up 100]");
    }

    // --- record ---

    #[test]
    fn record_first_visit_returns_zero_and_stores() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = ScoreHistory::load(dir.path());
        assert_eq!(history.record("https://example.com/", 70, at(0)), 0);
        assert_eq!(history.previous_score("https://example.com/", at(0)), Some(70));
    }

    #[test]
    fn record_returns_signed_delta() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = ScoreHistory::load(dir.path());
        history.record("https://example.com/a", 70, at(0));
        assert_eq!(history.record("https://example.com/a?ref=1", 82, at(1)), 12);
        assert_eq!(history.record("https://example.com/a#top", 75, at(2)), -7);
    }

    #[test]
    fn record_unchanged_score_does_not_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = ScoreHistory::load(dir.path());
        history.record("https://example.com/", 70, at(0));
        history.save().unwrap();

        let mut reloaded = ScoreHistory::load(dir.path());
        assert_eq!(reloaded.record("https://example.com/", 70, at(5)), 0);
        assert!(!reloaded.dirty);
        // The original timestamp is kept, so the entry still expires from day 0
        assert_eq!(reloaded.previous_score("https://example.com/", at(31)), None);
    }

    #[test]
    fn record_ignores_expired_previous() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = ScoreHistory::load(dir.path());
        history.record("https://example.com/", 50, at(0));
        assert_eq!(history.previous_score("https://example.com/", at(30)), Some(50));
        assert_eq!(history.previous_score("https://example.com/", at(31)), None);
        assert_eq!(history.record("https://example.com/", 90, at(31)), 0);
        assert_eq!(history.previous_score("https://example.com/", at(31)), Some(90));
    }

    #[test]
    fn record_out_of_range_score_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = ScoreHistory::load(dir.path());
        assert_eq!(history.record("https://example.com/", 101, at(0)), 0);
        assert!(history.is_empty());
    }

    #[test]
    fn corrupt_entry_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(HISTORY_FILENAME),
            r#"{"https://example.com/": {"score": "high"}, "https://other.example/": {"score": 40, "timestamp": 1704067200000}}"#,
        )
        .unwrap();

        let mut history = ScoreHistory::load(dir.path());
        assert_eq!(history.len(), 2);
        assert_eq!(history.previous_score("https://other.example/", at(1)), Some(40));
        assert_eq!(history.record("https://example.com/", 60, at(1)), 0);
        assert_eq!(history.previous_score("https://example.com/", at(1)), Some(60));
    }

    #[test]
    fn custom_max_age() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = ScoreHistory::load(dir.path()).with_max_age_days(7);
        history.record("https://example.com/", 50, at(0));
        assert_eq!(history.previous_score("https://example.com/", at(8)), None);
    }

    // --- load / save ---

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = ScoreHistory::load(dir.path());
        history.record("https://example.com/", 92, at(0));
        history.save().unwrap();

        let content = fs::read_to_string(dir.path().join(HISTORY_FILENAME)).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(raw["https://example.com/"]["score"], 92);
        assert_eq!(
            raw["https://example.com/"]["timestamp"],
            at(0).timestamp_millis()
        );

        let loaded = ScoreHistory::load(dir.path());
        assert_eq!(loaded.previous_score("https://example.com/", at(1)), Some(92));
    }

    #[test]
    fn load_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(HISTORY_FILENAME), "not valid json {{{").unwrap();
        assert!(ScoreHistory::load(dir.path()).is_empty());
    }

    // --- find_project_root ---

    #[test]
    fn find_project_root_with_history_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(HISTORY_FILENAME), "{}").unwrap();
        assert_eq!(find_project_root(dir.path()).unwrap(), dir.path());
    }

    #[test]
    fn find_project_root_with_git_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let sub = dir.path().join("site");
        fs::create_dir(&sub).unwrap();
        assert_eq!(find_project_root(&sub).unwrap(), dir.path());
    }
}
