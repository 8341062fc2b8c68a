//! Navigation timing supplied by the host (a `PerformanceNavigationTiming` entry)

use super::PageError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Raw navigation timing entry. All timestamps are milliseconds relative to `startTime`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigationTiming {
    pub start_time: Option<f64>,
    pub response_start: Option<f64>,
    pub dom_content_loaded_event_end: Option<f64>,
    pub load_event_end: Option<f64>,
    pub transfer_size: Option<u64>,
}

/// Derived page-load metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingMetrics {
    /// Time to first byte
    pub ttfb_ms: Option<f64>,
    pub dom_content_loaded_ms: Option<f64>,
    pub load_ms: Option<f64>,
    pub transfer_size: Option<u64>,
}

impl NavigationTiming {
    /// Parse a timing entry from JSON text
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load a timing entry from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, PageError> {
        let content = fs::read_to_string(path).map_err(|source| PageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| PageError::Timing {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Compute metrics. An unreported (zero) or inconsistent mark yields `None`.
    pub fn metrics(&self) -> TimingMetrics {
        let start = self.start_time.unwrap_or(0.0);
        let since_start = |mark: Option<f64>| {
            mark.filter(|m| m.is_finite() && *m > 0.0 && *m >= start)
                .map(|m| m - start)
        };
        TimingMetrics {
            ttfb_ms: since_start(self.response_start),
            dom_content_loaded_ms: since_start(self.dom_content_loaded_event_end),
            load_ms: since_start(self.load_event_end),
            transfer_size: self.transfer_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_from_browser_entry() {
        let timing = NavigationTiming::from_json(
            r#"{"startTime":0,"responseStart":120.5,"domContentLoadedEventEnd":850,"loadEventEnd":1400,"transferSize":20480,"name":"https://example.com/"}"#,
        )
        .unwrap();
        let m = timing.metrics();
        assert_eq!(m.ttfb_ms, Some(120.5));
        assert_eq!(m.dom_content_loaded_ms, Some(850.0));
        assert_eq!(m.load_ms, Some(1400.0));
        assert_eq!(m.transfer_size, Some(20480));
    }

    #[test]
    fn test_unfinished_load_is_none() {
        // loadEventEnd is 0 while the load event has not fired yet
        let timing = NavigationTiming::from_json(r#"{"responseStart":80,"loadEventEnd":0}"#).unwrap();
        let m = timing.metrics();
        assert_eq!(m.ttfb_ms, Some(80.0));
        assert_eq!(m.load_ms, None);
        assert_eq!(m.dom_content_loaded_ms, None);
    }

    #[test]
    fn test_mark_before_start_is_none() {
        let timing = NavigationTiming {
            start_time: Some(100.0),
            response_start: Some(50.0),
            ..NavigationTiming::default()
        };
        assert_eq!(timing.metrics().ttfb_ms, None);
    }

    #[test]
    fn test_from_file_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timing.json");
        std::fs::write(&path, "{ nope").unwrap();
        let err = NavigationTiming::from_file(&path).unwrap_err();
        assert!(matches!(err, PageError::Timing { .. }));
    }
}
