//! Analysis result caching
//!
//! [`LatestAnalysis`] holds the most recent result for a session.
//! [`AnalysisCache`] persists results keyed by page content hash so unchanged
//! pages are not re-analyzed.

use crate::AnalysisResult;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

const CACHE_VERSION: u32 = 1;
pub const CACHE_FILENAME: &str = ".seolens-cache.json";

/// The most recent analysis, shared between the producer and any readers.
///
/// Owned by the caller; the analyzer itself never retains results. Concurrent
/// stores are last-writer-wins.
#[derive(Debug, Default)]
pub struct LatestAnalysis {
    slot: RwLock<Option<Arc<AnalysisResult>>>,
}

impl LatestAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored result, returning a shared handle to it
    pub fn store(&self, result: AnalysisResult) -> Arc<AnalysisResult> {
        let result = Arc::new(result);
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::clone(&result));
        result
    }

    pub fn latest(&self) -> Option<Arc<AnalysisResult>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Cache entry for a single page
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    /// SHA256 of the HTML and the URL it was analyzed under
    content_hash: String,
    result: AnalysisResult,
    /// Unix seconds
    cached_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheData {
    version: u32,
    /// Page path to entry
    entries: HashMap<String, CacheEntry>,
}

impl Default for CacheData {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// On-disk cache of analysis results
pub struct AnalysisCache {
    cache_path: PathBuf,
    data: CacheData,
    dirty: bool,
    enabled: bool,
}

impl AnalysisCache {
    /// Open (or start) the cache in a project root
    pub fn new(project_root: &Path) -> Self {
        let cache_path = project_root.join(CACHE_FILENAME);
        let data = Self::load_cache(&cache_path).unwrap_or_default();

        Self {
            cache_path,
            data,
            dirty: false,
            enabled: true,
        }
    }

    /// Create a disabled cache (no-op)
    pub fn disabled() -> Self {
        Self {
            cache_path: PathBuf::new(),
            data: CacheData::default(),
            dirty: false,
            enabled: false,
        }
    }

    // Corrupt files and other versions start empty.
    fn load_cache(path: &Path) -> Option<CacheData> {
        let content = fs::read_to_string(path).ok()?;
        let data: CacheData = serde_json::from_str(&content).ok()?;
        (data.version == CACHE_VERSION).then_some(data)
    }

    /// Write the cache to disk if anything changed
    pub fn save(&self) -> Result<()> {
        if !self.enabled || !self.dirty {
            return Ok(());
        }

        let content =
            serde_json::to_string_pretty(&self.data).context("Failed to serialize cache")?;
        fs::write(&self.cache_path, content)
            .with_context(|| format!("Failed to write cache to {}", self.cache_path.display()))?;

        Ok(())
    }

    fn hash_content(html: &str, url: Option<&str>) -> String {
        let mut hasher = Sha256::new();
        // Results from another release may score differently
        hasher.update(env!("CARGO_PKG_VERSION").as_bytes());
        hasher.update([0u8]);
        hasher.update(html.as_bytes());
        // Separator keeps ("ab", "c") and ("a", "bc") apart
        hasher.update([0u8]);
        hasher.update(url.unwrap_or_default().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Cached result if the page content and URL are unchanged.
    ///
    /// A hit stands in for a fresh analysis, so it carries the current time.
    pub fn get(&self, page_path: &Path, html: &str, url: Option<&str>) -> Option<AnalysisResult> {
        if !self.enabled {
            return None;
        }

        let key = page_path.to_string_lossy();
        let entry = self.data.entries.get(key.as_ref())?;
        if entry.content_hash != Self::hash_content(html, url) {
            return None;
        }
        Some(AnalysisResult {
            timestamp: Utc::now(),
            ..entry.result.clone()
        })
    }

    /// Store an analysis result
    pub fn set(&mut self, page_path: &Path, html: &str, url: Option<&str>, result: AnalysisResult) {
        if !self.enabled {
            return;
        }

        let entry = CacheEntry {
            content_hash: Self::hash_content(html, url),
            result,
            cached_at: SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        };

        self.data
            .entries
            .insert(page_path.to_string_lossy().to_string(), entry);
        self.dirty = true;
    }

    /// Drop entries for pages that no longer exist
    pub fn cleanup(&mut self, existing_pages: &[PathBuf]) {
        if !self.enabled {
            return;
        }

        let existing: HashSet<String> = existing_pages
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect();

        let before = self.data.entries.len();
        self.data.entries.retain(|k, _| existing.contains(k));
        self.dirty |= self.data.entries.len() != before;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.data.entries.len(),
            enabled: self.enabled,
        }
    }

    /// Clear all cached entries
    pub fn clear(&mut self) {
        self.data.entries.clear();
        self.dirty = true;
    }
}

/// Cache statistics
#[derive(Debug)]
pub struct CacheStats {
    pub entries: usize,
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::PageAnalyzer;

    fn make_result(html: &str) -> AnalysisResult {
        PageAnalyzer::new().analyze_html(html, None)
    }

    const PAGE: &str = "<title>Cached page title</title><h1>Hi</h1>";

    #[test]
    fn test_hash_content() {
        let a = AnalysisCache::hash_content("<p>x</p>", None);
        assert_eq!(a, AnalysisCache::hash_content("<p>x</p>", None));
        assert_ne!(a, AnalysisCache::hash_content("<p>y</p>", None));
        assert_ne!(a, AnalysisCache::hash_content("<p>x</p>", Some("https://a.example/")));
        assert_ne!(
            AnalysisCache::hash_content("ab", Some("c")),
            AnalysisCache::hash_content("a", Some("bc"))
        );
    }

    #[test]
    fn test_latest_analysis_store_and_clear() {
        let latest = LatestAnalysis::new();
        assert!(latest.latest().is_none());

        let stored = latest.store(make_result(PAGE));
        let read = latest.latest().unwrap();
        assert!(Arc::ptr_eq(&stored, &read));

        latest.store(make_result(""));
        assert_eq!(latest.latest().unwrap().seo_score, 5);

        latest.clear();
        assert!(latest.latest().is_none());
    }

    #[test]
    fn test_latest_analysis_last_writer_wins_across_threads() {
        let latest = Arc::new(LatestAnalysis::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let latest = Arc::clone(&latest);
                std::thread::spawn(move || {
                    latest.store(make_result(PAGE));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(latest.latest().is_some());
    }

    #[test]
    fn test_cache_disabled() {
        let mut cache = AnalysisCache::disabled();
        cache.set(Path::new("index.html"), PAGE, None, make_result(PAGE));
        assert!(cache.get(Path::new("index.html"), PAGE, None).is_none());
        assert!(!cache.dirty, "disabled cache should not become dirty");
        assert!(!cache.stats().enabled);
    }

    #[test]
    fn test_cache_hit_and_miss() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut cache = AnalysisCache::new(dir.path());
        let result = make_result(PAGE);

        cache.set(Path::new("index.html"), PAGE, None, result.clone());
        assert!(cache.dirty);

        let hit = cache.get(Path::new("index.html"), PAGE, None).unwrap();
        assert_eq!(hit.seo_score, result.seo_score);
        assert_eq!(hit.checks, result.checks);
        assert!(hit.timestamp >= result.timestamp);
        assert!(cache
            .get(Path::new("index.html"), "<title>Changed</title>", None)
            .is_none());
        assert!(cache
            .get(Path::new("index.html"), PAGE, Some("https://example.com/"))
            .is_none());
    }

    #[test]
    fn test_cache_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        {
            let mut cache = AnalysisCache::new(dir.path());
            cache.set(Path::new("index.html"), PAGE, None, make_result(PAGE));
            cache.save().unwrap();
        }

        let cache = AnalysisCache::new(dir.path());
        let cached = cache.get(Path::new("index.html"), PAGE, None);
        assert_eq!(cached.map(|r| r.seo_score), Some(make_result(PAGE).seo_score));
    }

    #[test]
    fn test_hash_depends_on_release() {
        let mut hasher = Sha256::new();
        hasher.update(b"<p>x</p>");
        hasher.update([0u8]);
        let unversioned = hex::encode(hasher.finalize());
        assert_ne!(AnalysisCache::hash_content("<p>x</p>", None), unversioned);
    }

    #[test]
    fn test_corrupt_cache_starts_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join(CACHE_FILENAME), "{ not json").unwrap();
        assert_eq!(AnalysisCache::new(dir.path()).stats().entries, 0);

        fs::write(
            dir.path().join(CACHE_FILENAME),
            r#"{"version": 999, "entries": {}}"#,
        )
        .unwrap();
        assert_eq!(AnalysisCache::new(dir.path()).stats().entries, 0);
    }

    #[test]
    fn test_cache_clear_and_cleanup() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut cache = AnalysisCache::new(dir.path());
        cache.set(Path::new("a.html"), "a", None, make_result("a"));
        cache.set(Path::new("b.html"), "b", None, make_result("b"));
        assert_eq!(cache.stats().entries, 2);

        cache.cleanup(&[PathBuf::from("a.html")]);
        assert_eq!(cache.stats().entries, 1);
        assert!(cache.get(Path::new("a.html"), "a", None).is_some());

        cache.clear();
        assert_eq!(cache.stats().entries, 0);
    }
}
