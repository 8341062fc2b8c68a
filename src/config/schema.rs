//! Config schema and deserialization

use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Score history settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Record scores and report deltas (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Ignore previous scores older than this many days (default: 30)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_days: Option<u32>,
}

impl HistoryConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn max_age_days(&self) -> u32 {
        self.max_age_days
            .unwrap_or(crate::history::DEFAULT_MAX_AGE_DAYS)
    }
}

/// Per-path override configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverride {
    /// Glob patterns this override applies to
    pub files: Vec<String>,

    /// Optional threshold override for matched pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u8>,
}

/// Root config structure for .seolensrc.json
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Extend another config file (path relative to this config, or package name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    /// Minimum score threshold (exit 1 if below). Default: none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u8>,

    /// Glob patterns for files/directories to exclude from analysis
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Page file suffixes (default: .html, .htm)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub page_patterns: Vec<String>,

    /// URL the site root is served from; page URLs are derived from file paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default)]
    pub history: HistoryConfig,

    /// Per-path configuration overrides
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<ConfigOverride>,
}

impl Config {
    /// Merge CLI overrides into config. CLI values take precedence.
    pub fn merge_with_cli(
        mut self,
        cli_threshold: Option<u8>,
        cli_base_url: Option<&str>,
        no_history: bool,
    ) -> Self {
        if cli_threshold.is_some() {
            self.threshold = cli_threshold;
        }
        if let Some(url) = cli_base_url {
            self.base_url = Some(url.to_string());
        }
        if no_history {
            self.history.enabled = Some(false);
        }
        self
    }

    /// Get effective config for a specific page, applying overrides in order
    pub fn effective_for_file(&self, file_path: &Path) -> EffectiveConfig {
        let mut effective = EffectiveConfig {
            threshold: self.threshold,
        };

        for override_cfg in &self.overrides {
            if Self::matches_override(file_path, &override_cfg.files) {
                if let Some(threshold) = override_cfg.threshold {
                    effective.threshold = Some(threshold);
                }
            }
        }

        effective
    }

    fn matches_override(file_path: &Path, patterns: &[String]) -> bool {
        let path_str = file_path.to_string_lossy();
        patterns.iter().any(|pattern| {
            globset::Glob::new(pattern).is_ok_and(|glob| {
                glob.compile_matcher().is_match(file_path)
                    || path_str.contains(pattern.trim_start_matches("**/"))
            })
        })
    }

    /// Merge a base config into this one (for extends). This config wins.
    pub fn merge_from(&mut self, base: Config) {
        if self.threshold.is_none() {
            self.threshold = base.threshold;
        }
        if self.extends.is_none() {
            self.extends = base.extends;
        }
        if self.base_url.is_none() {
            self.base_url = base.base_url;
        }
        if self.history.enabled.is_none() {
            self.history.enabled = base.history.enabled;
        }
        if self.history.max_age_days.is_none() {
            self.history.max_age_days = base.history.max_age_days;
        }

        let mut all_ignores = base.ignore;
        all_ignores.append(&mut self.ignore);
        self.ignore = all_ignores;

        if self.page_patterns.is_empty() {
            self.page_patterns = base.page_patterns;
        }

        // Base overrides first so ours apply last
        let mut all_overrides = base.overrides;
        all_overrides.append(&mut self.overrides);
        self.overrides = all_overrides;
    }

    /// Page file suffixes
    pub fn get_page_patterns(&self) -> Vec<&str> {
        if self.page_patterns.is_empty() {
            vec![".html", ".htm"]
        } else {
            self.page_patterns.iter().map(|s| s.as_str()).collect()
        }
    }

    /// Whether a file name matches one of the page patterns
    pub fn is_page(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if path.components().any(|c| c.as_os_str() == "node_modules") {
            return false;
        }
        let name = name.to_ascii_lowercase();
        self.get_page_patterns()
            .iter()
            .any(|p| name.ends_with(&p.to_ascii_lowercase()))
    }

    /// The URL a page file is served at, derived from `baseUrl`.
    ///
    /// `blog/index.html` under `https://example.com/` maps to
    /// `https://example.com/blog/`. Returns `None` without a base URL or when
    /// the file lies outside the site root.
    pub fn page_url(&self, site_root: &Path, file_path: &Path) -> Option<Url> {
        let base = Url::parse(self.base_url.as_deref()?).ok()?;
        let relative = file_path.strip_prefix(site_root).ok()?;

        let mut segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if segments
            .last()
            .is_some_and(|last| last.eq_ignore_ascii_case("index.html"))
        {
            segments.pop();
            segments.push(String::new());
        }

        let base = if base.path().ends_with('/') {
            base
        } else {
            Url::parse(&format!("{}/", base.as_str())).ok()?
        };
        base.join(&segments.join("/")).ok()
    }
}

/// Effective configuration for a specific page (after applying overrides)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub threshold: Option<u8>,
}
