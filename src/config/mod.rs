//! Configuration loading for seolens

mod schema;

pub use schema::{Config, ConfigOverride, EffectiveConfig, HistoryConfig};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".seolensrc.json";

/// Find and load config file with extends resolution. Searches current directory then parents.
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            work_dir.join(p)
        };
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        Some(path)
    } else {
        find_config_in_parents(work_dir)
    };

    match path {
        Some(path) => load_config_with_extends(&path, &mut HashSet::new()),
        None => Ok(Config::default()),
    }
}

/// Load a config file and resolve its extends chain
fn load_config_with_extends(config_path: &Path, visited: &mut HashSet<PathBuf>) -> Result<Config> {
    let canonical = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());
    if !visited.insert(canonical) {
        anyhow::bail!(
            "Circular extends detected in config: {}",
            config_path.display()
        );
    }

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let mut config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config: {}", config_path.display()))?;

    if let Some(extends) = config.extends.take() {
        let base_config = resolve_extends(config_path, &extends, visited)?;
        config.merge_from(base_config);
    }

    Ok(config)
}

fn resolve_extends(
    config_path: &Path,
    extends: &str,
    visited: &mut HashSet<PathBuf>,
) -> Result<Config> {
    let config_dir = config_path.parent().unwrap_or(Path::new("."));

    let extends_path = if extends.starts_with("./") || extends.starts_with("../") {
        config_dir.join(extends)
    } else if Path::new(extends).is_absolute() {
        PathBuf::from(extends)
    } else {
        // A shared package such as "@acme/seo-config", else a plain relative path
        find_node_modules_config(config_dir, extends).unwrap_or_else(|| config_dir.join(extends))
    };

    let extends_path = if extends_path.extension().is_none() {
        extends_path.with_extension("json")
    } else {
        extends_path
    };

    if !extends_path.exists() {
        anyhow::bail!(
            "Extended config not found: {} (referenced from {})",
            extends_path.display(),
            config_path.display()
        );
    }

    load_config_with_extends(&extends_path, visited)
}

/// Look for a shared config package in node_modules (static-site toolchains ship them)
fn find_node_modules_config(start_dir: &Path, package: &str) -> Option<PathBuf> {
    let mut dir = start_dir;
    loop {
        let package_dir = dir.join("node_modules").join(package);
        for filename in [CONFIG_FILENAME, "seolens.config.json", "index.json"] {
            let candidate = package_dir.join(filename);
            if candidate.exists() {
                return Some(candidate);
            }
        }

        let direct = dir.join("node_modules").join(format!("{}.json", package));
        if direct.exists() {
            return Some(direct);
        }

        dir = dir.parent()?;
    }
}

/// Search for .seolensrc.json in directory and its parents
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.exists())
}

/// Build a GlobSet from ignore patterns for path matching
pub fn build_ignore_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).with_context(|| format!("Invalid ignore pattern: {}", pattern))?;
        builder.add(glob);
    }
    builder.build().context("Failed to build ignore patterns")
}

/// Check if a path should be ignored based on config glob patterns
pub fn is_ignored(path: &Path, ignore_set: &GlobSet) -> bool {
    ignore_set.is_match(path)
}

/// Default config written by `seolens init`
pub fn default_config(threshold: u8, base_url: Option<String>) -> Config {
    Config {
        threshold: Some(threshold),
        ignore: vec![
            "**/node_modules/**".to_string(),
            "**/drafts/**".to_string(),
        ],
        page_patterns: vec![".html".to_string(), ".htm".to_string()],
        base_url,
        history: HistoryConfig {
            enabled: Some(true),
            max_age_days: Some(crate::history::DEFAULT_MAX_AGE_DAYS),
        },
        overrides: vec![ConfigOverride {
            files: vec!["**/legacy/**".to_string()],
            threshold: Some(threshold.saturating_sub(20)),
        }],
        ..Config::default()
    }
}
