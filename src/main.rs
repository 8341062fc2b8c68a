//! seolens: On-page SEO Analyzer CLI

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use seolens::analyzer::{PageAnalyzer, PageSource};
use seolens::cache::{AnalysisCache, LatestAnalysis};
use seolens::config::{build_ignore_set, default_config, is_ignored, load_config, Config, CONFIG_FILENAME};
use seolens::history::{find_project_root, ScoreHistory};
use seolens::page::parse_url;
use seolens::reporter::{ConsoleReporter, JsonReporter, PageReport};
use seolens::watcher::PageWatcher;
use seolens::{AnalysisResult, NavigationTiming, Page};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use url::Url;
use walkdir::WalkDir;

/// seolens: On-page SEO Analyzer for HTML documents
#[derive(Parser, Debug)]
#[command(name = "seolens")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// HTML file or directory to analyze, or "-" for stdin
    #[arg(required = true)]
    path: Option<PathBuf>,

    /// URL the page is served at (single page only)
    #[arg(long)]
    url: Option<String>,

    /// Navigation timing JSON for the page (single page only)
    #[arg(long, value_name = "FILE")]
    timing: Option<PathBuf>,

    /// Output format as JSON
    #[arg(long, short)]
    json: bool,

    /// Minimum score threshold (exit 1 if below)
    #[arg(long, short)]
    threshold: Option<u8>,

    /// Quiet mode (minimal output)
    #[arg(long, short)]
    quiet: bool,

    /// Verbose output
    #[arg(long, short)]
    verbose: bool,

    /// Path to config file (default: search .seolensrc.json in current dir and parents)
    #[arg(long)]
    config: Option<PathBuf>,

    /// URL the project root is served from; overrides the config's baseUrl
    #[arg(long)]
    base_url: Option<String>,

    /// Watch for file changes and re-analyze
    #[arg(long)]
    watch: bool,

    /// Disable caching (re-analyze all pages even if unchanged)
    #[arg(long)]
    no_cache: bool,

    /// Clear the analysis cache before running
    #[arg(long)]
    clear_cache: bool,

    /// Do not read or record score history
    #[arg(long)]
    no_history: bool,

    /// Run analysis in parallel (default for directories with many pages)
    #[arg(long)]
    parallel: bool,

    /// Number of parallel threads (default: number of CPU cores)
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create .seolensrc.json with sensible defaults
    Init {
        /// Minimum score threshold (e.g. 70)
        #[arg(long)]
        threshold: Option<u8>,

        /// URL the site is served from
        #[arg(long)]
        base_url: Option<String>,

        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

/// One analyzed page before history is applied
struct Analyzed {
    source: String,
    result: AnalysisResult,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();

    if let Some(Commands::Init {
        threshold,
        base_url,
        dir,
    }) = &args.command
    {
        return run_init(*threshold, base_url.clone(), dir.as_deref());
    }

    let Some(path) = args.path.clone() else {
        anyhow::bail!("A page path is required");
    };

    if path.as_os_str() == "-" {
        return run_stdin(&args);
    }

    if args.watch {
        return run_watch(&args, &path);
    }

    let work_dir = work_dir_for(&path);
    let config = load_config(work_dir, args.config.as_deref())?.merge_with_cli(
        args.threshold,
        args.base_url.as_deref(),
        args.no_history,
    );

    let ignore_set = if config.ignore.is_empty() {
        None
    } else {
        Some(build_ignore_set(&config.ignore)?)
    };

    let pages = collect_pages(&path, ignore_set.as_ref(), &config)?;
    if pages.is_empty() {
        eprintln!("{}: No pages found", "Warning".yellow());
        return Ok(ExitCode::from(2));
    }
    if pages.len() > 1 && (args.url.is_some() || args.timing.is_some()) {
        anyhow::bail!("--url and --timing only apply to a single page");
    }

    let project_root = find_project_root(work_dir).unwrap_or_else(|| work_dir.to_path_buf());
    let cli_url = args.url.as_deref().map(parse_url).transpose()?;
    let sources: Vec<PageSource> = pages
        .iter()
        .map(|p| {
            let url = cli_url
                .clone()
                .or_else(|| config.page_url(&project_root, p))
                .or_else(|| file_url(p));
            PageSource::new(p.clone(), url)
        })
        .collect();

    let mut cache = if args.no_cache || args.timing.is_some() {
        AnalysisCache::disabled()
    } else {
        AnalysisCache::new(&project_root)
    };

    if args.clear_cache {
        cache.clear();
        if !args.quiet {
            eprintln!("{}: Cache cleared", "Info".blue());
        }
    }

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let analyzer = PageAnalyzer::new();
    let use_parallel = args.parallel || sources.len() > 10;

    let (results, had_errors) = if let Some(ref timing_path) = args.timing {
        let timing = NavigationTiming::from_file(timing_path)?;
        let source = &sources[0];
        let page = Page::from_file(&source.path, source.url.clone())?.with_timing(timing);
        (vec![analyzed_file(source, analyzer.analyze(&page))], false)
    } else if use_parallel && !args.no_cache {
        analyze_pages_parallel_cached(&analyzer, &sources, &mut cache, args.quiet)
    } else if use_parallel {
        analyze_pages_parallel(&analyzer, &sources, args.quiet)
    } else {
        analyze_pages_sequential_cached(&analyzer, &sources, &mut cache, args.quiet)
    };

    // A full-site run knows every page, so stale entries can go
    if path.is_dir() && path == project_root {
        cache.cleanup(&pages);
    }
    if let Err(e) = cache.save() {
        if !args.quiet {
            eprintln!("{}: Failed to save cache: {}", "Warning".yellow(), e);
        }
    }

    if results.is_empty() {
        eprintln!("{}: All pages failed to analyze", "Error".red());
        return Ok(ExitCode::from(2));
    }

    let reports = apply_history(results, &config, &project_root, args.quiet);
    output(&args, &reports);

    if below_threshold(&args, &config, &reports) {
        Ok(ExitCode::from(1))
    } else if had_errors {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Analyze HTML piped on stdin
fn run_stdin(args: &Args) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let config = load_config(&cwd, args.config.as_deref())?.merge_with_cli(
        args.threshold,
        args.base_url.as_deref(),
        args.no_history,
    );

    let url = args.url.as_deref().map(parse_url).transpose()?;
    let mut page = Page::from_reader(std::io::stdin().lock(), url)?;
    if let Some(ref timing_path) = args.timing {
        page = page.with_timing(NavigationTiming::from_file(timing_path)?);
    }

    let result = PageAnalyzer::new().analyze(&page);
    let analyzed = Analyzed {
        source: "-".to_string(),
        result,
    };

    let project_root = find_project_root(&cwd).unwrap_or(cwd);
    let reports = apply_history(vec![analyzed], &config, &project_root, args.quiet);
    output(args, &reports);
    if below_threshold(args, &config, &reports) {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn run_init(threshold: Option<u8>, base_url: Option<String>, dir: Option<&Path>) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let dir = dir.unwrap_or(&cwd);
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "{}: {} already exists; use --dir to write elsewhere or remove it first",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(ref url) = base_url {
        parse_url(url)?;
    }

    let threshold_value = threshold.unwrap_or(70);
    let config = default_config(threshold_value, base_url);
    let json = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;

    std::fs::write(&config_path, format!("{}\n", json))
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!(
        "{}: Created {} with threshold={}",
        "Done".green().bold(),
        config_path.display(),
        threshold_value
    );
    Ok(ExitCode::SUCCESS)
}

fn run_watch(args: &Args, path: &Path) -> Result<ExitCode> {
    let work_dir = work_dir_for(path);
    let config = load_config(work_dir, args.config.as_deref())?.merge_with_cli(
        args.threshold,
        args.base_url.as_deref(),
        args.no_history,
    );
    let ignore_set = if config.ignore.is_empty() {
        None
    } else {
        Some(build_ignore_set(&config.ignore)?)
    };
    let project_root = find_project_root(work_dir).unwrap_or_else(|| work_dir.to_path_buf());

    let analyzer = PageAnalyzer::new();
    let latest = LatestAnalysis::new();
    let watcher =
        PageWatcher::watch(path, config.clone()).context("Failed to create file watcher")?;
    eprintln!("{}: Watching for changes... (Ctrl+C to stop)", "Info".blue());

    loop {
        let paths = watcher.next_changes(Duration::from_secs(3600));
        let changed = paths.into_iter().filter(|p| {
            ignore_set
                .as_ref()
                .map(|set| !is_ignored(p, set))
                .unwrap_or(true)
        });

        for page_path in changed {
            let url = config
                .page_url(&project_root, &page_path)
                .or_else(|| file_url(&page_path));
            match analyzer.analyze_file(&page_path, url) {
                Ok(result) => {
                    let source = page_path.display().to_string();
                    // Same page as last time: show the change since that run
                    let previous = latest
                        .latest()
                        .filter(|prev| prev.page_url() == result.page_url())
                        .map(|prev| prev.seo_score);
                    let stored = latest.store(result);
                    let report =
                        PageReport::new(source, (*stored).clone()).with_previous_score(previous);
                    if args.quiet {
                        ConsoleReporter::new().report_quiet(&report);
                    } else {
                        ConsoleReporter::new().report(&report);
                    }
                }
                Err(e) => {
                    eprintln!("{}: {}: {:#}", "Error".red(), page_path.display(), e);
                }
            }
        }
    }
}

fn work_dir_for(path: &Path) -> &Path {
    if path.is_file() {
        path.parent().unwrap_or(Path::new("."))
    } else {
        path
    }
}

/// `file://` URL of a page, used when no served URL is known
fn file_url(path: &Path) -> Option<Url> {
    let absolute = std::fs::canonicalize(path).ok()?;
    Url::from_file_path(absolute).ok()
}

fn collect_pages(
    path: &Path,
    ignore_set: Option<&globset::GlobSet>,
    config: &Config,
) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        if let Some(set) = ignore_set {
            if is_ignored(path, set) {
                return Ok(vec![]);
            }
        }
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.is_dir() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let file_path = entry.path();
        if entry.file_type().is_file() && config.is_page(file_path) {
            if let Some(set) = ignore_set {
                if is_ignored(file_path, set) {
                    continue;
                }
            }
            files.push(file_path.to_path_buf());
        }
    }

    files.sort();

    Ok(files)
}

fn read_page(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to load page {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn analyzed_file(source: &PageSource, result: AnalysisResult) -> Analyzed {
    Analyzed {
        source: source.path.display().to_string(),
        result,
    }
}

fn report_failure(source: &PageSource, e: &anyhow::Error, quiet: bool) {
    if !quiet {
        eprintln!(
            "{}: Failed to analyze {}: {:#}",
            "Error".red(),
            source.path.display(),
            e
        );
    }
}

fn report_cache_hits(hits: usize, total: usize, quiet: bool) {
    if !quiet && hits > 0 {
        eprintln!(
            "{}: {} pages from cache, {} analyzed",
            "Cache".blue(),
            hits,
            total - hits
        );
    }
}

/// Analyze pages sequentially with caching
fn analyze_pages_sequential_cached(
    analyzer: &PageAnalyzer,
    sources: &[PageSource],
    cache: &mut AnalysisCache,
    quiet: bool,
) -> (Vec<Analyzed>, bool) {
    let mut results = Vec::new();
    let mut had_errors = false;
    let mut cache_hits = 0;

    for source in sources {
        let html = match read_page(&source.path) {
            Ok(html) => html,
            Err(e) => {
                report_failure(source, &e, quiet);
                had_errors = true;
                continue;
            }
        };
        let url = source.url.as_ref().map(Url::as_str);

        if let Some(cached) = cache.get(&source.path, &html, url) {
            results.push(analyzed_file(source, cached));
            cache_hits += 1;
            continue;
        }

        let result = analyzer.analyze_html(&html, source.url.clone());
        cache.set(&source.path, &html, url, result.clone());
        results.push(analyzed_file(source, result));
    }

    report_cache_hits(cache_hits, sources.len(), quiet);
    (results, had_errors)
}

/// Analyze pages in parallel without caching
fn analyze_pages_parallel(
    analyzer: &PageAnalyzer,
    sources: &[PageSource],
    quiet: bool,
) -> (Vec<Analyzed>, bool) {
    let mut results = Vec::new();
    let mut had_errors = false;

    for (source, outcome) in sources.iter().zip(analyzer.analyze_parallel(sources)) {
        match outcome {
            Ok(result) => results.push(analyzed_file(source, result)),
            Err(e) => {
                report_failure(source, &e, quiet);
                had_errors = true;
            }
        }
    }

    (results, had_errors)
}

/// Analyze pages in parallel; cache lookups run concurrently, new entries are
/// stored afterwards
fn analyze_pages_parallel_cached(
    analyzer: &PageAnalyzer,
    sources: &[PageSource],
    cache: &mut AnalysisCache,
    quiet: bool,
) -> (Vec<Analyzed>, bool) {
    use rayon::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    let cache_hits = AtomicUsize::new(0);
    let shared: &AnalysisCache = cache;

    let outcomes: Vec<(Result<(String, AnalysisResult)>, bool)> = sources
        .par_iter()
        .map(|source| {
            let html = match read_page(&source.path) {
                Ok(html) => html,
                Err(e) => return (Err(e), false),
            };
            let url = source.url.as_ref().map(Url::as_str);
            if let Some(cached) = shared.get(&source.path, &html, url) {
                cache_hits.fetch_add(1, Ordering::Relaxed);
                return (Ok((html, cached)), true);
            }
            let result = analyzer.analyze_html(&html, source.url.clone());
            (Ok((html, result)), false)
        })
        .collect();

    let mut results = Vec::new();
    let mut had_errors = false;

    for (source, (outcome, from_cache)) in sources.iter().zip(outcomes) {
        match outcome {
            Ok((html, result)) => {
                if !from_cache {
                    let url = source.url.as_ref().map(Url::as_str);
                    cache.set(&source.path, &html, url, result.clone());
                }
                results.push(analyzed_file(source, result));
            }
            Err(e) => {
                report_failure(source, &e, quiet);
                had_errors = true;
            }
        }
    }

    report_cache_hits(cache_hits.load(Ordering::Relaxed), sources.len(), quiet);
    (results, had_errors)
}

/// Look up each page's previous score and record the new one
fn apply_history(
    analyzed: Vec<Analyzed>,
    config: &Config,
    project_root: &Path,
    quiet: bool,
) -> Vec<PageReport> {
    if !config.history.is_enabled() {
        return analyzed
            .into_iter()
            .map(|a| PageReport::new(a.source, a.result))
            .collect();
    }

    let now = Utc::now();
    let mut history =
        ScoreHistory::load(project_root).with_max_age_days(config.history.max_age_days());

    let reports = analyzed
        .into_iter()
        .map(|a| {
            let url = a.result.page_url().to_string();
            if url.is_empty() {
                return PageReport::new(a.source, a.result);
            }
            let previous = history.previous_score(&url, now);
            history.record(&url, a.result.seo_score, now);
            PageReport::new(a.source, a.result).with_previous_score(previous)
        })
        .collect();

    if let Err(e) = history.save() {
        if !quiet {
            eprintln!("{}: Failed to save history: {}", "Warning".yellow(), e);
        }
    }

    reports
}

fn output(args: &Args, reports: &[PageReport]) {
    let results: Vec<AnalysisResult> = reports.iter().map(|r| r.result.clone()).collect();
    let stats = PageAnalyzer::aggregate_stats(&results);

    if args.json {
        let reporter = JsonReporter::new().pretty();
        if reports.len() == 1 {
            println!("{}", reporter.report(&reports[0]));
        } else {
            println!("{}", reporter.report_with_summary(reports, &stats));
        }
    } else if args.quiet {
        let reporter = ConsoleReporter::new();
        for report in reports {
            reporter.report_quiet(report);
        }
    } else {
        let mut reporter = ConsoleReporter::new();
        if args.verbose {
            reporter = reporter.verbose();
        }

        if reports.len() == 1 {
            reporter.report(&reports[0]);
        } else {
            reporter.report_many(reports, &stats);
        }
    }
}

/// Whether any page scores below its effective threshold
fn below_threshold(args: &Args, config: &Config, reports: &[PageReport]) -> bool {
    let mut failed = false;

    for (report, path) in reports.iter().map(|r| (r, Path::new(&r.source))) {
        let threshold = if report.source == "-" {
            config.threshold
        } else {
            config.effective_for_file(path).threshold
        };
        let Some(threshold) = threshold else {
            continue;
        };

        let score = report.result.seo_score;
        if score < threshold {
            failed = true;
            if !args.quiet && !args.json {
                eprintln!(
                    "\n{}: {} scored {}, below threshold {}",
                    "Failed".red().bold(),
                    report.source,
                    score,
                    threshold
                );
            }
        }
    }

    failed
}
