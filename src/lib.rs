//! seolens: On-page SEO Analyzer
//!
//! This library inspects a single HTML document for on-page SEO signals
//! (title, meta tags, headings, links, images, structured data) and produces a
//! scored report with actionable recommendations.

pub mod analyzer;
pub mod cache;
pub mod config;
pub mod history;
pub mod page;
pub mod reporter;
pub mod watcher;

pub use page::{NavigationTiming, Page, PageError, TimingMetrics};

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Three-tier verdict attached to every check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Ideal
    Excellent,
    /// Acceptable but not ideal
    Good,
    /// A problem worth fixing
    #[serde(rename = "Needs work")]
    NeedsWork,
}

impl Status {
    /// Presentation color for this status (green, yellow, red)
    pub fn color(self) -> &'static str {
        match self {
            Status::Excellent => "#22c55e",
            Status::Good => "#eab308",
            Status::NeedsWork => "#ef4444",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Excellent => "Excellent",
            Status::Good => "Good",
            Status::NeedsWork => "Needs work",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifier of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckKey {
    Title,
    Url,
    MetaDescription,
    MetaRobots,
    Canonical,
    OpenGraph,
    TwitterCard,
    Language,
    Charset,
    MobileFriendly,
    HasFavicon,
    StructuredData,
    #[serde(rename = "headings.h1")]
    H1,
    #[serde(rename = "headings.h2")]
    H2,
    HeadingHierarchy,
    Images,
    Links,
    WordCount,
}

impl CheckKey {
    /// Every check, in inspection order
    pub const ALL: [CheckKey; 18] = [
        CheckKey::Title,
        CheckKey::Url,
        CheckKey::MetaDescription,
        CheckKey::MetaRobots,
        CheckKey::Canonical,
        CheckKey::OpenGraph,
        CheckKey::TwitterCard,
        CheckKey::Language,
        CheckKey::Charset,
        CheckKey::MobileFriendly,
        CheckKey::HasFavicon,
        CheckKey::StructuredData,
        CheckKey::H1,
        CheckKey::H2,
        CheckKey::HeadingHierarchy,
        CheckKey::Images,
        CheckKey::Links,
        CheckKey::WordCount,
    ];

    /// Points added to the SEO score when this check passes.
    /// Checks with weight 0 are informational and excluded from the pass summary.
    pub fn weight(self) -> u8 {
        match self {
            CheckKey::Title
            | CheckKey::MetaDescription
            | CheckKey::HeadingHierarchy
            | CheckKey::WordCount => 10,
            CheckKey::MetaRobots
            | CheckKey::H1
            | CheckKey::H2
            | CheckKey::Images
            | CheckKey::Links
            | CheckKey::Canonical
            | CheckKey::OpenGraph
            | CheckKey::MobileFriendly
            | CheckKey::HasFavicon
            | CheckKey::StructuredData
            | CheckKey::Language
            | CheckKey::Charset => 5,
            CheckKey::Url | CheckKey::TwitterCard => 0,
        }
    }

    /// Whether this check is counted in the pass/fail summary
    pub fn is_scored(self) -> bool {
        self.weight() > 0
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CheckKey::Title => "title",
            CheckKey::Url => "url",
            CheckKey::MetaDescription => "metaDescription",
            CheckKey::MetaRobots => "metaRobots",
            CheckKey::Canonical => "canonical",
            CheckKey::OpenGraph => "openGraph",
            CheckKey::TwitterCard => "twitterCard",
            CheckKey::Language => "language",
            CheckKey::Charset => "charset",
            CheckKey::MobileFriendly => "mobileFriendly",
            CheckKey::HasFavicon => "hasFavicon",
            CheckKey::StructuredData => "structuredData",
            CheckKey::H1 => "headings.h1",
            CheckKey::H2 => "headings.h2",
            CheckKey::HeadingHierarchy => "headingHierarchy",
            CheckKey::Images => "images",
            CheckKey::Links => "links",
            CheckKey::WordCount => "wordCount",
        }
    }

    /// Human-readable label for console output
    pub fn label(self) -> &'static str {
        match self {
            CheckKey::Title => "Title",
            CheckKey::Url => "URL",
            CheckKey::MetaDescription => "Meta description",
            CheckKey::MetaRobots => "Meta robots",
            CheckKey::Canonical => "Canonical",
            CheckKey::OpenGraph => "Open Graph",
            CheckKey::TwitterCard => "Twitter Card",
            CheckKey::Language => "Language",
            CheckKey::Charset => "Charset",
            CheckKey::MobileFriendly => "Mobile viewport",
            CheckKey::HasFavicon => "Favicon",
            CheckKey::StructuredData => "Structured data",
            CheckKey::H1 => "H1 heading",
            CheckKey::H2 => "H2 headings",
            CheckKey::HeadingHierarchy => "Heading hierarchy",
            CheckKey::Images => "Images",
            CheckKey::Links => "Links",
            CheckKey::WordCount => "Word count",
        }
    }
}

impl std::fmt::Display for CheckKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict of a single field inspector
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    /// Which check produced this result
    pub key: CheckKey,
    /// Pass/fail verdict
    pub passed: bool,
    /// Severity tier
    pub status: Status,
    /// Human-readable explanation of the verdict
    pub message: String,
    /// Raw data the verdict was computed from
    pub value: CheckValue,
}

impl CheckResult {
    /// A passing, Excellent result
    pub fn pass(key: CheckKey, message: impl Into<String>, value: impl Into<CheckValue>) -> Self {
        Self {
            key,
            passed: true,
            status: Status::Excellent,
            message: message.into(),
            value: value.into(),
        }
    }

    /// A failing result with the given tier
    pub fn fail(
        key: CheckKey,
        status: Status,
        message: impl Into<String>,
        value: impl Into<CheckValue>,
    ) -> Self {
        Self {
            key,
            passed: false,
            status,
            message: message.into(),
            value: value.into(),
        }
    }

    /// Presentation color, derived from `status`
    pub fn color(&self) -> &'static str {
        self.status.color()
    }
}

// `color` is derived from `status`, so it only exists on the wire.
impl Serialize for CheckResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CheckResult", 6)?;
        state.serialize_field("key", &self.key)?;
        state.serialize_field("passed", &self.passed)?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("color", self.color())?;
        state.serialize_field("message", &self.message)?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}

/// Raw extracted data attached to a check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckValue {
    Flag(bool),
    Count(usize),
    Text(String),
    Links(LinkStats),
    Images(ImageStats),
    HeadingCounts(HeadingCounts),
    StructuredData(StructuredDataReport),
    Outline(Vec<HeadingEntry>),
    Tags(BTreeMap<String, String>),
}

impl CheckValue {
    /// Text value, or "" for non-text values
    pub fn as_text(&self) -> &str {
        match self {
            CheckValue::Text(s) => s,
            _ => "",
        }
    }

    pub fn as_count(&self) -> Option<usize> {
        match self {
            CheckValue::Count(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<bool> for CheckValue {
    fn from(v: bool) -> Self {
        CheckValue::Flag(v)
    }
}

impl From<usize> for CheckValue {
    fn from(v: usize) -> Self {
        CheckValue::Count(v)
    }
}

impl From<String> for CheckValue {
    fn from(v: String) -> Self {
        CheckValue::Text(v)
    }
}

impl From<&str> for CheckValue {
    fn from(v: &str) -> Self {
        CheckValue::Text(v.to_string())
    }
}

impl From<LinkStats> for CheckValue {
    fn from(v: LinkStats) -> Self {
        CheckValue::Links(v)
    }
}

impl From<ImageStats> for CheckValue {
    fn from(v: ImageStats) -> Self {
        CheckValue::Images(v)
    }
}

impl From<HeadingCounts> for CheckValue {
    fn from(v: HeadingCounts) -> Self {
        CheckValue::HeadingCounts(v)
    }
}

impl From<StructuredDataReport> for CheckValue {
    fn from(v: StructuredDataReport) -> Self {
        CheckValue::StructuredData(v)
    }
}

impl From<Vec<HeadingEntry>> for CheckValue {
    fn from(v: Vec<HeadingEntry>) -> Self {
        CheckValue::Outline(v)
    }
}

impl From<BTreeMap<String, String>> for CheckValue {
    fn from(v: BTreeMap<String, String>) -> Self {
        CheckValue::Tags(v)
    }
}

/// Per-level heading counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingCounts {
    pub h1: usize,
    pub h2: usize,
    pub h3: usize,
    pub h4: usize,
    pub h5: usize,
    pub h6: usize,
}

/// One heading in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingEntry {
    /// Upper-case tag name, e.g. "H2"
    pub tag: String,
    /// Heading level 1-6
    pub level: u8,
    pub text: String,
}

/// Image alt-text statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStats {
    pub total: usize,
    pub missing_alt: usize,
}

/// A link whose href goes nowhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactiveLink {
    pub text: String,
    /// Raw href attribute (None when the attribute is absent)
    pub href: Option<String>,
}

/// Link activity statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStats {
    pub total_links: usize,
    pub active_links: usize,
    pub inactive_links_count: usize,
    pub inactive_links: Vec<InactiveLink>,
}

/// Markup format a structured-data entry was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    JsonLd,
    Microdata,
    Rdfa,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::JsonLd => write!(f, "json-ld"),
            SourceType::Microdata => write!(f, "microdata"),
            SourceType::Rdfa => write!(f, "rdfa"),
        }
    }
}

/// One structured-data block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredDataEntry {
    pub source_type: SourceType,
    pub data: serde_json::Value,
}

/// All structured-data blocks found on the page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredDataReport {
    pub count: usize,
    pub entries: Vec<StructuredDataEntry>,
}

impl StructuredDataReport {
    pub fn new(entries: Vec<StructuredDataEntry>) -> Self {
        Self {
            count: entries.len(),
            entries,
        }
    }
}

/// Heading counts plus the H1 and H2 verdicts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingsReport {
    pub value: HeadingCounts,
    pub h1: CheckResult,
    pub h2: CheckResult,
}

/// One result per inspected field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageChecks {
    pub title: CheckResult,
    pub url: CheckResult,
    pub meta_description: CheckResult,
    pub meta_robots: CheckResult,
    pub canonical: CheckResult,
    pub open_graph: CheckResult,
    pub twitter_card: CheckResult,
    pub language: CheckResult,
    pub charset: CheckResult,
    pub mobile_friendly: CheckResult,
    pub has_favicon: CheckResult,
    pub structured_data: CheckResult,
    pub headings: HeadingsReport,
    pub heading_hierarchy: CheckResult,
    pub images: CheckResult,
    pub links: CheckResult,
    pub word_count: CheckResult,
}

impl PageChecks {
    /// Build the full set of checks, one call per key in inspection order
    pub fn from_fn(
        heading_counts: HeadingCounts,
        mut check: impl FnMut(CheckKey) -> CheckResult,
    ) -> Self {
        Self {
            title: check(CheckKey::Title),
            url: check(CheckKey::Url),
            meta_description: check(CheckKey::MetaDescription),
            meta_robots: check(CheckKey::MetaRobots),
            canonical: check(CheckKey::Canonical),
            open_graph: check(CheckKey::OpenGraph),
            twitter_card: check(CheckKey::TwitterCard),
            language: check(CheckKey::Language),
            charset: check(CheckKey::Charset),
            mobile_friendly: check(CheckKey::MobileFriendly),
            has_favicon: check(CheckKey::HasFavicon),
            structured_data: check(CheckKey::StructuredData),
            headings: HeadingsReport {
                value: heading_counts,
                h1: check(CheckKey::H1),
                h2: check(CheckKey::H2),
            },
            heading_hierarchy: check(CheckKey::HeadingHierarchy),
            images: check(CheckKey::Images),
            links: check(CheckKey::Links),
            word_count: check(CheckKey::WordCount),
        }
    }

    /// Look up a check by key
    pub fn get(&self, key: CheckKey) -> &CheckResult {
        match key {
            CheckKey::Title => &self.title,
            CheckKey::Url => &self.url,
            CheckKey::MetaDescription => &self.meta_description,
            CheckKey::MetaRobots => &self.meta_robots,
            CheckKey::Canonical => &self.canonical,
            CheckKey::OpenGraph => &self.open_graph,
            CheckKey::TwitterCard => &self.twitter_card,
            CheckKey::Language => &self.language,
            CheckKey::Charset => &self.charset,
            CheckKey::MobileFriendly => &self.mobile_friendly,
            CheckKey::HasFavicon => &self.has_favicon,
            CheckKey::StructuredData => &self.structured_data,
            CheckKey::H1 => &self.headings.h1,
            CheckKey::H2 => &self.headings.h2,
            CheckKey::HeadingHierarchy => &self.heading_hierarchy,
            CheckKey::Images => &self.images,
            CheckKey::Links => &self.links,
            CheckKey::WordCount => &self.word_count,
        }
    }

    /// All checks in inspection order
    pub fn iter(&self) -> impl Iterator<Item = &CheckResult> + '_ {
        CheckKey::ALL.iter().map(move |k| self.get(*k))
    }

    pub fn word_count(&self) -> usize {
        self.word_count.value.as_count().unwrap_or(0)
    }
}

/// Aggregate pass/fail tally over the scored checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassSummary {
    pub passed: usize,
    pub total_checks: usize,
    /// "passed/total"
    pub passed_out_of: String,
    /// 0-100, rounded
    pub pass_percent: u8,
    pub checks: BTreeMap<CheckKey, bool>,
    pub page_word_count: usize,
}

/// Title / description / canonical tally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaCount {
    pub ok: usize,
    pub total: usize,
}

/// Pass/fail tally over the three core metadata checks
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetaSummary {
    pub passed: bool,
    pub status: Status,
    pub value: MetaCount,
}

impl MetaSummary {
    pub const KEY: &'static str = "metadata";

    pub fn color(&self) -> &'static str {
        self.status.color()
    }
}

impl Serialize for MetaSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MetaSummary", 5)?;
        state.serialize_field("key", Self::KEY)?;
        state.serialize_field("passed", &self.passed)?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("color", self.color())?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}

/// The main result of analyzing one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Per-field verdicts
    #[serde(flatten)]
    pub checks: PageChecks,
    /// Overall score (0-100)
    pub seo_score: u8,
    /// Ordered, human-readable fixes
    pub recommendations: Vec<String>,
    pub pass_summary: PassSummary,
    pub meta_summary: MetaSummary,
    /// Navigation timing metrics, when the host supplied them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingMetrics>,
    /// Capture time
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    /// The analyzed page's URL ("" when unknown)
    pub fn page_url(&self) -> &str {
        self.checks.url.value.as_text()
    }

    pub fn score_label(&self) -> ScoreLabel {
        ScoreLabel::from_score(self.seo_score)
    }

    /// Wrap with display helpers (score color and label)
    pub fn display(&self, delta: Option<i16>) -> DisplayAnalysis<'_> {
        DisplayAnalysis {
            analysis: self,
            score_color: score_color(self.seo_score),
            score_text_color: score_text_color(self.seo_score),
            score_label: self.score_label(),
            delta,
        }
    }
}

/// Label for an overall score. Thresholds differ from the per-check tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreLabel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => ScoreLabel::Excellent,
            60..=79 => ScoreLabel::Good,
            40..=59 => ScoreLabel::Fair,
            _ => ScoreLabel::Poor,
        }
    }
}

impl std::fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreLabel::Excellent => write!(f, "Excellent"),
            ScoreLabel::Good => write!(f, "Good"),
            ScoreLabel::Fair => write!(f, "Fair"),
            ScoreLabel::Poor => write!(f, "Poor"),
        }
    }
}

/// Badge color for an overall score
pub fn score_color(score: u8) -> &'static str {
    if score >= 80 {
        "#10b981"
    } else if score >= 60 {
        "#f59e0b"
    } else {
        "#ef4444"
    }
}

/// Darker text variant of [`score_color`]
pub fn score_text_color(score: u8) -> &'static str {
    if score >= 80 {
        "#059669"
    } else if score >= 60 {
        "#d97706"
    } else {
        "#dc2626"
    }
}

/// Analysis result plus derived display fields
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayAnalysis<'a> {
    #[serde(flatten)]
    pub analysis: &'a AnalysisResult,
    pub score_color: &'static str,
    pub score_text_color: &'static str,
    pub score_label: ScoreLabel,
    /// Score change since the last recorded visit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<i16>,
}
