//! Structured data extraction: JSON-LD, Microdata, and RDFa.
//!
//! The three sources are scanned independently and their blocks concatenated
//! in that order. Malformed JSON-LD contributes nothing.

use crate::page::{element_text, StaticSelector};
use crate::{
    CheckKey, CheckResult, Page, SourceType, Status, StructuredDataEntry, StructuredDataReport,
};
use scraper::ElementRef;
use serde_json::{Map, Value};

static JSON_LD: StaticSelector = StaticSelector::new(r#"script[type="application/ld+json"]"#);
static ITEMSCOPE: StaticSelector = StaticSelector::new("[itemscope]");
static TYPEOF: StaticSelector = StaticSelector::new("[typeof]");

/// All structured-data blocks on the page
pub fn extract(page: &Page) -> Vec<StructuredDataEntry> {
    let mut entries = json_ld(page);
    entries.extend(microdata(page));
    entries.extend(rdfa(page));
    entries
}

pub fn check(page: &Page) -> CheckResult {
    let report = StructuredDataReport::new(extract(page));
    match report.count {
        0 => CheckResult::fail(
            CheckKey::StructuredData,
            Status::NeedsWork,
            "No structured data found.",
            report,
        ),
        n => {
            let message = format!(
                "Found {} structured data block{}.",
                n,
                if n == 1 { "" } else { "s" }
            );
            CheckResult::pass(CheckKey::StructuredData, message, report)
        }
    }
}

/// Blocks from `<script type="application/ld+json">`
pub fn json_ld(page: &Page) -> Vec<StructuredDataEntry> {
    page.select(&JSON_LD)
        .iter()
        .filter_map(|script| {
            let source = script.text().collect::<String>();
            serde_json::from_str::<Value>(source.trim()).ok()
        })
        .flat_map(flatten_json_ld)
        .map(|data| StructuredDataEntry {
            source_type: SourceType::JsonLd,
            data,
        })
        .collect()
}

/// Split one parsed JSON-LD document into entities.
///
/// Arrays yield their elements, an object with an `@graph` array yields the
/// graph members, `null` yields nothing, and anything else is one entity.
pub fn flatten_json_ld(value: Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("@graph") {
            Some(Value::Array(graph)) => graph,
            Some(other) => {
                object.insert("@graph".to_string(), other);
                vec![Value::Object(object)]
            }
            None => vec![Value::Object(object)],
        },
        other => vec![other],
    }
}

/// One block per `itemscope` element
pub fn microdata(page: &Page) -> Vec<StructuredDataEntry> {
    page.select(&ITEMSCOPE)
        .iter()
        .map(|scope| {
            let mut data = Map::new();
            if let Some(item_type) = scope.value().attr("itemtype") {
                data.insert("@type".to_string(), Value::from(item_type));
            }
            for prop in descendants_with(scope, "itemprop") {
                let Some(name) = prop.value().attr("itemprop") else {
                    continue;
                };
                data.insert(name.to_string(), microdata_value(&prop));
            }
            StructuredDataEntry {
                source_type: SourceType::Microdata,
                data: Value::Object(data),
            }
        })
        .collect()
}

fn microdata_value(prop: &ElementRef<'_>) -> Value {
    let el = prop.value();
    if let Some(content) = el.attr("content") {
        return Value::from(content);
    }
    match el.name() {
        "meta" => Value::Null,
        "img" => el.attr("src").map_or(Value::Null, Value::from),
        _ => Value::from(element_text(prop)),
    }
}

/// One block per `typeof` element
pub fn rdfa(page: &Page) -> Vec<StructuredDataEntry> {
    page.select(&TYPEOF)
        .iter()
        .map(|scope| {
            let mut data = Map::new();
            let item_type = scope.value().attr("typeof").unwrap_or_default();
            data.insert("@type".to_string(), Value::from(item_type));
            for prop in descendants_with(scope, "property") {
                let Some(name) = prop.value().attr("property") else {
                    continue;
                };
                let value = match prop.value().attr("content") {
                    Some(content) if !content.is_empty() => content.to_string(),
                    _ => element_text(&prop),
                };
                data.insert(name.to_string(), Value::from(value));
            }
            StructuredDataEntry {
                source_type: SourceType::Rdfa,
                data: Value::Object(data),
            }
        })
        .collect()
}

/// Descendant elements (not the scope itself) carrying an attribute
fn descendants_with<'a>(
    scope: &ElementRef<'a>,
    attr: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    scope
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().attr(attr).is_some())
}
