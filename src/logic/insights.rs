use crate::models::{ForecastSet, InsightItem};
use regex_lite::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Number of insights produced per cycle
pub const INSIGHT_COUNT: usize = 3;

/// Numbered ("1. ") or bulleted ("- ", "• ") list markers
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\s|[-•]\s").expect("list marker pattern is valid"));

/// Pulls the insight text out of one known response shape
type Extractor = fn(&Value) -> Option<&str>;

/// Tried in order; the first non-empty text wins
const EXTRACTORS: &[(&str, Extractor)] = &[
    ("insight", extract_insight_field),
    ("[0].generated_text", extract_record_list),
    ("generated_text", extract_generated_text),
    ("output_text", extract_output_text),
];

fn extract_insight_field(value: &Value) -> Option<&str> {
    value.get("insight")?.as_str()
}

fn extract_record_list(value: &Value) -> Option<&str> {
    value.as_array()?.first()?.get("generated_text")?.as_str()
}

fn extract_generated_text(value: &Value) -> Option<&str> {
    value.get("generated_text")?.as_str()
}

fn extract_output_text(value: &Value) -> Option<&str> {
    value.get("output_text")?.as_str()
}

/// Find the insight text in a provider response, tolerating shape variance
pub fn extract_text(value: &Value) -> Option<&str> {
    EXTRACTORS.iter().find_map(|(name, extract)| {
        let text = extract(value).filter(|t| !t.trim().is_empty())?;
        tracing::debug!(shape = name, "Extracted insight text");
        Some(text)
    })
}

/// Instruction preamble plus the per-day forecast summary
pub fn build_prompt(forecast: &ForecastSet) -> String {
    format!(
        "You are an agricultural weather assistant. Based on this 7-day forecast for {},\n\
         give {} short, actionable insights for farmers.\n\
         Forecast:\n{}\n",
        forecast.region,
        INSIGHT_COUNT,
        forecast.summary()
    )
}

/// Split generated text on list markers into at most three positional insights
pub fn parse_insights(text: &str) -> Vec<InsightItem> {
    LIST_MARKER
        .split(text)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .take(INSIGHT_COUNT)
        .enumerate()
        .map(|(i, fragment)| InsightItem::positional(i, fragment))
        .collect()
}

/// Deterministic local insights used in degraded mode
pub fn fallback_insights(region: &str) -> Vec<InsightItem> {
    vec![
        InsightItem::positional(0, format!("Monitor soil moisture in {}.", region)),
        InsightItem::positional(1, "Adjust irrigation according to rainfall."),
        InsightItem::positional(2, "Good planting conditions soon."),
    ]
}

/// Fill missing positions from the fallback list so exactly three remain
pub fn complete_insights(mut parsed: Vec<InsightItem>, region: &str) -> Vec<InsightItem> {
    let have = parsed.len();
    if have < INSIGHT_COUNT {
        parsed.extend(fallback_insights(region).into_iter().skip(have));
    }
    parsed.truncate(INSIGHT_COUNT);
    parsed
}

/// Insights parsed from a provider response, without padding.
///
/// Returns `None` when the response carries no usable text.
pub fn interpret_response(value: &Value) -> Option<Vec<InsightItem>> {
    let parsed = parse_insights(extract_text(value)?);
    if parsed.is_empty() {
        return None;
    }
    Some(parsed)
}
