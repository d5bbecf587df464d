//! Normalization of loosely-typed backend payloads into canonical records.
//!
//! The backend has shipped several shapes for the same data over time. Shape
//! decisions happen here, once, so views only ever see `GuidanceEntry`,
//! `BuybackEntry`, `MetricValue` and friends.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{BuybackEntry, Citation, GuidanceEntry, MetricValue, Series};

/// Metrics shown first, in this order; everything else follows alphabetically.
pub const PREFERRED_METRIC_ORDER: [&str; 5] = [
    "revenue",
    "eps_gaap",
    "operating_margin",
    "free_cash_flow",
    "gross_margin",
];

/// Finite number from a JSON number or numeric string. Anything else is absent.
pub fn safe_number(value: &Value) -> Option<f64> {
    let num = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    num.is_finite().then_some(num)
}

fn number_field(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(safe_number)
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(ToString::to_string)
}

/// Citations in source order; malformed entries are dropped.
pub fn normalize_citations(value: Option<&Value>) -> Vec<Citation> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<Citation>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Decode every element of a JSON array as `T`, skipping elements that do not fit.
/// A non-array payload yields an empty list.
pub fn normalize_list<T: DeserializeOwned>(raw: &Value) -> Vec<T> {
    let Some(items) = raw.as_array() else {
        if !raw.is_null() {
            tracing::debug!("expected a JSON array, got {}", kind_of(raw));
        }
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<T>(item.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::debug!("dropping malformed list item: {e}");
                None
            }
        })
        .collect()
}

/// The item array of a payload that is either a bare array or `{ <field>: [...] }`.
fn items_of<'a>(raw: &'a Value, field: &str) -> &'a [Value] {
    match raw {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get(field)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Guidance
// ============================================================================

/// Guidance item as it arrives on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum GuidanceWire<'a> {
    /// `{ type, range: [low, high], value, detail }`
    Legacy(&'a Map<String, Value>),
    /// `{ metric, value_low, value_high, value_point, outlook_note, confidence }`
    Current(&'a Map<String, Value>),
    /// Bare string, kept as an outlook note.
    Note(&'a str),
}

impl<'a> GuidanceWire<'a> {
    /// Objects carrying `type` or `range` are legacy; other objects are current.
    pub fn classify(item: &'a Value) -> Option<Self> {
        match item {
            Value::Object(map) if map.contains_key("type") || map.contains_key("range") => {
                Some(Self::Legacy(map))
            }
            Value::Object(map) => Some(Self::Current(map)),
            Value::String(note) => Some(Self::Note(note.as_str())),
            _ => None,
        }
    }

    pub fn into_entry(self) -> GuidanceEntry {
        match self {
            Self::Legacy(map) => {
                let range = map.get("range").and_then(Value::as_array);
                let bound = |idx: usize| range.and_then(|r| r.get(idx)).and_then(safe_number);
                GuidanceEntry {
                    id: None,
                    metric: string_field(map, "type"),
                    period: string_field(map, "period"),
                    value_low: bound(0),
                    value_high: bound(1),
                    value_point: number_field(map, "value"),
                    unit: string_field(map, "unit"),
                    outlook_note: string_field(map, "detail"),
                    confidence: Some("low".to_string()),
                    detail: None,
                    citations: normalize_citations(map.get("citations")),
                }
            }
            Self::Current(map) => GuidanceEntry {
                id: string_field(map, "id"),
                metric: string_field(map, "metric"),
                period: string_field(map, "period"),
                value_low: number_field(map, "value_low"),
                value_high: number_field(map, "value_high"),
                value_point: number_field(map, "value_point"),
                unit: string_field(map, "unit"),
                outlook_note: string_field(map, "outlook_note"),
                confidence: string_field(map, "confidence"),
                detail: string_field(map, "detail"),
                citations: normalize_citations(map.get("citations")),
            },
            Self::Note(note) => GuidanceEntry {
                outlook_note: Some(note.to_string()),
                ..Default::default()
            },
        }
    }
}

/// Canonical guidance list from any accepted payload shape, in input order.
pub fn normalize_guidance(raw: &Value) -> Vec<GuidanceEntry> {
    items_of(raw, "guidance")
        .iter()
        .filter_map(|item| {
            let wire = GuidanceWire::classify(item);
            if wire.is_none() {
                tracing::debug!("dropping guidance item of kind {}", kind_of(item));
            }
            wire
        })
        .map(GuidanceWire::into_entry)
        .collect()
}

// ============================================================================
// Buybacks
// ============================================================================

/// Buyback list from a bare array, `{buybacks: [...]}` or `{buybacks: {buybacks: [...]}}`.
pub fn normalize_buybacks(raw: &Value) -> Vec<BuybackEntry> {
    let inner = match raw.get("buybacks") {
        Some(nested @ Value::Object(_)) => nested,
        _ => raw,
    };

    items_of(inner, "buybacks")
        .iter()
        .filter_map(|item| {
            let map = item.as_object()?;
            Some(BuybackEntry {
                authorization_amount: number_field(map, "authorization_amount"),
                repurchased_amount: number_field(map, "repurchased_amount"),
                unit: string_field(map, "unit"),
                period: string_field(map, "period"),
                citations: normalize_citations(map.get("citations")),
            })
        })
        .collect()
}

// ============================================================================
// Metrics & Series
// ============================================================================

fn metric_rank(key: &str) -> usize {
    PREFERRED_METRIC_ORDER
        .iter()
        .position(|k| *k == key)
        .unwrap_or(PREFERRED_METRIC_ORDER.len())
}

/// `{ metrics: { key: { name, value, unit, period, citations } } }` as an ordered list.
pub fn normalize_metrics(raw: &Value) -> Vec<MetricValue> {
    let Some(map) = raw.get("metrics").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut metrics: Vec<MetricValue> = map
        .iter()
        .map(|(key, item)| match item.as_object() {
            Some(fields) => MetricValue {
                key: key.clone(),
                name: string_field(fields, "name").unwrap_or_else(|| key.clone()),
                value: number_field(fields, "value"),
                unit: string_field(fields, "unit"),
                period: string_field(fields, "period"),
                citations: normalize_citations(fields.get("citations")),
            },
            None => MetricValue {
                key: key.clone(),
                name: key.clone(),
                value: safe_number(item),
                unit: None,
                period: None,
                citations: Vec::new(),
            },
        })
        .collect();

    metrics.sort_by(|a, b| {
        metric_rank(&a.key)
            .cmp(&metric_rank(&b.key))
            .then_with(|| a.key.cmp(&b.key))
    });
    metrics
}

/// `{ series: { name: { labels, values } } }`; malformed series are skipped.
pub fn normalize_series(raw: &Value) -> BTreeMap<String, Series> {
    raw.get("series")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(name, item)| {
                    serde_json::from_value::<Series>(item.clone())
                        .ok()
                        .map(|series| (name.clone(), series))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CalendarEvent;
    use serde_json::json;

    #[test]
    fn legacy_guidance_forces_low_confidence() {
        let out = normalize_guidance(&json!([{ "type": "revenue", "range": [10, 20], "unit": "B" }]));
        assert_eq!(out.len(), 1);
        let entry = &out[0];
        assert_eq!(entry.metric.as_deref(), Some("revenue"));
        assert_eq!(entry.value_low, Some(10.0));
        assert_eq!(entry.value_high, Some(20.0));
        assert_eq!(entry.value_point, None);
        assert_eq!(entry.unit.as_deref(), Some("B"));
        assert_eq!(entry.confidence.as_deref(), Some("low"));
    }

    #[test]
    fn current_guidance_is_copied_verbatim() {
        let out = normalize_guidance(&json!({
            "guidance": [{ "metric": "capex", "value_point": 5, "confidence": "high" }]
        }));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].metric.as_deref(), Some("capex"));
        assert_eq!(out[0].value_point, Some(5.0));
        assert_eq!(out[0].confidence.as_deref(), Some("high"));
        assert_eq!(out[0].value_low, None);
    }

    #[test]
    fn null_and_scalar_payloads_yield_nothing() {
        assert!(normalize_guidance(&Value::Null).is_empty());
        assert!(normalize_guidance(&json!([42])).is_empty());
        assert!(normalize_guidance(&json!("guidance")).is_empty());
        assert!(normalize_guidance(&json!({ "guidance": "n/a" })).is_empty());
    }

    #[test]
    fn mixed_items_keep_input_order() {
        let out = normalize_guidance(&json!([
            "Expect margins to expand",
            42,
            { "range": ["1.5", "abc"] },
            { "metric": "eps", "value_low": "2.1", "value_high": null }
        ]));
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].outlook_note.as_deref(), Some("Expect margins to expand"));
        assert_eq!(out[0].confidence, None);
        assert_eq!(out[1].value_low, Some(1.5));
        assert_eq!(out[1].value_high, None);
        assert_eq!(out[1].metric, None);
        assert_eq!(out[2].value_low, Some(2.1));
        assert_eq!(out[2].value_high, None);
    }

    #[test]
    fn safe_number_rejects_non_numeric() {
        assert_eq!(safe_number(&json!(3.5)), Some(3.5));
        assert_eq!(safe_number(&json!(" 7 ")), Some(7.0));
        assert_eq!(safe_number(&json!("")), None);
        assert_eq!(safe_number(&json!("NaN")), None);
        assert_eq!(safe_number(&json!("inf")), None);
        assert_eq!(safe_number(&json!(true)), None);
        assert_eq!(safe_number(&Value::Null), None);
    }

    #[test]
    fn buybacks_accept_nested_shape() {
        let nested = json!({
            "buybacks": { "buybacks": [{ "authorization_amount": 5e9, "unit": "USD", "period": "FY24" }] }
        });
        let flat = json!({ "buybacks": [{ "repurchased_amount": "12.5" }, "junk"] });
        let bare = json!([{ "authorization_amount": 1 }]);

        let nested = normalize_buybacks(&nested);
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].authorization_amount, Some(5e9));
        assert_eq!(nested[0].period.as_deref(), Some("FY24"));

        let flat = normalize_buybacks(&flat);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].repurchased_amount, Some(12.5));

        assert_eq!(normalize_buybacks(&bare).len(), 1);
        assert!(normalize_buybacks(&Value::Null).is_empty());
    }

    #[test]
    fn metrics_follow_preferred_order() {
        let out = normalize_metrics(&json!({
            "metrics": {
                "capex": { "value": 1.0 },
                "eps_gaap": { "name": "eps_gaap", "value": 1.25, "unit": "USD" },
                "revenue": { "name": "revenue", "value": 2.5e10, "unit": "USD", "period": "Q2" },
                "backlog": { "value": "n/a" }
            }
        }));
        let keys: Vec<&str> = out.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["revenue", "eps_gaap", "backlog", "capex"]);
        assert_eq!(out[2].value, None);
        assert_eq!(out[0].period.as_deref(), Some("Q2"));
    }

    #[test]
    fn citations_drop_malformed_entries() {
        let out = normalize_citations(Some(&json!([
            { "section": "MD&A", "page": 4, "snippet": "Revenue grew" },
            { "page": 2 },
            "loose"
        ])));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].label(), "[MD&A, p.4] Revenue grew");
    }

    #[test]
    fn list_skips_items_that_do_not_fit() {
        let events: Vec<CalendarEvent> = normalize_list(&json!([
            { "id": "1", "ticker": "AAPL", "event_date": "2024-05-02", "time_of_day": "AMC" },
            { "ticker": "missing id" },
            7
        ]));
        assert_eq!(events.len(), 1);
        assert!(normalize_list::<CalendarEvent>(&json!({ "detail": "error" })).is_empty());
    }

    #[test]
    fn series_skip_malformed() {
        let out = normalize_series(&json!({
            "series": {
                "revenue": { "labels": ["Q1", "Q2"], "values": [1.0, 2.0] },
                "eps_gaap": "oops"
            }
        }));
        assert_eq!(out.len(), 1);
        assert_eq!(out["revenue"].values, vec![1.0, 2.0]);
    }
}
