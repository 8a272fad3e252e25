//! JSON parser and validator for maintainer rate files.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::error::SchemaError;
use crate::table::{MIN_STATES, RateTable, StateRate};

/// Parses raw bytes as a JSON document.
///
/// # Errors
///
/// Returns an error if the bytes are not syntactically valid JSON.
pub fn parse_table(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Checks a parsed document against the rate table shape.
///
/// Top-level fields are checked first, then every entry in order. The first
/// violation found is returned.
pub fn validate(doc: &Value) -> Result<RateTable, SchemaError> {
    let obj = doc.as_object().ok_or(SchemaError::NotAnObject)?;

    let year = match obj.get("year") {
        None => return Err(SchemaError::MissingYear),
        Some(v) if is_falsy(v) => return Err(SchemaError::MissingYear),
        Some(v) => parse_year(v).ok_or_else(|| SchemaError::InvalidYear(v.clone()))?,
    };

    let updated = match obj.get("updated") {
        None => return Err(SchemaError::MissingUpdated),
        Some(v) if is_falsy(v) => return Err(SchemaError::MissingUpdated),
        Some(Value::String(s)) => s.clone(),
        Some(v) => return Err(SchemaError::InvalidUpdated(v.clone())),
    };

    if NaiveDate::parse_from_str(&updated, "%Y-%m-%d").is_err() {
        warn!(updated = %updated, "`updated` is not an ISO date (YYYY-MM-DD)");
    }

    let entries = obj
        .get("states")
        .and_then(Value::as_array)
        .ok_or(SchemaError::StatesNotArray)?;

    if entries.len() < MIN_STATES {
        return Err(SchemaError::TooFewStates {
            found: entries.len(),
            min: MIN_STATES,
        });
    }

    let mut seen = HashSet::new();
    let mut states = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let invalid = |reason: &str| SchemaError::InvalidEntry {
            index,
            reason: reason.to_string(),
            entry: entry.clone(),
        };

        let fields = entry.as_object().ok_or_else(|| invalid("not an object"))?;
        let state = validate_entry(fields).map_err(|reason| invalid(&reason))?;

        if !seen.insert(state.abbr.clone()) {
            return Err(invalid(&format!("duplicate abbr `{}`", state.abbr)));
        }

        states.push(state);
    }

    debug!(year, updated = %updated, states = states.len(), "Rate table validated");

    Ok(RateTable {
        year,
        updated,
        states,
    })
}

/// Positive integer year; integral floats such as `2025.0` are accepted.
fn parse_year(v: &Value) -> Option<u32> {
    let year = match v.as_u64() {
        Some(y) => y,
        None => {
            let f = v.as_f64().filter(|f| f.is_finite() && f.fract() == 0.0 && *f > 0.0)?;
            if f > f64::from(u32::MAX) {
                return None;
            }
            f as u64
        }
    };
    u32::try_from(year).ok()
}

fn validate_entry(fields: &Map<String, Value>) -> Result<StateRate, String> {
    let abbr = non_empty_str(fields, "abbr")?;
    if abbr.len() != 2 || !abbr.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!("`abbr` must be a two-letter code, got `{abbr}`"));
    }

    let name = non_empty_str(fields, "name")?;

    let rate = match fields.get("rate") {
        None | Some(Value::Null) => return Err("`rate` is missing".to_string()),
        Some(v) => v
            .as_f64()
            .ok_or_else(|| format!("`rate` must be a number, got {v}"))?,
    };
    if !rate.is_finite() || rate < 0.0 {
        return Err(format!("`rate` must be a non-negative number, got {rate}"));
    }

    Ok(StateRate {
        abbr: abbr.to_string(),
        name: name.to_string(),
        // normalizes -0.0
        rate: if rate == 0.0 { 0.0 } else { rate },
    })
}

fn non_empty_str<'a>(fields: &'a Map<String, Value>, key: &str) -> Result<&'a str, String> {
    match fields.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.as_str()),
        Some(v) if !is_falsy(v) => Err(format!("`{key}` must be a string, got {v}")),
        _ => Err(format!("`{key}` is missing or empty")),
    }
}

/// Falsy in the sense maintainers expect from the web app: null, false, 0, "".
fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::fixtures::sample_json;
    use serde_json::json;

    #[test]
    fn test_parse_invalid_bytes() {
        let result = parse_table(b"{ \"year\": 2025, ");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_sample_table() {
        let table = validate(&sample_json(51)).unwrap();

        assert_eq!(table.year, 2025);
        assert_eq!(table.updated, "2025-01-15");
        assert_eq!(table.states.len(), 51);
        assert_eq!(table.states[0].abbr, "AA");
        assert_eq!(table.states[1].rate, 1.25);
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(validate(&json!([1, 2])), Err(SchemaError::NotAnObject));
    }

    #[test]
    fn test_missing_or_falsy_year() {
        let mut doc = sample_json(50);
        doc.as_object_mut().unwrap().remove("year");
        assert_eq!(validate(&doc), Err(SchemaError::MissingYear));

        doc["year"] = json!(0);
        assert_eq!(validate(&doc), Err(SchemaError::MissingYear));

        doc["year"] = json!("2025");
        assert_eq!(validate(&doc), Err(SchemaError::InvalidYear(json!("2025"))));

        doc["year"] = json!(2025.5);
        assert_eq!(validate(&doc), Err(SchemaError::InvalidYear(json!(2025.5))));
    }

    #[test]
    fn test_integral_float_year_accepted() {
        let mut doc = sample_json(50);
        doc["year"] = json!(2025.0);
        assert_eq!(validate(&doc).unwrap().year, 2025);
    }

    #[test]
    fn test_missing_or_empty_updated() {
        let mut doc = sample_json(50);
        doc["updated"] = json!("");
        assert_eq!(validate(&doc), Err(SchemaError::MissingUpdated));

        doc.as_object_mut().unwrap().remove("updated");
        assert_eq!(validate(&doc), Err(SchemaError::MissingUpdated));
    }

    #[test]
    fn test_non_iso_updated_is_accepted() {
        let mut doc = sample_json(50);
        doc["updated"] = json!("January 2025");
        assert_eq!(validate(&doc).unwrap().updated, "January 2025");
    }

    #[test]
    fn test_too_few_states() {
        assert_eq!(
            validate(&sample_json(49)),
            Err(SchemaError::TooFewStates { found: 49, min: 50 })
        );
    }

    #[test]
    fn test_states_not_array() {
        let mut doc = sample_json(50);
        doc["states"] = json!({ "AL": 5 });
        assert_eq!(validate(&doc), Err(SchemaError::StatesNotArray));
    }

    #[test]
    fn test_entry_missing_fields_reports_entry() {
        for field in ["abbr", "name", "rate"] {
            let mut doc = sample_json(51);
            doc["states"][7].as_object_mut().unwrap().remove(field);
            let offending = doc["states"][7].clone();

            match validate(&doc) {
                Err(SchemaError::InvalidEntry { index, entry, .. }) => {
                    assert_eq!(index, 7, "field {field}");
                    assert_eq!(entry, offending);
                }
                other => panic!("expected InvalidEntry for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_first_invalid_entry_wins() {
        let mut doc = sample_json(51);
        doc["states"][3]["name"] = json!("");
        doc["states"][9]["abbr"] = json!("");

        match validate(&doc) {
            Err(SchemaError::InvalidEntry { index, .. }) => assert_eq!(index, 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_zero_rate_is_valid() {
        let mut doc = sample_json(51);
        doc["states"][1]["rate"] = json!(0);
        assert_eq!(validate(&doc).unwrap().states[1].rate, 0.0);
    }

    #[test]
    fn test_null_and_negative_rate_rejected() {
        let mut doc = sample_json(51);
        doc["states"][2]["rate"] = json!(null);
        assert!(matches!(
            validate(&doc),
            Err(SchemaError::InvalidEntry { index: 2, .. })
        ));

        doc["states"][2]["rate"] = json!(-1.5);
        assert!(matches!(
            validate(&doc),
            Err(SchemaError::InvalidEntry { index: 2, .. })
        ));
    }

    #[test]
    fn test_duplicate_abbr_rejected() {
        let mut doc = sample_json(51);
        doc["states"][40]["abbr"] = json!("AA");

        match validate(&doc) {
            Err(SchemaError::InvalidEntry { index, reason, .. }) => {
                assert_eq!(index, 40);
                assert!(reason.contains("duplicate"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bad_abbr_shape_rejected() {
        let mut doc = sample_json(51);
        doc["states"][0]["abbr"] = json!("CAL");
        assert!(matches!(
            validate(&doc),
            Err(SchemaError::InvalidEntry { index: 0, .. })
        ));
    }
}
