use serde_json::Value;

use crate::catalog::MacroProfile;

/// Parses a raw serialized nutrient mapping into a [`MacroProfile`].
///
/// The raw value looks like
/// `{"kcal": "387", "protein": "12g", "carbs": "53g", "fat": "14g"}`;
/// some dataset exports carry the same shape with single quotes. Missing
/// keys read as zero. Anything that is not a mapping of primitive values,
/// or a value that is not numeric after stripping its unit suffix, makes
/// the whole record unparseable and yields `None`; the record is then
/// excluded from matching instead of being scored as zeros.
///
/// The input is only ever decoded as structured data, never evaluated.
pub fn parse_nutrients(raw: &str) -> Option<MacroProfile> {
    let object = decode_object(raw.trim())?;

    let calories = macro_value(&object, "kcal")?;
    let protein = macro_value(&object, "protein")?;
    let carbs = macro_value(&object, "carbs")?;
    let fats = macro_value(&object, "fat")?;

    Some(MacroProfile {
        calories,
        protein,
        carbs,
        fats,
    })
}

fn decode_object(raw: &str) -> Option<serde_json::Map<String, Value>> {
    if raw.is_empty() {
        return None;
    }
    let value = match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        // Single-quoted export variant. Only safe to requote when no double
        // quote appears anywhere in the record.
        Err(_) if raw.contains('\'') && !raw.contains('"') => {
            serde_json::from_str(&raw.replace('\'', "\"")).ok()?
        }
        Err(_) => return None,
    };
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn macro_value(object: &serde_json::Map<String, Value>, key: &str) -> Option<f32> {
    let value = match object.get(key) {
        Some(value) => value,
        None => return Some(0.0),
    };
    let parsed = match value {
        Value::String(text) => parse_suffixed_number(text)?,
        Value::Number(number) => number.as_f64()? as f32,
        _ => return None,
    };
    // MacroProfile values are non-negative; a negative reading means the
    // record is bad data, not a valid profile.
    if !parsed.is_finite() || parsed < 0.0 {
        return None;
    }
    Some(parsed)
}

fn parse_suffixed_number(text: &str) -> Option<f32> {
    let stripped = text
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
        .trim_end();
    stripped.parse::<f32>().ok()
}
