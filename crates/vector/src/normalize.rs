//! Cell normalization at the load boundary
//!
//! Embedding cells show up as plain arrays, nested arrays, tensor wrapper
//! objects or their string renderings. Everything past this module sees a
//! flat `Vec<f32>`.

use serde_json::Value;

use crate::table::json_type_name;

/// Keys under which tensor wrapper objects keep their payload
const TENSOR_PAYLOAD_KEYS: [&str; 3] = ["data", "values", "tensor"];

/// Flatten any supported vector representation into `Vec<f32>`
pub fn parse_vector(value: &Value) -> Result<Vec<f32>, String> {
    let mut out = Vec::new();
    flatten_into(value, &mut out)?;
    Ok(out)
}

fn flatten_into(value: &Value, out: &mut Vec<f32>) -> Result<(), String> {
    match value {
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Number(n) => out.push(number_to_f32(n)?),
                    Value::Array(_) | Value::Object(_) => flatten_into(item, out)?,
                    other => {
                        return Err(format!(
                            "non-numeric vector element of type {}",
                            json_type_name(other)
                        ))
                    }
                }
            }
            Ok(())
        }
        Value::Object(object) => {
            let payload = TENSOR_PAYLOAD_KEYS
                .iter()
                .find_map(|key| object.get(*key))
                .ok_or_else(|| {
                    format!(
                        "object without a tensor payload (expected one of {:?})",
                        TENSOR_PAYLOAD_KEYS
                    )
                })?;
            flatten_into(payload, out)
        }
        Value::String(text) => {
            out.extend(parse_vector_str(text)?);
            Ok(())
        }
        other => Err(format!("expected a vector, got {}", json_type_name(other))),
    }
}

/// Parse a textual vector: `[0.1, 0.2]`, `[[0.1 0.2]]`, `tensor([0.1, 0.2])`
pub fn parse_vector_str(text: &str) -> Result<Vec<f32>, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("empty vector cell".to_string());
    }

    // Anything outside the outermost brackets is wrapper syntax
    // (`tensor(`, `array(`, `dtype=...`, `device=...`).
    let body = match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    };

    body.split(|c: char| c == ',' || c == '[' || c == ']' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| match token.parse::<f32>() {
            Ok(v) if v.is_finite() => Ok(v),
            Ok(_) => Err(format!("non-finite vector element '{}'", token)),
            Err(_) => Err(format!("invalid vector element '{}'", token)),
        })
        .collect()
}

/// JSON number to f32; values outside the f32 range are rejected, not saturated
fn number_to_f32(n: &serde_json::Number) -> Result<f32, String> {
    let v = n
        .as_f64()
        .map(|v| v as f32)
        .ok_or_else(|| format!("vector element {} is not representable as f32", n))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("vector element {} is out of f32 range", n))
    }
}

/// Rating from a number or numeric string; anything else is unrated
pub fn parse_rating(value: &Value) -> Option<f32> {
    let rating = match value {
        Value::Number(n) => n.as_f64().map(|v| v as f32),
        Value::String(s) => s.trim().parse::<f32>().ok(),
        _ => None,
    }?;
    rating.is_finite().then_some(rating)
}

/// Render a metadata cell as text
pub fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
