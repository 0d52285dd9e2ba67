//! Default values as typed literals
//!
//! `default` and `fixed` values are checked against their built-in family
//! and rendered as the literal the generated constructor uses.

use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;

use super::plan::Scalar;
use super::render::py_string;
use crate::model::Family;

/// Render `value` as a literal of the scalar's type.
///
/// Returns the reason when the value does not parse as that type.
pub fn render_default(value: &str, scalar: &Scalar) -> std::result::Result<String, String> {
    if scalar.is_list {
        let items = value
            .split_whitespace()
            .map(|item| render_item(item, scalar.builtin.family))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        return Ok(format!("[{}]", items.join(", ")));
    }
    let value = if scalar.builtin.family == Family::String && !scalar.collapse_whitespace {
        value
    } else {
        value.trim()
    };
    render_item(value, scalar.builtin.family)
}

fn render_item(value: &str, family: Family) -> std::result::Result<String, String> {
    match family {
        Family::String | Family::Base64 => Ok(py_string(value)),
        Family::Integer => value
            .trim_start_matches('+')
            .parse::<i128>()
            .map(|n| n.to_string())
            .map_err(|_| format!("'{}' is not an integer", value)),
        Family::Decimal => Decimal::from_str(value)
            .map(|d| format!("Decimal_('{}')", d))
            .map_err(|_| format!("'{}' is not a decimal", value)),
        Family::Float | Family::Double => render_float(value),
        Family::Boolean => match value {
            "true" | "1" => Ok("True".to_string()),
            "false" | "0" => Ok("False".to_string()),
            _ => Err(format!("'{}' is not a boolean", value)),
        },
        Family::DateTime => render_datetime(value),
        Family::Date => render_date(value),
        Family::Time => render_time(value),
    }
}

fn render_float(value: &str) -> std::result::Result<String, String> {
    match value {
        "INF" => return Ok("float('inf')".to_string()),
        "-INF" => return Ok("float('-inf')".to_string()),
        "NaN" => return Ok("float('nan')".to_string()),
        _ => {}
    }
    let parsed: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a floating point number", value))?;
    if !parsed.is_finite() {
        return Err(format!("'{}' is not a floating point number", value));
    }
    let mut text = parsed.to_string();
    if !text.contains(|c: char| matches!(c, '.' | 'e' | 'E')) {
        text.push_str(".0");
    }
    Ok(text)
}

/// Split a trailing `Z` or `±hh:mm` zone off a lexical date/time value
fn split_zone(value: &str) -> (&str, Option<&str>) {
    if let Some(body) = value.strip_suffix('Z') {
        return (body, Some("Z"));
    }
    if value.len() > 6 {
        let (body, zone) = value.split_at(value.len() - 6);
        let bytes = zone.as_bytes();
        if (bytes[0] == b'+' || bytes[0] == b'-') && bytes[3] == b':' {
            return (body, Some(zone));
        }
    }
    (value, None)
}

fn zone_literal(zone: Option<&str>) -> std::result::Result<String, String> {
    let Some(zone) = zone else {
        return Ok(String::new());
    };
    if zone == "Z" {
        return Ok(", tzinfo=FixedOffsetTZ_(0, 'Z')".to_string());
    }
    // Reuse chrono's offset parsing on a fixed reference instant.
    let sample = format!("2000-01-01T00:00:00{}", zone);
    let parsed = DateTime::parse_from_rfc3339(&sample)
        .map_err(|_| format!("'{}' is not a time zone offset", zone))?;
    let minutes = parsed.offset().local_minus_utc() / 60;
    Ok(format!(", tzinfo=FixedOffsetTZ_({}, {})", minutes, py_string(zone)))
}

fn render_datetime(value: &str) -> std::result::Result<String, String> {
    let (body, zone) = split_zone(value);
    let parsed = NaiveDateTime::parse_from_str(body, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|_| format!("'{}' is not a dateTime", value))?;
    Ok(format!(
        "datetime_.datetime({}, {}, {}, {}, {}, {}, {}{})",
        parsed.year(),
        parsed.month(),
        parsed.day(),
        parsed.hour(),
        parsed.minute(),
        parsed.second(),
        parsed.nanosecond() / 1_000,
        zone_literal(zone)?
    ))
}

fn render_date(value: &str) -> std::result::Result<String, String> {
    let (body, _zone) = split_zone(value);
    let parsed = NaiveDate::parse_from_str(body, "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a date", value))?;
    Ok(format!(
        "datetime_.date({}, {}, {})",
        parsed.year(),
        parsed.month(),
        parsed.day()
    ))
}

fn render_time(value: &str) -> std::result::Result<String, String> {
    let (body, zone) = split_zone(value);
    let parsed = NaiveTime::parse_from_str(body, "%H:%M:%S%.f")
        .map_err(|_| format!("'{}' is not a time", value))?;
    Ok(format!(
        "datetime_.time({}, {}, {}, {}{})",
        parsed.hour(),
        parsed.minute(),
        parsed.second(),
        parsed.nanosecond() / 1_000,
        zone_literal(zone)?
    ))
}
