//! Flexible duration, decibel and frequency specs
//!
//! Values are either JSON numbers or strings of the form `<number><unit>`. Nothing here
//! fails: malformed input degrades to a best-effort number and a warning.

use serde_json::Value;
use tracing::debug;

use crate::diagnostics::Diagnostics;

const DURATION_NOTE: &str = "durations are numbers or strings ending in 's', 'sec', 'secs', \
                             'seconds', 'ms', 'milliseconds' or '%'";

/// Resolve a duration spec to whole milliseconds.
///
/// Bare numbers in `[0, 1]` are fractions of `segment_length_ms`, anything else is taken as
/// milliseconds. Strings accept `%` and second units on top of that.
pub fn to_milliseconds(value: &Value, segment_length_ms: i64, diagnostics: &mut Diagnostics) -> i64 {
    let length = segment_length_ms as f64;
    match value {
        Value::Number(number) => {
            let number = number.as_f64().unwrap_or(0.0);
            if (0.0..=1.0).contains(&number) {
                (length * number) as i64
            } else {
                number as i64
            }
        }
        Value::String(raw) => {
            let Some((number, units)) = split_spec(raw, diagnostics, "duration") else {
                debug!("{}", DURATION_NOTE);
                return 0;
            };
            let milliseconds = match units.as_str() {
                "" if (0.0..=1.0).contains(&number) => length * number,
                "%" => length * number / 100.0,
                "s" | "sec" | "secs" | "seconds" => number * 1000.0,
                "" | "ms" | "milliseconds" | "miliseconds" => number,
                _ => {
                    diagnostics.warn(format!(
                        "duration units invalid in '{}' [fixup: treating as {} milliseconds]",
                        raw, number
                    ));
                    debug!("{}", DURATION_NOTE);
                    number
                }
            };
            milliseconds as i64
        }
        other => {
            diagnostics.warn(format!(
                "duration argument type not valid: {} [fixup: using 0]",
                other
            ));
            debug!("{}", DURATION_NOTE);
            0
        }
    }
}

/// Resolve a decibel spec (`-20`, `"-20db"`, `"-20 decibels"`).
pub fn to_decibels(value: &Value, diagnostics: &mut Diagnostics) -> f64 {
    parse_with_units(value, diagnostics, "decibel", &["", "db", "dbs", "decibels"])
}

/// Resolve a frequency spec (`440`, `"440hz"`); negative values are sign-flipped.
pub fn to_hertz(value: &Value, diagnostics: &mut Diagnostics) -> f64 {
    let hertz = parse_with_units(value, diagnostics, "frequency", &["", "hz", "hertz"]);
    if hertz < 0.0 {
        diagnostics.warn(format!(
            "frequency {} is negative [fixup: using {}]",
            hertz, -hertz
        ));
        return -hertz;
    }
    hertz
}

fn parse_with_units(value: &Value, diagnostics: &mut Diagnostics, kind: &str, units: &[&str]) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(raw) => {
            let Some((number, unit)) = split_spec(raw, diagnostics, kind) else {
                return 0.0;
            };
            if !units.contains(&unit.as_str()) {
                diagnostics.warn(format!(
                    "{} units invalid in '{}' [fixup: using {}]",
                    kind, raw, number
                ));
            }
            number
        }
        other => {
            diagnostics.warn(format!(
                "{} argument type not valid: {} [fixup: using 0]",
                kind, other
            ));
            0.0
        }
    }
}

/// Split `"<number><unit>"` into its parts. Whitespace is ignored, units are lowercased and an
/// empty string reads as zero.
fn split_spec(raw: &str, diagnostics: &mut Diagnostics, kind: &str) -> Option<(f64, String)> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Some((0.0, String::new()));
    }

    let numeric_len = compact
        .char_indices()
        .take_while(|&(idx, c)| c.is_ascii_digit() || c == '.' || (idx == 0 && (c == '-' || c == '+')))
        .count();
    let (number, units) = compact.split_at(numeric_len);

    match number.parse::<f64>() {
        Ok(number) if number.is_finite() => Some((number, units.to_ascii_lowercase())),
        _ => {
            diagnostics.warn(format!(
                "{} argument '{}' is not a number [fixup: using 0]",
                kind, raw
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ms(value: Value, length: i64) -> (i64, usize) {
        let mut diagnostics = Diagnostics::new();
        let result = to_milliseconds(&value, length, &mut diagnostics);
        (result, diagnostics.len())
    }

    #[test]
    fn unit_strings_are_consistent() {
        assert_eq!(ms(json!("2s"), 10_000), (2_000, 0));
        assert_eq!(ms(json!("2 sec"), 10_000), (2_000, 0));
        assert_eq!(ms(json!("1.5seconds"), 10_000), (1_500, 0));
        assert_eq!(ms(json!("50%"), 10_000), (5_000, 0));
        assert_eq!(ms(json!("750ms"), 10_000), (750, 0));
        assert_eq!(ms(json!("750"), 10_000), (750, 0));
    }

    #[test]
    fn fractions_scale_by_segment_length() {
        assert_eq!(ms(json!(0.25), 8_000), (2_000, 0));
        assert_eq!(ms(json!(1), 8_000), (8_000, 0));
        assert_eq!(ms(json!("0.5"), 8_000), (4_000, 0));
        assert_eq!(ms(json!(4_000), 8_000), (4_000, 0));
    }

    #[test]
    fn malformed_durations_degrade_to_zero() {
        assert_eq!(ms(json!("soon"), 10_000), (0, 1));
        assert_eq!(ms(json!(true), 10_000), (0, 1));

        assert_eq!(ms(json!(""), 10_000), (0, 0));
    }

    #[test]
    fn unknown_duration_unit_keeps_number() {
        assert_eq!(ms(json!("30min"), 10_000), (30, 1));
    }

    #[test]
    fn decibels_accept_units() {
        let mut diagnostics = Diagnostics::new();
        assert_eq!(to_decibels(&json!("-20db"), &mut diagnostics), -20.0);
        assert_eq!(to_decibels(&json!("-3.5 dBs"), &mut diagnostics), -3.5);
        assert_eq!(to_decibels(&json!(-12), &mut diagnostics), -12.0);
        assert!(diagnostics.is_empty());

        assert_eq!(to_decibels(&json!("6bels"), &mut diagnostics), 6.0);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn negative_hertz_is_flipped() {
        let mut diagnostics = Diagnostics::new();
        assert_eq!(to_hertz(&json!("440hz"), &mut diagnostics), 440.0);
        assert!(diagnostics.is_empty());
        assert_eq!(to_hertz(&json!("-65 Hertz"), &mut diagnostics), 65.0);
        assert_eq!(diagnostics.len(), 1);
    }
}
