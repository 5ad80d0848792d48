use regex::Regex;

use crate::error::ConstraintViolation;
use crate::field::field_model::ControlConstraints;
use crate::generate::value::GeneratedValue;

/// Fit a generated value to the control's native constraints.
///
/// Text is truncated to `maxlength`; numbers are clamped to `min`/`max` and
/// snapped to `step`. Anything still invalid afterwards (too short, pattern
/// mismatch, no step value in range) is an error and the field is skipped.
pub fn conform(
    value: GeneratedValue,
    input_type: &str,
    constraints: &ControlConstraints,
) -> Result<GeneratedValue, ConstraintViolation> {
    let numeric_control = matches!(input_type, "number" | "range");
    match value {
        GeneratedValue::Numeric(n) => conform_number(n, constraints).map(GeneratedValue::Numeric),
        GeneratedValue::Text(text) if numeric_control => {
            let n: f64 = text
                .trim()
                .parse()
                .map_err(|_| ConstraintViolation::NotNumeric(text.clone()))?;
            conform_number(n, constraints).map(GeneratedValue::Numeric)
        }
        GeneratedValue::Text(text) => conform_text(text, constraints).map(GeneratedValue::Text),
        other => Ok(other),
    }
}

pub fn conform_text(text: String, c: &ControlConstraints) -> Result<String, ConstraintViolation> {
    let text = match c.max_length {
        Some(max) if text.chars().count() > max => text.chars().take(max).collect(),
        _ => text,
    };
    if let Some(min_length) = c.min_length {
        if text.chars().count() < min_length {
            return Err(ConstraintViolation::TooShort { min_length });
        }
    }
    if let Some(pattern) = &c.pattern {
        if !matches_control_pattern(pattern, &text)? {
            return Err(ConstraintViolation::PatternMismatch {
                pattern: pattern.clone(),
            });
        }
    }
    Ok(text)
}

/// Whole-value match, as the `pattern` attribute is defined.
pub fn matches_control_pattern(pattern: &str, text: &str) -> Result<bool, ConstraintViolation> {
    let re = Regex::new(&format!("^(?:{pattern})$")).map_err(|_| ConstraintViolation::InvalidPattern {
        pattern: pattern.to_string(),
    })?;
    Ok(re.is_match(text))
}

pub fn conform_number(n: f64, c: &ControlConstraints) -> Result<f64, ConstraintViolation> {
    let min = c.min.unwrap_or(f64::NEG_INFINITY);
    let max = c.max.unwrap_or(f64::INFINITY);
    let mut v = n.clamp(min.min(max), max.max(min));

    if let Some(step) = c.step {
        let base = c.min.unwrap_or(0.0);
        let mut k = ((v - base) / step).round();
        if base + k * step > max {
            k -= 1.0;
        }
        if base + k * step < min {
            k += 1.0;
        }
        v = round_float(base + k * step);
        if v < min || v > max {
            return Err(ConstraintViolation::NoStepValue { min, max, step });
        }
    }
    Ok(v)
}

/// Text written for a conformed number.
///
/// Uses as many decimals as `step` and `min` carry (2 without a step), then
/// re-checks the printed value against the step so rounding can never move
/// it off the step grid.
pub fn render_number(n: f64, c: &ControlConstraints) -> Result<String, ConstraintViolation> {
    let places = match c.step {
        Some(step) => decimal_places(step).max(c.min.map_or(0, decimal_places)),
        None => c.min.map_or(2, decimal_places).max(2),
    };
    let text = format_places(n, places);

    if let Some(step) = c.step {
        let written: f64 = text
            .parse()
            .map_err(|_| ConstraintViolation::NotNumeric(text.clone()))?;
        let k = (written - c.min.unwrap_or(0.0)) / step;
        if (k - k.round()).abs() > 1e-6 {
            return Err(ConstraintViolation::StepMismatch { value: text, step });
        }
    }
    Ok(text)
}

/// Digits after the decimal point in the shortest form of `v`, at most 10.
fn decimal_places(v: f64) -> usize {
    let s = format!("{}", v.abs());
    s.split_once('.').map_or(0, |(_, frac)| frac.len()).min(10)
}

fn format_places(n: f64, places: usize) -> String {
    let s = format!("{:.*}", places, n);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s.as_str()
    };
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn round_float(v: f64) -> f64 {
    (v * 1e10).round() / 1e10
}
