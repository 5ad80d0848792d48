use serde::{Deserialize, Serialize};

/// Placeholder file content handed to a file input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBlob {
    pub name: String,
    pub mime: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// A concrete value ready to be written into one control.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedValue {
    Text(String),
    Numeric(f64),
    /// Checkbox state.
    Boolean(bool),
    /// Index into a select's options or a radio group's members.
    SelectionIndex(usize),
    File(FileBlob),
}

impl GeneratedValue {
    /// String form written through the `value` property.
    pub fn as_text(&self) -> String {
        match self {
            GeneratedValue::Text(s) => s.clone(),
            GeneratedValue::Numeric(n) => format_number(*n),
            GeneratedValue::Boolean(b) => b.to_string(),
            GeneratedValue::SelectionIndex(i) => i.to_string(),
            GeneratedValue::File(blob) => blob.name.clone(),
        }
    }
}

/// Integers print without a fraction, everything else with at most 2 places.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        let s = format!("{:.2}", n);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
