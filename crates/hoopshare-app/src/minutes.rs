// Minutes-played parsing for box-score clock values ("MM:SS" or "MM").

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MinutesError {
    #[error("empty minutes value")]
    Empty,

    #[error("`{0}` is not a clock value (expected MM:SS)")]
    Malformed(String),

    #[error("seconds out of range in `{0}`")]
    SecondsOutOfRange(String),
}

/// Parse a clock value into fractional minutes: `"41:12"` -> 41.2.
///
/// A bare minute count (`"36"`) is accepted. Seconds must be below 60.
pub fn parse_minutes(value: &str) -> Result<f64, MinutesError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(MinutesError::Empty);
    }

    let malformed = || MinutesError::Malformed(value.to_string());
    let (minutes, seconds) = match value.split_once(':') {
        Some((m, s)) => (m, Some(s)),
        None => (value, None),
    };

    let minutes = parse_digits(minutes).ok_or_else(malformed)?;
    let seconds = match seconds {
        Some(s) if s.len() == 2 => parse_digits(s).ok_or_else(malformed)?,
        Some(_) => return Err(malformed()),
        None => 0,
    };
    if seconds >= 60 {
        return Err(MinutesError::SecondsOutOfRange(value.to_string()));
    }

    Ok(minutes as f64 + seconds as f64 / 60.0)
}

/// True for values that look like a clock reading. Box scores put status
/// text ("Did Not Play", "Not With Team") in the minutes column.
pub fn is_clock(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit() || c == ':')
}

/// Format fractional minutes back into `MM:SS`, rounding to the second.
pub fn format_minutes(minutes: f64) -> String {
    let total = (minutes * 60.0).round().max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
