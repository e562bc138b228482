// ✏️ Input Sanitation - Text fields → numbers
//
// Everything the user types passes through here before it reaches the
// selection state. The computation functions assume clean non-negative input.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("value is empty")]
    Empty,

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("value {0} is negative")]
    Negative(f64),
}

/// Strip a rupee sign / "Rs" prefix and Indian or western digit grouping
fn normalize(text: &str) -> String {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix('₹')
        .or_else(|| trimmed.strip_prefix("Rs."))
        .or_else(|| trimmed.strip_prefix("Rs"))
        .unwrap_or(trimmed);
    trimmed.trim().chars().filter(|c| *c != ',').collect()
}

/// Parse a non-negative amount such as "₹1,20,000" or "80.5"
pub fn parse_amount(text: &str) -> Result<f64, InputError> {
    let cleaned = normalize(text);
    if cleaned.is_empty() {
        return Err(InputError::Empty);
    }

    let value: f64 = cleaned
        .parse()
        .map_err(|_| InputError::NotANumber(text.trim().to_string()))?;
    if !value.is_finite() {
        return Err(InputError::NotANumber(text.trim().to_string()));
    }
    if value < 0.0 {
        return Err(InputError::Negative(value));
    }
    Ok(value)
}

/// Amount or 0 when the text is not a valid non-negative number
pub fn sanitize_amount(text: &str) -> f64 {
    parse_amount(text).unwrap_or(0.0)
}

/// New value for an edited field: the parsed amount, or `current` unchanged
/// when the text is rejected
pub fn apply_amount(current: f64, text: &str) -> f64 {
    parse_amount(text).unwrap_or(current)
}

/// Parse a whole-number quantity
pub fn parse_quantity(text: &str) -> Result<u32, InputError> {
    let cleaned = normalize(text);
    if cleaned.is_empty() {
        return Err(InputError::Empty);
    }

    match cleaned.parse::<i64>() {
        Ok(value) if value < 0 => Err(InputError::Negative(value as f64)),
        Ok(value) => u32::try_from(value).map_err(|_| InputError::NotANumber(cleaned)),
        Err(_) => Err(InputError::NotANumber(text.trim().to_string())),
    }
}
