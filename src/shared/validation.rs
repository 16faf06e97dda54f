use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::borrow::Cow;
use serde::{Deserialize, Deserializer};
use validator::{ValidateUrl, ValidationError};

use crate::shared::constants::{MAX_RATING, MIN_RATING};

lazy_static! {
    /// Regex for `#RRGGBB` colors
    /// - Valid: "#1a2B3c", "#FFFFFF"
    /// - Invalid: "1a2b3c", "#fff", "#12345g"
    pub static ref HEX_COLOR_REGEX: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();

    /// Regex for icon keys resolved by the front-end icon set
    /// Must be lowercase kebab-case starting with a letter
    /// - Valid: "mountain", "tree-palm", "utensils-crossed", "building-2"
    /// - Invalid: "Mountain", "-tree", "tree_palm", "tree--palm"
    pub static ref ICON_KEY_REGEX: Regex = Regex::new(r"^[a-z][a-z0-9]*(?:-[a-z0-9]+)*$").unwrap();

    /// Regex for contact phone numbers (optional leading '+', digits, spaces, dashes, parens).
    /// 6 to 20 characters in total, '+' included.
    pub static ref PHONE_REGEX: Regex =
        Regex::new(r"^(?:\+[0-9 ()-]{5,19}|[0-9 ()-]{6,20})$").unwrap();
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Rejects empty or whitespace-only strings
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("blank", "must not be empty"));
    }
    Ok(())
}

/// Rejects lists containing empty or whitespace-only entries
pub fn validate_no_blank_items(values: &[String]) -> Result<(), ValidationError> {
    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(error("blank_item", "must not contain empty entries"));
    }
    Ok(())
}

/// Every entry must be a non-blank absolute URL
pub fn validate_image_urls(values: &[String]) -> Result<(), ValidationError> {
    if values.iter().any(|v| v.trim().is_empty() || !v.validate_url()) {
        return Err(error("image_url", "must contain only valid image URLs"));
    }
    Ok(())
}

/// Deserialize an optional string, treating blank input as absent.
///
/// Admin forms submit untouched optional inputs as `""`.
pub fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

/// Rating must be within 0.0..=5.0
pub fn validate_rating(value: &Decimal) -> Result<(), ValidationError> {
    match value.to_f64() {
        Some(v) if (MIN_RATING..=MAX_RATING).contains(&v) => Ok(()),
        _ => Err(error("rating", "must be between 0 and 5")),
    }
}
