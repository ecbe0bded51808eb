//! Validation of configuration values
//!
//! Every parser here turns user text into a typed setting or a
//! [`ConfigError::InvalidValue`] naming the field.

use crate::error::ConfigError;

fn invalid(field: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a boolean flag (`true/false`, `yes/no`, `on/off`, `1/0`)
pub fn parse_bool(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(field, value, "expected true or false")),
    }
}

/// Parse an optional positive limit; `none` clears it
pub fn parse_limit(field: &str, value: &str) -> Result<Option<usize>, ConfigError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    match trimmed.parse::<usize>() {
        Ok(0) => Err(invalid(field, value, "must be greater than zero")),
        Ok(limit) => Ok(Some(limit)),
        Err(_) => Err(invalid(field, value, "expected a positive integer or 'none'")),
    }
}

/// Parse a whitespace separated command line; `default` or empty text clears it
pub fn parse_command(field: &str, value: &str) -> Result<Option<Vec<String>>, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("default") {
        return Ok(None);
    }
    let parts: Vec<String> = trimmed.split_whitespace().map(str::to_string).collect();
    if parts[0].starts_with('-') {
        return Err(invalid(field, value, "must start with a program name"));
    }
    Ok(Some(parts))
}
