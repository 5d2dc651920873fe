//! Simple TOML parser for the receiver configuration file
//!
//! This is a minimal parser that handles only the subset the
//! configuration file uses. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (integer, boolean)
//! - [section] headers
//! - Comments (# ...), including trailing comments
//!
//! Unknown keys and sections are rejected so that a typo does not
//! silently fall back to a default.

use super::types::AppConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid or unknown section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Key not known in its section
    UnknownKey,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Rs485,
    Status,
}

/// Parse TOML configuration into an [`AppConfig`]
///
/// Missing keys keep their defaults; the status window is normalized.
pub fn parse_config(input: &str) -> Result<AppConfig, ParseError> {
    let mut config = AppConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();

        // Skip empty lines and comments
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or(ParseError::InvalidSection)?
                .trim();
            section = match name {
                "rs485" => Section::Rs485,
                "status" => Section::Status,
                _ => return Err(ParseError::InvalidSection),
            };
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(ParseError::InvalidValue)?;
        let key = key.trim();
        let value = value.trim();

        match (section, key) {
            (Section::Rs485, "enable_inverted") => {
                config.rs485.enable_inverted = parse_bool(value)?;
            }
            (Section::Status, "report_interval_ms") => {
                config.status.report_interval_ms = parse_int(value)?;
            }
            (Section::Status, "watch_start") => {
                config.status.watch_start = parse_int(value)?;
            }
            (Section::Status, "watch_count") => {
                config.status.watch_count = parse_int(value)?;
            }
            _ => return Err(ParseError::UnknownKey),
        }
    }

    config.status = config.status.normalized();
    Ok(config)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(index) => &line[..index],
        None => line,
    }
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_int<T: TryFrom<u64>>(value: &str) -> Result<T, ParseError> {
    let mut result: u64 = 0;
    let mut digits = 0;

    for c in value.chars() {
        // TOML allows `_` as a digit separator
        if c == '_' {
            continue;
        }
        let digit = c.to_digit(10).ok_or(ParseError::InvalidValue)?;
        result = result
            .checked_mul(10)
            .and_then(|r| r.checked_add(u64::from(digit)))
            .ok_or(ParseError::InvalidValue)?;
        digits += 1;
    }

    if digits == 0 {
        return Err(ParseError::InvalidValue);
    }
    T::try_from(result).map_err(|_| ParseError::InvalidValue)
}
