use chrono::{DateTime, Duration, SecondsFormat, Utc};
use thiserror::Error;

/// Plausible-range bounds applied when a caller asks for validated data.
/// Readings outside these bounds are stored anyway and only filtered at
/// read time.
pub const TEMPERATURE_MIN_EXCLUSIVE: f64 = -40.0;
pub const TEMPERATURE_MAX_EXCLUSIVE: f64 = 85.0;
pub const HUMIDITY_MIN_INCLUSIVE: f64 = 0.0;
pub const HUMIDITY_MAX_INCLUSIVE: f64 = 100.0;
pub const PRESSURE_MIN_EXCLUSIVE: f64 = 300.0;
pub const PRESSURE_MAX_EXCLUSIVE: f64 = 1100.0;

pub fn is_plausible(temperature: f64, humidity: f64, pressure: f64) -> bool {
    temperature > TEMPERATURE_MIN_EXCLUSIVE
        && temperature < TEMPERATURE_MAX_EXCLUSIVE
        && humidity >= HUMIDITY_MIN_INCLUSIVE
        && humidity <= HUMIDITY_MAX_INCLUSIVE
        && pressure > PRESSURE_MIN_EXCLUSIVE
        && pressure < PRESSURE_MAX_EXCLUSIVE
}

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("invalid {param} timestamp: {value}")]
    InvalidTimestamp { param: &'static str, value: String },
    #[error("invalid range: {value} (expected <integer><h|d|w>, e.g. 24h)")]
    InvalidRange { value: String },
}

/// Resolved inclusive time window, both bounds optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Store-level filter for the readings query.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingFilter {
    pub device_id: Option<String>,
    pub window: TimeWindow,
    pub validated: bool,
    pub limit: u32,
}

/// Resolves the query's time window. An explicit `from` wins over `range`;
/// `to` is independent. Malformed values are rejected rather than silently
/// ignored.
pub fn resolve_window(
    from: Option<&str>,
    to: Option<&str>,
    range: Option<&str>,
    now: DateTime<Utc>,
) -> Result<TimeWindow, FilterError> {
    let to = to.map(|raw| parse_timestamp("to", raw)).transpose()?;

    let from = match from {
        Some(raw) => Some(parse_timestamp("from", raw)?),
        None => match range {
            Some(raw) => {
                let lower = now.checked_sub_signed(parse_range(raw)?).ok_or_else(|| {
                    FilterError::InvalidRange {
                        value: raw.to_string(),
                    }
                })?;
                Some(lower)
            }
            None => None,
        },
    };

    Ok(TimeWindow { from, to })
}

/// Parses a relative range of the form `<integer><unit>` with unit one of
/// `h` (hours), `d` (days), `w` (weeks). Quantities that do not fit a
/// `Duration` are rejected like any other malformed value.
pub fn parse_range(raw: &str) -> Result<Duration, FilterError> {
    let invalid = || FilterError::InvalidRange {
        value: raw.to_string(),
    };

    let digits_end = raw
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(idx, _)| idx)
        .ok_or_else(invalid)?;

    let quantity: i64 = raw[..digits_end].parse().map_err(|_| invalid())?;

    let duration = match &raw[digits_end..] {
        "h" => Duration::try_hours(quantity),
        "d" => Duration::try_days(quantity),
        "w" => Duration::try_weeks(quantity),
        _ => None,
    };

    duration.ok_or_else(invalid)
}

fn parse_timestamp(param: &'static str, raw: &str) -> Result<DateTime<Utc>, FilterError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| FilterError::InvalidTimestamp {
            param,
            value: raw.to_string(),
        })
}

/// Truthy spelling accepted for the `validated` query flag.
pub fn is_truthy_flag(raw: &str) -> bool {
    matches!(raw.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

/// Wire/storage timestamp format: RFC3339 millis in UTC, which sorts
/// lexicographically.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
