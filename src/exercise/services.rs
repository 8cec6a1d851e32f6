use lazy_static::lazy_static;
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::exercise::repo_types::LogEntry;

const USER_ID_LEN: usize = 12;

/// Generate the short random token used as a user id.
pub fn generate_user_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(USER_ID_LEN)
        .map(char::from)
        .collect()
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{1,32}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

#[derive(Debug, Error)]
#[error("invalid date: {0}")]
pub struct InvalidDate(pub String);

/// Parse a caller-supplied date: a plain `YYYY-MM-DD` is taken as midnight
/// UTC; a full RFC 3339 timestamp is accepted as-is.
pub fn parse_date(raw: &str) -> Result<OffsetDateTime, InvalidDate> {
    let raw = raw.trim();
    if let Ok(date) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
        return Ok(PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc());
    }
    OffsetDateTime::parse(raw, &Rfc3339).map_err(|_| InvalidDate(raw.to_string()))
}

/// Resolve the optional date of a new entry. Absent or empty input falls back
/// to `now`, which callers take per request, never at startup.
pub fn resolve_exercise_date(
    raw: Option<&str>,
    now: OffsetDateTime,
) -> Result<OffsetDateTime, InvalidDate> {
    match raw {
        None => Ok(now),
        Some(s) if s.trim().is_empty() => Ok(now),
        Some(s) => parse_date(s),
    }
}

/// Render a timestamp in the fixed `Thu Jan 05 2023` form: weekday, month,
/// zero-padded day, year, no time-of-day.
pub fn format_date(ts: OffsetDateTime) -> String {
    ts.format(format_description!(
        "[weekday repr:short] [month repr:short] [day] [year]"
    ))
    .unwrap_or_else(|_| ts.to_string())
}

/// Apply inclusive from/to bounds, then truncate to the first `limit` entries
/// of the filtered sequence. Order is preserved throughout.
pub fn filter_log(
    entries: &[LogEntry],
    from: Option<OffsetDateTime>,
    to: Option<OffsetDateTime>,
    limit: Option<usize>,
) -> Vec<LogEntry> {
    let mut kept: Vec<LogEntry> = entries
        .iter()
        .filter(|e| {
            if let Some(from) = from {
                if e.exercise_date < from {
                    return false;
                }
            }
            if let Some(to) = to {
                if e.exercise_date > to {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect();
    if let Some(limit) = limit {
        kept.truncate(limit);
    }
    kept
}
