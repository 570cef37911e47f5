/*!
 * Timestamp shifting for XMLTV `start`/`stop` values.
 *
 * XMLTV timestamps look like `20260210180000 +0000`: fourteen digits of
 * local date-time, optionally followed by a space and a zone token. A source
 * may carry a configured offset such as `+0530` that is applied to every
 * programme it contributes.
 */

use chrono::{Duration, NaiveDateTime};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::EpgError;

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

static OFFSET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([+-])(\d{2})(\d{2})$").expect("offset pattern is valid"));

/// A parsed `+HHMM` / `-HHMM` offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOffset {
    /// `true` for `+`, `false` for `-`
    pub forward: bool,
    /// Hours component (0-23)
    pub hours: u32,
    /// Minutes component (0-59)
    pub minutes: u32,
}

impl TimeOffset {
    /// Parse an offset token; returns `None` for anything that is not `[+-]HHMM`
    /// with an in-range hour and minute.
    pub fn parse(token: &str) -> Option<Self> {
        let caps = OFFSET_PATTERN.captures(token.trim())?;
        let forward = &caps[1] == "+";
        let hours: u32 = caps[2].parse().ok()?;
        let minutes: u32 = caps[3].parse().ok()?;

        if hours > 23 || minutes > 59 {
            return None;
        }

        Some(Self { forward, hours, minutes })
    }

    /// Signed duration represented by this offset
    pub fn duration(&self) -> Duration {
        let total = Duration::hours(self.hours as i64) + Duration::minutes(self.minutes as i64);
        if self.forward { total } else { -total }
    }
}

/// Shift `timestamp` by `offset`, returning the input unchanged when either is
/// absent or anything fails to parse.
pub fn shift(timestamp: &str, offset: Option<&str>) -> String {
    let offset = match offset {
        Some(offset) if !offset.trim().is_empty() => offset,
        _ => return timestamp.to_string(),
    };

    if timestamp.is_empty() {
        return timestamp.to_string();
    }

    match try_shift(timestamp, offset) {
        Ok(shifted) => shifted,
        Err(e) => {
            debug!("Keeping original timestamp: {}", e);
            timestamp.to_string()
        }
    }
}

/// Shift `timestamp` by `offset`, reporting parse failures as `TimeParse`.
///
/// A forward shift relabels the zone token with the offset itself (the value
/// is converted into that zone). A backward shift only moves the clock and
/// keeps whatever zone suffix the source published.
pub fn try_shift(timestamp: &str, offset: &str) -> Result<String, EpgError> {
    let parse_error = || EpgError::TimeParse {
        timestamp: timestamp.to_string(),
        offset: offset.to_string(),
    };

    let parsed_offset = TimeOffset::parse(offset).ok_or_else(parse_error)?;

    let (base, suffix) = match timestamp.split_once(' ') {
        Some((base, suffix)) => (base, Some(suffix)),
        None => (timestamp, None),
    };

    if base.len() != 14 || !base.bytes().all(|b| b.is_ascii_digit()) {
        return Err(parse_error());
    }

    let local = NaiveDateTime::parse_from_str(base, TIMESTAMP_FORMAT).map_err(|_| parse_error())?;
    let shifted = local
        .checked_add_signed(parsed_offset.duration())
        .ok_or_else(parse_error)?;
    let digits = shifted.format(TIMESTAMP_FORMAT).to_string();

    let zone = if parsed_offset.forward {
        Some(offset.trim())
    } else {
        suffix
    };

    Ok(match zone {
        Some(zone) => format!("{} {}", digits, zone),
        None => digits,
    })
}
