//! Date values for `|` template tokens.
//!
//! Values are converted to UTC epoch milliseconds ("internal time") and then
//! rendered with d3-style directives (`%Y-%m-%d %H:%M`) in UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::display::display_value;
use crate::error::FormatError;
use crate::locale::FormatLocale;
use crate::number::to_fixed;

#[allow(clippy::expect_used)]
static DATETIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(-?[0-9]{4}|[0-9]{2})(?:-([0-9]?[0-9])(?:-([0-9]?[0-9])(?:[ Tt]([01]?[0-9]|2[0-3])(?::([0-5][0-9])(?::([0-5][0-9](?:\.[0-9]+)?))?(?:Z|z|[+\-][0-9]{2}(?::?[0-9]{2})?)?)?)?)?)?\s*$",
    )
    .expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static FRACTION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%([0-9])?f").expect("constant regex pattern is valid"));

/// Two-digit years map into `[1970, 2069]`.
const TWO_DIGIT_YEAR_BASE: i32 = 1970;

const MAX_PATTERN_DEPTH: u8 = 2;

/// Convert a date-like value to UTC epoch milliseconds.
///
/// Strings such as `2024`, `2024-03`, `2024-03-05 14:30:15.250` (optionally
/// with `T`, `Z` or an offset, which is ignored) are accepted. Numbers are
/// read through their text form, so `2024` is the year 2024.
///
/// Two-digit years use the fixed window 1970-2069 (`"60"` is 2060), rather
/// than a window that slides with the current year.
pub fn to_internal_time(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => parse_date_time(s),
        Value::Number(_) => parse_date_time(&display_value(value)),
        _ => None,
    }
}

pub fn parse_date_time(s: &str) -> Option<f64> {
    let caps = DATETIME_REGEX.captures(s)?;
    let year_str = &caps[1];
    let mut year: i32 = year_str.parse().ok()?;
    if year_str.len() == 2 {
        year = (year - TWO_DIGIT_YEAR_BASE % 100).rem_euclid(100) + TWO_DIGIT_YEAR_BASE;
    }
    let part = |i: usize, default: u32| -> Option<u32> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(default),
        }
    };
    let month = part(2, 1)?;
    let day = part(3, 1)?;
    let hour = part(4, 0)?;
    let minute = part(5, 0)?;
    let seconds: f64 = match caps.get(6) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0.0,
    };

    let dt = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)?;
    Some(dt.and_utc().timestamp_millis() as f64 + seconds * 1000.0)
}

impl FormatLocale {
    /// Render UTC epoch milliseconds with a d3-style time specifier.
    ///
    /// `%f` expands to the fractional seconds with trailing zeros dropped and
    /// `%<n>f` to at most `n` digits (n ≤ 6).
    pub fn format_date(&self, ms: f64, spec: &str) -> Result<String, FormatError> {
        let spec = FRACTION_REGEX.replace_all(spec, |caps: &regex::Captures<'_>| {
            let digits = caps
                .get(1)
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .filter(|d| *d > 0)
                .unwrap_or(6)
                .min(6);
            let fraction = to_fixed((ms / 1000.0).rem_euclid(1.0) + 2.0, digits);
            let trimmed = fraction.get(2..).unwrap_or("").trim_end_matches('0');
            if trimmed.is_empty() {
                "0".to_string()
            } else {
                trimmed.to_string()
            }
        });

        let whole = (ms + 0.05).floor() as i64;
        let dt = DateTime::from_timestamp_millis(whole)
            .ok_or_else(|| FormatError::InvalidDate(ms.to_string()))?
            .naive_utc();
        Ok(self.render(&spec, &dt, whole, 0))
    }

    fn render(&self, spec: &str, dt: &NaiveDateTime, ms: i64, depth: u8) -> String {
        let mut out = String::with_capacity(spec.len() + 8);
        let mut chars = spec.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            let pad = match chars.peek() {
                Some('-') => Some(""),
                Some('_') => Some(" "),
                Some('0') => Some("0"),
                _ => None,
            };
            if pad.is_some() {
                chars.next();
            }
            let Some(directive) = chars.next() else {
                break;
            };
            let pad = pad.unwrap_or(if directive == 'e' { " " } else { "0" });
            match self.directive(directive, dt, ms, pad, depth) {
                Some(text) => out.push_str(&text),
                None => out.push(directive),
            }
        }
        out
    }

    fn directive(
        &self,
        c: char,
        dt: &NaiveDateTime,
        ms: i64,
        pad: &str,
        depth: u8,
    ) -> Option<String> {
        // Locale patterns may reference each other (`%c` -> `%x, %X`) but never deeper.
        let nested = depth < MAX_PATTERN_DEPTH;
        let weekday = dt.weekday().num_days_from_sunday() as usize;
        let month0 = dt.month0() as usize;
        let yday0 = dt.ordinal0() as i64;
        let text = match c {
            'a' => self.short_days[weekday].clone(),
            'A' => self.days[weekday].clone(),
            'b' => self.short_months[month0].clone(),
            'B' => self.months[month0].clone(),
            'c' if nested => self.render(&self.date_time, dt, ms, depth + 1),
            'x' if nested => self.render(&self.date, dt, ms, depth + 1),
            'X' if nested => self.render(&self.time, dt, ms, depth + 1),
            'c' | 'x' | 'X' => String::new(),
            'd' | 'e' => pad_num(dt.day() as i64, pad, 2),
            'f' => pad_num(ms.rem_euclid(1000) * 1000, pad, 6),
            'g' => pad_num(dt.iso_week().year() as i64 % 100, pad, 2),
            'G' => pad_num(dt.iso_week().year() as i64 % 10000, pad, 4),
            'H' => pad_num(dt.hour() as i64, pad, 2),
            'I' => pad_num(dt.hour12().1 as i64, pad, 2),
            'j' => pad_num(yday0 + 1, pad, 3),
            'L' => pad_num(ms.rem_euclid(1000), pad, 3),
            'm' => pad_num(month0 as i64 + 1, pad, 2),
            'M' => pad_num(dt.minute() as i64, pad, 2),
            'p' => self.periods[usize::from(dt.hour() >= 12)].clone(),
            'q' => (month0 / 3 + 1).to_string(),
            'Q' => ms.to_string(),
            's' => ms.div_euclid(1000).to_string(),
            'S' => pad_num(dt.second() as i64, pad, 2),
            'u' => dt.weekday().number_from_monday().to_string(),
            'U' => pad_num((yday0 + 7 - weekday as i64) / 7, pad, 2),
            'V' => pad_num(dt.iso_week().week() as i64, pad, 2),
            'w' => weekday.to_string(),
            'W' => pad_num((yday0 + 7 - ((weekday as i64 + 6) % 7)) / 7, pad, 2),
            'y' => pad_num(dt.year() as i64 % 100, pad, 2),
            'Y' => pad_num(dt.year() as i64 % 10000, pad, 4),
            'Z' => "+0000".to_string(),
            '%' => "%".to_string(),
            _ => return None,
        };
        Some(text)
    }
}

fn pad_num(value: i64, fill: &str, width: usize) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let digits = value.unsigned_abs().to_string();
    let len = digits.len();
    if len < width {
        format!("{sign}{}{digits}", fill.repeat(width - len))
    } else {
        format!("{sign}{digits}")
    }
}
