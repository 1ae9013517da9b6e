//! Locale definition used by number and date formatting.
//!
//! Accepts the same JSON shape as a d3 locale definition; every field is
//! optional and falls back to en-US:
//!
//! ```json
//! { "decimal": ",", "thousands": ".", "grouping": [3], "currency": ["", " €"],
//!   "months": ["janvier", ...] }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// Formatting collaborator used by the template engine for `:` and `|` tokens.
pub trait ValueFormatter {
    /// Format `value` with a d3-style number specifier such as `$.2f`.
    fn format_number(&self, spec: &str, value: f64) -> Result<String, FormatError>;

    /// Format UTC epoch milliseconds with a d3-style time specifier such as `%Y-%m-%d`.
    fn format_time(&self, spec: &str, ms: f64) -> Result<String, FormatError>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormatLocale {
    pub decimal: String,
    pub thousands: String,
    pub grouping: Vec<usize>,
    /// Currency prefix and suffix used by the `$` symbol.
    pub currency: [String; 2],
    /// Replacement glyphs for the digits 0-9.
    pub numerals: Option<Vec<String>>,
    pub percent: String,
    pub minus: String,
    pub nan: String,

    /// `%c` pattern.
    pub date_time: String,
    /// `%x` pattern.
    pub date: String,
    /// `%X` pattern.
    pub time: String,
    pub periods: [String; 2],
    pub days: [String; 7],
    pub short_days: [String; 7],
    pub months: [String; 12],
    pub short_months: [String; 12],
}

fn strings<const N: usize>(items: [&str; N]) -> [String; N] {
    items.map(str::to_string)
}

impl Default for FormatLocale {
    fn default() -> Self {
        Self {
            decimal: ".".into(),
            thousands: ",".into(),
            grouping: vec![3],
            currency: strings(["$", ""]),
            numerals: None,
            percent: "%".into(),
            minus: "-".into(),
            nan: "NaN".into(),
            date_time: "%x, %X".into(),
            date: "%-m/%-d/%Y".into(),
            time: "%-I:%M:%S %p".into(),
            periods: strings(["AM", "PM"]),
            days: strings([
                "Sunday",
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
            ]),
            short_days: strings(["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]),
            months: strings([
                "January",
                "February",
                "March",
                "April",
                "May",
                "June",
                "July",
                "August",
                "September",
                "October",
                "November",
                "December",
            ]),
            short_months: strings([
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ]),
        }
    }
}

impl FormatLocale {
    /// Load a locale from a d3-style JSON definition.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

impl ValueFormatter for FormatLocale {
    fn format_number(&self, spec: &str, value: f64) -> Result<String, FormatError> {
        Ok(self.number_format(spec)?.format(value))
    }

    fn format_time(&self, spec: &str, ms: f64) -> Result<String, FormatError> {
        if !ms.is_finite() {
            return Err(FormatError::InvalidDate(ms.to_string()));
        }
        self.format_date(ms, spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_definition_keeps_defaults() {
        let locale = FormatLocale::from_json(
            r#"{ "decimal": ",", "thousands": ".", "currency": ["", " €"], "shortDays": ["di", "lu", "ma", "me", "je", "ve", "sa"] }"#,
        )
        .unwrap();
        assert_eq!(locale.decimal, ",");
        assert_eq!(locale.currency[1], " €");
        assert_eq!(locale.short_days[1], "lu");
        assert_eq!(locale.grouping, vec![3]);
        assert_eq!(locale.months[0], "January");
    }

    #[test]
    fn round_trips_through_json() {
        let locale = FormatLocale::default();
        let s = serde_json::to_string(&locale).unwrap();
        assert!(s.contains("\"shortMonths\""));
        assert!(s.contains("\"dateTime\""));
        assert_eq!(FormatLocale::from_json(&s).unwrap(), locale);
    }
}
