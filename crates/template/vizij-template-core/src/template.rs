//! `%{...}` substitution against JSON data.
//!
//! Two entry points with different empty-value rules:
//!
//! - [`template_string`] is the plain variant used for computed text. Any
//!   falsy result (`null`, `false`, `0`, `NaN`, `""`, missing) becomes `""`.
//! - [`template_format_string`] (and the [`hovertemplate_string`] /
//!   [`texttemplate_string`] wrappers) apply number/date formats, label
//!   fallbacks and throttled warnings. Every defined value is substituted,
//!   `0` included; missing keys stay in the output verbatim.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vizij_path_core::accessor::own_property;
use vizij_path_core::{is_simple_key, JsonAccessor, PropertyAccessor, PropertyPath};

use crate::display::{display_value, is_truthy, to_number};
use crate::error::FormatError;
use crate::locale::ValueFormatter;
use crate::throttle::{LogSink, WarningSink, WarningThrottle};
use crate::time::to_internal_time;
use crate::token::{replace_tokens, TemplateToken, TokenFormat};

/// Suffix of the label entries preferred over raw values (`xLabel` for `%{x}`).
pub const LABEL_SUFFIX: &str = "Label";

fn lookup<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    if is_simple_key(key) {
        own_property(data, key)
    } else {
        JsonAccessor.get(data, &PropertyPath::parse(key))
    }
}

/// Substitute `%{key}` tokens from `data`, blanking falsy values.
pub fn template_string(template: &str, data: &Value) -> String {
    let mut cache: HashMap<String, Option<&Value>> = HashMap::new();
    replace_tokens(template, |token| {
        let found = *cache
            .entry(token.key.clone())
            .or_insert_with(|| lookup(data, &token.key));
        match found {
            Some(value) if is_truthy(value) => display_value(value),
            _ => String::new(),
        }
    })
}

/// Formatting interpolator for one locale and one warning destination.
pub struct TemplateFormatter<'a> {
    formatter: &'a dyn ValueFormatter,
    sink: &'a dyn WarningSink,
}

impl<'a> TemplateFormatter<'a> {
    /// Interpolator that reports unresolved keys through the `log` facade.
    pub fn new(formatter: &'a dyn ValueFormatter) -> Self {
        Self {
            formatter,
            sink: &LogSink,
        }
    }

    pub fn with_sink(formatter: &'a dyn ValueFormatter, sink: &'a dyn WarningSink) -> Self {
        Self { formatter, sink }
    }

    /// Substitute every token of `template`.
    ///
    /// `sources` are searched in order and `None`/`null` entries are skipped.
    /// An own property of a source wins over a path lookup in the same
    /// source; the first source producing a value (even `null`) ends the
    /// search.
    pub fn format(
        &self,
        template: &str,
        labels: Option<&Value>,
        throttle: &mut WarningThrottle,
        sources: &[Option<&Value>],
    ) -> String {
        let mut cache: HashMap<String, Option<&Value>> = HashMap::new();
        replace_tokens(template, |token| {
            let found = *cache
                .entry(token.key.clone())
                .or_insert_with(|| resolve(sources, &token.key));
            match found {
                Some(value) => self.render(&token, value, labels),
                None => {
                    throttle.record_missing(&token.key, self.sink);
                    token.raw
                }
            }
        })
    }

    fn render(&self, token: &TemplateToken, value: &Value, labels: Option<&Value>) -> String {
        match &token.format {
            Some(TokenFormat::Number(spec)) => self
                .formatter
                .format_number(spec, to_number(value))
                .unwrap_or_else(|err| {
                    log::debug!(target: "vizij_template", "{}: {err}", token.raw);
                    display_value(value)
                }),
            Some(TokenFormat::Date(spec)) => to_internal_time(value)
                .ok_or_else(|| FormatError::InvalidDate(display_value(value)))
                .and_then(|ms| self.formatter.format_time(spec, ms))
                .unwrap_or_else(|err| {
                    log::debug!(target: "vizij_template", "{}: {err}", token.raw);
                    display_value(value)
                }),
            None => {
                let label_key = format!("{}{LABEL_SUFFIX}", token.key);
                match labels.and_then(|l| own_property(l, &label_key)) {
                    Some(label) => display_value(label),
                    None => display_value(value),
                }
            }
        }
    }
}

fn resolve<'s>(sources: &[Option<&'s Value>], key: &str) -> Option<&'s Value> {
    let simple = is_simple_key(key);
    let path = (!simple).then(|| PropertyPath::parse(key));
    sources
        .iter()
        .flatten()
        .copied()
        .filter(|source| !source.is_null())
        .find_map(|source| {
            own_property(source, key).or_else(|| {
                path.as_ref()
                    .and_then(|path| JsonAccessor.get(source, path))
            })
        })
}

/// [`TemplateFormatter::format`] with warnings sent to the `log` facade.
pub fn template_format_string(
    template: &str,
    labels: Option<&Value>,
    formatter: &dyn ValueFormatter,
    throttle: &mut WarningThrottle,
    sources: &[Option<&Value>],
) -> String {
    TemplateFormatter::new(formatter).format(template, labels, throttle, sources)
}

/// Warning throttles for the two template families a chart renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateWarnings {
    pub hovertemplate: WarningThrottle,
    pub texttemplate: WarningThrottle,
}

impl Default for TemplateWarnings {
    fn default() -> Self {
        Self {
            hovertemplate: WarningThrottle::hovertemplate(),
            texttemplate: WarningThrottle::texttemplate(),
        }
    }
}

pub fn hovertemplate_string(
    template: &str,
    labels: Option<&Value>,
    formatter: &dyn ValueFormatter,
    warnings: &mut TemplateWarnings,
    sources: &[Option<&Value>],
) -> String {
    template_format_string(
        template,
        labels,
        formatter,
        &mut warnings.hovertemplate,
        sources,
    )
}

pub fn texttemplate_string(
    template: &str,
    labels: Option<&Value>,
    formatter: &dyn ValueFormatter,
    warnings: &mut TemplateWarnings,
    sources: &[Option<&Value>],
) -> String {
    template_format_string(
        template,
        labels,
        formatter,
        &mut warnings.texttemplate,
        sources,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::FormatLocale;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn simple_variant_blanks_falsy_values() {
        let data = json!({ "a": 0, "b": "", "c": false, "d": null, "e": 2 });
        assert_eq!(template_string("%{a}|%{b}|%{c}|%{d}|%{e}|%{z}", &data), "||||2|");
    }

    #[test]
    fn simple_variant_ignores_formats() {
        let data = json!({ "y": 1.5 });
        assert_eq!(template_string("%{y:.2f}", &data), "1.5");
    }

    #[test]
    fn dotted_keys_walk_paths() {
        let data = json!({ "a": { "b": 1 } });
        assert_eq!(template_string("[%{a_b}]", &data), "[]");
        assert_eq!(template_string("[%{a.b}]", &data), "[1]");
    }

    #[test]
    fn own_dotted_property_wins_over_path() {
        let locale = FormatLocale::default();
        let mut throttle = WarningThrottle::hovertemplate();
        let source = json!({ "a.b": "own", "a": { "b": "nested" } });
        let out = template_format_string("%{a.b}", None, &locale, &mut throttle, &[Some(&source)]);
        assert_eq!(out, "own");
    }

    #[test]
    fn found_null_stops_the_search() {
        let locale = FormatLocale::default();
        let mut throttle = WarningThrottle::hovertemplate();
        let first = json!({ "x": null });
        let second = json!({ "x": 5 });
        let out = template_format_string(
            "%{x}",
            None,
            &locale,
            &mut throttle,
            &[None, Some(&Value::Null), Some(&first), Some(&second)],
        );
        assert_eq!(out, "null");
        assert_eq!(throttle.count(), 0);
    }

    #[test]
    fn date_token_formats_value() {
        let locale = FormatLocale::default();
        let mut throttle = WarningThrottle::hovertemplate();
        let source = json!({ "x": "2024-01-01" });
        let out = template_format_string("%{x|%-d %b}", None, &locale, &mut throttle, &[Some(&source)]);
        assert_eq!(out, "1 Jan");
    }

    #[test]
    fn bad_format_falls_back_to_display() {
        let locale = FormatLocale::default();
        let mut throttle = WarningThrottle::hovertemplate();
        let source = json!({ "y": 3.25, "t": "not a date" });
        let out = template_format_string(
            "%{y:,,} %{t|%Y}",
            None,
            &locale,
            &mut throttle,
            &[Some(&source)],
        );
        assert_eq!(out, "3.25 not a date");
    }

    #[test]
    fn repeated_missing_key_warns_each_time() {
        let messages = RefCell::new(Vec::<String>::new());
        let sink = |m: &str| messages.borrow_mut().push(m.to_string());
        let locale = FormatLocale::default();
        let formatter = TemplateFormatter::with_sink(&locale, &sink);
        let mut throttle = WarningThrottle::texttemplate();
        let out = formatter.format("%{q} %{q}", None, &mut throttle, &[]);
        assert_eq!(out, "%{q} %{q}");
        assert_eq!(throttle.count(), 2);
        assert_eq!(messages.borrow()[0], "Variable 'q' in texttemplate could not be found!");
    }

    #[test]
    fn warnings_default_to_ten_per_family() {
        let warnings = TemplateWarnings::default();
        assert_eq!(warnings.hovertemplate.name, "hovertemplate");
        assert_eq!(warnings.texttemplate.max, 10);
    }
}
