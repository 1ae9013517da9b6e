//! Template token grammar.
//!
//! A token is `%{key}`, `%{key:numberformat}` or `%{key|dateformat}`. The key
//! is any run of characters other than whitespace and `%{}:|`, so it may be a
//! property path such as `trace[0].name`. The format is opaque up to the
//! closing brace.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

#[allow(clippy::expect_used)]
pub static TEMPLATE_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%\{([^\s%{}:|]+)([|:][^}]*)?\}").expect("constant regex pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenFormat {
    /// `:` directive, handed to the number formatter without the separator.
    Number(String),
    /// `|` directive, handed to the date formatter without the separator.
    Date(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateToken {
    /// Full matched text, used verbatim when the key cannot be resolved.
    pub raw: String,
    pub key: String,
    pub format: Option<TokenFormat>,
}

impl TemplateToken {
    pub fn from_captures(caps: &Captures<'_>) -> Self {
        let format = caps.get(2).and_then(|m| {
            let directive = m.as_str();
            let spec = directive[1..].to_string();
            match directive.as_bytes()[0] {
                b':' => Some(TokenFormat::Number(spec)),
                b'|' => Some(TokenFormat::Date(spec)),
                _ => None,
            }
        });
        TemplateToken {
            raw: caps[0].to_string(),
            key: caps[1].to_string(),
            format,
        }
    }
}

/// All tokens of `template`, in order of appearance.
pub fn tokens(template: &str) -> impl Iterator<Item = TemplateToken> + '_ {
    TEMPLATE_TOKEN_REGEX
        .captures_iter(template)
        .map(|caps| TemplateToken::from_captures(&caps))
}

/// Replace every token of `template` with the string produced by `f`.
pub fn replace_tokens<F>(template: &str, mut f: F) -> String
where
    F: FnMut(TemplateToken) -> String,
{
    TEMPLATE_TOKEN_REGEX
        .replace_all(template, |caps: &Captures<'_>| f(TemplateToken::from_captures(caps)))
        .into_owned()
}
