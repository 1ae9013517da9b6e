//! d3-style number formatting.
//!
//! Specifier grammar: `[[fill]align][sign][symbol][0][width][,][.precision][~][type]`
//!
//! | type | output |
//! |------|--------|
//! | `e` | exponent notation |
//! | `f` | fixed point |
//! | `g` | significant digits, fixed or exponent |
//! | `r` | significant digits, always fixed |
//! | `s` | significant digits with an SI prefix |
//! | `%` / `p` | `f` / `r` times 100 with a percent sign |
//! | `d` `b` `o` `x` `X` | rounded integer in base 10/2/8/16 |
//! | `c` | the value as text |
//! | `n` | `,g` |
//! | none | `.12~g` |
//!
//! Rounding is half away from zero on the exact binary value, so `2.5` with
//! `.0f` gives `3` and `1.005` with `.2f` gives `1.00`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::display::number_to_string;
use crate::error::FormatError;
use crate::locale::FormatLocale;

#[allow(clippy::expect_used)]
static SPECIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(.)?([<>=^]))?([+\-( ])?([$#])?(0)?([0-9]+)?(,)?(\.[0-9]+)?(~)?([a-zA-Z%])?$",
    )
    .expect("constant regex pattern is valid")
});

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

const KNOWN_TYPES: &str = "%bcdefgoprsXx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
    /// Padding goes between the sign/symbol and the digits.
    AfterSign,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpecifier {
    pub fill: char,
    pub align: Align,
    /// One of `-`, `+`, `(` or ` `.
    pub sign: char,
    /// `$` or `#`.
    pub symbol: Option<char>,
    pub zero: bool,
    pub width: Option<usize>,
    pub comma: bool,
    pub precision: Option<usize>,
    pub trim: bool,
    pub kind: Option<char>,
}

impl FormatSpecifier {
    pub fn parse(spec: &str) -> Result<Self, FormatError> {
        let invalid = || FormatError::InvalidNumberFormat(spec.to_string());
        let caps = SPECIFIER_REGEX.captures(spec).ok_or_else(invalid)?;
        let first_char = |i: usize| caps.get(i).and_then(|m| m.as_str().chars().next());

        let align = match first_char(2) {
            Some('<') => Align::Left,
            Some('^') => Align::Center,
            Some('=') => Align::AfterSign,
            _ => Align::Right,
        };
        let width = match caps.get(6) {
            Some(m) => Some(m.as_str().parse::<usize>().map_err(|_| invalid())?),
            None => None,
        };
        let precision = match caps.get(8) {
            Some(m) => Some(m.as_str()[1..].parse::<usize>().map_err(|_| invalid())?),
            None => None,
        };

        Ok(FormatSpecifier {
            fill: first_char(1).unwrap_or(' '),
            align,
            sign: first_char(3).unwrap_or('-'),
            symbol: first_char(4),
            zero: caps.get(5).is_some(),
            width,
            comma: caps.get(7).is_some(),
            precision,
            trim: caps.get(9).is_some(),
            kind: first_char(10),
        })
    }
}

/// A compiled specifier bound to a locale.
#[derive(Debug, Clone)]
pub struct NumberFormat<'a> {
    locale: &'a FormatLocale,
    fill: char,
    align: Align,
    sign: char,
    zero: bool,
    width: usize,
    comma: bool,
    precision: usize,
    trim: bool,
    kind: char,
    prefix: String,
    suffix: String,
    maybe_suffix: bool,
}

impl FormatLocale {
    /// Compile a d3-style number specifier against this locale.
    pub fn number_format(&self, spec: &str) -> Result<NumberFormat<'_>, FormatError> {
        let s = FormatSpecifier::parse(spec)?;
        let mut comma = s.comma;
        let mut precision = s.precision;
        let mut trim = s.trim;
        let mut kind = s.kind.unwrap_or('\0');

        if kind == 'n' {
            comma = true;
            kind = 'g';
        } else if !KNOWN_TYPES.contains(kind) {
            precision.get_or_insert(12);
            trim = true;
            kind = 'g';
        }

        let (mut fill, mut align, mut zero) = (s.fill, s.align, s.zero);
        if zero || (fill == '0' && align == Align::AfterSign) {
            zero = true;
            fill = '0';
            align = Align::AfterSign;
        }

        let prefix = match s.symbol {
            Some('$') => self.currency[0].clone(),
            Some('#') if "boxX".contains(kind) => format!("0{}", kind.to_ascii_lowercase()),
            _ => String::new(),
        };
        let suffix = match s.symbol {
            Some('$') => self.currency[1].clone(),
            _ if "%p".contains(kind) => self.percent.clone(),
            _ => String::new(),
        };

        let precision = match precision {
            None => 6,
            Some(p) if "gprs".contains(kind) => p.clamp(1, 21),
            Some(p) => p.min(20),
        };

        Ok(NumberFormat {
            locale: self,
            fill,
            align,
            sign: s.sign,
            zero,
            width: s.width.unwrap_or(0),
            comma,
            precision,
            trim,
            kind,
            prefix,
            suffix,
            maybe_suffix: "defgprs%".contains(kind),
        })
    }
}

impl NumberFormat<'_> {
    pub fn format(&self, value: f64) -> String {
        let locale = self.locale;
        let mut value_prefix = self.prefix.clone();
        let mut value_suffix = self.suffix.clone();
        let mut body;

        if self.kind == 'c' {
            value_suffix = format!("{}{}", number_to_string(value), value_suffix);
            body = String::new();
        } else {
            let mut negative = value < 0.0 || (value == 0.0 && value.is_sign_negative());
            let mut si_exponent = 0;
            body = if value.is_nan() {
                locale.nan.clone()
            } else {
                let (text, exponent) = self.format_type(value.abs());
                si_exponent = exponent;
                text
            };
            if self.trim {
                body = format_trim(&body);
            }
            // A negative value that rounds to zero loses its sign unless `+` asked for it.
            if negative && self.sign != '+' && body.parse::<f64>().map_or(false, |v| v == 0.0) {
                negative = false;
            }

            let sign = if negative {
                if self.sign == '(' {
                    "(".to_string()
                } else {
                    locale.minus.clone()
                }
            } else if self.sign == '-' || self.sign == '(' {
                String::new()
            } else {
                self.sign.to_string()
            };
            value_prefix = sign + &value_prefix;

            let si = if self.kind == 's' {
                SI_PREFIXES[(8 + si_exponent / 3) as usize]
            } else {
                ""
            };
            let close = if negative && self.sign == '(' { ")" } else { "" };
            value_suffix = format!("{si}{value_suffix}{close}");

            // Split off the fraction or exponent, which is not grouped.
            if self.maybe_suffix {
                if let Some(i) = body.find(|c: char| !c.is_ascii_digit()) {
                    let tail = &body[i..];
                    let moved = match tail.strip_prefix('.') {
                        Some(fraction) => format!("{}{}", locale.decimal, fraction),
                        None => tail.to_string(),
                    };
                    value_suffix = moved + &value_suffix;
                    body.truncate(i);
                }
            }
        }

        if self.comma && !self.zero {
            body = self.group(&body, usize::MAX);
        }

        let length =
            value_prefix.chars().count() + body.chars().count() + value_suffix.chars().count();
        let mut padding = if length < self.width {
            self.fill.to_string().repeat(self.width - length)
        } else {
            String::new()
        };

        if self.comma && self.zero {
            let width = if padding.is_empty() {
                usize::MAX
            } else {
                self.width.saturating_sub(value_suffix.chars().count())
            };
            body = self.group(&format!("{padding}{body}"), width);
            padding.clear();
        }

        let out = match self.align {
            Align::Left => format!("{value_prefix}{body}{value_suffix}{padding}"),
            Align::AfterSign => format!("{value_prefix}{padding}{body}{value_suffix}"),
            Align::Center => {
                let pad: Vec<char> = padding.chars().collect();
                let half = pad.len() / 2;
                let left: String = pad[..half].iter().collect();
                let right: String = pad[half..].iter().collect();
                format!("{left}{value_prefix}{body}{value_suffix}{right}")
            }
            Align::Right => format!("{padding}{value_prefix}{body}{value_suffix}"),
        };
        self.numerals(out)
    }

    /// Type-specific rendering of a non-negative value; the second element is
    /// the SI exponent chosen by `s`.
    fn format_type(&self, x: f64) -> (String, i32) {
        let p = self.precision;
        if x.is_infinite() {
            return ("Infinity".to_string(), 0);
        }
        let text = match self.kind {
            '%' => to_fixed(x * 100.0, p),
            'b' => format!("{:b}", round_int(x)),
            'o' => format!("{:o}", round_int(x)),
            'x' => format!("{:x}", round_int(x)),
            'X' => format!("{:X}", round_int(x)),
            'd' => format!("{:.0}", x.round()),
            'e' => to_exponential(x, Some(p)),
            'f' => to_fixed(x, p),
            'p' => format_rounded(x * 100.0, p),
            'r' => format_rounded(x, p),
            's' => return format_prefix_auto(x, p),
            _ => to_precision(x, p),
        };
        (text, 0)
    }

    fn group(&self, value: &str, width: usize) -> String {
        let grouping = &self.locale.grouping;
        if grouping.is_empty() {
            return value.to_string();
        }
        let chars: Vec<char> = value.chars().collect();
        let mut i = chars.len();
        let mut parts: Vec<String> = Vec::new();
        let mut j = 0;
        let mut g = grouping[0];
        let mut length = 0usize;

        while i > 0 && g > 0 {
            if length.saturating_add(g + 1) > width {
                g = width.saturating_sub(length).max(1);
            }
            let start = i.saturating_sub(g);
            parts.push(chars[start..i].iter().collect());
            i = start;
            length = length.saturating_add(g + 1);
            if length > width {
                break;
            }
            j = (j + 1) % grouping.len();
            g = grouping[j];
        }
        parts.reverse();
        parts.join(&self.locale.thousands)
    }

    fn numerals(&self, value: String) -> String {
        match &self.locale.numerals {
            Some(glyphs) if glyphs.len() == 10 => value
                .chars()
                .map(|c| match c.to_digit(10) {
                    Some(d) => glyphs[d as usize].clone(),
                    None => c.to_string(),
                })
                .collect(),
            _ => value,
        }
    }
}

fn round_int(x: f64) -> u128 {
    x.round() as u128
}

/// Remove insignificant trailing zeros, e.g. `1.500` → `1.5`, `2.000e+3` → `2e+3`.
fn format_trim(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut i0: isize = -1;
    let mut i1: usize = 0;
    for (i, &c) in chars.iter().enumerate().skip(1) {
        match c {
            '.' => {
                i0 = i as isize;
                i1 = i;
            }
            '0' => {
                if i0 == 0 {
                    i0 = i as isize;
                }
                i1 = i;
            }
            '1'..='9' => {
                if i0 > 0 {
                    i0 = 0;
                }
            }
            _ => break,
        }
    }
    if i0 > 0 {
        let mut out: String = chars[..i0 as usize].iter().collect();
        out.extend(chars[i1 + 1..].iter());
        out
    } else {
        s.to_string()
    }
}

/// Exact significant digits and decimal exponent of a finite `x > 0`,
/// such that `x = d0.d1d2… × 10^exponent`.
fn exact_digits(x: f64) -> (Vec<u8>, i32) {
    // 800 digits covers the longest exact expansion of an f64.
    let s = format!("{x:.800e}");
    let (mantissa, exponent) = s.split_once('e').unwrap_or((s.as_str(), "0"));
    let mut digits: Vec<u8> = mantissa
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect();
    while digits.len() > 1 && digits.last() == Some(&0) {
        digits.pop();
    }
    (digits, exponent.parse().unwrap_or(0))
}

/// Round to `n` significant digits, half away from zero. Returns exactly `n` digits.
fn round_significant(x: f64, n: usize) -> (Vec<u8>, i32) {
    if x == 0.0 {
        return (vec![0; n.max(1)], 0);
    }
    let (mut digits, mut exponent) = exact_digits(x);
    if digits.len() <= n {
        digits.resize(n, 0);
        return (digits, exponent);
    }
    let round_up = digits[n] >= 5;
    digits.truncate(n);
    if round_up {
        let mut k = n;
        loop {
            if k == 0 {
                digits.insert(0, 1);
                digits.truncate(n);
                exponent += 1;
                break;
            }
            k -= 1;
            if digits[k] == 9 {
                digits[k] = 0;
            } else {
                digits[k] += 1;
                break;
            }
        }
    }
    (digits, exponent)
}

fn digits_str(digits: &[u8]) -> String {
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

fn exponent_str(exponent: i32) -> String {
    if exponent < 0 {
        format!("e{exponent}")
    } else {
        format!("e+{exponent}")
    }
}

/// Fixed notation with exactly `p` fractional digits.
pub(crate) fn to_fixed(x: f64, p: usize) -> String {
    if x.abs() >= 1e21 || !x.is_finite() {
        return number_to_string(x);
    }
    let sign = if x < 0.0 { "-" } else { "" };
    let x = x.abs();
    let zero = || {
        if p == 0 {
            "0".to_string()
        } else {
            format!("0.{}", "0".repeat(p))
        }
    };
    if x == 0.0 {
        return zero();
    }

    let (_, exponent) = exact_digits(x);
    let n = exponent + 1 + p as i32;
    let (digits, exponent) = if n > 0 {
        round_significant(x, n as usize)
    } else if n == 0 && exact_digits(x).0[0] >= 5 {
        (vec![1], -(p as i32))
    } else {
        return format!("{sign}{}", zero());
    };

    let (int_part, frac) = if exponent >= 0 {
        let e = exponent as usize + 1;
        let mut int_digits = digits.clone();
        if int_digits.len() < e {
            int_digits.resize(e, 0);
        }
        let frac: Vec<u8> = digits.get(e..).map(<[u8]>::to_vec).unwrap_or_default();
        (digits_str(&int_digits[..e]), frac)
    } else {
        let mut frac = vec![0; (-exponent - 1) as usize];
        frac.extend_from_slice(&digits);
        ("0".to_string(), frac)
    };
    let mut frac = frac;
    frac.resize(p, 0);

    if p == 0 {
        format!("{sign}{int_part}")
    } else {
        format!("{sign}{int_part}.{}", digits_str(&frac))
    }
}

/// Exponent notation with `p` fractional digits, or the shortest exact form for `None`.
pub(crate) fn to_exponential(x: f64, p: Option<usize>) -> String {
    if !x.is_finite() {
        return number_to_string(x);
    }
    let sign = if x < 0.0 { "-" } else { "" };
    let x = x.abs();
    match p {
        None => {
            let s = format!("{x:e}");
            match s.split_once('e') {
                Some((m, e)) => format!("{sign}{m}{}", exponent_str(e.parse().unwrap_or(0))),
                None => format!("{sign}{s}"),
            }
        }
        Some(p) => {
            let (digits, exponent) = round_significant(x, p + 1);
            let mantissa = if p == 0 {
                digits_str(&digits)
            } else {
                format!("{}.{}", digits[0], digits_str(&digits[1..]))
            };
            format!("{sign}{mantissa}{}", exponent_str(exponent))
        }
    }
}

/// `p` significant digits, switching to exponent notation for very large or small values.
pub(crate) fn to_precision(x: f64, p: usize) -> String {
    if !x.is_finite() {
        return number_to_string(x);
    }
    let p = p.max(1);
    let sign = if x < 0.0 { "-" } else { "" };
    let (digits, exponent) = round_significant(x.abs(), p);
    if exponent < -6 || exponent >= p as i32 {
        let mantissa = if p == 1 {
            digits_str(&digits)
        } else {
            format!("{}.{}", digits[0], digits_str(&digits[1..]))
        };
        return format!("{sign}{mantissa}{}", exponent_str(exponent));
    }
    if exponent >= 0 {
        let e = exponent as usize + 1;
        let int_part = digits_str(&digits[..e]);
        if e == digits.len() {
            format!("{sign}{int_part}")
        } else {
            format!("{sign}{int_part}.{}", digits_str(&digits[e..]))
        }
    } else {
        format!(
            "{sign}0.{}{}",
            "0".repeat((-exponent - 1) as usize),
            digits_str(&digits)
        )
    }
}

/// Coefficient digits and exponent of `x` rounded to `p` significant digits
/// (`p == 0` keeps every digit of the shortest representation).
fn decimal_parts(x: f64, p: usize) -> (String, i32) {
    if p == 0 {
        let s = format!("{x:e}");
        let (m, e) = s.split_once('e').unwrap_or((s.as_str(), "0"));
        return (m.replace('.', ""), e.parse().unwrap_or(0));
    }
    let (digits, exponent) = round_significant(x, p);
    (digits_str(&digits), exponent)
}

fn format_rounded(x: f64, p: usize) -> String {
    if !x.is_finite() {
        return number_to_string(x);
    }
    let (coefficient, exponent) = decimal_parts(x, p);
    if exponent < 0 {
        return format!("0.{}{}", "0".repeat((-exponent - 1) as usize), coefficient);
    }
    let e = exponent as usize;
    if coefficient.len() > e + 1 {
        format!("{}.{}", &coefficient[..e + 1], &coefficient[e + 1..])
    } else {
        format!("{}{}", coefficient, "0".repeat(e + 1 - coefficient.len()))
    }
}

fn format_prefix_auto(x: f64, p: usize) -> (String, i32) {
    let (coefficient, exponent) = decimal_parts(x, p);
    let prefix_exponent = (exponent.div_euclid(3)).clamp(-8, 8) * 3;
    let i = exponent - prefix_exponent + 1;
    let n = coefficient.len() as i32;
    let text = if i == n {
        coefficient
    } else if i > n {
        format!("{}{}", coefficient, "0".repeat((i - n) as usize))
    } else if i > 0 {
        let i = i as usize;
        format!("{}.{}", &coefficient[..i], &coefficient[i..])
    } else {
        let digits = decimal_parts(x, (p as i32 + i - 1).max(0) as usize).0;
        format!("0.{}{}", "0".repeat((1 - i) as usize), digits)
    };
    (text, prefix_exponent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(spec: &str, x: f64) -> String {
        FormatLocale::default().number_format(spec).unwrap().format(x)
    }

    #[test]
    fn currency_fixed() {
        assert_eq!(fmt("$.2f", 1.0), "$1.00");
        assert_eq!(fmt("$,.2f", 1234567.891), "$1,234,567.89");
        assert_eq!(fmt("$.2f", -3.5), "-$3.50");
    }

    #[test]
    fn fixed_rounds_half_away_from_zero() {
        assert_eq!(fmt(".0f", 2.5), "3");
        assert_eq!(fmt(".0f", 0.5), "1");
        assert_eq!(fmt(".2f", 1.005), "1.00");
        assert_eq!(fmt(".1f", 0.05), "0.1");
        assert_eq!(fmt(".1f", 9.96), "10.0");
    }

    #[test]
    fn negative_zero_hides_sign() {
        assert_eq!(fmt(".1f", -0.01), "0.0");
        assert_eq!(fmt("+.1f", -0.01), "-0.0");
        assert_eq!(fmt("+.1f", 2.0), "+2.0");
        assert_eq!(fmt("(.1f", -2.0), "(2.0)");
    }

    #[test]
    fn default_type_trims() {
        assert_eq!(fmt("", 0.1 + 0.2), "0.3");
        assert_eq!(fmt("", 1e21), "1e+21");
        assert_eq!(fmt("", 42.0), "42");
        assert_eq!(fmt("~g", 1.5), "1.5");
    }

    #[test]
    fn significant_and_exponent_types() {
        assert_eq!(fmt(".3g", 1234.5), "1.23e+3");
        assert_eq!(fmt(".3g", 0.00012345), "0.000123");
        assert_eq!(fmt(".2e", 12345.0), "1.23e+4");
        assert_eq!(fmt(".3r", 0.049), "0.0490");
        assert_eq!(fmt(".3r", 12345.0), "12300");
    }

    #[test]
    fn percent_types() {
        assert_eq!(fmt(".0%", 0.123), "12%");
        assert_eq!(fmt(".1%", 0.5), "50.0%");
        assert_eq!(fmt(".2p", 0.0123), "1.2%");
    }

    #[test]
    fn si_prefix() {
        assert_eq!(fmt(".3s", 1500.0), "1.50k");
        assert_eq!(fmt(".2s", 0.0042), "4.2m");
        assert_eq!(fmt("~s", 2e6), "2M");
        assert_eq!(fmt(".1s", 0.0), "0");
    }

    #[test]
    fn integer_types() {
        assert_eq!(fmt("d", 41.6), "42");
        assert_eq!(fmt(",d", 1234567.0), "1,234,567");
        assert_eq!(fmt("x", 255.0), "ff");
        assert_eq!(fmt("#X", 255.0), "0xFF");
        assert_eq!(fmt("#b", 5.0), "0b101");
        assert_eq!(fmt("o", 8.0), "10");
    }

    #[test]
    fn padding_and_alignment() {
        assert_eq!(fmt("08.2f", -3.14159), "-0003.14");
        assert_eq!(fmt(">8d", 42.0), "      42");
        assert_eq!(fmt("<6d", 42.0), "42    ");
        assert_eq!(fmt("*^7d", 42.0), "**42***");
        assert_eq!(fmt("012,d", 1234567.0), "0,001,234,567");
    }

    #[test]
    fn nan_and_infinity() {
        assert_eq!(fmt(".2f", f64::NAN), "NaN");
        assert_eq!(fmt(".2f", f64::INFINITY), "Infinity");
        assert_eq!(fmt(".2f", f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn locale_separators_and_currency() {
        let locale = FormatLocale {
            decimal: ",".into(),
            thousands: ".".into(),
            currency: [String::new(), " €".into()],
            ..FormatLocale::default()
        };
        let out = locale.number_format("$,.2f").unwrap().format(1234.5);
        assert_eq!(out, "1.234,50 €");
    }

    #[test]
    fn rejects_garbage() {
        let locale = FormatLocale::default();
        assert!(matches!(
            locale.number_format("not a format"),
            Err(FormatError::InvalidNumberFormat(_))
        ));
    }
}
