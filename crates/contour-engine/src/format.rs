//! Label text formatting.
//!
//! A label formatter is chosen once per labeling call and stored as a
//! [`LabelFormat`]. Printf-style strings follow C/Python `%` conversion
//! rules, so `"%1.2f"` renders `0.5` as `"0.50"`.

use std::fmt;
use std::sync::Arc;

use crate::error::{ContourError, ContourResult};

/// Format used for mapping entries that have no text for a level.
pub const FALLBACK_FORMAT: &str = "%1.3f";

/// Formats a whole list of tick values at once, so the decimal count can
/// depend on the other values.
pub trait TickFormatter: fmt::Debug + Send + Sync {
    fn format_ticks(&self, values: &[f64]) -> Vec<String>;
}

/// Fixed-point formatter choosing the fewest decimals that keep the values
/// distinguishable at their range.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarFormatter;

impl ScalarFormatter {
    /// Decimal places needed for a set of values.
    pub fn decimals(values: &[f64]) -> usize {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return 0;
        }
        let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut range = hi - lo;
        if range == 0.0 {
            range = lo.abs();
        }
        if range == 0.0 {
            range = 1.0;
        }

        let oom = range.log10().floor() as i32;
        let thresh = 1e-3 * 10f64.powi(oom);
        let mut sigfigs = (3 - oom).max(0);
        while sigfigs >= 0 {
            let scale = 10f64.powi(sigfigs);
            let worst = finite
                .iter()
                .map(|v| (v - (v * scale).round() / scale).abs())
                .fold(0.0, f64::max);
            if worst < thresh {
                sigfigs -= 1;
            } else {
                break;
            }
        }
        (sigfigs + 1) as usize
    }
}

impl TickFormatter for ScalarFormatter {
    fn format_ticks(&self, values: &[f64]) -> Vec<String> {
        let decimals = Self::decimals(values);
        values
            .iter()
            .map(|&v| {
                // Avoid printing "-0.0"
                let v = if v.abs() < 1e-8 { 0.0 } else { v };
                format!("{:.*}", decimals, v)
            })
            .collect()
    }
}

/// Formatter applied to contour levels when building label text
#[derive(Clone)]
pub enum LabelFormat {
    Printf(PrintfFormat),
    Callable(Arc<dyn Fn(f64) -> String + Send + Sync>),
    /// Explicit text per level.
    ///
    /// Levels without an entry are formatted with [`FALLBACK_FORMAT`], so
    /// `0.25` becomes `"0.250"` rather than the format string itself.
    Mapping(Vec<(f64, String)>),
    Ticker(Arc<dyn TickFormatter>),
}

impl fmt::Debug for LabelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelFormat::Printf(p) => f.debug_tuple("Printf").field(&p.source).finish(),
            LabelFormat::Callable(_) => f.write_str("Callable(..)"),
            LabelFormat::Mapping(m) => f.debug_tuple("Mapping").field(m).finish(),
            LabelFormat::Ticker(t) => f.debug_tuple("Ticker").field(t).finish(),
        }
    }
}

impl Default for LabelFormat {
    fn default() -> Self {
        LabelFormat::Ticker(Arc::new(ScalarFormatter))
    }
}

impl LabelFormat {
    pub fn printf(format: &str) -> ContourResult<Self> {
        Ok(LabelFormat::Printf(PrintfFormat::parse(format)?))
    }

    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(f64) -> String + Send + Sync + 'static,
    {
        LabelFormat::Callable(Arc::new(f))
    }

    pub fn mapping<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (f64, S)>,
        S: Into<String>,
    {
        LabelFormat::Mapping(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }

    /// Text for `level`. `label_levels` are the levels being labeled, which
    /// tick formatters see alongside the value.
    pub fn format(&self, level: f64, label_levels: &[f64]) -> String {
        match self {
            LabelFormat::Printf(p) => p.format(level),
            LabelFormat::Callable(f) => f(level),
            LabelFormat::Mapping(entries) => entries
                .iter()
                .find(|(k, _)| *k == level)
                .map(|(_, text)| text.clone())
                .unwrap_or_else(|| format!("{:1.3}", level)),
            LabelFormat::Ticker(ticker) => {
                let mut values = label_levels.to_vec();
                values.push(level);
                ticker.format_ticks(&values).pop().unwrap_or_default()
            }
        }
    }
}

/// Level passed to label formatting: a number or literal text
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelText<'a> {
    Value(f64),
    Literal(&'a str),
}

impl From<f64> for LevelText<'_> {
    fn from(value: f64) -> Self {
        LevelText::Value(value)
    }
}

impl<'a> From<&'a str> for LevelText<'a> {
    fn from(text: &'a str) -> Self {
        LevelText::Literal(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Fixed,
    Exp { upper: bool },
    General { upper: bool },
    Int,
    Str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Spec {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alt: bool,
    width: usize,
    precision: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Text(String),
    Value(Spec, Conversion),
}

/// A parsed printf-style format with exactly one value conversion
#[derive(Debug, Clone, PartialEq)]
pub struct PrintfFormat {
    source: String,
    pieces: Vec<Piece>,
}

impl PrintfFormat {
    pub fn parse(format: &str) -> ContourResult<Self> {
        let invalid = |message: &str| ContourError::InvalidFormat {
            format: format.to_string(),
            message: message.to_string(),
        };

        let mut pieces = Vec::new();
        let mut text = String::new();
        let mut conversions = 0;
        let mut chars = format.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                text.push(c);
                continue;
            }
            if chars.peek() == Some(&'%') {
                chars.next();
                text.push('%');
                continue;
            }

            let mut spec = Spec::default();
            while let Some(&flag) = chars.peek() {
                match flag {
                    '-' => spec.left = true,
                    '+' => spec.plus = true,
                    ' ' => spec.space = true,
                    '0' => spec.zero = true,
                    '#' => spec.alt = true,
                    _ => break,
                }
                chars.next();
            }
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                spec.width = spec.width * 10 + d as usize;
                chars.next();
            }
            if chars.peek() == Some(&'.') {
                chars.next();
                let mut precision = 0;
                while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                    precision = precision * 10 + d as usize;
                    chars.next();
                }
                spec.precision = Some(precision);
            }

            let conversion = match chars.next() {
                Some('f') | Some('F') => Conversion::Fixed,
                Some('e') => Conversion::Exp { upper: false },
                Some('E') => Conversion::Exp { upper: true },
                Some('g') => Conversion::General { upper: false },
                Some('G') => Conversion::General { upper: true },
                Some('d') | Some('i') => Conversion::Int,
                Some('s') | Some('r') => Conversion::Str,
                Some(other) => return Err(invalid(&format!("unsupported conversion '{}'", other))),
                None => return Err(invalid("incomplete format")),
            };

            if !text.is_empty() {
                pieces.push(Piece::Text(std::mem::take(&mut text)));
            }
            pieces.push(Piece::Value(spec, conversion));
            conversions += 1;
        }
        if !text.is_empty() {
            pieces.push(Piece::Text(text));
        }

        match conversions {
            1 => Ok(Self {
                source: format.to_string(),
                pieces,
            }),
            0 => Err(invalid("not all arguments converted during string formatting")),
            _ => Err(invalid("not enough arguments for format string")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn format(&self, value: f64) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Value(spec, conversion) => {
                    out.push_str(&format_value(value, spec, *conversion))
                }
            }
        }
        out
    }
}

fn format_value(value: f64, spec: &Spec, conversion: Conversion) -> String {
    let body = if !value.is_finite() {
        let text = if value.is_nan() { "nan" } else { "inf" };
        match conversion {
            Conversion::Exp { upper: true } | Conversion::General { upper: true } => {
                text.to_uppercase()
            }
            _ => text.to_string(),
        }
    } else {
        match conversion {
            Conversion::Fixed => format!("{:.*}", spec.precision.unwrap_or(6), value.abs()),
            Conversion::Exp { upper } => {
                format_exp(value.abs(), spec.precision.unwrap_or(6), upper)
            }
            Conversion::General { upper } => {
                format_general(value.abs(), spec.precision.unwrap_or(6), upper, spec.alt)
            }
            Conversion::Int => format!("{}", value.abs().trunc() as i64),
            Conversion::Str => {
                let mut s = format!("{}", value.abs());
                if value.fract() == 0.0 && value.abs() < 1e16 {
                    s.push_str(".0");
                }
                s
            }
        }
    };

    let truncated_to_zero = conversion == Conversion::Int && value.abs().trunc() == 0.0;
    let negative = value.is_sign_negative() && !value.is_nan() && !truncated_to_zero;
    let sign = if negative {
        "-"
    } else if spec.plus && conversion != Conversion::Str {
        "+"
    } else if spec.space && conversion != Conversion::Str {
        " "
    } else {
        ""
    };

    let len = sign.len() + body.chars().count();
    if len >= spec.width {
        return format!("{}{}", sign, body);
    }
    let pad = spec.width - len;
    if spec.left {
        format!("{}{}{}", sign, body, " ".repeat(pad))
    } else if spec.zero && value.is_finite() && conversion != Conversion::Str {
        format!("{}{}{}", sign, "0".repeat(pad), body)
    } else {
        format!("{}{}{}", " ".repeat(pad), sign, body)
    }
}

/// Exponent notation with a signed, at least two-digit exponent.
fn format_exp(value: f64, precision: usize, upper: bool) -> String {
    let raw = format!("{:.*e}", precision, value);
    let (mantissa, exp) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let e = if upper { 'E' } else { 'e' };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{}{}{}{:02}", mantissa, e, sign, exp.abs())
}

fn format_general(value: f64, precision: usize, upper: bool, alt: bool) -> String {
    let p = precision.max(1);
    if value == 0.0 {
        return if alt {
            format!("{:.*}", p - 1, 0.0)
        } else {
            "0".to_string()
        };
    }

    // Exponent after rounding to p significant digits
    let rounded = format!("{:.*e}", p - 1, value);
    let exp: i32 = rounded
        .split_once('e')
        .and_then(|(_, e)| e.parse().ok())
        .unwrap_or(0);

    let text = if exp < -4 || exp >= p as i32 {
        format_exp(value, p - 1, upper)
    } else {
        format!("{:.*}", (p as i32 - 1 - exp).max(0) as usize, value)
    };
    if alt {
        return text;
    }

    match text.find(|c: char| c == 'e' || c == 'E') {
        Some(pos) => {
            let (mantissa, exp) = text.split_at(pos);
            format!("{}{}", strip_zeros(mantissa), exp)
        }
        None => strip_zeros(&text).to_string(),
    }
}

fn strip_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(format: &str, value: f64) -> String {
        PrintfFormat::parse(format).unwrap().format(value)
    }

    #[test]
    fn test_fixed() {
        assert_eq!(fmt("%1.2f", 0.5), "0.50");
        assert_eq!(fmt("%1.3f", -2.0), "-2.000");
        assert_eq!(fmt("%6.1f", 3.14159), "   3.1");
        assert_eq!(fmt("%-6.1f|", 3.14159), "3.1   |");
        assert_eq!(fmt("%06.1f", -3.14159), "-003.1");
        assert_eq!(fmt("%+.0f", 2.0), "+2");
    }

    #[test]
    fn test_exponent() {
        assert_eq!(fmt("%e", 12345.678), "1.234568e+04");
        assert_eq!(fmt("%.2E", 0.00012), "1.20E-04");
    }

    #[test]
    fn test_general() {
        assert_eq!(fmt("%g", 0.5), "0.5");
        assert_eq!(fmt("%g", 100000.0), "100000");
        assert_eq!(fmt("%g", 1000000.0), "1e+06");
        assert_eq!(fmt("%g", 0.0001), "0.0001");
        assert_eq!(fmt("%g", 0.00001), "1e-05");
        assert_eq!(fmt("%.3g", 3.14159), "3.14");
        assert_eq!(fmt("%g", 0.0), "0");
    }

    #[test]
    fn test_int_and_text() {
        assert_eq!(fmt("%d m", 2.7), "2 m");
        assert_eq!(fmt("%i", -0.5), "0");
        assert_eq!(fmt("%.1f %%", 50.0), "50.0 %");
        assert_eq!(fmt("%s", 1.0), "1.0");
    }

    #[test]
    fn test_invalid_formats() {
        assert!(PrintfFormat::parse("no conversion").is_err());
        assert!(PrintfFormat::parse("%f %f").is_err());
        assert!(PrintfFormat::parse("%q").is_err());
        assert!(PrintfFormat::parse("%1.").is_err());
    }

    #[test]
    fn test_scalar_formatter_shared_decimals() {
        let labels = ScalarFormatter.format_ticks(&[0.5, 1.0, 1.5]);
        assert_eq!(labels, vec!["0.5", "1.0", "1.5"]);

        let labels = ScalarFormatter.format_ticks(&[0.0, 10.0, 20.0]);
        assert_eq!(labels, vec!["0", "10", "20"]);

        let labels = ScalarFormatter.format_ticks(&[-0.25, 0.0, 0.25]);
        assert_eq!(labels, vec!["-0.25", "0.00", "0.25"]);
    }

    #[test]
    fn test_label_format_mapping_fallback() {
        let mapping = LabelFormat::mapping([(0.5, "half")]);
        assert_eq!(mapping.format(0.5, &[]), "half");
        assert_eq!(mapping.format(0.25, &[]), "0.250");
    }

    #[test]
    fn test_label_format_ticker_uses_label_levels() {
        let ticker = LabelFormat::default();
        assert_eq!(ticker.format(2.0, &[1.0, 1.5, 2.0]), "2.0");
    }
}
