//! The format mini-language after the `:` in a placeholder.
//!
//! ```text
//! spec := [ "<" | ">" ] [ width ] [ "." precision ] [ type ]
//! ```
//!
//! | Type | Rendering |
//! |------|-----------|
//! | `f` | fixed point, `precision` fractional digits (default 6) |
//! | `d` | integer; no precision, floats are rejected |
//! | other / none | the value's text, truncated to `precision` characters |
//!
//! Width is a minimum display width, measured by `console`: ANSI escape
//! codes in a value count as zero width, so styled text pads by what is
//! visible. `<` pads on the right; `>` or no marker pads on the left. Width
//! and precision are capped at 65535. `null` is never formatted.

use console::{pad_str, Alignment};
use thiserror::Error;

use crate::error::{FormatError, Result};
use crate::value::{Number, Value};

const DEFAULT_FIXED_PRECISION: usize = 6;

/// Largest width or precision accepted; `std::fmt` rejects anything above.
const MAX_FORMAT_ARG: usize = u16::MAX as usize;

/// Field alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// `<`: pad on the right.
    Left,
    /// `>`: pad on the left.
    Right,
}

/// How the value is rendered before padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormatKind {
    /// `f`
    Fixed,
    /// `d`
    Integer,
    /// Any other type character, or none.
    #[default]
    Text,
}

/// A parsed format spec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatSpec {
    pub align: Option<Align>,
    pub width: Option<usize>,
    pub precision: Option<usize>,
    pub kind: FormatKind,
}

/// Why a spec could not be parsed or applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SpecError(&'static str);

impl SpecError {
    pub fn reason(&self) -> &'static str {
        self.0
    }
}

impl FormatSpec {
    /// Parses a spec such as `<10`, `>8.2f` or `.3`.
    ///
    /// # Example
    ///
    /// ```
    /// use fstring::{Align, FormatKind, FormatSpec};
    ///
    /// let spec = FormatSpec::parse(">8.2f").unwrap();
    /// assert_eq!(spec.align, Some(Align::Right));
    /// assert_eq!(spec.width, Some(8));
    /// assert_eq!(spec.precision, Some(2));
    /// assert_eq!(spec.kind, FormatKind::Fixed);
    /// ```
    pub fn parse(text: &str) -> std::result::Result<Self, SpecError> {
        let mut rest = text;
        let mut spec = FormatSpec::default();

        if let Some(stripped) = rest.strip_prefix('<') {
            spec.align = Some(Align::Left);
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('>') {
            spec.align = Some(Align::Right);
            rest = stripped;
        }

        let (width, after_width) = take_number(rest, "width is too large")?;
        spec.width = width;
        rest = after_width;

        if let Some(after_dot) = rest.strip_prefix('.') {
            let (precision, after_precision) = take_number(after_dot, "precision is too large")?;
            spec.precision = Some(precision.ok_or(SpecError("missing precision after '.'"))?);
            rest = after_precision;
        }

        let mut chars = rest.chars();
        spec.kind = match chars.next() {
            Some('f') => FormatKind::Fixed,
            Some('d') => FormatKind::Integer,
            _ => FormatKind::Text,
        };
        if chars.next().is_some() {
            return Err(SpecError("unexpected characters after the type"));
        }
        if spec.kind == FormatKind::Integer && spec.precision.is_some() {
            return Err(SpecError("precision is not allowed with 'd'"));
        }

        Ok(spec)
    }

    /// Renders a non-null value according to this spec.
    pub fn render(&self, value: &Value) -> std::result::Result<String, SpecError> {
        let body = match self.kind {
            FormatKind::Fixed => {
                let number = value
                    .as_number()
                    .ok_or(SpecError("'f' requires a numeric value"))?;
                let precision = self.precision.unwrap_or(DEFAULT_FIXED_PRECISION);
                format!("{:.*}", precision, number.to_f64())
            }
            FormatKind::Integer => match value.as_number() {
                Some(Number::I64(n)) => n.to_string(),
                Some(Number::U64(n)) => n.to_string(),
                Some(Number::F64(_)) => return Err(SpecError("'d' requires an integer value")),
                None => return Err(SpecError("'d' requires a numeric value")),
            },
            FormatKind::Text => {
                let text = value.to_string();
                match self.precision {
                    Some(precision) => text.chars().take(precision).collect(),
                    None => text,
                }
            }
        };

        Ok(self.pad(body))
    }

    fn pad(&self, body: String) -> String {
        match self.width {
            Some(width) => {
                let alignment = match self.align {
                    Some(Align::Left) => Alignment::Left,
                    Some(Align::Right) | None => Alignment::Right,
                };
                pad_str(&body, width, alignment, None).into_owned()
            }
            None => body,
        }
    }
}

/// Reads a leading run of ASCII digits, up to [`MAX_FORMAT_ARG`].
fn take_number<'a>(
    text: &'a str,
    overflow: &'static str,
) -> std::result::Result<(Option<usize>, &'a str), SpecError> {
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Ok((None, text));
    }
    let number: usize = text[..digits].parse().map_err(|_| SpecError(overflow))?;
    if number > MAX_FORMAT_ARG {
        return Err(SpecError(overflow));
    }
    Ok((Some(number), &text[digits..]))
}

/// Applies `format` to a resolved value.
///
/// `null` renders as `null` whatever the format says.
///
/// ```
/// use fstring::{apply_format, Value};
///
/// assert_eq!(apply_format(&Value::from(3), ">5").unwrap(), "    3");
/// assert_eq!(apply_format(&Value::from(3), "<5").unwrap(), "3    ");
/// assert_eq!(apply_format(&Value::from(1.23456), ".2f").unwrap(), "1.23");
/// assert_eq!(apply_format(&Value::Null, ".2f").unwrap(), "null");
/// assert!(apply_format(&Value::from("abc"), "d").is_err());
/// ```
pub fn apply_format(value: &Value, format: &str) -> Result<String> {
    if value.is_null() {
        return Ok(Value::Null.to_string());
    }
    FormatSpec::parse(format)
        .and_then(|spec| spec.render(value))
        .map_err(|err| FormatError::InvalidFormat {
            format: format.to_owned(),
            value: value.to_string(),
            reason: err.reason(),
        })
}
