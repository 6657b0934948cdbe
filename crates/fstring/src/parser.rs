//! Template scanner.
//!
//! [`parse`] walks a template once and yields literal runs and placeholders.
//!
//! # Syntax
//!
//! - `{name}`, `{user.name}`, `{user.name()}` - placeholders
//! - `{price:>8.2f}` - placeholder with a format spec after the first `:`
//! - `{{` and `}}` - escaped braces (render as `{` and `}`)
//!
//! Placeholder spans are matched by counting braces, so `{a{b}c}` is a
//! single span (which then fails path validation). The scanner does not look
//! inside the path or the format spec; those are validated when the
//! placeholder is evaluated.

use std::borrow::Cow;

use crate::error::{FormatError, Result};

/// A piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'t> {
    /// Text copied to the output as-is.
    Literal(Cow<'t, str>),
    /// A `{...}` span to substitute.
    Placeholder(PlaceholderSpec<'t>),
}

/// The contents of a `{...}` span, split at the first `:` and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderSpec<'t> {
    /// Path expression, not yet validated.
    pub path: Cow<'t, str>,
    /// Format spec; `None` when absent or empty.
    pub format: Option<Cow<'t, str>>,
    /// Byte offset of the opening `{` in the template.
    pub offset: usize,
}

impl Segment<'_> {
    /// Detaches the segment from the template it was parsed from.
    pub fn into_owned(self) -> Segment<'static> {
        match self {
            Segment::Literal(text) => Segment::Literal(Cow::Owned(text.into_owned())),
            Segment::Placeholder(spec) => Segment::Placeholder(PlaceholderSpec {
                path: Cow::Owned(spec.path.into_owned()),
                format: spec.format.map(|format| Cow::Owned(format.into_owned())),
                offset: spec.offset,
            }),
        }
    }

    /// A borrowing view of this segment.
    pub fn as_borrowed(&self) -> Segment<'_> {
        match self {
            Segment::Literal(text) => Segment::Literal(Cow::Borrowed(text)),
            Segment::Placeholder(spec) => Segment::Placeholder(PlaceholderSpec {
                path: Cow::Borrowed(&spec.path),
                format: spec.format.as_deref().map(Cow::Borrowed),
                offset: spec.offset,
            }),
        }
    }
}

/// Lazily scans a template.
///
/// Yields segments left to right; after the first error it yields nothing
/// more. Cloning the parser, or calling [`parse`] again, restarts the scan.
///
/// # Example
///
/// ```
/// use fstring::{parse, Segment};
///
/// let segments: Vec<_> = parse("{{x}} = {x:>3}").collect::<Result<_, _>>().unwrap();
/// assert_eq!(segments.len(), 5);
/// assert!(matches!(&segments[4], Segment::Placeholder(spec) if spec.path == "x"));
///
/// assert!(parse("{x").any(|segment| segment.is_err()));
/// ```
#[derive(Debug, Clone)]
pub struct Parser<'t> {
    template: &'t str,
    pos: usize,
    failed: bool,
}

/// Starts scanning `template`.
pub fn parse(template: &str) -> Parser<'_> {
    Parser {
        template,
        pos: 0,
        failed: false,
    }
}

impl<'t> Parser<'t> {
    fn scan(&mut self) -> Option<Result<Segment<'t>>> {
        let template = self.template;
        let bytes = template.as_bytes();
        let start = self.pos;
        if start >= bytes.len() {
            return None;
        }

        let brace = match bytes[start..].iter().position(|&b| b == b'{' || b == b'}') {
            Some(0) => start,
            Some(n) => {
                self.pos = start + n;
                return Some(Ok(Segment::Literal(Cow::Borrowed(&template[start..start + n]))));
            }
            None => {
                self.pos = bytes.len();
                return Some(Ok(Segment::Literal(Cow::Borrowed(&template[start..]))));
            }
        };

        // Doubled brace: emit one of them.
        if bytes.get(brace + 1) == Some(&bytes[brace]) {
            self.pos = brace + 2;
            return Some(Ok(Segment::Literal(Cow::Borrowed(&template[brace..brace + 1]))));
        }

        if bytes[brace] == b'}' {
            return Some(Err(FormatError::StrayCloseBrace { offset: brace }));
        }

        Some(self.placeholder(brace))
    }

    fn placeholder(&mut self, open: usize) -> Result<Segment<'t>> {
        let template = self.template;
        let bytes = template.as_bytes();

        let mut depth = 1usize;
        let mut close = None;
        for (i, &b) in bytes.iter().enumerate().skip(open + 1) {
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let close = close.ok_or(FormatError::UnmatchedBrace { offset: open })?;
        self.pos = close + 1;

        let body = template[open + 1..close].trim();
        if body.is_empty() {
            return Err(FormatError::EmptyPlaceholder { offset: open });
        }

        let (path, format) = match body.split_once(':') {
            Some((path, format)) => (path.trim(), Some(format.trim()).filter(|f| !f.is_empty())),
            None => (body, None),
        };

        Ok(Segment::Placeholder(PlaceholderSpec {
            path: Cow::Borrowed(path),
            format: format.map(Cow::Borrowed),
            offset: open,
        }))
    }
}

impl<'t> Iterator for Parser<'t> {
    type Item = Result<Segment<'t>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.scan();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}

impl std::iter::FusedIterator for Parser<'_> {}
