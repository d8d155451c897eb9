//! Message templates in the `%(field)s` style.
//!
//! Supported placeholders:
//!
//! | placeholder | value |
//! |-------------|-------|
//! | `%(asctime)s` | timestamp rendered with the date format |
//! | `%(msecs)d` | millisecond part of the timestamp |
//! | `%(levelname)s` | level name (`DEBUG`, `INFO`, ...) |
//! | `%(message)s` | the message text |
//! | `%(name)s` | logger name |
//! | `%%` | a literal `%` |
//!
//! Between `)` and the conversion letter the `-` and `0` flags, a width and
//! a `.precision` may appear: `%(msecs)03d` pads to three digits,
//! `%(levelname)-8s` pads on the right, `%(levelname).1s` keeps the first
//! letter.

use super::{LogLevel, LoggingError};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Timelike};
use std::fmt::{self, Write as _};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    AscTime,
    Msecs,
    LevelName,
    Message,
    Name,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "asctime" => Some(Self::AscTime),
            "msecs" => Some(Self::Msecs),
            "levelname" => Some(Self::LevelName),
            "message" => Some(Self::Message),
            "name" => Some(Self::Name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Directive {
    field: Field,
    left_align: bool,
    zero_pad: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Directive),
}

/// The values a template can refer to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Record<'a> {
    pub(crate) time: DateTime<Local>,
    pub(crate) level: LogLevel,
    pub(crate) message: &'a str,
    pub(crate) name: &'a str,
}

/// A parsed message template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFormat {
    template: String,
    segments: Vec<Segment>,
}

impl LogFormat {
    /// Parses a message template.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::Format`] for unknown fields, unsupported
    /// conversions, or an unterminated placeholder.
    pub fn parse(template: &str) -> Result<Self, LoggingError> {
        let fail = |reason: String| LoggingError::Format {
            template: template.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            match chars.next() {
                Some('%') => literal.push('%'),
                Some('(') => {}
                Some(other) => return Err(fail(format!("unsupported directive `%{other}`"))),
                None => return Err(fail("dangling `%` at end of template".to_string())),
            }

            let mut name = String::new();
            loop {
                match chars.next() {
                    Some(')') => break,
                    Some(ch) => name.push(ch),
                    None => return Err(fail(format!("unterminated placeholder `%({name}`"))),
                }
            }
            let field =
                Field::from_name(&name).ok_or_else(|| fail(format!("unknown field `{name}`")))?;

            let mut left_align = false;
            let mut zero_pad = false;
            while let Some(flag) = chars.next_if(|c| matches!(c, '-' | '0')) {
                if flag == '-' {
                    left_align = true;
                } else {
                    zero_pad = true;
                }
            }
            let width = take_number(&mut chars);
            let precision = if chars.next_if_eq(&'.').is_some() {
                Some(take_number(&mut chars).unwrap_or(0))
            } else {
                None
            };

            match chars.next() {
                Some('s') => {}
                Some('d') if field == Field::Msecs => {}
                Some(conv) => {
                    return Err(fail(format!(
                        "conversion `{conv}` is not supported for `{name}`"
                    )))
                }
                None => return Err(fail(format!("missing conversion after `%({name})`"))),
            }

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Placeholder(Directive {
                field,
                left_align,
                zero_pad,
                width,
                precision,
            }));
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            template: template.to_string(),
            segments,
        })
    }

    /// Returns the template text this format was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub(crate) fn render(
        &self,
        record: &Record<'_>,
        date_fmt: &str,
    ) -> Result<String, fmt::Error> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(directive) => {
                    let value = match directive.field {
                        Field::AscTime => format_time(record.time, date_fmt)?,
                        Field::Msecs => (record.time.nanosecond() / 1_000_000 % 1000).to_string(),
                        Field::LevelName => record.level.name().to_string(),
                        Field::Message => record.message.to_string(),
                        Field::Name => record.name.to_string(),
                    };
                    pad_into(&mut out, &value, directive);
                }
            }
        }
        Ok(out)
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut digits = String::new();
    while let Some(d) = chars.next_if(char::is_ascii_digit) {
        digits.push(d);
    }
    digits.parse().ok()
}

fn pad_into(out: &mut String, value: &str, directive: &Directive) {
    let value: String = match directive.precision {
        Some(n) => value.chars().take(n).collect(),
        None => value.to_string(),
    };
    let missing = directive.width.unwrap_or(0).saturating_sub(value.chars().count());
    if directive.left_align {
        out.push_str(&value);
        out.extend(std::iter::repeat(' ').take(missing));
    } else {
        let fill = if directive.zero_pad { '0' } else { ' ' };
        out.extend(std::iter::repeat(fill).take(missing));
        out.push_str(&value);
    }
}

fn format_time(time: DateTime<Local>, date_fmt: &str) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write!(out, "{}", time.format(date_fmt))?;
    Ok(out)
}

/// Checks that `date_fmt` is a valid strftime pattern.
///
/// # Errors
///
/// Returns [`LoggingError::DateFormat`] if any directive is unknown.
pub fn validate_date_format(date_fmt: &str) -> Result<(), LoggingError> {
    if StrftimeItems::new(date_fmt).any(|item| matches!(item, Item::Error)) {
        return Err(LoggingError::DateFormat {
            date_fmt: date_fmt.to_string(),
        });
    }
    Ok(())
}
