//! Date ⇄ text conversion with strftime-style patterns.

use super::UtilError;
use chrono::format::{self, Item, Parsed, StrftimeItems};
use chrono::{NaiveDate, NaiveTime};
use std::fmt::Write as _;

/// Year used when the pattern has no year field.
const DEFAULT_YEAR: i64 = 1900;

/// Parses `text` as a date using the pattern `fmt` (e.g. `"%Y%m%d"`).
///
/// Parts the pattern does not mention are filled in: the year with 1900,
/// the month and the day with 1. `"202004"` with `"%Y%m"` is 2020-04-01.
///
/// # Errors
///
/// Returns [`UtilError::Conversion`] if the text does not match the pattern
/// or the fields do not form a valid date.
pub fn str_to_date(text: &str, fmt: &str) -> Result<NaiveDate, UtilError> {
    let fail = |reason: format::ParseError| UtilError::Conversion {
        message: format!("cannot parse `{text}` with `{fmt}`: {reason}"),
    };

    let mut parsed = Parsed::new();
    format::parse(&mut parsed, text, StrftimeItems::new(fmt)).map_err(fail)?;
    fill_missing(&mut parsed).map_err(fail)?;
    parsed.to_naive_date().map_err(fail)
}

fn fill_missing(parsed: &mut Parsed) -> format::ParseResult<()> {
    let has_year = parsed.year().is_some()
        || parsed.year_div_100().is_some()
        || parsed.year_mod_100().is_some()
        || parsed.isoyear().is_some();
    if !has_year {
        parsed.set_year(DEFAULT_YEAR)?;
    }

    let has_week = parsed.week_from_sun().is_some()
        || parsed.week_from_mon().is_some()
        || parsed.isoweek().is_some();
    if parsed.ordinal().is_none() && !has_week {
        if parsed.month().is_none() {
            parsed.set_month(1)?;
        }
        if parsed.day().is_none() {
            parsed.set_day(1)?;
        }
    }
    Ok(())
}

/// Formats `date` with the pattern `fmt`.
///
/// Time fields render as midnight (`"%H:%M"` gives `"00:00"`).
///
/// # Errors
///
/// Returns [`UtilError::Conversion`] if the pattern is invalid or asks for
/// a field a date cannot provide, such as a time zone.
pub fn date_to_str(date: NaiveDate, fmt: &str) -> Result<String, UtilError> {
    let items: Vec<Item<'_>> = StrftimeItems::new(fmt).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(UtilError::Conversion {
            message: format!("invalid date format `{fmt}`"),
        });
    }

    let mut out = String::new();
    let midnight = date.and_time(NaiveTime::MIN);
    write!(out, "{}", midnight.format_with_items(items.iter())).map_err(|_| {
        UtilError::Conversion {
            message: format!("cannot format {date} with `{fmt}`"),
        }
    })?;
    Ok(out)
}
