//! Rendering selections as text.
//!
//! [`format_value`] turns a single date or a date pair into the string that
//! goes into a visible field. ISO output is built from the calendar fields
//! directly; a [`NaiveDate`] carries no offset, so nothing can shift it
//! across midnight.

use std::fmt;
use std::rc::Rc;

use chrono::{Datelike, NaiveDate};

use crate::error::{PickerError, Result};
use crate::locale::DateLocale;

/// A value to format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatValue {
    Single(Option<NaiveDate>),
    /// An ordered `(start, end)` pair; either side may be absent.
    Pair(Option<NaiveDate>, Option<NaiveDate>),
}

/// Caller-supplied formatter; receives the full value and owns the output.
///
/// Not `Send`, so a JS function can back it.
pub type CustomFormatter = Rc<dyn Fn(&FormatValue) -> String>;

/// How dates are rendered into text.
#[derive(Clone, Default)]
pub enum OutputFormat {
    /// The locale's numeric date.
    #[default]
    Locale,
    /// `YYYY-MM-DD`.
    Iso,
    Custom(CustomFormatter),
}

impl OutputFormat {
    /// Parse the textual option value (`"locale"` or `"iso"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "locale" => Some(OutputFormat::Locale),
            "iso" => Some(OutputFormat::Iso),
            _ => None,
        }
    }
}

impl fmt::Debug for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Locale => f.write_str("Locale"),
            OutputFormat::Iso => f.write_str("Iso"),
            OutputFormat::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Everything [`format_value`] needs besides the value.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions<'a> {
    pub format: &'a OutputFormat,
    pub locale: DateLocale,
    pub separator: &'a str,
}

/// Render a date or a date pair.
///
/// Pair sides are formatted independently and joined with the separator.
/// Absent sides contribute nothing: an empty pair yields `""` and a pair
/// with one side yields just that side, without a separator.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use datepicker_core::format::{format_value, FormatOptions, FormatValue, OutputFormat};
/// use datepicker_core::locale::DateLocale;
///
/// let opts = FormatOptions {
///     format: &OutputFormat::Iso,
///     locale: DateLocale::default(),
///     separator: " – ",
/// };
/// let a = NaiveDate::from_ymd_opt(2024, 3, 1);
/// let b = NaiveDate::from_ymd_opt(2024, 3, 10);
/// assert_eq!(format_value(&FormatValue::Pair(a, b), &opts), "2024-03-01 – 2024-03-10");
/// assert_eq!(format_value(&FormatValue::Pair(a, None), &opts), "2024-03-01");
/// ```
pub fn format_value(value: &FormatValue, opts: &FormatOptions<'_>) -> String {
    if let OutputFormat::Custom(custom) = opts.format {
        return custom(value);
    }
    let one = |date: Option<NaiveDate>| match (date, opts.format) {
        (None, _) => String::new(),
        (Some(d), OutputFormat::Iso) => to_iso(d),
        (Some(d), _) => opts.locale.numeric_date(d),
    };
    match *value {
        FormatValue::Single(date) => one(date),
        FormatValue::Pair(a, b) => [one(a), one(b)]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(opts.separator),
    }
}

/// `YYYY-MM-DD` from the date's calendar fields.
pub fn to_iso(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// ISO string or `""` for an absent date.
pub fn to_iso_opt(date: Option<NaiveDate>) -> String {
    date.map(to_iso).unwrap_or_default()
}

/// Strictly parse `YYYY-MM-DD`.
///
/// Exactly four year digits, two month digits and two day digits; the date
/// must exist (no rollover of `2024-02-30`).
pub fn parse_iso(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits = |range: std::ops::Range<usize>| -> Option<u32> {
        let part = &s[range];
        if part.bytes().all(|b| b.is_ascii_digit()) {
            part.parse().ok()
        } else {
            None
        }
    };
    let year = digits(0..4)?;
    let month = digits(5..7)?;
    let day = digits(8..10)?;
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

/// [`parse_iso`] with an error for user-facing input.
///
/// # Errors
///
/// Returns [`PickerError::InvalidDate`] naming the rejected text.
pub fn require_iso(s: &str) -> Result<NaiveDate> {
    parse_iso(s).ok_or_else(|| PickerError::InvalidDate(s.to_string()))
}
