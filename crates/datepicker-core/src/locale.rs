//! Locale lookup for date text.
//!
//! Wraps chrono's locale tables (`unstable-locales`). Identifiers are
//! accepted in BCP 47 (`de-DE`) or POSIX (`de_DE`) spelling.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc, Weekday};

use crate::error::{PickerError, Result};

/// A locale chrono has date tables for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateLocale {
    inner: chrono::Locale,
}

impl DateLocale {
    /// Fallback used when a requested locale is unknown.
    pub const FALLBACK: DateLocale = DateLocale {
        inner: chrono::Locale::en_US,
    };

    /// Resolve a locale identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::UnknownLocale`] if chrono has no table for it.
    ///
    /// # Examples
    ///
    /// ```
    /// use datepicker_core::locale::DateLocale;
    ///
    /// assert!(DateLocale::parse("de-DE").is_ok());
    /// assert!(DateLocale::parse("en_US").is_ok());
    /// assert!(DateLocale::parse("xx-YY").is_err());
    /// ```
    pub fn parse(id: &str) -> Result<Self> {
        let posix = id.trim().replace('-', "_");
        chrono::Locale::try_from(posix.as_str())
            .map(|inner| DateLocale { inner })
            .map_err(|_| PickerError::UnknownLocale(id.to_string()))
    }

    /// Resolve a locale identifier, falling back to `en-US` with a warning.
    pub fn parse_or_fallback(id: &str) -> Self {
        DateLocale::parse(id).unwrap_or_else(|err| {
            log::warn!("{err}; falling back to en-US");
            DateLocale::FALLBACK
        })
    }

    pub fn chrono_locale(&self) -> chrono::Locale {
        self.inner
    }

    /// The locale's numeric date (`%x`), e.g. `05.03.2024` or `03/05/2024`.
    pub fn numeric_date(&self, date: NaiveDate) -> String {
        self.localized(date, "%x")
    }

    /// "Month Year" title for a month header, e.g. `März 2024`.
    pub fn month_year_title(&self, date: NaiveDate) -> String {
        self.localized(date, "%B %Y")
    }

    /// Abbreviated weekday name, e.g. `Mo` or `Mon`.
    pub fn weekday_short(&self, weekday: Weekday) -> String {
        // 2021-08-01 is a Sunday; step forward to the requested weekday.
        let sunday = NaiveDate::from_ymd_opt(2021, 8, 1).unwrap_or(NaiveDate::MIN);
        let date = sunday
            .checked_add_days(chrono::Days::new(u64::from(weekday.num_days_from_sunday())))
            .unwrap_or(sunday);
        self.localized(date, "%a")
    }

    fn localized(&self, date: NaiveDate, fmt: &str) -> String {
        Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
            .format_localized(fmt, self.inner)
            .to_string()
    }
}

impl Default for DateLocale {
    fn default() -> Self {
        DateLocale::FALLBACK
    }
}
