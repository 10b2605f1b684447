//! Disabled-date policy: which days may not be picked.
//!
//! A raw [`DisabledConfig`] (as supplied by the embedding page or a JSON
//! options file) is normalized once into a [`DisabledPolicy`] of plain
//! [`NaiveDate`]s. Normalization never fails: inputs that cannot be read as
//! a date are logged and dropped.
//!
//! # Boundaries
//!
//! `min`/`max` are exclusive bounds on the *disabled* side (`date < min`,
//! `date > max`), while `before`/`after` disable their own boundary day too
//! (`date <= before`, `date >= after`). Both flavors exist on purpose.

use std::collections::BTreeSet;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::format::parse_iso;

// ── Raw date input ──────────────────────────────────────────────────────────

/// A date-like value as it arrives from outside the picker.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    /// Milliseconds since the Unix epoch, interpreted in local time.
    Millis(f64),
    /// `YYYY-MM-DD`, or an RFC 3339 timestamp.
    Text(String),
    /// An already day-truncated date.
    #[serde(skip_deserializing)]
    Day(NaiveDate),
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        DateInput::Day(date)
    }
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        DateInput::Text(s.to_string())
    }
}

/// Read a date-like input as a local calendar date.
///
/// Returns `None` (after a warning) for anything that is not a valid date:
/// malformed or impossible ISO strings, non-finite or out-of-range
/// timestamps, empty text.
pub fn parse_date_input(input: &DateInput) -> Option<NaiveDate> {
    let parsed = match input {
        DateInput::Day(date) => Some(*date),
        DateInput::Millis(ms) => millis_to_local_date(*ms),
        DateInput::Text(text) => parse_date_text(text),
    };
    if parsed.is_none() {
        log::warn!("ignoring unparseable date input {input:?}");
    }
    parsed
}

fn millis_to_local_date(ms: f64) -> Option<NaiveDate> {
    if !ms.is_finite() {
        return None;
    }
    Local
        .timestamp_millis_opt(ms.trunc() as i64)
        .earliest()
        .map(|dt| dt.date_naive())
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    parse_iso(text).or_else(|| {
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.with_timezone(&Local).date_naive())
    })
}

// ── Raw configuration ───────────────────────────────────────────────────────

/// Disabled-date configuration as written by the caller.
///
/// ```json
/// { "before": "2024-03-10", "max": "2024-12-31", "dates": ["2024-05-01"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisabledConfig {
    pub before: Option<DateInput>,
    pub after: Option<DateInput>,
    pub min: Option<DateInput>,
    pub max: Option<DateInput>,
    pub dates: Vec<DateInput>,
}

// ── Normalized policy ───────────────────────────────────────────────────────

/// The normalized, day-truncated disabled-date policy.
///
/// Serializes in the same shape [`DisabledConfig`] reads, so a policy read
/// back from a picker can be fed to another one unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisabledPolicy {
    pub before: Option<NaiveDate>,
    pub after: Option<NaiveDate>,
    pub min: Option<NaiveDate>,
    pub max: Option<NaiveDate>,
    #[serde(rename = "dates")]
    pub excluded: BTreeSet<NaiveDate>,
}

impl DisabledPolicy {
    /// Normalize a raw configuration. Unparseable entries become absent.
    pub fn normalize(config: &DisabledConfig) -> Self {
        let field = |input: &Option<DateInput>| input.as_ref().and_then(parse_date_input);
        DisabledPolicy {
            before: field(&config.before),
            after: field(&config.after),
            min: field(&config.min),
            max: field(&config.max),
            excluded: config.dates.iter().filter_map(parse_date_input).collect(),
        }
    }

    /// A copy of this policy with `min` replaced; everything else is kept.
    pub fn with_min(&self, min: Option<NaiveDate>) -> Self {
        DisabledPolicy {
            min,
            ..self.clone()
        }
    }

    /// A copy of this policy with `max` replaced; everything else is kept.
    pub fn with_max(&self, max: Option<NaiveDate>) -> Self {
        DisabledPolicy {
            max,
            ..self.clone()
        }
    }

    /// True if no rule is configured.
    pub fn is_empty(&self) -> bool {
        self.before.is_none()
            && self.after.is_none()
            && self.min.is_none()
            && self.max.is_none()
            && self.excluded.is_empty()
    }

    /// Whether `date` may not be selected.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use datepicker_core::disabled::{DisabledConfig, DisabledPolicy};
    ///
    /// let policy = DisabledPolicy::normalize(&DisabledConfig {
    ///     before: Some("2024-03-10".into()),
    ///     ..Default::default()
    /// });
    /// assert!(policy.is_disabled(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()));
    /// assert!(!policy.is_disabled(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()));
    /// ```
    pub fn is_disabled(&self, date: NaiveDate) -> bool {
        self.min.is_some_and(|min| date < min)
            || self.max.is_some_and(|max| date > max)
            || self.before.is_some_and(|before| date <= before)
            || self.after.is_some_and(|after| date >= after)
            || self.excluded.contains(&date)
    }

    /// `date` itself if it is still selectable, else `None`.
    pub fn retain(&self, date: Option<NaiveDate>) -> Option<NaiveDate> {
        date.filter(|d| !self.is_disabled(*d))
    }
}
