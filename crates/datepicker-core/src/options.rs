//! Construction options for a picker.
//!
//! [`PickerOptions`] deserializes from the camelCase JSON shape an embedding
//! page passes in; every field has a default, so `{}` is a valid config.

use serde::{Deserialize, Deserializer};

use crate::calendar::WeekStart;
use crate::disabled::DisabledConfig;
use crate::error::{PickerError, Result};
use crate::format::OutputFormat;
use crate::locale::DateLocale;
use crate::selection::Mode;

pub const DEFAULT_LOCALE: &str = "de-DE";
pub const DEFAULT_SEPARATOR: &str = " – ";
pub const DEFAULT_PLACEHOLDER: &str = "Select period";

/// Per-instance configuration, fixed at construction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PickerOptions {
    /// Locale identifier for date text (`de-DE`, `en_US`, ...).
    pub locale: String,
    /// Select a date range instead of a single date.
    pub range: bool,
    /// Embed the calendar instead of showing it as a dropdown.
    pub inline: bool,
    pub start_on_sunday: bool,
    /// Close the dropdown once a selection completes.
    pub auto_close: bool,
    #[serde(deserialize_with = "deserialize_format")]
    pub format: OutputFormat,
    /// Joins the two sides of a formatted range.
    pub separator: String,
    /// Month panels shown side by side; values below 1 mean 1.
    pub months: i32,
    pub disabled: Option<DisabledConfig>,
    /// Display text while nothing is selected.
    pub placeholder: String,
}

impl Default for PickerOptions {
    fn default() -> Self {
        PickerOptions {
            locale: DEFAULT_LOCALE.to_string(),
            range: false,
            inline: false,
            start_on_sunday: false,
            auto_close: true,
            format: OutputFormat::Locale,
            separator: DEFAULT_SEPARATOR.to_string(),
            months: 1,
            disabled: None,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl PickerOptions {
    /// Parse options from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::InvalidOptions`] if the JSON is malformed or a
    /// field has the wrong type (e.g. an unknown `format` name).
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PickerError::InvalidOptions(e.to_string()))
    }

    /// Parse options from an already-decoded JSON value.
    ///
    /// # Errors
    ///
    /// Same as [`PickerOptions::from_json`].
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| PickerError::InvalidOptions(e.to_string()))
    }

    pub fn mode(&self) -> Mode {
        Mode::from_range_flag(self.range)
    }

    pub fn week_start(&self) -> WeekStart {
        WeekStart::from_sunday_flag(self.start_on_sunday)
    }

    pub fn month_count(&self) -> usize {
        self.months.max(1) as usize
    }

    /// The configured locale, or `en-US` if it is unknown.
    pub fn date_locale(&self) -> DateLocale {
        DateLocale::parse_or_fallback(&self.locale)
    }
}

fn deserialize_format<'de, D>(deserializer: D) -> std::result::Result<OutputFormat, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    OutputFormat::from_name(&name).ok_or_else(|| {
        serde::de::Error::invalid_value(
            serde::de::Unexpected::Str(&name),
            &"\"locale\" or \"iso\"",
        )
    })
}
