//! # datepicker-core
//!
//! Platform-independent calendar date picker.
//!
//! Everything a date picker decides lives here; drawing and event wiring
//! are left to a [`Host`] implementation (the DOM binding in
//! `datepicker-wasm`, or the headless [`RecordingHost`]).
//!
//! ## Modules
//!
//! - [`calendar`]: month arithmetic and the fixed 6×7 month grid
//! - [`disabled`]: the disabled-date policy and date-like input parsing
//! - [`selection`]: single/range selection state machine and cell classes
//! - [`format`]: locale, ISO, and custom output formatting
//! - [`locale`]: locale-aware month, weekday, and numeric date text
//! - [`options`]: per-instance configuration
//! - [`view`]: render-ready panel description
//! - [`host`]: the presentation and clock seams
//! - [`widget`]: the [`DatePicker`] controller
//! - [`error`]: Error types

pub mod calendar;
pub mod disabled;
pub mod error;
pub mod format;
pub mod host;
pub mod locale;
pub mod options;
pub mod selection;
pub mod view;
pub mod widget;

pub use calendar::{
    add_months, build_month_grid, clamp_range, day_difference, days_in_month, first_of_month,
    visible_row_count, weekday_order, DayCell, WeekStart, GRID_CELLS,
};
pub use disabled::{parse_date_input, DateInput, DisabledConfig, DisabledPolicy};
pub use error::PickerError;
pub use format::{format_value, parse_iso, require_iso, to_iso, FormatOptions, FormatValue, OutputFormat};
pub use host::{Clock, FieldSlot, Host, ManualClock, RecordingHost, SystemClock};
pub use locale::DateLocale;
pub use options::PickerOptions;
pub use selection::{classify_cell, transition, CellClass, Mode, SelectionState, Transition};
pub use view::{CellView, MonthView, OutputLine, PanelView};
pub use widget::{
    AnchorKey, Binding, DatePicker, PanelAction, Selection, SelectionInput, ValInput, ValOutput,
};
