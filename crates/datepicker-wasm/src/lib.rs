//! # datepicker-wasm
//!
//! Browser binding for `datepicker-core`.
//!
//! Exposes a `DatePicker` JS class that attaches to either an `<input>`
//! (the formatted selection is written into it) or a container holding up
//! to two hidden inputs (ISO values, with a generated display element).
//!
//! ## Modules
//!
//! - [`render`]: Bootstrap-styled panel HTML and action parsing
//! - `dom`: the DOM-backed `Host` and event wiring (wasm32 only)
//! - `picker`: the `#[wasm_bindgen]` class (wasm32 only)

pub mod render;

#[cfg(target_arch = "wasm32")]
mod convert;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod logger;
#[cfg(target_arch = "wasm32")]
mod picker;

pub use render::{panel_html, parse_action, DisplayClasses, Icons, Theme};

#[cfg(target_arch = "wasm32")]
pub use picker::JsDatePicker;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Warn);
}

/// Set the console log level (`"off"`, `"error"`, `"warn"`, `"info"`,
/// `"debug"`, `"trace"`). Unknown names mean `"warn"`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) {
    logger::init(logger::parse_level(level));
}
