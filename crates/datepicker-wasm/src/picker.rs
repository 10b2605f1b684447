//! The JS-facing `DatePicker` class.
//!
//! Errors never throw into the page after construction: mode mismatches and
//! calls on a busy or destroyed picker are logged and ignored.

use std::cell::RefCell;
use std::rc::Rc;

use datepicker_core::disabled::parse_date_input;
use datepicker_core::widget::{Selection, SelectionInput, ValInput, ValOutput};
use js_sys::Array;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::convert;
use crate::dom::{mount, Picker};

/// A date picker attached to an input or a container element.
///
/// ```js
/// const picker = new DatePicker(document.querySelector("#period"), {
///   locale: "en-US",
///   months: 2,
///   disabled: { before: new Date() },
/// });
/// picker.val("2024-03-01", "2024-03-10");
/// ```
#[wasm_bindgen(js_name = DatePicker)]
pub struct JsDatePicker {
    inner: Rc<RefCell<Picker>>,
}

#[wasm_bindgen(js_class = DatePicker)]
impl JsDatePicker {
    /// Attach to `element` with an options object.
    ///
    /// # Errors
    ///
    /// Throws if the options have the wrong shape or the DOM is unavailable.
    #[wasm_bindgen(constructor)]
    pub fn new(element: HtmlElement, options: JsValue) -> Result<JsDatePicker, JsValue> {
        let (options, theme) = convert::options(&options)?;
        let inner = mount(&element, options, theme)?;
        Ok(JsDatePicker { inner })
    }

    /// Single mode: a `Date` or `null`. Range mode: the present endpoints
    /// as stored, as an array of `Date`s.
    #[wasm_bindgen(js_name = getDate)]
    pub fn get_date(&self) -> JsValue {
        self.read(|picker| match picker.selection() {
            Selection::Single(date) => convert::js_date_opt(date),
            Selection::Range { start, end } => [start, end]
                .into_iter()
                .flatten()
                .map(convert::js_date)
                .collect::<Array>()
                .into(),
        })
    }

    /// Overwrite the selection: `null` clears, a date-like value sets a
    /// single date, `[start, end]` sets a range.
    #[wasm_bindgen(js_name = setDate)]
    pub fn set_date(&self, value: JsValue) {
        let parse = |v: &JsValue| convert::date_input(v).as_ref().and_then(parse_date_input);
        let input = if value.is_null() || value.is_undefined() {
            SelectionInput::Clear
        } else if Array::is_array(&value) {
            let pair = Array::from(&value);
            SelectionInput::Range(parse(&pair.get(0)), parse(&pair.get(1)))
        } else {
            match parse(&value) {
                Some(date) => SelectionInput::Single(date),
                None => SelectionInput::Clear,
            }
        };
        self.write(|picker| {
            if let Err(err) = picker.set_selection(input) {
                log::warn!("setDate ignored: {err}");
            }
        });
    }

    /// Without arguments: the ISO value (`""` when empty; a two-element
    /// array in range mode). With arguments: set from `val(a)`,
    /// `val(a, b)` or `val([a, b])` and return `undefined`.
    pub fn val(&self, a: JsValue, b: JsValue) -> JsValue {
        if a.is_undefined() && b.is_undefined() {
            return self.read(|picker| match picker.val() {
                ValOutput::Single(iso) => JsValue::from(iso),
                ValOutput::Range(start, end) => {
                    Array::of2(&start.into(), &end.into()).into()
                }
            });
        }
        let input = if Array::is_array(&a) {
            let pair = Array::from(&a);
            ValInput::Range(
                convert::date_input(&pair.get(0)),
                convert::date_input(&pair.get(1)),
            )
        } else if b.is_undefined() {
            ValInput::Single(convert::date_input(&a))
        } else {
            ValInput::Range(convert::date_input(&a), convert::date_input(&b))
        };
        self.write(|picker| picker.set_val(input));
        JsValue::UNDEFINED
    }

    /// Replace the disabled-date configuration.
    #[wasm_bindgen(js_name = setDisableDates)]
    pub fn set_disable_dates(&self, config: JsValue) {
        match convert::disabled_config(&config) {
            Ok(config) => self.write(|picker| picker.set_disabled_policy(&config)),
            Err(err) => log::warn!("setDisableDates ignored: {err:?}"),
        }
    }

    /// The normalized policy: `before`, `after`, `min` and `max` as ISO
    /// strings when set, and `dates` as an array.
    #[wasm_bindgen(js_name = getDisableDates)]
    pub fn get_disable_dates(&self) -> JsValue {
        self.read(|picker| {
            serde_wasm_bindgen::to_value(picker.disabled_policy()).unwrap_or(JsValue::NULL)
        })
    }

    #[wasm_bindgen(js_name = setMin)]
    pub fn set_min(&self, date: JsValue) {
        let min = convert::date_input(&date);
        self.write(|picker| picker.set_min(min.as_ref()));
    }

    #[wasm_bindgen(js_name = setMax)]
    pub fn set_max(&self, date: JsValue) {
        let max = convert::date_input(&date);
        self.write(|picker| picker.set_max(max.as_ref()));
    }

    #[wasm_bindgen(js_name = clearDisableDates)]
    pub fn clear_disable_dates(&self) {
        self.write(|picker| picker.clear_disabled_policy());
    }

    pub fn open(&self) {
        self.write(|picker| picker.open());
    }

    pub fn close(&self) {
        self.write(|picker| picker.close());
    }

    pub fn toggle(&self) {
        self.write(|picker| picker.toggle());
    }

    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.inner
            .try_borrow()
            .map(|picker| picker.is_open())
            .unwrap_or(false)
    }

    /// Remove the panel and every listener. Safe to call twice.
    pub fn destroy(&self) {
        self.write(|picker| picker.destroy());
    }
}

impl JsDatePicker {
    fn read(&self, f: impl FnOnce(&Picker) -> JsValue) -> JsValue {
        match self.inner.try_borrow() {
            Ok(picker) => f(&picker),
            Err(_) => {
                log::warn!("picker is busy; read skipped");
                JsValue::UNDEFINED
            }
        }
    }

    fn write(&self, f: impl FnOnce(&mut Picker)) {
        match self.inner.try_borrow_mut() {
            Ok(mut picker) => f(&mut picker),
            Err(_) => log::warn!("picker is busy; call skipped"),
        }
    }
}
