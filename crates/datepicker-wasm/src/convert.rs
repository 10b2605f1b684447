//! Conversions between JS values and picker types.

use chrono::{Datelike, NaiveDate};
use datepicker_core::disabled::{DateInput, DisabledConfig};
use datepicker_core::format::{FormatValue, OutputFormat};
use datepicker_core::options::PickerOptions;
use js_sys::{Array, Date, Function, Object, Reflect};
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};

use crate::render::Theme;

/// Read a date-like JS value (`Date`, epoch ms, or string).
///
/// `null`, `undefined` and anything else yield `None`.
pub(crate) fn date_input(value: &JsValue) -> Option<DateInput> {
    if let Some(date) = value.dyn_ref::<Date>() {
        return Some(DateInput::Millis(date.get_time()));
    }
    if let Some(ms) = value.as_f64() {
        return Some(DateInput::Millis(ms));
    }
    value.as_string().map(DateInput::Text)
}

/// A local-midnight JS `Date` for `date`.
///
/// Built from a local ISO date-time so years 0-99 are not shifted to 19xx
/// and negative years survive; years outside 0-9999 use the `±YYYYYY` form.
pub(crate) fn js_date(date: NaiveDate) -> JsValue {
    Date::new(&JsValue::from_str(&local_iso_midnight(date))).into()
}

fn local_iso_midnight(date: NaiveDate) -> String {
    let year = date.year();
    let year = if (0..=9999).contains(&year) {
        format!("{year:04}")
    } else {
        let sign = if year < 0 { '-' } else { '+' };
        format!("{sign}{:06}", year.unsigned_abs())
    };
    format!("{year}-{:02}-{:02}T00:00:00", date.month(), date.day())
}

pub(crate) fn js_date_opt(date: Option<NaiveDate>) -> JsValue {
    date.map_or(JsValue::NULL, js_date)
}

/// Replace `Date` objects in a `disabled` block with epoch milliseconds so
/// serde sees plain numbers.
fn plain_disabled(value: &JsValue) -> Result<JsValue, JsValue> {
    let Some(obj) = value.dyn_ref::<Object>() else {
        return Ok(value.clone());
    };
    let copy = Object::assign(&Object::new(), obj);
    for key in ["before", "after", "min", "max"] {
        let field = Reflect::get(&copy, &key.into())?;
        if let Some(date) = field.dyn_ref::<Date>() {
            Reflect::set(&copy, &key.into(), &date.get_time().into())?;
        }
    }
    let dates = Reflect::get(&copy, &"dates".into())?;
    if Array::is_array(&dates) {
        let plain: Array = Array::from(&dates)
            .iter()
            .map(|item| match item.dyn_ref::<Date>() {
                Some(date) => JsValue::from(date.get_time()),
                None => item,
            })
            .collect();
        Reflect::set(&copy, &"dates".into(), &plain)?;
    }
    Ok(copy.into())
}

/// Parse a disabled-date configuration object.
pub(crate) fn disabled_config(value: &JsValue) -> Result<DisabledConfig, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(DisabledConfig::default());
    }
    serde_wasm_bindgen::from_value(plain_disabled(value)?).map_err(JsValue::from)
}

/// Parse the constructor options object into picker options and theme.
///
/// A function-valued `format` becomes a custom formatter.
pub(crate) fn options(value: &JsValue) -> Result<(PickerOptions, Theme), JsValue> {
    let Some(obj) = value.dyn_ref::<Object>() else {
        return Ok((PickerOptions::default(), Theme::default()));
    };
    let copy = Object::assign(&Object::new(), obj);

    let custom = Reflect::get(&copy, &"format".into())?
        .dyn_into::<Function>()
        .ok();
    if custom.is_some() {
        Reflect::delete_property(&copy, &"format".into())?;
    }
    let disabled = Reflect::get(&copy, &"disabled".into())?;
    if disabled.is_object() {
        Reflect::set(&copy, &"disabled".into(), &plain_disabled(&disabled)?)?;
    }

    let copy: JsValue = copy.into();
    let mut options: PickerOptions = serde_wasm_bindgen::from_value(copy.clone())?;
    let theme: Theme = serde_wasm_bindgen::from_value(copy)?;
    if let Some(function) = custom {
        options.format = OutputFormat::Custom(Rc::new(move |value: &FormatValue| {
            call_formatter(&function, value)
        }));
    }
    Ok((options, theme))
}

/// Call a JS formatter with a `Date`/`null` or a `[start, end]` array.
fn call_formatter(function: &Function, value: &FormatValue) -> String {
    let arg = match *value {
        FormatValue::Single(date) => js_date_opt(date),
        FormatValue::Pair(start, end) => {
            Array::of2(&js_date_opt(start), &js_date_opt(end)).into()
        }
    };
    match function.call1(&JsValue::NULL, &arg) {
        Ok(text) => text.as_string().unwrap_or_default(),
        Err(err) => {
            log::warn!("custom formatter threw: {err:?}");
            String::new()
        }
    }
}
