//! The seams between the controller and the outside world.
//!
//! [`Host`] is everything presentation-specific: drawing the panel, writing
//! field values, showing and hiding the dropdown, and the outside-click
//! subscription. [`Clock`] supplies "today" and wall-clock milliseconds.
//! The browser binding implements both against the DOM; [`RecordingHost`]
//! and [`ManualClock`] are headless implementations for the CLI and tests.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::view::PanelView;

/// A form field the picker writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldSlot {
    /// The single editable field in direct mode.
    Direct,
    /// First hidden field in container mode (single date or range start).
    Start,
    /// Second hidden field in container mode (range end).
    End,
}

/// Presentation collaborator driven by the controller.
pub trait Host {
    /// Replace the panel content.
    fn render_panel(&mut self, view: &PanelView);

    /// Update the generated display element (container dropdown mode only).
    fn set_display_text(&mut self, text: &str, is_placeholder: bool);

    fn set_field_value(&mut self, slot: FieldSlot, value: &str);

    /// Raise a change notification on a field after its value changed.
    fn notify_change(&mut self, slot: FieldSlot);

    fn show_panel(&mut self);

    fn hide_panel(&mut self);

    /// Start reporting pointer-downs outside the panel and its anchor via
    /// [`DatePicker::outside_pointer`](crate::widget::DatePicker::outside_pointer).
    fn listen_outside_click(&mut self);

    fn unlisten_outside_click(&mut self);

    /// Drop focus from the open anchor so a trailing focus event cannot reopen.
    fn release_anchor(&mut self);

    /// Remove injected elements and release every bound handler.
    fn teardown(&mut self);
}

/// Time source for "today" and the reopen-suppression window.
pub trait Clock {
    fn today(&self) -> NaiveDate;

    /// Wall-clock milliseconds; only differences are used.
    fn now_millis(&self) -> i64;
}

/// The local system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now_millis(&self) -> i64 {
        Local::now().timestamp_millis()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    today: NaiveDate,
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        ManualClock {
            today,
            millis: Arc::new(AtomicI64::new(0)),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

// ── Recording host ──────────────────────────────────────────────────────────

/// One call received by a [`RecordingHost`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Render(PanelView),
    Display { text: String, placeholder: bool },
    FieldValue { slot: FieldSlot, value: String },
    Change(FieldSlot),
    Show,
    Hide,
    ListenOutside,
    UnlistenOutside,
    ReleaseAnchor,
    Teardown,
}

/// A headless host that records every call.
///
/// Clones share the same log, so a caller can keep a handle after moving
/// the host into a picker.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    calls: Rc<RefCell<Vec<HostCall>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    /// Take and clear the recorded calls.
    pub fn drain(&self) -> Vec<HostCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// The most recently rendered panel, if any.
    pub fn last_panel(&self) -> Option<PanelView> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            HostCall::Render(view) => Some(view.clone()),
            _ => None,
        })
    }

    /// The last value written to `slot`, if any.
    pub fn field_value(&self, slot: FieldSlot) -> Option<String> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            HostCall::FieldValue { slot: s, value } if *s == slot => Some(value.clone()),
            _ => None,
        })
    }

    /// The last display text written, if any.
    pub fn display_text(&self) -> Option<String> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            HostCall::Display { text, .. } => Some(text.clone()),
            _ => None,
        })
    }

    /// How many change notifications `slot` received.
    pub fn change_count(&self, slot: FieldSlot) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| **call == HostCall::Change(slot))
            .count()
    }

    fn push(&self, call: HostCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Host for RecordingHost {
    fn render_panel(&mut self, view: &PanelView) {
        self.push(HostCall::Render(view.clone()));
    }

    fn set_display_text(&mut self, text: &str, is_placeholder: bool) {
        self.push(HostCall::Display {
            text: text.to_string(),
            placeholder: is_placeholder,
        });
    }

    fn set_field_value(&mut self, slot: FieldSlot, value: &str) {
        self.push(HostCall::FieldValue {
            slot,
            value: value.to_string(),
        });
    }

    fn notify_change(&mut self, slot: FieldSlot) {
        self.push(HostCall::Change(slot));
    }

    fn show_panel(&mut self) {
        self.push(HostCall::Show);
    }

    fn hide_panel(&mut self) {
        self.push(HostCall::Hide);
    }

    fn listen_outside_click(&mut self) {
        self.push(HostCall::ListenOutside);
    }

    fn unlisten_outside_click(&mut self) {
        self.push(HostCall::UnlistenOutside);
    }

    fn release_anchor(&mut self) {
        self.push(HostCall::ReleaseAnchor);
    }

    fn teardown(&mut self) {
        self.push(HostCall::Teardown);
    }
}
