//! The widget controller.
//!
//! [`DatePicker`] owns one selection, one disabled policy and the options
//! of a single picker instance. Every mutation runs synchronously to
//! completion: update state, rebuild the [`PanelView`], hand it to the
//! [`Host`], and sync the bound outputs. Panel clicks arrive through
//! [`DatePicker::handle_action`], so the host needs one delegated listener on
//! the panel root rather than a handler per rendered button.
//!
//! # Outputs
//!
//! | binding                   | receives                                  |
//! |---------------------------|-------------------------------------------|
//! | direct field              | selection in the configured format        |
//! | container hidden fields   | ISO `YYYY-MM-DD` (start, end)             |
//! | container display element | locale text, or the placeholder           |
//!
//! A field gets a change notification only when its value actually changed.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::calendar::{add_months, first_of_month};
use crate::disabled::{parse_date_input, DateInput, DisabledConfig, DisabledPolicy};
use crate::error::{PickerError, Result};
use crate::format::{format_value, to_iso_opt, FormatOptions, FormatValue, OutputFormat};
use crate::host::{Clock, FieldSlot, Host, SystemClock};
use crate::locale::DateLocale;
use crate::options::PickerOptions;
use crate::selection::{transition, CellContext, Mode, SelectionState};
use crate::view::{build_panel, OutputLine, PanelInputs, PanelView};

/// How long open requests are ignored after the panel closes.
pub const REOPEN_SUPPRESSION_MS: i64 = 150;

/// How the picker is attached to its host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Bound to one editable field that holds the formatted text and opens
    /// the panel.
    DirectField,
    /// Bound to a container scanned for up to two fields. Two fields switch
    /// the picker to range mode; fewer force single mode.
    Container { fields: usize },
}

impl Binding {
    /// Mode forced by the binding, if any.
    fn forced_mode(self) -> Option<Mode> {
        match self {
            Binding::DirectField => None,
            Binding::Container { fields } => Some(Mode::from_range_flag(fields >= 2)),
        }
    }
}

/// A panel interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Pick(NaiveDate),
    PrevMonth,
    NextMonth,
    PrevYear,
    NextYear,
    /// Jump the view to the current month.
    Today,
    Clear,
}

/// Keys the anchor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKey {
    Enter,
    Space,
    Other,
}

impl AnchorKey {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Enter" => AnchorKey::Enter,
            " " | "Spacebar" | "Space" => AnchorKey::Space,
            _ => AnchorKey::Other,
        }
    }
}

/// The current selection as returned to callers, endpoints as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Single(Option<NaiveDate>),
    Range {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

/// A raw selection overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionInput {
    Clear,
    Single(NaiveDate),
    Range(Option<NaiveDate>, Option<NaiveDate>),
}

/// ISO-string view of the selection (`""` for absent dates).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValOutput {
    Single(String),
    Range(String, String),
}

/// Date-like values for [`DatePicker::set_val`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValInput {
    Single(Option<DateInput>),
    Range(Option<DateInput>, Option<DateInput>),
}

/// A calendar date picker bound to a [`Host`].
pub struct DatePicker<H: Host, C: Clock = SystemClock> {
    host: H,
    clock: C,
    options: PickerOptions,
    binding: Binding,
    mode: Mode,
    locale: DateLocale,
    policy: DisabledPolicy,
    state: SelectionState,
    /// First day of the first displayed month.
    view: NaiveDate,
    open: bool,
    suppress_open_until: i64,
    written: BTreeMap<FieldSlot, String>,
    destroyed: bool,
}

impl<H: Host> DatePicker<H, SystemClock> {
    /// Create a picker using the system clock.
    pub fn new(options: PickerOptions, binding: Binding, host: H) -> Self {
        DatePicker::with_clock(options, binding, host, SystemClock)
    }
}

impl<H: Host, C: Clock> DatePicker<H, C> {
    /// Create a picker, render it once, and leave a dropdown panel closed.
    ///
    /// A container binding overrides `options.range` according to how many
    /// fields it found.
    pub fn with_clock(mut options: PickerOptions, binding: Binding, host: H, clock: C) -> Self {
        if let Some(mode) = binding.forced_mode() {
            options.range = mode == Mode::Range;
        }
        let policy = options
            .disabled
            .as_ref()
            .map(DisabledPolicy::normalize)
            .unwrap_or_default();
        let view = first_of_month(clock.today());

        let mut picker = DatePicker {
            mode: options.mode(),
            locale: options.date_locale(),
            host,
            clock,
            options,
            binding,
            policy,
            state: SelectionState::Empty,
            view,
            open: false,
            suppress_open_until: 0,
            written: BTreeMap::new(),
            destroyed: false,
        };
        log::debug!(
            "created {} picker ({:?}, inline={})",
            picker.mode,
            picker.binding,
            picker.options.inline
        );
        picker.refresh(false);
        if !picker.options.inline {
            picker.host.hide_panel();
        }
        picker
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    pub fn options(&self) -> &PickerOptions {
        &self.options
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// First day of the first displayed month.
    pub fn view_month(&self) -> NaiveDate {
        self.view
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn disabled_policy(&self) -> &DisabledPolicy {
        &self.policy
    }

    /// Whether `date` is currently selectable.
    pub fn is_disabled(&self, date: NaiveDate) -> bool {
        self.policy.is_disabled(date)
    }

    /// The panel as it would render now.
    pub fn panel(&self) -> PanelView {
        let today = self.clock.today();
        build_panel(&PanelInputs {
            view: self.view,
            months: self.options.month_count(),
            week_start: self.options.week_start(),
            locale: self.locale,
            inline_output: self
                .options
                .inline
                .then(|| OutputLine::new(self.display_text(), &self.options.placeholder)),
            cells: CellContext {
                state: &self.state,
                mode: self.mode,
                policy: &self.policy,
                today,
            },
        })
    }

    // ── Selection API ───────────────────────────────────────────────────

    /// The current selection, endpoints as stored.
    pub fn selection(&self) -> Selection {
        match self.mode {
            Mode::Single => Selection::Single(self.state.endpoints().1),
            Mode::Range => {
                let (start, end) = self.state.endpoints();
                Selection::Range { start, end }
            }
        }
    }

    /// Overwrite the selection directly, bypassing the click machine.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::ModeMismatch`] for a range value on a
    /// single-mode picker or a single value on a range picker, and
    /// [`PickerError::Destroyed`] after [`destroy`](Self::destroy). The
    /// selection is left untouched in both cases.
    pub fn set_selection(&mut self, input: SelectionInput) -> Result<()> {
        if self.destroyed {
            return Err(PickerError::Destroyed);
        }
        let next = match (input, self.mode) {
            (SelectionInput::Clear, _) => SelectionState::Empty,
            (SelectionInput::Single(date), Mode::Single) => SelectionState::Single(date),
            (SelectionInput::Range(start, end), Mode::Range) => {
                SelectionState::from_range(start, end)
            }
            (SelectionInput::Single(_), Mode::Range) => {
                return Err(PickerError::ModeMismatch {
                    operation: "single-date selection",
                    mode: self.mode,
                })
            }
            (SelectionInput::Range(..), Mode::Single) => {
                return Err(PickerError::ModeMismatch {
                    operation: "range selection",
                    mode: self.mode,
                })
            }
        };
        log::debug!("selection set to {next:?}");
        self.state = next;
        self.refresh(true);
        Ok(())
    }

    /// Reset the selection to empty.
    pub fn clear(&mut self) {
        if self.destroyed {
            return;
        }
        self.state = SelectionState::Empty;
        self.refresh(true);
    }

    /// ISO strings of the selection, range sides in ascending order.
    pub fn val(&self) -> ValOutput {
        match self.mode {
            Mode::Single => ValOutput::Single(to_iso_opt(self.state.endpoints().1)),
            Mode::Range => {
                let (start, end) = self.state.ordered();
                ValOutput::Range(to_iso_opt(start), to_iso_opt(end))
            }
        }
    }

    /// Set the selection from date-like values; unparseable values count as
    /// absent.
    ///
    /// A single value on a range picker sets only the start; a pair on a
    /// single picker uses its first side.
    pub fn set_val(&mut self, input: ValInput) {
        if self.destroyed {
            return;
        }
        let parse = |v: Option<DateInput>| v.as_ref().and_then(parse_date_input);
        self.state = match (input, self.mode) {
            (ValInput::Single(v), Mode::Single) | (ValInput::Range(v, _), Mode::Single) => {
                SelectionState::from_single(parse(v))
            }
            (ValInput::Single(v), Mode::Range) => SelectionState::from_range(parse(v), None),
            (ValInput::Range(a, b), Mode::Range) => SelectionState::from_range(parse(a), parse(b)),
        };
        log::debug!("selection set to {:?} via val", self.state);
        self.refresh(true);
    }

    // ── Disabled policy API ─────────────────────────────────────────────

    /// Replace the disabled policy wholesale.
    pub fn set_disabled_policy(&mut self, config: &DisabledConfig) {
        self.apply_policy(DisabledPolicy::normalize(config));
    }

    /// Overlay a new `min` onto the current policy; `None` removes it.
    pub fn set_min(&mut self, min: Option<&DateInput>) {
        let min = min.and_then(parse_date_input);
        let policy = self.policy.with_min(min);
        self.apply_policy(policy);
    }

    /// Overlay a new `max` onto the current policy; `None` removes it.
    pub fn set_max(&mut self, max: Option<&DateInput>) {
        let max = max.and_then(parse_date_input);
        let policy = self.policy.with_max(max);
        self.apply_policy(policy);
    }

    pub fn clear_disabled_policy(&mut self) {
        self.apply_policy(DisabledPolicy::default());
    }

    fn apply_policy(&mut self, policy: DisabledPolicy) {
        if self.destroyed {
            return;
        }
        self.policy = policy;
        let purged = self.state.purge(&self.policy);
        if purged != self.state {
            log::debug!("policy change cleared endpoints: {:?} -> {purged:?}", self.state);
            self.state = purged;
        }
        self.refresh(true);
    }

    // ── Panel interaction ───────────────────────────────────────────────

    /// Handle a click inside the panel.
    pub fn handle_action(&mut self, action: PanelAction) {
        if self.destroyed {
            return;
        }
        match action {
            PanelAction::Pick(date) => self.pick(date),
            PanelAction::PrevMonth => self.shift_view(-1),
            PanelAction::NextMonth => self.shift_view(1),
            PanelAction::PrevYear => self.shift_view(-12),
            PanelAction::NextYear => self.shift_view(12),
            PanelAction::Today => {
                self.view = first_of_month(self.clock.today());
                self.refresh(true);
            }
            PanelAction::Clear => self.clear(),
        }
    }

    /// Show a different month without touching the selection.
    pub fn set_view_month(&mut self, date: NaiveDate) {
        if self.destroyed {
            return;
        }
        self.view = first_of_month(date);
        self.refresh(true);
    }

    fn shift_view(&mut self, months: i32) {
        self.view = add_months(self.view, months);
        self.refresh(true);
    }

    fn pick(&mut self, date: NaiveDate) {
        if self.policy.is_disabled(date) {
            log::debug!("ignoring click on disabled {date}");
            return;
        }
        let step = transition(self.state, date, self.mode);
        log::debug!("{:?} --{date}--> {:?}", self.state, step.next);
        self.state = step.next;
        self.refresh(true);
        if step.completed && self.options.auto_close {
            self.close();
        }
    }

    // ── Overlay visibility ──────────────────────────────────────────────

    /// Show the dropdown panel. No-op when inline, open, or destroyed.
    pub fn open(&mut self) {
        if self.destroyed || self.options.inline || self.open {
            return;
        }
        log::trace!("opening panel");
        self.open = true;
        self.host.show_panel();
        self.host.listen_outside_click();
    }

    /// Hide the dropdown panel and start the reopen-suppression window.
    pub fn close(&mut self) {
        if self.destroyed || self.options.inline || !self.open {
            return;
        }
        log::trace!("closing panel");
        self.open = false;
        self.host.hide_panel();
        self.host.unlisten_outside_click();
        self.host.release_anchor();
        self.suppress_open_until = self.clock.now_millis() + REOPEN_SUPPRESSION_MS;
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    /// The anchor (field or display element) was clicked.
    pub fn anchor_clicked(&mut self) {
        self.request_open();
    }

    /// A key was pressed on the anchor; Enter and Space open the panel.
    /// Returns whether the key was consumed.
    pub fn anchor_key(&mut self, key: AnchorKey) -> bool {
        match key {
            AnchorKey::Enter | AnchorKey::Space => {
                self.request_open();
                true
            }
            AnchorKey::Other => false,
        }
    }

    /// A pointer-down landed outside the panel and its anchor.
    pub fn outside_pointer(&mut self) {
        self.close();
    }

    fn request_open(&mut self) {
        if self.open {
            return;
        }
        if self.clock.now_millis() < self.suppress_open_until {
            log::trace!("open request suppressed");
            return;
        }
        self.open();
    }

    // ── Teardown ────────────────────────────────────────────────────────

    /// Release the host. Idempotent; every later call is a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.close();
        self.host.teardown();
        self.destroyed = true;
        log::debug!("picker destroyed");
    }

    // ── Rendering and output sync ───────────────────────────────────────

    /// Locale text for the display element and inline output line.
    fn display_text(&self) -> String {
        let opts = FormatOptions {
            format: &OutputFormat::Locale,
            locale: self.locale,
            separator: &self.options.separator,
        };
        format_value(&self.format_subject(), &opts)
    }

    fn format_subject(&self) -> FormatValue {
        match self.mode {
            Mode::Single => FormatValue::Single(self.state.endpoints().1),
            Mode::Range => {
                let (start, end) = self.state.ordered();
                FormatValue::Pair(start, end)
            }
        }
    }

    fn refresh(&mut self, notify: bool) {
        let view = self.panel();
        self.host.render_panel(&view);
        self.sync_outputs(notify);
    }

    fn sync_outputs(&mut self, notify: bool) {
        match self.binding {
            Binding::DirectField => {
                let opts = FormatOptions {
                    format: &self.options.format,
                    locale: self.locale,
                    separator: &self.options.separator,
                };
                let text = format_value(&self.format_subject(), &opts);
                self.write_field(FieldSlot::Direct, text, notify);
            }
            Binding::Container { fields } => {
                if !self.options.inline {
                    let line = OutputLine::new(self.display_text(), &self.options.placeholder);
                    self.host.set_display_text(&line.text, line.is_placeholder);
                }
                let (start, end) = match self.mode {
                    Mode::Single => (self.state.endpoints().1, None),
                    Mode::Range => self.state.ordered(),
                };
                if fields >= 1 {
                    self.write_field(FieldSlot::Start, to_iso_opt(start), notify);
                }
                if fields >= 2 {
                    self.write_field(FieldSlot::End, to_iso_opt(end), notify);
                }
            }
        }
    }

    fn write_field(&mut self, slot: FieldSlot, value: String, notify: bool) {
        let changed = self.written.get(&slot) != Some(&value);
        self.host.set_field_value(slot, &value);
        if changed && notify {
            self.host.notify_change(slot);
        }
        self.written.insert(slot, value);
    }
}
