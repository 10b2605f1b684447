//! The selection state machine.
//!
//! [`transition`] maps the current [`SelectionState`] plus one clicked day
//! to the next state. It is pure: the widget controller owns the state,
//! calls in, and stores what comes back. Disabled days never reach the
//! machine; the controller filters them first.
//!
//! # Range mode
//!
//! | current                | click                       | next                          | completes |
//! |------------------------|-----------------------------|-------------------------------|-----------|
//! | `Empty`                | any                         | `RangeStartOnly(click)`       | no        |
//! | `RangeStartOnly(s)`    | `click < s`                 | `RangeStartOnly(click)`       | no        |
//! | `RangeStartOnly(s)`    | `click >= s`                | `Resolved { s, click }`       | **yes**   |
//! | `RangeEndOnly(e)`      | any                         | as `RangeStartOnly(e)`        | same      |
//! | `Resolved { s, e }`    | `click <= s`                | `Resolved { click, e }`       | no        |
//! | `Resolved { s, e }`    | `click >= e`                | `Resolved { s, click }`       | no        |
//! | `Resolved { s, e }`    | inside, nearer (or tied) to `s` | `Resolved { click, e }`   | no        |
//! | `Resolved { s, e }`    | inside, nearer to `e`       | `Resolved { s, click }`       | no        |
//!
//! Only a completing transition may auto-close an overlay panel. Clicking
//! inside a resolved range adjusts it and keeps the panel open.

use std::fmt;

use bitflags::bitflags;
use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::{clamp_range, day_difference};
use crate::disabled::DisabledPolicy;

/// Selection mode of a picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Single,
    Range,
}

impl Mode {
    pub fn from_range_flag(range: bool) -> Self {
        if range {
            Mode::Range
        } else {
            Mode::Single
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Single => f.write_str("single"),
            Mode::Range => f.write_str("range"),
        }
    }
}

/// What is currently selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Empty,
    /// Single mode: one chosen day.
    Single(NaiveDate),
    /// Range mode: start chosen, end pending.
    RangeStartOnly(NaiveDate),
    /// Range mode: only the end is set, after the start was cleared or a raw
    /// write left it absent. The end stays in the end slot.
    RangeEndOnly(NaiveDate),
    /// Range mode: both endpoints set. `start <= end` after any click, but a
    /// raw `set_selection` may store them inverted.
    Resolved { start: NaiveDate, end: NaiveDate },
}

impl SelectionState {
    /// Build a range state from optional endpoints, as stored.
    pub fn from_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        match (start, end) {
            (Some(start), Some(end)) => SelectionState::Resolved { start, end },
            (Some(start), None) => SelectionState::RangeStartOnly(start),
            (None, Some(end)) => SelectionState::RangeEndOnly(end),
            (None, None) => SelectionState::Empty,
        }
    }

    /// Build a single-mode state.
    pub fn from_single(date: Option<NaiveDate>) -> Self {
        date.map_or(SelectionState::Empty, SelectionState::Single)
    }

    /// `(start, end)` as stored, not order-normalized.
    ///
    /// A single-mode selection reports its date as the end, matching how a
    /// single date fills the "selected" slot.
    pub fn endpoints(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match *self {
            SelectionState::Empty => (None, None),
            SelectionState::Single(day) => (None, Some(day)),
            SelectionState::RangeStartOnly(start) => (Some(start), None),
            SelectionState::RangeEndOnly(end) => (None, Some(end)),
            SelectionState::Resolved { start, end } => (Some(start), Some(end)),
        }
    }

    /// `(start, end)` sorted ascending, for display and output.
    pub fn ordered(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let (start, end) = self.endpoints();
        clamp_range(start, end)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SelectionState::Empty)
    }

    /// Drop every endpoint the policy now disables.
    pub fn purge(self, policy: &DisabledPolicy) -> Self {
        match self {
            SelectionState::Empty => SelectionState::Empty,
            SelectionState::Single(day) => SelectionState::from_single(policy.retain(Some(day))),
            SelectionState::RangeStartOnly(start) => {
                SelectionState::from_range(policy.retain(Some(start)), None)
            }
            SelectionState::RangeEndOnly(end) => {
                SelectionState::from_range(None, policy.retain(Some(end)))
            }
            SelectionState::Resolved { start, end } => {
                SelectionState::from_range(policy.retain(Some(start)), policy.retain(Some(end)))
            }
        }
    }
}

/// The outcome of one click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: SelectionState,
    /// The click completed a selection (single pick, or first range end).
    /// Only completing clicks are eligible for auto-close.
    pub completed: bool,
}

impl Transition {
    fn adjust(next: SelectionState) -> Self {
        Transition {
            next,
            completed: false,
        }
    }

    fn complete(next: SelectionState) -> Self {
        Transition {
            next,
            completed: true,
        }
    }
}

/// Compute the next selection after a click on `clicked`.
///
/// # Arguments
///
/// * `state`: The current selection
/// * `clicked`: The clicked day (already known to be enabled)
/// * `mode`: Single or range selection
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use datepicker_core::selection::{transition, Mode, SelectionState};
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
/// let t = transition(SelectionState::RangeStartOnly(d(1)), d(10), Mode::Range);
/// assert_eq!(t.next, SelectionState::Resolved { start: d(1), end: d(10) });
/// assert!(t.completed);
/// ```
pub fn transition(state: SelectionState, clicked: NaiveDate, mode: Mode) -> Transition {
    match mode {
        Mode::Single => Transition::complete(SelectionState::Single(clicked)),
        Mode::Range => range_transition(state, clicked),
    }
}

fn range_transition(state: SelectionState, clicked: NaiveDate) -> Transition {
    match state {
        SelectionState::Empty => Transition::adjust(SelectionState::RangeStartOnly(clicked)),

        // A lone end or a single-mode leftover acts as a pending start.
        SelectionState::RangeStartOnly(start)
        | SelectionState::RangeEndOnly(start)
        | SelectionState::Single(start) => {
            if clicked < start {
                // A click before a pending start revises the start.
                Transition::adjust(SelectionState::RangeStartOnly(clicked))
            } else {
                Transition::complete(SelectionState::Resolved {
                    start,
                    end: clicked,
                })
            }
        }

        SelectionState::Resolved { start, end } => {
            let next = if clicked <= start {
                SelectionState::Resolved {
                    start: clicked,
                    end,
                }
            } else if clicked >= end {
                SelectionState::Resolved {
                    start,
                    end: clicked,
                }
            } else if day_difference(start, clicked) <= day_difference(clicked, end) {
                // Strictly inside: move the nearer edge; ties move the start.
                SelectionState::Resolved {
                    start: clicked,
                    end,
                }
            } else {
                SelectionState::Resolved {
                    start,
                    end: clicked,
                }
            };
            Transition::adjust(next)
        }
    }
}

// ── Cell classification ─────────────────────────────────────────────────────

bitflags! {
    /// Visual roles of one day cell. Several may apply at once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellClass: u8 {
        /// First day of the (ordered) range.
        const START = 1 << 0;
        /// Last day of the (ordered) range.
        const END = 1 << 1;
        /// Strictly between start and end.
        const IN_RANGE = 1 << 2;
        /// The chosen day in single mode.
        const SELECTED = 1 << 3;
        const TODAY = 1 << 4;
        /// Spill-over day from an adjacent month.
        const OUTSIDE_MONTH = 1 << 5;
        const DISABLED = 1 << 6;
    }
}

impl CellClass {
    /// Whether the cell is drawn as part of the selection.
    pub fn is_selected_any(self) -> bool {
        self.intersects(CellClass::START | CellClass::END | CellClass::IN_RANGE | CellClass::SELECTED)
    }
}

/// Inputs shared by every cell of one render pass.
#[derive(Debug, Clone, Copy)]
pub struct CellContext<'a> {
    pub state: &'a SelectionState,
    pub mode: Mode,
    pub policy: &'a DisabledPolicy,
    pub today: NaiveDate,
}

/// Classify a day cell for rendering.
pub fn classify_cell(date: NaiveDate, in_current_month: bool, ctx: &CellContext<'_>) -> CellClass {
    let mut class = CellClass::empty();

    match ctx.mode {
        Mode::Single => {
            if let SelectionState::Single(day) = *ctx.state {
                class.set(CellClass::SELECTED, day == date);
            }
        }
        Mode::Range => {
            let (start, end) = ctx.state.ordered();
            class.set(CellClass::START, start == Some(date));
            class.set(CellClass::END, end == Some(date));
            if let (Some(s), Some(e)) = (start, end) {
                class.set(CellClass::IN_RANGE, s < date && date < e);
            }
        }
    }

    class.set(CellClass::TODAY, date == ctx.today);
    class.set(CellClass::OUTSIDE_MONTH, !in_current_month);
    class.set(CellClass::DISABLED, ctx.policy.is_disabled(date));
    class
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disabled::DisabledConfig;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn resolved(start: u32, end: u32) -> SelectionState {
        SelectionState::Resolved {
            start: d(start),
            end: d(end),
        }
    }

    // ── single mode ─────────────────────────────────────────────────────

    #[test]
    fn test_single_click_replaces_anything() {
        for state in [
            SelectionState::Empty,
            SelectionState::Single(d(20)),
            SelectionState::RangeStartOnly(d(2)),
            resolved(1, 9),
        ] {
            let t = transition(state, d(5), Mode::Single);
            assert_eq!(t.next, SelectionState::Single(d(5)));
            assert!(t.completed);
        }
    }

    // ── range mode ──────────────────────────────────────────────────────

    #[test]
    fn test_range_first_click_sets_start() {
        let t = transition(SelectionState::Empty, d(5), Mode::Range);
        assert_eq!(t.next, SelectionState::RangeStartOnly(d(5)));
        assert!(!t.completed);
    }

    #[test]
    fn test_range_click_before_pending_start_moves_start() {
        let t = transition(SelectionState::RangeStartOnly(d(5)), d(1), Mode::Range);
        assert_eq!(t.next, SelectionState::RangeStartOnly(d(1)));
        assert!(!t.completed);
    }

    #[test]
    fn test_range_click_after_pending_start_completes() {
        let t = transition(SelectionState::RangeStartOnly(d(1)), d(10), Mode::Range);
        assert_eq!(t.next, resolved(1, 10));
        assert!(t.completed);
    }

    #[test]
    fn test_range_click_on_pending_start_completes_one_day_range() {
        let t = transition(SelectionState::RangeStartOnly(d(4)), d(4), Mode::Range);
        assert_eq!(t.next, resolved(4, 4));
        assert!(t.completed);
    }

    #[test]
    fn test_range_scenario_start_revise_complete() {
        let t1 = transition(SelectionState::Empty, d(5), Mode::Range);
        let t2 = transition(t1.next, d(1), Mode::Range);
        let t3 = transition(t2.next, d(10), Mode::Range);
        assert_eq!(t1.next, SelectionState::RangeStartOnly(d(5)));
        assert_eq!(t2.next, SelectionState::RangeStartOnly(d(1)));
        assert_eq!(t3.next, resolved(1, 10));
        assert!(!t1.completed && !t2.completed && t3.completed);
    }

    #[test]
    fn test_resolved_click_before_start_moves_start() {
        let t = transition(resolved(5, 10), d(2), Mode::Range);
        assert_eq!(t.next, resolved(2, 10));
        assert!(!t.completed);
    }

    #[test]
    fn test_resolved_click_on_start_keeps_range() {
        let t = transition(resolved(5, 10), d(5), Mode::Range);
        assert_eq!(t.next, resolved(5, 10));
    }

    #[test]
    fn test_resolved_click_after_end_moves_end() {
        let t = transition(resolved(5, 10), d(20), Mode::Range);
        assert_eq!(t.next, resolved(5, 20));
        assert!(!t.completed);
    }

    #[test]
    fn test_resolved_interior_click_nearer_start() {
        // distance to start = 3, to end = 6
        let t = transition(resolved(1, 10), d(4), Mode::Range);
        assert_eq!(t.next, resolved(4, 10));
        assert!(!t.completed);
    }

    #[test]
    fn test_resolved_interior_click_nearer_end() {
        let t = transition(resolved(1, 10), d(8), Mode::Range);
        assert_eq!(t.next, resolved(1, 8));
    }

    #[test]
    fn test_resolved_interior_tie_moves_start() {
        // distances 5 and 5
        let t = transition(resolved(1, 11), d(6), Mode::Range);
        assert_eq!(t.next, resolved(6, 11));
    }

    #[test]
    fn test_resolved_interior_across_month_boundary() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        // Feb 29 → 2 days from start, 4 from end (2024 is a leap year)
        let click = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let t = transition(SelectionState::Resolved { start, end }, click, Mode::Range);
        assert_eq!(t.next, SelectionState::Resolved { start: click, end });
    }

    #[test]
    fn test_single_state_in_range_mode_acts_as_pending_start() {
        let t = transition(SelectionState::Single(d(3)), d(7), Mode::Range);
        assert_eq!(t.next, resolved(3, 7));
        assert!(t.completed);
    }

    // ── state helpers ───────────────────────────────────────────────────

    #[test]
    fn test_from_range_keeps_lone_end_in_end_slot() {
        let state = SelectionState::from_range(None, Some(d(9)));
        assert_eq!(state, SelectionState::RangeEndOnly(d(9)));
        assert_eq!(state.endpoints(), (None, Some(d(9))));
        assert_eq!(state.ordered(), (None, Some(d(9))));
        assert_eq!(SelectionState::from_range(None, None), SelectionState::Empty);
    }

    #[test]
    fn test_range_click_after_lone_end_completes_from_it() {
        let t = transition(SelectionState::RangeEndOnly(d(9)), d(12), Mode::Range);
        assert_eq!(t.next, resolved(9, 12));
        assert!(t.completed);

        let t = transition(SelectionState::RangeEndOnly(d(9)), d(2), Mode::Range);
        assert_eq!(t.next, SelectionState::RangeStartOnly(d(2)));
        assert!(!t.completed);
    }

    #[test]
    fn test_ordered_normalizes_inverted_pair() {
        let state = resolved(10, 2);
        assert_eq!(state.endpoints(), (Some(d(10)), Some(d(2))));
        assert_eq!(state.ordered(), (Some(d(2)), Some(d(10))));
    }

    #[test]
    fn test_purge_clears_disabled_endpoints() {
        let policy = DisabledPolicy::normalize(&DisabledConfig {
            before: Some("2024-03-03".into()),
            ..Default::default()
        });
        assert_eq!(
            resolved(1, 10).purge(&policy),
            SelectionState::RangeEndOnly(d(10))
        );
        assert_eq!(resolved(1, 10).purge(&policy).endpoints(), (None, Some(d(10))));
        assert_eq!(
            SelectionState::RangeEndOnly(d(2)).purge(&policy),
            SelectionState::Empty
        );
        assert_eq!(resolved(4, 10).purge(&policy), resolved(4, 10));
        assert_eq!(
            SelectionState::Single(d(2)).purge(&policy),
            SelectionState::Empty
        );
        assert_eq!(
            SelectionState::RangeStartOnly(d(3)).purge(&policy),
            SelectionState::Empty
        );
    }

    // ── classify_cell ───────────────────────────────────────────────────

    fn ctx<'a>(
        state: &'a SelectionState,
        mode: Mode,
        policy: &'a DisabledPolicy,
    ) -> CellContext<'a> {
        CellContext {
            state,
            mode,
            policy,
            today: d(15),
        }
    }

    #[test]
    fn test_classify_range_edges_and_interior() {
        let state = resolved(10, 4); // stored inverted
        let policy = DisabledPolicy::default();
        let c = ctx(&state, Mode::Range, &policy);
        assert_eq!(classify_cell(d(4), true, &c), CellClass::START);
        assert_eq!(classify_cell(d(10), true, &c), CellClass::END);
        assert_eq!(classify_cell(d(7), true, &c), CellClass::IN_RANGE);
        assert_eq!(classify_cell(d(11), true, &c), CellClass::empty());
    }

    #[test]
    fn test_classify_one_day_range_is_both_edges() {
        let state = resolved(6, 6);
        let policy = DisabledPolicy::default();
        let c = ctx(&state, Mode::Range, &policy);
        assert_eq!(
            classify_cell(d(6), true, &c),
            CellClass::START | CellClass::END
        );
    }

    #[test]
    fn test_classify_pending_start() {
        let state = SelectionState::RangeStartOnly(d(6));
        let policy = DisabledPolicy::default();
        let c = ctx(&state, Mode::Range, &policy);
        assert_eq!(classify_cell(d(6), true, &c), CellClass::START);
        assert_eq!(classify_cell(d(7), true, &c), CellClass::empty());
    }

    #[test]
    fn test_classify_flags_combine() {
        let state = resolved(1, 20);
        let policy = DisabledPolicy::normalize(&DisabledConfig {
            dates: vec!["2024-03-15".into()],
            ..Default::default()
        });
        let c = ctx(&state, Mode::Range, &policy);
        let class = classify_cell(d(15), false, &c);
        assert!(class.contains(
            CellClass::IN_RANGE | CellClass::TODAY | CellClass::DISABLED | CellClass::OUTSIDE_MONTH
        ));
        assert!(class.is_selected_any());
    }

    #[test]
    fn test_classify_single_mode() {
        let state = SelectionState::Single(d(8));
        let policy = DisabledPolicy::default();
        let c = ctx(&state, Mode::Single, &policy);
        assert_eq!(classify_cell(d(8), true, &c), CellClass::SELECTED);
        assert!(!classify_cell(d(9), true, &c).is_selected_any());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Single.to_string(), "single");
        assert_eq!(Mode::from_range_flag(true), Mode::Range);
    }
}
