//! Property-based invariant tests for calendar math and the selection machine.
//!
//! 1. Every grid has 42 consecutive days opening on the week-start day.
//! 2. The anchor month appears as exactly one contiguous run starting at the 1st.
//! 3. Visible rows cover the whole month and nothing but spill-over is trimmed.
//! 4. Month stepping round-trips and always lands on the 1st.
//! 5. ISO formatting round-trips through the strict parser.
//! 6. Single mode always holds exactly the last clicked day.
//! 7. Click-built ranges are ordered and the clicked day is an endpoint.
//! 8. Cell classes never combine IN_RANGE with an edge flag.
//! 9. Disabled bounds are inclusive for before/after and exclusive for min/max.

use chrono::{Datelike, NaiveDate};
use datepicker_core::calendar::{
    add_months, build_month_grid, days_in_month, visible_row_count, weekday_order, WeekStart,
    GRID_CELLS,
};
use datepicker_core::disabled::{DisabledConfig, DisabledPolicy};
use datepicker_core::format::{parse_iso, to_iso};
use datepicker_core::selection::{
    classify_cell, transition, CellClass, CellContext, Mode, SelectionState,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Any date between year 1 and year 9999.
fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1i32..=3_652_059).prop_map(|n| {
        NaiveDate::from_num_days_from_ce_opt(n).expect("day number in range")
    })
}

/// Dates within a few months of each other, so ranges interact.
fn nearby_dates(max: usize) -> impl Strategy<Value = Vec<NaiveDate>> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid base");
    prop::collection::vec(0i64..120, 1..max)
        .prop_map(move |offsets| offsets.into_iter().map(|o| base + chrono::Duration::days(o)).collect())
}

fn week_start_strategy() -> impl Strategy<Value = WeekStart> {
    prop_oneof![Just(WeekStart::Monday), Just(WeekStart::Sunday)]
}

fn run_clicks(clicks: &[NaiveDate], mode: Mode) -> SelectionState {
    clicks
        .iter()
        .fold(SelectionState::Empty, |state, &day| transition(state, day, mode).next)
}

// ═════════════════════════════════════════════════════════════════════════
// 1–3. Month grid shape
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn grid_is_consecutive_from_week_start(
        year in 1600i32..2400,
        month in 1i32..=12,
        ws in week_start_strategy(),
    ) {
        let grid = build_month_grid(year, month, ws);
        prop_assert_eq!(grid.len(), GRID_CELLS);
        prop_assert_eq!(grid[0].date.weekday(), weekday_order(ws)[0]);
        for pair in grid.windows(2) {
            prop_assert_eq!(pair[0].date.succ_opt(), Some(pair[1].date));
        }
    }

    #[test]
    fn grid_month_run_is_contiguous(
        year in 1600i32..2400,
        month in 1i32..=12,
        ws in week_start_strategy(),
    ) {
        let grid = build_month_grid(year, month, ws);
        let flags: Vec<bool> = grid.iter().map(|c| c.in_current_month).collect();
        let first = flags.iter().position(|&f| f).expect("month present");
        let len = flags[first..].iter().take_while(|&&f| f).count();
        prop_assert_eq!(len as u32, days_in_month(year, month));
        prop_assert!(flags[first + len..].iter().all(|&f| !f));
        prop_assert_eq!(grid[first].date.day(), 1);
        prop_assert!(first < 7, "the 1st must sit in the first row");
    }

    #[test]
    fn visible_rows_cover_month(
        year in 1600i32..2400,
        month in 1i32..=12,
        ws in week_start_strategy(),
    ) {
        let rows = visible_row_count(year, month, ws);
        prop_assert!((4..=6).contains(&rows));
        let grid = build_month_grid(year, month, ws);
        prop_assert!(grid[rows * 7..].iter().all(|c| !c.in_current_month));
        prop_assert!(grid[(rows - 1) * 7..rows * 7].iter().any(|c| c.in_current_month));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4–5. Month stepping and ISO
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn add_months_round_trips(
        year in 1600i32..2400,
        month in 1u32..=12,
        day in 1u32..=28,
        n in -600i32..600,
    ) {
        let date = NaiveDate::from_ymd_opt(year, month, day).expect("valid date");
        let stepped = add_months(date, n);
        prop_assert_eq!(stepped.day(), 1);
        let back = add_months(stepped, -n);
        prop_assert_eq!(back, NaiveDate::from_ymd_opt(year, month, 1).expect("valid date"));
    }

    #[test]
    fn iso_round_trips(date in date_strategy()) {
        let text = to_iso(date);
        prop_assert_eq!(text.len(), 10);
        prop_assert_eq!(parse_iso(&text), Some(date));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6–8. Selection machine
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn single_mode_holds_last_click(clicks in nearby_dates(12)) {
        let state = run_clicks(&clicks, Mode::Single);
        let last = *clicks.last().expect("non-empty");
        prop_assert_eq!(state, SelectionState::Single(last));
    }

    #[test]
    fn range_clicks_stay_ordered(clicks in nearby_dates(12)) {
        let mut state = SelectionState::Empty;
        for &day in &clicks {
            state = transition(state, day, Mode::Range).next;
            match state {
                SelectionState::RangeStartOnly(start) => prop_assert_eq!(start, day),
                SelectionState::Resolved { start, end } => {
                    prop_assert!(start <= end, "inverted range {:?}", state);
                    prop_assert!(start == day || end == day);
                }
                other => prop_assert!(false, "unexpected state {:?}", other),
            }
        }
    }

    #[test]
    fn only_first_end_completes(clicks in nearby_dates(12)) {
        let mut state = SelectionState::Empty;
        for &day in &clicks {
            let step = transition(state, day, Mode::Range);
            let first_end = matches!(state, SelectionState::RangeStartOnly(_))
                && matches!(step.next, SelectionState::Resolved { .. });
            prop_assert_eq!(step.completed, first_end);
            state = step.next;
        }
    }

    #[test]
    fn in_range_excludes_edges(clicks in nearby_dates(6)) {
        let state = run_clicks(&clicks, Mode::Range);
        let policy = DisabledPolicy::default();
        let ctx = CellContext {
            state: &state,
            mode: Mode::Range,
            policy: &policy,
            today: NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid date"),
        };
        let grid = build_month_grid(2024, 2, WeekStart::Monday);
        for cell in grid {
            let class = classify_cell(cell.date, cell.in_current_month, &ctx);
            if class.contains(CellClass::IN_RANGE) {
                prop_assert!(!class.intersects(CellClass::START | CellClass::END));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 9. Disabled bounds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn bound_inclusivity(bound in date_strategy(), probe in date_strategy()) {
        let iso = to_iso(bound);
        let before = DisabledPolicy::normalize(&DisabledConfig {
            before: Some(iso.as_str().into()),
            ..Default::default()
        });
        prop_assert_eq!(before.is_disabled(probe), probe <= bound);

        let min = DisabledPolicy::normalize(&DisabledConfig {
            min: Some(iso.as_str().into()),
            ..Default::default()
        });
        prop_assert_eq!(min.is_disabled(probe), probe < bound);

        let after = DisabledPolicy::normalize(&DisabledConfig {
            after: Some(iso.as_str().into()),
            ..Default::default()
        });
        prop_assert_eq!(after.is_disabled(probe), probe >= bound);

        let max = DisabledPolicy::normalize(&DisabledConfig {
            max: Some(iso.as_str().into()),
            ..Default::default()
        });
        prop_assert_eq!(max.is_disabled(probe), probe > bound);
    }
}
