//! Pure calendar arithmetic for month grids.
//!
//! Everything here is a deterministic function of its inputs: no clock
//! access, no locale, no I/O. Months are 1-based (January = 1) as in
//! `chrono`, but every function that takes a `(year, month)` pair accepts
//! out-of-range months and rolls them across year boundaries, so callers can
//! step a view month with plain integer arithmetic.
//!
//! # Functions
//!
//! - [`build_month_grid`]: 6×7 grid of [`DayCell`]s for an anchor month
//! - [`add_months`]: first day of the month `n` months away
//! - [`clamp_range`]: order an optional date pair ascending
//! - [`day_difference`]: signed whole-day distance
//! - [`visible_row_count`]: how many grid rows a month actually occupies

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;

/// Number of cells in a month grid (6 rows × 7 columns).
pub const GRID_CELLS: usize = 42;

/// Number of columns (days) per grid row.
pub const GRID_COLUMNS: usize = 7;

// ── Configurable week start ─────────────────────────────────────────────────

/// Which weekday occupies the first column of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WeekStart {
    /// ISO 8601 convention.
    #[default]
    Monday,
    /// US/Canada convention.
    Sunday,
}

impl WeekStart {
    pub fn from_sunday_flag(start_on_sunday: bool) -> Self {
        if start_on_sunday {
            WeekStart::Sunday
        } else {
            WeekStart::Monday
        }
    }

    fn first_weekday(self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }
}

/// How many columns `weekday` sits from the first column.
fn days_from_week_start(weekday: Weekday, week_start: WeekStart) -> u32 {
    match week_start {
        WeekStart::Monday => weekday.num_days_from_monday(),
        WeekStart::Sunday => weekday.num_days_from_sunday(),
    }
}

/// The seven weekdays in column order.
pub fn weekday_order(week_start: WeekStart) -> [Weekday; 7] {
    let mut days = [Weekday::Mon; 7];
    let mut day = week_start.first_weekday();
    for slot in days.iter_mut() {
        *slot = day;
        day = day.succ();
    }
    days
}

// ── Month arithmetic ────────────────────────────────────────────────────────

/// Normalize a possibly out-of-range `(year, month)` pair.
///
/// `(2024, 0)` becomes `(2023, 12)`, `(2024, 13)` becomes `(2025, 1)`.
pub fn normalize_year_month(year: i32, month: i32) -> (i32, u32) {
    year_month_from_index(i64::from(year) * 12 + i64::from(month) - 1)
}

/// Split a zero-based month index (`year * 12 + month0`) into year and
/// 1-based month. Years beyond `i32` saturate.
fn year_month_from_index(idx: i64) -> (i32, u32) {
    let year = idx.div_euclid(12).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
    (year, (idx.rem_euclid(12) + 1) as u32)
}

/// First day of the given month, after rolling the month into range.
///
/// Returns `None` only when the year falls outside chrono's representable range.
pub fn month_start(year: i32, month: i32) -> Option<NaiveDate> {
    let (y, m) = normalize_year_month(year, month);
    NaiveDate::from_ymd_opt(y, m, 1)
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Number of days in a month. Out-of-range months roll over.
pub fn days_in_month(year: i32, month: i32) -> u32 {
    let (y, m) = normalize_year_month(year, month);
    let (ny, nm) = normalize_year_month(y, m as i32 + 1);
    match (
        NaiveDate::from_ymd_opt(y, m, 1),
        NaiveDate::from_ymd_opt(ny, nm, 1),
    ) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        // Only reachable at chrono's year limits; December has 31 days.
        _ => 31,
    }
}

/// The first day of the month `n` months away from `date`'s month.
///
/// The day of month is normalized to 1 before stepping, so the result
/// never overflows (Jan 31 + 1 month is Feb 1, not Mar 2 or Feb 28).
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use datepicker_core::calendar::add_months;
///
/// let d = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
/// assert_eq!(add_months(d, 1), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
/// assert_eq!(add_months(d, -1), NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
/// ```
pub fn add_months(date: NaiveDate, n: i32) -> NaiveDate {
    let idx = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(n);
    let (y, m) = year_month_from_index(idx);
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or_else(|| first_of_month(date))
}

/// Sort an optional date pair ascending.
///
/// If either side is absent the pair is returned unchanged.
pub fn clamp_range(
    a: Option<NaiveDate>,
    b: Option<NaiveDate>,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match (a, b) {
        (Some(x), Some(y)) if y < x => (Some(y), Some(x)),
        _ => (a, b),
    }
}

/// Signed number of whole days from `a` to `b` (`b - a`).
pub fn day_difference(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

// ── Month grid ──────────────────────────────────────────────────────────────

/// One cell of a month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    /// Whether `date` belongs to the anchor month (false for spill-over days).
    pub in_current_month: bool,
}

/// Column index (0..7) of the first day of the month.
fn leading_cells(first: NaiveDate, week_start: WeekStart) -> u32 {
    days_from_week_start(first.weekday(), week_start)
}

/// Build the 42-cell grid for an anchor month.
///
/// The grid opens on the week-start day on or before the 1st, so the row
/// holding the 1st is always the first row. Cells before the 1st come from
/// the previous month and cells after the last day come from the next one.
///
/// # Arguments
///
/// * `year`: Anchor year
/// * `month`: Anchor month, 1-based; `0` is the previous December and
///   `13` the next January
/// * `week_start`: Which weekday fills the first column
///
/// # Examples
///
/// ```
/// use datepicker_core::calendar::{build_month_grid, WeekStart};
///
/// // March 2024 starts on a Friday: four February days lead the grid.
/// let grid = build_month_grid(2024, 3, WeekStart::Monday);
/// assert_eq!(grid.len(), 42);
/// assert_eq!(grid[0].date.to_string(), "2024-02-26");
/// assert!(grid[4].in_current_month);
/// ```
pub fn build_month_grid(year: i32, month: i32, week_start: WeekStart) -> [DayCell; GRID_CELLS] {
    let (y, m) = normalize_year_month(year, month);
    let first = NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(NaiveDate::MIN);
    let lead = leading_cells(first, week_start);
    let origin = first
        .checked_sub_days(Days::new(u64::from(lead)))
        .unwrap_or(first);

    let mut cells = [DayCell {
        date: origin,
        in_current_month: false,
    }; GRID_CELLS];

    let mut date = origin;
    for cell in cells.iter_mut() {
        *cell = DayCell {
            date,
            in_current_month: date.year() == y && date.month() == m,
        };
        date = date.succ_opt().unwrap_or(date);
    }
    cells
}

/// Number of grid rows the month needs to show every one of its days (4–6).
///
/// [`build_month_grid`] always yields six rows; renderers trim the trailing
/// rows that hold only next-month days.
pub fn visible_row_count(year: i32, month: i32, week_start: WeekStart) -> usize {
    let (y, m) = normalize_year_month(year, month);
    let Some(first) = NaiveDate::from_ymd_opt(y, m, 1) else {
        return GRID_CELLS / GRID_COLUMNS;
    };
    let needed = leading_cells(first, week_start) + days_in_month(y, m as i32);
    (needed as usize).div_ceil(GRID_COLUMNS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // ── month arithmetic ────────────────────────────────────────────────

    #[test]
    fn test_normalize_year_month_rolls_both_ways() {
        assert_eq!(normalize_year_month(2024, 0), (2023, 12));
        assert_eq!(normalize_year_month(2024, -1), (2023, 11));
        assert_eq!(normalize_year_month(2024, 13), (2025, 1));
        assert_eq!(normalize_year_month(2024, 25), (2026, 1));
        assert_eq!(normalize_year_month(2024, 6), (2024, 6));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 0), 31); // December 2023
        assert_eq!(days_in_month(2024, 14), 28); // February 2025
    }

    #[test]
    fn test_add_months_normalizes_day() {
        assert_eq!(add_months(d(2024, 1, 31), 1), d(2024, 2, 1));
        assert_eq!(add_months(d(2024, 3, 15), 0), d(2024, 3, 1));
        assert_eq!(add_months(d(2024, 1, 10), -1), d(2023, 12, 1));
        assert_eq!(add_months(d(2024, 12, 10), 1), d(2025, 1, 1));
        assert_eq!(add_months(d(2024, 5, 2), -12), d(2023, 5, 1));
        assert_eq!(add_months(d(2024, 5, 2), 27), d(2026, 8, 1));
    }

    #[test]
    fn test_add_months_extreme_offsets_stay_put() {
        assert_eq!(add_months(d(2024, 3, 15), i32::MAX), d(2024, 3, 1));
        assert_eq!(add_months(d(2024, 3, 15), i32::MIN), d(2024, 3, 1));
        assert_eq!(normalize_year_month(i32::MAX, i32::MAX).0, i32::MAX);
    }

    #[test]
    fn test_clamp_range_orders_pair() {
        let a = Some(d(2024, 3, 10));
        let b = Some(d(2024, 3, 1));
        assert_eq!(clamp_range(a, b), (b, a));
        assert_eq!(clamp_range(b, a), (b, a));
        assert_eq!(clamp_range(a, a), (a, a));
    }

    #[test]
    fn test_clamp_range_leaves_partial_pairs() {
        let a = Some(d(2024, 3, 10));
        assert_eq!(clamp_range(a, None), (a, None));
        assert_eq!(clamp_range(None, a), (None, a));
        assert_eq!(clamp_range(None, None), (None, None));
    }

    #[test]
    fn test_day_difference_signed() {
        assert_eq!(day_difference(d(2024, 3, 1), d(2024, 3, 4)), 3);
        assert_eq!(day_difference(d(2024, 3, 4), d(2024, 3, 1)), -3);
        assert_eq!(day_difference(d(2024, 2, 28), d(2024, 3, 1)), 2);
    }

    // ── week start ──────────────────────────────────────────────────────

    #[test]
    fn test_weekday_order() {
        assert_eq!(weekday_order(WeekStart::Monday)[0], Weekday::Mon);
        assert_eq!(weekday_order(WeekStart::Monday)[6], Weekday::Sun);
        assert_eq!(weekday_order(WeekStart::Sunday)[0], Weekday::Sun);
        assert_eq!(weekday_order(WeekStart::Sunday)[6], Weekday::Sat);
    }

    // ── grid ────────────────────────────────────────────────────────────

    #[test]
    fn test_grid_march_2024_monday_start() {
        // 2024-03-01 is a Friday → 4 leading February days.
        let grid = build_month_grid(2024, 3, WeekStart::Monday);
        assert_eq!(grid[0].date, d(2024, 2, 26));
        assert!(!grid[3].in_current_month);
        assert_eq!(grid[4].date, d(2024, 3, 1));
        assert!(grid[4].in_current_month);
        assert_eq!(grid[34].date, d(2024, 3, 31));
        assert!(grid[34].in_current_month);
        assert_eq!(grid[35].date, d(2024, 4, 1));
        assert!(!grid[35].in_current_month);
        assert_eq!(grid[41].date, d(2024, 4, 7));
    }

    #[test]
    fn test_grid_march_2024_sunday_start() {
        let grid = build_month_grid(2024, 3, WeekStart::Sunday);
        assert_eq!(grid[0].date, d(2024, 2, 25));
        assert_eq!(grid[5].date, d(2024, 3, 1));
        assert!(grid[5].in_current_month);
    }

    #[test]
    fn test_grid_month_starting_on_week_start_has_no_lead() {
        // 2024-04-01 is a Monday.
        let grid = build_month_grid(2024, 4, WeekStart::Monday);
        assert_eq!(grid[0].date, d(2024, 4, 1));
        assert!(grid[0].in_current_month);
        // 2024-09-01 is a Sunday.
        let grid = build_month_grid(2024, 9, WeekStart::Sunday);
        assert_eq!(grid[0].date, d(2024, 9, 1));
    }

    #[test]
    fn test_grid_rolls_month_across_year() {
        let dec = build_month_grid(2024, 0, WeekStart::Monday);
        assert!(dec
            .iter()
            .any(|c| c.in_current_month && c.date == d(2023, 12, 31)));
        let jan = build_month_grid(2024, 13, WeekStart::Monday);
        assert!(jan
            .iter()
            .any(|c| c.in_current_month && c.date == d(2025, 1, 1)));
        // January 2025 leads with December 2024 days (Jan 1 is a Wednesday).
        assert_eq!(jan[0].date, d(2024, 12, 30));
    }

    #[test]
    fn test_grid_cells_are_consecutive() {
        let grid = build_month_grid(2023, 2, WeekStart::Sunday);
        for pair in grid.windows(2) {
            assert_eq!(day_difference(pair[0].date, pair[1].date), 1);
        }
    }

    #[test]
    fn test_visible_row_count() {
        // February 2021 starts on Monday and has 28 days → exactly 4 rows.
        assert_eq!(visible_row_count(2021, 2, WeekStart::Monday), 4);
        // March 2024 (Friday start, 31 days) → 5 rows with Monday start.
        assert_eq!(visible_row_count(2024, 3, WeekStart::Monday), 5);
        // September 2024 starts on Sunday, 30 days → 6 rows with Monday start...
        assert_eq!(visible_row_count(2024, 9, WeekStart::Monday), 6);
        // ...but only 5 with Sunday start.
        assert_eq!(visible_row_count(2024, 9, WeekStart::Sunday), 5);
    }
}
