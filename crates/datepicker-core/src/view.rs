//! Render-ready description of the calendar panel.
//!
//! The controller builds a [`PanelView`] after every change; a [`Host`]
//! turns it into markup, terminal text, or anything else. No styling
//! decisions are made here beyond the [`CellClass`] flags.
//!
//! [`Host`]: crate::host::Host

use chrono::{Datelike, NaiveDate};

use crate::calendar::{
    add_months, build_month_grid, visible_row_count, weekday_order, WeekStart, GRID_COLUMNS,
};
use crate::locale::DateLocale;
use crate::selection::{classify_cell, CellClass, CellContext};

/// The whole panel: header plus one block per month.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    /// Header title, `"March 2024"` or `"March 2024 … April 2024"`.
    pub title: String,
    pub inline: bool,
    /// Current selection text shown inside an inline panel.
    pub inline_output: Option<OutputLine>,
    pub months: Vec<MonthView>,
}

/// A line of selection text, or the placeholder when nothing is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub text: String,
    pub is_placeholder: bool,
}

impl OutputLine {
    pub fn new(text: String, placeholder: &str) -> Self {
        if text.is_empty() {
            OutputLine {
                text: placeholder.to_string(),
                is_placeholder: true,
            }
        } else {
            OutputLine {
                text,
                is_placeholder: false,
            }
        }
    }
}

/// One month block.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthView {
    /// First day of the month.
    pub anchor: NaiveDate,
    pub title: String,
    /// Abbreviated weekday names in column order.
    pub weekdays: Vec<String>,
    /// Only the rows the month needs (4–6), seven cells each.
    pub rows: Vec<Vec<CellView>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView {
    pub date: NaiveDate,
    pub class: CellClass,
}

impl CellView {
    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn is_disabled(&self) -> bool {
        self.class.contains(CellClass::DISABLED)
    }
}

/// Inputs for building a panel.
pub(crate) struct PanelInputs<'a> {
    pub view: NaiveDate,
    pub months: usize,
    pub week_start: WeekStart,
    pub locale: DateLocale,
    pub inline_output: Option<OutputLine>,
    pub cells: CellContext<'a>,
}

pub(crate) fn build_panel(inputs: &PanelInputs<'_>) -> PanelView {
    let months: Vec<MonthView> = (0..inputs.months)
        .map(|i| build_month(inputs, add_months(inputs.view, i as i32)))
        .collect();

    let mut title = inputs.locale.month_year_title(inputs.view);
    if inputs.months > 1 {
        let last = add_months(inputs.view, inputs.months as i32 - 1);
        title.push_str(" … ");
        title.push_str(&inputs.locale.month_year_title(last));
    }

    PanelView {
        title,
        inline: inputs.inline_output.is_some(),
        inline_output: inputs.inline_output.clone(),
        months,
    }
}

fn build_month(inputs: &PanelInputs<'_>, anchor: NaiveDate) -> MonthView {
    let (year, month) = (anchor.year(), anchor.month() as i32);
    let grid = build_month_grid(year, month, inputs.week_start);
    let visible = visible_row_count(year, month, inputs.week_start) * GRID_COLUMNS;

    let rows = grid[..visible]
        .chunks(GRID_COLUMNS)
        .map(|row| {
            row.iter()
                .map(|cell| CellView {
                    date: cell.date,
                    class: classify_cell(cell.date, cell.in_current_month, &inputs.cells),
                })
                .collect()
        })
        .collect();

    MonthView {
        anchor,
        title: inputs.locale.month_year_title(anchor),
        weekdays: weekday_order(inputs.week_start)
            .iter()
            .map(|wd| inputs.locale.weekday_short(*wd))
            .collect(),
        rows,
    }
}
