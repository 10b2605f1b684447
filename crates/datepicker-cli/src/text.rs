//! Plain-text rendering of a [`PanelView`].
//!
//! Each day takes four columns: a left marker, the right-aligned day number,
//! and a right marker.
//!
//! | cell               | text    |
//! |--------------------|---------|
//! | selected / 1-day   | `[ 5]`  |
//! | range start        | `[ 5 `  |
//! | range end          | ` 9]`   |
//! | inside a range     | `- 7-`  |
//! | disabled           | ` 5x`   |
//! | today              | ` 5*`   |
//! | other month        | blank   |

use datepicker_core::selection::CellClass;
use datepicker_core::view::{CellView, MonthView, PanelView};

const CELL_WIDTH: usize = 4;
const ROW_WIDTH: usize = CELL_WIDTH * 7;

pub fn render_panel(panel: &PanelView) -> String {
    let mut out = String::new();
    if panel.months.len() > 1 {
        out.push_str(&panel.title);
        out.push_str("\n\n");
    }
    for (i, month) in panel.months.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_month(month, &mut out);
    }
    if let Some(line) = &panel.inline_output {
        out.push('\n');
        out.push_str(&line.text);
        out.push('\n');
    }
    out
}

fn render_month(month: &MonthView, out: &mut String) {
    out.push_str(format!("{:^ROW_WIDTH$}", month.title).trim_end());
    out.push('\n');

    let header: String = month
        .weekdays
        .iter()
        .map(|name| {
            let short: String = name.chars().take(2).collect();
            format!(" {short:>2} ")
        })
        .collect();
    out.push_str(header.trim_end());
    out.push('\n');

    for row in &month.rows {
        let line: String = row.iter().map(cell_text).collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
}

fn cell_text(cell: &CellView) -> String {
    let class = cell.class;
    if class.contains(CellClass::OUTSIDE_MONTH) {
        return " ".repeat(CELL_WIDTH);
    }
    let left = if class.intersects(CellClass::START | CellClass::SELECTED) {
        '['
    } else if class.contains(CellClass::IN_RANGE) {
        '-'
    } else {
        ' '
    };
    let right = if class.intersects(CellClass::END | CellClass::SELECTED) {
        ']'
    } else if class.contains(CellClass::IN_RANGE) {
        '-'
    } else if class.contains(CellClass::DISABLED) {
        'x'
    } else if class.contains(CellClass::TODAY) {
        '*'
    } else {
        ' '
    };
    format!("{left}{:>2}{right}", cell.day())
}
