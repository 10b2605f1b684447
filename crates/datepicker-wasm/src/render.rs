//! HTML for the calendar panel, styled with Bootstrap 5 utility classes.
//!
//! Pure string building, so it is tested natively. Every interactive
//! element carries a `data-action` attribute; day buttons also carry
//! `data-date` as an ISO date. The DOM host listens once on the panel root
//! and maps those attributes back through [`parse_action`].

use std::fmt::Write;

use datepicker_core::format::{parse_iso, to_iso};
use datepicker_core::selection::CellClass;
use datepicker_core::view::{CellView, MonthView, PanelView};
use datepicker_core::widget::PanelAction;
use serde::Deserialize;

// ── Theme ───────────────────────────────────────────────────────────────────

/// Icon class names for the header buttons (Bootstrap Icons by default).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Icons {
    pub prev_year: String,
    pub prev: String,
    pub today: String,
    pub next: String,
    pub next_year: String,
    pub clear: String,
}

impl Default for Icons {
    fn default() -> Self {
        Icons {
            prev_year: "bi bi-chevron-double-left".to_string(),
            prev: "bi bi-chevron-left".to_string(),
            today: "bi bi-record-circle".to_string(),
            next: "bi bi-chevron-right".to_string(),
            next_year: "bi bi-chevron-double-right".to_string(),
            clear: "bi bi-x-lg".to_string(),
        }
    }
}

/// Classes for the generated display element in container mode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayClasses {
    pub display: String,
    pub display_text: String,
    pub display_icon: String,
}

impl Default for DisplayClasses {
    fn default() -> Self {
        DisplayClasses {
            display: "form-control d-flex align-items-center justify-content-between".to_string(),
            display_text: String::new(),
            display_icon: "bi bi-calendar-event".to_string(),
        }
    }
}

/// Presentation options read from the same JS object as the picker options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Theme {
    pub icons: Icons,
    pub classes: DisplayClasses,
    /// Stacking order of the dropdown panel.
    pub z_index: i32,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            icons: Icons::default(),
            classes: DisplayClasses::default(),
            z_index: 1080,
        }
    }
}

// ── Actions ─────────────────────────────────────────────────────────────────

/// Map a clicked element's `data-action` (and `data-date`) to an action.
///
/// Returns `None` for unknown actions and for picks without a valid date.
pub fn parse_action(action: &str, date: Option<&str>) -> Option<PanelAction> {
    match action {
        "prev" => Some(PanelAction::PrevMonth),
        "next" => Some(PanelAction::NextMonth),
        "prevYear" => Some(PanelAction::PrevYear),
        "nextYear" => Some(PanelAction::NextYear),
        "today" => Some(PanelAction::Today),
        "clear" => Some(PanelAction::Clear),
        "pick" => date.and_then(parse_iso).map(PanelAction::Pick),
        _ => None,
    }
}

// ── Markup ──────────────────────────────────────────────────────────────────

/// Escape text for use in element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the whole panel: navigation header, optional inline output line,
/// and the month blocks two per row.
pub fn panel_html(view: &PanelView, icons: &Icons) -> String {
    let mut html = String::new();
    let panel_cls = if view.inline {
        "bg-transparent p-2"
    } else {
        "bg-body border rounded-3 shadow p-2"
    };
    let _ = write!(html, r#"<div class="{panel_cls}">"#);

    let _ = write!(
        html,
        r#"<div class="d-flex align-items-center justify-content-between gap-2 pb-2{}">"#,
        if view.inline { "" } else { " border-bottom" }
    );
    html.push_str(r#"<div class="d-flex align-items-center gap-1">"#);
    nav_button(&mut html, "prevYear", "Previous year", &icons.prev_year);
    nav_button(&mut html, "prev", "Previous month", &icons.prev);
    html.push_str("</div>");
    let _ = write!(
        html,
        r#"<div class="text-center flex-grow-1"><div class="small fw-semibold text-capitalize">{}</div></div>"#,
        escape(&view.title)
    );
    html.push_str(r#"<div class="d-flex align-items-center gap-1">"#);
    nav_button(&mut html, "next", "Next month", &icons.next);
    nav_button(&mut html, "nextYear", "Next year", &icons.next_year);
    nav_button(&mut html, "today", "Today", &icons.today);
    nav_button(&mut html, "clear", "Clear", &icons.clear);
    html.push_str("</div></div>");

    html.push_str(r#"<div class="pt-2">"#);
    if let Some(line) = &view.inline_output {
        let _ = write!(
            html,
            r#"<div class="mb-2 small text-center dp-inline-output{}">{}</div>"#,
            if line.is_placeholder { " text-muted" } else { "" },
            escape(&line.text)
        );
    }
    html.push_str(r#"<div class="row g-2">"#);
    let count = view.months.len();
    for (i, month) in view.months.iter().enumerate() {
        html.push_str(r#"<div class="col-auto">"#);
        month_html(&mut html, month);
        html.push_str("</div>");
        if i % 2 == 1 && i + 1 < count {
            html.push_str(r#"<div class="w-100"></div>"#);
        }
    }
    html.push_str("</div></div></div>");
    html
}

fn nav_button(html: &mut String, action: &str, label: &str, icon: &str) {
    let _ = write!(
        html,
        r#"<button type="button" class="btn btn-sm border-0 p-1" data-action="{action}" title="{label}" aria-label="{label}"><i class="{}"></i></button>"#,
        escape(icon)
    );
}

fn month_html(html: &mut String, month: &MonthView) {
    html.push_str(r#"<div class="mb-2">"#);
    let _ = write!(
        html,
        r#"<div class="fw-semibold text-capitalize text-center mb-0">{}</div>"#,
        escape(&month.title)
    );
    html.push_str(r#"<div class="table-responsive">"#);
    html.push_str(r#"<table class="table table-sm table-borderless mb-0 text-center align-middle user-select-none w-auto">"#);
    html.push_str("<thead><tr>");
    for name in &month.weekdays {
        let _ = write!(html, r#"<th class="text-muted small">{}</th>"#, escape(name));
    }
    html.push_str("</tr></thead><tbody>");
    for row in &month.rows {
        html.push_str("<tr>");
        for cell in row {
            cell_html(html, cell);
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table></div></div>");
}

/// Button classes for one day cell.
pub fn cell_classes(class: CellClass) -> String {
    let mut cls = String::from("btn btn-sm w-100 border-0 rounded-0");
    if class.intersects(CellClass::START | CellClass::END | CellClass::IN_RANGE) {
        cls.push_str(" bg-primary-subtle text-primary-emphasis");
    }
    if class.intersects(CellClass::START | CellClass::END) {
        cls.push_str(" border border-primary fw-semibold");
    }
    if class.contains(CellClass::SELECTED) {
        cls.push_str(" btn-outline-primary text-primary-emphasis fw-semibold border");
    }
    if class.contains(CellClass::OUTSIDE_MONTH) {
        cls.push_str(" text-muted");
    }
    if class.contains(CellClass::TODAY) && !class.is_selected_any() {
        cls.push_str(" text-primary fw-semibold");
    }
    if class.contains(CellClass::DISABLED) {
        cls.push_str(" disabled");
    }
    cls
}

fn cell_html(html: &mut String, cell: &CellView) {
    let attrs = if cell.is_disabled() {
        r#" disabled aria-disabled="true""#
    } else {
        r#" data-action="pick""#
    };
    let _ = write!(
        html,
        r#"<td class="p-0"><button type="button" class="{}"{attrs} data-date="{}">{}</button></td>"#,
        cell_classes(cell.class),
        to_iso(cell.date),
        cell.day()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use datepicker_core::disabled::DisabledConfig;
    use datepicker_core::host::{ManualClock, RecordingHost};
    use datepicker_core::options::PickerOptions;
    use datepicker_core::widget::{Binding, DatePicker, SelectionInput};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn panel(options: PickerOptions, selection: SelectionInput) -> PanelView {
        let mut picker = DatePicker::with_clock(
            PickerOptions {
                locale: "en-US".to_string(),
                ..options
            },
            Binding::DirectField,
            RecordingHost::new(),
            ManualClock::new(d(15)),
        );
        picker.set_selection(selection).unwrap();
        picker.panel()
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape("März"), "März");
    }

    #[test]
    fn test_parse_action() {
        assert_eq!(parse_action("prev", None), Some(PanelAction::PrevMonth));
        assert_eq!(parse_action("nextYear", None), Some(PanelAction::NextYear));
        assert_eq!(parse_action("clear", None), Some(PanelAction::Clear));
        assert_eq!(
            parse_action("pick", Some("2024-03-05")),
            Some(PanelAction::Pick(d(5)))
        );
        assert_eq!(parse_action("pick", None), None);
        assert_eq!(parse_action("pick", Some("1709596800000")), None);
        assert_eq!(parse_action("explode", None), None);
    }

    #[test]
    fn test_panel_header_and_nav() {
        let html = panel_html(
            &panel(PickerOptions::default(), SelectionInput::Clear),
            &Icons::default(),
        );
        assert!(html.starts_with(r#"<div class="bg-body border rounded-3 shadow p-2">"#));
        for action in ["prevYear", "prev", "next", "nextYear", "today", "clear"] {
            assert!(html.contains(&format!(r#"data-action="{action}""#)), "{action}");
        }
        assert!(html.contains(r#"<i class="bi bi-chevron-double-left"></i>"#));
        assert!(html.contains(">March 2024</div>"));
        assert_eq!(html.matches("<tr>").count(), 1 + 5);
        assert!(!html.contains("dp-inline-output"));
    }

    #[test]
    fn test_day_buttons() {
        let html = panel_html(
            &panel(
                PickerOptions {
                    disabled: Some(DisabledConfig {
                        dates: vec!["2024-03-07".into()],
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                SelectionInput::Single(d(5)),
            ),
            &Icons::default(),
        );
        assert!(html.contains(r#"data-action="pick" data-date="2024-03-05">5</button>"#));
        assert!(html.contains(r#" disabled aria-disabled="true" data-date="2024-03-07">7</button>"#));
        assert!(html.contains("btn-outline-primary"));
    }

    #[test]
    fn test_inline_output_and_month_break() {
        let html = panel_html(
            &panel(
                PickerOptions {
                    inline: true,
                    months: 3,
                    placeholder: "<none>".to_string(),
                    ..Default::default()
                },
                SelectionInput::Clear,
            ),
            &Icons::default(),
        );
        assert!(html.starts_with(r#"<div class="bg-transparent p-2">"#));
        assert!(html.contains(r#"dp-inline-output text-muted">&lt;none&gt;</div>"#));
        assert_eq!(html.matches(r#"<div class="w-100"></div>"#).count(), 1);
        assert_eq!(html.matches(r#"<div class="col-auto">"#).count(), 3);
        assert!(html.contains("March 2024 … May 2024"));
    }

    #[test]
    fn test_cell_classes() {
        let edge = cell_classes(CellClass::START | CellClass::TODAY);
        assert!(edge.contains("bg-primary-subtle"));
        assert!(edge.contains("border-primary"));
        assert!(!edge.contains("text-primary fw-semibold"));

        let between = cell_classes(CellClass::IN_RANGE);
        assert!(between.contains("bg-primary-subtle"));
        assert!(!between.contains("border-primary"));

        let today = cell_classes(CellClass::TODAY | CellClass::OUTSIDE_MONTH);
        assert!(today.ends_with("text-muted text-primary fw-semibold"));

        assert!(cell_classes(CellClass::DISABLED).ends_with(" disabled"));
    }

    #[test]
    fn test_theme_defaults() {
        let theme = Theme::default();
        assert_eq!(theme.z_index, 1080);
        assert_eq!(theme.classes.display_icon, "bi bi-calendar-event");
        assert_eq!(theme.icons.clear, "bi bi-x-lg");
    }
}
