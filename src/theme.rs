use ratatui::style::{Color, Modifier, Style};

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

const PRIMARY: Color = Color::LightBlue;

pub(crate) const TITLE_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEKDAY_STYLE: Style = BASE_STYLE.fg(Color::Gray);

pub(crate) const OUT_OF_MONTH_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

pub(crate) const TODAY_STYLE: Style = BASE_STYLE.fg(PRIMARY).add_modifier(Modifier::BOLD);

pub(crate) const SELECTED_STYLE: Style = Style::new()
    .fg(Color::White)
    .bg(PRIMARY)
    .add_modifier(Modifier::BOLD);

pub(crate) const REMAINING_STYLE: Style = BASE_STYLE.fg(PRIMARY).add_modifier(Modifier::BOLD);

pub(crate) const ERROR_STYLE: Style = BASE_STYLE.fg(Color::LightRed);

pub(crate) mod sheet {
    use super::*;

    pub(crate) const OVERLAY_STYLE: Style = Style::new().fg(Color::DarkGray).bg(Color::Black);

    pub(crate) const SHEET_STYLE: Style = Style::new().fg(Color::White).bg(Color::DarkGray);

    pub(crate) const HANDLE_STYLE: Style = SHEET_STYLE.fg(Color::Gray);

    pub(crate) const HANDLE_GRABBED_STYLE: Style =
        SHEET_STYLE.fg(Color::White).add_modifier(Modifier::BOLD);

    pub(crate) const DONE_STYLE: Style = SHEET_STYLE
        .fg(Color::Gray)
        .add_modifier(Modifier::CROSSED_OUT);

    pub(crate) const CURSOR_STYLE: Style = SHEET_STYLE.add_modifier(Modifier::REVERSED);

    pub(crate) const SUBJECT_STYLE: Style = SHEET_STYLE.fg(Color::LightCyan);
}

pub(crate) mod form {
    use super::*;

    pub(crate) const PLACEHOLDER_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub(crate) const FOCUSED_FIELD_STYLE: Style = BASE_STYLE.add_modifier(Modifier::UNDERLINED);

    pub(crate) const READY_SUBMIT_STYLE: Style = Style::new()
        .fg(Color::White)
        .bg(PRIMARY)
        .add_modifier(Modifier::BOLD);

    pub(crate) const DISABLED_SUBMIT_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);
}

pub(crate) mod mentor {
    use super::*;

    pub(crate) const HEADER_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

    pub(crate) const ROW_HIGHLIGHT_STYLE: Style = BASE_STYLE.add_modifier(Modifier::REVERSED);

    pub(crate) const SUBMITTED_STYLE: Style = BASE_STYLE.fg(Color::LightGreen);

    pub(crate) const NOT_SUBMITTED_STYLE: Style = BASE_STYLE.fg(Color::LightRed);

    pub(crate) const CHIP_STYLE: Style = Style::new().fg(Color::Black).bg(Color::Gray);
}
