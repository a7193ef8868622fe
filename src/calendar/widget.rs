use super::grid::{DayCell, RemainingByDate, DAYS_IN_WEEK, GRID_DAYS};
use super::view::CalendarView;
use crate::canvas::BufferCanvas;
use crate::theme::{
    BASE_STYLE, ERROR_STYLE, OUT_OF_MONTH_STYLE, REMAINING_STYLE, SELECTED_STYLE, TITLE_STYLE,
    TODAY_STYLE, WEEKDAY_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Flex, Layout, Rect},
    style::Style,
    widgets::{Paragraph, StatefulWidget, Widget},
};

/// Number of columns per day of week
const DAY_WIDTH: u16 = 6;

/// Width of the calendar in columns
const MAIN_WIDTH: u16 = DAY_WIDTH * 7;

/// Number of lines taken up by the title, the weekday labels, and their rule
const HEADER_LINES: u16 = 3;

/// Number of lines taken up by each week: the day numbers and, beneath them,
/// the remaining to-do counts
const WEEK_LINES: u16 = 2;

/// Total number of lines needed to draw a month
pub(crate) const MAIN_HEIGHT: u16 = HEADER_LINES + WEEK_LINES * 6;

const ACS_HLINE: char = '─';

/// Where the day cells of the last rendered month ended up on screen
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct CalendarLayout {
    area: Rect,
}

impl CalendarLayout {
    fn new(area: Rect) -> Self {
        CalendarLayout { area }
    }

    /// Returns the grid index of the day cell covering (`column`, `row`)
    pub(crate) fn cell_at(&self, column: u16, row: u16) -> Option<usize> {
        let x = column.checked_sub(self.area.x)?;
        let y = row
            .checked_sub(self.area.y)?
            .checked_sub(HEADER_LINES)?;
        if x >= self.area.width.min(MAIN_WIDTH) || y >= self.area.height.saturating_sub(HEADER_LINES)
        {
            return None;
        }
        let index = usize::from(y / WEEK_LINES) * DAYS_IN_WEEK + usize::from(x / DAY_WIDTH);
        (index < GRID_DAYS).then_some(index)
    }
}

/// Month view of the study plan: one cell per day, with the number of
/// unfinished to-dos under each day that has any
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MonthCalendar<'a> {
    remaining: &'a RemainingByDate,
    revision: u64,
}

impl<'a> MonthCalendar<'a> {
    pub(crate) fn new(remaining: &'a RemainingByDate, revision: u64) -> Self {
        MonthCalendar {
            remaining,
            revision,
        }
    }
}

impl StatefulWidget for MonthCalendar<'_> {
    type State = CalendarView;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let [area] = Layout::horizontal([MAIN_WIDTH])
            .flex(Flex::Center)
            .areas(area);
        state.layout = Some(CalendarLayout::new(area));
        let labels = *state.labels();
        let grid = match state.grid(self.remaining, self.revision) {
            Ok(grid) => grid,
            Err(e) => {
                Paragraph::new(e.to_string())
                    .style(ERROR_STYLE)
                    .render(area, buf);
                return;
            }
        };
        let mut canvas = BufferCanvas::new(area, buf);
        canvas.mvprint_centered(
            0,
            0,
            MAIN_WIDTH,
            format!("< {} {} >", grid.month(), grid.year()),
            Some(TITLE_STYLE),
        );
        for (x, label) in std::iter::zip((0..).step_by(DAY_WIDTH.into()), labels) {
            canvas.mvprint_centered(1, x, DAY_WIDTH, label, Some(WEEKDAY_STYLE));
        }
        canvas.hline(2, 0, ACS_HLINE, MAIN_WIDTH, BASE_STYLE);
        for (week_no, week) in std::iter::zip(0u16.., grid.weeks()) {
            let y = HEADER_LINES + week_no * WEEK_LINES;
            for (col, cell) in std::iter::zip(0u16.., week) {
                draw_day(&mut canvas, y, col * DAY_WIDTH, cell);
            }
        }
    }
}

fn draw_day(canvas: &mut BufferCanvas<'_>, y: u16, x: u16, cell: &DayCell) {
    let day = cell.date.day();
    let s = if cell.is_today {
        format!("[{day:2}]")
    } else {
        format!(" {day:2} ")
    };
    canvas.mvprint(y, x + 1, s, Some(day_style(cell)));
    if cell.remaining > 0 {
        canvas.mvprint(
            y + 1,
            x + 1,
            format!("{:^4}", cell.remaining),
            Some(REMAINING_STYLE),
        );
    }
}

fn day_style(cell: &DayCell) -> Style {
    if cell.is_selected {
        SELECTED_STYLE
    } else if cell.is_today {
        TODAY_STYLE
    } else if cell.in_current_month {
        BASE_STYLE
    } else {
        OUT_OF_MONTH_STYLE
    }
}
