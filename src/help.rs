use crate::routes::Route;
use ratatui::{
    buffer::Buffer,
    layout::Flex,
    layout::{Alignment, Layout, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Widget},
};

static CALENDAR_TEXT: &[&str] = &[
    "h, l, LEFT, RIGHT   Previous/next day",
    "k, j, UP, DOWN      Previous/next week",
    "[, ], PAGE UP/DOWN  Previous/next month",
    "t, HOME             Jump to today",
    "ENTER, click        Open the day's to-dos",
    "?                   Show this help",
    "q                   Quit",
];

static SHEET_TEXT: &[&str] = &[
    "k, j, UP, DOWN      Move between to-dos",
    "SPACE               Mark done / not done",
    "a                   Add a to-do",
    "e                   Edit the to-do",
    "p                   Attach proof photos",
    "ESC, click outside  Close the sheet",
    "drag the handle     Pull down to close",
];

static MENTOR_TEXT: &[&str] = &[
    "k, j, UP, DOWN      Select a mentee",
    "a                   Assign a to-do",
    "?                   Show this help",
    "q                   Quit",
];

static LOGIN_TEXT: &[&str] = &["q                   Quit"];

/// Popup listing the keys for the current screen
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Help {
    pub(crate) route: Route,
    pub(crate) style: Style,
}

impl Help {
    fn lines(self) -> Vec<Line<'static>> {
        let sections: &[&[&str]] = match self.route {
            Route::MenteeHome => &[CALENDAR_TEXT, SHEET_TEXT],
            Route::MentorDashboard => &[MENTOR_TEXT],
            Route::Login => &[LOGIN_TEXT],
        };
        let mut lines = Vec::new();
        for (i, section) in sections.iter().enumerate() {
            if i > 0 {
                lines.push(Line::raw(""));
            }
            lines.extend(section.iter().map(|&s| Line::raw(s)));
        }
        lines.push(Line::raw(""));
        lines.push(Line::raw("Press any key to dismiss."));
        lines
    }
}

impl Widget for Help {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = Text::from(self.lines());
        let height = u16::try_from(text.height())
            .unwrap_or(u16::MAX)
            .min(area.height)
            .saturating_add(2);
        let width = u16::try_from(text.width())
            .unwrap_or(u16::MAX)
            .min(area.width)
            .saturating_add(2);
        let para = Paragraph::new(text)
            .block(
                Block::bordered()
                    .title(" Commands ")
                    .title_alignment(Alignment::Center),
            )
            .style(self.style);
        let [help_area] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
        let [help_area] = Layout::vertical([height])
            .flex(Flex::Center)
            .areas(help_area);
        let outer_area = Rect {
            x: help_area.x.saturating_sub(1),
            y: help_area.y,
            width: help_area.width.saturating_add(2),
            height: help_area.height,
        };
        Clear.render(outer_area, buf);
        Block::new().style(self.style).render(outer_area, buf);
        para.render(help_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::BASE_STYLE;

    #[test]
    fn test_mentor_help() {
        let area = Rect::new(0, 0, 50, 10);
        let mut buffer = Buffer::empty(area);
        Help {
            route: Route::MentorDashboard,
            style: BASE_STYLE,
        }
        .render(area, &mut buffer);
        let mut expected = Buffer::with_lines([
            "                                                  ",
            "      ┌──────────── Commands ─────────────┐       ",
            "      │k, j, UP, DOWN      Select a mentee│       ",
            "      │a                   Assign a to-do │       ",
            "      │?                   Show this help │       ",
            "      │q                   Quit           │       ",
            "      │                                   │       ",
            "      │Press any key to dismiss.          │       ",
            "      └───────────────────────────────────┘       ",
            "                                                  ",
        ]);
        expected.set_style(Rect::new(5, 1, 39, 8), BASE_STYLE);
        assert_eq!(buffer, expected);
    }
}
