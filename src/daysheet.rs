use crate::calendar::date_key;
use crate::plan::Todo;
use crate::theme::sheet::{CURSOR_STYLE, DONE_STYLE, SHEET_STYLE, SUBJECT_STYLE};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span, Text},
    widgets::{Paragraph, Widget},
};
use time::Date;

/// The to-do list shown in the bottom sheet for one day
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct DaySheet<'a> {
    date: Date,
    todos: Vec<&'a Todo>,
    cursor: usize,
}

impl<'a> DaySheet<'a> {
    pub(crate) fn new(date: Date, todos: Vec<&'a Todo>, cursor: usize) -> Self {
        DaySheet {
            date,
            todos,
            cursor,
        }
    }
}

impl Widget for DaySheet<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let remaining = self.todos.iter().filter(|t| !t.done).count();
        let mut lines = vec![
            Line::styled(
                format!("{}  ·  남은 할 일 {remaining}개", date_key(self.date)),
                SHEET_STYLE.add_modifier(Modifier::BOLD),
            ),
            Line::styled("", SHEET_STYLE),
        ];
        if self.todos.is_empty() {
            lines.push(Line::styled(
                "등록된 할 일이 없습니다. 'a'를 눌러 추가하세요.",
                SHEET_STYLE,
            ));
        }
        for (i, todo) in self.todos.iter().enumerate() {
            let check = if todo.done { "[x]" } else { "[ ]" };
            let style = if todo.done { DONE_STYLE } else { SHEET_STYLE };
            let marker = if i == self.cursor {
                Span::styled("▸ ", CURSOR_STYLE)
            } else {
                Span::styled("  ", SHEET_STYLE)
            };
            let mut spans = vec![marker];
            if let Some(subject) = todo.subject {
                spans.push(Span::styled(format!("[{}] ", subject.label()), SUBJECT_STYLE));
            }
            spans.push(Span::styled(format!("{check} {}", todo.name), style));
            spans.push(Span::styled(format!("  {}분", todo.goal_minutes), SHEET_STYLE));
            if !todo.proofs.is_empty() {
                spans.push(Span::styled(format!("  사진 {}장", todo.proofs.len()), SHEET_STYLE));
            }
            lines.push(Line::from(spans));
        }
        Paragraph::new(Text::from(lines))
            .style(SHEET_STYLE)
            .render(area, buf);
    }
}
