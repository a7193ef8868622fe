use crate::plan::Todo;
use crate::theme::{
    form::{DISABLED_SUBMIT_STYLE, FOCUSED_FIELD_STYLE, PLACEHOLDER_STYLE, READY_SUBMIT_STYLE},
    BASE_STYLE, WEEKDAY_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Clear, StatefulWidget, Widget},
};

/// Longest allowed to-do name, in characters
pub(crate) const MAX_NAME_LENGTH: usize = 50;

/// Longest allowed goal, in digits
const MAX_MINUTES_DIGITS: usize = 4;

const OUTER_WIDTH: u16 = 44;
const OUTER_HEIGHT: u16 = 12;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct TodoForm;

impl StatefulWidget for TodoForm {
    type State = TodoFormState;

    /*
     * ............................................
     * .┌──────────── 할 일 등록하기 ────────────┐.
     * .│                                        │.
     * .│ 할 일 이름                        0/50 │.
     * .│ 예: 영어 단어 암기                     │.
     * .│                                        │.
     * .│ 목표 시간 (분)                         │.
     * .│ 30                                     │.
     * .│                                        │.
     * .│               [ 등록하기 ]             │.
     * .└────────────────────────────────────────┘.
     * ............................................
     */
    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let [outer_area] = Layout::horizontal([OUTER_WIDTH])
            .flex(Flex::Center)
            .areas(area);
        let [outer_area] = Layout::vertical([OUTER_HEIGHT])
            .flex(Flex::Center)
            .areas(outer_area);
        Clear.render(outer_area, buf);
        Block::new().style(BASE_STYLE).render(outer_area, buf);
        let block_area = outer_area.inner(Margin::new(1, 1));
        Block::bordered()
            .title(format!(" {} ", state.mode().title()))
            .title_alignment(Alignment::Center)
            .render(block_area, buf);
        let text_area = block_area.inner(Margin::new(2, 1));
        state.to_text(text_area.width).render(text_area, buf);
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum FormMode {
    Create,
    Edit,
}

impl FormMode {
    pub(crate) fn title(self) -> &'static str {
        match self {
            FormMode::Create => "할 일 등록하기",
            FormMode::Edit => "할 일 수정하기",
        }
    }

    pub(crate) fn submit_label(self) -> &'static str {
        match self {
            FormMode::Create => "등록하기",
            FormMode::Edit => "수정하기",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Field {
    #[default]
    Name,
    Minutes,
}

/// What a valid form submits
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct TodoDraft {
    pub(crate) name: String,
    pub(crate) goal_minutes: u32,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct TodoFormState {
    mode: FormMode,
    name: String,
    minutes: String,
    focus: Field,
}

impl TodoFormState {
    pub(crate) fn create() -> TodoFormState {
        TodoFormState {
            mode: FormMode::Create,
            name: String::new(),
            minutes: String::new(),
            focus: Field::Name,
        }
    }

    pub(crate) fn edit(todo: &Todo) -> TodoFormState {
        TodoFormState {
            mode: FormMode::Edit,
            name: todo.name.chars().take(MAX_NAME_LENGTH).collect(),
            minutes: todo.goal_minutes.to_string(),
            focus: Field::Name,
        }
    }

    pub(crate) fn mode(&self) -> FormMode {
        self.mode
    }

    /// Returns the draft the form would submit, if it is complete
    pub(crate) fn draft(&self) -> Option<TodoDraft> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        let goal_minutes = parse_minutes(&self.minutes)?;
        Some(TodoDraft {
            name: String::from(name),
            goal_minutes,
        })
    }

    fn to_text(&self, width: u16) -> Text<'static> {
        let count = format!("{}/{MAX_NAME_LENGTH}", self.name.chars().count());
        let label = "할 일 이름";
        let gap = usize::from(width)
            .saturating_sub(Line::raw(label).width())
            .saturating_sub(count.len());
        let submit_style = if self.draft().is_some() {
            READY_SUBMIT_STYLE
        } else {
            DISABLED_SUBMIT_STYLE
        };
        Text::from_iter([
            Line::styled("", BASE_STYLE),
            Line::from_iter([
                Span::styled(label, WEEKDAY_STYLE),
                Span::raw(" ".repeat(gap)),
                Span::styled(count, WEEKDAY_STYLE),
            ]),
            self.field_line(Field::Name, "예: 영어 단어 암기"),
            Line::styled("", BASE_STYLE),
            Line::styled("목표 시간 (분)", WEEKDAY_STYLE),
            self.field_line(Field::Minutes, "30"),
            Line::styled("", BASE_STYLE),
            // Style a span and convert it to a line so that only the button
            // text and not its centering padding is highlighted
            Line::from(Span::styled(
                format!("[ {} ]", self.mode.submit_label()),
                submit_style,
            ))
            .centered(),
        ])
    }

    fn field_line(&self, field: Field, placeholder: &'static str) -> Line<'static> {
        let value = match field {
            Field::Name => &self.name,
            Field::Minutes => &self.minutes,
        };
        Line::from(input_span(value, placeholder, self.focus == field))
    }

    pub(crate) fn handle_input(&mut self, input: TodoFormInput) -> TodoFormOutput {
        match (input, self.focus) {
            (TodoFormInput::Char(c), Field::Name) => push_name_char(&mut self.name, c).into(),
            (TodoFormInput::Char(c), Field::Minutes) => {
                push_minutes_digit(&mut self.minutes, c).into()
            }
            (TodoFormInput::Backspace, Field::Name) => match self.name.pop() {
                Some(_) => TodoFormOutput::Ok,
                None => TodoFormOutput::Invalid,
            },
            (TodoFormInput::Backspace, Field::Minutes) => match self.minutes.pop() {
                Some(_) => TodoFormOutput::Ok,
                None => TodoFormOutput::Invalid,
            },
            (TodoFormInput::Tab, Field::Name) => {
                self.focus = Field::Minutes;
                TodoFormOutput::Ok
            }
            (TodoFormInput::Tab, Field::Minutes) => {
                self.focus = Field::Name;
                TodoFormOutput::Ok
            }
            (TodoFormInput::Enter, _) => {
                let Some(draft) = self.draft() else {
                    return TodoFormOutput::Invalid;
                };
                if self.mode == FormMode::Create {
                    self.name.clear();
                    self.minutes.clear();
                    self.focus = Field::Name;
                }
                TodoFormOutput::Submit(draft)
            }
        }
    }
}

/// Draws a text field's value, or its placeholder when empty
pub(crate) fn input_span(value: &str, placeholder: &'static str, focused: bool) -> Span<'static> {
    if value.is_empty() {
        let style = if focused {
            PLACEHOLDER_STYLE.patch(FOCUSED_FIELD_STYLE)
        } else {
            PLACEHOLDER_STYLE
        };
        Span::styled(placeholder, style)
    } else {
        let style = if focused {
            FOCUSED_FIELD_STYLE
        } else {
            BASE_STYLE
        };
        Span::styled(value.to_owned(), style)
    }
}

/// Appends `c` to a to-do name.  Returns `false` for control characters and
/// when the name is already `MAX_NAME_LENGTH` characters long.
pub(crate) fn push_name_char(name: &mut String, c: char) -> bool {
    if c.is_control() || name.chars().count() >= MAX_NAME_LENGTH {
        return false;
    }
    name.push(c);
    true
}

/// Appends a digit to a goal-minutes field.  Leading zeros are refused.
pub(crate) fn push_minutes_digit(minutes: &mut String, c: char) -> bool {
    if !c.is_ascii_digit()
        || minutes.len() >= MAX_MINUTES_DIGITS
        || (c == '0' && minutes.is_empty())
    {
        return false;
    }
    minutes.push(c);
    true
}

/// A goal in minutes, if the field holds a positive number
pub(crate) fn parse_minutes(minutes: &str) -> Option<u32> {
    minutes.trim().parse::<u32>().ok().filter(|&m| m > 0)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum TodoFormInput {
    Char(char),
    Backspace,
    Tab,
    Enter,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum TodoFormOutput {
    Ok,
    Invalid,
    Submit(TodoDraft),
}

impl From<bool> for TodoFormOutput {
    fn from(accepted: bool) -> TodoFormOutput {
        if accepted {
            TodoFormOutput::Ok
        } else {
            TodoFormOutput::Invalid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn type_str(state: &mut TodoFormState, s: &str) {
        for c in s.chars() {
            assert_eq!(state.handle_input(TodoFormInput::Char(c)), TodoFormOutput::Ok);
        }
    }

    #[test]
    fn test_create_flow() {
        let mut state = TodoFormState::create();
        assert_eq!(state.mode().title(), "할 일 등록하기");
        assert_eq!(
            state.handle_input(TodoFormInput::Enter),
            TodoFormOutput::Invalid
        );
        type_str(&mut state, "영어 단어 암기");
        assert_eq!(
            state.handle_input(TodoFormInput::Enter),
            TodoFormOutput::Invalid
        );
        assert_eq!(state.handle_input(TodoFormInput::Tab), TodoFormOutput::Ok);
        assert_eq!(
            state.handle_input(TodoFormInput::Char('x')),
            TodoFormOutput::Invalid
        );
        assert_eq!(
            state.handle_input(TodoFormInput::Char('0')),
            TodoFormOutput::Invalid
        );
        type_str(&mut state, "30");
        assert_eq!(
            state.handle_input(TodoFormInput::Enter),
            TodoFormOutput::Submit(TodoDraft {
                name: String::from("영어 단어 암기"),
                goal_minutes: 30,
            })
        );
        // Creating clears the form for the next entry
        assert_eq!(state, TodoFormState::create());
    }

    #[test]
    fn test_blank_name_is_invalid() {
        let mut state = TodoFormState::create();
        type_str(&mut state, "   ");
        state.handle_input(TodoFormInput::Tab);
        type_str(&mut state, "5");
        assert_eq!(state.draft(), None);
        state.handle_input(TodoFormInput::Tab);
        type_str(&mut state, "a ");
        assert_eq!(
            state.draft(),
            Some(TodoDraft {
                name: String::from("a"),
                goal_minutes: 5,
            })
        );
    }

    #[test]
    fn test_name_length_limit() {
        let mut state = TodoFormState::create();
        type_str(&mut state, &"가".repeat(MAX_NAME_LENGTH));
        assert_eq!(
            state.handle_input(TodoFormInput::Char('나')),
            TodoFormOutput::Invalid
        );
        assert_eq!(
            state.handle_input(TodoFormInput::Backspace),
            TodoFormOutput::Ok
        );
        assert_eq!(
            state.handle_input(TodoFormInput::Char('나')),
            TodoFormOutput::Ok
        );
    }

    #[test]
    fn test_minutes_digit_limit() {
        let mut state = TodoFormState::create();
        state.handle_input(TodoFormInput::Tab);
        type_str(&mut state, "9999");
        assert_eq!(
            state.handle_input(TodoFormInput::Char('9')),
            TodoFormOutput::Invalid
        );
        for _ in 0..4 {
            assert_eq!(
                state.handle_input(TodoFormInput::Backspace),
                TodoFormOutput::Ok
            );
        }
        assert_eq!(
            state.handle_input(TodoFormInput::Backspace),
            TodoFormOutput::Invalid
        );
    }

    #[test]
    fn test_edit_keeps_values_after_submit() {
        let todo = Todo::new(date!(2026 - 02 - 05), "RPM 3단원 오답노트", 60);
        let mut state = TodoFormState::edit(&todo);
        assert_eq!(state.mode().submit_label(), "수정하기");
        state.handle_input(TodoFormInput::Tab);
        state.handle_input(TodoFormInput::Backspace);
        state.handle_input(TodoFormInput::Backspace);
        type_str(&mut state, "45");
        let expected = TodoDraft {
            name: String::from("RPM 3단원 오답노트"),
            goal_minutes: 45,
        };
        assert_eq!(
            state.handle_input(TodoFormInput::Enter),
            TodoFormOutput::Submit(expected.clone())
        );
        assert_eq!(state.draft(), Some(expected));
    }

    #[test]
    fn test_render_button_style_tracks_validity() {
        let area = Rect::new(0, 0, OUTER_WIDTH, OUTER_HEIGHT);
        let mut state = TodoFormState::create();
        let mut buffer = Buffer::empty(area);
        TodoForm.render(area, &mut buffer, &mut state);
        // The button row is the last line of the text area
        let button_row = 2 + 7;
        let styled = (0..OUTER_WIDTH)
            .filter(|&x| buffer[(x, button_row)].symbol() == "[")
            .map(|x| buffer[(x, button_row)].style().fg)
            .collect::<Vec<_>>();
        assert_eq!(styled, [DISABLED_SUBMIT_STYLE.fg]);

        type_str(&mut state, "a");
        state.handle_input(TodoFormInput::Tab);
        type_str(&mut state, "1");
        let mut buffer = Buffer::empty(area);
        TodoForm.render(area, &mut buffer, &mut state);
        let styled = (0..OUTER_WIDTH)
            .filter(|&x| buffer[(x, button_row)].symbol() == "[")
            .map(|x| buffer[(x, button_row)].style().bg)
            .collect::<Vec<_>>();
        assert_eq!(styled, [READY_SUBMIT_STYLE.bg]);
    }
}
