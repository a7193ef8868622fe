use crate::form::{input_span, parse_minutes, push_minutes_digit, push_name_char, MAX_NAME_LENGTH};
use crate::plan::{Subject, YMD_FMT};
use crate::theme::{
    form::{DISABLED_SUBMIT_STYLE, FOCUSED_FIELD_STYLE, READY_SUBMIT_STYLE},
    BASE_STYLE, WEEKDAY_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Clear, StatefulWidget, Widget},
};
use std::iter::successors;
use time::Date;

/// Longest period one assignment may cover, in days
pub(crate) const MAX_PERIOD_DAYS: i64 = 31;

/// Length of a `YYYY-MM-DD` date
const DATE_LENGTH: usize = 10;

const OUTER_WIDTH: u16 = 50;
const OUTER_HEIGHT: u16 = 17;

/// The day or days an assigned to-do is due on
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum AssignDates {
    Single(Date),
    Period { start: Date, end: Date },
}

impl AssignDates {
    /// Every day covered, in order
    pub(crate) fn days(self) -> impl Iterator<Item = Date> {
        let (start, end) = match self {
            AssignDates::Single(date) => (date, date),
            AssignDates::Period { start, end } => (start, end),
        };
        successors(Some(start), |d| d.next_day()).take_while(move |&d| d <= end)
    }
}

/// What a valid assignment form submits
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Assignment {
    pub(crate) subject: Subject,
    pub(crate) dates: AssignDates,
    pub(crate) name: String,
    pub(crate) goal_minutes: u32,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Field {
    #[default]
    Subject,
    Period,
    // The single date, or the start of the period
    Date,
    EndDate,
    Name,
    Minutes,
}

/// A mentor's form for giving a mentee a to-do on one day or over a period
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct AssignFormState {
    mentee: &'static str,
    subject: Subject,
    use_period: bool,
    date: String,
    end_date: String,
    name: String,
    minutes: String,
    focus: Field,
}

impl AssignFormState {
    pub(crate) fn new(mentee: &'static str) -> AssignFormState {
        AssignFormState {
            mentee,
            subject: Subject::default(),
            use_period: false,
            date: String::new(),
            end_date: String::new(),
            name: String::new(),
            minutes: String::new(),
            focus: Field::Subject,
        }
    }

    pub(crate) fn mentee(&self) -> &'static str {
        self.mentee
    }

    /// Returns the assignment the form would submit, if it is complete
    pub(crate) fn assignment(&self) -> Option<Assignment> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        let goal_minutes = parse_minutes(&self.minutes)?;
        Some(Assignment {
            subject: self.subject,
            dates: self.dates()?,
            name: String::from(name),
            goal_minutes,
        })
    }

    fn dates(&self) -> Option<AssignDates> {
        let date = Date::parse(self.date.trim(), &YMD_FMT).ok()?;
        if !self.use_period {
            return Some(AssignDates::Single(date));
        }
        let end = Date::parse(self.end_date.trim(), &YMD_FMT).ok()?;
        if end < date || (end - date).whole_days() >= MAX_PERIOD_DAYS {
            return None;
        }
        Some(AssignDates::Period { start: date, end })
    }

    fn toggle_period(&mut self) {
        self.use_period = !self.use_period;
        self.date.clear();
        self.end_date.clear();
    }

    fn next_field(&self) -> Field {
        match self.focus {
            Field::Subject => Field::Period,
            Field::Period => Field::Date,
            Field::Date if self.use_period => Field::EndDate,
            Field::Date | Field::EndDate => Field::Name,
            Field::Name => Field::Minutes,
            Field::Minutes => Field::Subject,
        }
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Subject | Field::Period => None,
            Field::Date => Some(&mut self.date),
            Field::EndDate => Some(&mut self.end_date),
            Field::Name => Some(&mut self.name),
            Field::Minutes => Some(&mut self.minutes),
        }
    }

    pub(crate) fn handle_input(&mut self, input: AssignFormInput) -> AssignFormOutput {
        match (input, self.focus) {
            (AssignFormInput::Char(' '), Field::Subject) => {
                self.subject = self.subject.next();
                AssignFormOutput::Ok
            }
            (AssignFormInput::Char(' '), Field::Period) => {
                self.toggle_period();
                AssignFormOutput::Ok
            }
            (AssignFormInput::Char(_), Field::Subject | Field::Period) => AssignFormOutput::Invalid,
            (AssignFormInput::Char(c), Field::Date) => push_date_char(&mut self.date, c).into(),
            (AssignFormInput::Char(c), Field::EndDate) => {
                push_date_char(&mut self.end_date, c).into()
            }
            (AssignFormInput::Char(c), Field::Name) => push_name_char(&mut self.name, c).into(),
            (AssignFormInput::Char(c), Field::Minutes) => {
                push_minutes_digit(&mut self.minutes, c).into()
            }
            (AssignFormInput::Backspace, field) => match self.text_mut(field) {
                Some(text) => text.pop().is_some().into(),
                None => AssignFormOutput::Invalid,
            },
            (AssignFormInput::Tab, _) => {
                self.focus = self.next_field();
                AssignFormOutput::Ok
            }
            (AssignFormInput::Enter, _) => {
                let Some(assignment) = self.assignment() else {
                    return AssignFormOutput::Invalid;
                };
                self.date.clear();
                self.end_date.clear();
                self.name.clear();
                self.minutes.clear();
                self.focus = Field::Date;
                AssignFormOutput::Submit(assignment)
            }
        }
    }

    fn to_text(&self, width: u16) -> Text<'static> {
        let subject = Span::styled(
            format!("< {} >", self.subject.label()),
            self.focus_style(Field::Subject),
        );
        let check = if self.use_period { "[x]" } else { "[ ]" };
        let period = Span::styled(
            format!("{check} 기간으로 받기"),
            self.focus_style(Field::Period),
        );
        let date_line = if self.use_period {
            Line::from_iter([
                input_span(&self.date, "YYYY-MM-DD", self.focus == Field::Date),
                Span::styled("  ~  ", BASE_STYLE),
                input_span(&self.end_date, "YYYY-MM-DD", self.focus == Field::EndDate),
            ])
        } else {
            Line::from(input_span(
                &self.date,
                "YYYY-MM-DD",
                self.focus == Field::Date,
            ))
        };
        let count = Span::styled(
            format!("{}/{MAX_NAME_LENGTH}", self.name.chars().count()),
            WEEKDAY_STYLE,
        );
        let submit_style = if self.assignment().is_some() {
            READY_SUBMIT_STYLE
        } else {
            DISABLED_SUBMIT_STYLE
        };
        Text::from_iter([
            Line::styled(format!("멘티: {}", self.mentee), WEEKDAY_STYLE),
            spread(Span::styled("과목 *", WEEKDAY_STYLE), subject, width),
            spread(Span::styled("날짜 *", WEEKDAY_STYLE), period, width),
            date_line,
            Line::styled("", BASE_STYLE),
            spread(Span::styled("할 일 이름 *", WEEKDAY_STYLE), count, width),
            Line::from(input_span(
                &self.name,
                "예: 영어단어 10개 외우기",
                self.focus == Field::Name,
            )),
            Line::styled("", BASE_STYLE),
            Line::styled("목표 시간 (분) *", WEEKDAY_STYLE),
            Line::from(input_span(&self.minutes, "예: 60", self.focus == Field::Minutes)),
            Line::styled("", BASE_STYLE),
            Line::styled("", BASE_STYLE),
            Line::from(Span::styled("[ 할 일 등록하기 ]", submit_style)).centered(),
        ])
    }

    fn focus_style(&self, field: Field) -> Style {
        if self.focus == field {
            FOCUSED_FIELD_STYLE
        } else {
            BASE_STYLE
        }
    }
}

/// Accepts the characters of a `YYYY-MM-DD` date, up to its length
fn push_date_char(date: &mut String, c: char) -> bool {
    if !(c.is_ascii_digit() || c == '-') || date.len() >= DATE_LENGTH {
        return false;
    }
    date.push(c);
    true
}

/// Puts `left` at the start of a line of `width` columns and `right` at its end
fn spread(left: Span<'static>, right: Span<'static>, width: u16) -> Line<'static> {
    let gap = usize::from(width)
        .saturating_sub(left.width())
        .saturating_sub(right.width());
    Line::from_iter([left, Span::styled(" ".repeat(gap), BASE_STYLE), right])
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct AssignForm;

impl StatefulWidget for AssignForm {
    type State = AssignFormState;

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
            .title(" 할 일 등록하기 ")
            .title_alignment(Alignment::Center)
            .render(block_area, buf);
        let text_area = block_area.inner(Margin::new(2, 1));
        state.to_text(text_area.width).render(text_area, buf);
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum AssignFormInput {
    Char(char),
    Backspace,
    Tab,
    Enter,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum AssignFormOutput {
    Ok,
    Invalid,
    Submit(Assignment),
}

impl From<bool> for AssignFormOutput {
    fn from(accepted: bool) -> AssignFormOutput {
        if accepted {
            AssignFormOutput::Ok
        } else {
            AssignFormOutput::Invalid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn type_str(state: &mut AssignFormState, s: &str) {
        for c in s.chars() {
            assert_eq!(
                state.handle_input(AssignFormInput::Char(c)),
                AssignFormOutput::Ok
            );
        }
    }

    fn tab(state: &mut AssignFormState, times: usize) {
        for _ in 0..times {
            assert_eq!(state.handle_input(AssignFormInput::Tab), AssignFormOutput::Ok);
        }
    }

    #[test]
    fn test_single_date_flow() {
        let mut state = AssignFormState::new("김태우");
        assert_eq!(
            state.handle_input(AssignFormInput::Enter),
            AssignFormOutput::Invalid
        );
        // Subject -> Period -> Date
        tab(&mut state, 2);
        assert_eq!(
            state.handle_input(AssignFormInput::Char('x')),
            AssignFormOutput::Invalid
        );
        type_str(&mut state, "2026-02-12");
        assert_eq!(
            state.handle_input(AssignFormInput::Char('1')),
            AssignFormOutput::Invalid
        );
        tab(&mut state, 1);
        type_str(&mut state, " 영어단어 10개 외우기 ");
        assert_eq!(state.assignment(), None);
        tab(&mut state, 1);
        type_str(&mut state, "30");
        let expected = Assignment {
            subject: Subject::Korean,
            dates: AssignDates::Single(date!(2026 - 02 - 12)),
            name: String::from("영어단어 10개 외우기"),
            goal_minutes: 30,
        };
        assert_eq!(
            state.handle_input(AssignFormInput::Enter),
            AssignFormOutput::Submit(expected)
        );
        // Text is cleared; subject and mode stay for the next entry
        assert_eq!(state.assignment(), None);
        assert!(state.date.is_empty() && state.name.is_empty() && state.minutes.is_empty());
        assert_eq!(state.subject, Subject::Korean);
        assert_eq!(state.mentee(), "김태우");
    }

    #[test]
    fn test_subject_cycles() {
        let mut state = AssignFormState::new("김준");
        type_str(&mut state, " ");
        assert_eq!(state.subject, Subject::English);
        type_str(&mut state, "  ");
        assert_eq!(state.subject, Subject::Korean);
        assert_eq!(
            state.handle_input(AssignFormInput::Backspace),
            AssignFormOutput::Invalid
        );
    }

    #[test]
    fn test_period_needs_both_dates_in_order() {
        let mut state = AssignFormState::new("김준");
        tab(&mut state, 1);
        type_str(&mut state, " ");
        assert!(state.use_period);
        tab(&mut state, 1);
        type_str(&mut state, "2026-02-10");
        // Date -> EndDate
        tab(&mut state, 1);
        type_str(&mut state, "2026-02-09");
        tab(&mut state, 1);
        type_str(&mut state, "수학 기출");
        tab(&mut state, 1);
        type_str(&mut state, "45");
        assert_eq!(state.assignment(), None);
        state.end_date = String::from("2026-02-12");
        assert_eq!(
            state.assignment().map(|a| a.dates),
            Some(AssignDates::Period {
                start: date!(2026 - 02 - 10),
                end: date!(2026 - 02 - 12),
            })
        );
        state.end_date = String::from("2026-03-13");
        assert_eq!(state.assignment(), None);
        state.end_date = String::from("2026-03-12");
        assert!(state.assignment().is_some());
    }

    #[test]
    fn test_toggling_period_clears_dates() {
        let mut state = AssignFormState::new("김준");
        tab(&mut state, 2);
        type_str(&mut state, "2026-02-10");
        state.focus = Field::Period;
        type_str(&mut state, " ");
        assert!(state.date.is_empty());
        tab(&mut state, 1);
        type_str(&mut state, "2026-02-10");
        tab(&mut state, 1);
        assert_eq!(state.focus, Field::EndDate);
        type_str(&mut state, "2026-02-11");
        state.focus = Field::Period;
        type_str(&mut state, " ");
        assert!(!state.use_period);
        assert!(state.date.is_empty() && state.end_date.is_empty());
        // Without a period, Date leads straight to Name
        tab(&mut state, 2);
        assert_eq!(state.focus, Field::Name);
    }

    #[test]
    fn test_days() {
        let single = AssignDates::Single(date!(2026 - 02 - 28));
        assert_eq!(single.days().collect::<Vec<_>>(), [date!(2026 - 02 - 28)]);
        let period = AssignDates::Period {
            start: date!(2026 - 02 - 27),
            end: date!(2026 - 03 - 01),
        };
        assert_eq!(
            period.days().collect::<Vec<_>>(),
            [
                date!(2026 - 02 - 27),
                date!(2026 - 02 - 28),
                date!(2026 - 03 - 01)
            ]
        );
    }

    #[test]
    fn test_render_button_style_tracks_validity() {
        let area = Rect::new(0, 0, OUTER_WIDTH, OUTER_HEIGHT);
        let mut state = AssignFormState::new("김준");
        let button_row = OUTER_HEIGHT - 3;
        let button_fg = |state: &mut AssignFormState| {
            let mut buffer = Buffer::empty(area);
            AssignForm.render(area, &mut buffer, state);
            (0..OUTER_WIDTH)
                .filter(|&x| buffer[(x, button_row)].symbol() == "[")
                .map(|x| buffer[(x, button_row)].style().fg)
                .collect::<Vec<_>>()
        };
        assert_eq!(button_fg(&mut state), [DISABLED_SUBMIT_STYLE.fg]);
        state.date = String::from("2026-02-12");
        state.name = String::from("국어 문학");
        state.minutes = String::from("40");
        assert_eq!(button_fg(&mut state), [READY_SUBMIT_STYLE.fg]);
    }
}
