use crate::theme::mentor::{
    CHIP_STYLE, HEADER_STYLE, NOT_SUBMITTED_STYLE, ROW_HIGHLIGHT_STYLE, SUBMITTED_STYLE,
};
use crate::theme::{BASE_STYLE, TITLE_STYLE};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, StatefulWidget, Table, TableState, Widget},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SubmissionStatus {
    Submitted,
    NotSubmitted,
}

impl SubmissionStatus {
    fn label(self) -> Span<'static> {
        match self {
            SubmissionStatus::Submitted => Span::styled("제출 완료", SUBMITTED_STYLE),
            SubmissionStatus::NotSubmitted => Span::styled("미제출", NOT_SUBMITTED_STYLE),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MenteeRow {
    pub(crate) name: &'static str,
    pub(crate) grade: &'static str,
    pub(crate) subjects_label: &'static str,
    pub(crate) recent_study: &'static str,
    pub(crate) status: SubmissionStatus,
}

impl MenteeRow {
    /// The comma-separated subjects, trimmed, with blanks dropped
    pub(crate) fn subjects(&self) -> Vec<&'static str> {
        self.subjects_label
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

static MOCK_MENTEES: &[MenteeRow] = &[
    MenteeRow {
        name: "김태우",
        grade: "고등학교 2학년",
        subjects_label: "영어, 수학",
        recent_study: "2026-02-05 / 영단어 10개 외우기",
        status: SubmissionStatus::Submitted,
    },
    MenteeRow {
        name: "이만재",
        grade: "고등학교 3학년",
        subjects_label: "국어, 영어, 수학",
        recent_study: "2026-02-01 / 평가원모의고사 풀이",
        status: SubmissionStatus::Submitted,
    },
    MenteeRow {
        name: "김준",
        grade: "고등학교 3학년",
        subjects_label: "국어, 영어, 수학",
        recent_study: "2026-02-05 / RPM 3단원 오답노트",
        status: SubmissionStatus::NotSubmitted,
    },
    MenteeRow {
        name: "김다은",
        grade: "고등학교 1학년",
        subjects_label: "국어, 수학",
        recent_study: "2026-02-04 / 작품 분석 2편",
        status: SubmissionStatus::Submitted,
    },
    MenteeRow {
        name: "이서영",
        grade: "고등학교 2학년",
        subjects_label: "국어, 영어",
        recent_study: "2026-02-04 / 시대인재 국어",
        status: SubmissionStatus::Submitted,
    },
    MenteeRow {
        name: "주현지",
        grade: "고등학교 3학년",
        subjects_label: "영어",
        recent_study: "2026-02-05 / 9월 모의고사 오답노트",
        status: SubmissionStatus::Submitted,
    },
];

/// The mentor's list of mentees and which one is selected
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MentorView {
    mentees: &'static [MenteeRow],
    table: TableState,
    /// Number of to-dos assigned to each mentee this session
    assigned: Vec<usize>,
}

impl MentorView {
    pub(crate) fn new() -> MentorView {
        MentorView::with_mentees(MOCK_MENTEES)
    }

    fn with_mentees(mentees: &'static [MenteeRow]) -> MentorView {
        let selected = (!mentees.is_empty()).then_some(0);
        MentorView {
            mentees,
            table: TableState::default().with_selected(selected),
            assigned: vec![0; mentees.len()],
        }
    }

    /// Counts `count` newly assigned to-dos against the selected mentee
    pub(crate) fn record_assigned(&mut self, count: usize) {
        if let Some(n) = self
            .table
            .selected()
            .and_then(|i| self.assigned.get_mut(i))
        {
            *n += count;
        }
    }

    pub(crate) fn assigned_to_selected(&self) -> usize {
        self.table
            .selected()
            .and_then(|i| self.assigned.get(i).copied())
            .unwrap_or_default()
    }

    pub(crate) fn selected(&self) -> Option<&MenteeRow> {
        self.mentees.get(self.table.selected()?)
    }

    /// Moves the selection down one row; returns `false` at the last row
    pub(crate) fn select_next(&mut self) -> bool {
        match self.table.selected() {
            Some(i) if i + 1 < self.mentees.len() => {
                self.table.select(Some(i + 1));
                true
            }
            _ => false,
        }
    }

    /// Moves the selection up one row; returns `false` at the first row
    pub(crate) fn select_previous(&mut self) -> bool {
        match self.table.selected() {
            Some(i) if i > 0 => {
                self.table.select(Some(i - 1));
                true
            }
            _ => false,
        }
    }
}

impl Default for MentorView {
    fn default() -> MentorView {
        MentorView::new()
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct MentorDashboard;

impl StatefulWidget for MentorDashboard {
    type State = MentorView;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut MentorView) {
        let [title_area, table_area, chips_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);
        Line::styled(format!("담당 멘티 {}명", state.mentees.len()), TITLE_STYLE)
            .render(title_area, buf);
        let rows = state.mentees.iter().map(|m| {
            Row::new([
                Cell::from(m.name),
                Cell::from(m.grade),
                Cell::from(m.subjects_label),
                Cell::from(m.recent_study),
                Cell::from(m.status.label()),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(8),
                Constraint::Length(14),
                Constraint::Length(16),
                Constraint::Fill(1),
                Constraint::Length(9),
            ],
        )
        .header(Row::new(["이름", "학년", "과목", "최근 학습", "제출"]).style(HEADER_STYLE))
        .style(BASE_STYLE)
        .row_highlight_style(ROW_HIGHLIGHT_STYLE);
        StatefulWidget::render(table, table_area, buf, &mut state.table);
        if let Some(mentee) = state.selected() {
            let mut spans = vec![Span::styled("과목 ", BASE_STYLE)];
            for subject in mentee.subjects() {
                spans.push(Span::styled(format!(" {subject} "), CHIP_STYLE));
                spans.push(Span::styled(" ", BASE_STYLE));
            }
            let assigned = state.assigned_to_selected();
            if assigned > 0 {
                spans.push(Span::styled(format!(" 등록한 할 일 {assigned}개"), BASE_STYLE));
            }
            Paragraph::new(Line::from(spans)).render(chips_area, buf);
        }
    }
}
