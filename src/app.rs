use crate::assign::{AssignForm, AssignFormInput, AssignFormOutput, AssignFormState, Assignment};
use crate::calendar::{CalendarView, MonthCalendar, RemainingByDate, MAIN_HEIGHT};
use crate::daysheet::DaySheet;
use crate::form::{TodoDraft, TodoForm, TodoFormInput, TodoFormOutput, TodoFormState};
use crate::help::Help;
use crate::mentor::{MentorDashboard, MentorView};
use crate::plan::{StudyPlan, Todo};
use crate::proof::{ProofInput, ProofOutput, ProofOverlay, ProofUploadState};
use crate::routes::Route;
use crate::sheet::{row_to_px, BottomSheet, CaptureScope, DragDismiss, SheetHit, SheetLayout};
use crate::theme::{BASE_STYLE, REMAINING_STYLE, TITLE_STYLE, WEEKDAY_STYLE};
use crossterm::event::{
    poll, read, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Paragraph, StatefulWidget, Widget},
    Terminal,
};
use std::io::{self, Write};
use std::time::Instant;

static LOGIN_TEXT: &[&str] = &[
    "로그인이 필요합니다.",
    "",
    "studyplan login --token TOKEN --role mentee|mentor",
    "",
    "q: 종료",
];

#[derive(Debug)]
pub(crate) struct App {
    route: Route,
    calendar: CalendarView,
    plan: StudyPlan,
    remaining: RemainingByDate,
    sheet_open: bool,
    // Index into the selected day's to-dos
    cursor: usize,
    capture: CaptureScope,
    drag: DragDismiss,
    sheet_layout: SheetLayout,
    mentor: MentorView,
    state: AppState,
}

impl App {
    pub(crate) fn new(route: Route, calendar: CalendarView, plan: StudyPlan) -> App {
        let capture = CaptureScope::new();
        App {
            route,
            calendar,
            remaining: plan.remaining_by_date(),
            plan,
            sheet_open: false,
            cursor: 0,
            drag: DragDismiss::new(capture.clone()),
            capture,
            sheet_layout: SheetLayout::default(),
            mentor: MentorView::new(),
            state: AppState::Browsing,
        }
    }

    pub(crate) fn run<B: Backend>(mut self, mut terminal: Terminal<B>) -> io::Result<()> {
        while !self.quitting() {
            self.drag.tick(Instant::now());
            terminal.draw(|frame| frame.render_widget(&mut self, frame.area()))?;
            if let Some(event) = self.next_event()? {
                if !self.handle_event(event, Instant::now()) {
                    self.beep()?;
                }
            }
        }
        self.drag.teardown();
        Ok(())
    }

    /// Waits for the next terminal event, or until the drag controller's
    /// pending reset is due
    fn next_event(&self) -> io::Result<Option<Event>> {
        match self.drag.next_deadline(Instant::now()) {
            Some(timeout) => {
                if poll(timeout)? {
                    read().map(Some)
                } else {
                    Ok(None)
                }
            }
            None => read().map(Some),
        }
    }

    // Returns `false` if the event was an invalid key
    fn handle_event(&mut self, event: Event, now: Instant) -> bool {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = event.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
                true
            } else {
                normal_modifiers.contains(modifiers) && self.handle_key(code, now)
            }
        } else {
            match event {
                Event::Mouse(mouse) => self.handle_mouse(mouse, now),
                Event::Resize(..) | Event::FocusLost => {
                    self.cancel_drag(now);
                    true
                }
                // Redraw on anything else
                _ => true,
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode, now: Instant) -> bool {
        match &mut self.state {
            AppState::Browsing => match self.route {
                Route::MenteeHome if self.sheet_open => self.handle_sheet_key(key, now),
                Route::MenteeHome => self.handle_calendar_key(key, now),
                Route::MentorDashboard => match key {
                    KeyCode::Char('j') | KeyCode::Down => self.mentor.select_next(),
                    KeyCode::Char('k') | KeyCode::Up => self.mentor.select_previous(),
                    KeyCode::Char('a') => match self.mentor.selected() {
                        Some(mentee) => {
                            self.state = AppState::Assigning {
                                form: AssignFormState::new(mentee.name),
                            };
                            true
                        }
                        None => false,
                    },
                    _ => self.handle_common_key(key),
                },
                Route::Login => self.handle_common_key(key),
            },
            AppState::Helping => {
                self.state = AppState::Browsing;
                true
            }
            AppState::Editing { form, target } => {
                let output = match key {
                    KeyCode::Esc => {
                        self.state = AppState::Browsing;
                        return true;
                    }
                    KeyCode::Char(c) => form.handle_input(TodoFormInput::Char(c)),
                    KeyCode::Backspace | KeyCode::Delete => {
                        form.handle_input(TodoFormInput::Backspace)
                    }
                    KeyCode::Tab | KeyCode::BackTab => form.handle_input(TodoFormInput::Tab),
                    KeyCode::Enter => form.handle_input(TodoFormInput::Enter),
                    _ => TodoFormOutput::Invalid,
                };
                let target = *target;
                match output {
                    TodoFormOutput::Ok => true,
                    TodoFormOutput::Invalid => false,
                    TodoFormOutput::Submit(draft) => {
                        self.submit(target, draft);
                        true
                    }
                }
            }
            AppState::Assigning { form } => {
                let output = match key {
                    KeyCode::Esc => {
                        self.state = AppState::Browsing;
                        return true;
                    }
                    KeyCode::Char(c) => form.handle_input(AssignFormInput::Char(c)),
                    KeyCode::Backspace | KeyCode::Delete => {
                        form.handle_input(AssignFormInput::Backspace)
                    }
                    KeyCode::Tab | KeyCode::BackTab => form.handle_input(AssignFormInput::Tab),
                    KeyCode::Enter => form.handle_input(AssignFormInput::Enter),
                    _ => AssignFormOutput::Invalid,
                };
                let mentee = form.mentee();
                match output {
                    AssignFormOutput::Ok => true,
                    AssignFormOutput::Invalid => false,
                    AssignFormOutput::Submit(assignment) => {
                        self.assign(mentee, &assignment);
                        true
                    }
                }
            }
            AppState::Proofs { overlay, target } => {
                let output = match key {
                    KeyCode::Esc => {
                        self.state = AppState::Browsing;
                        return true;
                    }
                    KeyCode::Char(c) => overlay.handle_input(ProofInput::Char(c)),
                    KeyCode::Backspace => overlay.handle_input(ProofInput::Backspace),
                    KeyCode::Delete => overlay.handle_input(ProofInput::Delete),
                    KeyCode::Left | KeyCode::Up => overlay.handle_input(ProofInput::Previous),
                    KeyCode::Right | KeyCode::Down => overlay.handle_input(ProofInput::Next),
                    KeyCode::Enter => overlay.handle_input(ProofInput::Enter),
                    _ => ProofOutput::Invalid,
                };
                let target = *target;
                match output {
                    ProofOutput::Ok => true,
                    ProofOutput::Invalid => false,
                    ProofOutput::Save(images) => {
                        let saved = self.plan.set_proofs(target, images);
                        self.state = AppState::Browsing;
                        saved
                    }
                }
            }
            AppState::Quitting => false,
        }
    }

    fn handle_common_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.state = AppState::Quitting;
                true
            }
            KeyCode::Char('?') => {
                self.state = AppState::Helping;
                true
            }
            _ => false,
        }
    }

    fn handle_calendar_key(&mut self, key: KeyCode, now: Instant) -> bool {
        match key {
            KeyCode::Char('h') | KeyCode::Left => self.calendar.move_selection(-1).is_ok(),
            KeyCode::Char('l') | KeyCode::Right => self.calendar.move_selection(1).is_ok(),
            KeyCode::Char('k') | KeyCode::Up => self.calendar.move_selection(-7).is_ok(),
            KeyCode::Char('j') | KeyCode::Down => self.calendar.move_selection(7).is_ok(),
            KeyCode::Char('<' | '[') | KeyCode::PageUp => self.calendar.change_month(-1).is_ok(),
            KeyCode::Char('>' | ']') | KeyCode::PageDown => self.calendar.change_month(1).is_ok(),
            KeyCode::Char('t') | KeyCode::Home => {
                self.calendar.jump_to_today();
                true
            }
            KeyCode::Enter => {
                self.open_sheet(now);
                true
            }
            _ => self.handle_common_key(key),
        }
    }

    fn handle_sheet_key(&mut self, key: KeyCode, now: Instant) -> bool {
        let count = self.plan.todos_on(self.calendar.selected()).len();
        match key {
            KeyCode::Esc => {
                self.close_sheet(now);
                true
            }
            KeyCode::Char('j') | KeyCode::Down if self.cursor + 1 < count => {
                self.cursor += 1;
                true
            }
            KeyCode::Char('k') | KeyCode::Up if self.cursor > 0 => {
                self.cursor -= 1;
                true
            }
            KeyCode::Char(' ') => match self.todo_under_cursor() {
                Some(index) => {
                    self.plan.toggle_done(index);
                    self.remaining = self.plan.remaining_by_date();
                    true
                }
                None => false,
            },
            KeyCode::Char('a') => {
                self.state = AppState::Editing {
                    form: TodoFormState::create(),
                    target: None,
                };
                true
            }
            KeyCode::Char('e') => {
                let Some(index) = self.todo_under_cursor() else {
                    return false;
                };
                let Some(todo) = self.plan.get(index) else {
                    return false;
                };
                self.state = AppState::Editing {
                    form: TodoFormState::edit(todo),
                    target: Some(index),
                };
                true
            }
            KeyCode::Char('p') => {
                let Some(index) = self.todo_under_cursor() else {
                    return false;
                };
                let Some(todo) = self.plan.get(index) else {
                    return false;
                };
                self.state = AppState::Proofs {
                    overlay: ProofUploadState::new(todo),
                    target: index,
                };
                true
            }
            KeyCode::Char('q' | '?') => self.handle_common_key(key),
            _ => false,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) -> bool {
        let y = row_to_px(mouse.row);
        if self.capture.is_captured() {
            match mouse.kind {
                MouseEventKind::Drag(_) | MouseEventKind::Moved => self.drag.pointer_move(y),
                MouseEventKind::Up(_) => self.release_drag(now),
                MouseEventKind::Down(_) => self.drag.pointer_down(y),
                _ => (),
            }
            return true;
        }
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return true;
        }
        match self.state {
            AppState::Helping => {
                self.state = AppState::Browsing;
                return true;
            }
            AppState::Browsing => (),
            _ => return true,
        }
        if self.route != Route::MenteeHome {
            return true;
        }
        if self.sheet_open {
            match self.sheet_layout.hit(mouse.column, mouse.row) {
                SheetHit::Handle => self.drag.pointer_down(y),
                SheetHit::Overlay => self.close_sheet(now),
                SheetHit::Body | SheetHit::Outside => (),
            }
        } else if let Some(date) = self.calendar.date_at(mouse.column, mouse.row) {
            self.calendar.select(date);
            self.open_sheet(now);
        }
        true
    }

    fn release_drag(&mut self, now: Instant) {
        let mut close = false;
        let release = self.drag.pointer_up(|| close = true);
        tracing::debug!(?release, "sheet handle released");
        if close {
            self.close_sheet(now);
        }
    }

    fn cancel_drag(&mut self, now: Instant) {
        if !self.drag.is_dragging() {
            return;
        }
        let mut close = false;
        let release = self.drag.pointer_cancel(|| close = true);
        tracing::debug!(?release, "sheet drag interrupted");
        if close {
            self.close_sheet(now);
        }
    }

    fn open_sheet(&mut self, now: Instant) {
        self.sheet_open = true;
        self.cursor = 0;
        self.drag.sync_open(true, now);
        tracing::debug!(date = %self.calendar.selected(), "opened day sheet");
    }

    fn close_sheet(&mut self, now: Instant) {
        self.sheet_open = false;
        self.sheet_layout = SheetLayout::default();
        self.drag.sync_open(false, now);
        tracing::debug!("closed day sheet");
    }

    fn todo_under_cursor(&self) -> Option<usize> {
        self.plan
            .todos_on(self.calendar.selected())
            .get(self.cursor)
            .map(|&(index, _)| index)
    }

    fn submit(&mut self, target: Option<usize>, draft: TodoDraft) {
        match target {
            Some(index) => {
                self.plan.update(index, draft);
                self.state = AppState::Browsing;
            }
            None => {
                // The form stays up, cleared, for the next entry
                let date = self.calendar.selected();
                self.plan.add(date, draft);
                self.cursor = self.plan.todos_on(date).len().saturating_sub(1);
            }
        }
        self.remaining = self.plan.remaining_by_date();
    }

    fn assign(&mut self, mentee: &str, assignment: &Assignment) {
        // The form stays up, with its subject kept, for the next entry
        let added = self.plan.assign(assignment);
        self.mentor.record_assigned(added);
        self.remaining = self.plan.remaining_by_date();
        tracing::debug!(mentee, added, "assigned to-dos");
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    fn render_mentee(&mut self, area: Rect, buf: &mut Buffer) {
        let [status_area, calendar_area, _] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(MAIN_HEIGHT),
            Constraint::Min(0),
        ])
        .areas(area);
        MonthCalendar::new(&self.remaining, self.plan.revision()).render(
            calendar_area,
            buf,
            &mut self.calendar,
        );
        if let Ok(grid) = self.calendar.grid(&self.remaining, self.plan.revision()) {
            Line::from_iter([
                Span::styled("이번 달 남은 할 일 ", WEEKDAY_STYLE),
                Span::styled(format!("{}개", grid.month_remaining()), REMAINING_STYLE),
                Span::styled("   ? 도움말", WEEKDAY_STYLE),
            ])
            .centered()
            .render(status_area, buf);
        }
        if self.sheet_open {
            let date = self.calendar.selected();
            let todos = self
                .plan
                .todos_on(date)
                .into_iter()
                .map(|(_, todo)| todo)
                .collect::<Vec<&Todo>>();
            let content = DaySheet::new(date, todos, self.cursor);
            BottomSheet::new(content, &self.drag).render(area, buf, &mut self.sheet_layout);
        }
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        match self.route {
            Route::MenteeHome => self.render_mentee(area, buf),
            Route::MentorDashboard => MentorDashboard.render(area, buf, &mut self.mentor),
            Route::Login => {
                let text = Text::from_iter(LOGIN_TEXT.iter().map(|&s| Line::raw(s)));
                let height = u16::try_from(text.height()).unwrap_or(u16::MAX);
                let [login_area] = Layout::vertical([height]).flex(Flex::Center).areas(area);
                Paragraph::new(text)
                    .style(TITLE_STYLE)
                    .centered()
                    .render(login_area, buf);
            }
        }
        match &mut self.state {
            AppState::Helping => Help {
                route: self.route,
                style: BASE_STYLE,
            }
            .render(area, buf),
            AppState::Editing { form, .. } => TodoForm.render(area, buf, form),
            AppState::Assigning { form } => AssignForm.render(area, buf, form),
            AppState::Proofs { overlay, .. } => ProofOverlay.render(area, buf, overlay),
            AppState::Browsing | AppState::Quitting => (),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum AppState {
    Browsing,
    Helping,
    Editing {
        form: TodoFormState,
        // Plan index of the to-do being edited; `None` when adding
        target: Option<usize>,
    },
    Assigning {
        form: AssignFormState,
    },
    Proofs {
        overlay: ProofUploadState,
        // Plan index of the to-do the photos belong to
        target: usize,
    },
    Quitting,
}
