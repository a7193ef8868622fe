use crate::plan::{Subject, Todo};
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
use std::path::PathBuf;
use thiserror::Error;

/// Most images one to-do can carry as proof
pub(crate) const MAX_PROOFS: usize = 10;

const OUTER_WIDTH: u16 = 56;
const OUTER_HEIGHT: u16 = 21;

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("only {remaining} more proof images can be attached")]
pub(crate) struct TooManyProofs {
    remaining: usize,
}

/// The proof images of one to-do while they are being edited
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ProofUploadState {
    subject: Option<Subject>,
    title: String,
    images: Vec<PathBuf>,
    // Index of the image acted on by delete; 0 when there are none
    current: usize,
    input: String,
}

impl ProofUploadState {
    pub(crate) fn new(todo: &Todo) -> ProofUploadState {
        ProofUploadState {
            subject: todo.subject,
            title: todo.name.clone(),
            images: todo.proofs.iter().take(MAX_PROOFS).cloned().collect(),
            current: 0,
            input: String::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn images(&self) -> &[PathBuf] {
        &self.images
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> usize {
        self.current
    }

    pub(crate) fn remaining_slots(&self) -> usize {
        MAX_PROOFS.saturating_sub(self.images.len())
    }

    /// Attaches `paths` and makes the last of them current.  If they do not
    /// all fit, none are attached.
    pub(crate) fn add(&mut self, paths: Vec<PathBuf>) -> Result<(), TooManyProofs> {
        let remaining = self.remaining_slots();
        if paths.len() > remaining {
            return Err(TooManyProofs { remaining });
        }
        if !paths.is_empty() {
            self.images.extend(paths);
            self.current = self.images.len() - 1;
        }
        Ok(())
    }

    /// Removes the current image, keeping the index within the list
    pub(crate) fn delete_current(&mut self) -> bool {
        if self.current >= self.images.len() {
            return false;
        }
        self.images.remove(self.current);
        if self.current >= self.images.len() {
            self.current = self.images.len().saturating_sub(1);
        }
        true
    }

    fn select_previous(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    fn select_next(&mut self) -> bool {
        if self.current + 1 >= self.images.len() {
            return false;
        }
        self.current += 1;
        true
    }

    pub(crate) fn handle_input(&mut self, input: ProofInput) -> ProofOutput {
        match input {
            ProofInput::Char(c) => {
                if c.is_control() || self.remaining_slots() == 0 {
                    return ProofOutput::Invalid;
                }
                self.input.push(c);
                ProofOutput::Ok
            }
            ProofInput::Backspace => self.input.pop().is_some().into(),
            ProofInput::Delete => self.delete_current().into(),
            ProofInput::Previous => self.select_previous().into(),
            ProofInput::Next => self.select_next().into(),
            ProofInput::Enter if self.input.trim().is_empty() => {
                if self.images.is_empty() {
                    ProofOutput::Invalid
                } else {
                    ProofOutput::Save(self.images.clone())
                }
            }
            ProofInput::Enter => {
                let path = PathBuf::from(self.input.trim());
                match self.add(vec![path]) {
                    Ok(()) => {
                        self.input.clear();
                        ProofOutput::Ok
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "refused proof image");
                        ProofOutput::Invalid
                    }
                }
            }
        }
    }

    fn to_text(&self) -> Text<'static> {
        let mut lines = vec![
            Line::styled("", BASE_STYLE),
            Line::from_iter([
                Span::styled("공부 인증 사진 ", BASE_STYLE),
                Span::styled(
                    format!("({}/{MAX_PROOFS})", self.images.len()),
                    WEEKDAY_STYLE,
                ),
            ]),
            Line::styled("", BASE_STYLE),
        ];
        if self.images.is_empty() {
            lines.push(Line::styled("아직 업로드된 사진이 없어요.", WEEKDAY_STYLE));
            lines.push(Line::styled(
                "과제 수행 결과 사진의 경로를 입력해 주세요.",
                WEEKDAY_STYLE,
            ));
        }
        for (i, path) in self.images.iter().enumerate() {
            let (marker, style) = if i == self.current {
                ("▸ ", FOCUSED_FIELD_STYLE)
            } else {
                ("  ", BASE_STYLE)
            };
            lines.push(Line::from_iter([
                Span::styled(marker, BASE_STYLE),
                Span::styled(format!("{}. {}", i + 1, path.display()), style),
            ]));
        }
        lines.push(Line::styled("", BASE_STYLE));
        let input = if self.remaining_slots() == 0 {
            Span::styled(
                format!("최대 {MAX_PROOFS}장까지 올릴 수 있어요."),
                PLACEHOLDER_STYLE,
            )
        } else if self.input.is_empty() {
            Span::styled("사진 경로 입력 후 Enter", PLACEHOLDER_STYLE)
        } else {
            Span::styled(self.input.clone(), FOCUSED_FIELD_STYLE)
        };
        lines.push(Line::from_iter([Span::styled("사진 추가: ", BASE_STYLE), input]));
        lines.push(Line::styled("", BASE_STYLE));
        let save_style = if self.images.is_empty() {
            DISABLED_SUBMIT_STYLE
        } else {
            READY_SUBMIT_STYLE
        };
        lines.push(Line::from(Span::styled("[ 저장하기 ]", save_style)).centered());
        Text::from(lines)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ProofInput {
    Char(char),
    Backspace,
    /// Remove the current image
    Delete,
    Previous,
    Next,
    /// Attach the typed path, or save when nothing is typed
    Enter,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum ProofOutput {
    Ok,
    Invalid,
    Save(Vec<PathBuf>),
}

impl From<bool> for ProofOutput {
    fn from(accepted: bool) -> ProofOutput {
        if accepted {
            ProofOutput::Ok
        } else {
            ProofOutput::Invalid
        }
    }
}

/// Popup for attaching proof-of-study images to a to-do
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ProofOverlay;

impl StatefulWidget for ProofOverlay {
    type State = ProofUploadState;

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
        let title = match state.subject {
            Some(subject) => format!(" [{}] {} ", subject.label(), state.title),
            None => format!(" {} ", state.title),
        };
        Block::bordered()
            .title(title)
            .title_alignment(Alignment::Center)
            .render(block_area, buf);
        let text_area = block_area.inner(Margin::new(2, 1));
        state.to_text().render(text_area, buf);
    }
}
