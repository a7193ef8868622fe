use super::gesture::{DragDismiss, Transition};
use crate::canvas::BufferCanvas;
use crate::theme::sheet::{HANDLE_GRABBED_STYLE, HANDLE_STYLE, OVERLAY_STYLE, SHEET_STYLE};
use ratatui::{
    buffer::Buffer,
    layout::{Margin, Position, Rect},
    widgets::{Block, Clear, StatefulWidget, Widget},
};

/// Logical pixels per terminal row, used to turn mouse rows into the pixel
/// distances the drag controller works in
pub(crate) const ROW_HEIGHT: i32 = 16;

/// Preferred height of the sheet in rows, handle included
const SHEET_HEIGHT: u16 = 12;

const HANDLE_WIDTH: u16 = 8;

const ACS_HANDLE: char = '━';

/// Converts a terminal row into a logical pixel height
pub(crate) fn row_to_px(row: u16) -> i32 {
    i32::from(row) * ROW_HEIGHT
}

/// Where the parts of the sheet were last drawn
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct SheetLayout {
    /// The grab region at the top of the sheet
    pub(crate) handle: Rect,
    /// The whole visible sheet, handle included
    pub(crate) sheet: Rect,
    /// The dimmed area; taps here outside of `sheet` close it
    pub(crate) overlay: Rect,
}

/// What a pointer press at some position hit
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SheetHit {
    Handle,
    Body,
    Overlay,
    Outside,
}

impl SheetLayout {
    pub(crate) fn hit(&self, column: u16, row: u16) -> SheetHit {
        let pos = Position::new(column, row);
        if self.handle.contains(pos) {
            SheetHit::Handle
        } else if self.sheet.contains(pos) {
            SheetHit::Body
        } else if self.overlay.contains(pos) {
            SheetHit::Overlay
        } else {
            SheetHit::Outside
        }
    }
}

/// A panel anchored to the bottom of the screen over a dimmed overlay,
/// shifted down by the drag controller's offset
#[derive(Debug)]
pub(crate) struct BottomSheet<'a, W> {
    content: W,
    drag: &'a DragDismiss,
}

impl<'a, W: Widget> BottomSheet<'a, W> {
    pub(crate) fn new(content: W, drag: &'a DragDismiss) -> Self {
        BottomSheet { content, drag }
    }
}

impl<W: Widget> StatefulWidget for BottomSheet<'_, W> {
    type State = SheetLayout;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        buf.set_style(area, OVERLAY_STYLE);
        let height = SHEET_HEIGHT.min(area.height);
        let shift = u16::try_from(self.drag.offset() / ROW_HEIGHT.unsigned_abs()).unwrap_or(u16::MAX);
        let top = area.bottom().saturating_sub(height).saturating_add(shift);
        let sheet = Rect {
            x: area.x,
            y: top.min(area.bottom()),
            width: area.width,
            height: area.bottom().saturating_sub(top),
        };
        let handle = Rect {
            height: sheet.height.min(1),
            ..sheet
        };
        *state = SheetLayout {
            handle,
            sheet,
            overlay: area,
        };
        if sheet.is_empty() {
            return;
        }
        Clear.render(sheet, buf);
        Block::new().style(SHEET_STYLE).render(sheet, buf);
        let grip_width = HANDLE_WIDTH.min(handle.width);
        let grip = Rect {
            x: handle.x + (handle.width - grip_width) / 2,
            width: grip_width,
            ..handle
        };
        // The handle is lit while it tracks the pointer directly
        let style = match self.drag.transition() {
            Transition::Immediate => HANDLE_GRABBED_STYLE,
            Transition::Eased => HANDLE_STYLE,
        };
        BufferCanvas::new(grip, buf).hline(0, 0, ACS_HANDLE, grip.width, style);
        let body = Rect {
            y: sheet.y.saturating_add(1),
            height: sheet.height.saturating_sub(1),
            ..sheet
        }
        .inner(Margin::new(1, 0));
        self.content.render(body, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::super::gesture::CaptureScope;
    use super::*;
    use ratatui::widgets::Paragraph;
    use std::time::Instant;

    fn render(drag: &DragDismiss) -> (Buffer, SheetLayout) {
        let area = Rect::new(0, 0, 20, 16);
        let mut buffer = Buffer::empty(area);
        let mut layout = SheetLayout::default();
        BottomSheet::new(Paragraph::new("hello"), drag).render(area, &mut buffer, &mut layout);
        (buffer, layout)
    }

    #[test]
    fn test_resting_layout() {
        let drag = DragDismiss::new(CaptureScope::new());
        let (buffer, layout) = render(&drag);
        assert_eq!(layout.sheet, Rect::new(0, 4, 20, 12));
        assert_eq!(layout.handle, Rect::new(0, 4, 20, 1));
        assert_eq!(buffer[(6, 4)].symbol(), "━");
        assert_eq!(buffer[(13, 4)].symbol(), "━");
        assert_eq!(buffer[(5, 4)].symbol(), " ");
        assert_eq!(buffer[(1, 5)].symbol(), "h");
        assert_eq!(buffer[(0, 0)].style().fg, OVERLAY_STYLE.fg);
        assert_eq!(layout.hit(8, 4), SheetHit::Handle);
        assert_eq!(layout.hit(8, 10), SheetHit::Body);
        assert_eq!(layout.hit(8, 2), SheetHit::Overlay);
        assert_eq!(layout.hit(30, 2), SheetHit::Outside);
    }

    #[test]
    fn test_dragged_layout_follows_offset() {
        let mut drag = DragDismiss::new(CaptureScope::new());
        drag.sync_open(true, Instant::now());
        drag.pointer_down(row_to_px(4));
        drag.pointer_move(row_to_px(7) + 5);
        let (buffer, layout) = render(&drag);
        assert_eq!(layout.sheet, Rect::new(0, 7, 20, 9));
        assert_eq!(layout.hit(8, 7), SheetHit::Handle);
        assert_eq!(layout.hit(8, 5), SheetHit::Overlay);
        assert_eq!(buffer[(8, 7)].style().fg, HANDLE_GRABBED_STYLE.fg);
    }

    #[test]
    fn test_dragged_off_screen() {
        let mut drag = DragDismiss::new(CaptureScope::new());
        drag.sync_open(true, Instant::now());
        drag.pointer_down(0);
        drag.pointer_move(row_to_px(40));
        let (_, layout) = render(&drag);
        assert!(layout.sheet.is_empty());
        assert_eq!(layout.hit(8, 15), SheetHit::Overlay);
    }
}
