use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Text,
    widgets::{Paragraph, Widget},
};

/// Draws text at coordinates relative to an area, clipping anything that
/// falls outside of it
#[derive(Debug, Eq, PartialEq)]
pub(crate) struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    pub(crate) fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    pub(crate) fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Option<Style>) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style.unwrap_or_default());
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // The Rect given to the Paragraph must lie entirely within the
            // buffer lest a panic result.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    /// Prints `s` centered within the `width` columns starting at `x`
    pub(crate) fn mvprint_centered<S: AsRef<str>>(
        &mut self,
        y: u16,
        x: u16,
        width: u16,
        s: S,
        style: Option<Style>,
    ) {
        let len = u16::try_from(Text::raw(s.as_ref()).width()).unwrap_or(u16::MAX);
        let pad = width.saturating_sub(len) / 2;
        self.mvprint(y, x.saturating_add(pad), s, style);
    }

    pub(crate) fn hline(&mut self, y: u16, x: u16, ch: char, length: u16, style: Style) {
        self.mvprint(y, x, String::from(ch).repeat(length.into()), Some(style));
    }
}
