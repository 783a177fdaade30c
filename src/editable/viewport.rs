//! Horizontal scroll bookkeeping for a single-line entry.
//!
//! The entry never measures glyphs itself; the renderer supplies widths
//! through [`TextMeasure`].

/// Text width provider implemented by the renderer
pub trait TextMeasure {
    /// Advance width of `text` in pixels
    fn width(&self, text: &str) -> i32;
}

/// Fixed advance per character. Used by tests and the headless replay tool.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasure {
    pub advance: i32,
}

impl TextMeasure for MonospaceMeasure {
    fn width(&self, text: &str) -> i32 {
        text.chars().count() as i32 * self.advance
    }
}

/// Keeps the caret inside the visible part of the entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Pixels scrolled off the left edge
    pub scroll_x: i32,
    /// Entry width in pixels
    pub width: i32,
    /// Inner padding in pixels
    pub padding: i32,
}

/// Gap kept between the caret and the right edge
const CARET_MARGIN: i32 = 8;

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_x: 0,
            width: 160,
            padding: 4,
        }
    }
}

impl Viewport {
    pub fn new(width: i32, padding: i32) -> Self {
        Self {
            scroll_x: 0,
            width,
            padding,
        }
    }

    /// Scroll so the caret at byte `cursor` is visible, without overscrolling
    /// past the end of the text.
    pub fn scroll_to_cursor(&mut self, text: &str, cursor: usize, measure: &dyn TextMeasure) {
        let cursor = cursor.min(text.len());
        let caret_x = self.padding + 2 + measure.width(&text[..cursor]);
        let visible = self.width - self.padding * 2;
        let right_edge = self.scroll_x + visible - CARET_MARGIN;
        let left_edge = self.scroll_x + self.padding;

        if caret_x > right_edge {
            self.scroll_x = caret_x - visible + CARET_MARGIN;
        } else if caret_x < left_edge {
            self.scroll_x = caret_x - self.padding;
        }

        let max_scroll = (measure.width(text) - visible).max(0);
        self.scroll_x = self.scroll_x.clamp(0, max_scroll);
    }
}
