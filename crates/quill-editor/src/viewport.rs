//! The visible window onto the compose rows.
//!
//! Scrolling moves the window, not the edit cursor. The offset is kept in
//! `0..=line_count - height` (or 0 when everything fits) by clamping after
//! every change to either side.

/// First visible row and number of visible rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    offset: usize,
    height: usize,
}

impl Viewport {
    #[must_use]
    pub const fn new(height: usize) -> Self {
        Self { offset: 0, height }
    }

    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Largest valid offset for `line_count` rows.
    #[must_use]
    pub const fn max_offset(&self, line_count: usize) -> usize {
        line_count.saturating_sub(self.height)
    }

    /// Visible row range for `line_count` rows.
    #[must_use]
    pub fn visible(&self, line_count: usize) -> std::ops::Range<usize> {
        let start = self.offset.min(line_count);
        start..(start + self.height).min(line_count)
    }

    pub fn scroll_up(&mut self, n: usize, line_count: usize) {
        self.offset = self.offset.saturating_sub(n);
        self.clamp(line_count);
    }

    pub fn scroll_down(&mut self, n: usize, line_count: usize) {
        self.offset = self.offset.saturating_add(n);
        self.clamp(line_count);
    }

    /// New height, with the offset re-clamped immediately.
    pub fn set_height(&mut self, height: usize, line_count: usize) {
        self.height = height;
        self.clamp(line_count);
    }

    pub fn clamp(&mut self, line_count: usize) {
        self.offset = self.offset.min(self.max_offset(line_count));
    }

    /// Scroll the least amount that brings `row` into view.
    pub fn reveal(&mut self, row: usize, line_count: usize) {
        if self.height == 0 {
            return;
        }
        if row < self.offset {
            self.offset = row;
        } else if row >= self.offset + self.height {
            self.offset = row + 1 - self.height;
        }
        self.clamp(line_count);
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
