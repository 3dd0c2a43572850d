// Tailview - core/buffer.rs
//
// The log buffer: an ordered, size-bounded collection of rendered line
// entries with FIFO eviction, a single "current tail" marker, and the
// sticky auto-scroll model.
//
// The buffer owns no DOM and no widgets — the log-view panel renders it
// declaratively each frame and reports the observed scroll geometry back,
// which is what the append path consults to decide whether to follow.

use crate::core::markup;
use crate::core::model::Severity;
use crate::util::constants::SCROLL_STICKY_THRESHOLD_PX;
use std::collections::VecDeque;

// =============================================================================
// Entries
// =============================================================================

/// A single rendered log line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// The line as received, minus one trailing newline.
    pub raw: String,

    /// Escaped markup form with the severity badge inserted. This is what
    /// the rendered-log export writes out.
    pub markup: String,

    /// Derived severity, if the line carried a `.<LEVEL>: ` marker.
    pub severity: Option<Severity>,

    /// Whether this is the current (most recently appended) entry.
    /// At most one entry in the buffer has this set.
    pub current: bool,
}

// =============================================================================
// Scroll geometry
// =============================================================================

/// Scroll geometry of the log view, reported by the panel each frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    /// Current vertical scroll offset in pixels.
    pub offset: f32,

    /// Visible viewport height in pixels.
    pub viewport: f32,

    /// Total content height in pixels.
    pub content: f32,
}

impl ScrollState {
    /// Whether the view is at (or within the sticky threshold of) the
    /// bottom. Mirrors `|scrollTop - (scrollHeight - offsetHeight)| < 50`.
    pub fn at_bottom(&self) -> bool {
        (self.offset - (self.content - self.viewport)).abs() < SCROLL_STICKY_THRESHOLD_PX
    }
}

// =============================================================================
// LogBuffer
// =============================================================================

/// Ordered, capacity-bounded sequence of log entries.
#[derive(Debug)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,

    /// Maximum number of retained entries. 0 means unbounded: no eviction
    /// ever occurs.
    capacity: usize,

    /// Display-only line-wrap mode. Stored entries are unaffected.
    wrap: bool,

    /// Scroll geometry observed on the most recent rendered frame.
    scroll: ScrollState,

    /// Set when an append happened while the view was at the bottom; the
    /// panel consumes it and scrolls to the end.
    scroll_to_bottom: bool,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            wrap: false,
            scroll: ScrollState::default(),
            scroll_to_bottom: false,
        }
    }

    /// Append one line of stream output.
    ///
    /// The line is entity-escaped, stripped of a single trailing newline,
    /// classified, and badge-annotated. The oldest entries are evicted to
    /// respect the capacity, the `current` flag moves to the new entry,
    /// and auto-scroll is requested iff the view was already at-or-near
    /// the bottom before this append.
    pub fn append(&mut self, text: &str) {
        let follow = self.scroll.at_bottom();

        let escaped = markup::escape_markup(text);
        let line = escaped.strip_suffix('\n').unwrap_or(&escaped);
        let severity = Severity::classify(line);
        let annotated = markup::annotate_line(line, severity);

        if let Some(last) = self.entries.back_mut() {
            last.current = false;
        }
        self.entries.push_back(LogEntry {
            raw: text.strip_suffix('\n').unwrap_or(text).to_string(),
            markup: annotated,
            severity,
            current: true,
        });
        self.evict();

        if follow {
            self.scroll_to_bottom = true;
        }
    }

    /// Empty the buffer. The view renders nothing afterwards.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.scroll_to_bottom = false;
    }

    /// Change the capacity, re-applying eviction immediately.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.evict();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Toggle display-only line wrapping.
    pub fn set_wrap(&mut self, wrap: bool) {
        self.wrap = wrap;
    }

    pub fn wrap(&self) -> bool {
        self.wrap
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Record the scroll geometry the panel observed this frame.
    pub fn update_scroll(&mut self, scroll: ScrollState) {
        self.scroll = scroll;
    }

    /// Consume a pending auto-scroll request, if one was raised by an
    /// append since the last frame.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_bottom)
    }

    fn evict(&mut self) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(crate::util::constants::DEFAULT_HISTORY_LINES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_lines(buffer: &LogBuffer) -> Vec<&str> {
        buffer.iter().map(|e| e.raw.as_str()).collect()
    }

    #[test]
    fn length_never_exceeds_capacity_and_eviction_is_fifo() {
        let mut buffer = LogBuffer::new(3);
        for i in 0..10 {
            buffer.append(&format!("line {i}"));
            assert!(buffer.len() <= 3);
        }
        assert_eq!(raw_lines(&buffer), ["line 7", "line 8", "line 9"]);
    }

    #[test]
    fn capacity_zero_grows_without_eviction() {
        let mut buffer = LogBuffer::new(0);
        for i in 0..500 {
            buffer.append(&format!("line {i}"));
        }
        assert_eq!(buffer.len(), 500);
        assert_eq!(buffer.iter().next().map(|e| e.raw.as_str()), Some("line 0"));
    }

    #[test]
    fn exactly_one_entry_is_current_after_each_append() {
        let mut buffer = LogBuffer::new(10);
        for i in 0..5 {
            buffer.append(&format!("line {i}"));
            let current: Vec<_> = buffer.iter().filter(|e| e.current).collect();
            assert_eq!(current.len(), 1);
            assert_eq!(current[0].raw, format!("line {i}"));
        }
    }

    #[test]
    fn clear_empties_the_buffer() {
        let mut buffer = LogBuffer::new(10);
        buffer.append("one");
        buffer.append("two");
        buffer.clear();
        assert_eq!(buffer.len(), 0);
        assert!(buffer.iter().next().is_none());
    }

    #[test]
    fn shrinking_capacity_re_applies_eviction() {
        let mut buffer = LogBuffer::new(0);
        for i in 0..10 {
            buffer.append(&format!("line {i}"));
        }
        buffer.set_capacity(4);
        assert_eq!(
            raw_lines(&buffer),
            ["line 6", "line 7", "line 8", "line 9"]
        );
        // The newest entry survives the trim and stays current.
        assert!(buffer.iter().last().is_some_and(|e| e.current));
    }

    #[test]
    fn auto_scroll_requested_only_when_view_was_near_bottom() {
        let mut buffer = LogBuffer::new(10);

        // 400 px of content in a 100 px viewport, scrolled to the top:
        // 260 px from the bottom, well outside the 50 px threshold.
        buffer.update_scroll(ScrollState {
            offset: 40.0,
            viewport: 100.0,
            content: 400.0,
        });
        buffer.append("while scrolled up");
        assert!(!buffer.take_scroll_request());

        // 20 px from the bottom: inside the threshold.
        buffer.update_scroll(ScrollState {
            offset: 280.0,
            viewport: 100.0,
            content: 400.0,
        });
        buffer.append("while at bottom");
        assert!(buffer.take_scroll_request());
        // The request is consumed.
        assert!(!buffer.take_scroll_request());
    }

    #[test]
    fn append_escapes_strips_newline_and_annotates() {
        let mut buffer = LogBuffer::new(10);
        buffer.append("<script>\n");
        let entry = buffer.iter().next().unwrap();
        assert_eq!(entry.markup, "&lt;script&gt;");
        assert_eq!(entry.raw, "<script>");
        assert_eq!(entry.severity, None);

        buffer.append("2024 app.ERROR: disk full\n");
        let entry = buffer.iter().last().unwrap();
        assert_eq!(entry.severity, Some(Severity::Error));
        assert!(entry.markup.contains("badge-level-error"));
        assert!(!entry.markup.ends_with('\n'));
    }

    #[test]
    fn only_a_single_trailing_newline_is_stripped() {
        let mut buffer = LogBuffer::new(10);
        buffer.append("two newlines\n\n");
        assert_eq!(buffer.iter().next().unwrap().raw, "two newlines\n");
    }

    #[test]
    fn wrap_toggle_does_not_touch_entries() {
        let mut buffer = LogBuffer::new(10);
        buffer.append("a line");
        let before: Vec<LogEntry> = buffer.iter().cloned().collect();
        buffer.set_wrap(true);
        assert!(buffer.wrap());
        let after: Vec<LogEntry> = buffer.iter().cloned().collect();
        assert_eq!(before, after);
    }
}
