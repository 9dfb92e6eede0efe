//! Preedit composition: segments moving through Void → Guess → Selected →
//! Confirmed as the user types and picks candidates.
//!
//! Adapted from the teacher's `Composition`/`Segment` (confirmed: bool flag
//! over a byte range); the boolean is replaced by the full status
//! progression the pipeline needs to decide whether a segment can still be
//! re-segmented versus is locked in.

use std::ops::Range;

/// Where a segment sits in its selection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SegmentStatus {
    /// No candidates generated yet.
    Void,
    /// Candidates exist but none has been picked; the best guess is shown.
    Guess,
    /// The user has picked a candidate, but it can still be revised.
    Selected,
    /// Locked in; earlier segments can no longer be re-segmented past it.
    Confirmed,
}

/// A segment in the preedit composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Byte range in the preedit text.
    pub range: Range<usize>,
    pub status: SegmentStatus,
    /// Index of the candidate currently selected for this segment, if any.
    pub selected_index: Option<usize>,
}

impl Segment {
    pub fn new(range: Range<usize>) -> Self {
        Self {
            range,
            status: SegmentStatus::Void,
            selected_index: None,
        }
    }

    pub fn confirmed(&self) -> bool {
        self.status == SegmentStatus::Confirmed
    }

    pub fn select(&mut self, index: usize) {
        self.selected_index = Some(index);
        self.status = SegmentStatus::Selected;
    }

    pub fn confirm(&mut self) {
        self.status = SegmentStatus::Confirmed;
    }

    pub fn reopen(&mut self) {
        if self.status == SegmentStatus::Confirmed {
            self.status = SegmentStatus::Selected;
        }
    }
}

/// Preedit composition for display: the converted text plus segment
/// boundaries and cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub preedit: String,
    pub cursor: usize,
    pub segments: Vec<Segment>,
}

impl Composition {
    pub fn new() -> Self {
        Self {
            preedit: String::new(),
            cursor: 0,
            segments: Vec::new(),
        }
    }

    pub fn from_text(text: String) -> Self {
        let cursor = text.len();
        Self {
            preedit: text,
            cursor,
            segments: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.preedit.is_empty()
    }

    pub fn clear(&mut self) {
        self.preedit.clear();
        self.cursor = 0;
        self.segments.clear();
    }

    pub fn len(&self) -> usize {
        self.preedit.len()
    }

    pub fn set_text(&mut self, text: String) {
        self.preedit = text;
        self.cursor = self.preedit.len();
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        if cursor <= self.preedit.len() {
            self.cursor = cursor;
        }
    }

    pub fn add_segment(&mut self, range: Range<usize>) {
        self.segments.push(Segment::new(range));
    }

    pub fn segment_at_cursor(&self) -> Option<&Segment> {
        self.segments.iter().find(|seg| seg.range.contains(&self.cursor))
    }

    pub fn segment_at_cursor_mut(&mut self) -> Option<&mut Segment> {
        let cursor = self.cursor;
        self.segments.iter_mut().find(|seg| seg.range.contains(&cursor))
    }

    /// The last segment not yet confirmed, i.e. the one still open to
    /// re-segmentation (spec's "reopen previous segment" operates on this).
    pub fn last_open_segment_mut(&mut self) -> Option<&mut Segment> {
        self.segments.iter_mut().rev().find(|seg| !seg.confirmed())
    }

    pub fn confirm_all(&mut self) {
        for seg in &mut self.segments {
            seg.confirm();
        }
    }

    pub fn segment_text(&self, segment: &Segment) -> &str {
        &self.preedit[segment.range.clone()]
    }

    /// True once every segment is confirmed and none are left void/guess.
    pub fn fully_confirmed(&self) -> bool {
        !self.segments.is_empty() && self.segments.iter().all(|s| s.confirmed())
    }
}

impl Default for Composition {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_progresses_through_lifecycle() {
        let mut seg = Segment::new(0..2);
        assert_eq!(seg.status, SegmentStatus::Void);
        seg.select(0);
        assert_eq!(seg.status, SegmentStatus::Selected);
        seg.confirm();
        assert!(seg.confirmed());
        seg.reopen();
        assert_eq!(seg.status, SegmentStatus::Selected);
    }

    #[test]
    fn fully_confirmed_requires_every_segment() {
        let mut comp = Composition::from_text("nihao".to_string());
        comp.add_segment(0..2);
        comp.add_segment(2..5);
        assert!(!comp.fully_confirmed());
        comp.confirm_all();
        assert!(comp.fully_confirmed());
    }
}
