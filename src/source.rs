//! Source text, positions and excerpt rendering.
//!
//! A [`SourceTable`] owns the raw text of one compilation unit and answers the
//! questions diagnostics need: which line and column a byte offset falls on,
//! and what that line looks like. [`SourceSegment`] is the (position, length)
//! value type every token, node and diagnostic carries.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::path::Path;
use std::sync::Arc;

use miette::{NamedSource, SourceSpan};
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

use crate::diagnostics::Diagnostic;

/// Default number of columns a tab expands to when rendering excerpts.
pub const DEFAULT_TAB_WIDTH: usize = 4;

// ============================================================================
// SOURCE SEGMENT
// ============================================================================

/// A contiguous span of source text, measured in bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceSegment {
    pub position: usize,
    pub length: usize,
}

impl SourceSegment {
    pub const fn new(position: usize, length: usize) -> Self {
        Self { position, length }
    }

    /// A zero-length segment anchored at `position`.
    pub const fn empty_at(position: usize) -> Self {
        Self::new(position, 0)
    }

    /// Byte offset one past the last byte of the segment.
    pub const fn end(&self) -> usize {
        self.position + self.length
    }

    /// The zero-length segment immediately past the end of this one.
    ///
    /// Used to anchor "expected X after Y" diagnostics.
    pub const fn after(&self) -> Self {
        Self::empty_at(self.end())
    }

    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.position && offset < self.end()
    }
}

impl BitOr for SourceSegment {
    type Output = SourceSegment;

    /// The smallest segment covering both operands, in either order.
    fn bitor(self, rhs: Self) -> Self::Output {
        let start = self.position.min(rhs.position);
        let end = self.end().max(rhs.end());
        SourceSegment::new(start, end - start)
    }
}

impl BitOrAssign for SourceSegment {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

impl From<SourceSegment> for SourceSpan {
    fn from(segment: SourceSegment) -> Self {
        (segment.position, segment.length).into()
    }
}

impl fmt::Display for SourceSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.position, self.end())
    }
}

// ============================================================================
// SOURCE TABLE
// ============================================================================

/// One-based row and column of a byte offset.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Coords {
    pub row: usize,
    pub col: usize,
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

/// The text of one compilation unit plus a sorted index of its line starts.
#[derive(Debug)]
pub struct SourceTable {
    name: String,
    line_starts: Vec<usize>,
    /// Holds the text itself, shared with every diagnostic.
    named: Arc<NamedSource<String>>,
}

impl SourceTable {
    /// Builds a table over in-memory text. `name` is what diagnostics print
    /// as the file path.
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let name = name.into();
        let text = text.into();

        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(index, _)| index + 1));

        let named = Arc::new(NamedSource::new(name.clone(), text));
        Self {
            name,
            line_starts,
            named,
        }
    }

    /// Reads a source file from disk.
    pub fn load(path: &Path) -> Result<Self, Diagnostic> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Diagnostic::io(format!("could not read '{}': {}", path.display(), e))
        })?;
        Ok(Self::from_text(path.display().to_string(), text))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        self.named.inner()
    }

    pub fn len(&self) -> usize {
        self.text().len()
    }

    pub fn is_empty(&self) -> bool {
        self.text().is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// The source as a miette `NamedSource`, shared with every diagnostic
    /// pointing into this table.
    pub fn named_source(&self) -> Arc<NamedSource<String>> {
        Arc::clone(&self.named)
    }

    pub(crate) fn source_code(&self) -> &NamedSource<String> {
        &self.named
    }

    /// Returns the one-based row and column of `offset`.
    ///
    /// Offsets at or past the end of the text clamp to the final line, with
    /// the column one past its last character.
    pub fn coords_of(&self, offset: usize) -> Coords {
        if offset >= self.text().len() {
            let last = self.line_starts[self.line_starts.len() - 1];
            return Coords {
                row: self.line_starts.len(),
                col: self.text().len() - last + 1,
            };
        }

        // line_starts[0] == 0 <= offset, so Err(0) cannot happen
        let index = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(insert_at) => insert_at - 1,
        };
        Coords {
            row: index + 1,
            col: offset - self.line_starts[index] + 1,
        }
    }

    /// Text of the one-based `row`, without its line terminator.
    pub fn line_text(&self, row: usize) -> &str {
        if row == 0 || row > self.line_starts.len() {
            return "";
        }
        let start = self.line_starts[row - 1];
        let end = match self.line_starts.get(row) {
            Some(next) => next - 1,
            None => self.text().len(),
        };
        let line = &self.text()[start..end];
        line.strip_suffix('\r').unwrap_or(line)
    }

    /// Renders the two-line caret excerpt for `segment`:
    ///
    /// ```text
    ///  10 | this.value++;
    ///     |      ^~~~~
    /// ```
    ///
    /// Leading whitespace is dropped and tabs are expanded so the caret still
    /// lines up with the offending text.
    pub fn render_excerpt(&self, segment: SourceSegment, tab_width: usize) -> String {
        let coords = self.coords_of(segment.position);
        let raw = self.line_text(coords.row);

        let trimmed = raw.trim_start();
        let indent = raw.len() - trimmed.len();
        let line = trimmed.trim_end();

        let col = (coords.col - 1).saturating_sub(indent).min(line.len());
        let col = floor_char_boundary(line, col);
        let end = floor_char_boundary(line, (col + segment.length).min(line.len()));

        let prefix_width = display_width(&line[..col], tab_width);
        let span_width = display_width(&line[col..end], tab_width).max(1);

        let row = coords.row.to_string();
        let mut out = String::new();
        out.push(' ');
        out.push_str(&row);
        out.push_str(" | ");
        out.push_str(&expand_tabs(line, tab_width));
        out.push('\n');
        out.push_str(&" ".repeat(row.len() + 2));
        out.push_str("| ");
        out.push_str(&" ".repeat(prefix_width));
        out.push('^');
        out.push_str(&"~".repeat(span_width - 1));
        out
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn display_width(text: &str, tab_width: usize) -> usize {
    text.chars()
        .map(|c| match c {
            '\t' => tab_width,
            c => c.width().unwrap_or(0),
        })
        .sum()
}

fn expand_tabs(text: &str, tab_width: usize) -> String {
    text.replace('\t', &" ".repeat(tab_width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_is_order_independent() {
        let a = SourceSegment::new(4, 2);
        let b = SourceSegment::new(10, 3);
        assert_eq!(a | b, SourceSegment::new(4, 9));
        assert_eq!(b | a, SourceSegment::new(4, 9));
    }

    #[test]
    fn after_is_zero_length_past_end() {
        let seg = SourceSegment::new(3, 5);
        assert_eq!(seg.after(), SourceSegment::new(8, 0));
        assert!(seg.after().is_empty());
    }

    #[test]
    fn text_lives_in_the_named_source() {
        let table = SourceTable::from_text("t", "ab\ncd");
        let named = table.named_source();
        assert_eq!(table.text(), "ab\ncd");
        assert!(std::ptr::eq(table.text(), named.inner().as_str()));
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn coords_on_line_boundaries() {
        let table = SourceTable::from_text("t", "ab\ncd\n\nef");
        assert_eq!(table.coords_of(0), Coords { row: 1, col: 1 });
        assert_eq!(table.coords_of(2), Coords { row: 1, col: 3 });
        assert_eq!(table.coords_of(3), Coords { row: 2, col: 1 });
        assert_eq!(table.coords_of(6), Coords { row: 3, col: 1 });
        assert_eq!(table.coords_of(8), Coords { row: 4, col: 2 });
    }

    #[test]
    fn coords_past_end_clamp_to_last_line() {
        let table = SourceTable::from_text("t", "ab\ncde");
        assert_eq!(table.coords_of(6), Coords { row: 2, col: 4 });
        assert_eq!(table.coords_of(100), Coords { row: 2, col: 4 });
    }

    #[test]
    fn line_text_strips_terminators() {
        let table = SourceTable::from_text("t", "first\r\nsecond\n");
        assert_eq!(table.line_text(1), "first");
        assert_eq!(table.line_text(2), "second");
        assert_eq!(table.line_text(3), "");
        assert_eq!(table.line_text(0), "");
        assert_eq!(table.line_text(9), "");
    }

    #[test]
    fn excerpt_normalizes_indentation_and_tabs() {
        let table = SourceTable::from_text("t", "\t\tfoo\tbar;");
        // "bar" starts at byte 6
        let excerpt = table.render_excerpt(SourceSegment::new(6, 3), 4);
        let lines: Vec<&str> = excerpt.lines().collect();
        assert_eq!(lines[0], " 1 | foo    bar;");
        assert_eq!(lines[1], "   |        ^~~");
    }

    #[test]
    fn excerpt_for_zero_length_segment_has_one_caret() {
        let table = SourceTable::from_text("t", "type X as");
        let excerpt = table.render_excerpt(SourceSegment::empty_at(9), 4);
        assert!(excerpt.ends_with("|          ^"));
    }
}
