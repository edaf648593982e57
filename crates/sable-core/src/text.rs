//! Text primitives shared by every layer: sizes, ranges and line/column conversion.

pub use text_size::{TextRange, TextSize};

/// Zero-based line and byte column.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

/// Line start offsets of one text snapshot.
///
/// `\n`, `\r\n` and a lone `\r` all terminate a line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineIndex {
    starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![TextSize::from(0)];
        let mut chars = text.char_indices().peekable();
        while let Some((idx, ch)) = chars.next() {
            let next_line = match ch {
                '\n' => idx + 1,
                '\r' => match chars.peek() {
                    Some((_, '\n')) => {
                        chars.next();
                        idx + 2
                    }
                    _ => idx + 1,
                },
                _ => continue,
            };
            starts.push(TextSize::from(next_line as u32));
        }

        Self {
            starts,
            len: TextSize::of(text),
        }
    }

    #[inline]
    pub fn line_count(&self) -> u32 {
        self.starts.len() as u32
    }

    #[inline]
    pub fn line_start(&self, line: u32) -> Option<TextSize> {
        self.starts.get(line as usize).copied()
    }

    /// Offsets past the end of the text are clamped to the end.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.len);
        let line = match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(insert) => insert.saturating_sub(1),
        };
        LineCol {
            line: line as u32,
            col: u32::from(offset - self.starts[line]),
        }
    }

    pub fn offset(&self, line_col: LineCol) -> Option<TextSize> {
        let start = self.line_start(line_col.line)?;
        let limit = self.line_start(line_col.line + 1).unwrap_or(self.len);
        let offset = start + TextSize::from(line_col.col);
        (offset <= limit).then_some(offset)
    }

    pub fn range_line_cols(&self, range: TextRange) -> (LineCol, LineCol) {
        (self.line_col(range.start()), self.line_col(range.end()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_handles_all_line_endings() {
        let text = "a\nbc\r\nd\re";
        let index = LineIndex::new(text);
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_col(TextSize::from(0)), LineCol { line: 0, col: 0 });
        assert_eq!(index.line_col(TextSize::from(3)), LineCol { line: 1, col: 1 });
        assert_eq!(index.line_col(TextSize::from(6)), LineCol { line: 2, col: 0 });
        assert_eq!(index.line_col(TextSize::from(8)), LineCol { line: 3, col: 0 });
    }

    #[test]
    fn offset_roundtrips_and_clamps() {
        let text = "one\ntwo\n";
        let index = LineIndex::new(text);
        let lc = index.line_col(TextSize::from(5));
        assert_eq!(index.offset(lc), Some(TextSize::from(5)));
        assert_eq!(index.line_col(TextSize::from(100)), LineCol { line: 2, col: 0 });
        assert_eq!(index.offset(LineCol { line: 7, col: 0 }), None);
    }
}
