//! Offset-to-line mapping shared by every location-reporting check.

/// Maps each byte offset of a document to its 1-based line number.
///
/// Lines are separated by `\n` only; `\r` is an ordinary character. The
/// per-offset table is built once in O(n) so every lookup is O(1).
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    content: &'a str,
    lines: Vec<usize>,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(content: &'a str) -> Self {
        let mut lines = Vec::with_capacity(content.len());
        let mut line_starts = vec![0];
        let mut line = 1;

        for (i, byte) in content.bytes().enumerate() {
            lines.push(line);
            if byte == b'\n' {
                line += 1;
                line_starts.push(i + 1);
            }
        }

        Self {
            content,
            lines,
            line_starts,
        }
    }

    /// Number of offsets covered (equals the document length in bytes)
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The raw per-offset table
    pub fn as_slice(&self) -> &[usize] {
        &self.lines
    }

    /// 1-based line containing `offset`. Offsets past the end clamp to the
    /// last offset; an empty document reports line 1.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.lines.last() {
            None => 1,
            Some(&last) => self.lines.get(offset).copied().unwrap_or(last),
        }
    }

    /// Byte offset where the given 1-based line starts
    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts
            .get(line.saturating_sub(1))
            .copied()
            .unwrap_or(self.content.len())
    }

    /// Number of lines in the document
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Map a byte offset to a 1-based (line, character column) pair
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.content.len());
        let line = if offset == self.content.len() && self.content.ends_with('\n') {
            self.line_starts.len()
        } else {
            self.line_of(offset)
        };
        let start = self.line_start(line).min(offset);
        let column = self
            .content
            .get(start..offset)
            .map_or(offset - start, |prefix| prefix.chars().count())
            + 1;
        (line, column)
    }
}

/// Character length of `content[start..end]`, falling back to the byte length
/// when the range does not sit on character boundaries.
pub fn char_len(content: &str, start: usize, end: usize) -> usize {
    content
        .get(start..end)
        .map_or(end.saturating_sub(start), |s| s.chars().count())
}
