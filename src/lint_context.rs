use crate::utils::line_index::{LineIndex, char_len};
use crate::utils::masking::mask_non_markup_regions;
use crate::utils::tag_scanner::{TagEvent, scan_tags};

/// Pre-computed information about a physical line of the original text
#[derive(Debug, Clone)]
pub struct LineInfo {
    /// Byte offset where this line starts in the document
    pub byte_offset: usize,
    /// Length of the line in bytes (without the `\n`)
    pub byte_len: usize,
    /// Whether the line is blank (empty or only whitespace)
    pub is_blank: bool,
}

impl LineInfo {
    /// Get the line content as a string slice from the source document
    pub fn content<'a>(&self, source: &'a str) -> &'a str {
        &source[self.byte_offset..self.byte_offset + self.byte_len]
    }
}

/// Everything the rules need about one document, computed once per analysis.
///
/// The original text is never modified. `masked` is an offset-aligned copy
/// with comments and raw-text bodies blanked out.
pub struct LintContext<'a> {
    pub content: &'a str,
    pub masked: String,
    pub lines: Vec<LineInfo>,
    pub line_index: LineIndex<'a>,
}

impl<'a> LintContext<'a> {
    pub fn new(content: &'a str) -> Self {
        let line_index = LineIndex::new(content);
        let masked = mask_non_markup_regions(content);
        let lines = Self::compute_line_info(content);

        Self {
            content,
            masked,
            lines,
            line_index,
        }
    }

    fn compute_line_info(content: &str) -> Vec<LineInfo> {
        let mut lines = Vec::new();
        let mut offset = 0;

        for line in content.split('\n') {
            lines.push(LineInfo {
                byte_offset: offset,
                byte_len: line.len(),
                is_blank: line.trim().is_empty(),
            });
            offset += line.len() + 1;
        }

        lines
    }

    /// Tag events over the masked text, in source order
    pub fn tags(&self) -> impl Iterator<Item = TagEvent<'_>> {
        scan_tags(&self.masked)
    }

    /// Map a byte offset to a 1-based (line, column)
    pub fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        self.line_index.line_col(offset)
    }

    /// Character length of a byte range of the original text
    pub fn span_len(&self, start: usize, end: usize) -> usize {
        char_len(self.content, start, end)
    }

    /// Get line information by line number (1-indexed)
    pub fn line_info(&self, line_num: usize) -> Option<&LineInfo> {
        if line_num > 0 {
            self.lines.get(line_num - 1)
        } else {
            None
        }
    }

    /// Iterate lines as (1-based line number, line text)
    pub fn numbered_lines(&self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .map(|(idx, info)| (idx + 1, info.content(self.content)))
    }
}
