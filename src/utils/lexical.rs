//! Helpers shared by the per-line lexical rules

/// 1-based character column of a byte index within a line
pub fn char_column(line: &str, byte_idx: usize) -> usize {
    line[..byte_idx.min(line.len())].chars().count() + 1
}

/// Count occurrences of `quote` that are not preceded by a backslash
pub fn count_unescaped(span: &str, quote: char) -> usize {
    let mut count = 0;
    let mut prev = None;
    for c in span.chars() {
        if c == quote && prev != Some('\\') {
            count += 1;
        }
        prev = Some(c);
    }
    count
}

/// True when either `"` or `'` occurs an odd number of times, ignoring escaped quotes
pub fn has_unbalanced_quotes(span: &str) -> bool {
    count_unescaped(span, '"') % 2 != 0 || count_unescaped(span, '\'') % 2 != 0
}
