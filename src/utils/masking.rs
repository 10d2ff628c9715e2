//! Masking of regions that are not literal markup.
//!
//! Comments and the bodies of `<script>`/`<style>` elements are overwritten
//! with whitespace so that the tag scanner never sees their content. Every
//! byte keeps its position: the masked text has exactly the same length as
//! the input and is identical outside masked regions.

use std::ops::Range;

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Elements whose body is raw text rather than markup
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Replace comments, `<script>` bodies and `<style>` bodies with spaces.
///
/// A region without a closing delimiter runs to the end of the text.
/// Newlines inside masked regions are kept so the masked text stays readable
/// line by line.
pub fn mask_non_markup_regions(content: &str) -> String {
    let mut masked = content.to_string();

    let comments = find_comment_ranges(&masked);
    masked = mask_ranges(&masked, &comments);

    for element in RAW_TEXT_ELEMENTS {
        let bodies = find_raw_text_bodies(&masked, element);
        masked = mask_ranges(&masked, &bodies);
    }

    debug_assert_eq!(masked.len(), content.len(), "masking must preserve length");
    masked
}

/// Byte ranges of `<!-- ... -->` comments, delimiters included
pub fn find_comment_ranges(content: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut pos = 0;

    while let Some(rel_start) = content[pos..].find(COMMENT_OPEN) {
        let start = pos + rel_start;
        let body_start = start + COMMENT_OPEN.len();
        let end = match content[body_start..].find(COMMENT_CLOSE) {
            Some(rel_end) => body_start + rel_end + COMMENT_CLOSE.len(),
            None => content.len(),
        };
        ranges.push(start..end);
        pos = end;
    }

    ranges
}

/// Byte ranges of the bodies of every `<name ...>...</name>` element.
///
/// Matching of the tag name is ASCII case-insensitive. The open and close
/// tags themselves are not part of the returned ranges.
pub fn find_raw_text_bodies(content: &str, name: &str) -> Vec<Range<usize>> {
    // ASCII lowercasing keeps byte offsets aligned with `content`
    let lower = content.to_ascii_lowercase();
    let open_pattern = format!("<{name}");
    let close_pattern = format!("</{name}");
    let mut ranges = Vec::new();
    let mut pos = 0;

    while let Some(rel_start) = lower[pos..].find(&open_pattern) {
        let name_end = pos + rel_start + open_pattern.len();

        // `<scripts>` or `<stylesheet>` are not raw-text elements
        let boundary = lower[name_end..].chars().next();
        if !matches!(boundary, Some(c) if c == '>' || c == '/' || c.is_whitespace()) {
            pos = name_end;
            continue;
        }

        let Some(rel_gt) = lower[name_end..].find('>') else {
            break;
        };
        let body_start = name_end + rel_gt + 1;

        let body_end = lower[body_start..]
            .find(&close_pattern)
            .map_or(content.len(), |rel_end| body_start + rel_end);

        if body_end > body_start {
            ranges.push(body_start..body_end);
        }
        pos = body_end;
    }

    ranges
}

/// Overwrite each range with spaces, keeping newlines and the byte length
fn mask_ranges(content: &str, ranges: &[Range<usize>]) -> String {
    if ranges.is_empty() {
        return content.to_string();
    }

    let mut out = String::with_capacity(content.len());
    let mut last = 0;

    for range in ranges {
        out.push_str(&content[last..range.start]);
        for ch in content[range.clone()].chars() {
            if ch == '\n' {
                out.push('\n');
            } else {
                out.extend(std::iter::repeat_n(' ', ch.len_utf8()));
            }
        }
        last = range.end;
    }
    out.push_str(&content[last..]);

    out
}
