//! Regex-driven tokenizer producing open/close tag events.

use regex::Regex;
use std::sync::LazyLock;

// The regex crate runs in linear time, so pathological input cannot cause
// catastrophic backtracking here. The name boundary is ASCII-only: `<aé>`
// opens an `a` tag.
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\s*(/)?\s*([a-zA-Z][a-zA-Z0-9:-]*)(?-u:\b)([^>]*)>").unwrap());

/// Elements that never have children or a closing tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
}

/// A single recognized tag occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEvent<'a> {
    pub kind: TagKind,
    /// Lowercased tag name
    pub name: String,
    /// Everything between the name and the closing `>`
    pub attrs_raw: &'a str,
    /// Byte offset of the `<`
    pub offset: usize,
    /// Byte length of the whole tag, `<` through `>`
    pub len: usize,
    /// Trailing `/>` or a void element name
    pub self_closing: bool,
}

impl TagEvent<'_> {
    pub fn is_closing(&self) -> bool {
        self.kind == TagKind::Close
    }

    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Scan (masked) text for tags in source order.
///
/// The iterator is lazy and forward-only; scanning again means calling this
/// function again.
pub fn scan_tags(text: &str) -> impl Iterator<Item = TagEvent<'_>> {
    TAG_PATTERN.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let name = caps.get(2)?.as_str().to_ascii_lowercase();
        let attrs_raw = caps.get(3).map_or("", |m| m.as_str());
        let kind = if caps.get(1).is_some() {
            TagKind::Close
        } else {
            TagKind::Open
        };
        let self_closing = whole.as_str().ends_with("/>") || is_void_element(&name);

        Some(TagEvent {
            kind,
            name,
            attrs_raw,
            offset: whole.start(),
            len: whole.len(),
            self_closing,
        })
    })
}
