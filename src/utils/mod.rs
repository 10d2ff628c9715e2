//!
//! Shared scanning utilities used by the rules.

pub mod lexical;
pub mod line_index;
pub mod masking;
pub mod tag_scanner;

pub use line_index::LineIndex;
pub use masking::mask_non_markup_regions;
pub use tag_scanner::{TagEvent, TagKind, VOID_ELEMENTS, is_void_element, scan_tags};
