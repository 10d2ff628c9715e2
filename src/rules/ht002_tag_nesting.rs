//!
//! Rule HT002: Tags must be properly nested and closed
//!
//! Folds the tag event stream over an explicit stack of open elements. A
//! closing tag that matches an element deeper in the stack implicitly closes
//! everything opened after it, reporting each of those as unclosed. This keeps
//! one misplaced tag from cascading into errors for the rest of the document.

use crate::lint_context::LintContext;
use crate::rule::Rule;
use crate::types::{Category, Diagnostic};
use crate::utils::tag_scanner::{TagEvent, TagKind, is_void_element};

/// An element that has been opened and not yet closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTagFrame {
    pub name: String,
    pub line: usize,
    pub column: usize,
    /// Character length of the open tag
    pub length: usize,
}

/// Stack machine that consumes tag events and reports nesting errors
pub struct NestingValidator<'c, 'a> {
    ctx: &'c LintContext<'a>,
    stack: Vec<OpenTagFrame>,
    diagnostics: Vec<Diagnostic>,
}

impl<'c, 'a> NestingValidator<'c, 'a> {
    pub fn new(ctx: &'c LintContext<'a>) -> Self {
        Self {
            ctx,
            stack: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Currently open elements, outermost first
    pub fn open_frames(&self) -> &[OpenTagFrame] {
        &self.stack
    }

    pub fn feed(&mut self, event: &TagEvent<'_>) {
        let (line, column) = self.ctx.offset_to_line_col(event.offset);
        let length = self.ctx.span_len(event.offset, event.end());

        match event.kind {
            TagKind::Open => {
                if !event.self_closing {
                    self.stack.push(OpenTagFrame {
                        name: event.name.clone(),
                        line,
                        column,
                        length,
                    });
                }
            }
            TagKind::Close => self.close(&event.name, line, column, length),
        }
    }

    fn close(&mut self, name: &str, line: usize, column: usize, length: usize) {
        if is_void_element(name) {
            self.diagnostics.push(Diagnostic::new(
                Category::VoidElementMisuse,
                line,
                column,
                length,
                format!("Void element <{name}> must not have a closing tag"),
            ));
            return;
        }

        let Some(top) = self.stack.last() else {
            self.diagnostics.push(Diagnostic::new(
                Category::UnexpectedClosing,
                line,
                column,
                length,
                format!("Unexpected closing </{name}>"),
            ));
            return;
        };

        if top.name == name {
            self.stack.pop();
            return;
        }

        match self.stack.iter().rposition(|frame| frame.name == name) {
            Some(idx) => {
                for unclosed in self.stack.drain(idx..).skip(1).rev() {
                    self.diagnostics.push(Diagnostic::new(
                        Category::UnclosedTag,
                        unclosed.line,
                        unclosed.column,
                        unclosed.length,
                        format!("Unclosed <{}> before </{name}>", unclosed.name),
                    ));
                }
            }
            None => {
                self.diagnostics.push(Diagnostic::new(
                    Category::MismatchedClosing,
                    line,
                    column,
                    length,
                    format!("Closing </{name}> does not match any open tag"),
                ));
            }
        }
    }

    /// End of input: every frame still open is unclosed
    pub fn finish(mut self) -> Vec<Diagnostic> {
        for unclosed in std::mem::take(&mut self.stack) {
            if is_void_element(&unclosed.name) {
                continue;
            }
            self.diagnostics.push(Diagnostic::new(
                Category::UnclosedTag,
                unclosed.line,
                unclosed.column,
                unclosed.length,
                format!("Unclosed <{}> tag", unclosed.name),
            ));
        }
        self.diagnostics
    }
}

#[derive(Debug, Clone, Default)]
pub struct HT002TagNesting;

impl Rule for HT002TagNesting {
    fn name(&self) -> &'static str {
        "HT002"
    }

    fn description(&self) -> &'static str {
        "Tags should be properly nested and closed"
    }

    fn categories(&self) -> &'static [Category] {
        &[
            Category::UnexpectedClosing,
            Category::MismatchedClosing,
            Category::UnclosedTag,
            Category::VoidElementMisuse,
        ]
    }

    fn explanation(&self) -> Option<&'static str> {
        Some(
            "Every element opened must be closed in reverse order. Void elements such as <br> and <img> \
             must not have a closing tag. When a closing tag matches an element opened further out, the \
             elements opened after it are reported as unclosed and the outer element is treated as closed.",
        )
    }

    fn check(&self, ctx: &LintContext) -> Vec<Diagnostic> {
        let mut validator = NestingValidator::new(ctx);
        for event in ctx.tags() {
            validator.feed(&event);
        }
        validator.finish()
    }

    fn from_config(_config: &crate::config::Config) -> Box<dyn Rule>
    where
        Self: Sized,
    {
        Box::new(HT002TagNesting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(content: &str) -> Vec<Diagnostic> {
        let ctx = LintContext::new(content);
        HT002TagNesting.check(&ctx)
    }

    fn categories(result: &[Diagnostic]) -> Vec<Category> {
        result.iter().map(|d| d.category).collect()
    }

    #[test]
    fn test_well_nested() {
        assert!(check("<html><body><p>Hi<br><img src=\"a\"/></p></body></html>").is_empty());
    }

    #[test]
    fn test_unclosed_at_end() {
        let result = check("<div>\n  <p>text");
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].message, "Unclosed <div> tag");
        assert_eq!(result[1].line, 2);
        assert_eq!(result[1].column, 3);
        assert_eq!(result[1].length, 3);
    }

    #[test]
    fn test_unexpected_closing_on_empty_stack() {
        let result = check("</div>");
        assert_eq!(categories(&result), vec![Category::UnexpectedClosing]);
        assert_eq!(result[0].message, "Unexpected closing </div>");
    }

    #[test]
    fn test_mismatched_closing_leaves_stack() {
        let result = check("<div></span></div>");
        assert_eq!(categories(&result), vec![Category::MismatchedClosing]);
    }

    #[test]
    fn test_collapse_reports_frames_above_match() {
        let result = check("<div><span><b>x</div>");
        assert_eq!(categories(&result), vec![Category::UnclosedTag, Category::UnclosedTag]);
        assert_eq!(result[0].message, "Unclosed <b> before </div>");
        assert_eq!(result[1].message, "Unclosed <span> before </div>");
    }

    #[test]
    fn test_collapse_pops_matched_frame() {
        let ctx = LintContext::new("<section><div><span></div>");
        let mut validator = NestingValidator::new(&ctx);
        for event in ctx.tags() {
            validator.feed(&event);
        }
        let names: Vec<_> = validator.open_frames().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["section"]);
    }

    #[test]
    fn test_collapse_matches_innermost_duplicate() {
        let result = check("<div><div><p></div></div>");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].message, "Unclosed <p> before </div>");
    }

    #[test]
    fn test_void_closing_tag() {
        let result = check("<img src=\"x.png\"></img>");
        assert_eq!(categories(&result), vec![Category::VoidElementMisuse]);
        assert_eq!(result[0].column, 18);
    }

    #[test]
    fn test_void_closing_on_empty_stack_is_misuse_not_unexpected() {
        let result = check("</br>");
        assert_eq!(categories(&result), vec![Category::VoidElementMisuse]);
    }

    #[test]
    fn test_explicit_self_closing_not_pushed() {
        assert!(check("<div><custom-el/></div>").is_empty());
    }

    #[test]
    fn test_case_insensitive_names() {
        assert!(check("<DIV><P></p></Div>").is_empty());
    }

    #[test]
    fn test_script_body_ignored() {
        assert!(check("<script>document.write(\"<div>\");</script>").is_empty());
    }

    #[test]
    fn test_comment_ignored() {
        assert!(check("<!-- <div> -->\n<p></p>").is_empty());
    }
}
