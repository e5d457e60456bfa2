// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for the minifier.
//!
//! This module defines [`MinifyError`], the single error enum, and
//! [`SourceContext`] for rich error reporting with source snippets.
//!
//! # Error Categories
//!
//! - **Lex errors**: unterminated strings, long brackets and comments,
//!   malformed numbers, bytes the scanner cannot start a token from
//! - **Structure errors**: token sequences the scope walker cannot follow
//!   (a missing `end`, a `then` that never comes, a bad expression head)
//!
//! Every variant carries the 1-indexed line and column of the offending
//! position. There is no I/O and no retryable failure class: all errors
//! are local to a single `minify` call and the caller's input is left
//! untouched.

use std::fmt;
use thiserror::Error;

/// Source context for enhanced error messages.
///
/// Captures a snippet of source code around an error location,
/// enabling error messages with line numbers and a caret pointing
/// at the exact error column.
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// All lines from the source text.
    pub lines: Vec<String>,
    /// The line number where the error occurred (1-indexed).
    pub error_line: usize,
    /// The column number where the error occurred (1-indexed).
    pub error_column: usize,
    /// First line number of the snippet (1-indexed).
    pub snippet_start: usize,
    /// Last line number of the snippet (1-indexed).
    pub snippet_end: usize,
}

impl SourceContext {
    /// Creates a source context from source code and error location.
    ///
    /// Captures 3 lines before and after the error line for context.
    pub fn from_source(source: &str, line: usize, column: usize) -> Self {
        let lines: Vec<String> = source.lines().map(|l| l.to_string()).collect();
        let snippet_start = line.saturating_sub(3).max(1);
        let snippet_end = (line + 3).min(lines.len());

        Self {
            lines,
            error_line: line,
            error_column: column,
            snippet_start,
            snippet_end,
        }
    }

    /// Formats the source snippet with line numbers and error indicator.
    ///
    /// Returns a string like:
    /// ```text
    ///    4 | local s = "unterminated
    ///      |           ^
    ///    5 | return s
    /// ```
    pub fn format_snippet(&self) -> String {
        let mut result = String::new();

        for line_num in self.snippet_start..=self.snippet_end {
            if line_num > self.lines.len() {
                break;
            }

            let line = &self.lines[line_num - 1];
            let is_error_line = line_num == self.error_line;

            result.push_str(&format!("{:4} | {}\n", line_num, line));

            if is_error_line {
                result.push_str(&format!(
                    "     | {}^\n",
                    " ".repeat(self.error_column.saturating_sub(1))
                ));
            }
        }

        result
    }
}

impl fmt::Display for SourceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_snippet())
    }
}

/// Helper struct for displaying optional source context.
pub struct OptSourceContextDisplay<'a>(pub &'a Option<SourceContext>);

impl<'a> fmt::Display for OptSourceContextDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ctx) => write!(f, "{}", ctx),
            None => write!(f, ""),
        }
    }
}

/// Helper trait for formatting optional source context.
pub trait AsDisplay<'a> {
    /// Wraps self for Display formatting.
    fn as_display(&'a self) -> OptSourceContextDisplay<'a>;
}

impl<'a> AsDisplay<'a> for Option<SourceContext> {
    fn as_display(&'a self) -> OptSourceContextDisplay<'a> {
        OptSourceContextDisplay(self)
    }
}

/// The error type for minification.
///
/// All fallible functions in this crate return `Result<T, MinifyError>`.
/// On any error the input text is unusable as Lua and no output is
/// produced; the minifier never emits truncated or corrupted text.
#[derive(Error, Debug)]
pub enum MinifyError {
    /// The scanner hit a byte that cannot start any Lua token.
    #[error("unexpected symbol '{symbol}' at line {line}, column {column}\n{}", source_context.as_display())]
    UnexpectedSymbol {
        /// The offending character.
        symbol: char,
        /// Line number (1-indexed).
        line: usize,
        /// Column number (1-indexed).
        column: usize,
        /// Source context for rich error display.
        source_context: Option<SourceContext>,
    },

    /// A quoted string reached a raw newline or end of input unclosed.
    #[error("unterminated string at line {line}, column {column}\n{}", source_context.as_display())]
    UnterminatedString {
        /// Line number of the opening quote (1-indexed).
        line: usize,
        /// Column number of the opening quote (1-indexed).
        column: usize,
        /// Source context for rich error display.
        source_context: Option<SourceContext>,
    },

    /// A long-bracket string never found its level-matched closer.
    #[error("unterminated long bracket (level {level}) at line {line}, column {column}\n{}", source_context.as_display())]
    UnterminatedLongBracket {
        /// Number of `=` signs between the brackets.
        level: usize,
        /// Line number of the opener (1-indexed).
        line: usize,
        /// Column number of the opener (1-indexed).
        column: usize,
        /// Source context for rich error display.
        source_context: Option<SourceContext>,
    },

    /// A block comment never found its level-matched closer.
    #[error("unterminated comment at line {line}, column {column}\n{}", source_context.as_display())]
    UnterminatedComment {
        /// Line number of the `--` opener (1-indexed).
        line: usize,
        /// Column number of the `--` opener (1-indexed).
        column: usize,
        /// Source context for rich error display.
        source_context: Option<SourceContext>,
    },

    /// A numeric literal ended mid-exponent or mid-hex-prefix.
    #[error("malformed number at line {line}, column {column}\n{}", source_context.as_display())]
    MalformedNumber {
        /// Line number (1-indexed).
        line: usize,
        /// Column number (1-indexed).
        column: usize,
        /// Source context for rich error display.
        source_context: Option<SourceContext>,
    },

    /// The scope walker met a token that does not fit the statement shape.
    #[error("wrong token '{found}' but {expected} expected at line {line}, column {column}\n{}", source_context.as_display())]
    UnexpectedToken {
        /// Verbatim text of the offending token.
        found: String,
        /// Description of what was expected (`"'end'"`, `"expression"`).
        expected: String,
        /// Line number (1-indexed).
        line: usize,
        /// Column number (1-indexed).
        column: usize,
        /// Source context for rich error display.
        source_context: Option<SourceContext>,
    },

    /// Input ended while a construct was still open.
    #[error("unexpected end of input: {expected} expected")]
    UnexpectedEof {
        /// Description of what was expected.
        expected: String,
    },
}

/// Convenience type alias for Results with [`MinifyError`].
pub type Result<T> = std::result::Result<T, MinifyError>;

/// Converts a byte offset into a 1-indexed (line, column) pair.
///
/// Columns count bytes from the last newline; for the ASCII-dominated
/// scripts this tool targets that matches what an editor shows.
pub fn position(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.bytes().filter(|&b| b == b'\n').count() + 1;
    let column = offset - before.rfind('\n').map(|i| i + 1).unwrap_or(0) + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_counts_lines_and_columns() {
        let src = "local a\nlocal b\n";
        assert_eq!(position(src, 0), (1, 1));
        assert_eq!(position(src, 6), (1, 7));
        assert_eq!(position(src, 8), (2, 1));
        assert_eq!(position(src, 14), (2, 7));
    }

    #[test]
    fn snippet_points_at_error_column() {
        let ctx = SourceContext::from_source("local a\nreturn @\n", 2, 8);
        let snippet = ctx.format_snippet();
        assert!(snippet.contains("   2 | return @"));
        assert!(snippet.contains("     |        ^"));
    }
}
