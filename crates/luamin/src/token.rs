// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Token model for the Lua lexer.
//!
//! Tokens are zero-copy slices of the input source. Whitespace and comments
//! never appear here; the lexer consumes them while scanning. Byte offsets
//! are kept for error reporting only.

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// An identifier (`score`, `_tmp`, `onTick`).
    Ident,
    /// One of the 22 Lua reserved words (`local`, `function`, `and`, ...).
    Keyword,
    /// A numeric literal, decimal or hex, including leading-dot forms.
    Number,
    /// A quoted string literal, quotes and escapes included verbatim.
    Str,
    /// A long-bracket string `[[...]]` / `[=[...]=]`, delimiters included.
    LongStr,
    /// An operator or punctuation symbol (`..`, `==`, `(`, `#`, ...).
    Symbol,
    /// End of input marker. Always the last token in a stream.
    Eof,
}

/// A single token, borrowing its text from the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    /// Lexical category.
    pub kind: TokenKind,
    /// Verbatim source text of the token.
    pub text: &'src str,
    /// Byte offset of the first character in the source.
    pub offset: usize,
}

impl<'src> Token<'src> {
    /// Creates a token.
    pub fn new(kind: TokenKind, text: &'src str, offset: usize) -> Self {
        Self { kind, text, offset }
    }

    /// True for tokens made of identifier-ish characters.
    ///
    /// Two adjacent word tokens always need a separating space or they
    /// would lex as one token (`local function`, `return x`).
    pub fn is_word(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Ident | TokenKind::Keyword | TokenKind::Number
        )
    }

    /// True if this token is the given symbol or keyword text.
    pub fn is(&self, text: &str) -> bool {
        self.text == text && !matches!(self.kind, TokenKind::Str | TokenKind::LongStr)
    }

    /// True at the end-of-input marker.
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}
