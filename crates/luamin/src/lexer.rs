// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Lexical scanner for Lua source text.
//!
//! The scanner walks the input byte by byte and produces a flat
//! [`Token`] stream. Whitespace and comments are consumed here and never
//! reach later passes; string and long-bracket content is captured
//! verbatim as a single opaque token, which is what guarantees the
//! minifier can never rewrite anything inside a literal.
//!
//! Long brackets are level-sensitive: `[==[` only closes at `]==]`, and
//! the first level-matched closer ends the region (Lua block comments do
//! not nest). A raw newline inside a quoted string, an unclosed literal
//! or comment, and a dangling numeric exponent are hard errors with
//! source positions; the scanner never guesses past malformed input.

use crate::builtins::is_reserved_word;
use crate::error::{position, MinifyError, Result, SourceContext};
use crate::token::{Token, TokenKind};

/// Tokenizes `source`, returning the token stream terminated by an
/// [`TokenKind::Eof`] token.
pub fn lex(source: &str) -> Result<Vec<Token<'_>>> {
    Lexer::new(source).run()
}

struct Lexer<'src> {
    src: &'src str,
    bytes: &'src [u8],
    pos: usize,
    tokens: Vec<Token<'src>>,
}

impl<'src> Lexer<'src> {
    fn new(src: &'src str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token<'src>>> {
        // The Lua loader skips a leading `#...` line (shebang convention).
        if self.bytes.first() == Some(&b'#') {
            while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                self.pos += 1;
            }
        }

        loop {
            self.skip_trivia()?;

            let Some(&b) = self.bytes.get(self.pos) else {
                self.push(TokenKind::Eof, self.pos, self.pos);
                return Ok(self.tokens);
            };

            match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.scan_name(),
                0x80.. => self.scan_name(),
                b'0'..=b'9' => self.scan_number()?,
                b'"' | b'\'' => self.scan_short_string()?,
                b'[' => match self.long_bracket_level(self.pos) {
                    Some(level) => self.scan_long_string(level)?,
                    None => self.scan_symbol()?,
                },
                b'.' if self.peek_byte(1).is_some_and(|d| d.is_ascii_digit()) => {
                    self.scan_number()?
                }
                _ => self.scan_symbol()?,
            }
        }
    }

    fn peek_byte(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.tokens.push(Token::new(kind, &self.src[start..end], start));
    }

    fn context_at(&self, offset: usize) -> (usize, usize, Option<SourceContext>) {
        let (line, column) = position(self.src, offset);
        let ctx = SourceContext::from_source(self.src, line, column);
        (line, column, Some(ctx))
    }

    /// Consumes whitespace and comments until the next token start.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            while self
                .peek_byte(0)
                .is_some_and(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c))
            {
                self.pos += 1;
            }

            if self.peek_byte(0) == Some(b'-') && self.peek_byte(1) == Some(b'-') {
                let start = self.pos;
                self.pos += 2;

                if let Some(level) = self.long_bracket_level(self.pos) {
                    if self.skip_long_bracket(level).is_err() {
                        let (line, column, source_context) = self.context_at(start);
                        return Err(MinifyError::UnterminatedComment {
                            line,
                            column,
                            source_context,
                        });
                    }
                } else {
                    while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                continue;
            }

            return Ok(());
        }
    }

    /// Returns the `=` count if a long-bracket opener starts at `at`.
    fn long_bracket_level(&self, at: usize) -> Option<usize> {
        if self.bytes.get(at) != Some(&b'[') {
            return None;
        }
        let mut level = 0;
        let mut i = at + 1;
        while self.bytes.get(i) == Some(&b'=') {
            level += 1;
            i += 1;
        }
        (self.bytes.get(i) == Some(&b'[')).then_some(level)
    }

    /// Advances past a long-bracket region. `self.pos` must sit on the
    /// opening `[`. Returns `Err(())` when the closer is missing; the
    /// caller owns the error position.
    fn skip_long_bracket(&mut self, level: usize) -> std::result::Result<(), ()> {
        // Skip "[" "="* "["
        self.pos += level + 2;

        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b']' {
                let mut eq = 0;
                let mut i = self.pos + 1;
                while self.bytes.get(i) == Some(&b'=') {
                    eq += 1;
                    i += 1;
                }
                if eq == level && self.bytes.get(i) == Some(&b']') {
                    self.pos = i + 1;
                    return Ok(());
                }
            }
            self.pos += 1;
        }
        Err(())
    }

    fn scan_name(&mut self) {
        let start = self.pos;
        while self
            .peek_byte(0)
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80)
        {
            self.pos += 1;
        }

        let kind = if is_reserved_word(&self.src[start..self.pos]) {
            TokenKind::Keyword
        } else {
            TokenKind::Ident
        };
        self.push(kind, start, self.pos);
    }

    fn scan_number(&mut self) -> Result<()> {
        let start = self.pos;
        let malformed = |lexer: &Self| {
            let (line, column, source_context) = lexer.context_at(start);
            MinifyError::MalformedNumber {
                line,
                column,
                source_context,
            }
        };

        let hex = self.peek_byte(0) == Some(b'0')
            && matches!(self.peek_byte(1), Some(b'x') | Some(b'X'));

        if hex {
            self.pos += 2;
            let digits_start = self.pos;
            while self.peek_byte(0).is_some_and(|b| b.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            if self.peek_byte(0) == Some(b'.') {
                self.pos += 1;
                while self.peek_byte(0).is_some_and(|b| b.is_ascii_hexdigit()) {
                    self.pos += 1;
                }
            }
            if self.pos == digits_start {
                return Err(malformed(self));
            }
            if matches!(self.peek_byte(0), Some(b'p') | Some(b'P')) {
                self.scan_exponent().map_err(|()| malformed(self))?;
            }
        } else {
            while self.peek_byte(0).is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
            if self.peek_byte(0) == Some(b'.') {
                self.pos += 1;
                while self.peek_byte(0).is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
            if matches!(self.peek_byte(0), Some(b'e') | Some(b'E')) {
                self.scan_exponent().map_err(|()| malformed(self))?;
            }
        }

        // Lua rejects a numeral running straight into a name (`3and4`).
        if self
            .peek_byte(0)
            .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_' || b >= 0x80)
        {
            return Err(malformed(self));
        }

        self.push(TokenKind::Number, start, self.pos);
        Ok(())
    }

    /// Consumes `e`/`p`, an optional sign, and at least one digit.
    fn scan_exponent(&mut self) -> std::result::Result<(), ()> {
        self.pos += 1;
        if matches!(self.peek_byte(0), Some(b'+') | Some(b'-')) {
            self.pos += 1;
        }
        if !self.peek_byte(0).is_some_and(|b| b.is_ascii_digit()) {
            return Err(());
        }
        while self.peek_byte(0).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        Ok(())
    }

    fn scan_short_string(&mut self) -> Result<()> {
        let start = self.pos;
        let quote = self.bytes[self.pos];
        self.pos += 1;

        loop {
            match self.peek_byte(0) {
                None | Some(b'\n') => {
                    let (line, column, source_context) = self.context_at(start);
                    return Err(MinifyError::UnterminatedString {
                        line,
                        column,
                        source_context,
                    });
                }
                Some(b) if b == quote => {
                    self.pos += 1;
                    self.push(TokenKind::Str, start, self.pos);
                    return Ok(());
                }
                Some(b'\\') => {
                    // The escaped byte is always opaque here, including a
                    // newline (line continuation) and `z`.
                    self.pos += 2;
                    if self.pos > self.bytes.len() {
                        let (line, column, source_context) = self.context_at(start);
                        return Err(MinifyError::UnterminatedString {
                            line,
                            column,
                            source_context,
                        });
                    }
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn scan_long_string(&mut self, level: usize) -> Result<()> {
        let start = self.pos;
        if self.skip_long_bracket(level).is_err() {
            let (line, column, source_context) = self.context_at(start);
            return Err(MinifyError::UnterminatedLongBracket {
                level,
                line,
                column,
                source_context,
            });
        }
        self.push(TokenKind::LongStr, start, self.pos);
        Ok(())
    }

    fn scan_symbol(&mut self) -> Result<()> {
        const TWO_CHAR: [&str; 9] = ["..", "==", "~=", "<=", ">=", "//", "<<", ">>", "::"];

        let start = self.pos;
        let rest = &self.src[start..];

        if rest.starts_with("...") {
            self.pos += 3;
        } else if let Some(op) = TWO_CHAR.iter().find(|op| rest.starts_with(**op)) {
            self.pos += op.len();
        } else if matches!(
            self.bytes[start],
            b'+' | b'-'
                | b'*'
                | b'/'
                | b'%'
                | b'^'
                | b'#'
                | b'&'
                | b'~'
                | b'|'
                | b'<'
                | b'>'
                | b'='
                | b'('
                | b')'
                | b'{'
                | b'}'
                | b'['
                | b']'
                | b';'
                | b':'
                | b','
                | b'.'
        ) {
            self.pos += 1;
        } else {
            let symbol = self.src[start..].chars().next().unwrap_or('\0');
            let (line, column, source_context) = self.context_at(start);
            return Err(MinifyError::UnexpectedSymbol {
                symbol,
                line,
                column,
                source_context,
            });
        }

        self.push(TokenKind::Symbol, start, self.pos);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<&str> {
        lex(source)
            .unwrap()
            .into_iter()
            .filter(|t| !t.is_eof())
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn strips_whitespace_and_comments() {
        let toks = texts("-- header\nlocal x = 1 -- trailing\n--[[ block\ncomment ]]\nx = x + 1\n");
        assert_eq!(toks, ["local", "x", "=", "1", "x", "=", "x", "+", "1"]);
    }

    #[test]
    fn block_comment_ends_at_first_matched_closer() {
        // The second `]]` must already be code, not comment content.
        let toks = texts("--[[ a ]] local x = 1 --[[ b ]]");
        assert_eq!(toks, ["local", "x", "=", "1"]);
    }

    #[test]
    fn level_mismatch_does_not_close_long_bracket() {
        let toks = texts("local s = [==[ ]] ]=] ]==]");
        assert_eq!(toks, ["local", "s", "=", "[==[ ]] ]=] ]==]"]);
    }

    #[test]
    fn string_content_is_opaque() {
        let toks = texts(r#"local s = "-- not a comment""#);
        assert_eq!(toks, ["local", "s", "=", r#""-- not a comment""#]);
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        let toks = texts(r#"a = "he said \"hi\"" "#);
        assert_eq!(toks, ["a", "=", r#""he said \"hi\"""#]);
    }

    #[test]
    fn raw_newline_in_string_is_an_error() {
        let err = lex("local s = \"abc\ndef\"").unwrap_err();
        assert!(matches!(
            err,
            MinifyError::UnterminatedString { line: 1, column: 11, .. }
        ));
    }

    #[test]
    fn unterminated_long_bracket_is_an_error() {
        let err = lex("local s = [=[ never closed ]]").unwrap_err();
        assert!(matches!(
            err,
            MinifyError::UnterminatedLongBracket { level: 1, .. }
        ));
    }

    #[test]
    fn unterminated_comment_is_an_error() {
        let err = lex("x = 1 --[[ open").unwrap_err();
        assert!(matches!(err, MinifyError::UnterminatedComment { .. }));
    }

    #[test]
    fn numbers_cover_lua_literal_forms() {
        let toks = texts("a = 10 + 3.14 + .5 + 1e3 + 2E-1 + 0xFF + 0x1p4 + 1.");
        assert_eq!(
            toks,
            ["a", "=", "10", "+", "3.14", "+", ".5", "+", "1e3", "+", "2E-1", "+", "0xFF",
             "+", "0x1p4", "+", "1."]
        );
    }

    #[test]
    fn dangling_exponent_is_malformed() {
        assert!(matches!(
            lex("x = 1e+").unwrap_err(),
            MinifyError::MalformedNumber { .. }
        ));
        assert!(matches!(
            lex("x = 0x").unwrap_err(),
            MinifyError::MalformedNumber { .. }
        ));
    }

    #[test]
    fn number_running_into_name_is_malformed() {
        assert!(matches!(
            lex("x = 3and4").unwrap_err(),
            MinifyError::MalformedNumber { .. }
        ));
    }

    #[test]
    fn multi_char_operators_lex_as_one_token() {
        let toks = texts("a = b .. c ~= d <= e >= f // g << h >> i ... :: ==");
        assert!(toks.contains(&".."));
        assert!(toks.contains(&"~="));
        assert!(toks.contains(&"//"));
        assert!(toks.contains(&"<<"));
        assert!(toks.contains(&"..."));
        assert!(toks.contains(&"::"));
        assert!(toks.contains(&"=="));
    }

    #[test]
    fn keywords_are_classified() {
        let tokens = lex("local function end0 end").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].kind, TokenKind::Keyword);
        assert_eq!(tokens[2].kind, TokenKind::Ident); // end0 is a name
        assert_eq!(tokens[3].kind, TokenKind::Keyword);
    }

    #[test]
    fn shebang_line_is_skipped() {
        let toks = texts("#!/usr/bin/lua\nreturn 1");
        assert_eq!(toks, ["return", "1"]);
    }

    #[test]
    fn unexpected_symbol_reports_position() {
        let err = lex("local a = 1\n@").unwrap_err();
        assert!(matches!(
            err,
            MinifyError::UnexpectedSymbol { symbol: '@', line: 2, column: 1, .. }
        ));
    }

    #[test]
    fn empty_input_yields_only_eof() {
        let tokens = lex("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
    }
}
