// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Join-safe rendering of the token stream.
//!
//! Tokens are concatenated with no separators except where two adjacent
//! tokens would fuse into something the Lua lexer reads differently. The
//! classic trap: `a - -b` emitted as `a--b` turns the rest of the line
//! into a comment. The fusion rules below are written against token
//! kinds and boundary characters, never against trimmed source text, so
//! renamed identifiers are handled the same as original ones.

use crate::scope::BindingId;
use crate::token::{Token, TokenKind};

/// Renders the stream, substituting renamed bindings.
///
/// `roles` maps token index -> binding and `renames` maps binding -> new
/// name, both as produced by the scope and rename passes.
pub fn render(
    tokens: &[Token<'_>],
    roles: &[Option<BindingId>],
    renames: &[Option<String>],
) -> String {
    let mut out = String::new();
    let mut prev: Option<(TokenKind, &str)> = None;

    for (i, tok) in tokens.iter().enumerate() {
        if tok.is_eof() {
            break;
        }

        let text: &str = roles
            .get(i)
            .copied()
            .flatten()
            .and_then(|b| renames.get(b).and_then(|r| r.as_deref()))
            .unwrap_or(tok.text);

        if let Some((prev_kind, prev_text)) = prev {
            if needs_space(prev_kind, prev_text, tok.kind, text) {
                out.push(' ');
            }
        }
        out.push_str(text);
        prev = Some((tok.kind, text));
    }
    out
}

/// Renders the stream verbatim, with no renaming.
pub fn render_plain(tokens: &[Token<'_>]) -> String {
    render(tokens, &[], &[])
}

/// True when dropping the whitespace between two adjacent tokens would
/// change how the Lua lexer reads them.
fn needs_space(prev_kind: TokenKind, prev_text: &str, next_kind: TokenKind, next_text: &str) -> bool {
    let word = |k: TokenKind| {
        matches!(
            k,
            TokenKind::Ident | TokenKind::Keyword | TokenKind::Number
        )
    };

    // `local function`, `return x`, `1 e` -- words always separate.
    if word(prev_kind) && word(next_kind) {
        return true;
    }

    let last = prev_text.chars().last().unwrap_or('\0');
    let first = next_text.chars().next().unwrap_or('\0');

    // `-` `-` would open a comment.
    if last == '-' && first == '-' {
        return true;
    }

    // `[` `[` / `[` `[=[` would open a long bracket.
    if prev_text == "[" && prev_kind == TokenKind::Symbol && first == '[' {
        return true;
    }

    // A numeral absorbs a following dot: `1 ..2` must not become `1..2`.
    if prev_kind == TokenKind::Number && first == '.' {
        return true;
    }

    // `..` `.5` would lex as `...` then `5`.
    if prev_kind == TokenKind::Symbol && last == '.' && first == '.' {
        return true;
    }

    // Pairs that fuse into a longer operator.
    matches!(
        (last, first),
        ('=', '=')
            | ('<', '=')
            | ('>', '=')
            | ('~', '=')
            | ('/', '/')
            | ('<', '<')
            | ('>', '>')
            | (':', ':')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn strip(source: &str) -> String {
        render_plain(&lex(source).unwrap())
    }

    #[test]
    fn whitespace_collapses_to_token_boundaries() {
        assert_eq!(strip("local   x  =  1\n\n  x = x + 1"), "local x=1 x=x+1");
    }

    #[test]
    fn comments_disappear() {
        assert_eq!(
            strip("-- header\nreturn 1 --[[ trailing ]] + 2"),
            "return 1+2"
        );
    }

    #[test]
    fn minus_minus_keeps_a_space() {
        assert_eq!(strip("a = x - -y"), "a=x- -y");
        assert_eq!(strip("a = x - - -y"), "a=x- - -y");
    }

    #[test]
    fn unary_minus_joins_cleanly_elsewhere() {
        assert_eq!(strip("a = x + -y"), "a=x+-y");
        assert_eq!(strip("f( -1 )"), "f(-1)");
    }

    #[test]
    fn concat_near_numbers_keeps_spaces() {
        assert_eq!(strip("s = 1 .. 2"), "s=1 ..2");
        assert_eq!(strip("s = a .. .5"), "s=a.. .5");
        assert_eq!(strip("s = a .. b"), "s=a..b");
    }

    #[test]
    fn bracket_pairs_do_not_fuse_into_long_brackets() {
        assert_eq!(strip("t = a[ [[key]] ]"), "t=a[ [[key]]]");
    }

    #[test]
    fn keywords_stay_separated() {
        assert_eq!(strip("if x then return end"), "if x then return end");
        assert_eq!(strip("local function f() end"), "local function f()end");
    }

    #[test]
    fn string_bytes_survive_verbatim() {
        assert_eq!(
            strip("s = \"--[[ not a comment ]]  \""),
            "s=\"--[[ not a comment ]]  \""
        );
        assert_eq!(strip("s = [==[ a  b ]==]"), "s=[==[ a  b ]==]");
    }

    #[test]
    fn operator_pairs_keep_spaces() {
        // Contrived but must not fuse either.
        assert_eq!(strip("a = b < = "), "a=b< =");
    }

    #[test]
    fn renames_apply_at_their_sites() {
        let source = "local value = 1 return value";
        let tokens = lex(source).unwrap();
        // Token layout: local value = 1 return value eof
        let mut roles = vec![None; tokens.len()];
        roles[1] = Some(0);
        roles[5] = Some(0);
        let renames = vec![Some("a".to_string())];
        assert_eq!(render(&tokens, &roles, &renames), "local a=1 return a");
    }
}
