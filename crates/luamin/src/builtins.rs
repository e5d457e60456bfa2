// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Reserved words and well-known global names.
//!
//! The reserved-word set drives keyword classification in the lexer and
//! keeps the name generator from ever producing a keyword. The global
//! sets seed the rename avoid-list: a synthetic local name must never
//! collide with a host-provided global the script might touch, even one
//! the scanner cannot see a reference to (e.g. a callback the game engine
//! looks up by name).

use lazy_static::lazy_static;
use std::collections::HashSet;

lazy_static! {
    /// The 22 reserved words of the Lua grammar. Never valid as names.
    pub static ref RESERVED_WORDS: HashSet<&'static str> = [
        "and", "break", "do", "else", "elseif", "end", "false", "for",
        "function", "goto", "if", "in", "local", "nil", "not", "or",
        "repeat", "return", "then", "true", "until", "while",
    ]
    .into_iter()
    .collect();

    /// Globals of the restricted Lua standard library that Stormworks
    /// exposes to microcontroller scripts.
    pub static ref LUA_STD_GLOBALS: HashSet<&'static str> = [
        "math", "table", "string", "pairs", "ipairs", "next", "tostring",
        "tonumber", "type", "select", "unpack", "pcall", "error", "print",
        "_G",
    ]
    .into_iter()
    .collect();

    /// The Stormworks microcontroller API surface: callbacks the game
    /// invokes by name and the tables it injects.
    pub static ref STORMWORKS_GLOBALS: HashSet<&'static str> = [
        "onTick", "onDraw", "input", "output", "screen", "property",
        "map", "async", "debug",
    ]
    .into_iter()
    .collect();
}

/// True if `name` is a Lua reserved word.
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(name)
}

/// True if `name` is a known standard or Stormworks global.
pub fn is_known_global(name: &str) -> bool {
    LUA_STD_GLOBALS.contains(name) || STORMWORKS_GLOBALS.contains(name)
}
