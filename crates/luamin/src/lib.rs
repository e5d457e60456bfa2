// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

// Allow large error types - MinifyError carries rich context for debugging
// (source snippets, caret positions). This is an intentional design choice
// for better DX.
#![allow(clippy::result_large_err)]

//! # luamin
//!
//! Scope-aware Lua minifier for Stormworks microcontroller scripts.
//!
//! Stormworks caps a microcontroller script at 8000 characters; this
//! crate shrinks a script under that budget without changing what it
//! does. Comments and redundant whitespace are stripped, and local
//! identifiers are shortened where their whole scope is lexically
//! resolvable. Globals, table fields, method names, labels and string
//! content are never touched.
//!
//! ## Quick Start
//!
//! ```rust
//! let source = r#"
//! -- compute sum
//! local function add(a, b)
//!     local result = a + b
//!     return result
//! end
//! "#;
//!
//! let minified = luamin::minify(source).unwrap();
//! assert!(minified.len() <= source.len());
//! ```
//!
//! ## Failure policy
//!
//! Malformed input — an unterminated string, comment or long bracket, a
//! token sequence the scope walker cannot follow — raises a positioned
//! [`MinifyError`]; the minifier never emits truncated or silently
//! corrupted output. Callers that want best-effort behavior can fall
//! back to the unmodified input on error.

/// Token model shared by the passes.
pub mod token;
/// Lexical scanner.
pub mod lexer;
/// Scope analysis over the token stream.
pub mod scope;
/// Synthetic short-name assignment.
pub mod rename;
/// Join-safe rendering.
pub mod emit;
/// Reserved words and well-known globals.
pub mod builtins;
/// The minification pipeline and its options.
pub mod minifier;
/// Error types and reporting.
pub mod error;

pub use error::{MinifyError, Result, SourceContext};
pub use minifier::{
    check, minify, minify_with, Minifier, MinifyOptions, MinifyReport, STORMWORKS_CHAR_LIMIT,
};
pub use token::{Token, TokenKind};


#[cfg(test)]
mod runtime_tests;
