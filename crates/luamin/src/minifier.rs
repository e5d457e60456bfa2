// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The minification pipeline.
//!
//! [`Minifier`] strings the passes together: lex, scope analysis,
//! name assignment, join-safe rendering. Every call builds its state
//! from scratch and drops it on return; a `Minifier` is just options
//! and can be reused or shared freely.

use std::collections::HashSet;

use serde::Serialize;

use crate::emit;
use crate::error::Result;
use crate::lexer;
use crate::rename;
use crate::scope;

/// The character budget Stormworks imposes on a microcontroller script.
pub const STORMWORKS_CHAR_LIMIT: usize = 8000;

/// Tuning knobs for one minification run.
///
/// Constructed per call site; there is no global configuration.
#[derive(Debug, Clone)]
pub struct MinifyOptions {
    /// Shorten local identifiers. When false the output is only
    /// stripped of comments and whitespace.
    pub rename_locals: bool,
    /// Local names that must keep their spelling.
    pub preserve: HashSet<String>,
    /// Extra global names to protect, beyond the Lua and Stormworks
    /// sets the minifier already knows.
    pub extra_globals: HashSet<String>,
}

impl Default for MinifyOptions {
    fn default() -> Self {
        Self {
            rename_locals: true,
            preserve: HashSet::new(),
            extra_globals: HashSet::new(),
        }
    }
}

/// Size accounting for a finished run, in characters (the unit the
/// Stormworks editor counts).
#[derive(Debug, Clone, Serialize)]
pub struct MinifyReport {
    /// Character count of the input.
    pub original_len: usize,
    /// Character count of the output.
    pub minified_len: usize,
    /// `minified_len / original_len`; 1.0 for empty input.
    pub ratio: f64,
    /// The character budget the output was checked against.
    pub limit: usize,
    /// True when the output fits the budget.
    pub within_limit: bool,
}

impl MinifyReport {
    /// Measures `original` against `minified` with the given budget.
    pub fn new(original: &str, minified: &str, limit: usize) -> Self {
        let original_len = original.chars().count();
        let minified_len = minified.chars().count();
        let ratio = if original_len == 0 {
            1.0
        } else {
            minified_len as f64 / original_len as f64
        };
        Self {
            original_len,
            minified_len,
            ratio,
            limit,
            within_limit: minified_len <= limit,
        }
    }
}

/// A configured minifier.
#[derive(Debug, Clone, Default)]
pub struct Minifier {
    options: MinifyOptions,
}

impl Minifier {
    /// Creates a minifier with the given options.
    pub fn new(options: MinifyOptions) -> Self {
        Self { options }
    }

    /// The options this minifier runs with.
    pub fn options(&self) -> &MinifyOptions {
        &self.options
    }

    /// Minifies one Lua source text.
    ///
    /// On any error the input is reported unusable and nothing is
    /// emitted; there is no partial output.
    pub fn minify(&self, source: &str) -> Result<String> {
        let tokens = lexer::lex(source)?;
        tracing::debug!("lexed {} tokens from {} bytes", tokens.len() - 1, source.len());

        let output = if self.options.rename_locals {
            let analysis = scope::analyze(source, &tokens)?;
            tracing::debug!(
                "scope walk: {} scopes, {} bindings, {} globals",
                analysis.scopes.len(),
                analysis.bindings.len(),
                analysis.globals.len()
            );
            let renames = rename::assign_names(&analysis, &self.options);
            emit::render(&tokens, &analysis.roles, &renames)
        } else {
            emit::render_plain(&tokens)
        };

        tracing::debug!(
            "minified {} -> {} chars",
            source.chars().count(),
            output.chars().count()
        );
        Ok(output)
    }
}

/// Minifies `source` with default options.
pub fn minify(source: &str) -> Result<String> {
    Minifier::default().minify(source)
}

/// Minifies `source` with explicit options.
pub fn minify_with(source: &str, options: &MinifyOptions) -> Result<String> {
    Minifier::new(options.clone()).minify(source)
}

/// Validates that `source` lexes and scope-walks cleanly, without
/// producing output. This is the `check` entry the CLI exposes.
pub fn check(source: &str) -> Result<()> {
    let tokens = lexer::lex(source)?;
    scope::analyze(source, &tokens)?;
    Ok(())
}
