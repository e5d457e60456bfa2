// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! luamin CLI library.
//!
//! This crate provides the command-line interface for the luamin
//! minifier. Minified code goes to stdout (or a file); reports,
//! warnings and logs go to stderr, so the output can always be piped.
//!
//! # Usage
//!
//! This crate is primarily used through the `luamin` binary:
//!
//! ```bash
//! luamin minify script.lua           # minified code on stdout
//! luamin minify script.lua -o out.lua --report json
//! luamin check script.lua            # validate only
//! ```

/// CLI commands (minify, check).
pub mod commands;
