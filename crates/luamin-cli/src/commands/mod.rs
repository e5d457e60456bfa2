// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CLI command implementations.
//!
//! - `minify`: minify a script and report the size against the budget
//! - `check`: validate a script without producing output

/// Minify command.
pub mod minify;
/// Validation command.
pub mod check;

use std::io::Read;

/// Reads a source file, or stdin when `input` is `-`.
pub(crate) fn read_source(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        Ok(std::fs::read_to_string(input)
            .map_err(|e| anyhow::anyhow!("cannot read {input}: {e}"))?)
    }
}
