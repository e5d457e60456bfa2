// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Check command: lex and scope-walk a script without producing output.

use console::style;

use super::read_source;

/// Runs the check command.
pub fn run(input: &str) -> anyhow::Result<()> {
    let source = read_source(input)?;

    luamin::check(&source)?;

    eprintln!(
        "{} {} ({} chars)",
        style("ok:").green().bold(),
        input,
        source.chars().count()
    );
    Ok(())
}
