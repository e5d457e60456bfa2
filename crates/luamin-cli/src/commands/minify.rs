// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Minify command: read, minify, write, report.

use std::io::Write;

use clap::ValueEnum;
use console::style;
use luamin::{MinifyOptions, MinifyReport};

use super::read_source;

/// How the size report is rendered on stderr/stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable summary on stderr.
    Text,
    /// JSON object on stdout; requires `--output`.
    Json,
}

/// Runs the minify command.
#[allow(clippy::too_many_arguments)]
pub fn run(
    input: &str,
    output: Option<&str>,
    no_rename: bool,
    preserve: Vec<String>,
    globals: Vec<String>,
    limit: usize,
    report: ReportFormat,
) -> anyhow::Result<()> {
    if report == ReportFormat::Json && output.is_none() {
        anyhow::bail!("--report json needs --output, stdout carries the minified code");
    }

    let source = read_source(input)?;

    let options = MinifyOptions {
        rename_locals: !no_rename,
        preserve: preserve.into_iter().collect(),
        extra_globals: globals.into_iter().collect(),
    };
    let minified = luamin::minify_with(&source, &options)?;
    let stats = MinifyReport::new(&source, &minified, limit);

    match output {
        Some(path) => {
            std::fs::write(path, &minified)
                .map_err(|e| anyhow::anyhow!("cannot write {path}: {e}"))?;
            tracing::info!("wrote {} chars to {path}", stats.minified_len);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(minified.as_bytes())?;
            if !minified.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }

    match report {
        ReportFormat::Text => print_text_report(&stats),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }

    Ok(())
}

fn print_text_report(stats: &MinifyReport) {
    eprintln!(
        "{} {} chars",
        style("Original length:").cyan(),
        stats.original_len
    );
    eprintln!(
        "{} {} chars",
        style("Minified length:").cyan(),
        stats.minified_len
    );
    eprintln!("{} {:.2}", style("Proportion:").cyan(), stats.ratio);

    if !stats.within_limit {
        eprintln!(
            "{} output exceeds the {}-character budget by {}",
            style("warning:").yellow().bold(),
            stats.limit,
            stats.minified_len - stats.limit
        );
    }
}
