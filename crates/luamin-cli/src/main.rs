// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use clap::{Parser, Subcommand};
use luamin_cli::commands;
use luamin_cli::commands::minify::ReportFormat;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "luamin")]
#[command(author = "Maravilla Labs")]
#[command(version)]
#[command(about = "Scope-aware Lua minifier for Stormworks scripts", long_about = None)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Minify a Lua script
    Minify {
        /// Input file, or `-` for stdin
        input: String,
        /// Output file; defaults to stdout
        #[arg(short, long)]
        output: Option<String>,
        /// Only strip comments and whitespace, keep identifier names
        #[arg(long)]
        no_rename: bool,
        /// Local names to keep as-is (repeatable)
        #[arg(long = "preserve", value_name = "NAME")]
        preserve: Vec<String>,
        /// Extra global names to protect (repeatable)
        #[arg(long = "global", value_name = "NAME")]
        globals: Vec<String>,
        /// Character budget to check the result against
        #[arg(long, default_value_t = luamin::STORMWORKS_CHAR_LIMIT)]
        limit: usize,
        /// Size report format
        #[arg(long, value_enum, default_value = "text")]
        report: ReportFormat,
    },
    /// Validate a script without producing output
    Check {
        /// Input file, or `-` for stdin
        input: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with the specified log level
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Minify {
            input,
            output,
            no_rename,
            preserve,
            globals,
            limit,
            report,
        } => commands::minify::run(&input, output.as_deref(), no_rename, preserve, globals, limit, report),
        Commands::Check { input } => commands::check::run(&input),
    }
}
