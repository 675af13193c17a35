// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagewright: reflows scanned technical pages into PDFs with one output page
// per source page and syntax-coloured code blocks.
//
// Entry point. Initialises logging, resolves the config, and dispatches the
// subcommand.

mod commands;
mod config_dir;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use commands::{ConfigArgs, ConvertArgs, TypesetArgs};

#[derive(Debug, clap::Parser)]
#[command(author, version, about)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Config file (JSON); defaults to $XDG_CONFIG_HOME/pagewright/config.json
    #[clap(long, env = "PAGEWRIGHT_CONFIG", global = true)]
    config: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
pub enum SubCommands {
    /// Extract, translate and typeset a source PDF
    Convert(ConvertArgs),

    /// Typeset page Markdown files into a PDF
    Typeset(TypesetArgs),

    /// Print or save the effective configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let app = App::parse();

    let result = match config_dir::load_config(app.global.config.as_deref()) {
        Ok(config) => match app.command {
            SubCommands::Convert(args) => commands::convert(args, config).await,
            SubCommands::Typeset(args) => commands::typeset(args, config).await,
            SubCommands::Config(args) => commands::config(args, &config),
        },
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "pagewright failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
