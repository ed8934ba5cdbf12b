// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! monitorlib CLI
//!
//! Compiles the profile registry of every module linked into this binary
//! and prints it, or samples the built-in demo types.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod demo;

#[derive(Parser)]
#[command(name = "monitorlib")]
#[command(author, version, about = "Inspect compiled monitor profiles", long_about = None)]
struct Cli {
    /// Directory containing monitor.yaml (defaults apply when missing)
    #[arg(long, global = true, value_name = "DIR")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile every registered module and print the registry
    Scan {
        /// Print the registry summary and scan report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Bind units to the demo types and print a few refreshes
    Sample {
        /// Number of refresh rounds
        #[arg(long, default_value = "3")]
        ticks: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = commands::load_settings(cli.settings.as_deref());

    match cli.command {
        Commands::Scan { json } => commands::scan::run(settings, json),
        Commands::Sample { ticks } => commands::sample::run(settings, ticks),
    }
}
