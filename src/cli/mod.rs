//! CLI module for Easel
//!
//! Provides commands:
//! - `serve`: Run the HTTP server (default)
//! - `render`: Render a saved scene to PNG or PDF without a server

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod render;

/// Easel canvas server CLI
#[derive(Parser, Debug)]
#[command(name = "easel")]
#[command(about = "Server-side 2D canvas with PNG preview and PDF export")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server (default)
    Serve,
    /// Render a scene JSON file to PNG (.png) or PDF (any other extension)
    Render {
        /// Scene snapshot: a state response or a bare canvas object
        scene: PathBuf,
        /// Output file
        #[arg(short, long, default_value = "canvas-export.pdf")]
        output: PathBuf,
    },
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Render { scene, output }) => render::run(&scene, &output).await,
        Some(Commands::Serve) | None => crate::server::run().await,
    }
}
