use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "skvr", about = "Simple key-value REST server", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Storage directory (overrides SKVR_DIR)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Listen port (overrides SKVR_PORT)
    #[arg(long)]
    pub port: Option<u16>,
}
