use skvr_server::{ServerConfig, SkvrServer};

use crate::cli::{Cli, Command, ServeArgs};

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = ServerConfig::from_env()?;
    if let Some(dir) = args.dir {
        config.storage_dir = dir;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    let server = SkvrServer::open(config)?;
    server.serve().await?;
    Ok(())
}
