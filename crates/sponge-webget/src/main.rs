use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use sponge_webget::{Cli, get_url, telemetry};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("webget: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.channel_config()?;
    let mut stdout = tokio::io::stdout();
    let copied = get_url(&cli.host, &cli.path, &cli.service, &config, &mut stdout)
        .await
        .with_context(|| format!("failed to fetch {}{} ({})", cli.host, cli.path, cli.service))?;
    tracing::info!(bytes = copied, "done");
    Ok(())
}
