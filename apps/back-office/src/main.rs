//! `clowee` binary entry point.

use anyhow::Context;
use clap::Parser;

use back_office::cli::Cli;
use back_office::config::AppConfig;
use back_office::{init_tracing, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.log_filter);

    let json = cli.json;
    match run(cli, config).await {
        Ok(output) => {
            print!("{output}");
            Ok(())
        }
        Err(err) => {
            if json {
                eprintln!("{}", serde_json::to_string_pretty(&err)?);
            } else {
                eprintln!("error: {err}");
            }
            std::process::exit(err.code.exit_status());
        }
    }
}
