mod cli;
mod commands;
mod config;
mod report;
mod store;

use clap::Parser;
use config::{CliOverrides, ResolvedRunConfig};
use tracing_subscriber::EnvFilter;

impl From<cli::CompareArgs> for CliOverrides {
    fn from(args: cli::CompareArgs) -> Self {
        Self {
            threshold: args.threshold.or(args.threshold_percent),
            ignore: args.ignore,
            max_difference: args.max_difference,
            output: args.output,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("visdiff=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Init { force } => {
            commands::init(force)?;
        }
        cli::Command::Compare {
            before,
            after,
            json,
            args,
        } => {
            let config = ResolvedRunConfig::new(args.into())?;
            let code = tokio::task::spawn_blocking(move || {
                commands::compare(config, &before, &after, json)
            })
            .await??;
            std::process::exit(code);
        }
        cli::Command::Batch {
            before_dir,
            after_dir,
            filter,
            parallel,
            args,
        } => {
            let config = ResolvedRunConfig::new(args.into())?;
            let code =
                commands::batch(config, &before_dir, &after_dir, filter.as_deref(), parallel)
                    .await?;
            std::process::exit(code);
        }
        cli::Command::Show { id, output } => {
            let config = ResolvedRunConfig::new(CliOverrides {
                output,
                ..Default::default()
            })?;
            commands::show(&config.output_dir, &id)?;
        }
    }

    Ok(())
}
