mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doc_excerpt=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Doc { expr } => {
            cli::print_doc(&cli.dir, config, &expr)?;
        }
        Commands::Example { name, annotated } => {
            cli::print_example(&cli.dir, config, &name, annotated)?;
        }
        Commands::Output { name } => {
            cli::print_output(&cli.dir, config, &name)?;
        }
        Commands::Play { name } => {
            cli::print_playground(&cli.dir, config, &name)?;
        }
        Commands::List { format } => {
            cli::list_keys(&cli.dir, config, &format)?;
        }
    }

    Ok(())
}
