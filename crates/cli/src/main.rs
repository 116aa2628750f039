mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, ConfigCommand};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_cli_tracing();

    let (config, config_path) = cli::load_config()?;

    match cli.command {
        Command::Login => {
            let client = cli::query::login(&config)?;
            println!(
                "Authenticated as {} at {}",
                client.email(),
                client.base_url()
            );
            Ok(())
        }
        Command::Query {
            document,
            operation_name,
            variables,
        } => cli::query::run(&config, &document, operation_name, &variables),
        Command::Config(ConfigCommand::Validate) => {
            if !cli::config::validate(&config, &config_path) {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Config(ConfigCommand::Show) => cli::config::show(&config),
    }
}

fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
