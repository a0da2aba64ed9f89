mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // RUST_LOG wins over -v/-q
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!("Parsed command line: {:?}", cli);

    let result = match &cli.command {
        Commands::Transpile(args) => commands::transpile::run(&cli, args.clone()),
        Commands::Scan(args) => commands::scan::run(&cli, args.clone()),
        Commands::Render(args) => commands::render::run(&cli, args.clone()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
