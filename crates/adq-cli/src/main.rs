use adq_cli::{load_config, Cli, Commands};
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let level = cli
        .log_level
        .map(|level| level.to_string().to_lowercase())
        .unwrap_or_else(|| config.logging.level.clone());
    init_logging(&level);

    match &cli.command {
        Commands::Solve(args) => commands::solve::handle(args, &config),
        Commands::Export {
            problem,
            output,
            named,
        } => commands::export::handle(problem, output, *named),
        Commands::Inspect { problem } => commands::inspect::handle(problem),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
