use adq_algo::MpsExportPolicy;
use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level (overrides the config file; RUST_LOG overrides both)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    /// Configuration file (defaults to ./adq.toml when present)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve a legacy problem with the warm / safe / diagnose sequence
    Solve(SolveArgs),
    /// Write a legacy problem as MPS
    Export {
        #[arg(long, value_hint = ValueHint::FilePath)]
        problem: PathBuf,
        /// Output MPS file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: PathBuf,
        /// Use the variable and constraint names of the problem
        #[arg(long)]
        named: bool,
    },
    /// Print the size of a legacy problem
    Inspect {
        #[arg(long, value_hint = ValueHint::FilePath)]
        problem: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct SolveArgs {
    /// Legacy problem as JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub problem: PathBuf,
    /// Write solved values as JSON here
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
    /// Solver backend name
    #[arg(long)]
    pub backend: Option<String>,
    /// Directory receiving MPS exports
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub export_dir: Option<PathBuf>,
    /// When to export the problem as MPS
    #[arg(long, value_enum)]
    pub export_mps: Option<ExportPolicyArg>,
    /// Optimisation number within the week (1 or 2)
    #[arg(long, default_value_t = 1)]
    pub optimization: u32,
    #[arg(long, default_value_t = 0)]
    pub year: u32,
    #[arg(long, default_value_t = 0)]
    pub week: u32,
    #[arg(long, default_value_t = 0)]
    pub day: u32,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportPolicyArg {
    Never,
    OnError,
    Always,
}

impl From<ExportPolicyArg> for MpsExportPolicy {
    fn from(arg: ExportPolicyArg) -> Self {
        match arg {
            ExportPolicyArg::Never => MpsExportPolicy::Never,
            ExportPolicyArg::OnError => MpsExportPolicy::OnError,
            ExportPolicyArg::Always => MpsExportPolicy::Always,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_solve() {
        let cli = Cli::try_parse_from([
            "adq",
            "--log-level",
            "debug",
            "solve",
            "--problem",
            "p.json",
            "--export-mps",
            "on-error",
            "--optimization",
            "2",
            "--year",
            "3",
            "--week",
            "12",
        ])
        .unwrap();
        assert_eq!(cli.log_level, Some(tracing::Level::DEBUG));
        match cli.command {
            Commands::Solve(args) => {
                assert_eq!(args.problem, PathBuf::from("p.json"));
                assert_eq!(args.export_mps, Some(ExportPolicyArg::OnError));
                assert_eq!(args.optimization, 2);
                assert_eq!((args.year, args.week, args.day), (3, 12, 0));
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
