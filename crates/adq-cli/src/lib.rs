pub mod cli;
pub mod config;

pub use cli::{Cli, Commands, ExportPolicyArg, SolveArgs};
pub use config::{load_config, AdqConfig, ExportConfig, LoggingConfig, SolverConfig};
