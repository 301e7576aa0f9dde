//! Inspection CLI for the Optolink gateway configuration
//!
//! Loads settings the same way the gateway does and prints or checks them.
//!
//! # Usage
//!
//! ```bash
//! optolink-config show --format json
//! optolink-config check --config /etc/optolink/config.toml
//! optolink-config datapoints
//! ```

use clap::{Parser, Subcommand};

use optolink_config::cli::{
    check::{CheckArgs, run_check},
    init_logging,
    show::{DatapointsArgs, OutputFormat, ShowArgs, run_datapoints, run_show},
};
use optolink_config::utils::version;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "optolink-config")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved settings
    Show {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Toml)]
        format: OutputFormat,
    },
    /// Validate the configuration and print a summary
    Check,
    /// List the datapoints polled each cycle
    Datapoints,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    tracing::debug!("optolink-config v{}", version::get_version());

    match cli.command {
        Commands::Show { format } => run_show(ShowArgs {
            config: cli.config,
            format,
        }),
        Commands::Check => run_check(CheckArgs { config: cli.config }),
        Commands::Datapoints => run_datapoints(DatapointsArgs { config: cli.config }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_show_subcommand() {
        let cli = Cli::parse_from(["optolink-config", "show", "--format", "json"]);

        match cli.command {
            Commands::Show { format } => assert_eq!(format, OutputFormat::Json),
            _ => panic!("Expected show subcommand"),
        }
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_show_default_format() {
        let cli = Cli::parse_from(["optolink-config", "show"]);

        match cli.command {
            Commands::Show { format } => assert_eq!(format, OutputFormat::Toml),
            _ => panic!("Expected show subcommand"),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from([
            "optolink-config",
            "check",
            "--config",
            "/path/to/config.toml",
            "--verbose",
        ]);

        assert!(matches!(cli.command, Commands::Check));
        assert_eq!(cli.config, Some("/path/to/config.toml".to_string()));
        assert!(cli.verbose);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["optolink-config"]).is_err());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result = Cli::try_parse_from(["optolink-config", "show", "--format", "yaml"]);
        assert!(result.is_err());
    }
}
