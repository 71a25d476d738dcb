use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "cdsops")]
#[command(about = "Operations tool for the CDS fleet: inventory tables and usage reports")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the fleet API host
    #[arg(long, global = true)]
    pub host: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the device list, optionally filtered by sn or company
    List {
        filter: Option<String>,

        /// Show license and traffic counters
        #[arg(short, long)]
        long: bool,
    },

    /// Show one device and its nodes
    Show { sn: String },

    /// Show the SSH endpoint of a device
    Port { sn: String },

    /// Build the disk-tier usage report and write it as a zip of CSV sheets
    Report {
        #[arg(long)]
        output_dir: Option<String>,

        /// Pool size for both stages, overriding the configuration
        #[arg(long)]
        workers: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_with_filter() {
        let cli = Cli::parse_from(["cdsops", "list", "Acme", "-l"]);
        match cli.command {
            Command::List { filter, long } => {
                assert_eq!(filter.as_deref(), Some("Acme"));
                assert!(long);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_report_with_global_flags() {
        let cli = Cli::parse_from([
            "cdsops",
            "report",
            "--output-dir",
            "/var/reports",
            "--workers",
            "1",
            "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Command::Report {
                output_dir,
                workers,
            } => {
                assert_eq!(output_dir.as_deref(), Some("/var/reports"));
                assert_eq!(workers, Some(1));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_show_requires_sn() {
        assert!(Cli::try_parse_from(["cdsops", "show"]).is_err());
    }
}
