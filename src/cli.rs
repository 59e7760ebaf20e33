use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "farmcast",
    version,
    about = "Regional farm weather aggregation, advisory insights and crop recommendations"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    Serve,
    /// Run one forecast cycle for a region and print it
    Forecast {
        /// City name, e.g. Nairobi
        region: String,
    },
    /// Recommend crops for soil and weather conditions
    Recommend {
        #[arg(long)]
        soil_type: String,
        /// Expected rainfall in mm
        #[arg(long)]
        rainfall: f64,
        /// Temperature in °C
        #[arg(long)]
        temperature: f64,
        #[arg(long)]
        farmer_id: Option<String>,
    },
    /// Show stored forecast snapshots, newest first
    History {
        #[arg(long)]
        region: Option<String>,
    },
    /// Re-run interactive setup
    Init,
    /// Validate config and test connections
    Check,
}

impl Cli {
    /// Log filter used when RUST_LOG is unset
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::parse_from(["farmcast"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn parses_recommend_flags() {
        let cli = Cli::parse_from([
            "farmcast",
            "-vv",
            "recommend",
            "--soil-type",
            "clay",
            "--rainfall",
            "70",
            "--temperature",
            "15",
        ]);
        assert_eq!(cli.log_filter(), "trace");
        match cli.command {
            Some(Commands::Recommend {
                soil_type,
                rainfall,
                farmer_id,
                ..
            }) => {
                assert_eq!(soil_type, "clay");
                assert_eq!(rainfall, 70.0);
                assert!(farmer_id.is_none());
            }
            _ => panic!("expected recommend command"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["farmcast", "history", "--data-dir", "/tmp/fc", "-v"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/fc")));
        assert_eq!(cli.verbose, 1);
    }
}
