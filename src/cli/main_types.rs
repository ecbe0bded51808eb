use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "nxmisc")]
#[command(about = "Flatten nested JSON, read and write compressed files, and other small helpers")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, env = "NXMISC_CONFIG_DIR")]
    pub config_dir: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Table for terminals
    Table,
    /// One item per line
    Lines,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Flatten a nested JSON document
    Flatten {
        /// JSON file (.gz and .bz2 are decompressed); stdin when omitted or '-'
        file: Option<String>,
    },
    /// Report how a JSON document is classified
    Check {
        /// JSON file (.gz and .bz2 are decompressed); stdin when omitted or '-'
        file: Option<String>,
    },
    /// Print running totals
    Cumsum {
        /// Numbers to sum
        #[arg(required = true, allow_negative_numbers = true)]
        numbers: Vec<String>,
    },
    /// Generate unique ids
    Uuid {
        /// How many ids to generate
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },
    /// Print a file, decompressing .gz and .bz2
    Cat {
        file: String,
    },
    /// Copy stdin into a file, compressing by extension
    Write {
        file: String,
        /// Append instead of truncating
        #[arg(long)]
        append: bool,
    },
    /// Open a file in the default application
    Open {
        file: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Set configuration value
    Set {
        /// Configuration key, e.g. flatten.max_depth
        key: String,
        /// Configuration value
        value: String,
    },
}
