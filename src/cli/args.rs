use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::responders::ResponderKind;
use crate::session::Locale;

#[derive(Parser, Debug)]
#[command(name = "agrimate")]
#[command(version)]
#[command(about = "A multilingual farming assistant for the terminal", long_about = None)]
pub struct Cli {
    /// Conversation language (en, hi, pa)
    #[arg(short, long, value_enum)]
    pub locale: Option<Locale>,

    /// Reply backend (overrides the configured one)
    #[arg(short, long, value_enum)]
    pub responder: Option<ResponderKind>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Ask a single question and exit
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Output format for non-interactive mode
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, requires = "prompt")]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// Start a chat session (default)
    Chat,
    /// Show current weather conditions
    Weather {
        /// City to look up (defaults to the configured city)
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,
        /// Latitude in decimal degrees
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Longitude in decimal degrees
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },
    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON structured output
    Json,
}
