use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "vernote")]
#[command(about = "Notes with places, photos and passcode-verified sign-off")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// GraphQL data API endpoint (overrides VERNOTE_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Local data file used when no data API is configured
    #[arg(long, global = true, value_name = "PATH")]
    pub data_path: Option<PathBuf>,

    /// Quick capture: vernote "my note here"
    #[arg(trailing_var_arg = true)]
    pub note: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note content
        content: Vec<String>,
        /// Latitude of where the note was written
        #[arg(long, requires = "long", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Longitude of where the note was written
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        long: Option<f64>,
        /// Photo to attach
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
    },
    /// List notes grouped by day
    List {
        /// Only show notes containing this text (case-insensitive)
        #[arg(short, long)]
        query: Option<String>,
        /// Group by UTC days instead of local days
        #[arg(long)]
        utc: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search notes by content
    Search {
        /// Search query
        query: String,
        /// Group by UTC days instead of local days
        #[arg(long)]
        utc: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single note
    Show {
        /// Note ID or unique ID prefix
        id: String,
        /// Show times and the day in UTC instead of local time
        #[arg(long)]
        utc: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Attach a photo to an existing note
    AttachImage {
        /// Note ID or unique ID prefix
        id: String,
        /// Image file to attach
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Sign off a note as a verifier
    Verify {
        /// Note ID or unique ID prefix
        id: String,
        /// Verifier ID or unique ID prefix
        #[arg(long, value_name = "ID")]
        verifier: String,
        /// Six-digit passcode (read from stdin when omitted)
        #[arg(long)]
        passcode: Option<String>,
    },
    /// Manage verifiers
    Verifier {
        #[command(subcommand)]
        command: VerifierCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum VerifierCommands {
    /// Register a new verifier
    Add {
        /// Display name
        #[arg(long)]
        name: String,
        /// Six-digit passcode between 100000 and 999999 (read from stdin when omitted)
        #[arg(long)]
        passcode: Option<String>,
    },
    /// List registered verifiers
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
