//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "medmig",
    version,
    about = "Migrate per-admission CSV exports into patient documents",
    long_about = "Group a flat admissions export into one document per patient and load it\n\
                  into a document store, with integrity checks before and after the load.\n\n\
                  Store settings come from MONGO_URI, DB_NAME, COLLECTION_NAME and DATA_FILE\n\
                  (read from the environment or a .env file)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow patient names and identities in logs and issue examples.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full migration: load, validate, transform, write, verify.
    Migrate(MigrateArgs),

    /// Run the pre-migration checks on the source file and report every issue.
    Validate(SourceArgs),

    /// Insert, read, update and delete a demo patient in the configured collection.
    CrudDemo(EnvArgs),
}

#[derive(Args)]
pub struct EnvArgs {
    /// Load environment variables from this file instead of searching for `.env`.
    #[arg(long = "env-file", value_name = "PATH")]
    pub env_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct SourceArgs {
    #[command(flatten)]
    pub env: EnvArgs,

    /// Source CSV (overrides DATA_FILE).
    #[arg(long = "data-file", value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// Year ages are measured against when deriving birth years
    /// (overrides MEDMIG_REFERENCE_YEAR; default: the current year).
    #[arg(long = "reference-year", value_name = "YEAR")]
    pub reference_year: Option<i32>,

    /// Derive patient identities from this immutable column (a birth date or
    /// patient number) instead of name and birth year.
    #[arg(long = "identity-column", value_name = "COLUMN")]
    pub identity_column: Option<String>,

    /// Key used by the duplicate-patient check. `identity` accepts repeat
    /// admissions of one patient.
    #[arg(long = "duplicate-key", value_enum, default_value = "name-age")]
    pub duplicate_key: DuplicateKeyArg,
}

#[derive(Args)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// What to do when rows of one patient disagree on age, gender or blood type.
    #[arg(long = "on-conflict", value_enum, default_value = "first-wins")]
    pub on_conflict: ConflictArg,

    /// Upsert by `_id` and prune stale patients instead of emptying the
    /// collection before inserting.
    #[arg(long = "upsert")]
    pub upsert: bool,

    /// Validate and transform without writing to the store.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ConflictArg {
    /// Keep the first row's values and report the conflict.
    FirstWins,
    /// Abort the run.
    Reject,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DuplicateKeyArg {
    /// No (Name, Age) pair may repeat.
    NameAge,
    /// Rows sharing an identity must agree on gender and blood type.
    Identity,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
