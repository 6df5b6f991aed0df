use crate::core::sync::SourceKind;
use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for cabinlog
#[derive(Parser)]
#[command(
    name = "cabinlog",
    version = env!("CARGO_PKG_VERSION"),
    about = "Reconcile cabin reservations with vehicle trips and presence readings into check-in/check-out times",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Run one sync cycle per source from JSON feed files
    Sync {
        #[arg(long, value_enum, help = "Only sync this source")]
        source: Option<SourceKind>,

        #[arg(long, value_name = "FILE", help = "Calendar export with sync_token and reservations")]
        calendar: Option<String>,

        #[arg(long, value_name = "FILE", help = "Vehicle trips (JSON array)")]
        trips: Option<String>,

        #[arg(long, value_name = "FILE", help = "Presence readings (JSON array)")]
        presence: Option<String>,
    },

    /// Poll the configured feeds periodically
    Watch {
        #[arg(long, help = "Stop after this many cycles per source")]
        cycles: Option<u64>,
    },

    /// Recompute check-in/check-out for every stored reservation
    Reconcile {
        #[arg(long, value_name = "YYYY-MM-DD", help = "Reconcile as of this date")]
        today: Option<String>,
    },

    /// Inspect or reset sync checkpoints
    Checkpoint {
        #[arg(long, help = "List stored checkpoints")]
        list: bool,

        #[arg(long, value_enum, value_name = "SOURCE", help = "Forget a checkpoint (next sync is full)")]
        reset: Option<SourceKind>,
    },

    /// List reservations with their check-in/check-out
    List {
        #[arg(long, short, help = "Filter by year/month/day or a custom range")]
        period: Option<String>,
    },

    /// Export reservations
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Filter export by year/month/day or a custom range"
        )]
        period: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },
}
