//! studyhub CLI
//!
//! Command-line front end for the learning-platform database: seed it,
//! browse the bundle catalog, and manage student notifications.

mod commands;
mod error;
mod settings;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use studyhub_catalog::BundleOrderType;

pub(crate) use error::CliError;

#[derive(Parser)]
#[command(name = "studyhub")]
#[command(about = "Browse and manage a learning-platform catalog", long_about = None)]
struct Cli {
    /// Database file (defaults to the configured or standard location)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Show debug output, including generated SQL
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or seed the database
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Query the bundle catalog
    Bundles {
        #[command(subcommand)]
        action: BundleAction,
    },

    /// Manage a student's notifications
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Create the database file and schema
    Init,

    /// Load a YAML fixture into the database
    Seed {
        /// Fixture file
        fixture: PathBuf,
    },
}

#[derive(Subcommand)]
enum BundleAction {
    /// Show one bundle with its courses and class totals
    Get {
        id: i64,
    },

    /// List bundles
    List {
        /// Mark bundles this student already owns
        #[arg(short, long)]
        student: Option<i64>,

        /// Maximum number of bundles
        #[arg(short, long)]
        limit: Option<u32>,

        /// Case-sensitive name prefix
        #[arg(short, long, default_value = "")]
        prefix: String,

        /// Sort column (name, price, sales, courses)
        #[arg(long)]
        order_by: Option<BundleOrderType>,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Bundles containing every course of the given bundle
    Extensions {
        id: i64,

        /// Skip bundles this student already owns
        #[arg(short, long)]
        student: Option<i64>,
    },

    /// Bundles sharing no course with the given bundle
    Unrelated {
        id: i64,

        /// Skip bundles this student already owns
        #[arg(short, long)]
        student: Option<i64>,
    },

    /// Count a bundle's classes and total length
    Classes {
        id: i64,
    },

    /// Print the number of bundles
    Total,
}

#[derive(Subcommand)]
enum NotificationAction {
    /// List a student's notifications, newest first
    List {
        student: i64,

        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Mark a notification as read
    Read { student: i64, id: i64 },

    /// Mark a notification as unread
    Unread { student: i64, id: i64 },

    /// Delete a notification
    Delete { student: i64, id: i64 },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the settings file and resolved database path
    Show,

    /// Print the settings file path
    Path,

    /// Save the default database path
    SetDb { path: PathBuf },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let db = cli.db;
    match cli.command {
        Commands::Db { action } => match action {
            DbAction::Init => commands::db::run_init(db),
            DbAction::Seed { fixture } => commands::db::run_seed(db, &fixture),
        },
        Commands::Bundles { action } => match action {
            BundleAction::Get { id } => commands::bundles::run_get(db, id),
            BundleAction::List {
                student,
                limit,
                prefix,
                order_by,
                desc,
            } => commands::bundles::run_list(db, student, limit, prefix, order_by, desc),
            BundleAction::Extensions { id, student } => {
                commands::bundles::run_extensions(db, id, student)
            }
            BundleAction::Unrelated { id, student } => {
                commands::bundles::run_unrelated(db, id, student)
            }
            BundleAction::Classes { id } => commands::bundles::run_classes(db, id),
            BundleAction::Total => commands::bundles::run_total(db),
        },
        Commands::Notifications { action } => match action {
            NotificationAction::List { student, limit } => {
                commands::notifications::run_list(db, student, limit)
            }
            NotificationAction::Read { student, id } => {
                commands::notifications::run_read(db, student, id)
            }
            NotificationAction::Unread { student, id } => {
                commands::notifications::run_unread(db, student, id)
            }
            NotificationAction::Delete { student, id } => {
                commands::notifications::run_delete(db, student, id)
            }
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_show(db),
            ConfigAction::Path => commands::config::run_path(),
            ConfigAction::SetDb { path } => commands::config::run_set_db(&path),
        },
    }
}

/// Install a message-only logger. `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| match record.level() {
            log::Level::Info => writeln!(buf, "{}", record.args()),
            level => writeln!(buf, "[{level}] {}", record.args()),
        })
        .init();
}

/// Print an empty line through the logger.
pub(crate) fn log_blank() {
    log::info!("");
}
