use clap::{Parser, Subcommand};

/// Command-line interface definition for qrcheckin
/// Event check-in: attendee lists, QR messages, door scanning and sync
#[derive(Parser)]
#[command(
    name = "qrcheckin",
    version = env!("CARGO_PKG_VERSION"),
    about = "Event check-in CLI: import attendees, send QR codes, scan at the door and sync to a spreadsheet",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Operator name for commands that require credentials
    #[arg(global = true, long = "operator")]
    pub operator: Option<String>,

    /// Operator passcode (prompted when omitted)
    #[arg(global = true, long = "passcode")]
    pub passcode: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
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

    /// Create, list, select or delete sessions (events)
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Import attendees from a CSV file into the active session
    Import {
        /// CSV file with a header row
        file: String,

        #[arg(long, conflicts_with = "merge", help = "Replace the current roster")]
        replace: bool,

        #[arg(long, help = "Append attendees whose phone is not yet registered")]
        merge: bool,
    },

    /// Register one attendee in the active session
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: String,

        #[arg(long, default_value = "")]
        affiliation: String,

        #[arg(long, default_value = "")]
        vehicle: String,

        #[arg(long = "event", help = "Event or program name")]
        event: Option<String>,

        #[arg(long)]
        disability: Option<String>,

        #[arg(long = "device", help = "Assistive device")]
        device: Option<String>,
    },

    /// Delete attendees by phone (admin)
    Del {
        #[arg(required = true)]
        phones: Vec<String>,

        #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
        yes: bool,
    },

    /// Remove every attendee of the active session (admin)
    Clear {
        #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
        yes: bool,
    },

    /// List the attendees of the active session
    List {
        #[arg(long, short, help = "Filter by name, affiliation or phone")]
        search: Option<String>,

        #[arg(long, conflicts_with = "pending", help = "Only checked-in attendees")]
        checked: bool,

        #[arg(long, help = "Only attendees not yet checked in")]
        pending: bool,
    },

    /// Manually check in an attendee
    Checkin {
        phone: String,
    },

    /// Cancel the check-in of an attendee
    Cancel {
        phone: String,
    },

    /// Process scanned QR payloads (one per line on stdin)
    Scan {
        #[arg(long, help = "Process a single payload instead of reading stdin")]
        payload: Option<String>,
    },

    /// Write the QR code of one attendee to a PNG file
    Qr {
        phone: String,

        #[arg(long, value_name = "FILE")]
        out: String,
    },

    /// Send the QR code to every attendee of the active session
    Send {
        #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
        yes: bool,

        #[arg(long, help = "Override the configured message template")]
        message: Option<String>,
    },

    /// Mirror sessions to the configured sync endpoint
    Sync {
        #[command(subcommand)]
        action: SyncCommand,
    },

    /// Manage operator credentials
    Operator {
        #[command(subcommand)]
        action: OperatorAction,
    },

    /// Print or manage the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Create a session and make it active
    Create { name: String },

    /// List local sessions
    List,

    /// Make a session active (by id, id prefix or name)
    Use { session: String },

    /// Delete a session and all of its attendees (admin)
    Delete {
        session: String,

        #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum SyncCommand {
    /// Upload the active session
    Push,

    /// List remote sessions, most recently updated first
    Sessions,

    /// Download a remote session into a new local session
    Pull {
        name: String,

        #[arg(long = "as", value_name = "NAME", help = "Local session name")]
        as_name: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum OperatorAction {
    /// Register an operator (admin, or anyone while no operator exists)
    Add {
        name: String,

        #[arg(long, default_value = "staff", help = "admin or staff")]
        role: String,

        #[arg(long = "new-passcode", help = "Passcode of the new operator (prompted when omitted)")]
        new_passcode: Option<String>,
    },

    /// List registered operators
    List,
}
