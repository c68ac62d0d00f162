use clap::{Args, Parser, Subcommand};
use roster::domain::models::{wire, Priority, Status};
use roster::domain::{CalendarMode, SortOrder, TabFilter};
use time::Date;

#[derive(Debug, Parser)]
#[command(name = "roster")]
#[command(about = "Standby schedule, task board and programmer directory")]
pub struct Cli {
    /// Use seeded in-memory data instead of the configured services
    #[arg(long, global = true)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in with a username or email
    Login {
        #[arg(long)]
        identifier: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
    },
    /// Remove the local session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Print config path and create default file if missing
    ConfigPath,
    /// On-call assignments
    #[command(subcommand)]
    Standby(StandbyCommand),
    /// Work items
    #[command(subcommand)]
    Tasks(TaskCommand),
    /// Programmer directory
    #[command(subcommand)]
    Programmers(ProgrammerCommand),
}

#[derive(Debug, Subcommand)]
pub enum StandbyCommand {
    /// Show assignments for a week (default) or month
    List {
        /// week or month
        #[arg(long, default_value = "week")]
        mode: CalendarMode,
        /// Shorthand for `--mode month`
        #[arg(long, conflicts_with = "mode")]
        month: bool,
        /// Any date inside the window, YYYY-MM-DD. Defaults to today.
        #[arg(long, value_parser = parse_date)]
        anchor: Option<Date>,
        /// Windows to move forward (or back, when negative)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i32,
    },
    Add(NewStandbyArgs),
    Edit {
        id: i64,
        #[command(flatten)]
        fields: StandbyEditArgs,
    },
    Remove {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct NewStandbyArgs {
    #[arg(long)]
    pub npm: i64,
    #[arg(long, value_parser = parse_date)]
    pub date: Date,
    /// HH:MM; `8.30`, `830` and `8` are accepted too
    #[arg(long, default_value = "08:30")]
    pub start: String,
    #[arg(long, default_value = "15:30")]
    pub end: String,
}

#[derive(Debug, Args)]
pub struct StandbyEditArgs {
    #[arg(long)]
    pub npm: Option<i64>,
    #[arg(long, value_parser = parse_date)]
    pub date: Option<Date>,
    #[arg(long)]
    pub start: Option<String>,
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Show tasks grouped by section
    List {
        /// all, in-progress or done
        #[arg(long, default_value = "all")]
        tab: TabFilter,
        /// none, priority or deadline
        #[arg(long, default_value = "none")]
        sort: SortOrder,
    },
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, value_parser = parse_date)]
        due: Date,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        priority: Priority,
        #[arg(long, default_value = "")]
        section: String,
    },
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_parser = parse_date)]
        due: Option<Date>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        section: Option<String>,
        /// todo, in-progress or done
        #[arg(long)]
        status: Option<Status>,
    },
    /// Mark done, or back to in progress
    Toggle { id: i64 },
    Remove {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProgrammerCommand {
    List {
        /// Matches name, phone, specialty or region
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        specialty: Option<String>,
    },
    Add {
        #[arg(long)]
        npm: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        specialty: String,
        #[arg(long, default_value = "")]
        region: String,
    },
    Edit {
        npm: i64,
        #[arg(long)]
        new_npm: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        specialty: Option<String>,
        #[arg(long)]
        region: Option<String>,
    },
    Remove {
        npm: i64,
        #[arg(long)]
        yes: bool,
    },
}

fn parse_date(value: &str) -> Result<Date, String> {
    wire::parse_date(value.trim()).map_err(|_| format!("'{value}' is not a YYYY-MM-DD date"))
}
