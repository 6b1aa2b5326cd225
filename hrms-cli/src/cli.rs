use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use hrms_client::Company;

#[derive(Parser, Debug)]
#[command(name = "hrms")]
#[command(
    author,
    version,
    about = "HRMS console - employees and attendance from the terminal",
    long_about = None
)]
pub struct Args {
    /// Configuration file path
    #[arg(long, global = true, env = "HRMS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides config and HRMS_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Json,
    JsonCompact,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session
    Login {
        #[arg(long, env = "HRMS_EMAIL")]
        email: String,

        #[arg(long, env = "HRMS_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// End the session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Show session state
    Status,

    /// Manage employees
    Employees {
        #[command(subcommand)]
        action: EmployeeAction,
    },

    /// Manage attendance
    Attendance {
        #[command(subcommand)]
        action: AttendanceAction,
    },

    /// Show or reset configuration
    Config {
        #[arg(long)]
        show: bool,

        #[arg(long)]
        reset: bool,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum EmployeeAction {
    /// List employees, optionally for one company
    List {
        #[arg(long, value_parser = parse_company)]
        company: Option<Company>,
    },

    /// Fetch one employee
    Get { id: String },

    /// Create an employee from a JSON document
    Create {
        /// JSON body, or @path to read it from a file
        #[arg(long)]
        data: String,
    },

    /// Update an employee from a JSON document
    Update {
        id: String,

        /// JSON body, or @path to read it from a file
        #[arg(long)]
        data: String,
    },

    /// Upload a new profile picture
    ProfilePic { id: String, file: PathBuf },

    /// Toggle active/inactive
    ToggleActive { id: String },

    /// Delete an employee
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum AttendanceAction {
    /// All attendance records
    All,

    /// Attendance of everyone on one day
    Daily {
        #[arg(long)]
        date: NaiveDate,

        #[arg(long, value_parser = parse_company)]
        company: Option<Company>,
    },

    /// Attendance history of one employee
    Employee {
        id: String,

        /// Extra query parameter, e.g. --param month=5
        #[arg(long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },

    /// One employee's record on one day
    Get {
        id: String,

        #[arg(long)]
        date: NaiveDate,
    },

    /// Mark attendance from a JSON document
    Mark {
        /// JSON body, or @path to read it from a file
        #[arg(long)]
        data: String,
    },

    /// Change the status of one record
    Update {
        id: String,

        #[arg(long)]
        date: NaiveDate,

        #[arg(long)]
        status: String,
    },

    /// Import an attendance sheet
    Upload { file: PathBuf },

    /// Parse an attendance sheet without importing it
    Preview { file: PathBuf },

    /// Check whether a day can still be edited
    CanModify {
        #[arg(long)]
        date: NaiveDate,
    },
}

fn parse_company(s: &str) -> Result<Company, String> {
    s.parse()
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
