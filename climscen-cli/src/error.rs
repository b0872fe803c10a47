use colored::Colorize;
use std::fmt;
use std::process;

pub const EXIT_ERROR: i32 = 1;

/// Unified error type for CLI operations.
pub enum CliError {
    /// Connection, configuration or project loading failure
    Connection(climscen_connection::ConnectionError),
    /// Storage or pattern error
    Core(climscen_core::Error),
    /// Selection or resolution error
    Catalog(climscen_catalog::CatalogError),
    /// Missing or unreadable configuration
    Config(String),
    /// Project or artifact not found
    NotFound(String),
    /// Output serialization failure
    Output(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Connection(e) => write!(f, "{} {e}", "error:".red().bold()),
            CliError::Core(e) => write!(f, "{} {e}", "error:".red().bold()),
            CliError::Catalog(climscen_catalog::CatalogError::Incomplete { dimension }) => write!(
                f,
                "{} no {dimension} selected\n  {} run 'climscen resolve' to see the legal values",
                "error:".red().bold(),
                "help:".cyan().bold(),
            ),
            CliError::Catalog(e) => write!(f, "{} {e}", "error:".red().bold()),
            CliError::Config(msg) => write!(
                f,
                "{} {msg}\n  {} pass --config <file> or --data-dir <dir>",
                "error:".red().bold(),
                "help:".cyan().bold(),
            ),
            CliError::NotFound(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Output(msg) => write!(f, "{} {msg}", "error:".red().bold()),
        }
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<climscen_connection::ConnectionError> for CliError {
    fn from(e: climscen_connection::ConnectionError) -> Self {
        CliError::Connection(e)
    }
}

impl From<climscen_core::Error> for CliError {
    fn from(e: climscen_core::Error) -> Self {
        CliError::Core(e)
    }
}

impl From<climscen_catalog::CatalogError> for CliError {
    fn from(e: climscen_catalog::CatalogError) -> Self {
        CliError::Catalog(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(format!("JSON encode error: {e}"))
    }
}

/// Print error and exit.
pub fn exit_with_error(err: CliError) -> ! {
    eprintln!("{err}");
    process::exit(EXIT_ERROR)
}

pub type CliResult<T> = std::result::Result<T, CliError>;
