use crate::error::{CliError, CliResult};
use climscen_connection::{connect_local, Connection, ConnectionConfig};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "climscen.ini";

/// Open the data tree named by the flags.
///
/// Precedence: `--data-dir`, then `--config`, then `./climscen.ini`.
pub async fn connect(config: Option<&Path>, data_dir: Option<&Path>) -> CliResult<Connection> {
    if let Some(dir) = data_dir {
        return Ok(connect_local(dir));
    }
    let path = match config {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return Err(CliError::Config(format!(
                    "no {} in the current directory",
                    DEFAULT_CONFIG_FILE
                )));
            }
            default
        }
    };
    let config = ConnectionConfig::load(&path).await.map_err(|e| {
        CliError::Config(format!("cannot load config '{}': {}", path.display(), e))
    })?;
    Ok(climscen_connection::connect(config)?)
}

/// Load one project's snapshot, reporting an unknown name as not found.
///
/// After a failed token refresh the empty snapshot is returned instead, so
/// commands print empty results and the auth warning explains them.
pub async fn project(
    conn: &Connection,
    name: &str,
) -> CliResult<Arc<climscen_connection::ProjectSnapshot>> {
    let snapshot = conn.session().project(name).await?;
    if !snapshot.is_located() && conn.auth_failures() == 0 {
        return Err(CliError::NotFound(format!("project '{}' not found", name)));
    }
    Ok(snapshot)
}

/// Warn when empty results may come from rejected credentials.
pub fn report_auth_failures(conn: &Connection) {
    let failures = conn.auth_failures();
    if failures > 0 {
        eprintln!(
            "{} {} failed token refresh attempt(s); listings may be incomplete",
            "warning:".yellow().bold(),
            failures
        );
    }
}
