//! Configuration types for climscen connections
//!
//! Global configuration (`climscen.ini`):
//!
//! ```text
//! [storage]
//! backend = drive            # local | drive
//! base_dir = /data/climate   # local only
//! shared_root = context
//!
//! [drive]
//! client_id = 1234.apps.example.com
//! client_secret_env = CLIMSCEN_CLIENT_SECRET
//! refresh_token_env = CLIMSCEN_REFRESH_TOKEN
//! root_path = Climate/Projects
//!
//! [catalog]
//! reference_period = [1981,2010]
//! ```
//!
//! Per-project settings live in `<project>/<project>.ini` (or
//! `<project>/project.ini`) under a `[project]` section.

use crate::error::{ConnectionError, Result};
use crate::ini::{ArrayValue, IniDocument, IniSection};
use climscen_storage_drive::DriveConfig;
use std::path::{Path, PathBuf};

/// Name of the shared root holding cross-project artifacts.
pub const DEFAULT_SHARED_ROOT: &str = "context";

/// Reference period used when neither the project nor the global config sets one.
pub const DEFAULT_REFERENCE_PERIOD: (i32, i32) = (1981, 2010);

/// A leaf value that may be indirected through an environment variable.
///
/// `key_env = VAR` names the variable; the plain `key` is the fallback.
#[derive(Debug, Clone, Default)]
pub struct ConfigValue {
    pub env_var: Option<String>,
    pub default_val: Option<String>,
}

impl ConfigValue {
    pub fn from_section(section: &IniSection, key: &str) -> Self {
        Self {
            env_var: section.get(&format!("{}_env", key)).map(str::to_string),
            default_val: section.get(key).map(str::to_string),
        }
    }

    pub fn resolve_string(&self) -> Option<String> {
        if let Some(var) = &self.env_var {
            if let Ok(val) = std::env::var(var) {
                if !val.is_empty() {
                    return Some(val);
                }
            }
        }
        self.default_val.clone()
    }
}

/// Where the data tree lives.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// Directory on the local filesystem
    Local { base_dir: PathBuf },
    /// Folder on the remote drive; `root_path` is relative to `drive.root_id`
    Drive { drive: DriveConfig, root_path: String },
}

/// Parsed global configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub source: DataSource,
    /// Name of the shared root directory next to the projects
    pub shared_root: String,
    /// Default reference period (projects may override)
    pub reference_period: (i32, i32),
}

impl ConnectionConfig {
    /// Local-disk configuration with defaults.
    pub fn local(base_dir: impl AsRef<Path>) -> Self {
        Self {
            source: DataSource::Local {
                base_dir: base_dir.as_ref().to_path_buf(),
            },
            shared_root: DEFAULT_SHARED_ROOT.to_string(),
            reference_period: DEFAULT_REFERENCE_PERIOD,
        }
    }

    /// Read and parse a configuration file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Self::from_ini(&IniDocument::parse(text)?)
    }

    pub fn from_ini(doc: &IniDocument) -> Result<Self> {
        let storage = doc.section("storage");
        let backend = storage.and_then(|s| s.get("backend")).unwrap_or("local");

        let source = match backend {
            "local" | "file" => {
                let base_dir = storage
                    .and_then(|s| ConfigValue::from_section(s, "base_dir").resolve_string())
                    .ok_or_else(|| {
                        ConnectionError::invalid_config("storage.base_dir is required for local backend")
                    })?;
                DataSource::Local {
                    base_dir: PathBuf::from(base_dir),
                }
            }
            "drive" => {
                let section = doc.section("drive").ok_or_else(|| {
                    ConnectionError::invalid_config("[drive] section is required for drive backend")
                })?;
                DataSource::Drive {
                    drive: parse_drive_config(section)?,
                    root_path: section.get("root_path").unwrap_or("").to_string(),
                }
            }
            other => {
                return Err(ConnectionError::invalid_config(format!(
                    "unknown storage backend: {}",
                    other
                )))
            }
        };

        let shared_root = storage
            .and_then(|s| s.get("shared_root"))
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SHARED_ROOT)
            .to_string();

        let reference_period = match doc.get("catalog", "reference_period") {
            Some(text) => parse_year_range(text)?,
            None => DEFAULT_REFERENCE_PERIOD,
        };

        Ok(Self {
            source,
            shared_root,
            reference_period,
        })
    }
}

fn parse_drive_config(section: &IniSection) -> Result<DriveConfig> {
    let mut config = DriveConfig::default();
    let secret = |key: &str| ConfigValue::from_section(section, key).resolve_string();

    config.client_id = secret("client_id")
        .ok_or_else(|| ConnectionError::invalid_config("drive.client_id is required"))?;
    config.client_secret = secret("client_secret").unwrap_or_default();
    config.refresh_token = secret("refresh_token")
        .ok_or_else(|| ConnectionError::invalid_config("drive.refresh_token is required"))?;

    if let Some(api_base) = section.get("api_base") {
        config.api_base = api_base.to_string();
    }
    if let Some(token_url) = section.get("token_url") {
        config.token_url = token_url.to_string();
    }
    if let Some(root_id) = section.get("root_id").filter(|s| !s.is_empty()) {
        config.root_id = root_id.to_string();
    }
    if let Some(page_size) = section.get("page_size") {
        config.page_size = parse_number(page_size, "drive.page_size")?;
    }
    if let Some(timeout) = section.get("timeout_secs") {
        config.request_timeout_secs = parse_number(timeout, "drive.timeout_secs")?;
    }
    Ok(config)
}

fn parse_number<T: std::str::FromStr>(text: &str, what: &str) -> Result<T> {
    text.trim()
        .parse()
        .map_err(|_| ConnectionError::invalid_config(format!("{} is not a number: {}", what, text)))
}

/// Parse a year range from `[1981,2010]` or `1981-2010`.
pub fn parse_year_range(text: &str) -> Result<(i32, i32)> {
    let value = ArrayValue::parse(text)?;
    let parts = match &value {
        ArrayValue::List(_) => value
            .to_strings()
            .ok_or_else(|| ConnectionError::array(text, "expected a flat pair"))?,
        ArrayValue::Scalar(s) => s.split('-').map(str::to_string).collect(),
    };
    let [start, end] = parts.as_slice() else {
        return Err(ConnectionError::array(text, "expected two years"));
    };
    let start: i32 = parse_number(start, "year")?;
    let end: i32 = parse_number(end, "year")?;
    if start > end {
        return Err(ConnectionError::invalid_config(format!(
            "year range starts after it ends: {}",
            text
        )));
    }
    Ok((start, end))
}

/// Settings from a project's own INI file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectSettings {
    pub description: Option<String>,
    pub reference_period: Option<(i32, i32)>,
    pub centiles: Vec<u32>,
    pub horizons: Vec<(i32, i32)>,
    pub emission_scenarios: Vec<String>,
}

impl ProjectSettings {
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_ini(&IniDocument::parse(text)?)
    }

    pub fn from_ini(doc: &IniDocument) -> Result<Self> {
        let Some(section) = doc.section("project") else {
            return Ok(Self::default());
        };

        let reference_period = section
            .get("reference_period")
            .map(parse_year_range)
            .transpose()?;

        let centiles = match section.get_array("centiles")? {
            Some(value) => value
                .to_strings()
                .ok_or_else(|| ConnectionError::invalid_config("project.centiles must be a flat list"))?
                .iter()
                .map(|c| parse_number(c, "centile"))
                .collect::<Result<Vec<u32>>>()?,
            None => Vec::new(),
        };

        let horizons = match section.get_array("horizons")? {
            Some(value) => value
                .to_rows()
                .ok_or_else(|| ConnectionError::invalid_config("project.horizons must be a list of pairs"))?
                .iter()
                .map(|row| match row.as_slice() {
                    [start, end] => Ok((parse_number(start, "year")?, parse_number(end, "year")?)),
                    _ => Err(ConnectionError::invalid_config(
                        "project.horizons entries must be [start,end]",
                    )),
                })
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let emission_scenarios = match section.get_array("emission_scenarios")? {
            Some(value) => value.to_strings().ok_or_else(|| {
                ConnectionError::invalid_config("project.emission_scenarios must be a flat list")
            })?,
            None => Vec::new(),
        };

        Ok(Self {
            description: section.get("description").map(str::to_string),
            reference_period,
            centiles,
            horizons,
            emission_scenarios,
        })
    }
}
