//! # climscen connection
//!
//! Configuration parsing and connection initialization for climate-scenario
//! data trees.
//!
//! This crate provides:
//! - The INI reader with bracketed array literals ([`IniDocument`], [`ArrayValue`])
//! - Typed global and per-project configuration
//! - Backend selection ([`connect`]): local disk or remote drive
//! - [`Session`]s holding one lazily built [`ProjectSnapshot`] per project
//!
//! ## Quick Start
//!
//! ```ignore
//! use climscen_connection::{connect, ConnectionConfig};
//!
//! let config = ConnectionConfig::load("climscen.ini").await?;
//! let conn = connect(config)?;
//! for project in conn.list_projects().await? {
//!     println!("{}", project);
//! }
//!
//! let session = conn.session();
//! let demo = session.project("demo").await?;
//! let series = demo.index().files_matching("ts/*/*_rcp_False.csv")?;
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod ini;
pub mod locator;
pub mod session;

pub use config::{
    parse_year_range, ConfigValue, ConnectionConfig, DataSource, ProjectSettings,
    DEFAULT_REFERENCE_PERIOD, DEFAULT_SHARED_ROOT,
};
pub use connection::{connect, connect_local, Connection};
pub use error::{ConnectionError, Result};
pub use ini::{ArrayValue, IniDocument, IniSection};
pub use locator::{DirectoryLocator, ProjectLocator, StaticLocator};
pub use session::{ProjectSnapshot, Session};
