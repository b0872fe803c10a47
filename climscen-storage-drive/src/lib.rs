//! # climscen remote drive backend
//!
//! [`RemoteDrive`] implements [`climscen_core::StorageBackend`] over a
//! files-listing REST API authenticated with an OAuth2 refresh token.
//!
//! ## Example
//!
//! ```ignore
//! use climscen_storage_drive::{DriveConfig, RemoteDrive};
//! use climscen_core::StorageBackend;
//!
//! let drive = RemoteDrive::new(DriveConfig {
//!     client_id: "...".into(),
//!     client_secret: "...".into(),
//!     refresh_token: "...".into(),
//!     ..Default::default()
//! })?;
//! let top = drive.list(&drive.root_ref()).await?;
//! ```

pub mod auth;
pub mod config;
pub mod drive;
pub mod error;

pub use auth::{RefreshTokenAuth, RefreshTokenConfig, StaticToken, TokenProvider, AUTH_TARGET};
pub use config::{DriveConfig, DEFAULT_API_BASE, DEFAULT_PAGE_SIZE, DEFAULT_ROOT_ID, DEFAULT_TOKEN_URL};
pub use drive::{DriveFile, RemoteDrive, FOLDER_MIME_TYPE, STORAGE_METHOD_DRIVE};
pub use error::{DriveError, Result};
