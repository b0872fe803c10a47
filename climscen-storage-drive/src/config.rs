//! Remote drive connection settings

use std::fmt::Debug;

/// Default files API base URL.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";
/// Default OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Alias for the account's top-level folder.
pub const DEFAULT_ROOT_ID: &str = "root";
/// Largest page the files API accepts.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Configuration for [`crate::RemoteDrive`].
#[derive(Clone)]
pub struct DriveConfig {
    /// Files API base URL (no trailing slash)
    pub api_base: String,
    /// OAuth2 token endpoint
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// Identifier of the folder treated as the backend root
    pub root_id: String,
    /// Page size for listing calls
    pub page_size: u32,
    /// Connect timeout in seconds (default: 30)
    pub connect_timeout_secs: u64,
    /// Request timeout in seconds (default: 60)
    pub request_timeout_secs: u64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
            root_id: DEFAULT_ROOT_ID.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            connect_timeout_secs: 30,
            request_timeout_secs: 60,
        }
    }
}

impl Debug for DriveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveConfig")
            .field("api_base", &self.api_base)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("root_id", &self.root_id)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}
