//! [`StorageBackend`] over a files-listing REST API.
//!
//! The remote store addresses items by opaque identifier; folders are items
//! with the folder MIME type and an item's location is given only by its
//! `parents` links. Listing is one paginated query per directory level
//! (`'<parent>' in parents`), so every recursive operation is built on top of
//! [`StorageBackend::list`] by `climscen_core::walk`.

use crate::auth::{RefreshTokenAuth, RefreshTokenConfig, TokenProvider, AUTH_TARGET};
use crate::config::{DriveConfig, DEFAULT_ROOT_ID};
use crate::error::{DriveError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use climscen_core::{path_segments, Entry, EntryKind, StorageBackend};
use parking_lot::RwLock;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

/// Storage method identifier for remote drive backends.
pub const STORAGE_METHOD_DRIVE: &str = "drive";

/// MIME type the files API uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Per-item fields requested from the API.
const FILE_FIELDS: &str = "id,name,mimeType,size,parents,modifiedTime";

/// Longest parent chain followed by `resolve_id_to_path`.
const MAX_DEPTH: usize = 256;

/// Item metadata as returned by the files API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    /// Decimal byte count (the API serializes int64 as a string)
    #[serde(default)]
    pub size: Option<String>,
    /// Missing for items without a parent (treated as root-adjacent)
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub modified_time: Option<String>,
}

impl DriveFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    pub fn to_entry(&self) -> Entry {
        Entry {
            name: self.name.clone(),
            id: self.id.clone(),
            kind: if self.is_folder() {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
            size: self.size.as_deref().and_then(|s| s.parse().ok()),
            modified: self
                .modified_time
                .as_deref()
                .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
                .map(|t| t.with_timezone(&Utc)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Quote a value for use inside a files API query string literal.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn children_query(parent_id: &str) -> String {
    format!("{} in parents and trashed = false", quote(parent_id))
}

/// Remote drive storage backend.
pub struct RemoteDrive {
    api_base: String,
    root_id: String,
    page_size: u32,
    http: reqwest::Client,
    auth: Arc<dyn TokenProvider>,
    /// Metadata of every item seen so far, keyed by id
    known: RwLock<HashMap<String, DriveFile>>,
}

impl Debug for RemoteDrive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteDrive")
            .field("api_base", &self.api_base)
            .field("root_id", &self.root_id)
            .field("page_size", &self.page_size)
            .field("auth", &self.auth)
            .finish()
    }
}

impl RemoteDrive {
    /// Create a backend authenticating with the OAuth2 refresh-token grant.
    pub fn new(config: DriveConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        let auth = RefreshTokenAuth::new(
            RefreshTokenConfig {
                token_url: config.token_url.clone(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                refresh_token: config.refresh_token.clone(),
            },
            http.clone(),
        )?;
        Ok(Self::from_parts(config, http, Arc::new(auth)))
    }

    /// Create a backend with a caller-supplied token provider.
    pub fn with_auth(config: DriveConfig, auth: Arc<dyn TokenProvider>) -> Result<Self> {
        let http = build_http_client(&config)?;
        Ok(Self::from_parts(config, http, auth))
    }

    fn from_parts(config: DriveConfig, http: reqwest::Client, auth: Arc<dyn TokenProvider>) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            root_id: config.root_id,
            page_size: config.page_size.max(1),
            http,
            auth,
            known: RwLock::new(HashMap::new()),
        }
    }

    /// Number of failed token acquisitions since this backend was created.
    ///
    /// A non-zero value means empty listings may be caused by credentials
    /// rather than by missing data.
    pub fn auth_failures(&self) -> u64 {
        self.auth.failures()
    }

    async fn bearer(&self) -> Option<String> {
        let token = self.auth.access_token().await;
        if token.is_empty() {
            tracing::debug!(target: AUTH_TARGET, "no access token, request skipped");
            None
        } else {
            Some(token)
        }
    }

    fn rejected(&self, status: StatusCode, what: &str) -> bool {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!(
                target: AUTH_TARGET,
                status = status.as_u16(),
                request = what,
                "files API rejected access token"
            );
            self.auth.invalidate();
            true
        } else {
            false
        }
    }

    /// List children of a folder, optionally restricted to one MIME type.
    pub async fn list_with_mime(
        &self,
        parent_id: &str,
        mime_type: Option<&str>,
    ) -> Result<Vec<DriveFile>> {
        let mut q = children_query(parent_id);
        if let Some(mime) = mime_type {
            q.push_str(&format!(" and mimeType = {}", quote(mime)));
        }
        self.query_files(&q).await
    }

    /// Look up a direct child of a folder by exact name.
    pub async fn find_child(&self, parent_id: &str, name: &str) -> Result<Option<DriveFile>> {
        let q = format!(
            "{} in parents and name = {} and trashed = false",
            quote(parent_id),
            quote(name)
        );
        Ok(self
            .query_files(&q)
            .await?
            .into_iter()
            .find(|f| f.name == name))
    }

    /// Run a files query, following `nextPageToken` until exhausted.
    async fn query_files(&self, q: &str) -> Result<Vec<DriveFile>> {
        let Some(token) = self.bearer().await else {
            return Ok(Vec::new());
        };

        let url = format!("{}/files", self.api_base);
        let fields = format!("nextPageToken,files({})", FILE_FIELDS);
        let page_size = self.page_size.to_string();
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut params = vec![
                ("q", q),
                ("fields", fields.as_str()),
                ("pageSize", page_size.as_str()),
            ];
            if let Some(t) = page_token.as_deref() {
                params.push(("pageToken", t));
            }

            let response = self
                .http
                .get(&url)
                .bearer_auth(&token)
                .query(&params)
                .send()
                .await?;
            let status = response.status();
            if self.rejected(status, "list") {
                return Ok(Vec::new());
            }
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(DriveError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let page: FileList = response.json().await?;
            pages += 1;
            files.extend(page.files);
            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        tracing::debug!(query = q, pages, files = files.len(), "listed drive folder");
        self.remember(&files);
        Ok(files)
    }

    fn remember(&self, files: &[DriveFile]) {
        let mut known = self.known.write();
        for file in files {
            known.insert(file.id.clone(), file.clone());
        }
    }

    /// Metadata of one item, from the local cache or the API.
    pub async fn get_file(&self, id: &str) -> Result<Option<DriveFile>> {
        let cached = self.known.read().get(id).cloned();
        if cached.is_some() {
            return Ok(cached);
        }
        let Some(token) = self.bearer().await else {
            return Ok(None);
        };

        let response = self
            .http
            .get(format!("{}/files/{}", self.api_base, id))
            .bearer_auth(&token)
            .query(&[("fields", FILE_FIELDS)])
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND || self.rejected(status, "metadata") {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DriveError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let file: DriveFile = response.json().await?;
        self.remember(std::slice::from_ref(&file));
        Ok(Some(file))
    }

    /// Download an item's content.
    pub async fn download(&self, id: &str) -> Result<Vec<u8>> {
        let Some(token) = self.bearer().await else {
            return Err(DriveError::not_found(id));
        };

        let response = self
            .http
            .get(format!("{}/files/{}", self.api_base, id))
            .bearer_auth(&token)
            .query(&[("alt", "media")])
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND || self.rejected(status, "download") {
            return Err(DriveError::not_found(id));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DriveError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// True when `file` is the top of the account hierarchy and `root_id`
    /// is the account root alias.
    fn is_account_root(&self, file: &DriveFile) -> bool {
        self.root_id == DEFAULT_ROOT_ID && file.parents.is_empty()
    }
}

fn build_http_client(config: &DriveConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| DriveError::Http(format!("Failed to build HTTP client: {}", e)))
}

#[async_trait]
impl StorageBackend for RemoteDrive {
    fn method(&self) -> &str {
        STORAGE_METHOD_DRIVE
    }

    fn root_ref(&self) -> String {
        self.root_id.clone()
    }

    async fn list(&self, dir_ref: &str) -> climscen_core::Result<Vec<Entry>> {
        let mut entries: Vec<Entry> = self
            .list_with_mime(dir_ref, None)
            .await?
            .iter()
            .map(DriveFile::to_entry)
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn read_bytes(&self, item_ref: &str) -> climscen_core::Result<Vec<u8>> {
        Ok(self.download(item_ref).await?)
    }

    async fn resolve_path_to_id(&self, path: &str) -> climscen_core::Result<Option<String>> {
        let mut current = self.root_id.clone();
        for segment in path_segments(path) {
            match self.find_child(&current, segment).await? {
                Some(child) => current = child.id,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    async fn resolve_id_to_path(&self, id: &str) -> climscen_core::Result<Option<String>> {
        if id == self.root_id {
            return Ok(Some(String::new()));
        }
        let Some(mut current) = self.get_file(id).await? else {
            return Ok(None);
        };

        let mut names = Vec::new();
        loop {
            if names.len() >= MAX_DEPTH {
                return Err(DriveError::decode(format!("parent chain of {} too deep", id)).into());
            }
            names.push(current.name.clone());

            // Parentless items sit directly under the root
            let Some(parent_id) = current.parents.first().cloned() else {
                break;
            };
            if parent_id == self.root_id {
                break;
            }
            match self.get_file(&parent_id).await? {
                Some(parent) if !self.is_account_root(&parent) => current = parent,
                _ => break,
            }
        }

        names.reverse();
        Ok(Some(names.join("/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("abc"), "'abc'");
        assert_eq!(quote("it's"), "'it\\'s'");
        assert_eq!(quote("a\\b"), "'a\\\\b'");
        assert_eq!(children_query("root"), "'root' in parents and trashed = false");
    }

    #[test]
    fn test_file_without_parents_deserializes() {
        let file: DriveFile = serde_json::from_value(json!({
            "id": "f1",
            "name": "pr_rcp_False.csv",
            "mimeType": "text/csv",
            "size": "1024",
            "modifiedTime": "2024-03-01T12:00:00.000Z"
        }))
        .unwrap();
        assert!(file.parents.is_empty());

        let entry = file.to_entry();
        assert_eq!(entry.kind, EntryKind::File);
        assert_eq!(entry.size, Some(1024));
        assert!(entry.modified.is_some());
    }

    #[test]
    fn test_folder_entry() {
        let file: DriveFile = serde_json::from_value(json!({
            "id": "d1",
            "name": "ts",
            "mimeType": FOLDER_MIME_TYPE,
            "parents": ["root"]
        }))
        .unwrap();
        let entry = file.to_entry();
        assert!(entry.is_dir());
        assert_eq!(entry.size, None);
        assert_eq!(entry.modified, None);
    }
}
