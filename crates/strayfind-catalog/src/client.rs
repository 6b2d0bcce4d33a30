//! Immich REST client: user discovery and paginated asset search.

use crate::error::{CatalogError, CatalogResult};
use crate::source::CatalogSource;
use crate::types::{SearchMetadataRequest, SearchMetadataResponse, User};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use strayfind_core::{CatalogSnapshot, ContentRecord};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Default number of assets requested per search page.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

const API_KEY_HEADER: &str = "x-api-key";

/// Client for the subset of the Immich API needed to enumerate assets.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
    api_key: String,
    http: Client,
    page_size: u32,
    cancel: CancellationToken,
}

impl CatalogClient {
    /// Create a client for `base_url` (trailing slashes are ignored).
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http,
            page_size: DEFAULT_PAGE_SIZE,
            cancel: CancellationToken::new(),
        }
    }

    /// Override the search page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Abort in-flight and future requests when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The user that owns the configured API key.
    pub async fn fetch_current_user(&self) -> CatalogResult<User> {
        let url = format!("{}/api/users/me", self.base_url);
        let (status, body) = self.send(self.http.get(&url), &url).await?;
        if status != StatusCode::OK {
            return Err(status_error(url, status, body));
        }

        let user: User = decode(&body, "current user")?;
        info!(name = %user.name, storage_label = ?user.storage_label, "Authenticated user");
        Ok(user)
    }

    /// All users, via the admin endpoint.
    ///
    /// Returns [`CatalogError::NotAdmin`] when the key lacks admin rights,
    /// which callers use to choose between admin and single-user mode.
    pub async fn fetch_all_users(&self) -> CatalogResult<Vec<User>> {
        let url = format!("{}/api/admin/users", self.base_url);
        let (status, body) = self.send(self.http.get(&url), &url).await?;
        if status == StatusCode::FORBIDDEN {
            return Err(CatalogError::NotAdmin);
        }
        if status != StatusCode::OK {
            return Err(status_error(url, status, body));
        }

        let users: Vec<User> = decode(&body, "user list")?;
        info!(user_count = users.len(), "Fetched admin user list");
        Ok(users)
    }

    /// Page through the search endpoint, merging every page into `snapshot`.
    ///
    /// Only assets visible to the calling key are returned; there is no
    /// owner filter on this endpoint.
    pub async fn fetch_all_assets(&self, snapshot: &mut CatalogSnapshot) -> CatalogResult<()> {
        let url = format!("{}/api/search/metadata", self.base_url);
        let mut page: u32 = 1;

        loop {
            if self.cancel.is_cancelled() {
                return Err(CatalogError::Cancelled);
            }

            let request = SearchMetadataRequest {
                page,
                size: self.page_size,
                with_exif: false,
            };
            let (status, body) = self.send(self.http.post(&url).json(&request), &url).await?;
            if status != StatusCode::OK {
                return Err(status_error(format!("{} (page {})", url, page), status, body));
            }

            let response: SearchMetadataResponse = decode(&body, &format!("search page {}", page))?;
            let assets = response.assets;
            let records: Vec<ContentRecord> = assets.items.iter().map(ContentRecord::from).collect();
            snapshot.merge(&records);

            debug!(
                page,
                count = assets.count,
                total_paths_so_far = snapshot.paths().len(),
                "Fetched asset page"
            );

            let next = match assets.next_page {
                Some(next) if assets.count > 0 => next,
                _ => break,
            };
            page = next
                .parse()
                .map_err(|_| CatalogError::InvalidNextPage(next.clone()))?;
        }

        info!(
            total_paths = snapshot.paths().len(),
            total_asset_ids = snapshot.content_ids().len(),
            total_user_ids = snapshot.owner_ids().len(),
            "Finished fetching assets from Immich"
        );
        Ok(())
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> CatalogResult<(StatusCode, String)> {
        let request = request.header(API_KEY_HEADER, &self.api_key);
        let http_err = |source: reqwest::Error| CatalogError::Http {
            url: url.to_string(),
            source,
        };

        tokio::select! {
            _ = self.cancel.cancelled() => Err(CatalogError::Cancelled),
            result = async {
                let response = request.send().await.map_err(http_err)?;
                let status = response.status();
                let body = response.text().await.map_err(http_err)?;
                Ok::<_, CatalogError>((status, body))
            } => result,
        }
    }
}

fn status_error(url: String, status: StatusCode, body: String) -> CatalogError {
    CatalogError::Status {
        url,
        status: status.as_u16(),
        body,
    }
}

fn decode<T: DeserializeOwned>(body: &str, what: &str) -> CatalogResult<T> {
    serde_json::from_str(body).map_err(|source| CatalogError::Decode {
        what: what.to_string(),
        source,
    })
}

#[async_trait]
impl CatalogSource for CatalogClient {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn collect(&self, snapshot: &mut CatalogSnapshot) -> CatalogResult<()> {
        self.fetch_all_assets(snapshot).await
    }
}
