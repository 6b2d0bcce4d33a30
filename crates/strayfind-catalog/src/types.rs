//! Wire types for the Immich REST API.

use serde::{Deserialize, Serialize};
use strayfind_core::ContentRecord;

/// Body for `POST /api/search/metadata`.
///
/// The search endpoint has no owner filter; results are always scoped to the
/// calling user's assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetadataRequest {
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub size: u32,
    /// Whether to include EXIF data (never needed here)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub with_exif: bool,
}

/// Paginated response from the search endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchMetadataResponse {
    /// Asset page
    pub assets: SearchAssets,
}

/// One page of assets plus pagination info.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAssets {
    /// Total matching assets
    #[serde(default)]
    pub total: u64,
    /// Items on this page
    #[serde(default)]
    pub count: u64,
    /// Assets on this page
    #[serde(default)]
    pub items: Vec<Asset>,
    /// Next page number as a string, or null on the last page
    #[serde(default)]
    pub next_page: Option<String>,
}

/// A single asset as returned by the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Asset ID
    #[serde(default)]
    pub id: String,
    /// Owning user ID
    #[serde(default)]
    pub owner_id: String,
    /// Storage path of the original file
    #[serde(default)]
    pub original_path: String,
    /// Upload filename
    #[serde(default)]
    pub original_file_name: String,
    /// IMAGE, VIDEO, ...
    #[serde(default, rename = "type")]
    pub asset_type: String,
}

impl From<&Asset> for ContentRecord {
    fn from(asset: &Asset) -> Self {
        ContentRecord::new(&asset.id, &asset.owner_id, &asset.original_path)
    }
}

/// A user as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Directory name under `library/`, if the admin assigned one
    #[serde(default)]
    pub storage_label: Option<String>,
}

impl User {
    /// Storage label, treating an empty string as unset.
    pub fn storage_label(&self) -> Option<&str> {
        self.storage_label.as_deref().filter(|l| !l.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_camel_case() {
        let req = SearchMetadataRequest { page: 2, size: 1000, with_exif: false };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"page": 2, "size": 1000}));
    }

    #[test]
    fn test_response_deserializes() {
        let body = r#"{
            "assets": {
                "total": 2,
                "count": 1,
                "items": [{
                    "id": "a1",
                    "ownerId": "u1",
                    "originalPath": "/data/library/admin/a.jpg",
                    "originalFileName": "a.jpg",
                    "type": "IMAGE",
                    "isFavorite": false
                }],
                "nextPage": "2"
            }
        }"#;
        let resp: SearchMetadataResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.assets.count, 1);
        assert_eq!(resp.assets.next_page.as_deref(), Some("2"));
        assert_eq!(resp.assets.items[0].owner_id, "u1");
        assert_eq!(resp.assets.items[0].asset_type, "IMAGE");
    }

    #[test]
    fn test_response_null_next_page() {
        let body = r#"{"assets": {"total": 0, "count": 0, "items": [], "nextPage": null}}"#;
        let resp: SearchMetadataResponse = serde_json::from_str(body).unwrap();
        assert!(resp.assets.next_page.is_none());
    }

    #[test]
    fn test_asset_to_record() {
        let asset = Asset {
            id: "a1".to_string(),
            owner_id: String::new(),
            original_path: "upload/a.jpg".to_string(),
            ..Asset::default()
        };
        let record = ContentRecord::from(&asset);
        assert_eq!(record.id.as_deref(), Some("a1"));
        assert!(record.owner_id.is_none());
        assert_eq!(record.path.as_deref(), Some("upload/a.jpg"));
    }

    #[test]
    fn test_user_storage_label() {
        let user: User =
            serde_json::from_str(r#"{"id": "u1", "name": "Alice", "storageLabel": null}"#).unwrap();
        assert!(user.storage_label().is_none());

        let user = User { storage_label: Some(String::new()), ..user };
        assert!(user.storage_label().is_none());

        let user = User { storage_label: Some("alice".to_string()), ..user };
        assert_eq!(user.storage_label(), Some("alice"));
    }
}
