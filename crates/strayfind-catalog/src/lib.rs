#![warn(missing_docs)]

//! strayfind catalog sources: paginated Immich REST client and direct PostgreSQL query
//!
//! Both sources fold their results into a [`strayfind_core::CatalogSnapshot`]
//! batch by batch through the [`CatalogSource`] trait.

pub mod client;
pub mod db;
pub mod error;
pub mod source;
pub mod types;

pub use client::{CatalogClient, DEFAULT_PAGE_SIZE};
pub use db::{redact_db_url, DatabaseSource, ACTIVE_ASSETS_QUERY};
pub use error::{CatalogError, CatalogResult};
pub use source::CatalogSource;
pub use types::{Asset, SearchAssets, SearchMetadataRequest, SearchMetadataResponse, User};
