//! Model asset provisioning for parley.
//!
//! Both the speech recognizer (one model archive per language) and the
//! translation engine (one weights file) depend on assets that must be
//! materialized on disk before use. This crate owns that lifecycle:
//!
//! - [`AssetStore::ensure`] -- idempotent provisioning with existence-only
//!   freshness: a cached asset is returned as-is, an absent one is
//!   downloaded, and zip archives are extracted next to the download
//! - [`RetryConfig`] -- bounded exponential backoff for the network
//!   transfer; nothing else in the system retries automatically
//! - [`AssetError`] -- typed failures (missing file, empty file, transfer,
//!   extraction) instead of panicking precondition checks

pub mod error;
pub mod retry;
pub mod store;

pub use error::{AssetError, Result};
pub use retry::RetryConfig;
pub use store::AssetStore;
