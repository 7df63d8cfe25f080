//! # parley-types
//!
//! Core type definitions for the parley speech translation core.
//!
//! This crate is the leaf of the dependency graph -- every other parley
//! crate depends on it. It contains:
//!
//! - **[`catalog`]** -- the fixed language catalog ([`Language`]) and the
//!   model asset descriptors ([`ModelAsset`]) the provisioner materializes
//! - **[`catalog::weights`]** -- the translation-model weight files known
//!   to the application

pub mod catalog;

pub use catalog::{Language, ModelAsset};
