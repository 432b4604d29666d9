//! # Media Vault Common Library
//!
//! Shared code for the Media Vault tools including:
//! - Entity kinds of the catalog
//! - Catalog database initialization and lookups
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod db;
pub mod entity;
pub mod error;

pub use entity::EntityKind;
pub use error::{Error, Result};
