//! Shared types, error model, and configuration for sitepages.
//!
//! This crate is the foundation depended on by all other sitepages crates.
//! It provides:
//! - [`SitePagesError`]: the unified error type
//! - Domain types ([`PageList`], [`DiscoveryMethod`], [`DiscoveryResult`], [`Envelope`])
//! - Configuration ([`AppConfig`], [`FetchConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FetchConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{Result, SitePagesError};
pub use types::{DiscoveryFailure, DiscoveryMethod, DiscoveryResult, Envelope, PageList, Payload};
