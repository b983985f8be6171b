//! Shared types, error model, and configuration for formfill.
//!
//! This crate is the foundation depended on by all other formfill crates.
//! It provides:
//! - [`FormFillError`] — the unified error type
//! - Domain types ([`FormData`], [`DateOrder`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, FillConfig, StorageConfig, UiConfig, config_dir, config_file_path,
    expand_home, init_config, load_config, load_config_from,
};
pub use error::{FormFillError, Result};
pub use types::{DateOrder, FORM_DATA_KEY, FormData};
