//! capi-unwrap CLI — fetches obfuscated API endpoints and recovers their JSON.

pub mod commands;
pub mod config;
pub mod endpoints;
pub mod fetch;
pub mod output;

pub use config::{resolve_fetch_config, ConfigOverrides, FetchConfig};
pub use fetch::{ApiClient, FetchError, Fetched};
