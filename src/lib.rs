//! # Listing Agent Library
//!
//! Keeps an eBay user access token valid and fetches marketplace listings as
//! normalized [`ListingData`](models::listing::ListingData).
//!
//! Modules:
//! - `cache`: in-memory token state and the single-flight token manager
//! - `sources`: refresh-grant client and the Browse API listing client
//! - `resilience`: retrying HTTP transport with backoff and Retry-After support
//! - `parser`: item id extraction and payload to listing mapping
//! - `sinks`: credential stores (env file, memory)
//! - `config`: YAML service configuration, defaults and validation

pub mod cache;
pub mod config;
pub mod error;
pub mod helpers;
pub mod models;
pub mod observability;
pub mod parser;
pub mod resilience;
pub mod sinks;
pub mod sources;
pub mod tests;
pub mod utils;

pub use crate::cache::token::TokenState;
pub use crate::cache::token_manager::TokenManager;
pub use crate::config::settings::ServiceConfig;
pub use crate::error::{Error, Result};
pub use crate::models::listing::{ListingData, ListingType, Pricing, ShippingType};
pub use crate::sources::listing::ListingClient;
