//! # Moextick Core
//!
//! Cached client for the Moscow Exchange ISS market-data API.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Single-flight TTL cache** with LRU eviction: concurrent lookups of the
//!   same key share one upstream fetch
//! - **Lookup services** for shares, bonds and instrument search
//! - **Domain models** with exact decimal prices and sentinel-aware coercion
//! - **Structured errors** that tell "does not exist" apart from "temporarily
//!   unreachable"
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`blocking`] | Synchronous facade over the async client |
//! | [`cache`] | `Cache` trait, `MemoryCache`, `NullCache` |
//! | [`client`] | `MoexClient` facade |
//! | [`config`] | `ClientConfig` and `MOEX_*` environment overrides |
//! | [`domain`] | Share, Bond, SearchResult and coercion helpers |
//! | [`endpoints`] | ISS paths |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction (reqwest/stub) |
//! | [`services`] | Share, bond and search lookups, board selection |
//! | [`session`] | ISS GET session |
//! | [`table`] | ISS `columns`/`data` block decoding |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use moextick_core::{ClientConfig, MoexClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MoexClient::new(ClientConfig::from_env()?);
//!
//!     let bond = client.bond("SU26238RMFS4").await?;
//!     println!("{bond}: {:?} RUB", bond.price());
//!
//!     for hit in client.find_shares("sber").await?.iter() {
//!         println!("{hit}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  MoexClient     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Lookup Service  │────▶│ Cache            │
//! │ (key + loader)  │     │ (single-flight)  │
//! └────────┬────────┘     └──────────────────┘
//!          │ loader
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ IssSession      │────▶│ HTTP Client      │
//! │ (ISS tables)    │     │ (reqwest/stub)   │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Domain Models   │
//! │ (Share, Bond)   │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`MoexError`], classified by [`MoexErrorKind`]:
//!
//! ```rust
//! use moextick_core::{MoexError, MoexErrorKind};
//!
//! fn handle_error(error: MoexError) {
//!     match error.kind() {
//!         MoexErrorKind::NotFound => {
//!             // Unknown ticker
//!         }
//!         MoexErrorKind::Upstream if error.retryable() => {
//!             // Call again later
//!         }
//!         MoexErrorKind::Validation => {
//!             // Report to user
//!         }
//!         _ => {}
//!     }
//! }
//! ```

pub mod blocking;
pub mod cache;
pub mod client;
pub mod config;
pub mod domain;
pub mod endpoints;
pub mod error;
pub mod http_client;
pub mod services;
pub mod session;
pub mod table;

// Re-export commonly used types at crate root for convenience

pub use blocking::BlockingClient;

// Caching
pub use cache::{Cache, CacheConfig, LoadFuture, MemoryCache, NullCache};

pub use client::MoexClient;

pub use config::ClientConfig;

// Domain models
pub use domain::{Bond, InstrumentKind, InstrumentType, SearchResult, Share, Ticker};

// Error types
pub use error::{MoexError, MoexErrorKind, ValidationError};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, StubHttpClient,
};

pub use services::{BondsService, SearchQuery, SearchService, SharesService};

pub use session::IssSession;

pub use table::{IssDocument, IssTable, Row};
