//! Utility modules.
//!
//! - [`HttpClient`]: reqwest client configured from [`CatalogConfig`](crate::config::CatalogConfig)
//!
//! ```rust,no_run
//! use bookmark::config::CatalogConfig;
//! use bookmark::utils::HttpClient;
//!
//! # fn main() -> Result<(), reqwest::Error> {
//! let client = HttpClient::from_config(&CatalogConfig::default())?;
//! let _inner = client.client();
//! # Ok(())
//! # }
//! ```

mod http;

pub use http::HttpClient;
