//! Resource fetching: HTTP downloads and secret lookups.

pub mod http;
pub mod secret;

pub use http::Downloader;
pub use secret::SecretClient;
