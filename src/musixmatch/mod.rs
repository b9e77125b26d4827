//! Musixmatch desktop API client
//!
//! - `api`: HTTP transport and response envelopes
//! - `session`: anonymous session token cache with single-flight refresh
//! - `token_store`: on-disk token cache
//! - `resolver`: tiered lyrics lookup

pub mod api;
pub mod models;
pub mod resolver;
pub mod session;
pub mod token_store;

pub use api::MusixmatchClient;
pub use resolver::LyricsResolver;
pub use session::SessionManager;
pub use token_store::TokenStore;
