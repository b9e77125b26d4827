use thiserror::Error;

/// Failures surfaced by the Musixmatch resolver.
///
/// "No lyrics" is not an error: the resolver returns `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum LyricsError {
    /// No session token from the disk cache or a fresh fetch.
    #[error("musixmatch token unavailable: {0}")]
    TokenUnavailable(String),

    /// Every attempted lookup tier failed on transport, status or payload shape.
    #[error("musixmatch upstream error: {0}")]
    Upstream(String),
}
