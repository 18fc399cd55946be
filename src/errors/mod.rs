//! Error type definitions for the channel-logos pipeline
//!
//! The resolver waterfall treats most failures as routine: a source that
//! finds nothing and a source that times out both fall through to the next
//! source. The types here keep those cases distinguishable in logs even
//! though they drive the same control-flow branch.

use thiserror::Error;

/// Failures while talking to an external logo source.
///
/// Resolvers return `Result<Option<ResolvedLogo>, SourceError>`: `Ok(None)`
/// is a genuine not-found, `Err` is a transient problem with the source
/// itself. The orchestrator logs the two differently but continues down the
/// waterfall in both cases.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Request exceeded the per-call timeout
    #[error("timeout contacting {url}")]
    Timeout { url: String },

    /// Non-success HTTP status from an external endpoint
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// Connection/transport failure or undecodable response body
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    /// Response arrived but did not have the expected shape
    #[error("unexpected response: {message}")]
    Malformed { message: String },
}

impl SourceError {
    pub fn malformed<M: Into<String>>(message: M) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// True for statuses that usually mean the API is throttling us rather
    /// than telling us the asset does not exist.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::Http { status, .. } if *status == 403 || *status == 429)
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            Self::Transport(err)
        }
    }
}

/// Per-entry failures past the resolution stage.
///
/// Decode failures demote the entry to a placeholder; persist failures are
/// the only thing counted against the run.
#[derive(Error, Debug)]
pub enum LogoError {
    /// Downloaded bytes are not a decodable raster image
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    /// Placeholder synthesis failed
    #[error("placeholder generation failed: {message}")]
    Placeholder { message: String },

    /// Cache write failed
    #[error("failed to persist logo: {0}")]
    Persist(#[from] std::io::Error),
}

impl LogoError {
    pub fn placeholder<M: Into<String>>(message: M) -> Self {
        Self::Placeholder {
            message: message.into(),
        }
    }
}
