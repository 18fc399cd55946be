//! Logo source resolvers
//!
//! Each resolver turns a channel identity into a downloadable image URL from
//! one external source. The orchestrator tries them in priority order:
//! explicit overrides, then the Wikipedia/Wikidata chain, then a best-effort
//! search of the public tv-logos repository.

pub mod overrides;
pub mod repo_search;
pub mod wiki;

use async_trait::async_trait;

use crate::errors::SourceError;
use crate::models::{ChannelEntry, ResolvedLogo};

pub use overrides::OverrideResolver;
pub use repo_search::RepoSearchResolver;
pub use wiki::WikiResolver;

/// One strategy for producing a logo URL.
///
/// `Ok(None)` means the source genuinely has nothing for this channel;
/// `Err` means the source misbehaved. Both fall through to the next resolver.
#[async_trait]
pub trait LogoResolver: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(&self, entry: &ChannelEntry) -> Result<Option<ResolvedLogo>, SourceError>;
}
