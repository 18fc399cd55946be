use async_trait::async_trait;
use std::collections::HashMap;

use super::LogoResolver;
use crate::errors::SourceError;
use crate::models::{ChannelEntry, LogoSource, ResolvedLogo};

/// Highest-priority resolver: a direct URL table loaded once per run.
/// Pure lookup, no network.
pub struct OverrideResolver {
    table: HashMap<String, String>,
}

impl OverrideResolver {
    pub fn new(table: HashMap<String, String>) -> Self {
        Self { table }
    }
}

#[async_trait]
impl LogoResolver for OverrideResolver {
    fn name(&self) -> &'static str {
        "override"
    }

    async fn resolve(&self, entry: &ChannelEntry) -> Result<Option<ResolvedLogo>, SourceError> {
        Ok(self.table.get(&entry.code).map(|url| ResolvedLogo {
            url: url.clone(),
            source: LogoSource::Override,
            provenance: "overrides table".to_string(),
        }))
    }
}
