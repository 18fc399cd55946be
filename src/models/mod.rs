//! Core data types shared across the pipeline

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Broad channel category, used to pick a search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Over-the-air broadcast station (call-sign based search)
    Local,
    /// National network/cable channel
    Network,
    /// Anything else in the lineup (shopping, audio, barker channels)
    Other,
}

impl ChannelKind {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Self::Local,
            "network" | "" => Self::Network,
            _ => Self::Other,
        }
    }
}

/// One row of the channel roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub number: u32,
    pub code: String,
    pub kind: ChannelKind,
    pub search_hint: Option<String>,
}

impl ChannelEntry {
    /// Free-text search hint, falling back to the code when none was given.
    pub fn hint(&self) -> &str {
        match self.search_hint.as_deref() {
            Some(hint) if !hint.is_empty() => hint,
            _ => &self.code,
        }
    }
}

/// Which source ultimately produced the cached image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoSource {
    Override,
    KnowledgeGraph,
    RepoSearch,
    Placeholder,
}

impl std::fmt::Display for LogoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Override => "override",
            Self::KnowledgeGraph => "knowledge-graph",
            Self::RepoSearch => "repo-search",
            Self::Placeholder => "placeholder",
        };
        write!(f, "{name}")
    }
}

/// A resolver hit: a downloadable URL plus provenance for logging.
#[derive(Debug, Clone)]
pub struct ResolvedLogo {
    pub url: String,
    pub source: LogoSource,
    pub provenance: String,
}

/// Run-level accounting built up by the orchestrator.
#[derive(Debug, Default, Clone)]
pub struct RunReport {
    /// Entries written this run; cache hits are tallied separately
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cached: usize,
    /// code -> canonical cache path, for every entry that ended with a file
    pub written: BTreeMap<String, PathBuf>,
    /// code -> source that produced the file
    pub sources: BTreeMap<String, LogoSource>,
}

impl RunReport {
    pub fn record_success(&mut self, code: &str, path: PathBuf, source: LogoSource) {
        self.success += 1;
        self.written.insert(code.to_string(), path);
        self.sources.insert(code.to_string(), source);
    }

    pub fn record_cached(&mut self, code: &str, path: PathBuf) {
        self.cached += 1;
        self.written.insert(code.to_string(), path);
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parsing_defaults_to_network() {
        assert_eq!(ChannelKind::parse("local"), ChannelKind::Local);
        assert_eq!(ChannelKind::parse("Network"), ChannelKind::Network);
        assert_eq!(ChannelKind::parse(""), ChannelKind::Network);
        assert_eq!(ChannelKind::parse("shopping"), ChannelKind::Other);
    }

    #[test]
    fn hint_falls_back_to_code() {
        let entry = ChannelEntry {
            number: 7,
            code: "ESPN".to_string(),
            kind: ChannelKind::Network,
            search_hint: None,
        };
        assert_eq!(entry.hint(), "ESPN");

        let entry = ChannelEntry {
            search_hint: Some("ESPN sports".to_string()),
            ..entry
        };
        assert_eq!(entry.hint(), "ESPN sports");
    }
}
