//! Roster and overrides loading
//!
//! Both inputs are plain CSV. Roster rows missing a number or a code are
//! skipped silently; a missing overrides file is an empty table.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::models::{ChannelEntry, ChannelKind};

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(default)]
    number: Option<String>,
    #[serde(default)]
    code: Option<String>,
    /// Legacy header accepted as a fallback for `code`
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    search_hint: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OverrideRow {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    direct_image_url: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Load the channel roster. An unreadable roster is the one fatal input error
/// of a run.
pub fn load_channels(path: &Path) -> Result<Vec<ChannelEntry>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open roster {}", path.display()))?;

    let mut entries = Vec::new();
    for row in reader.deserialize() {
        let row: RosterRow =
            row.with_context(|| format!("malformed roster row in {}", path.display()))?;

        let number = non_empty(row.number).and_then(|n| n.parse::<u32>().ok());
        let code = non_empty(row.code).or_else(|| non_empty(row.name));
        let (number, code) = match (number, code) {
            (Some(number), Some(code)) => (number, code),
            _ => {
                debug!("skipping roster row without number/code");
                continue;
            }
        };

        entries.push(ChannelEntry {
            number,
            code,
            kind: ChannelKind::parse(row.kind.as_deref().unwrap_or("network")),
            search_hint: non_empty(row.search_hint),
        });
    }
    Ok(entries)
}

/// Load the explicit URL overrides table, keyed by channel code.
pub fn load_overrides(path: Option<&Path>) -> Result<HashMap<String, String>> {
    let mut overrides = HashMap::new();
    let Some(path) = path else {
        return Ok(overrides);
    };
    if !path.exists() {
        return Ok(overrides);
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open overrides {}", path.display()))?;
    for row in reader.deserialize() {
        let row: OverrideRow =
            row.with_context(|| format!("malformed overrides row in {}", path.display()))?;
        if let (Some(code), Some(url)) = (non_empty(row.code), non_empty(row.direct_image_url)) {
            overrides.insert(code, url);
        }
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn roster_rows_missing_identity_are_skipped() {
        let file = write_csv(
            "number,code,type,search_hint\n\
             7,ESPN,network,ESPN\n\
             ,NONUM,network,\n\
             8,,local,\n\
             9,KSTP5,local,\n",
        );
        let entries = load_channels(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].code, "ESPN");
        assert_eq!(entries[1].code, "KSTP5");
        assert_eq!(entries[1].kind, ChannelKind::Local);
        assert_eq!(entries[1].search_hint, None);
    }

    #[test]
    fn roster_accepts_name_header_for_code() {
        let file = write_csv("number,name,type\n12,HBO,network\n");
        let entries = load_channels(file.path()).unwrap();
        assert_eq!(entries[0].code, "HBO");
    }

    #[test]
    fn missing_overrides_file_is_empty_table() {
        let overrides =
            load_overrides(Some(Path::new("/nonexistent/overrides.csv"))).unwrap();
        assert!(overrides.is_empty());
        assert!(load_overrides(None).unwrap().is_empty());
    }

    #[test]
    fn overrides_require_both_columns() {
        let file = write_csv(
            "code,direct_image_url\n\
             ESPN,http://example/espn.png\n\
             HBO,\n",
        );
        let overrides = load_overrides(Some(file.path())).unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides["ESPN"], "http://example/espn.png");
    }
}
