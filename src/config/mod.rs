use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_TARGET_PX: u32 = 128;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub endpoints: EndpointConfig,
    pub placeholder: PlaceholderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Side of the square output PNG, in pixels
    pub target_px: u32,
    /// Per-request timeout for all outbound calls
    pub timeout_secs: u64,
    /// Minimum spacing between any two outbound calls, shared across workers
    pub politeness_delay_ms: u64,
    /// How many channel entries may be in flight at once
    pub concurrency: usize,
    /// Identifying UA sent on every request
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub wikipedia_api: String,
    pub wikidata_api: String,
    /// Base of the Commons file-serving endpoint; file name and width are appended
    pub commons_filepath: String,
    pub github_search_api: String,
    /// Repository slug searched for logo assets
    pub logo_repo: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceholderConfig {
    /// Codes whose full label is drawn instead of the 6-character truncation
    pub full_label_codes: BTreeSet<String>,
    pub font_family: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        // TARGET_PX seeds the default once at load; the value travels through
        // the pipeline explicitly from here on.
        let target_px = std::env::var("TARGET_PX")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TARGET_PX);
        Self {
            target_px,
            timeout_secs: 20,
            politeness_delay_ms: 400,
            concurrency: 1,
            user_agent: format!(
                "channel-logos/{} (+for private lineup UI; contact local admin)",
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            wikipedia_api: "https://en.wikipedia.org/w/api.php".to_string(),
            wikidata_api: "https://www.wikidata.org/w/api.php".to_string(),
            commons_filepath: "https://commons.wikimedia.org/wiki/Special:FilePath".to_string(),
            github_search_api: "https://api.github.com/search/code".to_string(),
            logo_repo: "tv-logo/tv-logos".to_string(),
        }
    }
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        let codes = [
            "VALU", "RENEW", "DEAL", "INFO", "MALL", "SHOP", "BOOST", "EXTRA", "SALE", "SCAP1",
            "SCAP2", "SCAP3", "SCAP4", "BINGE", "ICTV", "YOUTV", "MSG4", "AMVO", "WEST", "PRTGS",
            "AUD", "AUD01", "AUD02", "AUD03", "AUD04", "AUD05", "AUD06", "AUD07", "AUD08", "AUD09",
            "AUD10", "AUD11", "AUD12", "AUD13", "ES24", "TODOC", "TONOM", "TDV", "ENLC", "MVSHG",
            "BITV", "HERIC",
        ];
        Self {
            full_label_codes: codes.iter().map(|c| c.to_string()).collect(),
            font_family: "DejaVu Sans".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(&config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }
}
