//! Wikipedia/Wikidata logo resolver
//!
//! Four-step chain, each step optional: full-text search for an article
//! title, the article's wikibase item, the item's "logo image" claim, and
//! finally a direct-download Commons URL at the configured width. For local
//! broadcast stations the search query is a synthesized call-sign title
//! (`KSTP5` -> `KSTP-DT5`) because raw lineup codes rarely match articles.

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use super::LogoResolver;
use crate::config::EndpointConfig;
use crate::errors::SourceError;
use crate::models::{ChannelEntry, ChannelKind, LogoSource, ResolvedLogo};
use crate::pipeline::RequestPacer;

/// Wikidata property for "logo image"
const PROPERTY_LOGO_IMAGE: &str = "P154";

pub struct WikiResolver {
    client: reqwest::Client,
    pacer: Arc<RequestPacer>,
    endpoints: EndpointConfig,
    target_px: u32,
}

impl WikiResolver {
    pub fn new(
        client: reqwest::Client,
        pacer: Arc<RequestPacer>,
        endpoints: EndpointConfig,
        target_px: u32,
    ) -> Self {
        Self {
            client,
            pacer,
            endpoints,
            target_px,
        }
    }

    async fn get_json(&self, base: &str, params: &[(&str, &str)]) -> Result<Value, SourceError> {
        self.pacer.pause().await;
        let response = self.client.get(base).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: base.to_string(),
            });
        }
        Ok(response.json().await?)
    }

    /// Best-match article title for a free-text query.
    async fn search_title(&self, query: &str) -> Result<Option<String>, SourceError> {
        if query.is_empty() {
            return Ok(None);
        }
        let data = self
            .get_json(
                &self.endpoints.wikipedia_api,
                &[
                    ("action", "query"),
                    ("list", "search"),
                    ("srsearch", query),
                    ("srlimit", "1"),
                    ("format", "json"),
                ],
            )
            .await?;
        Ok(parse_search_title(&data))
    }

    /// Structured-data entity identifier attached to an article, if any.
    async fn wikibase_item(&self, title: &str) -> Result<Option<String>, SourceError> {
        let data = self
            .get_json(
                &self.endpoints.wikipedia_api,
                &[
                    ("action", "query"),
                    ("titles", title),
                    ("prop", "pageprops"),
                    ("format", "json"),
                ],
            )
            .await?;
        Ok(parse_wikibase_item(&data))
    }

    /// File name from the entity's logo-image claim.
    async fn logo_filename(&self, qid: &str) -> Result<Option<String>, SourceError> {
        let data = self
            .get_json(
                &self.endpoints.wikidata_api,
                &[
                    ("action", "wbgetclaims"),
                    ("entity", qid),
                    ("property", PROPERTY_LOGO_IMAGE),
                    ("format", "json"),
                ],
            )
            .await?;
        Ok(parse_logo_filename(&data))
    }
}

#[async_trait]
impl LogoResolver for WikiResolver {
    fn name(&self) -> &'static str {
        "wiki"
    }

    async fn resolve(&self, entry: &ChannelEntry) -> Result<Option<ResolvedLogo>, SourceError> {
        let query = match entry.kind {
            ChannelKind::Local => guess_station_title(&entry.code),
            _ => entry.hint().to_string(),
        };

        let mut title = self.search_title(&query).await?;
        if title.is_none() && entry.hint() != entry.code {
            debug!("no article for '{}', retrying with code {}", query, entry.code);
            title = self.search_title(&entry.code).await?;
        }
        let Some(title) = title else {
            return Ok(None);
        };

        let Some(qid) = self.wikibase_item(&title).await? else {
            return Ok(None);
        };
        let Some(filename) = self.logo_filename(&qid).await? else {
            return Ok(None);
        };

        let url = commons_file_url(&self.endpoints.commons_filepath, &filename, self.target_px);
        Ok(Some(ResolvedLogo {
            url,
            source: LogoSource::KnowledgeGraph,
            provenance: format!("{title} / {qid} -> {filename}"),
        }))
    }
}

fn parse_search_title(data: &Value) -> Option<String> {
    data["query"]["search"]
        .as_array()
        .and_then(|hits| hits.first())
        .and_then(|hit| hit["title"].as_str())
        .map(|t| t.to_string())
}

fn parse_wikibase_item(data: &Value) -> Option<String> {
    data["query"]["pages"]
        .as_object()
        .and_then(|pages| {
            pages
                .values()
                .find_map(|page| page["pageprops"]["wikibase_item"].as_str())
        })
        .map(|q| q.to_string())
}

fn parse_logo_filename(data: &Value) -> Option<String> {
    let claims = data["claims"][PROPERTY_LOGO_IMAGE].as_array()?;
    claims.iter().find_map(|claim| {
        let value = &claim["mainsnak"]["datavalue"]["value"];
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map.get("title").and_then(|t| t.as_str()).map(String::from),
            _ => None,
        }
    })
}

/// Direct-download URL for a Commons file at the requested width.
pub fn commons_file_url(base: &str, filename: &str, width: u32) -> String {
    let safe = urlencoding::encode(&filename.replace(' ', "_")).into_owned();
    format!("{base}/{safe}?width={width}")
}

/// Synthesize a broadcast call-sign article title from a lineup code.
///
/// `KSTP5` style codes become `KSTP-DT5`; bare call signs get a `-TV`
/// suffix; anything else is returned unchanged.
pub fn guess_station_title(code: &str) -> String {
    static DIGIT_SUFFIX: OnceLock<Regex> = OnceLock::new();
    static BARE_CALLSIGN: OnceLock<Regex> = OnceLock::new();

    let digit_suffix =
        DIGIT_SUFFIX.get_or_init(|| Regex::new(r"^([KW][A-Z]{3})(\d+)$").unwrap());
    if let Some(caps) = digit_suffix.captures(code) {
        return format!("{}-DT{}", &caps[1], &caps[2]);
    }

    let bare_callsign =
        BARE_CALLSIGN.get_or_init(|| Regex::new(r"^[KW][A-Z0-9]{3,5}$").unwrap());
    if bare_callsign.is_match(code) {
        return format!("{code}-TV");
    }

    code.to_string()
}
