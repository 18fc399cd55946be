//! Best-effort search of a public logo-asset repository
//!
//! Issues a code-search query per candidate term against the configured
//! GitHub repository, preferring hits filed under a United-States folder.
//! Request failures are swallowed per term so the next candidate still gets
//! tried; rate-limit statuses are logged distinctly because a long batch
//! run can exhaust the unauthenticated search quota without ever seeing a
//! hard error otherwise.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::LogoResolver;
use crate::config::EndpointConfig;
use crate::errors::SourceError;
use crate::models::{ChannelEntry, LogoSource, ResolvedLogo};
use crate::pipeline::RequestPacer;

const US_PATH_MARKERS: [&str; 3] = ["United-States", "/US/", "/United States/"];

pub struct RepoSearchResolver {
    client: reqwest::Client,
    pacer: Arc<RequestPacer>,
    search_api: String,
    repo: String,
}

impl RepoSearchResolver {
    pub fn new(client: reqwest::Client, pacer: Arc<RequestPacer>, endpoints: &EndpointConfig) -> Self {
        Self {
            client,
            pacer,
            search_api: endpoints.github_search_api.clone(),
            repo: endpoints.logo_repo.clone(),
        }
    }

    async fn search(&self, term: &str) -> Result<Option<String>, SourceError> {
        self.pacer.pause().await;
        let query = format!("{term} repo:{}", self.repo);
        let response = self
            .client
            .get(&self.search_api)
            .query(&[("q", query.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: self.search_api.clone(),
            });
        }
        let data: Value = response.json().await?;
        Ok(pick_result(&data))
    }
}

#[async_trait]
impl LogoResolver for RepoSearchResolver {
    fn name(&self) -> &'static str {
        "repo-search"
    }

    async fn resolve(&self, entry: &ChannelEntry) -> Result<Option<ResolvedLogo>, SourceError> {
        let mut terms = vec![entry.hint()];
        if entry.code.as_str() != entry.hint() {
            terms.push(entry.code.as_str());
        }

        for term in terms {
            match self.search(term).await {
                Ok(Some(url)) => {
                    return Ok(Some(ResolvedLogo {
                        url,
                        source: LogoSource::RepoSearch,
                        provenance: format!("search term '{term}'"),
                    }));
                }
                Ok(None) => debug!("no repo hit for '{term}'"),
                Err(err) if err.is_rate_limit() => {
                    warn!("repo search rate-limited on '{term}': {err}");
                }
                Err(err) => debug!("repo search failed on '{term}': {err}"),
            }
        }
        Ok(None)
    }
}

/// Choose a hit from the search response: first United-States path, else the
/// top-ranked result, converted to a raw-content URL.
fn pick_result(data: &Value) -> Option<String> {
    let items = data["items"].as_array()?;
    for item in items {
        let path = item["path"].as_str().unwrap_or("");
        if US_PATH_MARKERS.iter().any(|marker| path.contains(marker)) {
            if let Some(url) = item["html_url"].as_str() {
                return Some(raw_content_url(url));
            }
        }
    }
    items
        .first()
        .and_then(|item| item["html_url"].as_str())
        .map(raw_content_url)
}

/// Convert a repository browse URL into its raw-content equivalent.
fn raw_content_url(html_url: &str) -> String {
    html_url
        .replace("github.com", "raw.githubusercontent.com")
        .replace("/blob/", "/")
}
