//! Run orchestration
//!
//! Drives every channel entry through the same state machine: cached ->
//! done; otherwise try each resolver in priority order, download the first
//! URL that appears, normalize, and persist. A failed download falls through
//! to the next resolver; a failed decode falls through to the placeholder;
//! only a failed disk write counts against the run.

mod pacer;

pub use pacer::RequestPacer;

use futures::StreamExt;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::cache::LogoCache;
use crate::config::Config;
use crate::errors::SourceError;
use crate::imaging::{normalize_png, placeholder_png};
use crate::models::{ChannelEntry, LogoSource, RunReport};
use crate::resolvers::{LogoResolver, OverrideResolver, RepoSearchResolver, WikiResolver};

enum EntryOutcome {
    /// Canonical file already present, no work done
    Cached(PathBuf),
    Written {
        path: PathBuf,
        source: LogoSource,
    },
    /// Run was aborted before this entry finished resolving
    Skipped,
    Failed,
}

pub struct LogoPipeline {
    target_px: u32,
    concurrency: usize,
    full_label_codes: BTreeSet<String>,
    font_family: String,
    client: reqwest::Client,
    pacer: Arc<RequestPacer>,
    cache: LogoCache,
    resolvers: Vec<Arc<dyn LogoResolver>>,
    cancel: CancellationToken,
}

impl LogoPipeline {
    pub fn new(
        config: &Config,
        output_dir: PathBuf,
        overrides: HashMap<String, String>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.fetch.user_agent.clone())
            .timeout(Duration::from_secs(config.fetch.timeout_secs))
            .build()?;
        let pacer = Arc::new(RequestPacer::new(Duration::from_millis(
            config.fetch.politeness_delay_ms,
        )));

        let resolvers: Vec<Arc<dyn LogoResolver>> = vec![
            Arc::new(OverrideResolver::new(overrides)),
            Arc::new(WikiResolver::new(
                client.clone(),
                pacer.clone(),
                config.endpoints.clone(),
                config.fetch.target_px,
            )),
            Arc::new(RepoSearchResolver::new(
                client.clone(),
                pacer.clone(),
                &config.endpoints,
            )),
        ];

        Ok(Self {
            target_px: config.fetch.target_px,
            concurrency: config.fetch.concurrency.max(1),
            full_label_codes: config.placeholder.full_label_codes.clone(),
            font_family: config.placeholder.font_family.clone(),
            client,
            pacer,
            cache: LogoCache::new(output_dir),
            resolvers,
            cancel: CancellationToken::new(),
        })
    }

    /// Token that stops the run issuing new resolver calls when cancelled.
    /// In-flight entries finish their writes.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(&self, entries: &[ChannelEntry]) -> anyhow::Result<RunReport> {
        self.cache.ensure_dir().await?;
        info!(
            "resolving {} entries at {}px -> {}",
            entries.len(),
            self.target_px,
            self.cache.output_dir().display()
        );

        let outcomes: Vec<(String, EntryOutcome)> = futures::stream::iter(entries)
            .map(|entry| async move { (entry.code.clone(), self.process(entry).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = RunReport::default();
        for (code, outcome) in outcomes {
            match outcome {
                EntryOutcome::Cached(path) => report.record_cached(&code, path),
                EntryOutcome::Written { path, source } => {
                    report.record_success(&code, path, source)
                }
                EntryOutcome::Skipped => report.record_skipped(),
                EntryOutcome::Failed => report.record_failure(),
            }
        }
        info!(
            "done: {} succeeded, {} failed, {} skipped, {} already cached",
            report.success, report.failed, report.skipped, report.cached
        );
        Ok(report)
    }

    async fn process(&self, entry: &ChannelEntry) -> EntryOutcome {
        if self.cancel.is_cancelled() {
            return EntryOutcome::Skipped;
        }

        let path = self.cache.canonical_path(entry.number, &entry.code);
        if self.cache.exists(entry.number, &entry.code) {
            info!("[=] {} exists; skipping", path.display());
            return EntryOutcome::Cached(path);
        }

        for resolver in &self.resolvers {
            if self.cancel.is_cancelled() {
                debug!("run aborted before resolving {}", entry.code);
                return EntryOutcome::Skipped;
            }

            let resolved = match resolver.resolve(entry).await {
                Ok(Some(resolved)) => resolved,
                Ok(None) => {
                    debug!("{}: {} found nothing", entry.code, resolver.name());
                    continue;
                }
                Err(err) => {
                    warn!("{}: {} transient failure: {}", entry.code, resolver.name(), err);
                    continue;
                }
            };
            info!(
                "{} {} resolved via {} ({})",
                entry.number, entry.code, resolved.source, resolved.provenance
            );

            let bytes = match self.download(&resolved.url).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!("{}: download of {} failed: {}", entry.code, resolved.url, err);
                    continue;
                }
            };

            match normalize_png(&bytes, self.target_px) {
                Ok(png) => return self.persist(entry, png, resolved.source).await,
                Err(err) => {
                    warn!("{}: normalize failed: {}", entry.code, err);
                    break;
                }
            }
        }

        match placeholder_png(
            &entry.code,
            self.target_px,
            &self.full_label_codes,
            &self.font_family,
        ) {
            Ok(png) => {
                info!("{} {} -> placeholder", entry.number, entry.code);
                self.persist(entry, png, LogoSource::Placeholder).await
            }
            Err(err) => {
                error!("{} {} placeholder failed: {}", entry.number, entry.code, err);
                EntryOutcome::Failed
            }
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        self.pacer.pause().await;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(SourceError::malformed("empty response body"));
        }
        Ok(bytes.to_vec())
    }

    async fn persist(&self, entry: &ChannelEntry, png: Vec<u8>, source: LogoSource) -> EntryOutcome {
        match self.cache.write(entry.number, &entry.code, png).await {
            Ok(path) => {
                info!(
                    "[ok] {} {} -> {}",
                    entry.number,
                    entry.code,
                    path.file_name().unwrap_or_default().to_string_lossy()
                );
                EntryOutcome::Written { path, source }
            }
            Err(err) => {
                error!("{} {}: persist failed: {}", entry.number, entry.code, err);
                EntryOutcome::Failed
            }
        }
    }
}
