//! Pack Loading
//!
//! Packs are fetched and converted concurrently, then committed to the
//! store one by one in the order they were requested. Arrival order never
//! affects precedence. A pack that fails anywhere before commit is
//! reported and left out; the store is not touched for it.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

use crate::capability::{CapabilityCache, FormatProbe};
use crate::config::EngineConfig;
use crate::error::{PackError, Result};
use crate::model::{ConvertedPack, PackState};
use crate::pipeline::PackPipeline;
use crate::schema::PathBases;
use crate::store::ContentStore;

/// Supplies raw pack documents by location.
#[async_trait]
pub trait PackSource: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<String>;
}

/// Reads pack documents from the local filesystem, relative to `root`.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl PackSource for FileSource {
    async fn fetch(&self, location: &str) -> Result<String> {
        let path = self.root.join(location);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| PackError::Network {
                location: path.display().to_string(),
                reason: e.to_string(),
            })
    }
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub failed: Vec<(String, PackError)>,
}

impl LoadReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct PackLoader<S, P> {
    source: S,
    probe: P,
    pipeline: PackPipeline,
    capabilities: Arc<CapabilityCache>,
}

impl<S: PackSource, P: FormatProbe> PackLoader<S, P> {
    /// `capabilities` is shared by every loader in the process, so the
    /// format probe runs at most once no matter how many loaders exist.
    pub fn new(
        config: &EngineConfig,
        source: S,
        probe: P,
        capabilities: Arc<CapabilityCache>,
    ) -> Self {
        Self {
            source,
            probe,
            pipeline: PackPipeline::new(config),
            capabilities,
        }
    }

    /// Fetch and convert one pack without committing it.
    pub async fn load(&self, location: &str) -> Result<ConvertedPack> {
        let capabilities = self.capabilities.get_or_probe(&self.probe).await;
        let text = self.source.fetch(location).await?;
        let bases = PathBases::for_location(location, self.pipeline.asset_root());
        let mut pack = self.pipeline.convert(&text, &bases, &capabilities)?;
        pack.state = PackState::Added;
        Ok(pack)
    }

    /// Load every location concurrently, then commit the successes in
    /// input order.
    pub async fn load_all<L>(&self, store: &mut ContentStore, locations: &[L]) -> LoadReport
    where
        L: AsRef<str>,
    {
        let results = join_all(locations.iter().map(|l| self.load(l.as_ref()))).await;

        let mut report = LoadReport::default();
        for (location, result) in locations.iter().zip(results) {
            let location = location.as_ref().to_string();
            match result {
                Ok(pack) => {
                    store.commit(pack);
                    report.loaded.push(location);
                }
                Err(e) => {
                    tracing::warn!(location = %location, error = %e, "content pack rejected");
                    report.failed.push((location, e));
                }
            }
        }
        report
    }
}
