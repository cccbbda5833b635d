//! Capability Negotiation
//!
//! The baseline formats are assumed supported everywhere. Advanced formats
//! are probed once per process: the application builds a single
//! [`CapabilityCache`] and shares it behind an `Arc` with every loader.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

pub const BASELINE_FORMATS: [&str; 4] = ["png", "gif", "bmp", "svg"];

/// The set of image formats the runtime can decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    formats: BTreeSet<String>,
}

impl Capabilities {
    pub fn new<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            formats: formats.into_iter().map(Into::into).collect(),
        }
    }

    pub fn baseline() -> Self {
        Self::new(BASELINE_FORMATS)
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.formats.insert(format.into());
        self
    }

    pub fn supports(&self, format: &str) -> bool {
        self.formats.contains(format)
    }

    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.formats.iter().map(String::as_str)
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::baseline()
    }
}

/// Answers "is format X supported" for the current runtime.
#[async_trait]
pub trait FormatProbe: Send + Sync {
    async fn supports(&self, format: &str) -> bool;
}

/// Probe backed by a fixed list, for runtimes that know their decoders
/// up front.
#[derive(Debug, Clone, Default)]
pub struct StaticProbe {
    supported: BTreeSet<String>,
}

impl StaticProbe {
    pub fn new<I, S>(supported: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            supported: supported.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl FormatProbe for StaticProbe {
    async fn supports(&self, format: &str) -> bool {
        self.supported.contains(format)
    }
}

/// Memoized capability set. The first caller runs the probe; every other
/// caller, including those that arrive while the probe is in flight,
/// observes that single result.
#[derive(Debug)]
pub struct CapabilityCache {
    baseline: Vec<String>,
    advanced: Vec<String>,
    resolved: OnceCell<Arc<Capabilities>>,
}

impl CapabilityCache {
    pub fn new(baseline: Vec<String>, advanced: Vec<String>) -> Self {
        Self {
            baseline,
            advanced,
            resolved: OnceCell::new(),
        }
    }

    pub async fn get_or_probe(&self, probe: &dyn FormatProbe) -> Arc<Capabilities> {
        self.resolved
            .get_or_init(|| async {
                let mut caps = Capabilities::new(self.baseline.iter().cloned());
                for format in &self.advanced {
                    if probe.supports(format).await {
                        caps = caps.with_format(format.clone());
                    }
                }
                tracing::debug!(
                    formats = ?caps.formats().collect::<Vec<_>>(),
                    "capability probe resolved"
                );
                Arc::new(caps)
            })
            .await
            .clone()
    }

    pub fn get(&self) -> Option<Arc<Capabilities>> {
        self.resolved.get().cloned()
    }
}

impl Default for CapabilityCache {
    fn default() -> Self {
        Self::new(
            BASELINE_FORMATS.iter().map(|f| f.to_string()).collect(),
            vec!["webp".to_string()],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingProbe {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FormatProbe for CountingProbe {
        async fn supports(&self, format: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            format == "webp"
        }
    }

    #[test]
    fn test_baseline_formats() {
        let caps = Capabilities::baseline();
        assert!(caps.supports("png"));
        assert!(caps.supports("svg"));
        assert!(!caps.supports("webp"));
    }

    #[tokio::test]
    async fn test_probe_runs_once_for_concurrent_callers() {
        let cache = Arc::new(CapabilityCache::default());
        let probe = Arc::new(CountingProbe {
            calls: AtomicUsize::new(0),
        });

        let mut handles = vec![];
        for _ in 0..8 {
            let cache = cache.clone();
            let probe = probe.clone();
            handles.push(tokio::spawn(async move {
                cache.get_or_probe(probe.as_ref()).await
            }));
        }

        let mut results = vec![];
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
        for caps in &results {
            assert!(Arc::ptr_eq(caps, &results[0]));
            assert!(caps.supports("webp"));
        }
    }

    #[tokio::test]
    async fn test_unsupported_advanced_format_left_out() {
        let cache = CapabilityCache::default();
        let caps = cache.get_or_probe(&StaticProbe::default()).await;
        assert!(!caps.supports("webp"));
        assert!(caps.supports("gif"));
        assert!(cache.get().is_some());
    }
}
