//! Asset descriptors and identity-bearing asset sets.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

static NEXT_ASSET_SET: AtomicU64 = AtomicU64::new(1);

/// A format-negotiated path pair standing in for an unloaded image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDescriptor {
    pub high_quality_path: String,
    pub low_quality_path: String,
    pub source_pack_id: String,
}

/// Stable identity of an asset set, assigned once when the set is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetSetHandle(u64);

impl AssetSetHandle {
    fn next() -> Self {
        Self(NEXT_ASSET_SET.fetch_add(1, Ordering::Relaxed))
    }
}

/// Ordered stack of descriptors forming one visual layer.
///
/// Clones share the handle, so a set carried through a merge keeps its
/// identity. Two sets built separately never share a handle, even when
/// their descriptors are equal. `PartialEq` compares contents; use
/// [`AssetSet::same_as`] for identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<AssetDescriptor>", into = "Vec<AssetDescriptor>")]
pub struct AssetSet {
    handle: AssetSetHandle,
    assets: Arc<[AssetDescriptor]>,
}

impl AssetSet {
    pub fn new(assets: Vec<AssetDescriptor>) -> Self {
        Self {
            handle: AssetSetHandle::next(),
            assets: assets.into(),
        }
    }

    pub fn handle(&self) -> AssetSetHandle {
        self.handle
    }

    pub fn same_as(&self, other: &AssetSet) -> bool {
        self.handle == other.handle
    }

    pub fn assets(&self) -> &[AssetDescriptor] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl PartialEq for AssetSet {
    fn eq(&self, other: &Self) -> bool {
        self.assets == other.assets
    }
}

impl From<Vec<AssetDescriptor>> for AssetSet {
    fn from(assets: Vec<AssetDescriptor>) -> Self {
        Self::new(assets)
    }
}

impl From<AssetSet> for Vec<AssetDescriptor> {
    fn from(set: AssetSet) -> Self {
        set.assets.to_vec()
    }
}
