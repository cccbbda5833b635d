//! Content Store
//!
//! Holds the installed converted packs and the aggregate folded from them.
//! Every mutation goes through `&mut self`, so commits are applied one at
//! a time in call order; pack order is override precedence.

use std::collections::HashSet;
use std::sync::Arc;

use crate::asset::AssetSet;
use crate::hashing::fingerprint;
use crate::merge::{merge, merge_all};
use crate::model::{Background, Character, ConvertedPack, PackState};

#[derive(Debug, Default)]
pub struct ContentStore {
    packs: Vec<ConvertedPack>,
    current: Arc<ConvertedPack>,
    revision: u64,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn packs(&self) -> &[ConvertedPack] {
        &self.packs
    }

    /// The merged aggregate of every installed pack.
    pub fn current(&self) -> &ConvertedPack {
        &self.current
    }

    /// Shared handle to the current aggregate; stays valid across later
    /// commits.
    pub fn snapshot(&self) -> Arc<ConvertedPack> {
        Arc::clone(&self.current)
    }

    /// Bumped on every change to the aggregate.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn position(&self, pack_id: &str) -> Option<usize> {
        self.packs
            .iter()
            .position(|p| p.pack_id.as_deref() == Some(pack_id))
    }

    /// Append a converted pack and fold it into the aggregate. A pack whose
    /// id is already installed replaces the installed copy instead.
    pub fn commit(&mut self, pack: ConvertedPack) -> u64 {
        if let Some(id) = pack.pack_id.as_deref() {
            if self.position(id).is_some() {
                tracing::info!(pack = %id, "pack already installed, replacing");
                return self.replace_pack(pack);
            }
        }

        self.current = Arc::new(merge(self.current.as_ref(), &pack));
        tracing::info!(pack = ?pack.pack_id, revision = self.revision + 1, "pack committed");
        self.packs.push(pack);
        self.bump()
    }

    /// Drop the named packs and rebuild the aggregate from the rest.
    /// Returns the number of packs removed.
    pub fn remove_packs<'a, I>(&mut self, pack_ids: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let ids: HashSet<&str> = pack_ids.into_iter().collect();
        let before = self.packs.len();
        self.packs
            .retain(|p| !p.pack_id.as_deref().is_some_and(|id| ids.contains(id)));
        let removed = before - self.packs.len();

        if removed > 0 {
            self.refold();
            tracing::info!(removed, revision = self.revision, "packs removed");
        }
        removed
    }

    /// Replace the installed pack with the same id in place (keeping its
    /// precedence), or append it when no such pack exists.
    pub fn replace_pack(&mut self, pack: ConvertedPack) -> u64 {
        match pack.pack_id.as_deref().and_then(|id| self.position(id)) {
            Some(index) => self.packs[index] = pack,
            None => self.packs.push(pack),
        }
        self.refold();
        self.revision
    }

    /// Mark an installed pack as permanently installed. Does not change
    /// the aggregate.
    pub fn mark_installed(&mut self, pack_id: &str) -> bool {
        match self.position(pack_id) {
            Some(index) => {
                self.packs[index].state = PackState::Installed;
                true
            }
            None => false,
        }
    }

    fn refold(&mut self) {
        self.current = Arc::new(merge_all(&self.packs));
        self.bump();
    }

    fn bump(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    pub fn character(&self, id: &str) -> Option<&Character<AssetSet>> {
        self.current.character(id)
    }

    pub fn background(&self, id: &str) -> Option<&Background<AssetSet>> {
        self.current.backgrounds.iter().find(|b| b.id == id)
    }

    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        fingerprint(self.current.as_ref())
    }
}
