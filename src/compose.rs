//! Pose Resolver / Draw-List Composer
//!
//! Turns a character's selected pose and variant indices into an ordered
//! list of draw directives. A directive whose asset set is the same set
//! (by handle) as one in the previous list keeps that directive's id, so a
//! renderer can keep whatever pixel cache it attached to it.
//!
//! Missing variants are not errors: a head group or part that cannot be
//! resolved simply contributes no directive.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::asset::AssetSet;
use crate::model::{Character, CompositeMode, HeadGroup, Offset, Pose, RenderCommand};

/// Reserved variant slot consulted by `head` render commands.
pub const HEAD_SLOT: &str = "head";

static NEXT_DIRECTIVE: AtomicU64 = AtomicU64::new(1);

/// Identity of a draw directive, carried across renders while its asset
/// set stays the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DirectiveId(u64);

impl DirectiveId {
    fn next() -> Self {
        Self(NEXT_DIRECTIVE.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawDirective {
    pub id: DirectiveId,
    pub assets: AssetSet,
    pub offset: Offset,
    pub composite: CompositeMode,
}

/// Per-instance selection state, owned by the placement store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementState {
    pub selected_pose: String,
    #[serde(default)]
    pub head_group: Option<String>,
    #[serde(default)]
    pub variant_index: BTreeMap<String, usize>,
}

impl PlacementState {
    pub fn new(selected_pose: impl Into<String>) -> Self {
        Self {
            selected_pose: selected_pose.into(),
            ..Self::default()
        }
    }

    pub fn with_variant(mut self, slot: impl Into<String>, index: usize) -> Self {
        self.variant_index.insert(slot.into(), index);
        self
    }

    /// Selected variant for `slot`, 0 when unset.
    pub fn variant(&self, slot: &str) -> usize {
        self.variant_index.get(slot).copied().unwrap_or(0)
    }
}

/// Head group for the current selection: the explicit choice, else the
/// pose's first compatible group the character defines, else the
/// character's first group when the pose names none.
fn select_head_group<'a>(
    character: &'a Character<AssetSet>,
    pose: &Pose<AssetSet>,
    placement: &PlacementState,
) -> Option<&'a HeadGroup<AssetSet>> {
    if let Some(id) = &placement.head_group {
        return character.head_group(id);
    }
    if pose.compatible_heads.is_empty() {
        return character.heads.first();
    }
    pose.compatible_heads
        .iter()
        .find_map(|id| character.head_group(id))
}

fn resolve_command<'a>(
    command: &'a RenderCommand<AssetSet>,
    pose: &'a Pose<AssetSet>,
    heads: Option<&'a HeadGroup<AssetSet>>,
    placement: &PlacementState,
) -> Option<&'a AssetSet> {
    match command {
        RenderCommand::Head { .. } => heads?.variants.get(placement.variant(HEAD_SLOT)),
        RenderCommand::Image { images, .. } => Some(images),
        RenderCommand::PosePart { part, .. } => pose
            .positions
            .get(part)
            .filter(|variants| !variants.is_empty())?
            .get(placement.variant(part)),
    }
}

/// Compose the draw list for `character` under `placement`, reusing
/// directive identities from `previous` where the asset set is unchanged.
/// An unknown pose yields an empty list.
pub fn compose(
    character: &Character<AssetSet>,
    placement: &PlacementState,
    previous: &[DrawDirective],
) -> Vec<DrawDirective> {
    let Some(pose) = character.pose(&placement.selected_pose) else {
        tracing::debug!(
            character = %character.id,
            pose = %placement.selected_pose,
            "selected pose not found"
        );
        return vec![];
    };
    let heads = select_head_group(character, pose, placement);

    let mut directives = Vec::with_capacity(pose.render_commands.len());
    for (index, command) in pose.render_commands.iter().enumerate() {
        let Some(assets) = resolve_command(command, pose, heads, placement) else {
            tracing::debug!(character = %character.id, command = index, "render command skipped");
            continue;
        };

        let id = previous
            .iter()
            .find(|old| old.assets.same_as(assets))
            .map_or_else(DirectiveId::next, |old| old.id);

        directives.push(DrawDirective {
            id,
            assets: assets.clone(),
            offset: command.offset(),
            composite: command.composite(),
        });
    }

    directives
}

/// Holds the last draw list of one character instance between renders.
#[derive(Debug, Default)]
pub struct PoseComposer {
    current: Vec<DrawDirective>,
}

impl PoseComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compose(
        &mut self,
        character: &Character<AssetSet>,
        placement: &PlacementState,
    ) -> &[DrawDirective] {
        self.current = compose(character, placement, &self.current);
        &self.current
    }

    pub fn draw_list(&self) -> &[DrawDirective] {
        &self.current
    }

    pub fn reset(&mut self) {
        self.current.clear();
    }
}
