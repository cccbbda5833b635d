//! Content Pack Model
//!
//! Every type is generic over `S`, the representation of an asset set.
//! Freshly parsed packs use [`RawAssets`] (path strings); converted packs
//! use [`AssetSet`](crate::asset::AssetSet).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::asset::AssetSet;

/// Raw, unresolved asset set: templated path strings.
pub type RawAssets = Vec<String>;

pub type RawPack = ContentPack<RawAssets>;
pub type ConvertedPack = ContentPack<AssetSet>;

pub type Offset = [i32; 2];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackState {
    #[default]
    Added,
    Installed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(serialize = "S: Serialize", deserialize = "S: Deserialize<'de>"))]
pub struct ContentPack<S> {
    #[serde(default)]
    pub pack_id: Option<String>,
    #[serde(default)]
    pub state: PackState,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default = "Vec::new")]
    pub characters: Vec<Character<S>>,
    #[serde(default = "Vec::new")]
    pub backgrounds: Vec<Background<S>>,
    #[serde(default = "Vec::new")]
    pub fonts: Vec<Font<S>>,
    #[serde(default)]
    pub pose_styles: Vec<PoseStyle>,
    #[serde(default = "Vec::new")]
    pub pose_backgrounds: Vec<PoseBackground<S>>,
    #[serde(default = "Vec::new")]
    pub sprites: Vec<Sprite<S>>,
    #[serde(default)]
    pub colors: Vec<Color>,
}

impl<S> ContentPack<S> {
    /// The empty aggregate every fold starts from.
    pub fn empty() -> Self {
        Self {
            pack_id: None,
            state: PackState::Added,
            dependencies: vec![],
            characters: vec![],
            backgrounds: vec![],
            fonts: vec![],
            pose_styles: vec![],
            pose_backgrounds: vec![],
            sprites: vec![],
            colors: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
            && self.backgrounds.is_empty()
            && self.fonts.is_empty()
            && self.pose_styles.is_empty()
            && self.pose_backgrounds.is_empty()
            && self.sprites.is_empty()
            && self.colors.is_empty()
    }

    pub fn character(&self, id: &str) -> Option<&Character<S>> {
        self.characters.iter().find(|c| c.id == id)
    }
}

impl<S> Default for ContentPack<S> {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character<S> {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub chibi: Option<S>,
    #[serde(default = "Vec::new")]
    pub heads: Vec<HeadGroup<S>>,
    #[serde(default = "Vec::new")]
    pub poses: Vec<Pose<S>>,
}

impl<S> Character<S> {
    pub fn pose(&self, id: &str) -> Option<&Pose<S>> {
        self.poses.iter().find(|p| p.id == id)
    }

    pub fn head_group(&self, id: &str) -> Option<&HeadGroup<S>> {
        self.heads.iter().find(|h| h.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadGroup<S> {
    pub id: String,
    #[serde(default = "Vec::new")]
    pub variants: Vec<S>,
}

/// Part name to ordered list of variant asset sets.
pub type PositionTable<S> = BTreeMap<String, Vec<S>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pose<S> {
    pub id: String,
    #[serde(default)]
    pub compatible_heads: Vec<String>,
    #[serde(default)]
    pub size: [u32; 2],
    #[serde(default = "Vec::new")]
    pub render_commands: Vec<RenderCommand<S>>,
    #[serde(default = "BTreeMap::new")]
    pub positions: PositionTable<S>,
}

/// One step of a pose's draw order; later commands draw on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RenderCommand<S> {
    Head {
        #[serde(default)]
        offset: Offset,
        #[serde(default)]
        composite: CompositeMode,
    },
    Image {
        images: S,
        #[serde(default)]
        offset: Offset,
        #[serde(default)]
        composite: CompositeMode,
    },
    PosePart {
        part: String,
        #[serde(default)]
        offset: Offset,
        #[serde(default)]
        composite: CompositeMode,
    },
}

impl<S> RenderCommand<S> {
    pub fn offset(&self) -> Offset {
        match self {
            RenderCommand::Head { offset, .. }
            | RenderCommand::Image { offset, .. }
            | RenderCommand::PosePart { offset, .. } => *offset,
        }
    }

    pub fn composite(&self) -> CompositeMode {
        match self {
            RenderCommand::Head { composite, .. }
            | RenderCommand::Image { composite, .. }
            | RenderCommand::PosePart { composite, .. } => *composite,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositeMode {
    #[default]
    SourceOver,
    SourceAtop,
    DestinationOver,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundScaling {
    #[default]
    None,
    Stretch,
    Cover,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background<S> {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "Vec::new")]
    pub variants: Vec<S>,
    #[serde(default)]
    pub scaling: BackgroundScaling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Font<S> {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub font_name: String,
    pub files: S,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseStyle {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub font: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_text_color")]
    pub color: String,
}

fn default_font_size() -> u32 { 12 }
fn default_text_color() -> String { "#000000".to_string() }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseBackground<S> {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub images: S,
    #[serde(default = "default_text_color")]
    pub font_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprite<S> {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "Vec::new")]
    pub variants: Vec<S>,
}

/// Named colors are keyed by name rather than id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub name: String,
    pub color: String,
}

/// Merge key of an entry within its collection.
pub trait Keyed {
    fn key(&self) -> &str;
}

macro_rules! keyed_by_id {
    ($($ty:ident<S>),* $(,)?) => {
        $(impl<S> Keyed for $ty<S> {
            fn key(&self) -> &str { &self.id }
        })*
    };
}

keyed_by_id!(Character<S>, Background<S>, Font<S>, PoseBackground<S>, Sprite<S>);

impl Keyed for PoseStyle {
    fn key(&self) -> &str { &self.id }
}

impl Keyed for Color {
    fn key(&self) -> &str { &self.name }
}
