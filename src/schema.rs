//! Pack Document Schema
//!
//! Documents declare a `version` tag. Current (2.x) documents deserialize
//! straight into a [`RawPack`]; legacy 1.x documents (or documents without
//! a tag) pass through [`V1Adapter`] first. After either path, relative
//! asset paths are rebased with [`PathBases`].

use std::collections::BTreeMap;
use std::convert::Infallible;

use semver::Version;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{PackError, Result};
use crate::model::{
    Character, CompositeMode, HeadGroup, Pose, RawAssets, RawPack, RenderCommand,
};

pub const CURRENT_SCHEMA_MAJOR: u64 = 2;
pub const LEGACY_SCHEMA_MAJOR: u64 = 1;

/// Parse a `major.minor[.patch]` version tag.
pub fn parse_version(tag: &str) -> Result<Version> {
    let padded = match tag.matches('.').count() {
        0 => format!("{}.0.0", tag),
        1 => format!("{}.0", tag),
        _ => tag.to_string(),
    };
    Version::parse(&padded)
        .map_err(|e| PackError::schema(format!("unrecognized version {:?}: {}", tag, e)))
}

/// Normalizes a legacy document into the current in-memory schema.
pub trait SchemaAdapter {
    fn normalize(&self, document: Value) -> Result<RawPack>;
}

/// Read the version tag and route the document to the matching schema.
pub fn normalize_document(document: Value) -> Result<RawPack> {
    let tag = match document.get("version") {
        None | Some(Value::Null) => None,
        Some(Value::String(tag)) => Some(tag.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => {
            return Err(PackError::schema(format!("version must be a string, got {}", other)))
        }
    };

    let major = match &tag {
        Some(tag) => parse_version(tag)?.major,
        None => LEGACY_SCHEMA_MAJOR,
    };

    match major {
        CURRENT_SCHEMA_MAJOR => {
            serde_json::from_value(document).map_err(|e| PackError::schema(e.to_string()))
        }
        LEGACY_SCHEMA_MAJOR => V1Adapter.normalize(document),
        _ => Err(PackError::schema(format!(
            "unsupported pack version {}",
            tag.unwrap_or_default()
        ))),
    }
}

/// Legacy documents describe a single character.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct V1Character {
    id: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    pack_id: Option<String>,
    #[serde(default)]
    chibi: Option<String>,
    #[serde(default)]
    heads: Vec<RawAssets>,
    #[serde(default)]
    poses: Vec<V1Pose>,
}

#[derive(Debug, Deserialize)]
struct V1Pose {
    id: String,
    #[serde(default)]
    layers: Vec<V1Layer>,
    #[serde(default)]
    positions: BTreeMap<String, Vec<RawAssets>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum V1Layer {
    Named(String),
    Images { images: RawAssets },
}

/// Adapter for 1.x character documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct V1Adapter;

impl SchemaAdapter for V1Adapter {
    fn normalize(&self, document: Value) -> Result<RawPack> {
        let legacy: V1Character =
            serde_json::from_value(document).map_err(|e| PackError::schema(e.to_string()))?;

        let head_id = format!("{}:default", legacy.id);
        let heads = if legacy.heads.is_empty() {
            vec![]
        } else {
            vec![HeadGroup {
                id: head_id,
                variants: legacy.heads,
            }]
        };

        let poses = legacy
            .poses
            .into_iter()
            .map(|pose| Pose {
                id: pose.id,
                compatible_heads: heads.iter().map(|h| h.id.clone()).collect(),
                size: [0, 0],
                render_commands: pose
                    .layers
                    .into_iter()
                    .map(|layer| match layer {
                        V1Layer::Named(name) if name == crate::compose::HEAD_SLOT => {
                            RenderCommand::Head {
                                offset: [0, 0],
                                composite: CompositeMode::SourceOver,
                            }
                        }
                        V1Layer::Named(part) => RenderCommand::PosePart {
                            part,
                            offset: [0, 0],
                            composite: CompositeMode::SourceOver,
                        },
                        V1Layer::Images { images } => RenderCommand::Image {
                            images,
                            offset: [0, 0],
                            composite: CompositeMode::SourceOver,
                        },
                    })
                    .collect(),
                positions: pose.positions,
            })
            .collect();

        Ok(RawPack {
            pack_id: legacy.pack_id.or_else(|| Some(format!("legacy.{}", legacy.id))),
            characters: vec![Character {
                label: legacy.label.unwrap_or_else(|| legacy.id.clone()),
                id: legacy.id,
                chibi: legacy.chibi.map(|path| vec![path]),
                heads,
                poses,
            }],
            ..RawPack::empty()
        })
    }
}

/// Prefixes applied to relative asset paths: `./x` is resolved against
/// the pack's own directory, `/x` against the application asset root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathBases {
    pub pack_base: String,
    pub asset_root: String,
}

impl PathBases {
    pub fn new(pack_base: impl Into<String>, asset_root: impl Into<String>) -> Self {
        Self {
            pack_base: pack_base.into(),
            asset_root: asset_root.into(),
        }
    }

    /// Directory part of a pack location, with a trailing slash.
    pub fn for_location(location: &str, asset_root: impl Into<String>) -> Self {
        let base = match location.rfind('/') {
            Some(idx) => &location[..=idx],
            None => "",
        };
        Self::new(base, asset_root)
    }

    pub fn rebase(&self, path: &str) -> String {
        if let Some(rest) = path.strip_prefix("./") {
            format!("{}{}", with_slash(&self.pack_base), rest)
        } else if let Some(rest) = path.strip_prefix('/') {
            format!("{}{}", with_slash(&self.asset_root), rest)
        } else {
            path.to_string()
        }
    }

    pub fn apply(&self, pack: &RawPack) -> RawPack {
        let rebased = pack.try_map_assets(
            &mut |paths: &RawAssets| -> std::result::Result<RawAssets, Infallible> {
                Ok(paths.iter().map(|p| self.rebase(p)).collect())
            },
        );
        match rebased {
            Ok(pack) => pack,
            Err(never) => match never {},
        }
    }
}

fn with_slash(base: &str) -> String {
    if base.is_empty() || base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    }
}
