//! Asset Walker
//!
//! Structure-preserving traversal of a content pack that rebuilds it with
//! every asset set passed through a mapping function. Ids, ordering and
//! non-asset fields are carried over untouched.

use crate::asset::{AssetDescriptor, AssetSet};
use crate::capability::Capabilities;
use crate::model::{
    Background, Character, ContentPack, ConvertedPack, Font, HeadGroup, Pose, PoseBackground,
    RawPack, RenderCommand, Sprite,
};
use crate::path_template::{PathResolver, TemplateError};

fn map_all<S, T, E, F>(items: &[S], f: &mut F) -> Result<Vec<T>, E>
where
    F: FnMut(&S) -> Result<T, E>,
{
    items.iter().map(|item| f(item)).collect()
}

impl<S> ContentPack<S> {
    /// Rebuild the pack with every asset set mapped through `f`, in
    /// document order.
    pub fn try_map_assets<T, E, F>(&self, f: &mut F) -> Result<ContentPack<T>, E>
    where
        F: FnMut(&S) -> Result<T, E>,
    {
        Ok(ContentPack {
            pack_id: self.pack_id.clone(),
            state: self.state,
            dependencies: self.dependencies.clone(),
            characters: self
                .characters
                .iter()
                .map(|c| c.try_map_assets(f))
                .collect::<Result<_, _>>()?,
            backgrounds: self
                .backgrounds
                .iter()
                .map(|b| b.try_map_assets(f))
                .collect::<Result<_, _>>()?,
            fonts: self
                .fonts
                .iter()
                .map(|font| font.try_map_assets(f))
                .collect::<Result<_, _>>()?,
            pose_styles: self.pose_styles.clone(),
            pose_backgrounds: self
                .pose_backgrounds
                .iter()
                .map(|b| b.try_map_assets(f))
                .collect::<Result<_, _>>()?,
            sprites: self
                .sprites
                .iter()
                .map(|s| s.try_map_assets(f))
                .collect::<Result<_, _>>()?,
            colors: self.colors.clone(),
        })
    }
}

impl<S> Character<S> {
    pub fn try_map_assets<T, E, F>(&self, f: &mut F) -> Result<Character<T>, E>
    where
        F: FnMut(&S) -> Result<T, E>,
    {
        Ok(Character {
            id: self.id.clone(),
            label: self.label.clone(),
            chibi: self.chibi.as_ref().map(|c| f(c)).transpose()?,
            heads: self
                .heads
                .iter()
                .map(|h| -> Result<HeadGroup<T>, E> {
                    Ok(HeadGroup {
                        id: h.id.clone(),
                        variants: map_all(&h.variants, f)?,
                    })
                })
                .collect::<Result<_, _>>()?,
            poses: self
                .poses
                .iter()
                .map(|p| p.try_map_assets(f))
                .collect::<Result<_, _>>()?,
        })
    }
}

impl<S> Pose<S> {
    pub fn try_map_assets<T, E, F>(&self, f: &mut F) -> Result<Pose<T>, E>
    where
        F: FnMut(&S) -> Result<T, E>,
    {
        let mut render_commands = Vec::with_capacity(self.render_commands.len());
        for command in &self.render_commands {
            render_commands.push(match command {
                RenderCommand::Head { offset, composite } => RenderCommand::Head {
                    offset: *offset,
                    composite: *composite,
                },
                RenderCommand::Image {
                    images,
                    offset,
                    composite,
                } => RenderCommand::Image {
                    images: f(images)?,
                    offset: *offset,
                    composite: *composite,
                },
                RenderCommand::PosePart {
                    part,
                    offset,
                    composite,
                } => RenderCommand::PosePart {
                    part: part.clone(),
                    offset: *offset,
                    composite: *composite,
                },
            });
        }

        let mut positions = std::collections::BTreeMap::new();
        for (part, variants) in &self.positions {
            positions.insert(part.clone(), map_all(variants, f)?);
        }

        Ok(Pose {
            id: self.id.clone(),
            compatible_heads: self.compatible_heads.clone(),
            size: self.size,
            render_commands,
            positions,
        })
    }
}

impl<S> Background<S> {
    pub fn try_map_assets<T, E, F>(&self, f: &mut F) -> Result<Background<T>, E>
    where
        F: FnMut(&S) -> Result<T, E>,
    {
        Ok(Background {
            id: self.id.clone(),
            label: self.label.clone(),
            variants: map_all(&self.variants, f)?,
            scaling: self.scaling,
        })
    }
}

impl<S> Font<S> {
    pub fn try_map_assets<T, E, F>(&self, f: &mut F) -> Result<Font<T>, E>
    where
        F: FnMut(&S) -> Result<T, E>,
    {
        Ok(Font {
            id: self.id.clone(),
            label: self.label.clone(),
            font_name: self.font_name.clone(),
            files: f(&self.files)?,
        })
    }
}

impl<S> PoseBackground<S> {
    pub fn try_map_assets<T, E, F>(&self, f: &mut F) -> Result<PoseBackground<T>, E>
    where
        F: FnMut(&S) -> Result<T, E>,
    {
        Ok(PoseBackground {
            id: self.id.clone(),
            label: self.label.clone(),
            images: f(&self.images)?,
            font_color: self.font_color.clone(),
        })
    }
}

impl<S> Sprite<S> {
    pub fn try_map_assets<T, E, F>(&self, f: &mut F) -> Result<Sprite<T>, E>
    where
        F: FnMut(&S) -> Result<T, E>,
    {
        Ok(Sprite {
            id: self.id.clone(),
            label: self.label.clone(),
            variants: map_all(&self.variants, f)?,
        })
    }
}

/// Replace every raw path in `pack` with a descriptor resolved for both
/// quality levels.
pub fn convert_pack(
    pack: &RawPack,
    resolver: &PathResolver,
    capabilities: &Capabilities,
    source_pack_id: &str,
) -> Result<ConvertedPack, TemplateError> {
    pack.try_map_assets(&mut |paths: &Vec<String>| -> Result<AssetSet, TemplateError> {
        let assets = paths
            .iter()
            .map(|path| -> Result<AssetDescriptor, TemplateError> {
                Ok(AssetDescriptor {
                    high_quality_path: resolver.resolve(path, capabilities, false)?,
                    low_quality_path: resolver.resolve(path, capabilities, true)?,
                    source_pack_id: source_pack_id.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AssetSet::new(assets))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawAssets;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn resolver() -> PathResolver {
        let mut macros = BTreeMap::new();
        macros.insert(
            "ext".to_string(),
            "{lq:.lq:}.{format:webp:webp:png:png}".to_string(),
        );
        PathResolver::new(macros)
    }

    fn raw_pack() -> RawPack {
        serde_json::from_value(json!({
            "packId": "dddg.test",
            "characters": [{
                "id": "mo",
                "label": "Monika",
                "chibi": ["mo/chibi{ext}"],
                "heads": [{ "id": "mo:straight", "variants": [["mo/a{ext}"], ["mo/b{ext}", "mo/b2{ext}"]] }],
                "poses": [{
                    "id": "forward",
                    "compatibleHeads": ["mo:straight"],
                    "renderCommands": [
                        { "type": "pose-part", "part": "body" },
                        { "type": "head" },
                        { "type": "image", "images": ["mo/overlay{ext}"], "offset": [1, 2] }
                    ],
                    "positions": { "body": [["mo/body1{ext}"], ["mo/body2{ext}"]] }
                }]
            }],
            "backgrounds": [{ "id": "club", "variants": [["bg/club{ext}"]] }],
            "fonts": [{ "id": "aller", "fontName": "Aller", "files": ["fonts/aller.woff"] }],
            "poseStyles": [{ "id": "default", "font": "aller" }],
            "colors": [{ "name": "pink", "color": "#ffbde1" }]
        }))
        .unwrap()
    }

    #[test]
    fn test_every_leaf_becomes_descriptor() {
        let pack = raw_pack();
        let converted =
            convert_pack(&pack, &resolver(), &Capabilities::baseline(), "dddg.test").unwrap();

        let mo = &converted.characters[0];
        let chibi = mo.chibi.as_ref().unwrap();
        assert_eq!(chibi.assets()[0].high_quality_path, "mo/chibi.png");
        assert_eq!(chibi.assets()[0].low_quality_path, "mo/chibi.lq.png");
        assert_eq!(chibi.assets()[0].source_pack_id, "dddg.test");

        let variant = &mo.heads[0].variants[1];
        assert_eq!(variant.len(), 2);
        assert_eq!(variant.assets()[1].high_quality_path, "mo/b2.png");

        match &mo.poses[0].render_commands[2] {
            RenderCommand::Image { images, offset, .. } => {
                assert_eq!(images.assets()[0].low_quality_path, "mo/overlay.lq.png");
                assert_eq!(*offset, [1, 2]);
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert_eq!(
            converted.fonts[0].files.assets()[0].high_quality_path,
            "fonts/aller.woff"
        );
    }

    #[test]
    fn test_shape_preserved() {
        let pack = raw_pack();
        let converted =
            convert_pack(&pack, &resolver(), &Capabilities::baseline(), "dddg.test").unwrap();

        // Mapping back to path lists must reproduce the input shape exactly
        let shape: ContentPack<RawAssets> = converted
            .try_map_assets(&mut |set: &AssetSet| {
                Ok::<_, ()>(set.assets().iter().map(|_| String::new()).collect())
            })
            .unwrap();
        let expected: ContentPack<RawAssets> = pack
            .try_map_assets(&mut |paths: &RawAssets| {
                Ok::<_, ()>(paths.iter().map(|_| String::new()).collect())
            })
            .unwrap();
        assert_eq!(shape, expected);
        assert_eq!(converted.pack_id.as_deref(), Some("dddg.test"));
        assert_eq!(converted.colors, pack.colors);
        assert_eq!(converted.pose_styles, pack.pose_styles);
    }

    #[test]
    fn test_template_failure_aborts_conversion() {
        let mut pack = raw_pack();
        pack.backgrounds[0].variants[0][0] = "bg/club.{format:avif:avif}".to_string();
        let err = convert_pack(&pack, &resolver(), &Capabilities::baseline(), "x").unwrap_err();
        assert!(matches!(err, TemplateError::UnsupportedFormatToken { .. }));
    }
}
