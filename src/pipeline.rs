//! Conversion Pipeline - Single Entry Point
//!
//! parse -> schema adapt -> validate -> rebase paths -> walk assets.
//! A pack that fails any stage never yields a converted pack, so it can
//! never reach the aggregate.

use crate::capability::Capabilities;
use crate::config::EngineConfig;
use crate::error::{PackError, Result};
use crate::model::{ConvertedPack, RawAssets, RawPack};
use crate::path_template::PathResolver;
use crate::schema::{normalize_document, PathBases};
use crate::validation::{ValidationResult, Validator};
use crate::walker::convert_pack;

/// The conversion pipeline - every pack goes through here before merging
pub struct PackPipeline {
    resolver: PathResolver,
    validator: Validator<RawAssets>,
    builtin_pack_id: String,
    asset_root: String,
}

impl PackPipeline {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            resolver: config.resolver(),
            validator: Validator::new(),
            builtin_pack_id: config.builtin_pack_id.clone(),
            asset_root: config.asset_root.clone(),
        }
    }

    pub fn asset_root(&self) -> &str {
        &self.asset_root
    }

    /// Parse and normalize a pack document into the current schema, with
    /// relative paths rebased.
    pub fn parse(&self, text: &str, bases: &PathBases) -> Result<RawPack> {
        let document: serde_json::Value = serde_json::from_str(text)?;
        let pack = normalize_document(document)?;
        Ok(bases.apply(&pack))
    }

    /// Validate a raw pack against the built-in rules.
    pub fn validate(&self, pack: &RawPack) -> ValidationResult {
        self.validator.validate(pack)
    }

    /// Full conversion of a pack document.
    pub fn convert(
        &self,
        text: &str,
        bases: &PathBases,
        capabilities: &Capabilities,
    ) -> Result<ConvertedPack> {
        let pack = self.parse(text, bases)?;
        self.convert_raw(&pack, capabilities)
    }

    /// Convert an already normalized pack.
    pub fn convert_raw(&self, pack: &RawPack, capabilities: &Capabilities) -> Result<ConvertedPack> {
        let source_pack_id = pack.pack_id.as_deref().unwrap_or(&self.builtin_pack_id);

        let validation = self.validate(pack);
        for warning in validation.warnings() {
            tracing::warn!(pack = %source_pack_id, rule = %warning.rule, "{}", warning.message);
        }
        if !validation.valid {
            let messages: Vec<_> = validation
                .errors()
                .map(|v| format!("{}: {}", v.rule, v.message))
                .collect();
            return Err(PackError::schema(messages.join("; ")));
        }

        let converted = convert_pack(pack, &self.resolver, capabilities, source_pack_id)?;
        tracing::debug!(
            pack = %source_pack_id,
            characters = converted.characters.len(),
            backgrounds = converted.backgrounds.len(),
            "pack converted"
        );
        Ok(converted)
    }
}

impl Default for PackPipeline {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACK: &str = r#"{
        "version": "2.0",
        "backgrounds": [{ "id": "club", "variants": [["./bg/club{ext}"]] }]
    }"#;

    #[test]
    fn test_convert_document() {
        let pipeline = PackPipeline::default();
        let bases = PathBases::for_location("packs/base/index.json", pipeline.asset_root());
        let pack = pipeline
            .convert(PACK, &bases, &Capabilities::baseline())
            .unwrap();

        let asset = &pack.backgrounds[0].variants[0].assets()[0];
        assert_eq!(asset.high_quality_path, "packs/base/bg/club.png");
        assert_eq!(asset.low_quality_path, "packs/base/bg/club.lq.png");
        assert_eq!(asset.source_pack_id, "buildIn");
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = PackPipeline::default()
            .convert("{ not json", &PathBases::default(), &Capabilities::baseline())
            .unwrap_err();
        assert!(matches!(err, PackError::Parse(_)));
    }

    #[test]
    fn test_validation_error_is_schema_error() {
        let err = PackPipeline::default()
            .convert(
                r#"{ "version": "2.0", "sprites": [{ "id": "" }] }"#,
                &PathBases::default(),
                &Capabilities::baseline(),
            )
            .unwrap_err();
        assert!(matches!(err, PackError::Schema(msg) if msg.contains("non_empty_ids")));
    }

    #[test]
    fn test_bad_template_is_unsupported_format() {
        let err = PackPipeline::default()
            .convert(
                r#"{ "version": "2.0", "sprites": [{ "id": "s", "variants": [["s.{format:avif:avif}"]] }] }"#,
                &PathBases::default(),
                &Capabilities::baseline(),
            )
            .unwrap_err();
        assert!(matches!(err, PackError::UnsupportedFormatToken(_)));
    }
}
