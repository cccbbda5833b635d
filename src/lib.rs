//! PosePack Core - Content Pack Resolution and Pose Composition
//!
//! # Guarantees
//! 1. Path resolution is pure: same path, capabilities and quality flag
//!    always give the same string.
//! 2. Merging is pure and later packs win per id.
//! 3. Removing a pack re-folds the rest from an empty aggregate.
//! 4. Draw lists follow render-command order; stale variant indices draw
//!    nothing instead of failing.
//! 5. Unchanged asset sets keep their draw directive identity.

pub mod asset;
pub mod capability;
pub mod compose;
pub mod config;
pub mod error;
pub mod hashing;
pub mod loader;
pub mod merge;
pub mod model;
pub mod path_template;
pub mod pipeline;
pub mod schema;
pub mod store;
pub mod validation;
pub mod walker;

pub use asset::{AssetDescriptor, AssetSet, AssetSetHandle};
pub use capability::{Capabilities, CapabilityCache, FormatProbe, StaticProbe};
pub use compose::{compose, DirectiveId, DrawDirective, PlacementState, PoseComposer};
pub use config::{ConfigError, EngineConfig};
pub use error::PackError;
pub use hashing::{canonical_json, fingerprint};
pub use loader::{FileSource, LoadReport, PackLoader, PackSource};
pub use merge::{merge, merge_all};
pub use model::{ContentPack, ConvertedPack, PackState, RawPack, RenderCommand};
pub use path_template::{PathResolver, TemplateError};
pub use pipeline::PackPipeline;
pub use schema::PathBases;
pub use store::ContentStore;
pub use walker::convert_pack;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
