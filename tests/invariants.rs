//! Contract Invariant Tests
//!
//! These tests verify the guarantees callers build on.

use posepack_core::{
    compose, merge, merge_all,
    model::{Background, CompositeMode},
    Capabilities, ContentPack, ContentStore, ConvertedPack, PackPipeline, PathBases,
    PathResolver, PlacementState, RawPack, RenderCommand,
};
use std::collections::BTreeMap;

fn resolver() -> PathResolver {
    let mut macros = BTreeMap::new();
    macros.insert(
        "ext".to_string(),
        "{lq:.lq:}.{format:webp:webp:png:png}".to_string(),
    );
    PathResolver::new(macros)
}

fn character_pack(id: &str) -> ConvertedPack {
    let doc = serde_json::json!({
        "version": "2.0",
        "packId": id,
        "characters": [{
            "id": "natsuki",
            "heads": [{ "id": "n:straight", "variants": [["n/h1{ext}"], ["n/h2{ext}"]] }],
            "poses": [{
                "id": "crossed",
                "compatibleHeads": ["n:straight"],
                "renderCommands": [
                    { "type": "head" },
                    { "type": "pose-part", "part": "body", "offset": [4, 8] },
                    { "type": "image", "images": ["n/ribbon{ext}"], "composite": "multiply" }
                ],
                "positions": { "body": [["n/b1{ext}"], ["n/b2{ext}", "n/b2-shadow{ext}"]] }
            }]
        }]
    });
    PackPipeline::default()
        .convert(&doc.to_string(), &PathBases::default(), &Capabilities::baseline())
        .unwrap()
}

#[test]
fn invariant_path_resolution_deterministic() {
    let r = resolver();
    let caps = Capabilities::baseline();
    for lq in [false, true] {
        let first = r.resolve("bg/{format:webp:webp:gif:gif}/x{ext}", &caps, lq).unwrap();
        for _ in 0..10 {
            assert_eq!(first, r.resolve("bg/{format:webp:webp:gif:gif}/x{ext}", &caps, lq).unwrap());
        }
    }
}

#[test]
fn invariant_quality_variants() {
    let r = resolver();
    let caps = Capabilities::baseline();
    assert_eq!(r.resolve("bg{ext}", &caps, false).unwrap(), "bg.png");
    assert_eq!(r.resolve("bg{ext}", &caps, true).unwrap(), "bg.lq.png");
}

#[test]
fn invariant_merge_precedence() {
    let mut a = RawPack::empty();
    let mut b = RawPack::empty();
    let bg = |id: &str, path: &str| Background {
        id: id.to_string(),
        label: String::new(),
        variants: vec![vec![path.to_string()]],
        scaling: Default::default(),
    };
    a.backgrounds = vec![bg("shared", "a"), bg("only-a", "a")];
    b.backgrounds = vec![bg("shared", "b"), bg("only-b", "b")];

    let merged = merge(&a, &b);
    let by_id = |id: &str| merged.backgrounds.iter().find(|x| x.id == id).unwrap();
    assert_eq!(by_id("shared"), &b.backgrounds[0]);
    assert_eq!(by_id("only-a"), &a.backgrounds[1]);
    assert_eq!(by_id("only-b"), &b.backgrounds[1]);
}

#[test]
fn invariant_empty_fold_well_defined() {
    let none: [&RawPack; 0] = [];
    let aggregate = merge_all(none);
    assert_eq!(aggregate, ContentPack::empty());
}

#[test]
fn invariant_walker_preserves_shape() {
    let pack = character_pack("p");
    let natsuki = &pack.characters[0];
    assert_eq!(natsuki.heads[0].variants.len(), 2);
    assert_eq!(natsuki.poses[0].render_commands.len(), 3);
    assert_eq!(natsuki.poses[0].positions["body"][1].len(), 2);

    let shadow = &natsuki.poses[0].positions["body"][1].assets()[1];
    assert_eq!(shadow.high_quality_path, "n/b2-shadow.png");
    assert_eq!(shadow.low_quality_path, "n/b2-shadow.lq.png");
    assert_eq!(shadow.source_pack_id, "p");
}

#[test]
fn invariant_composition_length_and_order() {
    let pack = character_pack("p");
    let natsuki = &pack.characters[0];

    let placement = PlacementState::new("crossed").with_variant("head", 5);
    let list = compose(natsuki, &placement, &[]);
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].assets.assets()[0].high_quality_path, "n/b1.png");
    assert_eq!(list[0].offset, [4, 8]);
    assert_eq!(list[1].composite, CompositeMode::Multiply);

    let stale_part = PlacementState::new("crossed").with_variant("body", 9);
    let list = compose(natsuki, &stale_part, &[]);
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].assets.assets()[0].high_quality_path, "n/h1.png");
    assert_eq!(list[1].composite, CompositeMode::Multiply);

    let full = compose(natsuki, &PlacementState::new("crossed"), &[]);
    assert_eq!(full.len(), 3);
    assert!(matches!(natsuki.poses[0].render_commands[0], RenderCommand::Head { .. }));
    assert_eq!(full[0].assets.assets()[0].high_quality_path, "n/h1.png");
}

#[test]
fn invariant_reuse_identity() {
    let pack = character_pack("p");
    let natsuki = &pack.characters[0];
    let placement = PlacementState::new("crossed");

    let first = compose(natsuki, &placement, &[]);
    let second = compose(natsuki, &placement, &first);
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.id, b.id);
    }

    let changed = placement.clone().with_variant("head", 1);
    let third = compose(natsuki, &changed, &second);
    assert_ne!(third[0].id, second[0].id);
    assert_eq!(third[1].id, second[1].id);
    assert_eq!(third[2].id, second[2].id);
}

#[test]
fn invariant_identity_survives_aggregate() {
    let mut store = ContentStore::new();
    store.commit(character_pack("p"));
    let placement = PlacementState::new("crossed");
    let first = compose(store.character("natsuki").unwrap(), &placement, &[]);

    // An unrelated pack does not disturb existing asset sets
    store.commit(ConvertedPack {
        pack_id: Some("other".into()),
        ..ConvertedPack::empty()
    });
    let second = compose(store.character("natsuki").unwrap(), &placement, &first);
    assert!(first.iter().zip(&second).all(|(a, b)| a.id == b.id));
}

#[test]
fn invariant_removal_semantics() {
    let mut store = ContentStore::new();
    store.commit(character_pack("base"));
    let mut extra = character_pack("extra");
    extra.characters[0].id = "extra-only".into();
    store.commit(extra);
    store.commit(character_pack("override"));

    assert_eq!(store.character("natsuki").unwrap().heads[0].variants[0].assets()[0].source_pack_id, "override");
    store.remove_packs(["extra", "override"]);

    assert!(store.character("extra-only").is_none());
    assert_eq!(
        store.character("natsuki").unwrap().heads[0].variants[0].assets()[0].source_pack_id,
        "base"
    );
    store.remove_packs(["base"]);
    assert!(store.current().is_empty());
}
