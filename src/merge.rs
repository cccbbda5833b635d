//! Content Pack Merger
//!
//! `merge(base, incoming)` is pure. Per collection, entries are matched by
//! key; the incoming entry wins and takes the base entry's position, and
//! new keys are appended in incoming order.

use std::collections::{HashMap, HashSet};

use crate::model::{ContentPack, Keyed};

fn merge_keyed<T: Keyed + Clone>(base: &[T], incoming: &[T]) -> Vec<T> {
    // Last occurrence wins when a key repeats within `incoming`
    let mut latest: HashMap<&str, &T> = HashMap::with_capacity(incoming.len());
    for entry in incoming {
        latest.insert(entry.key(), entry);
    }

    let mut merged: Vec<T> = base
        .iter()
        .map(|entry| latest.get(entry.key()).map_or(entry, |newer| *newer).clone())
        .collect();

    let mut placed: HashSet<&str> = base.iter().map(Keyed::key).collect();
    for entry in incoming {
        if placed.insert(entry.key()) {
            merged.push(latest[entry.key()].clone());
        }
    }

    merged
}

fn merge_dependencies(base: &[String], incoming: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    base.iter()
        .chain(incoming)
        .filter(|dep| seen.insert(dep.as_str()))
        .cloned()
        .collect()
}

/// Combine two packs; `incoming` overrides `base` per key.
pub fn merge<S: Clone>(base: &ContentPack<S>, incoming: &ContentPack<S>) -> ContentPack<S> {
    ContentPack {
        pack_id: None,
        state: base.state,
        dependencies: merge_dependencies(&base.dependencies, &incoming.dependencies),
        characters: merge_keyed(&base.characters, &incoming.characters),
        backgrounds: merge_keyed(&base.backgrounds, &incoming.backgrounds),
        fonts: merge_keyed(&base.fonts, &incoming.fonts),
        pose_styles: merge_keyed(&base.pose_styles, &incoming.pose_styles),
        pose_backgrounds: merge_keyed(&base.pose_backgrounds, &incoming.pose_backgrounds),
        sprites: merge_keyed(&base.sprites, &incoming.sprites),
        colors: merge_keyed(&base.colors, &incoming.colors),
    }
}

/// Left fold over `packs` from the empty aggregate. Zero packs yield an
/// empty aggregate.
pub fn merge_all<'a, S, I>(packs: I) -> ContentPack<S>
where
    S: Clone + 'a,
    I: IntoIterator<Item = &'a ContentPack<S>>,
{
    packs
        .into_iter()
        .fold(ContentPack::empty(), |acc, pack| merge(&acc, pack))
}
