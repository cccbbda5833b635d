//! Pack Validation - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Policy: any error rejects the pack; warnings are only reported.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{ContentPack, Keyed};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<PackViolation>,
    pub pack_id: Option<String>,
}

impl ValidationResult {
    pub fn errors(&self) -> impl Iterator<Item = &PackViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &PackViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Warning)
    }
}

/// Validation rule trait - produces violations
pub trait PackRule<S> {
    fn name(&self) -> &'static str;
    fn validate(&self, pack: &ContentPack<S>) -> Vec<PackViolation>;
}

fn violation(rule: &str, severity: ViolationSeverity, message: String) -> PackViolation {
    PackViolation {
        rule: rule.to_string(),
        severity,
        message,
    }
}

/// Every collection entry needs a non-empty key.
pub struct NonEmptyIdsRule;

impl<S> PackRule<S> for NonEmptyIdsRule {
    fn name(&self) -> &'static str { "non_empty_ids" }

    fn validate(&self, pack: &ContentPack<S>) -> Vec<PackViolation> {
        let rule = PackRule::<S>::name(self);
        let mut violations = vec![];
        let mut check = |collection: &str, keys: Vec<&str>| {
            for (index, key) in keys.into_iter().enumerate() {
                if key.trim().is_empty() {
                    violations.push(violation(
                        rule,
                        ViolationSeverity::Error,
                        format!("{}[{}] has an empty id", collection, index),
                    ));
                }
            }
        };

        check("characters", keys(&pack.characters));
        check("backgrounds", keys(&pack.backgrounds));
        check("fonts", keys(&pack.fonts));
        check("poseStyles", keys(&pack.pose_styles));
        check("poseBackgrounds", keys(&pack.pose_backgrounds));
        check("sprites", keys(&pack.sprites));
        check("colors", keys(&pack.colors));
        for character in &pack.characters {
            check(
                &format!("{}.poses", character.id),
                character.poses.iter().map(|p| p.id.as_str()).collect(),
            );
            check(
                &format!("{}.heads", character.id),
                character.heads.iter().map(|h| h.id.as_str()).collect(),
            );
        }

        violations
    }
}

fn keys<T: Keyed>(items: &[T]) -> Vec<&str> {
    items.iter().map(Keyed::key).collect()
}

/// Duplicate keys within one pack are legal (the last one wins on merge)
/// but almost always a mistake.
pub struct UniqueIdsRule;

impl<S> PackRule<S> for UniqueIdsRule {
    fn name(&self) -> &'static str { "unique_ids" }

    fn validate(&self, pack: &ContentPack<S>) -> Vec<PackViolation> {
        let rule = PackRule::<S>::name(self);
        let mut violations = vec![];
        let mut check = |collection: &str, keys: Vec<&str>| {
            let mut seen = HashSet::new();
            for key in keys {
                if !seen.insert(key) {
                    violations.push(violation(
                        rule,
                        ViolationSeverity::Warning,
                        format!("{} contains duplicate id {:?}", collection, key),
                    ));
                }
            }
        };

        check("characters", keys(&pack.characters));
        check("backgrounds", keys(&pack.backgrounds));
        check("fonts", keys(&pack.fonts));
        check("poseStyles", keys(&pack.pose_styles));
        check("poseBackgrounds", keys(&pack.pose_backgrounds));
        check("sprites", keys(&pack.sprites));
        check("colors", keys(&pack.colors));

        violations
    }
}

/// Poses should only list head groups their character defines.
pub struct HeadReferencesRule;

impl<S> PackRule<S> for HeadReferencesRule {
    fn name(&self) -> &'static str { "head_references" }

    fn validate(&self, pack: &ContentPack<S>) -> Vec<PackViolation> {
        let rule = PackRule::<S>::name(self);
        let mut violations = vec![];
        for character in &pack.characters {
            for pose in &character.poses {
                for head in &pose.compatible_heads {
                    if character.head_group(head).is_none() {
                        violations.push(violation(
                            rule,
                            ViolationSeverity::Warning,
                            format!(
                                "pose {}/{} references unknown head group {:?}",
                                character.id, pose.id, head
                            ),
                        ));
                    }
                }
            }
        }
        violations
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator<S> {
    rules: Vec<Box<dyn PackRule<S> + Send + Sync>>,
}

impl<S> Validator<S> {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(NonEmptyIdsRule),
                Box::new(UniqueIdsRule),
                Box::new(HeadReferencesRule),
            ],
        }
    }

    pub fn validate(&self, pack: &ContentPack<S>) -> ValidationResult {
        let mut all_violations = vec![];

        for rule in &self.rules {
            all_violations.extend(rule.validate(pack));
        }

        let has_errors = all_violations
            .iter()
            .any(|v| v.severity == ViolationSeverity::Error);

        ValidationResult {
            valid: !has_errors,
            violations: all_violations,
            pack_id: pack.pack_id.clone(),
        }
    }
}

impl<S> Default for Validator<S> {
    fn default() -> Self {
        Self::new()
    }
}
