//! Condition registry: the immutable table of conditions, indexed by id.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::landmarks::is_known_landmark;
use crate::error::SkinboneError;

const BUILTIN_TABLE: &str = include_str!("../../assets/conditions.toml");

/// On-disk layout: a list of `[[condition]]` tables.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConditionTable {
    #[serde(rename = "condition", default)]
    conditions: Vec<Condition>,
}

/// Immutable, id-indexed set of conditions.
#[derive(Debug, Clone, Default)]
pub struct ConditionRegistry {
    conditions: Vec<Condition>,
    index: FxHashMap<String, usize>,
}

impl ConditionRegistry {
    /// Build a registry, validating ids and scan times.
    pub fn new(conditions: Vec<Condition>) -> Result<Self, SkinboneError> {
        let mut index = FxHashMap::default();
        for (i, condition) in conditions.iter().enumerate() {
            if condition.id.is_empty() {
                return Err(SkinboneError::InvalidRegistry(format!(
                    "condition #{} has an empty id",
                    i + 1
                )));
            }
            if !(condition.scan_time.is_finite() && condition.scan_time > 0.0)
            {
                return Err(SkinboneError::InvalidRegistry(format!(
                    "condition {:?} has scan_time {}, expected > 0",
                    condition.id, condition.scan_time
                )));
            }
            if index.insert(condition.id.clone(), i).is_some() {
                return Err(SkinboneError::InvalidRegistry(format!(
                    "duplicate condition id {:?}",
                    condition.id
                )));
            }
            if !is_known_landmark(condition.bone, &condition.landmark) {
                log::warn!(
                    "condition {:?}: unknown landmark {:?} on {:?}, marker uses the bone anchor",
                    condition.id,
                    condition.landmark,
                    condition.bone
                );
            }
        }
        Ok(Self { conditions, index })
    }

    /// The table shipped with the crate.
    pub fn builtin() -> Result<Self, SkinboneError> {
        Self::from_toml(BUILTIN_TABLE)
    }

    /// Parse a TOML condition table.
    pub fn from_toml(content: &str) -> Result<Self, SkinboneError> {
        let table: ConditionTable = toml::from_str(content)
            .map_err(|e| SkinboneError::RegistryParse(e.to_string()))?;
        Self::new(table.conditions)
    }

    /// Load a TOML condition table from disk.
    pub fn load(path: &Path) -> Result<Self, SkinboneError> {
        let content =
            std::fs::read_to_string(path).map_err(SkinboneError::Io)?;
        let registry = Self::from_toml(&content)?;
        log::info!(
            "loaded {} conditions from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Look up a condition by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Condition> {
        self.index.get(id).map(|&i| &self.conditions[i])
    }

    /// Position of a condition in table order.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Conditions in table order.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Number of conditions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::condition::fixtures::condition;
    use crate::scene::{AnatomyContext, Bone};

    #[test]
    fn builtin_table_is_valid() {
        let registry = ConditionRegistry::builtin().unwrap();
        assert!(registry.len() >= 10);
        for context in AnatomyContext::ALL {
            assert!(
                registry.conditions().iter().any(|c| c.context == context),
                "no condition for {context}"
            );
        }
        for c in registry.conditions() {
            assert!(is_known_landmark(c.bone, &c.landmark), "{}", c.id);
            assert!(!c.summary.is_empty(), "{}", c.id);
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let a = condition("a", Bone::Skull, AnatomyContext::Head, 1.0);
        let err = ConditionRegistry::new(vec![a.clone(), a]).unwrap_err();
        assert!(matches!(err, SkinboneError::InvalidRegistry(_)));
    }

    #[test]
    fn non_positive_scan_time_is_rejected() {
        let a = condition("a", Bone::Skull, AnatomyContext::Head, 0.0);
        assert!(ConditionRegistry::new(vec![a]).is_err());
    }

    #[test]
    fn parse_errors_are_reported() {
        let err = ConditionRegistry::from_toml("[[condition]]\nid = 3")
            .unwrap_err();
        assert!(matches!(err, SkinboneError::RegistryParse(_)));
    }

    #[test]
    fn lookup_by_id() {
        let registry = ConditionRegistry::from_toml(
            r#"
[[condition]]
id = "x"
name = "X"
severity = "low"
category = "lesion"
bone = "femur"
landmark = "distal"
scan_time = 1.5
context = "fullbody"
"#,
        )
        .unwrap();
        let x = registry.get("x").unwrap();
        assert_eq!(x.bone, Bone::Femur);
        assert!(x.tags.is_empty());
        assert_eq!(registry.index_of("x"), Some(0));
        assert!(registry.get("y").is_none());
    }
}
