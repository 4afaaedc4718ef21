//! Definición inmutable y validada de la topología de etapas.
use std::collections::HashSet;

use serde_json::json;

use super::StageDefinition;
use crate::errors::CoreError;
use crate::hashing::hash_value;

/// Etapas en orden de prioridad (orden de declaración) más el hash de la
/// topología. Al construirse valida nombres únicos y que cada predecesor esté
/// declarado antes de usarse, lo que además descarta ciclos.
pub struct PipelineDefinition {
    pub stages: Vec<Box<dyn StageDefinition>>,
    pub definition_hash: String,
}

impl std::fmt::Debug for PipelineDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineDefinition")
         .field("stages", &self.names())
         .field("definition_hash", &self.definition_hash)
         .finish()
    }
}

impl PipelineDefinition {
    pub fn new(stages: Vec<Box<dyn StageDefinition>>) -> Result<Self, CoreError> {
        if stages.is_empty() {
            return Err(CoreError::InvalidTopology("no stages".into()));
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for stage in &stages {
            for req in stage.requires() {
                if *req == stage.name() {
                    return Err(CoreError::InvalidTopology(format!("stage '{}' requires itself", stage.name())));
                }
                if !seen.contains(req) {
                    return Err(CoreError::InvalidTopology(format!("stage '{}' requires '{}', which is not declared before it", stage.name(), req)));
                }
            }
            if !seen.insert(stage.name()) {
                return Err(CoreError::InvalidTopology(format!("duplicate stage '{}'", stage.name())));
            }
        }
        let shape: Vec<_> = stages.iter().map(|s| json!([s.name(), s.requires()])).collect();
        let definition_hash = hash_value(&json!(shape));
        Ok(Self { stages, definition_hash })
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.name() == name)
    }

    /// Etapas que ninguna otra requiere: las hojas que llegan al router.
    pub fn terminal_stages(&self) -> Vec<&'static str> {
        self.stages
            .iter()
            .map(|s| s.name())
            .filter(|name| !self.stages.iter().any(|s| s.requires().contains(name)))
            .collect()
    }
}
