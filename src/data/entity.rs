//! Entity directory: surface names and descriptions by entity id.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::info;

use crate::data::triplet::ensure_json;
use crate::error::{CakeError, Result};

/// One record of `entities.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntityExample {
    pub entity_id: String,
    /// Surface name; a handful of wiki5m entities have none
    #[serde(default)]
    pub entity: String,
    #[serde(default)]
    pub entity_desc: String,
}

impl EntityExample {
    pub fn new(
        entity_id: impl Into<String>,
        entity: impl Into<String>,
        entity_desc: impl Into<String>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            entity: entity.into(),
            entity_desc: entity_desc.into(),
        }
    }
}

/// Entity records in file order, with an id -> position table.
#[derive(Debug, Clone, Default)]
pub struct EntityDict {
    entities: Vec<EntityExample>,
    id2idx: FxHashMap<String, usize>,
}

impl EntityDict {
    /// Load a JSON array of entity records.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ensure_json(path)?;
        let reader = BufReader::new(File::open(path)?);
        let entities: Vec<EntityExample> = serde_json::from_reader(reader)?;
        let dict = Self::from_entities(entities);
        info!(entities = dict.len(), path = %path.display(), "Loaded entity dictionary");
        Ok(dict)
    }

    /// Build from records. A repeated id keeps its first position and the later record wins.
    pub fn from_entities(entities: impl IntoIterator<Item = EntityExample>) -> Self {
        let mut dict = Self::default();
        for entity in entities {
            match dict.id2idx.get(&entity.entity_id) {
                Some(&idx) => dict.entities[idx] = entity,
                None => {
                    dict.id2idx.insert(entity.entity_id.clone(), dict.entities.len());
                    dict.entities.push(entity);
                }
            }
        }
        dict
    }

    pub fn get_entity_by_id(&self, entity_id: &str) -> Result<&EntityExample> {
        self.id2idx
            .get(entity_id)
            .map(|&idx| &self.entities[idx])
            .ok_or_else(|| CakeError::UnknownEntity(entity_id.to_string()))
    }

    /// Position of the entity in file order.
    pub fn entity_to_idx(&self, entity_id: &str) -> Result<usize> {
        self.id2idx
            .get(entity_id)
            .copied()
            .ok_or_else(|| CakeError::UnknownEntity(entity_id.to_string()))
    }

    pub fn get_entity_by_idx(&self, idx: usize) -> Option<&EntityExample> {
        self.entities.get(idx)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityExample> {
        self.entities.iter()
    }
}
