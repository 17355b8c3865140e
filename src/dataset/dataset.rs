//! Triplet dataset with per-relation indices for the relation sampler.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::config::Task;
use crate::data::{ensure_json, read_triplets, reverse_triplet};
use crate::dataset::example::{Example, VectorizedExample};
use crate::error::{CakeError, Result};
use crate::hub::DataHub;

/// Read one triplet file into forward and/or backward examples.
pub fn load_data(
    path: impl AsRef<Path>,
    add_forward_triplet: bool,
    add_backward_triplet: bool,
) -> Result<Vec<Example>> {
    let path = path.as_ref();
    ensure_json(path)?;
    if !add_forward_triplet && !add_backward_triplet {
        return Err(CakeError::NoTripletDirection);
    }

    let triplets = read_triplets(path)?;
    info!(count = triplets.len(), path = %path.display(), "Loaded triplets");

    let per_triplet = add_forward_triplet as usize + add_backward_triplet as usize;
    let mut examples = Vec::with_capacity(triplets.len() * per_triplet);
    for triplet in triplets {
        let backward = add_backward_triplet.then(|| Example::from(reverse_triplet(&triplet)));
        if add_forward_triplet {
            examples.push(Example::from(triplet));
        }
        examples.extend(backward);
    }
    Ok(examples)
}

/// Read-only copy of a dataset's indices, handed to samplers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetInfo {
    rels: Vec<String>,
    rel2ent_t: IndexMap<String, IndexMap<String, Vec<usize>>>,
    rel_ex_cnt: IndexMap<String, usize>,
    ex_hid: Vec<String>,
}

impl DatasetInfo {
    /// Index examples in one pass, in list order.
    pub fn build(examples: &[Example]) -> Self {
        let mut info = Self {
            rels: Vec::with_capacity(examples.len()),
            ex_hid: Vec::with_capacity(examples.len()),
            ..Self::default()
        };

        for (i, example) in examples.iter().enumerate() {
            info.ex_hid.push(example.head_id.clone());
            info.rels.push(example.relation.clone());
            info.rel2ent_t
                .entry(example.relation.clone())
                .or_default()
                .entry(example.tail_id.clone())
                .or_default()
                .push(i);
            *info.rel_ex_cnt.entry(example.relation.clone()).or_insert(0) += 1;
        }

        info
    }

    /// Relation of every example, by example index.
    pub fn rels(&self) -> &[String] {
        &self.rels
    }

    /// relation -> tail entity -> example indices
    pub fn rel2ent_t(&self) -> &IndexMap<String, IndexMap<String, Vec<usize>>> {
        &self.rel2ent_t
    }

    /// Examples per relation, in first-seen order.
    pub fn rel_ex_cnt(&self) -> &IndexMap<String, usize> {
        &self.rel_ex_cnt
    }

    /// Head entity of every example, by example index.
    pub fn ex_hid(&self) -> &[String] {
        &self.ex_hid
    }

    pub fn ex_cnt(&self) -> usize {
        self.ex_hid.len()
    }

    pub fn num_relations(&self) -> usize {
        self.rel_ex_cnt.len()
    }
}

/// Examples loaded from one or more triplet files.
pub struct Dataset {
    path_list: Vec<PathBuf>,
    task: Task,
    examples: Vec<Example>,
    info: DatasetInfo,
    hub: Arc<DataHub>,
}

impl Dataset {
    /// Load every path with forward and backward triplets.
    pub fn load<P: AsRef<Path>>(paths: &[P], hub: Arc<DataHub>) -> Result<Self> {
        Self::new(paths, hub, None)
    }

    /// Build from files, or from `examples` when a non-empty list is given.
    ///
    /// Every path must exist unless examples are supplied.
    pub fn new<P: AsRef<Path>>(
        paths: &[P],
        hub: Arc<DataHub>,
        examples: Option<Vec<Example>>,
    ) -> Result<Self> {
        let path_list: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
        info!(is_test = hub.config().is_test, "Building dataset");

        let examples = match examples.filter(|e| !e.is_empty()) {
            Some(examples) => examples,
            None => {
                if let Some(missing) = path_list.iter().find(|p| !p.exists()) {
                    return Err(CakeError::MissingPath(missing.clone()));
                }
                let mut examples = Vec::new();
                for path in &path_list {
                    examples.extend(load_data(path, true, true)?);
                }
                examples
            }
        };

        let info = DatasetInfo::build(&examples);
        log_relation_heads(&examples);
        info!(
            examples = examples.len(),
            relations = info.num_relations(),
            "Dataset indexed"
        );

        Ok(Self {
            path_list,
            task: hub.config().task.clone(),
            examples,
            info,
            hub,
        })
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Vectorized form of example `index`.
    pub fn get(&self, index: usize) -> Result<VectorizedExample> {
        self.examples
            .get(index)
            .ok_or(CakeError::Index {
                index,
                len: self.examples.len(),
            })?
            .vectorize(&self.hub)
    }

    /// Vectorize a batch of example indices, e.g. one yielded by the relation sampler.
    pub fn get_batch(&self, indices: &[usize]) -> Result<Vec<VectorizedExample>> {
        indices.iter().map(|&i| self.get(i)).collect()
    }

    pub fn example(&self, index: usize) -> Option<&Example> {
        self.examples.get(index)
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    /// Owned snapshot of the indices. Changes to it never reach the dataset.
    pub fn info(&self) -> DatasetInfo {
        self.info.clone()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.path_list
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn hub(&self) -> &DataHub {
        &self.hub
    }
}

fn log_relation_heads(examples: &[Example]) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    let mut heads: IndexMap<&str, FxHashSet<&str>> = IndexMap::new();
    for ex in examples {
        heads
            .entry(ex.relation.as_str())
            .or_default()
            .insert(ex.head_id.as_str());
    }
    for (relation, ids) in heads {
        debug!(relation, distinct_heads = ids.len(), "Relation heads");
    }
}
