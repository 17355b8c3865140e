//! Relation-aware batch sampling with domain-constrained ("CAKE") candidates.
//!
//! Every batch mixes two portions:
//! - constrained: examples of frequency-weighted relations whose tails fall in the
//!   relation's commonsense tail domains, so in-batch negatives share a domain with
//!   the true tail (hard but plausible negatives)
//! - random: uniform draws over the whole dataset
//!
//! The constrained portion grows one relation at a time and can overshoot its
//! target by up to one relation's contribution. Truncation to `batch_size` then
//! cuts from the random tail, so `cake_ratio` is approximate.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexSet;
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::config::DataConfig;
use crate::data::base_relation;
use crate::dataset::DatasetInfo;
use crate::error::{CakeError, Result};
use crate::sampler::commonsense::CommonsenseTables;

/// A relation contributes `batch_size / RELATION_SHARE` candidates per pick.
const RELATION_SHARE: usize = 8;

/// Draws spanning more distinct heads than this are logged.
const WIDE_DRAW_HEADS: usize = 20;

/// The two portions of one sampled batch, before truncation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchComposition {
    /// Distinct example indices from domain-constrained draws, in draw order
    pub constrained: Vec<usize>,
    /// Uniform draws, duplicates allowed
    pub random: Vec<usize>,
    /// Relations picked for the constrained portion, in pick order
    pub relations: Vec<String>,
}

impl BatchComposition {
    /// Constrained then random indices, cut to `batch_size`.
    pub fn into_indices(self, batch_size: usize) -> Vec<usize> {
        let mut indices = self.constrained;
        indices.extend(self.random);
        indices.truncate(batch_size);
        indices
    }
}

/// Yields one batch of example indices per distinct relation in the dataset.
pub struct RelationBatchSampler {
    batch_size: usize,
    cake_ratio: f64,
    tables: Arc<CommonsenseTables>,
    info: DatasetInfo,
    /// `rel_ex_cnt` keys, aligned with `weights`
    relations: Vec<String>,
    weights: Option<WeightedIndex<usize>>,
    seed: Option<u64>,
    /// Passes started through [`iter`](Self::iter)
    epoch: AtomicU64,
}

impl RelationBatchSampler {
    /// Load the commonsense tables from `commonsense_path` and index `info`.
    pub fn new(
        batch_size: usize,
        commonsense_path: impl AsRef<Path>,
        cake_ratio: f64,
        info: DatasetInfo,
    ) -> Result<Self> {
        let tables = CommonsenseTables::load(commonsense_path)?;
        Self::with_tables(batch_size, Arc::new(tables), cake_ratio, info)
    }

    /// Batch size, ratio and seed taken from `config`.
    pub fn from_config(
        config: &DataConfig,
        commonsense_path: impl AsRef<Path>,
        info: DatasetInfo,
    ) -> Result<Self> {
        let sampler = Self::new(config.batch_size, commonsense_path, config.cake_ratio, info)?;
        Ok(match config.seed {
            Some(seed) => sampler.with_seed(seed),
            None => sampler,
        })
    }

    /// Build over tables that are already loaded, possibly shared with other samplers.
    pub fn with_tables(
        batch_size: usize,
        tables: Arc<CommonsenseTables>,
        cake_ratio: f64,
        info: DatasetInfo,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(CakeError::Config("batch_size must be positive".into()));
        }
        if !(0.0..=1.0).contains(&cake_ratio) {
            return Err(CakeError::Config(format!(
                "cake_ratio must be within [0, 1], got {}",
                cake_ratio
            )));
        }

        let relations: Vec<String> = info.rel_ex_cnt().keys().cloned().collect();
        let weights = if relations.is_empty() {
            None
        } else {
            let weights = WeightedIndex::new(info.rel_ex_cnt().values().copied())
                .map_err(|e| CakeError::Config(format!("invalid relation weights: {}", e)))?;
            Some(weights)
        };

        Ok(Self {
            batch_size,
            cake_ratio,
            tables,
            info,
            relations,
            weights,
            seed: None,
            epoch: AtomicU64::new(0),
        })
    }

    /// Make a run reproducible: the n-th pass of two samplers with the same
    /// seed yields the same batches.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Batches per pass: the number of distinct relations.
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn cake_ratio(&self) -> f64 {
        self.cake_ratio
    }

    pub fn tables(&self) -> &CommonsenseTables {
        &self.tables
    }

    pub fn info(&self) -> &DatasetInfo {
        &self.info
    }

    /// Target size of the constrained portion.
    pub fn cake_sample_cnt(&self) -> usize {
        ((self.batch_size as f64 * self.cake_ratio).round() as usize).min(self.batch_size)
    }

    /// A fresh pass over `len()` batches. Consecutive passes draw different batches.
    pub fn iter(&self) -> RelationBatches<'_, XorShiftRng> {
        self.iter_epoch(self.epoch.fetch_add(1, Ordering::Relaxed))
    }

    /// Pass number `epoch` of a seeded run, regardless of how many passes came
    /// before. Unseeded samplers ignore `epoch`.
    pub fn iter_epoch(&self, epoch: u64) -> RelationBatches<'_, XorShiftRng> {
        let rng = match self.seed {
            Some(seed) => XorShiftRng::seed_from_u64(epoch_seed(seed, epoch)),
            None => XorShiftRng::seed_from_u64(rand::random()),
        };
        self.iter_with(rng)
    }

    /// A fresh pass drawing from `rng`.
    pub fn iter_with<R: Rng>(&self, rng: R) -> RelationBatches<'_, R> {
        RelationBatches {
            sampler: self,
            rng,
            remaining: self.len(),
        }
    }

    /// Sample one batch of example indices.
    pub fn sample_batch<R: Rng>(&self, rng: &mut R) -> Result<Vec<usize>> {
        Ok(self.compose_batch(rng)?.into_indices(self.batch_size))
    }

    /// Sample one batch and keep its portions apart.
    pub fn compose_batch<R: Rng>(&self, rng: &mut R) -> Result<BatchComposition> {
        let cake_sample_cnt = self.cake_sample_cnt();
        let per_relation = self.batch_size / RELATION_SHARE;

        let mut sampled: IndexSet<usize> = IndexSet::with_capacity(cake_sample_cnt);
        let mut relations = Vec::new();

        if let Some(weights) = &self.weights {
            let mut weights = weights.clone();
            // Stop early once every relation has been tried; the portion stays short.
            while sampled.len() < cake_sample_cnt && relations.len() < self.relations.len() {
                let r = weights.sample(rng);
                let relation = &self.relations[r];
                let drawn = self.concept_filter(relation, per_relation, rng)?;
                self.log_wide_draw(relation, &drawn);
                sampled.extend(drawn);
                relations.push(relation.clone());

                // Picked relations leave the pool. The last one stays, all-zero weights are rejected.
                if relations.len() < self.relations.len() {
                    weights.update_weights(&[(r, &0)]).map_err(|e| {
                        CakeError::Config(format!("invalid relation weights: {}", e))
                    })?;
                }
            }
        }

        let ex_cnt = self.info.ex_cnt();
        let random_sample_cnt = self.batch_size - cake_sample_cnt;
        let random: Vec<usize> = if ex_cnt == 0 {
            Vec::new()
        } else {
            (0..random_sample_cnt)
                .map(|_| rng.gen_range(0..ex_cnt))
                .collect()
        };

        debug!(
            constrained = sampled.len(),
            target = cake_sample_cnt,
            random = random.len(),
            relations = relations.len(),
            "Composed relation batch"
        );

        Ok(BatchComposition {
            constrained: sampled.into_iter().collect(),
            random,
            relations,
        })
    }

    /// Draw `example_size` examples of `relation` (with replacement) whose tail
    /// lies in one of the relation's commonsense tail domains.
    ///
    /// For `inverse r` the head domains of `r` play the tail role. Fails with
    /// [`CakeError::EmptyCandidatePool`] when no example qualifies and
    /// `example_size > 0`.
    pub fn concept_filter<R: Rng>(
        &self,
        relation: &str,
        example_size: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>> {
        let (complexity, concepts) = match base_relation(relation) {
            Some(base) => (
                self.tables.complexity(base)?.inverse(),
                self.tables.head_domains(base)?,
            ),
            None => (
                self.tables.complexity(relation)?,
                self.tables.tail_domains(relation)?,
            ),
        };
        let relation_ents = self
            .info
            .rel2ent_t()
            .get(relation)
            .ok_or_else(|| CakeError::UnknownRelation(relation.to_string()))?;

        let mut pool: IndexSet<usize> = IndexSet::new();
        for concept in concepts {
            for ent in self.tables.entities_in(concept)? {
                if let Some(exs) = relation_ents.get(ent) {
                    pool.extend(exs.iter().copied());
                }
            }
        }
        trace!(
            relation,
            complexity = %complexity,
            domains = concepts.len(),
            pool = pool.len(),
            "Concept filter"
        );

        if example_size == 0 {
            return Ok(Vec::new());
        }
        if pool.is_empty() {
            return Err(CakeError::EmptyCandidatePool {
                relation: relation.to_string(),
                requested: example_size,
            });
        }
        Ok((0..example_size)
            .map(|_| pool[rng.gen_range(0..pool.len())])
            .collect())
    }

    fn log_wide_draw(&self, relation: &str, drawn: &[usize]) {
        let heads: FxHashSet<&str> = drawn
            .iter()
            .filter_map(|&i| self.info.ex_hid().get(i))
            .map(String::as_str)
            .collect();
        if heads.len() > WIDE_DRAW_HEADS {
            debug!(relation, distinct_heads = heads.len(), "Wide constrained draw");
        }
    }
}

/// Seed of pass `epoch` in a run seeded with `seed`; pass 0 uses `seed` itself.
fn epoch_seed(seed: u64, epoch: u64) -> u64 {
    seed ^ epoch.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// One pass of a [`RelationBatchSampler`]. Ends after the first error.
pub struct RelationBatches<'a, R> {
    sampler: &'a RelationBatchSampler,
    rng: R,
    remaining: usize,
}

impl<R: Rng> Iterator for RelationBatches<'_, R> {
    type Item = Result<Vec<usize>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let batch = self.sampler.sample_batch(&mut self.rng);
        if batch.is_err() {
            self.remaining = 0;
        }
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<'a> IntoIterator for &'a RelationBatchSampler {
    type Item = Result<Vec<usize>>;
    type IntoIter = RelationBatches<'a, XorShiftRng>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
