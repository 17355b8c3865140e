//! Shared read-only services for one training run.

use std::path::Path;
use std::sync::Arc;

use candle_core::Device;
use tracing::info;

use crate::config::DataConfig;
use crate::data::{EntityDict, LinkGraph, TripletDict};
use crate::error::Result;
use crate::text::Tokenize;

/// Entity texts, neighbor graph, known triplets and the tokenizer, created once
/// per run and handed by reference to examples, datasets and collators.
pub struct DataHub {
    config: DataConfig,
    entity_dict: Arc<EntityDict>,
    link_graph: Option<Arc<LinkGraph>>,
    triplet_dict: Arc<TripletDict>,
    tokenizer: Arc<dyn Tokenize + Send + Sync>,
    device: Device,
}

impl DataHub {
    /// Assemble a hub from already-built parts. The link graph starts out absent.
    pub fn new(
        config: DataConfig,
        entity_dict: Arc<EntityDict>,
        triplet_dict: Arc<TripletDict>,
        tokenizer: Arc<dyn Tokenize + Send + Sync>,
    ) -> Self {
        Self {
            config,
            entity_dict,
            link_graph: None,
            triplet_dict,
            tokenizer,
            device: Device::Cpu,
        }
    }

    /// Load entity texts and known triplets from disk.
    ///
    /// The link graph is built from the first training file when
    /// `use_link_graph` is set.
    pub fn load<P: AsRef<Path>>(
        config: DataConfig,
        entities_path: impl AsRef<Path>,
        train_paths: &[P],
        tokenizer: Arc<dyn Tokenize + Send + Sync>,
    ) -> Result<Self> {
        config.validate()?;
        let entity_dict = Arc::new(EntityDict::load(entities_path)?);
        let triplet_dict = Arc::new(TripletDict::load(train_paths)?);

        let link_graph = match (config.use_link_graph, train_paths.first()) {
            (true, Some(path)) => Some(Arc::new(LinkGraph::load(path)?)),
            _ => None,
        };
        info!(
            task = %config.task,
            link_graph = link_graph.is_some(),
            is_test = config.is_test,
            "Data hub ready"
        );

        Ok(Self {
            link_graph,
            ..Self::new(config, entity_dict, triplet_dict, tokenizer)
        })
    }

    pub fn with_link_graph(mut self, link_graph: Arc<LinkGraph>) -> Self {
        self.link_graph = Some(link_graph);
        self
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    pub fn entity_dict(&self) -> &EntityDict {
        &self.entity_dict
    }

    pub fn link_graph(&self) -> Option<&LinkGraph> {
        self.link_graph.as_deref()
    }

    pub fn triplet_dict(&self) -> &TripletDict {
        &self.triplet_dict
    }

    pub fn tokenizer(&self) -> &dyn Tokenize {
        self.tokenizer.as_ref()
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}
