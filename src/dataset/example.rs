//! A directed triplet and its tokenized text form.

use crate::config::Task;
use crate::data::{EntityDict, Triplet, DEFAULT_MAX_NEIGHBORS};
use crate::error::Result;
use crate::hub::DataHub;
use crate::text::Encoding;

/// Descriptions shorter than this many words get neighbor names appended.
const SHORT_DESC_WORDS: usize = 20;

/// One (head, relation, tail) training or evaluation example.
///
/// Names and descriptions are looked up in the entity directory on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Example {
    /// Empty only for placeholder examples
    pub head_id: String,
    pub relation: String,
    pub tail_id: String,
}

/// Tokenized fields of an [`Example`].
#[derive(Debug, Clone)]
pub struct VectorizedExample {
    /// Head text paired with the relation
    pub hr: Encoding,
    pub tail: Encoding,
    pub head: Encoding,
    pub example: Example,
}

impl From<Triplet> for Example {
    fn from(t: Triplet) -> Self {
        Self {
            head_id: t.head_id,
            relation: t.relation,
            tail_id: t.tail_id,
        }
    }
}

impl Example {
    pub fn new(
        head_id: impl Into<String>,
        relation: impl Into<String>,
        tail_id: impl Into<String>,
    ) -> Self {
        Self {
            head_id: head_id.into(),
            relation: relation.into(),
            tail_id: tail_id.into(),
        }
    }

    pub fn head<'a>(&self, entities: &'a EntityDict) -> Result<&'a str> {
        if self.head_id.is_empty() {
            return Ok("");
        }
        Ok(&entities.get_entity_by_id(&self.head_id)?.entity)
    }

    pub fn head_desc<'a>(&self, entities: &'a EntityDict) -> Result<&'a str> {
        if self.head_id.is_empty() {
            return Ok("");
        }
        Ok(&entities.get_entity_by_id(&self.head_id)?.entity_desc)
    }

    pub fn tail<'a>(&self, entities: &'a EntityDict) -> Result<&'a str> {
        Ok(&entities.get_entity_by_id(&self.tail_id)?.entity)
    }

    pub fn tail_desc<'a>(&self, entities: &'a EntityDict) -> Result<&'a str> {
        Ok(&entities.get_entity_by_id(&self.tail_id)?.entity_desc)
    }

    /// Tokenize head+relation, head and tail text.
    pub fn vectorize(&self, hub: &DataHub) -> Result<VectorizedExample> {
        let entities = hub.entity_dict();
        let config = hub.config();

        let mut head_desc = self.head_desc(entities)?.to_string();
        let mut tail_desc = self.tail_desc(entities)?.to_string();
        if config.use_link_graph {
            if head_desc.split_whitespace().count() < SHORT_DESC_WORDS {
                head_desc.push(' ');
                head_desc.push_str(&neighbor_desc(hub, &self.head_id, &self.tail_id)?);
            }
            if tail_desc.split_whitespace().count() < SHORT_DESC_WORDS {
                tail_desc.push(' ');
                tail_desc.push_str(&neighbor_desc(hub, &self.tail_id, &self.head_id)?);
            }
        }

        let tokenizer = hub.tokenizer();
        let relation = (!self.relation.is_empty()).then_some(self.relation.as_str());

        let head_word = parse_entity_name(&config.task, self.head(entities)?);
        let head_text = concat_name_desc(&head_word, &head_desc);
        let hr = tokenizer.tokenize(&head_text, relation)?;
        let head = tokenizer.tokenize(&head_text, None)?;

        let tail_word = parse_entity_name(&config.task, self.tail(entities)?);
        let tail = tokenizer.tokenize(&concat_name_desc(&tail_word, &tail_desc), None)?;

        Ok(VectorizedExample {
            hr,
            tail,
            head,
            example: self.clone(),
        })
    }
}

/// Render a raw entity name for the given task.
///
/// WN18RR names look like `family_alcidae_NN_1`; the POS and sense suffix is dropped.
pub fn parse_entity_name(task: &Task, entity: &str) -> String {
    match task {
        Task::Wn18rr => {
            let parts: Vec<&str> = entity.split('_').collect();
            parts[..parts.len().saturating_sub(2)].join(" ")
        }
        _ => entity.to_string(),
    }
}

/// `name: description`, with a description that repeats the name trimmed first.
pub fn concat_name_desc(entity: &str, entity_desc: &str) -> String {
    let desc = match entity_desc.strip_prefix(entity) {
        Some(rest) => rest.trim(),
        None => entity_desc,
    };
    if desc.is_empty() {
        entity.to_string()
    } else {
        format!("{}: {}", entity, desc)
    }
}

/// Space-joined names of `entity_id`'s neighbors.
///
/// Outside evaluation, `exclude_id` (the other end of the triplet) is left out
/// so the label does not leak into the input.
pub fn neighbor_desc(hub: &DataHub, entity_id: &str, exclude_id: &str) -> Result<String> {
    let Some(graph) = hub.link_graph() else {
        return Ok(String::new());
    };
    let task = &hub.config().task;
    let is_test = hub.config().is_test;

    let mut names = Vec::new();
    for n_id in graph.get_neighbor_ids(entity_id, DEFAULT_MAX_NEIGHBORS) {
        if !is_test && n_id == exclude_id {
            continue;
        }
        let entity = hub.entity_dict().get_entity_by_id(&n_id)?;
        names.push(parse_entity_name(task, &entity.entity));
    }
    Ok(names.join(" "))
}
