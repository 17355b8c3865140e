//! Run configuration for batch preparation.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{CakeError, Result};

/// Benchmark the data comes from. Controls how entity names are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Task {
    /// WordNet names carry a `_POS_sense` suffix that is stripped
    Wn18rr,
    #[default]
    Fb15k237,
    Wiki5m,
    Other(String),
}

impl FromStr for Task {
    type Err = CakeError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_lowercase().as_str() {
            "wn18rr" => Task::Wn18rr,
            "fb15k237" => Task::Fb15k237,
            "wiki5m_ind" | "wiki5m_trans" | "wiki5m" => Task::Wiki5m,
            "" => return Err(CakeError::Config("empty task name".into())),
            other => Task::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Wn18rr => write!(f, "wn18rr"),
            Task::Fb15k237 => write!(f, "fb15k237"),
            Task::Wiki5m => write!(f, "wiki5m"),
            Task::Other(name) => write!(f, "{}", name),
        }
    }
}

impl<'de> Deserialize<'de> for Task {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Data preparation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Dataset name (default: fb15k237).
    pub task: Task,
    /// Append neighbor names to short descriptions (default: false).
    pub use_link_graph: bool,
    /// Evaluation mode: keeps neighbors that equal the label and skips negative masks.
    pub is_test: bool,
    /// Truncation length for every tokenized field (default: 50).
    pub max_num_tokens: usize,
    /// Examples per batch (default: 1024).
    pub batch_size: usize,
    /// Fraction of each batch drawn through domain-constrained sampling (default: 0.5).
    pub cake_ratio: f64,
    /// Seed for reproducible sampler passes (None = thread rng).
    pub seed: Option<u64>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            task: Task::default(),
            use_link_graph: false,
            is_test: false,
            max_num_tokens: 50,
            batch_size: 1024,
            cake_ratio: 0.5,
            seed: None,
        }
    }
}

impl DataConfig {
    /// Read a configuration from a JSON object. Missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the sampler and tokenizer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.cake_ratio) {
            return Err(CakeError::Config(format!(
                "cake_ratio must be within [0, 1], got {}",
                self.cake_ratio
            )));
        }
        if self.batch_size == 0 {
            return Err(CakeError::Config("batch_size must be positive".into()));
        }
        if self.max_num_tokens < 2 {
            return Err(CakeError::Config(
                "max_num_tokens must leave room for special tokens".into(),
            ));
        }
        Ok(())
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.task = task;
        self
    }

    pub fn with_link_graph(mut self, enabled: bool) -> Self {
        self.use_link_graph = enabled;
        self
    }

    pub fn with_test_mode(mut self, is_test: bool) -> Self {
        self.is_test = is_test;
        self
    }

    pub fn with_max_num_tokens(mut self, max_num_tokens: usize) -> Self {
        self.max_num_tokens = max_num_tokens;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_cake_ratio(mut self, cake_ratio: f64) -> Self {
        self.cake_ratio = cake_ratio;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_task_parsing() {
        assert_eq!("WN18RR".parse::<Task>().unwrap(), Task::Wn18rr);
        assert_eq!("wiki5m_trans".parse::<Task>().unwrap(), Task::Wiki5m);
        assert_eq!(
            "umls".parse::<Task>().unwrap(),
            Task::Other("umls".to_string())
        );
        assert!("".parse::<Task>().is_err());
    }

    #[test]
    fn test_partial_json_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"task": "wn18rr", "batch_size": 64, "seed": 7}}"#).unwrap();

        let config = DataConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.task, Task::Wn18rr);
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_num_tokens, 50);
        assert!(!config.use_link_graph);
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let config = DataConfig::default().with_cake_ratio(1.5);
        assert!(config.validate().is_err());
        let config = DataConfig::default().with_batch_size(0);
        assert!(config.validate().is_err());
        assert!(DataConfig::default().validate().is_ok());
    }
}
