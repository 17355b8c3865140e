//! `Tokenize` backed by a HuggingFace `tokenizer.json`.

use std::path::Path;

use tokenizers::utils::truncation::{TruncationParams, TruncationStrategy};
use tokenizers::Tokenizer;

use crate::error::{CakeError, Result};
use crate::text::tokenizer::{Encoding, Tokenize, PAD_TOKEN};

/// Pretrained subword tokenizer truncating to `max_num_tokens`.
pub struct HfTokenizer {
    inner: Tokenizer,
    pad_token_id: u32,
}

impl HfTokenizer {
    pub fn from_file(path: impl AsRef<Path>, max_num_tokens: usize) -> Result<Self> {
        let mut inner = Tokenizer::from_file(path.as_ref())
            .map_err(|e| CakeError::Tokenizer(format!("failed to load tokenizer: {}", e)))?;
        inner
            .with_truncation(Some(TruncationParams {
                max_length: max_num_tokens,
                strategy: TruncationStrategy::LongestFirst,
                ..Default::default()
            }))
            .map_err(|e| CakeError::Tokenizer(e.to_string()))?;
        inner.with_padding(None);

        let pad_token_id = inner.token_to_id(PAD_TOKEN).unwrap_or(0);
        Ok(Self {
            inner,
            pad_token_id,
        })
    }
}

impl Tokenize for HfTokenizer {
    fn tokenize(&self, text: &str, text_pair: Option<&str>) -> Result<Encoding> {
        let encoding = match text_pair {
            Some(pair) => self.inner.encode((text, pair), true),
            None => self.inner.encode(text, true),
        }
        .map_err(|e| CakeError::Tokenizer(e.to_string()))?;

        Ok(Encoding {
            input_ids: encoding.get_ids().to_vec(),
            token_type_ids: encoding.get_type_ids().to_vec(),
        })
    }

    fn pad_token_id(&self) -> u32 {
        self.pad_token_id
    }
}
