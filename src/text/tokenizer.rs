//! Tokenization seam plus a word-level vocabulary tokenizer.

use std::collections::{BTreeSet, HashMap};

use crate::error::Result;

/// Token ids and segment ids for one (possibly paired) input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Encoding {
    pub input_ids: Vec<u32>,
    pub token_type_ids: Vec<u32>,
}

impl Encoding {
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// Anything that turns text (and an optional second segment) into BERT-style inputs.
///
/// Implementations add their own special tokens and truncate to their configured
/// maximum length.
pub trait Tokenize {
    fn tokenize(&self, text: &str, text_pair: Option<&str>) -> Result<Encoding>;

    fn pad_token_id(&self) -> u32;
}

pub const PAD_TOKEN: &str = "[PAD]";
pub const UNK_TOKEN: &str = "[UNK]";
pub const CLS_TOKEN: &str = "[CLS]";
pub const SEP_TOKEN: &str = "[SEP]";

const SPECIAL_TOKENS: [&str; 4] = [PAD_TOKEN, UNK_TOKEN, CLS_TOKEN, SEP_TOKEN];

/// Word-level tokenizer with a vocabulary built from a corpus.
///
/// Ids 0..4 are `[PAD]`, `[UNK]`, `[CLS]`, `[SEP]`; words follow in sorted order.
#[derive(Debug, Clone)]
pub struct VocabTokenizer {
    /// Word to index mapping
    pub word_to_idx: HashMap<String, u32>,
    /// Index to word mapping
    pub idx_to_word: Vec<String>,
    /// Longest encoding produced, special tokens included
    pub max_len: usize,
}

impl VocabTokenizer {
    /// Build a vocabulary from every word in `text`.
    pub fn from_text(text: &str, max_len: usize) -> Self {
        let words: BTreeSet<String> = split_words(text).collect();

        let idx_to_word: Vec<String> = SPECIAL_TOKENS
            .iter()
            .map(|t| t.to_string())
            .chain(words)
            .collect();
        let word_to_idx = idx_to_word
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i as u32))
            .collect();

        Self {
            word_to_idx,
            idx_to_word,
            max_len,
        }
    }

    pub fn vocab_size(&self) -> usize {
        self.idx_to_word.len()
    }

    pub fn token_to_id(&self, token: &str) -> u32 {
        self.word_to_idx.get(token).copied().unwrap_or(1)
    }

    /// Encode text to ids without special tokens. Unknown words map to `[UNK]`.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        split_words(text).map(|w| self.token_to_id(&w)).collect()
    }

    /// Decode ids back to space-joined words.
    pub fn decode(&self, ids: &[u32]) -> String {
        ids.iter()
            .filter_map(|&i| self.idx_to_word.get(i as usize))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Tokenize for VocabTokenizer {
    fn tokenize(&self, text: &str, text_pair: Option<&str>) -> Result<Encoding> {
        let cls = self.token_to_id(CLS_TOKEN);
        let sep = self.token_to_id(SEP_TOKEN);

        let mut first = self.encode(text);
        let mut second = text_pair.map(|p| self.encode(p));

        let specials = if second.is_some() { 3 } else { 2 };
        let budget = self.max_len.saturating_sub(specials);
        truncate_longest_first(&mut first, second.as_mut(), budget);

        let mut input_ids = Vec::with_capacity(first.len() + specials);
        input_ids.push(cls);
        input_ids.extend_from_slice(&first);
        input_ids.push(sep);
        let mut token_type_ids = vec![0; input_ids.len()];

        if let Some(second) = second {
            input_ids.extend_from_slice(&second);
            input_ids.push(sep);
            token_type_ids.resize(input_ids.len(), 1);
        }

        Ok(Encoding {
            input_ids,
            token_type_ids,
        })
    }

    fn pad_token_id(&self) -> u32 {
        0
    }
}

/// Lowercased alphanumeric runs.
fn split_words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Drop tokens from the end of the longer sequence until both fit in `budget`.
fn truncate_longest_first(first: &mut Vec<u32>, mut second: Option<&mut Vec<u32>>, budget: usize) {
    loop {
        let second_len = second.as_ref().map_or(0, |s| s.len());
        if first.len() + second_len <= budget {
            return;
        }
        match second.as_deref_mut() {
            Some(s) if s.len() > first.len() => {
                s.pop();
            }
            _ => {
                first.pop();
            }
        }
    }
}
