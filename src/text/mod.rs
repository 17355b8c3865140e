//! Tokenization for entity and relation text.

#[cfg(feature = "hf-tokenizer")]
mod hf;
mod tokenizer;

#[cfg(feature = "hf-tokenizer")]
pub use hf::HfTokenizer;
pub use tokenizer::{
    Encoding, Tokenize, VocabTokenizer, CLS_TOKEN, PAD_TOKEN, SEP_TOKEN, UNK_TOKEN,
};
