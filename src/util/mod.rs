//! Utility modules

pub mod text;

pub use text::{char_type, is_punctuation, word_at, word_end_after, word_start_before, CharType};
