//! Utility functions for text editing

use std::ops::Range;

/// Check if a character is a punctuation/symbol boundary (not whitespace)
pub fn is_punctuation(ch: char) -> bool {
    matches!(
        ch,
        '/' | ':'
            | ','
            | '.'
            | '-'
            | '('
            | ')'
            | '{'
            | '}'
            | '['
            | ']'
            | ';'
            | '"'
            | '\''
            | '<'
            | '>'
            | '='
            | '+'
            | '*'
            | '&'
            | '|'
            | '!'
            | '@'
            | '#'
            | '$'
            | '%'
            | '^'
            | '~'
            | '`'
            | '\\'
            | '?'
    )
}

/// Character type for word navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharType {
    /// Whitespace characters
    Whitespace,
    /// Alphanumeric characters (word characters)
    WordChar,
    /// Punctuation and symbols
    Punctuation,
}

/// Get the character type for word navigation
pub fn char_type(ch: char) -> CharType {
    if ch.is_whitespace() {
        CharType::Whitespace
    } else if is_punctuation(ch) {
        CharType::Punctuation
    } else {
        CharType::WordChar
    }
}

/// Byte offset of the start of the word left of `offset`.
///
/// Skips non-word characters first, then the word itself.
pub fn word_start_before(text: &str, offset: usize) -> usize {
    let mut pos = offset.min(text.len());
    let mut chars = text[..pos].char_indices().rev().peekable();

    while let Some(&(i, ch)) = chars.peek() {
        if char_type(ch) == CharType::WordChar {
            break;
        }
        pos = i;
        chars.next();
    }
    for (i, ch) in chars {
        if char_type(ch) != CharType::WordChar {
            break;
        }
        pos = i;
    }
    pos
}

/// Byte offset right of the run starting at `offset`, plus trailing whitespace
pub fn word_end_after(text: &str, offset: usize) -> usize {
    let start = offset.min(text.len());
    let mut chars = text[start..].char_indices().peekable();
    let Some(&(_, first)) = chars.peek() else {
        return start;
    };
    let start_type = char_type(first);

    let mut pos = text.len();
    while let Some(&(i, ch)) = chars.peek() {
        if char_type(ch) != start_type {
            pos = start + i;
            break;
        }
        chars.next();
    }
    for (i, ch) in chars {
        if char_type(ch) != CharType::Whitespace {
            return start + i;
        }
    }
    if pos < text.len() {
        // Only whitespace followed the run
        text.len()
    } else {
        pos
    }
}

/// Byte range of the run of same-type characters under `offset`.
///
/// At the end of the text the character before the offset decides the type.
pub fn word_at(text: &str, offset: usize) -> Range<usize> {
    let offset = offset.min(text.len());
    let probe = text[offset..]
        .chars()
        .next()
        .map(|ch| (offset, ch))
        .or_else(|| text[..offset].char_indices().next_back());
    let Some((at, ch)) = probe else {
        return offset..offset;
    };
    let target = char_type(ch);

    let start = text[..at]
        .char_indices()
        .rev()
        .take_while(|&(_, c)| char_type(c) == target)
        .last()
        .map_or(at, |(i, _)| i);
    let end = text[at..]
        .char_indices()
        .find(|&(_, c)| char_type(c) != target)
        .map_or(text.len(), |(i, _)| at + i);
    start..end
}
