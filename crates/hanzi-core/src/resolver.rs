use crate::dictionary::{Dictionary, DictionaryEntry};

/// Longest headword found at the start of a buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'a> {
    pub entries: &'a [DictionaryEntry],
    /// Length of the headword in characters
    pub match_len: usize,
}

/// Find the longest prefix of `buffer` that is a headword.
///
/// Candidate lengths run from `min(len(buffer), max_headword_length)` down to 1.
pub fn resolve<'a, D>(buffer: &str, dictionary: &'a D) -> Option<Match<'a>>
where
    D: Dictionary + ?Sized,
{
    // Byte offset just past each character
    let ends: Vec<usize> = buffer
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .collect();
    let longest = ends.len().min(dictionary.max_headword_length());

    (1..=longest).rev().find_map(|len| {
        let entries = dictionary.lookup(&buffer[..ends[len - 1]]);
        (!entries.is_empty()).then_some(Match {
            entries,
            match_len: len,
        })
    })
}
