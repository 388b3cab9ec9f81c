use hanzi_config::dictionary::DictionaryConfig;
use hanzi_core::dictionary::{Dictionary, DictionaryEntry, DictionaryIndex, LoadError};
use hanzi_core::language::LanguageProcessor;
use hanzi_core::preprocess::{DefaultPreprocessor, Preprocessor};
use hanzi_core::resolver;
use hanzi_types::{SearchRequest, SearchResponse};

use crate::loader::CedictLoader;
use crate::pinyin::numbered_to_marks;

/// Chinese language processor
pub struct ChineseProcessor {
    dictionary: DictionaryIndex,
}

impl ChineseProcessor {
    pub fn new(dictionary: DictionaryIndex) -> Self {
        Self { dictionary }
    }

    /// Load every configured dictionary; fails without a partial result
    pub fn from_config(config: &DictionaryConfig) -> Result<Self, LoadError> {
        let dictionary = CedictLoader::load(config)?;
        let metadata = dictionary.metadata();
        tracing::info!(
            "Dictionary ready: {} entries under {} headwords (longest {})",
            metadata.entry_count,
            metadata.headword_count,
            metadata.max_headword_length
        );
        Ok(Self::new(dictionary))
    }

    fn display_entry(entry: &DictionaryEntry) -> DictionaryEntry {
        DictionaryEntry {
            pinyin: numbered_to_marks(&entry.pinyin),
            ..entry.clone()
        }
    }
}

impl LanguageProcessor for ChineseProcessor {
    fn language_code(&self) -> &str {
        "zh"
    }

    fn normalize(&self, text: &str) -> String {
        DefaultPreprocessor.process(text)
    }

    fn search(&self, request: &SearchRequest) -> SearchResponse {
        let text = self.normalize(&request.text);

        match resolver::resolve(&text, &self.dictionary) {
            Some(found) => {
                tracing::debug!("Matched {} chars of {:?}", found.match_len, text);
                SearchResponse {
                    data: found.entries.iter().map(Self::display_entry).collect(),
                    match_len: found.match_len,
                    original_text: request.original_text.clone(),
                    sel_start_offset: request.sel_start_offset,
                }
            }
            None => SearchResponse::no_match(request),
        }
    }
}
