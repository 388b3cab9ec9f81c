use std::collections::HashMap;

use serde::Deserialize;

pub use hanzi_types::DictionaryEntry;

/// Read-only headword lookups
pub trait Dictionary: Send + Sync {
    /// Entries filed under exactly `headword`, in source order
    fn lookup(&self, headword: &str) -> &[DictionaryEntry];

    /// Character count of the longest headword
    fn max_headword_length(&self) -> usize;

    /// Get dictionary metadata
    fn metadata(&self) -> DictionaryMetadata;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryMetadata {
    pub entry_count: usize,
    pub headword_count: usize,
    pub max_headword_length: usize,
}

/// A record as handed over by a loader, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntry {
    pub simplified: Option<String>,
    pub traditional: Option<String>,
    pub pinyin: Option<String>,
    pub definitions: Option<Vec<String>>,
}

impl RawEntry {
    pub fn new(
        simplified: impl Into<String>,
        traditional: impl Into<String>,
        pinyin: impl Into<String>,
        definitions: Vec<String>,
    ) -> Self {
        Self {
            simplified: Some(simplified.into()),
            traditional: Some(traditional.into()),
            pinyin: Some(pinyin.into()),
            definitions: Some(definitions),
        }
    }

    fn into_entry(self, index: usize) -> Result<DictionaryEntry, LoadError> {
        let required = |value: Option<String>, field: &'static str| {
            value
                .filter(|v| !v.trim().is_empty())
                .ok_or(LoadError::MissingField { index, field })
        };

        let definitions = self
            .definitions
            .filter(|defs| !defs.is_empty())
            .ok_or(LoadError::MissingField {
                index,
                field: "definitions",
            })?;

        Ok(DictionaryEntry {
            simplified: required(self.simplified, "simplified")?,
            traditional: required(self.traditional, "traditional")?,
            pinyin: required(self.pinyin, "pinyin")?,
            definitions,
        })
    }
}

/// Headword -> entries table, immutable once built.
///
/// Every entry is filed under its simplified form and, when it differs, under
/// its traditional form as well.
#[derive(Debug, Default, Clone)]
pub struct DictionaryIndex {
    entries: HashMap<String, Vec<DictionaryEntry>>,
    entry_count: usize,
    max_headword_length: usize,
}

impl DictionaryIndex {
    pub fn build<I>(raw_entries: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = RawEntry>,
    {
        let mut index = Self::default();

        for (position, raw) in raw_entries.into_iter().enumerate() {
            index.insert(raw.into_entry(position)?);
        }

        if index.entry_count == 0 {
            return Err(LoadError::Empty);
        }

        Ok(index)
    }

    /// Build from a JSON array of `{simplified, traditional, pinyin, definitions}` records
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let raw: Vec<RawEntry> =
            serde_json::from_str(json).map_err(|e| LoadError::InvalidFormat(e.to_string()))?;
        Self::build(raw)
    }

    fn insert(&mut self, entry: DictionaryEntry) {
        if entry.traditional != entry.simplified {
            self.file_under(entry.traditional.clone(), entry.clone());
        }
        self.file_under(entry.simplified.clone(), entry);
        self.entry_count += 1;
    }

    fn file_under(&mut self, headword: String, entry: DictionaryEntry) {
        self.max_headword_length = self.max_headword_length.max(headword.chars().count());
        self.entries.entry(headword).or_default().push(entry);
    }

    /// Append every entry of `other`; per-headword order is base first, then `other`
    pub fn merge(mut self, other: DictionaryIndex) -> Self {
        for (headword, entries) in other.entries {
            self.entries.entry(headword).or_default().extend(entries);
        }
        self.entry_count += other.entry_count;
        self.max_headword_length = self.max_headword_length.max(other.max_headword_length);
        self
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn headword_count(&self) -> usize {
        self.entries.len()
    }
}

impl Dictionary for DictionaryIndex {
    fn lookup(&self, headword: &str) -> &[DictionaryEntry] {
        self.entries.get(headword).map(Vec::as_slice).unwrap_or(&[])
    }

    fn max_headword_length(&self) -> usize {
        self.max_headword_length
    }

    fn metadata(&self) -> DictionaryMetadata {
        DictionaryMetadata {
            entry_count: self.entry_count,
            headword_count: self.entries.len(),
            max_headword_length: self.max_headword_length,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Dictionary source is empty")]
    Empty,

    #[error("Entry {index}: missing field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("Line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(simplified: &str, traditional: &str, pinyin: &str, defs: &[&str]) -> RawEntry {
        RawEntry::new(
            simplified,
            traditional,
            pinyin,
            defs.iter().map(|d| d.to_string()).collect(),
        )
    }

    #[test]
    fn groups_senses_by_headword_in_source_order() {
        let index = DictionaryIndex::build(vec![
            raw("好", "好", "hao3", &["good"]),
            raw("好", "好", "hao4", &["to be fond of"]),
        ])
        .unwrap();

        let entries = index.lookup("好");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].pinyin, "hao3");
        assert_eq!(entries[1].pinyin, "hao4");
        assert_eq!(index.entry_count(), 2);
        assert_eq!(index.headword_count(), 1);
    }

    #[test]
    fn files_traditional_form_separately() {
        let index = DictionaryIndex::build(vec![raw("中国", "中國", "Zhong1 guo2", &["China"])]).unwrap();

        assert_eq!(index.lookup("中国").len(), 1);
        assert_eq!(index.lookup("中國").len(), 1);
        assert_eq!(index.headword_count(), 2);
        assert_eq!(index.entry_count(), 1);
    }

    #[test]
    fn max_headword_length_counts_characters() {
        let index = DictionaryIndex::build(vec![
            raw("中", "中", "zhong1", &["middle"]),
            raw("中国人", "中國人", "Zhong1 guo2 ren2", &["Chinese person"]),
        ])
        .unwrap();

        assert_eq!(index.max_headword_length(), 3);
    }

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        let index = DictionaryIndex::build(vec![raw("T恤", "T恤", "T xu4", &["T-shirt"])]).unwrap();

        assert_eq!(index.lookup("T恤").len(), 1);
        assert!(index.lookup("t恤").is_empty());
        assert!(index.lookup("T").is_empty());
    }

    #[test]
    fn empty_source_is_rejected() {
        let result = DictionaryIndex::build(Vec::new());
        assert!(matches!(result, Err(LoadError::Empty)));
    }

    #[test]
    fn missing_field_is_rejected() {
        let mut entry = raw("你", "你", "ni3", &["you"]);
        entry.pinyin = None;

        let result = DictionaryIndex::build(vec![raw("我", "我", "wo3", &["I"]), entry]);
        assert!(matches!(
            result,
            Err(LoadError::MissingField { index: 1, field: "pinyin" })
        ));
    }

    #[test]
    fn json_source_without_definitions_is_rejected() {
        let json = r#"[{"simplified":"你","traditional":"你","pinyin":"ni3"}]"#;
        let result = DictionaryIndex::from_json(json);
        assert!(matches!(
            result,
            Err(LoadError::MissingField { field: "definitions", .. })
        ));
    }

    #[test]
    fn json_records_are_indexed_under_both_forms() {
        let json = r#"[
            {"simplified":"汉字","traditional":"漢字","pinyin":"han4 zi4","definitions":["Chinese character"]},
            {"simplified":"茶","traditional":"茶","pinyin":"cha2","definitions":["tea","tea plant"]}
        ]"#;
        let index = DictionaryIndex::from_json(json).unwrap();

        assert_eq!(index.entry_count(), 2);
        assert_eq!(index.headword_count(), 3);
        assert_eq!(index.lookup("漢字"), index.lookup("汉字"));
        assert_eq!(index.lookup("茶")[0].definitions, vec!["tea", "tea plant"]);
        assert_eq!(index.max_headword_length(), 2);
    }

    #[test]
    fn merge_appends_after_base() {
        let base = DictionaryIndex::build(vec![raw("好", "好", "hao3", &["good"])]).unwrap();
        let extra = DictionaryIndex::build(vec![
            raw("好", "好", "hao4", &["to like"]),
            raw("好好学习", "好好學習", "hao3 hao3 xue2 xi2", &["study hard"]),
        ])
        .unwrap();

        let merged = base.merge(extra);
        let entries = merged.lookup("好");
        assert_eq!(entries[0].pinyin, "hao3");
        assert_eq!(entries[1].pinyin, "hao4");
        assert_eq!(merged.max_headword_length(), 4);
        assert_eq!(merged.entry_count(), 3);
    }
}
