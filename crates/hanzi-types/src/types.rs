use serde::{Deserialize, Serialize};

/// One sense of a headword as it appears in the dictionary source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub simplified: String,
    pub traditional: String,
    pub pinyin: String,
    pub definitions: Vec<String>,
}

/// Messages sent from a page context to the background context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExtensionMessage {
    Enable,
    Disable,
    Search(SearchRequest),
}

/// Messages the background context broadcasts or replies with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PageMessage {
    Enable,
    Disable,
    Search(SearchResponse),
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Collected text with zero-width non-joiners removed
    pub text: String,
    /// Collected text exactly as it sits in the document
    pub original_text: String,
    pub sel_start_offset: usize,
}

/// Reply to a [`SearchRequest`]. An empty `data` means no match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<DictionaryEntry>,
    #[serde(default)]
    pub match_len: usize,
    pub original_text: String,
    pub sel_start_offset: usize,
}

impl SearchResponse {
    pub fn no_match(request: &SearchRequest) -> Self {
        Self {
            data: Vec::new(),
            match_len: 0,
            original_text: request.original_text.clone(),
            sel_start_offset: request.sel_start_offset,
        }
    }

    pub fn is_match(&self) -> bool {
        !self.data.is_empty() && self.match_len > 0
    }
}

/// Toolbar icon state mirrored from the enable/disable toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionIcon {
    On,
    #[default]
    Off,
}
