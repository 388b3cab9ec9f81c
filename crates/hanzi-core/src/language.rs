use hanzi_types::{SearchRequest, SearchResponse};

/// Text processing and lookup interface for language implementations
pub trait LanguageProcessor: Send + Sync {
    /// Language identifier (ISO 639-1 code)
    fn language_code(&self) -> &str;

    /// Turn collected page text into search text
    fn normalize(&self, text: &str) -> String;

    /// Answer a search request coming from a page
    fn search(&self, request: &SearchRequest) -> SearchResponse;
}
