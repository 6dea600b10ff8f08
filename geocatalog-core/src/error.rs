/// Errors raised while reading catalog and translation documents.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    /// The catalog document is not valid JSON or does not have the expected shape.
    #[error("Unable to parse catalog document: {0}")]
    InvalidCatalog(#[source] serde_json::Error),

    /// A translation document is not valid JSON.
    #[error("Unable to parse {0} translations: {1}")]
    InvalidTranslations(String, #[source] serde_json::Error),

    /// A translation document parsed, but is not a JSON object.
    #[error("Translations for {0} must be a JSON object of name to title")]
    TranslationsNotAnObject(String),

    /// The `exclusion` metadata of a node is not valid JSON.
    #[error("Node {0} has an exclusion value that is not valid JSON: {1}")]
    InvalidExclusion(String, #[source] serde_json::Error),

    /// The `exclusion` metadata of a node is valid JSON, but not a list of group tags.
    #[error("Node {0} has an exclusion value that is not a list of group tags: {1}")]
    ExclusionNotAList(String, String),
}

/// A convenience [`Result`] for `geocatalog-core`.
pub type CatalogResult<T> = Result<T, CatalogError>;
