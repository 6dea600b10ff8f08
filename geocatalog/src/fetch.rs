//! Retrieval of the catalog and translation documents.
//!
//! Every location is either an `http(s)://` URL, a `file://` URL or a plain path.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use futures::future::try_join_all;
use geocatalog_core::CatalogError;
use geocatalog_core::catalog::CatalogDocument;
use geocatalog_core::i18n::{Locale, Translations};
use reqwest::{Client, Response};
use tokio::fs;
use tracing::{debug, info};
use url::Url;

use crate::config::file::LANG_PLACEHOLDER;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub type FetchResult<T> = Result<T, FetchError>;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Unable to create the HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Unable to fetch {1}: {0}")]
    Http(#[source] reqwest::Error, String),

    #[error("Unable to read {path}: {0}", path = .1.display())]
    Io(#[source] io::Error, PathBuf),

    #[error("Invalid URL {1}: {0}")]
    InvalidUrl(#[source] url::ParseError, String),

    #[error("{0} does not point to a local file")]
    NotAFilePath(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Where a document is read from.
#[derive(Debug, Clone, PartialEq)]
enum Location {
    Remote(Url),
    Local(PathBuf),
}

impl Location {
    fn parse(location: &str) -> FetchResult<Self> {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(location)
                .map_err(|e| FetchError::InvalidUrl(e, location.to_string()))?;
            Ok(Self::Remote(url))
        } else if lower.starts_with("file://") {
            let url = Url::parse(location)
                .map_err(|e| FetchError::InvalidUrl(e, location.to_string()))?;
            let path = url
                .to_file_path()
                .map_err(|()| FetchError::NotAFilePath(location.to_string()))?;
            Ok(Self::Local(path))
        } else {
            Ok(Self::Local(PathBuf::from(location)))
        }
    }
}

/// Substitutes the locale into a translation URL template.
#[must_use]
pub fn translations_url(template: &str, locale: Locale) -> String {
    template.replace(LANG_PLACEHOLDER, locale.as_str())
}

/// Reads catalog and translation documents from remote or local locations.
#[derive(Clone, Debug)]
pub struct Loader {
    client: Client,
}

impl Loader {
    pub fn new() -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// Returns the raw bytes stored at `location`.
    pub async fn fetch(&self, location: &str) -> FetchResult<Vec<u8>> {
        match Location::parse(location)? {
            Location::Remote(url) => {
                debug!("Fetching {url}");
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .and_then(Response::error_for_status)
                    .map_err(|e| FetchError::Http(e, location.to_string()))?;
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| FetchError::Http(e, location.to_string()))?;
                Ok(body.to_vec())
            }
            Location::Local(path) => {
                debug!("Reading {}", path.display());
                fs::read(&path).await.map_err(|e| FetchError::Io(e, path))
            }
        }
    }

    pub async fn catalog(&self, location: &str) -> FetchResult<CatalogDocument> {
        let data = self.fetch(location).await?;
        let doc = CatalogDocument::from_slice(&data)?;
        info!(
            "Loaded catalog from {location} with {} themes",
            doc.themes.len()
        );
        Ok(doc)
    }

    /// Fetches the translation document of every locale concurrently.
    ///
    /// Fails as soon as one of the documents cannot be read or parsed.
    pub async fn translations(
        &self,
        template: &str,
        locales: &[Locale],
    ) -> FetchResult<Translations> {
        let dictionaries = try_join_all(locales.iter().map(|&locale| async move {
            let location = translations_url(template, locale);
            let data = self.fetch(&location).await?;
            let dictionary = Translations::parse_document(locale, &data)?;
            debug!(
                "Loaded {} {locale} translations from {location}",
                dictionary.len()
            );
            Ok::<_, FetchError>((locale, dictionary))
        }))
        .await?;
        Ok(dictionaries.into_iter().collect())
    }

    /// Loads the catalog and all translations. Both complete before this returns.
    pub async fn load(
        &self,
        themes_url: &str,
        translations_template: &str,
        locales: &[Locale],
    ) -> FetchResult<(CatalogDocument, Translations)> {
        futures::try_join!(
            self.catalog(themes_url),
            self.translations(translations_template, locales)
        )
    }
}

#[cfg(test)]
mod tests {
    use std::fs as std_fs;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn fixtures() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std_fs::write(
            dir.path().join("themes.json"),
            r#"{"themes": [{"name": "main", "children": []}], "terrainUrl": "https://terrain"}"#,
        )
        .unwrap();
        std_fs::write(dir.path().join("fr.json"), r#"{"fr": {"roads": "Routes"}}"#).unwrap();
        std_fs::write(dir.path().join("de.json"), r#"{"roads": "Straßen", "n": 1}"#).unwrap();
        dir
    }

    #[rstest]
    #[case("https://example.com/themes?x=1", true)]
    #[case("HTTP://example.com/themes", true)]
    #[case("/srv/themes.json", false)]
    #[case("themes.json", false)]
    #[case("file:///srv/themes.json", false)]
    fn location_kind(#[case] location: &str, #[case] remote: bool) {
        let parsed = Location::parse(location).unwrap();
        assert_eq!(matches!(parsed, Location::Remote(_)), remote);
    }

    #[test]
    fn file_url_is_a_path() {
        assert_eq!(
            Location::parse("file:///srv/themes.json").unwrap(),
            Location::Local(PathBuf::from("/srv/themes.json"))
        );
    }

    #[test]
    fn bad_remote_url() {
        let err = Location::parse("https://").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_, _)));
    }

    #[test]
    fn lang_placeholder() {
        assert_eq!(
            translations_url("https://host/static/{lang}.json", Locale::Lb),
            "https://host/static/lb.json"
        );
    }

    #[tokio::test]
    async fn load_local_documents() {
        let dir = fixtures();
        let themes = dir.path().join("themes.json");
        let template = dir.path().join("{lang}.json");

        let loader = Loader::new().unwrap();
        let (doc, translations) = loader
            .load(
                themes.to_str().unwrap(),
                template.to_str().unwrap(),
                &[Locale::Fr, Locale::De],
            )
            .await
            .unwrap();

        assert_eq!(doc.themes.len(), 1);
        assert_eq!(doc.terrain_url(), Some("https://terrain"));
        assert_eq!(translations.title(Locale::Fr, "roads"), Some("Routes"));
        assert_eq!(translations.title(Locale::De, "roads"), Some("Straßen"));
        assert_eq!(translations.title(Locale::De, "n"), None);
        assert_eq!(translations.locales(), vec![Locale::De, Locale::Fr]);
    }

    #[tokio::test]
    async fn missing_locale_fails_the_load() {
        let dir = fixtures();
        let template = dir.path().join("{lang}.json");

        let loader = Loader::new().unwrap();
        let err = loader
            .translations(template.to_str().unwrap(), &[Locale::Fr, Locale::En])
            .await
            .unwrap_err();

        let FetchError::Io(_, path) = &err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(path, &dir.path().join("en.json"));
        assert!(err.to_string().starts_with(&format!(
            "Unable to read {}: ",
            dir.path().join("en.json").display()
        )));
    }

    #[tokio::test]
    async fn invalid_catalog() {
        let dir = fixtures();
        let path = dir.path().join("broken.json");
        std_fs::write(&path, "{\"themes\": 1}").unwrap();

        let loader = Loader::new().unwrap();
        let err = loader.catalog(path.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Catalog(CatalogError::InvalidCatalog(_))
        ));
    }
}
