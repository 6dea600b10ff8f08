//! Locales, the input translation dictionaries, and the per-invocation title accumulator.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::ser::SerializeMap as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::{CatalogError, CatalogResult};

/// The locales the geoportal publishes translations for.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// German
    De,
    /// English
    En,
    /// French
    #[default]
    Fr,
    /// Luxembourgish
    Lb,
}

impl Locale {
    /// Every supported locale, in code order.
    pub const ALL: [Self; 4] = [Self::De, Self::En, Self::Fr, Self::Lb];

    /// The two-letter code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::De => "de",
            Self::En => "en",
            Self::Fr => "fr",
            Self::Lb => "lb",
        }
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "de" => Ok(Self::De),
            "en" => Ok(Self::En),
            "fr" => Ok(Self::Fr),
            "lb" | "lu" => Ok(Self::Lb),
            _ => Err(format!(
                "Unsupported locale '{s}'. Valid options: de, en, fr or lb"
            )),
        }
    }
}

/// Name to title dictionary of a single locale.
pub type Dictionary = HashMap<String, String>;

/// The input translation table: one [`Dictionary`] per locale.
///
/// Must be fully assembled before the mapping engine is invoked.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Translations(HashMap<Locale, Dictionary>);

impl Translations {
    /// Looks up the title of `name` in `locale`.
    #[must_use]
    pub fn title(&self, locale: Locale, name: &str) -> Option<&str> {
        self.0.get(&locale)?.get(name).map(String::as_str)
    }

    /// Locales with a dictionary, sorted.
    #[must_use]
    pub fn locales(&self) -> Vec<Locale> {
        let mut locales: Vec<_> = self.0.keys().copied().collect();
        locales.sort_unstable();
        locales
    }

    /// Parses a translation document of one locale.
    ///
    /// The geoportal wraps the dictionary in its locale key (`{"fr": {...}}`);
    /// flat documents are accepted as well. Non-string values are skipped.
    pub fn parse_document(locale: Locale, data: &[u8]) -> CatalogResult<Dictionary> {
        let value: Value = serde_json::from_slice(data)
            .map_err(|e| CatalogError::InvalidTranslations(locale.to_string(), e))?;
        let Value::Object(mut map) = value else {
            return Err(CatalogError::TranslationsNotAnObject(locale.to_string()));
        };
        if map.len() == 1
            && map.get(locale.as_str()).is_some_and(Value::is_object)
            && let Some(Value::Object(inner)) = map.remove(locale.as_str())
        {
            map = inner;
        }
        Ok(map
            .into_iter()
            .filter_map(|(k, v)| match v {
                Value::String(v) => Some((k, v)),
                _ => None,
            })
            .collect())
    }
}

impl FromIterator<(Locale, Dictionary)> for Translations {
    fn from_iter<T: IntoIterator<Item = (Locale, Dictionary)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Localized titles accumulated while walking a catalog.
///
/// Entries follow a first-wins policy: once a `(locale, name)` pair holds a
/// title, later merges for the same pair are ignored.
///
/// Serializes into the host's bundle layout, `{"fr": {"layers": {"<name>": {"title": "..."}}}}`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TranslationTable {
    entries: BTreeMap<Locale, BTreeMap<String, String>>,
}

impl TranslationTable {
    /// Stores the title produced by `value` unless `name` already has one in `locale`.
    ///
    /// Returns `true` if the entry was inserted.
    pub fn merge_once(
        &mut self,
        locale: Locale,
        name: &str,
        value: impl FnOnce() -> String,
    ) -> bool {
        let titles = self.entries.entry(locale).or_default();
        if titles.contains_key(name) {
            false
        } else {
            titles.insert(name.to_string(), value());
            true
        }
    }

    /// The title stored for `name` in `locale`.
    #[must_use]
    pub fn title(&self, locale: Locale, name: &str) -> Option<&str> {
        self.entries.get(&locale)?.get(name).map(String::as_str)
    }

    /// Number of titles stored for `locale`.
    #[must_use]
    pub fn len(&self, locale: Locale) -> usize {
        self.entries.get(&locale).map_or(0, BTreeMap::len)
    }

    /// Whether no title was stored in any locale.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(BTreeMap::is_empty)
    }
}

#[derive(Serialize)]
struct LocaleBundle<'a> {
    layers: LayerTitles<'a>,
}

struct LayerTitles<'a>(&'a BTreeMap<String, String>);

#[derive(Serialize)]
struct Title<'a> {
    title: &'a str,
}

impl Serialize for LayerTitles<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, title) in self.0 {
            map.serialize_entry(name, &Title { title })?;
        }
        map.end()
    }
}

impl Serialize for TranslationTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (locale, titles) in &self.entries {
            map.serialize_entry(locale.as_str(), &LocaleBundle {
                layers: LayerTitles(titles),
            })?;
        }
        map.end()
    }
}
