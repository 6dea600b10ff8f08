use std::collections::BTreeSet;

use geocatalog_core::catalog::LayerKind;
use geocatalog_core::engine::ThemeSelection;
use geocatalog_core::exclusion::ExclusionRules;
use serde::{Deserialize, Serialize};

use crate::config::file::{
    ConfigFileError, ConfigFileResult, ConfigurationLivecycleHooks, UnrecognizedKeys,
    UnrecognizedValues, copy_unrecognized_keys_from_config,
};

/// A theme of the catalog to publish.
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
    /// Layer kind forced onto every layer of the theme, e.g. `Data3D`
    pub forced_kind: Option<LayerKind>,
    #[serde(flatten, skip_serializing)]
    pub unrecognized: UnrecognizedValues,
}

impl ConfigurationLivecycleHooks for ThemeConfig {
    fn finalize(&mut self) -> ConfigFileResult<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ConfigFileError::UnnamedTheme);
        }
        if name.len() != self.name.len() {
            self.name = name.to_string();
        }
        Ok(())
    }

    fn get_unrecognized_keys(&self) -> UnrecognizedKeys {
        let mut keys = UnrecognizedKeys::new();
        copy_unrecognized_keys_from_config(&mut keys, "", &self.unrecognized);
        keys
    }
}

impl From<&ThemeConfig> for ThemeSelection {
    fn from(cfg: &ThemeConfig) -> Self {
        Self {
            name: cfg.name.clone(),
            forced_kind: cfg.forced_kind.clone(),
        }
    }
}

/// Catalog nodes that must never produce a layer.
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExclusionsConfig {
    /// Node names to exclude, defaults to `wintermesh`
    pub names: Option<BTreeSet<String>>,
    /// Excludes nodes carrying any of these attributes, defaults to `time`
    pub attributes: Option<BTreeSet<String>>,
    #[serde(flatten, skip_serializing)]
    pub unrecognized: UnrecognizedValues,
}

impl ExclusionsConfig {
    #[must_use]
    pub fn to_rules(&self) -> ExclusionRules {
        let defaults = ExclusionRules::default();
        ExclusionRules {
            names: self.names.clone().unwrap_or(defaults.names),
            attributes: self.attributes.clone().unwrap_or(defaults.attributes),
        }
    }
}

impl ConfigurationLivecycleHooks for ExclusionsConfig {
    fn finalize(&mut self) -> ConfigFileResult<()> {
        let defaults = ExclusionRules::default();
        self.names.get_or_insert(defaults.names);
        self.attributes.get_or_insert(defaults.attributes);
        Ok(())
    }

    fn get_unrecognized_keys(&self) -> UnrecognizedKeys {
        let mut keys = UnrecognizedKeys::new();
        copy_unrecognized_keys_from_config(&mut keys, "", &self.unrecognized);
        keys
    }
}
