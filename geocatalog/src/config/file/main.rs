use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use geocatalog_core::engine::ThemeSelection;
use geocatalog_core::exclusion::ExclusionRules;
use geocatalog_core::i18n::Locale;
use geocatalog_core::module::DEFAULT_MODULE_ID;
use geocatalog_core::synth::SynthContext;
use serde::{Deserialize, Serialize};
use subst::{VariableMap, yaml};
use tracing::{info, warn};

use crate::config::file::{
    ConfigFileError, ConfigFileResult, ConfigurationLivecycleHooks, ExclusionsConfig,
    ServicesConfig, ThemeConfig, UnrecognizedKeys, UnrecognizedValues,
    copy_unrecognized_keys_from_config,
};

pub const DEFAULT_THEMES_URL: &str = "https://migration.geoportail.lu/themes?limit=30&partitionlimit=5&interface=main&cache_version=0&background=background";
pub const DEFAULT_TRANSLATIONS_URL: &str = "https://map.geoportail.lu/static/0/{lang}.json";
/// Placeholder of the locale in [`Config::translations_url`].
pub const LANG_PLACEHOLDER: &str = "{lang}";
/// Output target printing the module to stdout.
pub const STDOUT_OUTPUT: &str = "-";

#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// URL or local path of the theme catalog
    pub themes_url: Option<String>,

    /// URL or local path of the translation documents
    ///
    /// `{lang}` is replaced by each locale, e.g. `https://map.geoportail.lu/static/0/{lang}.json`.
    pub translations_url: Option<String>,

    /// Locales to generate titles for, all four by default
    pub locales: Option<Vec<Locale>>,

    /// Language of legend links, the first of `locales` by default
    pub locale: Option<Locale>,

    /// Id of the generated module
    pub module_id: Option<String>,

    /// Id of a module the generated one replaces, removed from the host once the new one is added
    pub replaces_module: Option<String>,

    #[serde(flatten)]
    pub services: ServicesConfig,

    /// Emit the terrain layer when the catalog provides one
    pub terrain: Option<bool>,

    /// Themes to publish, in order. All themes are published if empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub themes: Vec<ThemeConfig>,

    pub exclusions: Option<ExclusionsConfig>,

    /// Directory the module is written to, or `-` to print it
    pub output: Option<String>,

    #[serde(flatten, skip_serializing)]
    pub unrecognized: UnrecognizedValues,
}

impl Config {
    /// Apply defaults to the config, and validate it
    pub fn finalize(&mut self) -> ConfigFileResult<UnrecognizedKeys> {
        let mut res = UnrecognizedKeys::new();
        copy_unrecognized_keys_from_config(&mut res, "", &self.unrecognized);

        for theme in &mut self.themes {
            theme.finalize()?;
            res.extend(theme.get_unrecognized_keys_with_prefix("themes[]."));
        }
        let exclusions = self.exclusions.get_or_insert_with(ExclusionsConfig::default);
        exclusions.finalize()?;
        res.extend(exclusions.get_unrecognized_keys_with_prefix("exclusions."));

        for key in &res {
            warn!(
                "Ignoring unrecognized configuration key '{key}'. Please check your configuration file for typos."
            );
        }

        self.themes_url
            .get_or_insert_with(|| DEFAULT_THEMES_URL.to_string());
        if self.themes_url.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(ConfigFileError::NoThemesUrl);
        }

        let translations_url = self
            .translations_url
            .get_or_insert_with(|| DEFAULT_TRANSLATIONS_URL.to_string());
        if !translations_url.contains(LANG_PLACEHOLDER) {
            return Err(ConfigFileError::TranslationsUrlWithoutLang(
                translations_url.clone(),
            ));
        }

        let default_locale = match &self.locales {
            Some(locales) => locales.first().copied().unwrap_or_default(),
            None => Locale::default(),
        };
        let locales = self.locales.get_or_insert_with(|| Locale::ALL.to_vec());
        let mut seen = Vec::with_capacity(locales.len());
        locales.retain(|l| {
            let is_new = !seen.contains(l);
            seen.push(*l);
            is_new
        });
        if locales.is_empty() {
            return Err(ConfigFileError::NoLocales);
        }
        self.locale.get_or_insert(default_locale);

        let module_id = self
            .module_id
            .get_or_insert_with(|| DEFAULT_MODULE_ID.to_string());
        if module_id.trim().is_empty() {
            return Err(ConfigFileError::EmptyModuleId);
        }
        if self.replaces_module.as_deref() == Some(module_id.as_str()) {
            warn!("Module {module_id} replaces itself, it will not be removed after adding");
        }

        self.services.finalize();
        self.terrain.get_or_insert(true);
        self.output.get_or_insert_with(|| STDOUT_OUTPUT.to_string());

        Ok(res)
    }

    #[must_use]
    pub fn themes_url(&self) -> &str {
        self.themes_url.as_deref().unwrap_or(DEFAULT_THEMES_URL)
    }

    #[must_use]
    pub fn translations_url(&self) -> &str {
        self.translations_url
            .as_deref()
            .unwrap_or(DEFAULT_TRANSLATIONS_URL)
    }

    #[must_use]
    pub fn locales(&self) -> Vec<Locale> {
        self.locales
            .clone()
            .unwrap_or_else(|| Locale::ALL.to_vec())
    }

    #[must_use]
    pub fn module_id(&self) -> &str {
        self.module_id.as_deref().unwrap_or(DEFAULT_MODULE_ID)
    }

    #[must_use]
    pub fn output(&self) -> &str {
        self.output.as_deref().unwrap_or(STDOUT_OUTPUT)
    }

    #[must_use]
    pub fn include_terrain(&self) -> bool {
        self.terrain.unwrap_or(true)
    }

    #[must_use]
    pub fn synth_context(&self) -> SynthContext {
        self.services
            .synth_context(self.locale.unwrap_or_default())
    }

    #[must_use]
    pub fn exclusion_rules(&self) -> ExclusionRules {
        self.exclusions
            .as_ref()
            .map_or_else(ExclusionRules::default, ExclusionsConfig::to_rules)
    }

    #[must_use]
    pub fn theme_selection(&self) -> Vec<ThemeSelection> {
        self.themes.iter().map(ThemeSelection::from).collect()
    }

    pub fn save_to_file(&self, file_name: &Path) -> ConfigFileResult<()> {
        let yaml = serde_yaml::to_string(&self).map_err(ConfigFileError::ConfigSerializeError)?;
        if file_name.as_os_str() == OsStr::new("-") {
            info!("Current configuration:");
            println!("\n\n{yaml}\n");
            Ok(())
        } else {
            info!(
                "Saving config to {}, use --config to load it",
                file_name.display()
            );
            File::create(file_name)
                .map_err(|e| ConfigFileError::ConfigWriteError(e, file_name.to_path_buf()))?
                .write_all(yaml.as_bytes())
                .map_err(|e| ConfigFileError::ConfigWriteError(e, file_name.to_path_buf()))?;
            Ok(())
        }
    }
}

/// Read config from a file
pub fn read_config<'a, M>(file_name: &Path, env: &'a M) -> ConfigFileResult<Config>
where
    M: VariableMap<'a>,
    M::Value: AsRef<str>,
{
    let mut file =
        File::open(file_name).map_err(|e| ConfigFileError::ConfigLoadError(e, file_name.into()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| ConfigFileError::ConfigLoadError(e, file_name.into()))?;
    parse_config(&contents, env, file_name)
}

pub fn parse_config<'a, M>(contents: &str, env: &'a M, file_name: &Path) -> ConfigFileResult<Config>
where
    M: VariableMap<'a>,
    M::Value: AsRef<str>,
{
    yaml::from_str(contents, env)
        .map_err(|e| ConfigFileError::ConfigParseError(e, file_name.into()))
}
