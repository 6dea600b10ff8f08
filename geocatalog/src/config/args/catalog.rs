use std::mem;

use clap::Parser;
use geocatalog_core::i18n::Locale;
use geocatalog_core::synth::WmtsRendering;
use tracing::{info, warn};

use crate::config::Env;
use crate::config::file::{Config, ThemeConfig};

/// Environment variable providing the catalog location when neither the CLI nor the config file do.
pub const THEMES_URL_ENV: &str = "GEOCATALOG_THEMES_URL";

#[derive(Parser, Debug, Clone, PartialEq, Default)]
#[command(about, version)]
pub struct CatalogArgs {
    /// URL or local path of the theme catalog.
    #[arg(long)]
    pub themes_url: Option<String>,
    /// URL or local path of the translation documents, `{lang}` is replaced by the locale.
    #[arg(long)]
    pub translations_url: Option<String>,
    /// Locale to generate titles for. Can be specified multiple times, the first one is also used for legend links.
    #[arg(short, long = "locale", value_name = "LOCALE")]
    pub locales: Vec<Locale>,
    /// Theme to publish. Can be specified multiple times. By default, all themes are published.
    #[arg(short, long = "theme", value_name = "NAME")]
    pub themes: Vec<String>,
    /// Directory to write the module to, or "-" to print it to stdout.
    #[arg(short, long)]
    pub output: Option<String>,
    /// How WMTS layers are rendered: `wms` (with feature info) or `wmts`.
    #[arg(long)]
    pub wmts_rendering: Option<WmtsRendering>,
    /// Do not emit the terrain layer.
    #[arg(long)]
    pub no_terrain: bool,
}

impl CatalogArgs {
    /// Apply CLI parameters from `self` to the configuration loaded from the config file
    pub fn merge_into_config<'a>(self, config: &mut Config, env: &impl Env<'a>) {
        if let Some(url) = self.themes_url {
            config.themes_url = Some(url);
        } else if config.themes_url.is_none()
            && let Some(url) = env.get_env_str(THEMES_URL_ENV)
        {
            info!("Using theme catalog {url} from {THEMES_URL_ENV}");
            config.themes_url = Some(url);
        } else if config.themes_url.is_some() && env.has_unused_var(THEMES_URL_ENV) {
            warn!(
                "Environment variable {THEMES_URL_ENV} is set, but ignored because the config file sets themes_url"
            );
        }

        if self.translations_url.is_some() {
            config.translations_url = self.translations_url;
        }
        if let Some(first) = self.locales.first() {
            config.locale = Some(*first);
            config.locales = Some(self.locales);
        }
        if !self.themes.is_empty() {
            // a theme the config file configures keeps its settings
            let mut from_file = mem::take(&mut config.themes);
            config.themes = self
                .themes
                .into_iter()
                .map(|name| match from_file.iter().position(|t| t.name == name) {
                    Some(idx) => from_file.swap_remove(idx),
                    None => ThemeConfig {
                        name,
                        ..ThemeConfig::default()
                    },
                })
                .collect();
        }
        if self.output.is_some() {
            config.output = self.output;
        }
        if self.wmts_rendering.is_some() {
            config.services.wmts_rendering = self.wmts_rendering;
        }
        if self.no_terrain {
            config.terrain = Some(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use geocatalog_core::catalog::LayerKind;

    use super::*;
    use crate::config::FauxEnv;

    fn env_with_themes_url() -> FauxEnv {
        FauxEnv(
            [(THEMES_URL_ENV, OsString::from("https://env.example/themes"))]
                .into_iter()
                .collect(),
        )
    }

    #[test]
    fn themes_url_from_env() {
        let mut config = Config::default();
        CatalogArgs::default().merge_into_config(&mut config, &env_with_themes_url());
        assert_eq!(config.themes_url.as_deref(), Some("https://env.example/themes"));
    }

    #[test]
    #[tracing_test::traced_test]
    fn config_file_wins_over_env() {
        let mut config = Config {
            themes_url: Some("https://file.example/themes".to_string()),
            ..Config::default()
        };
        CatalogArgs::default().merge_into_config(&mut config, &env_with_themes_url());
        assert_eq!(config.themes_url.as_deref(), Some("https://file.example/themes"));
        assert!(logs_contain("is set, but ignored"));
    }

    #[test]
    fn cli_wins_over_everything() {
        let mut config = Config {
            themes_url: Some("https://file.example/themes".to_string()),
            ..Config::default()
        };
        let args = CatalogArgs {
            themes_url: Some("/data/themes.json".to_string()),
            ..CatalogArgs::default()
        };
        args.merge_into_config(&mut config, &env_with_themes_url());
        assert_eq!(config.themes_url.as_deref(), Some("/data/themes.json"));
    }

    #[test]
    fn cli_themes_keep_file_settings() {
        let mut config = Config {
            themes: vec![
                ThemeConfig {
                    name: "main".to_string(),
                    forced_kind: Some(LayerKind::Data3D),
                    ..ThemeConfig::default()
                },
                ThemeConfig {
                    name: "hydrology".to_string(),
                    ..ThemeConfig::default()
                },
            ],
            ..Config::default()
        };
        let args = CatalogArgs {
            themes: vec!["main".to_string(), "cadastre".to_string()],
            ..CatalogArgs::default()
        };
        args.merge_into_config(&mut config, &FauxEnv::default());

        let names: Vec<_> = config.themes.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["main", "cadastre"]);
        assert_eq!(config.themes[0].forced_kind, Some(LayerKind::Data3D));
        assert_eq!(config.themes[1].forced_kind, None);
    }
}
