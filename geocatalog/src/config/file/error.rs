use std::io;
use std::path::PathBuf;

use subst::yaml;

pub type ConfigFileResult<T> = Result<T, ConfigFileError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigFileError {
    #[error("Unable to load config file {path}: {0}", path = .1.display())]
    ConfigLoadError(#[source] io::Error, PathBuf),

    #[error("Unable to parse config file {path}: {0}", path = .1.display())]
    ConfigParseError(#[source] yaml::Error, PathBuf),

    #[error("Unable to serialize configuration: {0}")]
    ConfigSerializeError(#[source] serde_yaml::Error),

    #[error("Unable to write config file {path}: {0}", path = .1.display())]
    ConfigWriteError(#[source] io::Error, PathBuf),

    #[error("No theme catalog configured. Set themes_url in the config file or use --themes-url.")]
    NoThemesUrl,

    #[error("The translations URL {0} must contain a {{lang}} placeholder")]
    TranslationsUrlWithoutLang(String),

    #[error("At least one locale must be configured")]
    NoLocales,

    #[error("The module id must not be empty")]
    EmptyModuleId,

    #[error("Theme selection entries must have a name")]
    UnnamedTheme,
}
