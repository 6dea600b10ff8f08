use std::path::PathBuf;

use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;

use crate::config::Env;
use crate::config::args::CatalogArgs;
use crate::config::file::Config;

/// Defines the styles used for the CLI help output.
const HELP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Blue.on_default().bold())
    .usage(AnsiColor::Blue.on_default().bold())
    .literal(AnsiColor::White.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug, PartialEq, Default)]
#[command(
    about,
    version,
    after_help = "Use RUST_LOG environment variable to control logging level, e.g. RUST_LOG=debug or RUST_LOG=geocatalog=debug. Use GEOCATALOG_LOG_FORMAT to pick the log format (full, compact, bare, pretty or json).",
    styles = HELP_STYLES
)]
pub struct Args {
    #[command(flatten)]
    pub meta: MetaArgs,
    #[command(flatten)]
    pub catalog: CatalogArgs,
}

// None of these params will be transferred to the config
#[derive(Parser, Debug, Clone, PartialEq, Default)]
#[command(about, version)]
pub struct MetaArgs {
    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Save resulting config to a file or use "-" to print to stdout.
    #[arg(long)]
    pub save_config: Option<PathBuf>,
}

impl Args {
    pub fn merge_into_config<'a>(self, config: &mut Config, env: &impl Env<'a>) {
        self.catalog.merge_into_config(config, env);
    }
}

#[cfg(test)]
mod tests {
    use geocatalog_core::i18n::Locale;
    use geocatalog_core::synth::WmtsRendering;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::FauxEnv;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(args)
    }

    #[test]
    fn cli_no_args() {
        let args = parse(&["geocatalog"]);
        assert_eq!(args, Args::default());

        let mut config = Config::default();
        args.merge_into_config(&mut config, &FauxEnv::default());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn cli_meta_args() {
        let args = parse(&["geocatalog", "-c", "cfg.yaml", "--save-config", "-"]);
        assert_eq!(args.meta.config, Some(PathBuf::from("cfg.yaml")));
        assert_eq!(args.meta.save_config, Some(PathBuf::from("-")));
    }

    #[test]
    fn cli_overrides_file() {
        let args = parse(&[
            "geocatalog",
            "--themes-url",
            "https://cli.example/themes",
            "--locale",
            "de",
            "--locale",
            "EN",
            "--wmts-rendering",
            "wmts",
            "--no-terrain",
            "--theme",
            "main",
            "--output",
            "/tmp/out",
        ]);
        let mut config = Config {
            themes_url: Some("https://file.example/themes".to_string()),
            terrain: Some(true),
            ..Config::default()
        };
        args.merge_into_config(&mut config, &FauxEnv::default());

        assert_eq!(config.themes_url.as_deref(), Some("https://cli.example/themes"));
        assert_eq!(config.locales, Some(vec![Locale::De, Locale::En]));
        assert_eq!(config.locale, Some(Locale::De));
        assert_eq!(config.services.wmts_rendering, Some(WmtsRendering::Wmts));
        assert_eq!(config.terrain, Some(false));
        assert_eq!(config.themes.len(), 1);
        assert_eq!(config.themes[0].name, "main");
        assert_eq!(config.output.as_deref(), Some("/tmp/out"));
    }

    #[test]
    fn cli_bad_locale() {
        assert!(Args::try_parse_from(["geocatalog", "--locale", "it"]).is_err());
    }
}
