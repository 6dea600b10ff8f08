use std::{env, process};

use clap::Parser;
use geocatalog::GeoCatalogResult;
use geocatalog::config::OsEnv;
use geocatalog::config::args::Args;
use geocatalog::config::file::{Config, read_config};
use geocatalog::fetch::Loader;
use geocatalog::host::host_for;
use geocatalog::logging::{LOG_FORMAT_ENV, ensure_core_log_level_matches, init_tracing};
use geocatalog::{build_module, publish};
use log::{Level, log_enabled};
use tracing::{error, info};

const VERSION: &str = env!("CARGO_PKG_VERSION");

async fn start(args: Args) -> GeoCatalogResult<()> {
    info!("Starting geocatalog v{VERSION}");

    let env = OsEnv::default();
    let save_config = args.meta.save_config.clone();
    let mut config = if let Some(ref cfg_filename) = args.meta.config {
        info!("Using {}", cfg_filename.display());
        read_config(cfg_filename, &env)?
    } else {
        info!("Config file is not specified, using the public geoportal catalog");
        Config::default()
    };

    args.merge_into_config(&mut config, &env);
    config.finalize()?;

    if let Some(file_name) = save_config {
        config.save_to_file(file_name.as_path())?;
    } else {
        info!("Use --save-config to save or print geocatalog configuration.");
    }

    let loader = Loader::new()?;
    let module = build_module(&config, &loader).await?;
    let host = host_for(config.output());
    publish(&module, host.as_ref(), config.replaces_module.as_deref()).await?;

    info!("Module {} is ready", module.id);
    Ok(())
}

#[tokio::main]
async fn main() {
    let filter = ensure_core_log_level_matches(env::var("RUST_LOG").ok(), "geocatalog=");
    init_tracing(&filter, env::var(LOG_FORMAT_ENV).ok());

    let args = Args::parse();
    if let Err(e) = start(args).await {
        // Ensure the message is printed, even if the logging is disabled
        if log_enabled!(Level::Error) {
            error!("{e}");
        } else {
            eprintln!("{e}");
        }
        process::exit(1);
    }
}
