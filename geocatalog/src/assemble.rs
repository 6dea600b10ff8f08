use geocatalog_core::engine::MappingEngine;
use geocatalog_core::module::ConfigModule;
use tracing::{info, warn};

use crate::GeoCatalogResult;
use crate::config::file::Config;
use crate::fetch::Loader;
use crate::host::{HostError, ModuleHost};

/// Fetches the catalog and its translations, then maps them into a host module.
///
/// `config` must be finalized.
pub async fn build_module(config: &Config, loader: &Loader) -> GeoCatalogResult<ConfigModule> {
    let locales = config.locales();
    let (doc, translations) = loader
        .load(config.themes_url(), config.translations_url(), &locales)
        .await?;

    let ctx = config.synth_context();
    let rules = config.exclusion_rules();
    let engine = MappingEngine::new(&ctx, &translations, &rules, locales);
    let module = engine
        .map_catalog(&doc, &config.theme_selection(), config.include_terrain())
        .into_module(config.module_id());
    info!("Built module {} from {}", module.id, config.themes_url());
    Ok(module)
}

/// Adds `module` to the host, then removes the module it replaces.
///
/// A replaced module the host does not know about is not an error.
pub async fn publish(
    module: &ConfigModule,
    host: &dyn ModuleHost,
    replaces: Option<&str>,
) -> GeoCatalogResult<()> {
    host.add_module(module).await?;
    let Some(old) = replaces.filter(|old| *old != module.id) else {
        return Ok(());
    };
    match host.remove_module(old).await {
        Err(HostError::UnknownModule(id)) => {
            warn!("Module {id} was not registered, nothing was replaced");
            Ok(())
        }
        res => Ok(res?),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use geocatalog_core::engine::Accumulators;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::GeoCatalogError;
    use crate::host::HostResult;

    #[derive(Debug, Default)]
    struct RecordingHost {
        calls: Mutex<Vec<String>>,
        known: Vec<&'static str>,
        reject: bool,
    }

    impl RecordingHost {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModuleHost for RecordingHost {
        async fn add_module(&self, module: &ConfigModule) -> HostResult<()> {
            if self.reject {
                return Err(HostError::InvalidModuleId(module.id.clone()));
            }
            self.calls.lock().unwrap().push(format!("add {}", module.id));
            Ok(())
        }

        async fn remove_module(&self, id: &str) -> HostResult<()> {
            if !self.known.iter().any(|known| *known == id) {
                return Err(HostError::UnknownModule(id.to_string()));
            }
            self.calls.lock().unwrap().push(format!("remove {id}"));
            Ok(())
        }
    }

    #[tokio::test]
    async fn adds_before_removing() {
        let host = RecordingHost {
            known: vec!["catalogConfig"],
            ..RecordingHost::default()
        };
        let module = Accumulators::default().into_module("catalogConfigWithLayers");
        publish(&module, &host, Some("catalogConfig")).await.unwrap();
        assert_eq!(
            host.calls(),
            vec!["add catalogConfigWithLayers", "remove catalogConfig"]
        );
    }

    #[tokio::test]
    async fn never_removes_itself() {
        let host = RecordingHost::default();
        let module = Accumulators::default().into_module("lux");
        publish(&module, &host, Some("lux")).await.unwrap();
        assert_eq!(host.calls(), vec!["add lux"]);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn unknown_replaced_module() {
        let host = RecordingHost::default();
        let module = Accumulators::default().into_module("lux");
        publish(&module, &host, Some("static")).await.unwrap();
        assert_eq!(host.calls(), vec!["add lux"]);
        assert!(logs_contain("Module static was not registered"));
    }

    #[tokio::test]
    async fn rejected_module() {
        let host = RecordingHost {
            reject: true,
            ..RecordingHost::default()
        };
        let module = Accumulators::default().into_module("lux");
        let err = publish(&module, &host, Some("static")).await.unwrap_err();
        assert!(matches!(err, GeoCatalogError::HostRejected(_)));
        assert!(host.calls().is_empty());
    }
}
