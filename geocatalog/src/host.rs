//! Registration of configuration modules with the map host.

use std::fmt::Debug;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use geocatalog_core::module::ConfigModule;
use tokio::fs;
use tracing::{debug, info};

use crate::config::file::STDOUT_OUTPUT;

pub type HostResult<T> = Result<T, HostError>;

#[derive(thiserror::Error, Debug)]
pub enum HostError {
    #[error("Unable to serialize module {1}: {0}")]
    Serialize(#[source] serde_json::Error, String),

    #[error("Unable to write {path}: {0}", path = .1.display())]
    Write(#[source] io::Error, PathBuf),

    #[error("Unable to remove {path}: {0}", path = .1.display())]
    Remove(#[source] io::Error, PathBuf),

    #[error("Module {0} is not registered")]
    UnknownModule(String),

    #[error("Module id '{0}' cannot be used as a file name")]
    InvalidModuleId(String),
}

/// A map host accepting configuration modules.
#[async_trait]
pub trait ModuleHost: Send + Sync + Debug {
    async fn add_module(&self, module: &ConfigModule) -> HostResult<()>;

    async fn remove_module(&self, id: &str) -> HostResult<()>;
}

/// Stores every module as `<id>.json` in a directory the host serves its modules from.
#[derive(Clone, Debug)]
pub struct DirectoryHost {
    dir: PathBuf,
}

impl DirectoryHost {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the module file, rejecting ids that would escape the directory.
    pub fn module_path(&self, id: &str) -> HostResult<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            return Err(HostError::InvalidModuleId(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }
}

#[async_trait]
impl ModuleHost for DirectoryHost {
    async fn add_module(&self, module: &ConfigModule) -> HostResult<()> {
        let path = self.module_path(&module.id)?;
        let data = serde_json::to_vec_pretty(module)
            .map_err(|e| HostError::Serialize(e, module.id.clone()))?;
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| HostError::Write(e, self.dir.clone()))?;
        fs::write(&path, data)
            .await
            .map_err(|e| HostError::Write(e, path.clone()))?;
        info!(
            "Registered module {} with {} layers at {}",
            module.id,
            module.layers.len(),
            path.display()
        );
        Ok(())
    }

    async fn remove_module(&self, id: &str) -> HostResult<()> {
        let path = self.module_path(id)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Removed module {id} from {}", self.dir.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(HostError::UnknownModule(id.to_string()))
            }
            Err(e) => Err(HostError::Remove(e, path)),
        }
    }
}

/// Prints modules to stdout. Nothing is retained, so removal is a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutHost;

#[async_trait]
impl ModuleHost for StdoutHost {
    async fn add_module(&self, module: &ConfigModule) -> HostResult<()> {
        let json = serde_json::to_string_pretty(module)
            .map_err(|e| HostError::Serialize(e, module.id.clone()))?;
        println!("{json}");
        Ok(())
    }

    async fn remove_module(&self, id: &str) -> HostResult<()> {
        debug!("Module {id} was printed, there is nothing to remove");
        Ok(())
    }
}

/// Selects the host for an `output` setting: `-` prints, anything else is a directory.
#[must_use]
pub fn host_for(output: &str) -> Box<dyn ModuleHost> {
    if output == STDOUT_OUTPUT {
        Box::new(StdoutHost)
    } else {
        Box::new(DirectoryHost::new(output))
    }
}
