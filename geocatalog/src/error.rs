use crate::config::file::ConfigFileError;
use crate::fetch::FetchError;
use crate::host::HostError;

/// A convenience [`Result`] for the geocatalog crate.
pub type GeoCatalogResult<T> = Result<T, GeoCatalogError>;

/// Failures surfaced to the caller of a catalog run.
///
/// Problems inside the catalog itself are recovered while mapping and never end up here.
#[derive(thiserror::Error, Debug)]
pub enum GeoCatalogError {
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(#[from] FetchError),

    #[error("Host rejected the configuration: {0}")]
    HostRejected(#[from] HostError),

    #[error(transparent)]
    ConfigFileError(#[from] ConfigFileError),
}
