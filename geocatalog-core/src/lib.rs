#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

/// The catalog tree and the document it is published in
pub mod catalog;

/// Clipping polygons derived from mesh layers
pub mod clipping;

/// The content tree shown in the host's layer navigation
pub mod content_tree;

/// Mapping engine walking the catalog tree
pub mod engine;

/// Suppression rules for technical catalog nodes
pub mod exclusion;

/// Locales and translation tables
pub mod i18n;

/// Emitted layer configuration records
pub mod layer;

/// The configuration module handed to the host
pub mod module;

/// Per-kind layer synthesis
pub mod synth;

mod error;
pub use error::{CatalogError, CatalogResult};
