//! Rules suppressing layer emission for technical catalog nodes.
//!
//! Excluded nodes still appear in the content tree and the translation
//! table; only their layer configuration is withheld.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogNode;

/// Decides whether a node must not produce a layer configuration.
pub trait ExclusionPredicate {
    /// Whether `node` must not produce a layer configuration.
    fn is_excluded(&self, node: &CatalogNode) -> bool;
}

impl<F: Fn(&CatalogNode) -> bool> ExclusionPredicate for F {
    fn is_excluded(&self, node: &CatalogNode) -> bool {
        self(node)
    }
}

/// Name blocklist plus attribute predicates.
///
/// A node is excluded if its name is listed in [`Self::names`], or if it
/// carries any attribute listed in [`Self::attributes`] with a non-null value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionRules {
    /// Node names that never produce a layer
    pub names: BTreeSet<String>,
    /// Attributes whose presence suppresses the layer
    pub attributes: BTreeSet<String>,
}

impl Default for ExclusionRules {
    /// Excludes the winter mesh overlay and all time-enabled layers.
    fn default() -> Self {
        Self {
            names: BTreeSet::from(["wintermesh".to_string()]),
            attributes: BTreeSet::from(["time".to_string()]),
        }
    }
}

impl ExclusionRules {
    /// Rules that exclude nothing.
    #[must_use]
    pub fn none() -> Self {
        Self {
            names: BTreeSet::new(),
            attributes: BTreeSet::new(),
        }
    }
}

impl ExclusionPredicate for ExclusionRules {
    fn is_excluded(&self, node: &CatalogNode) -> bool {
        node.name().is_some_and(|name| self.names.contains(name))
            || self.attributes.iter().any(|attr| node.has_attribute(attr))
    }
}
