//! The recursive walk turning a catalog tree into host configuration.
//!
//! The walk is depth-first and pre-order. Every visited node produces exactly
//! one content-tree entry and one translated title per locale. Nodes with a
//! kind additionally produce a [`LayerConfig`], unless the node is excluded or
//! a layer with the same id was already emitted during the same run.

use std::borrow::Cow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogDocument, CatalogNode, LayerKind, NodeId};
use crate::clipping::ClippingPolygon;
use crate::content_tree::{ContentTreeKind, ContentTreeNode, PathResolver, join_path, title_key};
use crate::exclusion::{ExclusionPredicate, ExclusionRules};
use crate::i18n::{Locale, TranslationTable, Translations};
use crate::layer::LayerConfig;
use crate::synth::{
    SynthContext, Synthesized, TERRAIN_LAYER_NAME, TERRAIN_LAYER_TITLE, synthesize, terrain_layer,
};

/// Content-tree path of the terrain entry.
pub const TERRAIN_TREE_PATH: &str = "terrain";

/// A theme to walk, optionally forcing a layer kind onto its whole subtree.
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSelection {
    /// Name of the theme in the catalog
    pub name: String,
    /// Kind every layer of the theme is synthesized as
    #[serde(default, alias = "forcedKind")]
    pub forced_kind: Option<LayerKind>,
}

impl ThemeSelection {
    /// Selects the theme `name` as published.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            forced_kind: None,
        }
    }

    /// Forces `kind` onto every layer of the theme.
    #[must_use]
    pub fn with_forced_kind(mut self, kind: LayerKind) -> Self {
        self.forced_kind = Some(kind);
        self
    }
}

/// Everything a mapping run produces.
///
/// Created fresh for every run and exclusively owned by it until handed to
/// the host.
#[derive(Clone, Debug, Default)]
pub struct Accumulators {
    /// Layer configs, in emission order
    pub layers: Vec<LayerConfig>,
    /// Content-tree entries, in pre-order
    pub content_tree: Vec<ContentTreeNode>,
    /// Clipping polygons of mesh layers
    pub clipping_polygons: Vec<ClippingPolygon>,
    /// Titles per locale
    pub i18n: TranslationTable,
    emitted: HashSet<NodeId>,
    paths: PathResolver,
    unnamed: usize,
}

impl Accumulators {
    /// Reserves `id`, returning `false` if a layer with it was already emitted.
    fn reserve(&mut self, id: &NodeId) -> bool {
        self.emitted.insert(id.clone())
    }

    /// A synthetic name for nodes published without one.
    fn fallback_name(&mut self, node: &CatalogNode) -> String {
        match &node.id {
            Some(id) => format!("node_{id}"),
            None => {
                self.unnamed += 1;
                format!("unnamed_{}", self.unnamed)
            }
        }
    }
}

/// Walks catalog trees and fills [`Accumulators`].
///
/// The engine only borrows its inputs; the same engine may run any number of
/// times, each run starting from empty accumulators.
#[derive(Debug)]
pub struct MappingEngine<'a, P = ExclusionRules> {
    ctx: &'a SynthContext,
    translations: &'a Translations,
    exclusion: &'a P,
    locales: Vec<Locale>,
}

impl<'a, P: ExclusionPredicate> MappingEngine<'a, P> {
    /// Creates an engine merging titles for each of `locales`.
    ///
    /// `translations` must be fully assembled before the first run.
    #[must_use]
    pub fn new(
        ctx: &'a SynthContext,
        translations: &'a Translations,
        exclusion: &'a P,
        locales: Vec<Locale>,
    ) -> Self {
        Self {
            ctx,
            translations,
            exclusion,
            locales,
        }
    }

    /// Maps the selected themes of a catalog document.
    ///
    /// Runs in this order: the terrain layer (if `include_terrain` is set and
    /// the document has a terrain URL), the background layers, then the
    /// children of every selected theme (every theme if `selection` is empty).
    ///
    /// Background layers come first so that a baselayer also listed in a theme
    /// keeps its baselayer settings.
    #[must_use]
    pub fn map_catalog(
        &self,
        doc: &CatalogDocument,
        selection: &[ThemeSelection],
        include_terrain: bool,
    ) -> Accumulators {
        let mut acc = Accumulators::default();

        if include_terrain {
            match doc.terrain_url() {
                Some(url) => self.map_terrain(url, &mut acc),
                None => debug!("Catalog has no terrain URL, skipping terrain layer"),
            }
        }

        if let Some(background) = doc.background_root() {
            self.map(&background, &mut acc, None, None);
        }

        if selection.is_empty() {
            for theme in &doc.themes {
                self.map_theme(theme, None, &mut acc);
            }
        } else {
            for sel in selection {
                match doc.theme(&sel.name) {
                    Some(theme) => self.map_theme(theme, sel.forced_kind.as_ref(), &mut acc),
                    None => warn!("Theme {} is not part of the catalog, skipping it", sel.name),
                }
            }
        }

        info!(
            "Mapped {} layers, {} content tree entries and {} clipping polygons",
            acc.layers.len(),
            acc.content_tree.len(),
            acc.clipping_polygons.len()
        );
        acc
    }

    /// Maps the children of a theme as content-tree roots.
    pub fn map_theme(
        &self,
        theme: &CatalogNode,
        forced: Option<&LayerKind>,
        acc: &mut Accumulators,
    ) {
        debug!(
            "Mapping theme {}",
            theme.name().unwrap_or("<unnamed>")
        );
        for child in theme.children() {
            self.map(child, acc, None, forced);
        }
    }

    /// Maps `node` and its whole subtree below `ancestor`.
    pub fn map(
        &self,
        node: &CatalogNode,
        acc: &mut Accumulators,
        ancestor: Option<&str>,
        forced: Option<&LayerKind>,
    ) {
        let kind = effective_kind(node, forced);
        let name = if let Some(name) = node.name() {
            if let Some(kind) = &kind {
                self.emit_layer(node, name, kind, acc);
            }
            Cow::Borrowed(name)
        } else {
            let fallback = acc.fallback_name(node);
            if kind.is_some() {
                warn!("Layer node without a name, listing it as {fallback} without a layer");
            } else {
                warn!("Group node without a name, listing it as {fallback}");
            }
            Cow::Owned(fallback)
        };

        let item_kind = if node.has_children() {
            ContentTreeKind::Node
        } else {
            ContentTreeKind::Leaf
        };
        let path = acc.paths.resolve(join_path(ancestor, &name));
        acc.content_tree
            .push(ContentTreeNode::new(path.clone(), item_kind, &name));

        self.merge_titles(&name, &name, acc);

        for child in node.children() {
            self.map(child, acc, Some(path.as_str()), forced);
        }
    }

    fn emit_layer(&self, node: &CatalogNode, name: &str, kind: &LayerKind, acc: &mut Accumulators) {
        let Some(id) = &node.id else {
            warn!("Layer {name} has no id, skipping its layer config");
            return;
        };
        if self.exclusion.is_excluded(node) {
            debug!("Layer {name} ({id}) is excluded");
            return;
        }
        if !acc.reserve(id) {
            debug!("Layer {id} was already emitted, skipping duplicate {name}");
            return;
        }
        let Synthesized {
            layer,
            clipping_polygons,
        } = synthesize(node, id, name, kind, self.ctx);
        acc.layers.push(layer);
        acc.clipping_polygons.extend(clipping_polygons);
    }

    fn map_terrain(&self, url: &str, acc: &mut Accumulators) {
        let layer = terrain_layer(url);
        if acc.reserve(&layer.id) {
            acc.layers.push(layer);
        }
        let path = acc.paths.resolve(TERRAIN_TREE_PATH.to_string());
        acc.content_tree.push(ContentTreeNode {
            path,
            kind: ContentTreeKind::Leaf,
            layer_ref: TERRAIN_LAYER_NAME.to_string(),
            title: title_key(TERRAIN_LAYER_NAME),
            visible: true,
        });
        self.merge_titles(TERRAIN_LAYER_NAME, TERRAIN_LAYER_TITLE, acc);
    }

    /// Merges the title of `name` into every locale, falling back to `fallback`.
    fn merge_titles(&self, name: &str, fallback: &str, acc: &mut Accumulators) {
        for &locale in &self.locales {
            acc.i18n.merge_once(locale, name, || {
                self.translations
                    .title(locale, name)
                    .unwrap_or(fallback)
                    .to_string()
            });
        }
    }
}

/// The kind a node is synthesized as.
///
/// A forced kind replaces the node's own kind, but never turns a pure
/// grouping node (no kind, with children) into a layer.
fn effective_kind(node: &CatalogNode, forced: Option<&LayerKind>) -> Option<LayerKind> {
    match forced {
        Some(forced) if node.kind.is_some() || !node.has_children() => Some(forced.clone()),
        _ => node.kind.clone(),
    }
}
