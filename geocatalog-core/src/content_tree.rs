use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

/// Whether a content-tree entry has children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ContentTreeKind {
    /// Entry with children
    #[serde(rename = "NodeContentTreeItem")]
    Node,
    /// Entry without children
    #[serde(rename = "LayerContentTreeItem")]
    Leaf,
}

/// One entry of the host's layer navigation tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContentTreeNode {
    /// Dot-joined chain of ancestor names, unique in one output tree
    #[serde(rename = "name")]
    pub path: String,
    /// Node or leaf
    #[serde(rename = "type")]
    pub kind: ContentTreeKind,
    /// Name of the layer this entry highlights, set for nodes as well
    #[serde(rename = "layerName")]
    pub layer_ref: String,
    /// Translation key of the title, never a literal
    pub title: String,
    /// Whether the entry is listed
    pub visible: bool,
}

impl ContentTreeNode {
    /// A visible entry for the node `name` at `path`.
    #[must_use]
    pub fn new(path: String, kind: ContentTreeKind, name: &str) -> Self {
        Self {
            path,
            kind,
            layer_ref: name.to_string(),
            title: title_key(name),
            visible: true,
        }
    }
}

/// The translation key under which the title of `name` is stored.
#[must_use]
pub fn title_key(name: &str) -> String {
    format!("layers.{name}.title")
}

/// Joins a node name onto its parent's path.
#[must_use]
pub fn join_path(ancestor: Option<&str>, name: &str) -> String {
    match ancestor {
        Some(parent) => format!("{parent}.{name}"),
        None => name.to_string(),
    }
}

/// Keeps content-tree paths unique within one mapping run.
#[derive(Debug, Default, Clone)]
pub struct PathResolver {
    paths: HashSet<String>,
}

impl PathResolver {
    /// Reserves `path`, or, if it is already taken, the first free `path.1`, `path.2`, etc.
    #[must_use]
    pub fn resolve(&mut self, path: String) -> String {
        if self.paths.insert(path.clone()) {
            return path;
        }
        let mut index: u32 = 1;
        loop {
            let new_path = format!("{path}.{index}");
            if self.paths.insert(new_path.clone()) {
                warn!(
                    "Content tree path `{path}` is used more than once, renamed to `{new_path}`"
                );
                return new_path;
            }
            index = index.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_resolve() {
        let mut r = PathResolver::default();
        assert_eq!(r.resolve("a".to_string()), "a");
        assert_eq!(r.resolve("a".to_string()), "a.1");
        assert_eq!(r.resolve("a".to_string()), "a.2");
        assert_eq!(r.resolve("a.1".to_string()), "a.1.1");
        assert_eq!(r.resolve("b".to_string()), "b");
    }

    #[test]
    fn join() {
        assert_eq!(join_path(None, "roads"), "roads");
        assert_eq!(join_path(Some("main.transport"), "roads"), "main.transport.roads");
    }

    #[test]
    fn node_serialization() {
        let node = ContentTreeNode::new("main.roads".to_string(), ContentTreeKind::Leaf, "roads");
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            serde_json::json!({
                "name": "main.roads",
                "type": "LayerContentTreeItem",
                "layerName": "roads",
                "title": "layers.roads.title",
                "visible": true
            })
        );
    }
}
