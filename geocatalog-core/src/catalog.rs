//! The hierarchical theme catalog published by the geoportal.
//!
//! A catalog is a list of themes, each a tree of [`CatalogNode`]s. Nodes with a
//! [`LayerKind`] describe renderable layers, nodes without one only group
//! their children. The tree is treated as immutable input: nothing in this
//! crate mutates a node after it was parsed.

use std::fmt::{self, Display, Formatter};
use std::sync::LazyLock;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::{CatalogError, CatalogResult};

/// Name of the synthetic root holding the catalog's background layers.
pub const BACKGROUND_ROOT_NAME: &str = "background";

/// Stable node identifier, unique within one catalog snapshot.
///
/// The geoportal publishes numeric ids, but string ids are accepted as well.
/// Whichever form was read is written back unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    /// A numeric id, e.g. `359`
    Number(i64),
    /// A textual id, e.g. `"luxBaseTerrain"`
    Text(String),
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// The layer kind declared by a catalog node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Image layer served through the WMS proxy
    Wms,
    /// Tiled layer served by the WMTS endpoint
    Wmts,
    /// Background map, mutually exclusive with other background maps
    BaseLayer,
    /// 3D tileset with pickable features
    Data3D,
    /// 3D mesh tileset, optionally clipped by polygons
    Mesh3D,
    /// Any kind this crate does not know how to render
    Other(String),
}

impl LayerKind {
    /// The kind as written in the catalog.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Wms => "WMS",
            Self::Wmts => "WMTS",
            Self::BaseLayer => "BaseLayer",
            Self::Data3D => "Data3D",
            Self::Mesh3D => "Mesh3D",
            Self::Other(v) => v,
        }
    }

    /// Whether layers of this kind are rendered in the 3D scene only.
    #[must_use]
    pub fn is_3d(&self) -> bool {
        matches!(self, Self::Data3D | Self::Mesh3D)
    }
}

impl From<String> for LayerKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "WMS" => Self::Wms,
            "WMTS" => Self::Wmts,
            "BaseLayer" => Self::BaseLayer,
            // older catalogs tag every 3D tileset as plain "3D"
            "Data3D" | "3D" => Self::Data3D,
            "Mesh3D" => Self::Mesh3D,
            _ => Self::Other(value),
        }
    }
}

impl Serialize for LayerKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LayerKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

impl Display for LayerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads an optional attribute. A value of the wrong shape is dropped with a
/// warning, so one odd node cannot reject the whole catalog.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match T::deserialize(&value) {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            warn!("Ignoring malformed catalog attribute {value}: {e}");
            Ok(None)
        }
    }
}

/// Absent, `null` and empty kinds all mark a pure grouping node.
fn deserialize_kind<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<LayerKind>, D::Error> {
    let kind: Option<String> = lenient(deserializer)?;
    Ok(kind
        .filter(|v| !v.is_empty() && v != "None")
        .map(LayerKind::from))
}

/// Style reference of a node: a named server-side style or an inline declarative style.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeStyle {
    /// Name of a style known to the map host
    Named(String),
    /// Declarative style descriptor, passed on as is
    Declarative(Map<String, Value>),
}

/// 3D rendering options attached to a node's metadata.
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ol3dOptions {
    /// Vertical offset in meters applied to mesh tilesets
    #[serde(alias = "height_offset", default, deserialize_with = "lenient")]
    pub height_offset: Option<f64>,
    /// Declarative 3D tiles style the derived style starts from
    #[serde(rename = "cesium3DTileStyle", default, deserialize_with = "lenient")]
    pub cesium_3d_tile_style: Option<Map<String, Value>>,
    /// Feature ids that must never be shown
    #[serde(default, deserialize_with = "lenient")]
    pub vcs_hidden_object_ids: Option<Vec<Value>>,
    /// Clipping rings, each a list of `[lon, lat]` (or `[lon, lat, height]`) positions
    #[serde(default, deserialize_with = "lenient")]
    pub vcs_clipping_polygons: Option<Vec<Vec<Vec<f64>>>>,
    /// Options not interpreted by this crate
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The metadata bag of a catalog node.
///
/// Keys are read in camelCase as well as in the snake case the geoportal
/// publishes. Unknown keys are kept and end up in the layer's properties.
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    /// JSON-encoded list of exclusive group tags, e.g. `"[1, 2]"`
    pub exclusion: Option<Value>,
    /// Legend page name, no legend without it
    #[serde(alias = "legend_name", default, deserialize_with = "lenient")]
    pub legend_name: Option<String>,
    /// Whether features can be picked
    #[serde(alias = "is_queryable", default, deserialize_with = "lenient")]
    pub is_queryable: Option<bool>,
    /// Id of the metadata record
    #[serde(alias = "metadata_id", default, deserialize_with = "lenient")]
    pub metadata_id: Option<String>,
    /// Whether a 3D layer is shown when the map opens
    #[serde(
        alias = "ol3d_defaultlayer",
        alias = "ol3dDefaultlayer",
        default,
        deserialize_with = "lenient"
    )]
    pub ol3d_default_layer: Option<bool>,
    /// 3D rendering options
    #[serde(alias = "ol3d_options", default, deserialize_with = "lenient")]
    pub ol3d_options: Option<Ol3dOptions>,
    /// Whether the layer is listed in the background switcher
    #[serde(alias = "display_in_switcher", default, deserialize_with = "lenient")]
    pub display_in_switcher: Option<bool>,
    /// Metadata not interpreted by this crate
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A node of the catalog tree.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogNode {
    /// Identifier, nodes without one are never emitted as layers
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<NodeId>,
    /// Machine key, used for translation lookups and content-tree paths
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Layer kind, `None` for pure grouping nodes
    #[serde(
        rename = "type",
        alias = "kind",
        default,
        deserialize_with = "deserialize_kind"
    )]
    pub kind: Option<LayerKind>,
    /// Data source of the layer, e.g. `geoportail` or `wms`
    #[serde(default, deserialize_with = "lenient")]
    pub source: Option<String>,
    /// Server-side or declarative style
    #[serde(default, deserialize_with = "lenient")]
    pub style: Option<NodeStyle>,
    /// Image MIME type, e.g. `image/jpeg`
    #[serde(default, deserialize_with = "lenient")]
    pub image_type: Option<String>,
    /// WMTS tile matrix set
    #[serde(default, deserialize_with = "lenient")]
    pub matrix_set: Option<String>,
    /// Service-side layer identifier, defaults to [`Self::name`]
    #[serde(alias = "layers", default, deserialize_with = "lenient")]
    pub layer_ref: Option<String>,
    /// Base URL of a 3D tileset
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
    /// Whether the node is a background map
    #[serde(alias = "is_baselayer", default, deserialize_with = "lenient")]
    pub is_baselayer: Option<bool>,
    /// Metadata bag, see [`NodeMetadata`]
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: Option<NodeMetadata>,
    /// Child nodes, in catalog order
    #[serde(default, deserialize_with = "lenient")]
    pub children: Option<Vec<CatalogNode>>,
    /// Attributes not interpreted by this crate, e.g. `time`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

static EMPTY_METADATA: LazyLock<NodeMetadata> = LazyLock::new(NodeMetadata::default);

impl CatalogNode {
    /// The node's name, if it has a non-empty one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|v| !v.is_empty())
    }

    /// Child nodes, empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[CatalogNode] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Whether the node has at least one child.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// The metadata bag, empty when the node has none.
    #[must_use]
    pub fn metadata(&self) -> &NodeMetadata {
        self.metadata.as_ref().unwrap_or(&*EMPTY_METADATA)
    }

    /// Whether the node is a background map.
    #[must_use]
    pub fn is_baselayer(&self) -> bool {
        self.is_baselayer.unwrap_or(false)
    }

    /// The service-side layer name, falling back to the node name.
    #[must_use]
    pub fn layer_ref(&self) -> Option<&str> {
        self.layer_ref
            .as_deref()
            .filter(|v| !v.is_empty())
            .or_else(|| self.name())
    }

    /// Whether the node carries a non-null attribute, either on itself or in its metadata.
    #[must_use]
    pub fn has_attribute(&self, key: &str) -> bool {
        let is_set = |v: Option<&Value>| v.is_some_and(|v| !v.is_null());
        is_set(self.extra.get(key)) || is_set(self.metadata().extra.get(key))
    }
}

/// Legacy location of the terrain URL.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Lux3dSettings {
    /// URL of the quantized-mesh terrain
    #[serde(alias = "terrainUrl")]
    pub terrain_url: Option<String>,
}

/// The document published by the geoportal's themes endpoint.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    /// Theme roots, in catalog order
    #[serde(default)]
    pub themes: Vec<CatalogNode>,
    /// URL of the quantized-mesh terrain
    #[serde(alias = "terrain_url")]
    pub terrain_url: Option<String>,
    /// Legacy 3D settings block
    #[serde(rename = "lux_3d")]
    pub lux_3d: Option<Lux3dSettings>,
    /// Background maps offered in every theme
    #[serde(alias = "background_layers")]
    pub background_layers: Option<Vec<CatalogNode>>,
}

impl CatalogDocument {
    /// Parses a themes document.
    pub fn from_slice(data: &[u8]) -> CatalogResult<Self> {
        serde_json::from_slice(data).map_err(CatalogError::InvalidCatalog)
    }

    /// The terrain URL, preferring the top-level field over the legacy `lux_3d` block.
    #[must_use]
    pub fn terrain_url(&self) -> Option<&str> {
        self.terrain_url
            .as_deref()
            .or_else(|| self.lux_3d.as_ref()?.terrain_url.as_deref())
            .filter(|v| !v.is_empty())
    }

    /// The theme with the given name.
    #[must_use]
    pub fn theme(&self, name: &str) -> Option<&CatalogNode> {
        self.themes.iter().find(|t| t.name() == Some(name))
    }

    /// Builds the synthetic root holding all background layers, each flagged as a baselayer.
    #[must_use]
    pub fn background_root(&self) -> Option<CatalogNode> {
        let layers = self.background_layers.as_ref().filter(|v| !v.is_empty())?;
        let children = layers
            .iter()
            .map(|layer| CatalogNode {
                is_baselayer: Some(true),
                ..layer.clone()
            })
            .collect();
        Some(CatalogNode {
            name: Some(BACKGROUND_ROOT_NAME.to_string()),
            children: Some(children),
            ..CatalogNode::default()
        })
    }
}
