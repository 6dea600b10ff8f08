//! Layer configuration records emitted by the mapping engine.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::NodeId;

/// Projection code of all extents emitted by this crate.
pub const EPSG_4326: &str = "EPSG:4326";

/// The renderer a host uses for a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Renderer {
    /// Image layer requested through a WMS
    #[serde(rename = "WMSLayer")]
    Wms,
    /// Tiled layer from a WMTS template
    #[serde(rename = "WMTSLayer")]
    Wmts,
    /// 3D tileset
    #[serde(rename = "CesiumTilesetLayer")]
    CesiumTileset,
    /// Quantized-mesh terrain
    #[serde(rename = "TerrainLayer")]
    Terrain,
}

/// Tile grid of a WMS layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TilingSchema {
    /// Web mercator grid
    Mercator,
}

/// WMS `GetMap` image parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageParameters {
    /// Image MIME type
    pub format: String,
    /// Whether the image background is transparent
    pub transparent: bool,
}

/// Projection of an [`Extent`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Projection {
    /// EPSG code, e.g. `EPSG:4326`
    pub epsg: String,
}

/// Bounding box `[min_x, min_y, max_x, max_y]` in the given projection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Extent {
    /// `[min_x, min_y, max_x, max_y]`
    pub coordinates: [f64; 4],
    /// Projection of the coordinates
    pub projection: Projection,
}

impl Extent {
    /// An extent in EPSG:4326.
    #[must_use]
    pub fn geographic(coordinates: [f64; 4]) -> Self {
        Self {
            coordinates,
            projection: Projection {
                epsg: EPSG_4326.to_string(),
            },
        }
    }
}

/// How feature info is requested from a WMS layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureInfo {
    /// MIME type of the feature info response
    pub response_type: String,
}

/// Style attached to an emitted layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LayerStyle {
    /// Name of a style known to the host
    Named(String),
    /// A declarative style item
    Declarative(DeclarativeStyleItem),
}

impl LayerStyle {
    /// Wraps a declarative style body.
    #[must_use]
    pub fn declarative(style: Map<String, Value>) -> Self {
        Self::Declarative(DeclarativeStyleItem {
            item_type: DeclarativeStyleItem::TYPE,
            declarative_style: style,
        })
    }

    /// The declarative style body, if this is a declarative style.
    #[must_use]
    pub fn as_declarative(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Named(_) => None,
            Self::Declarative(v) => Some(&v.declarative_style),
        }
    }
}

/// A declarative 3D tiles style, tagged with its item type.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarativeStyleItem {
    /// Always [`Self::TYPE`]
    #[serde(rename = "type")]
    pub item_type: &'static str,
    /// Style body, e.g. `color` and `show` expressions
    pub declarative_style: Map<String, Value>,
}

impl DeclarativeStyleItem {
    /// Item type understood by the host.
    pub const TYPE: &'static str = "DeclarativeStyleItem";
}

/// A fully specified layer, as loaded by the map host.
///
/// Owned by the engine's output and never modified after it was emitted.
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerConfig {
    /// Catalog id of the node
    pub id: NodeId,
    /// Catalog name of the node
    pub name: String,
    /// `None` for kinds without a synthesis rule
    #[serde(rename = "type")]
    pub renderer: Option<Renderer>,
    /// Service URL or tile template
    pub url: Option<String>,
    /// Data source copied from the catalog
    pub source: Option<String>,
    /// Layer style
    pub style: Option<LayerStyle>,
    /// Service-side layer names requested from a WMS
    pub layers: Option<String>,
    /// Tile grid of WMS layers
    pub tiling_schema: Option<TilingSchema>,
    /// WMS image parameters
    pub parameters: Option<ImageParameters>,
    /// Image format of WMTS tiles
    pub format: Option<String>,
    /// Area the layer is requested for
    pub extent: Option<Extent>,
    /// Whether the layer is shown when the map opens
    pub active_on_startup: bool,
    /// Whether features of the layer can be picked
    pub allow_picking: bool,
    /// Groups of which only one layer may be active at a time
    pub exclusive_groups: Option<Vec<String>>,
    /// WMS feature info settings
    pub feature_info: Option<FeatureInfo>,
    /// Stacking order, `0` for background maps
    pub z_index: Option<i32>,
    /// Vertical `[x, y, z]` offset of a 3D tileset
    pub offset: Option<[f64; 3]>,
    /// Whether terrain tiles are requested with vertex normals
    pub request_vertex_normals: Option<bool>,
    /// Metadata and host-specific properties
    pub properties: Map<String, Value>,
}

impl LayerConfig {
    /// A record with identity only, the starting point of every synthesis rule.
    #[must_use]
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            renderer: None,
            url: None,
            source: None,
            style: None,
            layers: None,
            tiling_schema: None,
            parameters: None,
            format: None,
            extent: None,
            active_on_startup: false,
            allow_picking: false,
            exclusive_groups: None,
            feature_info: None,
            z_index: None,
            offset: None,
            request_vertex_normals: None,
            properties: Map::new(),
        }
    }

    /// Whether a synthesis rule produced a renderable layer.
    ///
    /// Nodes of an unknown kind produce partial records without a URL.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.renderer.is_some() && self.url.is_some()
    }

    /// Adds an exclusive group tag unless the layer is already part of it.
    pub fn add_exclusive_group(&mut self, group: &str) {
        let groups = self.exclusive_groups.get_or_insert_with(Vec::new);
        if !groups.iter().any(|g| g == group) {
            groups.push(group.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn new_layer_is_partial() {
        let layer = LayerConfig::new(NodeId::from(7), "x");
        assert!(!layer.is_complete());
        assert_eq!(
            serde_json::to_value(&layer).unwrap(),
            json!({
                "id": 7,
                "name": "x",
                "activeOnStartup": false,
                "allowPicking": false,
                "properties": {}
            })
        );
    }

    #[test]
    fn exclusive_groups_are_a_set() {
        let mut layer = LayerConfig::new(NodeId::from("a"), "a");
        layer.add_exclusive_group("baselayer");
        layer.add_exclusive_group("1");
        layer.add_exclusive_group("baselayer");
        assert_eq!(
            layer.exclusive_groups,
            Some(vec!["baselayer".to_string(), "1".to_string()])
        );
    }

    #[test]
    fn declarative_style_item() {
        let style = LayerStyle::declarative(Map::from_iter([("show".to_string(), json!("true"))]));
        assert_eq!(
            serde_json::to_value(&style).unwrap(),
            json!({"type": "DeclarativeStyleItem", "declarativeStyle": {"show": "true"}})
        );
        assert_eq!(
            serde_json::to_value(LayerStyle::Named("default".to_string())).unwrap(),
            json!("default")
        );
    }
}
