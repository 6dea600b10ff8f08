//! Per-kind rules turning a catalog node into a [`LayerConfig`].
//!
//! Every rule starts from the same base record (identity, source, style,
//! picking, seeded properties, exclusive groups) and then fills in the
//! kind-specific fields:
//!
//! | kind          | renderer             | URL                                      |
//! |---------------|----------------------|------------------------------------------|
//! | `WMS`         | `WMSLayer`           | the OWS proxy                            |
//! | `WMTS`        | `WMSLayer` or `WMTSLayer`, see [`WmtsRendering`] | WMTS tile template |
//! | `BaseLayer`   | `WMTSLayer`          | WMTS tile template, world extent         |
//! | `Data3D`      | `CesiumTilesetLayer` | `<url>/<layer>/tileset.json`             |
//! | `Mesh3D`      | `CesiumTilesetLayer` | `<url>/<layer>/tileset.json`             |

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::catalog::{CatalogNode, LayerKind, NodeId, NodeMetadata, NodeStyle};
use crate::clipping::ClippingPolygon;
use crate::content_tree::title_key;
use crate::i18n::Locale;
use crate::layer::{
    Extent, FeatureInfo, ImageParameters, LayerConfig, LayerStyle, Renderer, TilingSchema,
};
use crate::{CatalogError, CatalogResult};

mod style;
pub use style::{derive_3d_style, hidden_ids_expression};

mod urls;
pub use urls::{image_extension, legend_url, tileset_url, wmts_tile_url};

/// WMS proxy all image layers are requested from.
pub const DEFAULT_OWS_URL: &str = "https://wmsproxy.geoportail.lu/ogcproxywms";
/// WMTS endpoint tile templates are built on.
pub const DEFAULT_WMTS_URL: &str = "https://wmts3.geoportail.lu/mapproxy_4_v3/wmts";
/// Base of the 3D tilesets.
pub const DEFAULT_3D_TILES_URL: &str = "https://acts3.geoportail.lu/3d-data/3d-tiles";
/// Legend service.
pub const DEFAULT_LEGEND_URL: &str = "https://map.geoportail.lu/legends/get_html";
/// Tile matrix set of WMTS nodes without their own.
pub const DEFAULT_MATRIX_SET: &str = "GLOBAL_WEBMERCATOR_4_V3";

/// Bounding box of Luxembourg in EPSG:4326.
pub const NATIONAL_EXTENT: [f64; 4] = [5.7357, 49.4478, 6.5286, 50.1826];
/// Web-mercator usable world bounds in EPSG:4326.
pub const WORLD_EXTENT: [f64; 4] = [-180.0, -85.0, 180.0, 85.0];

/// Exclusive group shared by all background maps.
pub const BASELAYER_GROUP: &str = "baselayer";
/// Exclusive group shared by all mesh tilesets.
pub const MESH_GROUP: &str = "mesh";

/// Feature info handler of 2D layers.
pub const FEATURE_INFO_2D: &str = "lux2d";
/// Feature info handler of 3D tilesets.
pub const FEATURE_INFO_3D: &str = "lux3d";

/// Id of the synthesized terrain layer.
pub const TERRAIN_LAYER_ID: &str = "luxBaseTerrain";
/// Name and translation key of the terrain layer.
pub const TERRAIN_LAYER_NAME: &str = "LuxBaseTerrain";
/// Title of the terrain layer when no translation exists.
pub const TERRAIN_LAYER_TITLE: &str = "Luxembourg Terrain";

const PNG: &str = "image/png";
const HTML: &str = "text/html";

/// How `WMTS` catalog nodes that are not baselayers are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WmtsRendering {
    /// Build them with the WMS rule, so that feature info works
    #[default]
    Wms,
    /// Keep them as tiled WMTS layers
    Wmts,
}

impl FromStr for WmtsRendering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wms" => Ok(Self::Wms),
            "wmts" => Ok(Self::Wmts),
            _ => Err(format!(
                "Invalid WMTS rendering '{s}'. Valid options: wms or wmts"
            )),
        }
    }
}

/// Shared, read-only input of every synthesis rule.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthContext {
    /// WMS proxy URL
    pub ows_url: String,
    /// WMTS endpoint
    pub wmts_url: String,
    /// Used for 3D nodes without their own `url`
    pub tiles_3d_url: String,
    /// Legend service URL
    pub legend_url: String,
    /// Used for WMTS nodes without their own `matrixSet`
    pub default_matrix_set: String,
    /// Language of legend links
    pub locale: Locale,
    /// How non-baselayer WMTS nodes are rendered
    pub wmts_rendering: WmtsRendering,
}

impl Default for SynthContext {
    fn default() -> Self {
        Self {
            ows_url: DEFAULT_OWS_URL.to_string(),
            wmts_url: DEFAULT_WMTS_URL.to_string(),
            tiles_3d_url: DEFAULT_3D_TILES_URL.to_string(),
            legend_url: DEFAULT_LEGEND_URL.to_string(),
            default_matrix_set: DEFAULT_MATRIX_SET.to_string(),
            locale: Locale::default(),
            wmts_rendering: WmtsRendering::default(),
        }
    }
}

/// Result of synthesizing one node.
#[derive(Clone, Debug, PartialEq)]
pub struct Synthesized {
    /// The layer configuration
    pub layer: LayerConfig,
    /// Only ever non-empty for `Mesh3D` nodes
    pub clipping_polygons: Vec<ClippingPolygon>,
}

impl From<&NodeId> for Value {
    fn from(id: &NodeId) -> Self {
        match id {
            NodeId::Number(v) => Value::from(*v),
            NodeId::Text(v) => Value::from(v.as_str()),
        }
    }
}

impl From<NodeStyle> for LayerStyle {
    fn from(style: NodeStyle) -> Self {
        match style {
            NodeStyle::Named(v) => Self::Named(v),
            NodeStyle::Declarative(v) => Self::declarative(v),
        }
    }
}

/// Builds the layer configuration of `node` according to `kind`.
///
/// `id` and `name` are the node's validated identity. Kinds without a rule
/// produce a partial record holding only the base fields.
#[must_use]
pub fn synthesize(
    node: &CatalogNode,
    id: &NodeId,
    name: &str,
    kind: &LayerKind,
    ctx: &SynthContext,
) -> Synthesized {
    let is_baselayer = *kind == LayerKind::BaseLayer || node.is_baselayer();
    let mut layer = base_layer(node, id, name, kind, is_baselayer, ctx);
    let mut clipping_polygons = Vec::new();

    match kind {
        LayerKind::Wms => apply_wms(&mut layer, node, ctx),
        LayerKind::BaseLayer => apply_baselayer(&mut layer, node, ctx),
        LayerKind::Wmts if is_baselayer => apply_baselayer(&mut layer, node, ctx),
        LayerKind::Wmts => match ctx.wmts_rendering {
            WmtsRendering::Wms => apply_wms(&mut layer, node, ctx),
            WmtsRendering::Wmts => apply_wmts(&mut layer, node, ctx),
        },
        LayerKind::Data3D => apply_data_3d(&mut layer, node, ctx),
        LayerKind::Mesh3D => {
            clipping_polygons = apply_mesh_3d(&mut layer, node, ctx);
        }
        LayerKind::Other(other) => {
            warn!("Layer {name} ({id}) has unsupported kind {other}, emitting a partial config");
        }
    }

    debug!(
        "Synthesized {kind} layer {name} ({id}) as {:?}",
        layer.renderer
    );
    Synthesized {
        layer,
        clipping_polygons,
    }
}

/// The `TerrainLayer` serving the national elevation model.
#[must_use]
pub fn terrain_layer(url: &str) -> LayerConfig {
    let mut layer = LayerConfig::new(NodeId::from(TERRAIN_LAYER_ID), TERRAIN_LAYER_NAME);
    layer.renderer = Some(Renderer::Terrain);
    layer.url = Some(url.to_string());
    layer.active_on_startup = true;
    layer.request_vertex_normals = Some(true);
    layer
        .properties
        .insert("title".to_string(), Value::from(TERRAIN_LAYER_TITLE));
    layer
}

fn base_layer(
    node: &CatalogNode,
    id: &NodeId,
    name: &str,
    kind: &LayerKind,
    is_baselayer: bool,
    ctx: &SynthContext,
) -> LayerConfig {
    let md = node.metadata();
    let mut layer = LayerConfig::new(id.clone(), name);
    layer.source.clone_from(&node.source);
    layer.style = node.style.clone().map(LayerStyle::from);
    layer.allow_picking = md.is_queryable.unwrap_or(false);

    let mut props = metadata_properties(md);
    props.insert("is3DLayer".to_string(), Value::Bool(kind.is_3d()));
    props.insert("luxId".to_string(), Value::from(id));
    props.insert("isBaselayer".to_string(), Value::Bool(is_baselayer));
    props.insert("title".to_string(), Value::String(title_key(name)));
    if let Some(legend_name) = &md.legend_name {
        match legend_url(&ctx.legend_url, ctx.locale, id, Some(legend_name)) {
            Ok(src) => {
                props.insert("legend".to_string(), legend_descriptor(src));
            }
            Err(e) => warn!("Unable to build legend URL of layer {name} from {}: {e}", ctx.legend_url),
        }
    }
    layer.properties = props;

    match exclusive_groups(md, id) {
        Ok(groups) if groups.is_empty() => {}
        Ok(groups) => layer.exclusive_groups = Some(groups),
        Err(e) => warn!("Ignoring exclusive groups of layer {name}: {e}"),
    }
    layer
}

/// The node metadata as a JSON object, the seed of a layer's properties.
fn metadata_properties(md: &NodeMetadata) -> Map<String, Value> {
    match serde_json::to_value(md) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn legend_descriptor(src: url::Url) -> Value {
    let mut item = Map::new();
    item.insert("type".to_string(), Value::from("IframeLegendItem"));
    item.insert("src".to_string(), Value::from(String::from(src)));
    Value::Array(vec![Value::Object(item)])
}

/// Reads the exclusive group tags from a node's `exclusion` metadata.
///
/// The value is usually a JSON-encoded list (`"[1, 2]"`), but an inline list
/// is accepted as well. Numeric tags are converted to strings.
pub fn exclusive_groups(md: &NodeMetadata, id: &NodeId) -> CatalogResult<Vec<String>> {
    let parsed;
    let list = match &md.exclusion {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(Vec::new()),
        Some(Value::String(s)) => {
            parsed = serde_json::from_str::<Value>(s)
                .map_err(|e| CatalogError::InvalidExclusion(id.to_string(), e))?;
            &parsed
        }
        Some(v) => v,
    };
    let Value::Array(items) = list else {
        return Err(CatalogError::ExclusionNotAList(id.to_string(), list.to_string()));
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(v) => Ok(v.clone()),
            Value::Number(v) => Ok(v.to_string()),
            v => Err(CatalogError::ExclusionNotAList(id.to_string(), v.to_string())),
        })
        .collect()
}

fn apply_wms(layer: &mut LayerConfig, node: &CatalogNode, ctx: &SynthContext) {
    layer.renderer = Some(Renderer::Wms);
    layer.url = Some(ctx.ows_url.clone());
    layer.layers = Some(node.layer_ref().unwrap_or(&layer.name).to_string());
    layer.tiling_schema = Some(TilingSchema::Mercator);
    layer.parameters = Some(ImageParameters {
        format: PNG.to_string(),
        transparent: true,
    });
    layer.feature_info = Some(FeatureInfo {
        response_type: HTML.to_string(),
    });
    layer
        .properties
        .insert("featureInfo".to_string(), Value::from(FEATURE_INFO_2D));
}

fn apply_wmts(layer: &mut LayerConfig, node: &CatalogNode, ctx: &SynthContext) {
    set_wmts_source(layer, node, ctx);
    layer.extent = Some(Extent::geographic(NATIONAL_EXTENT));
}

fn apply_baselayer(layer: &mut LayerConfig, node: &CatalogNode, ctx: &SynthContext) {
    set_wmts_source(layer, node, ctx);
    layer.extent = Some(Extent::geographic(WORLD_EXTENT));
    layer.z_index = Some(0);
    layer.add_exclusive_group(BASELAYER_GROUP);
}

fn set_wmts_source(layer: &mut LayerConfig, node: &CatalogNode, ctx: &SynthContext) {
    let layer_ref = node.layer_ref().unwrap_or(&layer.name);
    let matrix_set = node
        .matrix_set
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(&ctx.default_matrix_set);
    let url = wmts_tile_url(
        &ctx.wmts_url,
        layer_ref,
        matrix_set,
        node.image_type.as_deref(),
    );
    layer.renderer = Some(Renderer::Wmts);
    layer.url = Some(url);
    layer.format = Some(
        node.image_type
            .clone()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| PNG.to_string()),
    );
}

fn set_tileset_source(layer: &mut LayerConfig, node: &CatalogNode, ctx: &SynthContext) {
    let base = node
        .url
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(&ctx.tiles_3d_url);
    let url = tileset_url(base, node.layer_ref().unwrap_or(&layer.name));
    layer.renderer = Some(Renderer::CesiumTileset);
    layer.url = Some(url);
}

fn apply_data_3d(layer: &mut LayerConfig, node: &CatalogNode, ctx: &SynthContext) {
    set_tileset_source(layer, node, ctx);
    let md = node.metadata();
    layer.allow_picking = true;
    layer.active_on_startup = md.ol3d_default_layer.unwrap_or(false);
    if let Some(style) = derive_3d_style(md.ol3d_options.as_ref()) {
        layer.style = Some(style);
    }
    layer
        .properties
        .insert("featureInfo".to_string(), Value::from(FEATURE_INFO_3D));
}

fn apply_mesh_3d(
    layer: &mut LayerConfig,
    node: &CatalogNode,
    ctx: &SynthContext,
) -> Vec<ClippingPolygon> {
    set_tileset_source(layer, node, ctx);
    layer.add_exclusive_group(MESH_GROUP);
    let Some(options) = node.metadata().ol3d_options.as_ref() else {
        return Vec::new();
    };
    if let Some(height) = options.height_offset {
        layer.offset = Some([0.0, 0.0, height]);
    }
    options
        .vcs_clipping_polygons
        .iter()
        .flatten()
        .enumerate()
        .map(|(index, ring)| ClippingPolygon::for_mesh(&layer.name, index, ring.clone()))
        .collect()
}
