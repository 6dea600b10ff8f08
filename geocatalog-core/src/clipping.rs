use serde::Serialize;

/// A clipping polygon cutting a mesh layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClippingPolygon {
    /// `ClippingPolygon_<layer name>_<ring index>`
    pub name: String,
    /// Whether clipping is on when the map opens
    #[serde(rename = "activeOnStartup")]
    pub active: bool,
    /// Whether the terrain is clipped as well
    #[serde(rename = "terrain")]
    pub applies_to_terrain: bool,
    /// Layers the polygon cuts
    pub layer_names: Vec<String>,
    /// A single ring of `[lon, lat]` positions
    pub coordinates: Vec<Vec<f64>>,
}

impl ClippingPolygon {
    /// Builds the polygon clipping ring number `index` out of the mesh layer `layer_name`.
    #[must_use]
    pub fn for_mesh(layer_name: &str, index: usize, ring: Vec<Vec<f64>>) -> Self {
        Self {
            name: format!("ClippingPolygon_{layer_name}_{index}"),
            active: true,
            applies_to_terrain: false,
            layer_names: vec![layer_name.to_string()],
            coordinates: ring,
        }
    }
}
