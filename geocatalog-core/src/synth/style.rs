use serde_json::Value;

use crate::catalog::Ol3dOptions;
use crate::layer::LayerStyle;

/// Derives the declarative style of a 3D tileset from its `ol3d_options`.
///
/// Starts from the configured `cesium3DTileStyle` and overrides its `show`
/// condition when features must be hidden. Returns `None` without options.
#[must_use]
pub fn derive_3d_style(options: Option<&Ol3dOptions>) -> Option<LayerStyle> {
    let options = options?;
    let mut style = options.cesium_3d_tile_style.clone().unwrap_or_default();
    if let Some(ids) = options
        .vcs_hidden_object_ids
        .as_deref()
        .filter(|ids| !ids.is_empty())
    {
        style.insert("show".to_string(), Value::String(hidden_ids_expression(ids)));
    }
    Some(LayerStyle::declarative(style))
}

/// A 3D tiles style condition that is false for each of the given feature ids.
///
/// String ids are embedded in single-quoted literals with backslashes and quotes escaped.
#[must_use]
pub fn hidden_ids_expression(ids: &[Value]) -> String {
    let conditions: Vec<String> = ids
        .iter()
        .map(|id| {
            let id = match id {
                Value::String(v) => v.replace('\\', r"\\").replace('\'', r"\'"),
                v => v.to_string(),
            };
            format!("${{id}} === '{id}'")
        })
        .collect();
    format!("!({})", conditions.join(" || "))
}
