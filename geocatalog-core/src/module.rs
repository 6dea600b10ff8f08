use serde::Serialize;

use crate::clipping::ClippingPolygon;
use crate::content_tree::ContentTreeNode;
use crate::engine::Accumulators;
use crate::i18n::TranslationTable;
use crate::layer::LayerConfig;

/// Id of the module replacing the host's static catalog module.
pub const DEFAULT_MODULE_ID: &str = "catalogConfigWithLayers";

/// The configuration module registered with the map host.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigModule {
    /// Module id, unique among the host's modules
    #[serde(rename = "_id")]
    pub id: String,
    /// Layer configs
    pub layers: Vec<LayerConfig>,
    /// Layer navigation entries
    pub content_tree: Vec<ContentTreeNode>,
    /// Clipping polygons of mesh layers
    pub clipping_polygons: Vec<ClippingPolygon>,
    /// At most one bundle, named `<id>-i18n`
    pub i18n: Vec<I18nBundle>,
}

/// A named translation bundle, e.g. `{"name": "...", "fr": {"layers": {...}}}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct I18nBundle {
    /// Bundle name
    pub name: String,
    /// Titles per locale
    #[serde(flatten)]
    pub translations: TranslationTable,
}

impl ConfigModule {
    /// Wraps the output of one mapping run.
    #[must_use]
    pub fn new(id: impl Into<String>, acc: Accumulators) -> Self {
        let id = id.into();
        let i18n = if acc.i18n.is_empty() {
            Vec::new()
        } else {
            vec![I18nBundle {
                name: format!("{id}-i18n"),
                translations: acc.i18n,
            }]
        };
        Self {
            id,
            layers: acc.layers,
            content_tree: acc.content_tree,
            clipping_polygons: acc.clipping_polygons,
            i18n,
        }
    }
}

impl Accumulators {
    /// Hands the output of this run over as a host module.
    #[must_use]
    pub fn into_module(self, id: impl Into<String>) -> ConfigModule {
        ConfigModule::new(id, self)
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_json_snapshot;
    use serde_json::json;

    use crate::catalog::CatalogDocument;
    use crate::engine::MappingEngine;
    use crate::exclusion::ExclusionRules;
    use crate::i18n::{Dictionary, Locale, Translations};
    use crate::synth::SynthContext;

    use super::*;

    #[test]
    fn empty_module() {
        let module = Accumulators::default().into_module("empty");
        assert_json_snapshot!(module, @r#"
        {
          "_id": "empty",
          "layers": [],
          "contentTree": [],
          "clippingPolygons": [],
          "i18n": []
        }
        "#);
    }

    #[test]
    fn module_layout() {
        let doc: CatalogDocument = serde_json::from_value(json!({
            "themes": [{
                "name": "main",
                "children": [{
                    "id": 1,
                    "name": "transport",
                    "children": [{"id": 2, "name": "roads", "type": "WMS", "metadata": {"exclusion": "[3]"}}]
                }]
            }]
        }))
        .unwrap();
        let translations: Translations = [(
            Locale::En,
            Dictionary::from([("roads".to_string(), "Roads".to_string())]),
        )]
        .into_iter()
        .collect();
        let ctx = SynthContext::default();
        let rules = ExclusionRules::default();
        let engine = MappingEngine::new(&ctx, &translations, &rules, vec![Locale::En, Locale::Fr]);
        let module = engine
            .map_catalog(&doc, &[], false)
            .into_module(DEFAULT_MODULE_ID);

        assert_json_snapshot!(module, @r#"
        {
          "_id": "catalogConfigWithLayers",
          "layers": [
            {
              "id": 2,
              "name": "roads",
              "type": "WMSLayer",
              "url": "https://wmsproxy.geoportail.lu/ogcproxywms",
              "layers": "roads",
              "tilingSchema": "mercator",
              "parameters": {
                "format": "image/png",
                "transparent": true
              },
              "activeOnStartup": false,
              "allowPicking": false,
              "exclusiveGroups": [
                "3"
              ],
              "featureInfo": {
                "responseType": "text/html"
              },
              "properties": {
                "exclusion": "[3]",
                "featureInfo": "lux2d",
                "is3DLayer": false,
                "isBaselayer": false,
                "luxId": 2,
                "title": "layers.roads.title"
              }
            }
          ],
          "contentTree": [
            {
              "name": "transport",
              "type": "NodeContentTreeItem",
              "layerName": "transport",
              "title": "layers.transport.title",
              "visible": true
            },
            {
              "name": "transport.roads",
              "type": "LayerContentTreeItem",
              "layerName": "roads",
              "title": "layers.roads.title",
              "visible": true
            }
          ],
          "clippingPolygons": [],
          "i18n": [
            {
              "name": "catalogConfigWithLayers-i18n",
              "en": {
                "layers": {
                  "roads": {
                    "title": "Roads"
                  },
                  "transport": {
                    "title": "transport"
                  }
                }
              },
              "fr": {
                "layers": {
                  "roads": {
                    "title": "roads"
                  },
                  "transport": {
                    "title": "transport"
                  }
                }
              }
            }
          ]
        }
        "#);
    }
}
