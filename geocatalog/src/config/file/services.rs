use geocatalog_core::i18n::Locale;
use geocatalog_core::synth::{SynthContext, WmtsRendering};
use serde::{Deserialize, Serialize};

/// Base URLs of the services the emitted layers are served from.
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// WMS proxy used by `WMS` layers
    pub ows_url: Option<String>,
    /// RESTful WMTS endpoint used by `WMTS` and baselayer layers
    pub wmts_url: Option<String>,
    /// Default base URL of 3D tilesets
    pub tiles_3d_url: Option<String>,
    /// Legend page linked from layers with a legend
    pub legend_url: Option<String>,
    /// Matrix set of WMTS layers that do not name their own
    pub default_matrix_set: Option<String>,
    /// Whether non-baselayer WMTS nodes are rendered as WMS (default) or WMTS
    pub wmts_rendering: Option<WmtsRendering>,
}

impl ServicesConfig {
    /// Fills every unset value with the geoportal default.
    pub fn finalize(&mut self) {
        let defaults = SynthContext::default();
        self.ows_url.get_or_insert(defaults.ows_url);
        self.wmts_url.get_or_insert(defaults.wmts_url);
        self.tiles_3d_url.get_or_insert(defaults.tiles_3d_url);
        self.legend_url.get_or_insert(defaults.legend_url);
        self.default_matrix_set
            .get_or_insert(defaults.default_matrix_set);
        self.wmts_rendering.get_or_insert(defaults.wmts_rendering);
    }

    /// The synthesis context, with legend links in `locale`.
    #[must_use]
    pub fn synth_context(&self, locale: Locale) -> SynthContext {
        let defaults = SynthContext::default();
        SynthContext {
            ows_url: self.ows_url.clone().unwrap_or(defaults.ows_url),
            wmts_url: self.wmts_url.clone().unwrap_or(defaults.wmts_url),
            tiles_3d_url: self.tiles_3d_url.clone().unwrap_or(defaults.tiles_3d_url),
            legend_url: self.legend_url.clone().unwrap_or(defaults.legend_url),
            default_matrix_set: self
                .default_matrix_set
                .clone()
                .unwrap_or(defaults.default_matrix_set),
            locale,
            wmts_rendering: self.wmts_rendering.unwrap_or(defaults.wmts_rendering),
        }
    }
}
