use std::fs;
use std::path::{Path, PathBuf};

use geocatalog::config::FauxEnv;
use geocatalog::config::args::Args;
use geocatalog::config::file::{Config, parse_config};
use geocatalog::fetch::Loader;
use geocatalog::host::{DirectoryHost, ModuleHost as _};
use geocatalog::{GeoCatalogError, build_module, publish};
use geocatalog_core::engine::Accumulators;
use geocatalog_core::module::ConfigModule;
use indoc::{formatdoc, indoc};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_config(extra: &str) -> Config {
    let yaml = formatdoc! {"
        themes_url: {themes}
        translations_url: {translations}
        locales: [fr, de]
        {extra}
        ",
        themes = fixture("themes.json").display(),
        translations = fixture("{lang}.json").display(),
    };
    let mut config = parse_config(&yaml, &FauxEnv::default(), Path::new("test.yaml")).unwrap();
    config.finalize().unwrap();
    config
}

async fn build(config: &Config) -> (ConfigModule, Value) {
    let module = build_module(config, &Loader::new().unwrap()).await.unwrap();
    let value = serde_json::to_value(&module).unwrap();
    (module, value)
}

fn tree_paths(module: &Value) -> Vec<&str> {
    module["contentTree"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["name"].as_str().unwrap())
        .collect()
}

fn layer<'a>(module: &'a Value, id: &Value) -> &'a Value {
    module["layers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|l| &l["id"] == id)
        .unwrap_or_else(|| panic!("no layer {id}"))
}

#[tokio::test]
async fn main_theme_with_background() {
    let config = fixture_config("themes: [{name: main}]");
    let (module, value) = build(&config).await;

    assert_eq!(module.id, "catalogConfigWithLayers");
    assert_eq!(
        tree_paths(&value),
        vec![
            "terrain",
            "background",
            "background.basemap_2015_global",
            "transport",
            "transport.roads",
            "transport.railways",
            "transport.railways_copy",
            "buildings_3d",
            "wintermesh",
            "historic_maps",
        ]
    );

    let ids: Vec<&Value> = module_ids(&value);
    assert_eq!(
        ids,
        vec![
            &json!("luxBaseTerrain"),
            &json!(500),
            &json!(11),
            &json!(99),
            &json!(20),
        ]
    );

    let roads = layer(&value, &json!(11));
    assert_eq!(roads["type"], "WMSLayer");
    assert_eq!(roads["allowPicking"], true);
    assert_eq!(roads["exclusiveGroups"], json!(["7"]));
    assert_eq!(
        roads["properties"]["legend"][0]["src"],
        "https://map.geoportail.lu/legends/get_html?lang=fr&id=11&name=roads_legend"
    );

    // WMTS layers are rendered through the WMS proxy by default
    let railways = layer(&value, &json!(99));
    assert_eq!(railways["type"], "WMSLayer");
    assert_eq!(railways["name"], "railways");

    let mesh = layer(&value, &json!(20));
    assert_eq!(mesh["type"], "CesiumTilesetLayer");
    assert_eq!(
        mesh["url"],
        "https://3d.example/tiles/buildings_3d/tileset.json"
    );
    assert_eq!(mesh["offset"], json!([0.0, 0.0, 5.0]));
    assert_eq!(mesh["exclusiveGroups"], json!(["mesh"]));

    let base = layer(&value, &json!(500));
    assert_eq!(base["type"], "WMTSLayer");
    assert_eq!(base["zIndex"], 0);
    assert_eq!(base["extent"]["coordinates"], json!([-180.0, -85.0, 180.0, 85.0]));
    assert!(
        base["url"]
            .as_str()
            .unwrap()
            .contains("/basemap/GLOBAL_WEBMERCATOR_4_V3/")
    );

    let polygons: Vec<&str> = value["clippingPolygons"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        polygons,
        vec![
            "ClippingPolygon_buildings_3d_0",
            "ClippingPolygon_buildings_3d_1"
        ]
    );

    let bundle = &value["i18n"][0];
    assert_eq!(bundle["name"], "catalogConfigWithLayers-i18n");
    assert_eq!(bundle["fr"]["layers"]["roads"]["title"], "Routes");
    assert_eq!(bundle["de"]["layers"]["roads"]["title"], "Straßen");
    assert_eq!(bundle["de"]["layers"]["transport"]["title"], "transport");
    assert_eq!(
        bundle["de"]["layers"]["railways_copy"]["title"],
        "Eisenbahn (Kopie)"
    );
    assert_eq!(
        bundle["fr"]["layers"]["LuxBaseTerrain"]["title"],
        "Luxembourg Terrain"
    );
    assert!(bundle.get("en").is_none());
}

fn module_ids(module: &Value) -> Vec<&Value> {
    module["layers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| &l["id"])
        .collect()
}

#[tokio::test]
async fn forced_kind_and_wmts_rendering() {
    let config = fixture_config(indoc! {"
        terrain: false
        wmts_rendering: wmts
        themes:
          - name: hydrology
            forced_kind: Data3D
          - name: main
    "});
    let (_, value) = build(&config).await;

    assert_eq!(
        tree_paths(&value)[..3],
        ["background", "background.basemap_2015_global", "lakes"]
    );
    let lakes = layer(&value, &json!(30));
    assert_eq!(lakes["type"], "CesiumTilesetLayer");
    assert_eq!(lakes["allowPicking"], true);
    assert_eq!(lakes["properties"]["featureInfo"], "lux3d");

    let railways = layer(&value, &json!(99));
    assert_eq!(railways["type"], "WMTSLayer");
    assert!(railways["url"].as_str().unwrap().ends_with(".jpeg"));

    assert!(
        module_ids(&value)
            .iter()
            .all(|id| **id != json!("luxBaseTerrain"))
    );
}

#[tokio::test]
async fn cli_overrides_config_file() {
    let mut config = fixture_config("module_id: fromFile");
    let args = <Args as clap::Parser>::parse_from([
        "geocatalog",
        "--theme",
        "hydrology",
        "-l",
        "de",
        "--no-terrain",
    ]);
    args.merge_into_config(&mut config, &FauxEnv::default());
    config.finalize().unwrap();

    let (module, value) = build(&config).await;
    assert_eq!(module.id, "fromFile");
    assert_eq!(
        tree_paths(&value),
        vec![
            "background",
            "background.basemap_2015_global",
            "lakes"
        ]
    );
    let bundle = &value["i18n"][0];
    assert!(bundle.get("fr").is_none());
    assert_eq!(bundle["de"]["layers"]["lakes"]["title"], "lakes");
}

#[tokio::test]
async fn publish_replaces_previous_module() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(&format!(
        "output: {}\nreplaces_module: catalogConfig",
        dir.path().display()
    ));
    let host = DirectoryHost::new(config.output());

    let previous = Accumulators::default().into_module("catalogConfig");
    host.add_module(&previous).await.unwrap();
    assert!(dir.path().join("catalogConfig.json").exists());

    let (module, value) = build(&config).await;
    publish(&module, &host, config.replaces_module.as_deref())
        .await
        .unwrap();

    assert!(!dir.path().join("catalogConfig.json").exists());
    let written: Value = serde_json::from_slice(
        &fs::read(dir.path().join("catalogConfigWithLayers.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(written, value);
}

#[tokio::test]
async fn missing_catalog_is_unavailable() {
    let mut config = fixture_config("");
    config.themes_url = Some(fixture("nope.json").display().to_string());

    let err = build_module(&config, &Loader::new().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, GeoCatalogError::CatalogUnavailable(_)));
    assert!(err.to_string().starts_with("Catalog unavailable"));
}
