use url::Url;

use crate::catalog::NodeId;
use crate::i18n::Locale;

/// The file extension of an image MIME type, `png` if it has none.
#[must_use]
pub fn image_extension(image_type: Option<&str>) -> &str {
    image_type
        .and_then(|v| v.split('/').nth(1))
        .filter(|v| !v.is_empty())
        .unwrap_or("png")
}

/// RESTful WMTS tile template, with the tile placeholders left for the host to fill in.
#[must_use]
pub fn wmts_tile_url(
    base: &str,
    layer: &str,
    matrix_set: &str,
    image_type: Option<&str>,
) -> String {
    let base = base.trim_end_matches('/');
    let ext = image_extension(image_type);
    format!("{base}/{layer}/{matrix_set}/{{TileMatrix}}/{{TileCol}}/{{TileRow}}.{ext}")
}

/// Location of the `tileset.json` of a 3D tileset published under `base`.
#[must_use]
pub fn tileset_url(base: &str, layer: &str) -> String {
    let base = base.trim_end_matches('/');
    format!("{base}/{layer}/tileset.json")
}

/// The legend page of a layer, rendered in `locale`.
pub fn legend_url(
    base: &str,
    locale: Locale,
    id: &NodeId,
    name: Option<&str>,
) -> Result<Url, url::ParseError> {
    let id = id.to_string();
    let mut params = vec![("lang", locale.as_str()), ("id", id.as_str())];
    if let Some(name) = name {
        params.push(("name", name));
    }
    Url::parse_with_params(base, &params)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some("image/jpeg"), "jpeg")]
    #[case(Some("image/png"), "png")]
    #[case(Some("jpeg"), "png")]
    #[case(Some("image/"), "png")]
    #[case(None, "png")]
    fn extension(#[case] image_type: Option<&str>, #[case] expected: &str) {
        assert_eq!(image_extension(image_type), expected);
    }

    #[test]
    fn wmts_template() {
        assert_eq!(
            wmts_tile_url("https://wmts.example/wmts/", "ortho", "GM", Some("image/jpeg")),
            "https://wmts.example/wmts/ortho/GM/{TileMatrix}/{TileCol}/{TileRow}.jpeg"
        );
    }

    #[test]
    fn tileset() {
        assert_eq!(
            tileset_url("https://3d.example/tiles", "buildings"),
            "https://3d.example/tiles/buildings/tileset.json"
        );
    }

    #[test]
    fn legend() {
        let url = legend_url(
            "https://legends.example/get_html",
            Locale::De,
            &NodeId::from(42),
            Some("bâti & routes"),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://legends.example/get_html?lang=de&id=42&name=b%C3%A2ti+%26+routes"
        );
        assert!(legend_url("not a url", Locale::Fr, &NodeId::from(1), None).is_err());
    }
}
