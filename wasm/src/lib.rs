use notemap::{RenderOptions, render_outline};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotemapRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    fast_text: Option<bool>,
    width: Option<f32>,
    height: Option<f32>,
}

fn build_render_options(options: NotemapRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("modern") {
        RenderOptions::modern()
    } else {
        RenderOptions::notemap_default()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    if let Some(width) = options.width {
        render_options.render.width = width;
    }
    if let Some(height) = options.height {
        render_options.render.height = height;
    }

    // No system fonts in the browser.
    render_options.fast_text = options.fast_text.unwrap_or(true);

    render_options
}

#[wasm_bindgen]
pub fn render_notemap_svg(yaml: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<NotemapRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        NotemapRenderOptions::default()
    };

    let render_options = build_render_options(options);
    render_outline(yaml, &render_options).map_err(|error| JsValue::from_str(&error.to_string()))
}

#[cfg(test)]
mod tests {
    use notemap::render_outline;

    use crate::{NotemapRenderOptions, build_render_options};

    #[test]
    fn renders_nested_outline() {
        let yaml = "- Reading list\n- Projects:\n    - notemap\n    - garden:\n        - beds\n";

        let svg = render_outline(yaml, &build_render_options(NotemapRenderOptions::default()))
            .expect("nested outline should render");

        assert!(svg.contains("<svg"));
        assert!(svg.contains("garden"));
        assert_eq!(svg.matches("class=\"link\"").count(), 3);
    }

    #[test]
    fn options_override_theme_and_canvas() {
        let options: NotemapRenderOptions =
            serde_json::from_str(r#"{"theme":"modern","fontSize":20,"width":900}"#).unwrap();
        let render_options = build_render_options(options);
        assert_eq!(render_options.theme.font_size, 20.0);
        assert_eq!(render_options.render.width, 900.0);
        assert!(render_options.fast_text);
    }
}
