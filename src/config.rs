use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coords::{Margins, VerticalExtent};
use crate::layout::{ColumnAlignment, EngineKind};
use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    pub engine: EngineKind,
    /// Gap between adjacent columns, in node widths.
    pub column_separation: f32,
    /// Gap between consecutive layers, in units of the tallest node.
    pub inter_layer_separation: f32,
    pub column_alignment: ColumnAlignment,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Arquint,
            column_separation: 1.0,
            inter_layer_separation: 0.2,
            column_alignment: ColumnAlignment::Center,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
    pub vertical_extent: VerticalExtent,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1600.0,
            margins: Margins::default(),
            vertical_extent: VerticalExtent::Width,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::notemap_default(),
            layout: LayoutConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: json5::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    node_fill: Option<String>,
    node_stroke: Option<String>,
    text_color: Option<String>,
    line_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    engine: Option<EngineKind>,
    column_separation: Option<f32>,
    inter_layer_separation: Option<f32>,
    column_alignment: Option<ColumnAlignment>,
    vertical_extent: Option<VerticalExtent>,
}

#[derive(Debug, Default, Deserialize)]
struct MarginsFile {
    left: Option<f32>,
    top: Option<f32>,
    right: Option<f32>,
    bottom: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct CanvasConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    margins: Option<MarginsFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    canvas: Option<CanvasConfigFile>,
}

/// Loads the configuration file at `path` on top of the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = path.display().to_string(); "Config file loaded");
    Ok(config)
}

/// Parses a JSON5 config document on top of the defaults.
pub fn parse_config(contents: &str) -> Result<Config, json5::Error> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    Ok(apply_config_file(Config::default(), parsed))
}

fn apply_config_file(mut config: Config, parsed: ConfigFile) -> Config {
    if let Some(theme_name) = parsed.theme.as_deref() {
        match Theme::by_name(theme_name) {
            Some(theme) => config.theme = theme,
            None => warn!(theme = theme_name; "Unknown theme; keeping the default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_stroke {
            config.theme.node_stroke = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.engine {
            config.layout.engine = v;
        }
        if let Some(v) = layout.column_separation {
            config.layout.column_separation = v;
        }
        if let Some(v) = layout.inter_layer_separation {
            config.layout.inter_layer_separation = v;
        }
        if let Some(v) = layout.column_alignment {
            config.layout.column_alignment = v;
        }
        if let Some(v) = layout.vertical_extent {
            config.render.vertical_extent = v;
        }
    }

    if let Some(canvas) = parsed.canvas {
        if let Some(v) = canvas.width {
            config.render.width = v;
        }
        if let Some(v) = canvas.height {
            config.render.height = v;
        }
        if let Some(margins) = canvas.margins {
            let current = &mut config.render.margins;
            current.left = margins.left.unwrap_or(current.left);
            current.top = margins.top.unwrap_or(current.top);
            current.right = margins.right.unwrap_or(current.right);
            current.bottom = margins.bottom.unwrap_or(current.bottom);
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_canvas() {
        let config = Config::default();
        assert_eq!(config.render.width, 1600.0);
        assert_eq!(config.render.height, 1600.0);
        assert_eq!(config.render.margins, Margins::default());
        assert_eq!(config.layout.column_separation, 1.0);
        assert_eq!(config.layout.inter_layer_separation, 0.2);
        assert_eq!(config.render.vertical_extent, VerticalExtent::Width);
    }

    #[test]
    fn json5_overrides_are_applied() {
        let config = parse_config(
            r##"{
                // comments and trailing commas are fine
                theme: "modern",
                themeVariables: { fontSize: 20, lineColor: "#ff0000" },
                layout: { engine: "dagre", columnAlignment: "top", verticalExtent: "height" },
                canvas: { width: 800, margins: { right: 50 } },
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.font_family, Theme::modern().font_family);
        assert_eq!(config.theme.font_size, 20.0);
        assert_eq!(config.theme.line_color, "#ff0000");
        assert_eq!(config.layout.engine, EngineKind::Dagre);
        assert_eq!(config.layout.column_alignment, ColumnAlignment::Top);
        assert_eq!(config.render.vertical_extent, VerticalExtent::Height);
        assert_eq!(config.render.width, 800.0);
        assert_eq!(config.render.height, 1600.0);
        assert_eq!(config.render.margins.right, 50.0);
        assert_eq!(config.render.margins.left, 100.0);
    }

    #[test]
    fn unknown_theme_keeps_default() {
        let config = parse_config(r#"{ "theme": "neon" }"#).unwrap();
        assert_eq!(config.theme, Theme::notemap_default());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_config(Some(Path::new("/definitely/not/here.json5"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        assert!(parse_config("{ layout: ").is_err());
        assert!(parse_config(r#"{ layout: { engine: "spring" } }"#).is_err());
    }
}
