use serde::{Deserialize, Serialize};

use crate::text_metrics::Font;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub node_fill: String,
    pub node_stroke: String,
    pub node_stroke_width: f32,
    pub text_color: String,
    pub line_color: String,
    pub line_width: f32,
    pub background: String,
}

impl Theme {
    pub fn notemap_default() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 16.0,
            node_fill: "#ECECFF".to_string(),
            node_stroke: "#9370DB".to_string(),
            node_stroke_width: 1.0,
            text_color: "#333333".to_string(),
            line_color: "#333333".to_string(),
            line_width: 1.5,
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            node_fill: "#F8FAFF".to_string(),
            node_stroke: "#C7D2E5".to_string(),
            node_stroke_width: 1.2,
            text_color: "#1C2430".to_string(),
            line_color: "#7A8AA6".to_string(),
            line_width: 1.4,
            background: "#FFFFFF".to_string(),
        }
    }

    /// Looks a preset up by name. `base` and `default` are aliases.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "modern" => Some(Self::modern()),
            "default" | "base" | "notemap" => Some(Self::notemap_default()),
            _ => None,
        }
    }

    /// Font used both to measure and to draw labels.
    pub fn label_font(&self) -> Font {
        Font::new(self.font_family.clone(), self.font_size)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::notemap_default()
    }
}
