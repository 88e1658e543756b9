//! Label width measurement.
//!
//! [`TextMeasurer`] is the capability the layout pipeline needs. The
//! [`SystemFontMeasurer`] resolves real fonts through `fontdb` and sums
//! glyph advances with `ttf-parser`; [`EstimatedMeasurer`] and
//! [`FixedWidthMeasurer`] are deterministic and never touch the file system.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Mutex;
use ttf_parser::Face;

static FONT_CACHE: Lazy<Mutex<FontCache>> = Lazy::new(|| Mutex::new(FontCache::new()));

/// Font used to render (and therefore measure) labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: f32,
}

impl Font {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

pub trait TextMeasurer {
    /// Rendered width of `text` in pixels.
    fn measure(&self, text: &str, font: &Font) -> f32;
}

/// Measures with the glyph advances of an installed font matching the
/// family list, falling back to [`EstimatedMeasurer`] when none is found.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFontMeasurer;

impl TextMeasurer for SystemFontMeasurer {
    fn measure(&self, text: &str, font: &Font) -> f32 {
        measure_text_width(text, font.size, &font.family)
            .unwrap_or_else(|| EstimatedMeasurer.measure(text, font))
    }
}

/// Per-character width estimates calibrated for common sans-serif faces.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedMeasurer;

impl TextMeasurer for EstimatedMeasurer {
    fn measure(&self, text: &str, font: &Font) -> f32 {
        if font.size <= 0.0 {
            return 0.0;
        }
        text.chars().map(char_width_factor).sum::<f32>() * font.size
    }
}

/// Every character is `char_width` pixels wide, whatever the font.
#[derive(Debug, Clone, Copy)]
pub struct FixedWidthMeasurer {
    pub char_width: f32,
}

impl FixedWidthMeasurer {
    pub fn new(char_width: f32) -> Self {
        Self { char_width }
    }
}

impl TextMeasurer for FixedWidthMeasurer {
    fn measure(&self, text: &str, _font: &Font) -> f32 {
        text.chars().count() as f32 * self.char_width
    }
}

pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = FONT_CACHE.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

fn char_width_factor(ch: char) -> f32 {
    // Relative advance widths at 1px, measured on Helvetica/Arial metrics.
    match ch {
        ' ' => 0.278,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.3,
        'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 0.667,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' => 0.722,
        'F' | 'T' | 'Z' => 0.611,
        'G' | 'O' | 'Q' => 0.778,
        'I' => 0.278,
        'J' => 0.5,
        'L' => 0.556,
        'M' => 0.833,
        'W' => 0.944,
        'f' | 't' => 0.278,
        'i' | 'j' | 'l' => 0.222,
        'm' => 0.833,
        'r' => 0.333,
        'w' => 0.722,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 0.5,
        'a'..='z' | '0'..='9' => 0.556,
        '@' => 1.015,
        '#' | '%' | '&' => 0.889,
        _ if ch.is_ascii() => 0.556,
        // CJK and other wide scripts
        _ => 1.0,
    }
}

struct FontCache {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FontFace>>,
}

impl FontCache {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let family_key = normalize_family_key(font_family);
        if !self.faces.contains_key(&family_key) {
            let face = self.load_face(font_family);
            if face.is_none() {
                warn!(font_family = font_family; "No installed font matches; estimating label widths");
            }
            self.faces.insert(family_key.clone(), face);
        }
        let face = self.faces.get_mut(&family_key)?.as_mut()?;
        let normalized = text.replace('\t', "    ");
        face.measure_width(&normalized, font_size)
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let family_key = normalize_family_key(font_family);
        if let Some(face) = load_cached_face(&family_key) {
            debug!(font_family = font_family; "Loaded font face from disk cache");
            return Some(face);
        }

        #[derive(Clone, Copy)]
        enum FamilyToken {
            Generic(Family<'static>),
            Name(usize),
        }

        let mut names: Vec<String> = Vec::new();
        let mut order: Vec<FamilyToken> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => order.push(FamilyToken::Generic(Family::Serif)),
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    order.push(FamilyToken::Generic(Family::SansSerif))
                }
                "monospace" | "ui-monospace" => {
                    order.push(FamilyToken::Generic(Family::Monospace))
                }
                "cursive" => order.push(FamilyToken::Generic(Family::Cursive)),
                "fantasy" => order.push(FamilyToken::Generic(Family::Fantasy)),
                _ => {
                    order.push(FamilyToken::Name(names.len()));
                    names.push(raw.to_string());
                }
            }
        }
        if order.is_empty() {
            order.push(FamilyToken::Generic(Family::SansSerif));
        }

        let families: Vec<Family<'_>> = order
            .iter()
            .map(|token| match *token {
                FamilyToken::Generic(family) => family,
                FamilyToken::Name(idx) => Family::Name(names[idx].as_str()),
            })
            .collect();

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
            debug!(faces = self.db.len(); "System fonts loaded");
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut loaded: Option<FontFace> = None;
        self.db.with_face_data(id, |data, index| {
            if let Some(face) = FontFace::parse(data.to_vec(), index) {
                store_cached_face(&family_key, data, index);
                loaded = Some(face);
            }
        });
        loaded
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
    advance_cache: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph_id) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph_id).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            advance_cache: HashMap::new(),
        })
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> Option<f32> {
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * 0.56;

        if text.is_ascii() {
            let width: f32 = text
                .bytes()
                .filter(|byte| *byte != b'\n')
                .map(|byte| match self.ascii_advances[byte as usize] {
                    0 => fallback,
                    advance => advance as f32 * scale,
                })
                .sum();
            return Some(width.max(0.0));
        }

        let face = Face::parse(&self.data, self.index).ok()?;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = *self.advance_cache.entry(ch).or_insert_with(|| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
            });
            width += match advance {
                Some(advance) => advance as f32 * scale,
                None => fallback,
            };
        }
        Some(width.max(0.0))
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

fn cache_paths(family_key: &str) -> Option<(PathBuf, PathBuf)> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))?;
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    family_key.hash(&mut hasher);
    let hash = hasher.finish();
    let dir = base.join("notemap").join("font-cache");
    Some((
        dir.join(format!("{hash:x}.font")),
        dir.join(format!("{hash:x}.meta")),
    ))
}

fn load_cached_face(family_key: &str) -> Option<FontFace> {
    let (font_path, meta_path) = cache_paths(family_key)?;
    if !font_path.exists() || !meta_path.exists() {
        return None;
    }
    let bytes = fs::read(font_path).ok()?;
    let index: u32 = fs::read_to_string(meta_path).ok()?.trim().parse().ok()?;
    FontFace::parse(bytes, index)
}

fn store_cached_face(family_key: &str, data: &[u8], index: u32) {
    let Some((font_path, meta_path)) = cache_paths(family_key) else {
        return;
    };
    if font_path.exists() {
        return;
    }
    if let Some(parent) = font_path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    // Cache writes are best effort.
    let _ = fs::write(&font_path, data);
    let _ = fs::write(&meta_path, index.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_counts_characters() {
        let measurer = FixedWidthMeasurer::new(10.0);
        let font = Font::new("anything", 99.0);
        assert_eq!(measurer.measure("abc", &font), 30.0);
        assert_eq!(measurer.measure("", &font), 0.0);
        assert_eq!(measurer.measure("ñé", &font), 20.0);
    }

    #[test]
    fn estimate_scales_with_font_size() {
        let w16 = EstimatedMeasurer.measure("Hello", &Font::new("sans-serif", 16.0));
        let w32 = EstimatedMeasurer.measure("Hello", &Font::new("sans-serif", 32.0));
        assert!(w16 > 0.0);
        assert!((w32 - w16 * 2.0).abs() < 0.01);
    }

    #[test]
    fn estimate_orders_narrow_and_wide_text() {
        let font = Font::new("sans-serif", 16.0);
        assert!(EstimatedMeasurer.measure("iiii", &font) < EstimatedMeasurer.measure("WWWW", &font));
    }

    #[test]
    fn every_character_has_positive_width() {
        for ch in ['a', 'Z', ' ', '0', '@', '\u{4e2d}', '~'] {
            assert!(char_width_factor(ch) > 0.0, "char {ch:?} has zero width");
        }
    }

    #[test]
    fn system_measurer_is_non_negative_and_empty_is_zero() {
        let font = Font::new("sans-serif", 16.0);
        assert_eq!(SystemFontMeasurer.measure("", &font), 0.0);
        assert!(SystemFontMeasurer.measure("Notes", &font) > 0.0);
    }
}
