#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod coords;
pub mod curve;
pub mod error;
pub mod hierarchy;
pub mod layout;
pub mod layout_dump;
pub mod outline;
pub mod render;
pub mod text_metrics;
pub mod theme;

use log::info;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use coords::{LayoutContext, ScreenCoord};
pub use error::{Error, Result};
pub use hierarchy::Hierarchy;
pub use layout::{Layout, compute_layout, measure_labels};
pub use outline::{HierarchyRecord, OutlineEntry, normalize, parse_outline};
pub use render::render_svg;
pub use theme::Theme;

use text_metrics::{EstimatedMeasurer, SystemFontMeasurer, TextMeasurer};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    /// Estimate label widths from per-character factors instead of loading
    /// system fonts.
    pub fast_text: bool,
}

impl RenderOptions {
    pub fn notemap_default() -> Self {
        Self::default()
    }

    pub fn modern() -> Self {
        Self {
            theme: Theme::modern(),
            ..Self::default()
        }
    }

    pub fn with_fast_text(mut self, fast_text: bool) -> Self {
        self.fast_text = fast_text;
        self
    }

    fn measurer(&self) -> Box<dyn TextMeasurer> {
        if self.fast_text {
            Box::new(EstimatedMeasurer)
        } else {
            Box::new(SystemFontMeasurer)
        }
    }
}

impl From<Config> for RenderOptions {
    fn from(config: Config) -> Self {
        Self {
            theme: config.theme,
            layout: config.layout,
            render: config.render,
            fast_text: false,
        }
    }
}

/// Every stage of one render.
#[derive(Debug, Clone)]
pub struct Diagram {
    pub hierarchy: Hierarchy,
    pub layout: Layout,
    pub context: LayoutContext,
    pub svg: String,
}

impl Diagram {
    /// Runs hierarchy → measure → layout → screen mapping → SVG.
    pub fn from_records(records: &[HierarchyRecord], options: &RenderOptions) -> Result<Self> {
        Self::from_records_with(records, options, options.measurer().as_ref())
    }

    /// Same as [`Diagram::from_records`] with an explicit text measurer.
    pub fn from_records_with(
        records: &[HierarchyRecord],
        options: &RenderOptions,
        measurer: &dyn TextMeasurer,
    ) -> Result<Self> {
        let hierarchy = Hierarchy::build(records)?;
        info!(nodes = hierarchy.len(), roots = hierarchy.roots().len(); "Hierarchy ready");

        let measured = measure_labels(&hierarchy, measurer, &options.theme.label_font());
        let layout = compute_layout(&hierarchy, &measured, &options.layout);
        let context = LayoutContext::from_config(&layout, &options.render);
        let svg = render_svg(&layout, &context, &options.theme);
        Ok(Self {
            hierarchy,
            layout,
            context,
            svg,
        })
    }

    /// Decodes and renders a YAML outline.
    pub fn from_outline(source: &str, options: &RenderOptions) -> Result<Self> {
        let entries = parse_outline(source)?;
        let records = normalize(&entries)?;
        Self::from_records(&records, options)
    }
}

/// Renders a YAML outline to an SVG document.
pub fn render_outline(source: &str, options: &RenderOptions) -> Result<String> {
    Diagram::from_outline(source, options).map(|diagram| diagram.svg)
}
