use crate::config::{Config, load_config};
use crate::layout::EngineKind;
use crate::layout_dump::write_layout_dump;
use crate::outline::{OutlineEntry, normalize, parse_outline};
use crate::render::write_output_svg;
use crate::{Diagram, RenderOptions};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "notemap", version, about = "Render a YAML note outline as a left-to-right mindmap")]
pub struct Args {
    /// Outline file (.yaml) or '-' for stdin. Repeat to join several outlines.
    #[arg(short = 'i', long = "input", default_value = "notes.yaml")]
    pub inputs: Vec<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "output-format", alias = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON5 file (theme, themeVariables, layout, canvas)
    #[arg(short = 'c', long = "config-file", alias = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Canvas height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Layout engine
    #[arg(long = "engine", value_enum)]
    pub engine: Option<EngineKind>,

    /// Estimate label widths instead of loading system fonts
    #[arg(long = "fast-text")]
    pub fast_text: bool,

    /// Write the computed layout as JSON to this path
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "warn")]
    pub log_level: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run(args: &Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args);

    let entries = read_outlines(&args.inputs)?;
    let records = normalize(&entries)?;
    info!(inputs = args.inputs.len(), entries = entries.len(); "Outline loaded");

    let options = RenderOptions::from(config).with_fast_text(args.fast_text);
    let diagram = Diagram::from_records(&records, &options)?;

    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &diagram.layout, &diagram.context)
            .with_context(|| format!("failed to write layout dump {}", path.display()))?;
    }

    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&diagram.svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&diagram.svg, &output, &options)?;
        }
    }
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if let Some(engine) = args.engine {
        config.layout.engine = engine;
    }
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, options: &RenderOptions) -> Result<()> {
    crate::render::write_output_png(svg, output, &options.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _options: &RenderOptions) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

/// Reads and decodes every input fully, in argument order, before anything
/// is laid out. The outlines are joined into a single forest.
fn read_outlines(paths: &[PathBuf]) -> Result<Vec<OutlineEntry>> {
    let mut entries = Vec::new();
    for path in paths {
        let source = read_input(path)?;
        let parsed = parse_outline(&source)
            .with_context(|| format!("failed to parse outline {}", path.display()))?;
        entries.extend(parsed);
    }
    Ok(entries)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        return read_stdin(io::stdin().lock());
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_stdin(mut reader: impl Read) -> Result<String> {
    let mut buf = String::new();
    reader
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}
