use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bag_blueprint::{ExportConfig, ExportJob, Exporter};
use bag_core::{BagDimensions, DesignRecord, Size, calculate, limits, render};
use clap::{Args, Parser, Subcommand};
use fonts::FontConfig;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(version, about = "Paper bag die-line calculator and print exporter")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print calculated dimensions as JSON
    Calc {
        length: f64,
        width: f64,
        /// Tabside height
        height: f64,
        /// Inputs are inches instead of millimeters
        #[arg(long)]
        inches: bool,
    },
    /// Write the blueprint SVG for a design
    Svg {
        design: PathBuf,
        output: PathBuf,
        /// Clamp out-of-range dimensions instead of failing
        #[arg(long)]
        clamp: bool,
    },
    /// Render a PNG preview of the blueprint
    Png {
        design: PathBuf,
        output: PathBuf,
        #[arg(long, default_value_t = 4.0)]
        px_per_mm: f64,
        #[arg(long)]
        clamp: bool,
    },
    /// Export the print-ready PDF
    Pdf(PdfArgs),
}

#[derive(Args, Debug)]
struct PdfArgs {
    design: PathBuf,
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// On-screen width of the diagram container the overlays were placed in
    #[arg(long)]
    container_width: Option<f64>,
    #[arg(long)]
    container_height: Option<f64>,
    /// Container pixels per millimeter when no container size is given
    #[arg(long, default_value_t = 1.0)]
    px_per_mm: f64,
    #[arg(long, default_value_t = 2.0)]
    margin_in: f64,
    #[arg(long, default_value_t = 4)]
    supersample: u32,
    /// Extra font file; repeatable
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,
    #[arg(long)]
    no_system_fonts: bool,
    /// Report text that cannot be rasterized instead of placing native text
    #[arg(long)]
    no_text_fallback: bool,
    #[arg(long)]
    clamp: bool,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_design(path: &Path, clamp: bool) -> Result<DesignRecord> {
    let txt = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut record =
        DesignRecord::from_json(&txt).with_context(|| format!("parsing {}", path.display()))?;
    if let Err(e) = limits::validate(&record.dimensions) {
        if !clamp {
            bail!("{e} (pass --clamp to clamp into range)");
        }
        warn!(error = %e, "clamping dimensions");
        record.dimensions = limits::clamp(&record.dimensions);
    }
    Ok(record)
}

fn run_calc(length: f64, width: f64, height: f64, inches: bool) -> Result<()> {
    let d = if inches {
        BagDimensions::from_inches(length, width, height)
    } else {
        BagDimensions::new(length, width, height)
    };
    if let Err(e) = limits::validate(&d) {
        warn!(error = %e, "dimensions outside the supported range");
    }
    println!("{}", serde_json::to_string_pretty(&calculate(&d))?);
    Ok(())
}

fn run_pdf(args: PdfArgs) -> Result<()> {
    let record = load_design(&args.design, args.clamp)?;
    let dims = record.dimensions;
    let blueprint = render(&dims, &calculate(&dims), None);
    let overlays = record.overlays()?;
    let container = Size {
        width: args
            .container_width
            .unwrap_or(blueprint.frame.width * args.px_per_mm),
        height: args
            .container_height
            .unwrap_or(blueprint.frame.height * args.px_per_mm),
    };

    let config = ExportConfig {
        margin_in: args.margin_in,
        supersample: args.supersample,
        text_fallback: !args.no_text_fallback,
        fonts: FontConfig {
            system_fonts: !args.no_system_fonts,
            files: args.fonts,
            ..FontConfig::default()
        },
        ..ExportConfig::default()
    };
    let exporter = Exporter::new(config);
    let job = ExportJob::from_blueprint(&blueprint, container, overlays.as_slice());
    let (path, outcome) = exporter
        .export_to(&job, &args.out_dir)
        .context("export failed")?;

    for f in &outcome.failures {
        warn!(index = f.index, id = %f.id, error = %f.error, "overlay not exported");
    }
    info!(
        placed = outcome.placed.len(),
        failed = outcome.failures.len(),
        width_in = outcome.layout.page_width_in,
        height_in = outcome.layout.page_height_in,
        "done"
    );
    println!("{}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Command::Calc {
            length,
            width,
            height,
            inches,
        } => run_calc(length, width, height, inches),
        Command::Svg {
            design,
            output,
            clamp,
        } => {
            let record = load_design(&design, clamp)?;
            let d = record.dimensions;
            let blueprint = render(&d, &calculate(&d), None);
            fs::write(&output, blueprint.svg)
                .with_context(|| format!("writing {}", output.display()))?;
            info!(path = %output.display(), "blueprint SVG written");
            Ok(())
        }
        Command::Png {
            design,
            output,
            px_per_mm,
            clamp,
        } => {
            let record = load_design(&design, clamp)?;
            let d = record.dimensions;
            let blueprint = render(&d, &calculate(&d), None);
            let exporter = Exporter::new(ExportConfig::default());
            let png = exporter.preview_png(&blueprint, px_per_mm)?;
            fs::write(&output, png).with_context(|| format!("writing {}", output.display()))?;
            info!(path = %output.display(), "blueprint PNG written");
            Ok(())
        }
        Command::Pdf(args) => run_pdf(args),
    }
}
