use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mandelbrot_explorer::{Complex, Explorer, ExplorerConfig, PaletteKind, write_ppm};

/// Renders one Mandelbrot frame and writes it as a PPM image.
#[derive(Debug, Parser)]
#[command(name = "mandelbrot-explorer", version, about)]
struct Cli {
    /// JSON config file; command-line options override it.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    /// Palette id or display name, e.g. `fire` or "Ocean Waves".
    #[arg(long)]
    palette: Option<PaletteKind>,
    /// Magnification relative to the default view.
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,
    #[arg(long, allow_hyphen_values = true)]
    center_re: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    center_im: Option<f64>,
    /// Quality steps to add to (or, if negative, remove from) the automatic budget.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    iterations_step: i32,
    #[arg(long, default_value = "output/mandelbrot.ppm")]
    output: PathBuf,
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    run(&Cli::parse())
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => ExplorerConfig::load(path)?,
        None => ExplorerConfig::default(),
    };

    if let Some(width) = cli.width {
        config.viewport.width = width;
    }
    if let Some(height) = cli.height {
        config.viewport.height = height;
    }
    if let Some(palette) = cli.palette {
        config.palette.initial = palette;
    }

    let mut explorer = Explorer::new(&config)?;
    let center = Complex::new(
        cli.center_re.unwrap_or(config.viewport.center_re),
        cli.center_im.unwrap_or(config.viewport.center_im),
    );
    explorer.set_view(center, cli.zoom)?;

    if cli.iterations_step != 0 {
        explorer.adjust_iterations(cli.iterations_step);
    }

    let frame = explorer.wait_for_frame(Duration::from_secs(cli.timeout_secs))?;
    write_ppm(&frame.pixel_buffer, &cli.output)?;

    let stats = explorer.info();
    info!(
        path = %cli.output.display(),
        width = stats.width,
        height = stats.height,
        zoom = stats.zoom_factor,
        iterations = frame.request.max_iterations,
        palette = stats.palette_name,
        workers = explorer.workers(),
        duration_ms = frame.render_duration.as_secs_f64() * 1000.0,
        "frame written"
    );

    Ok(())
}
