use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixel_reduce::{
    extract_palette_strip, restore_pixel_art, CentroidDownscaler, Denoiser, Dithering,
    GridDetector, PaletteMapper, PaletteSizer,
};
use pixelsmith::models::AppConfig;
use pixelsmith::services::{
    image_io, palettize_files, resolve_policy, PaletteFetcher, PaletteSource,
};

#[derive(Parser)]
#[command(name = "pixelsmith")]
#[command(about = "Pixel-art restoration and palette reduction for PNG images")]
struct Cli {
    /// YAML configuration file (defaults to $CONFIG_FILE)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip oxipng re-compression of written PNGs
    #[arg(long, global = true)]
    no_optimize: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the pixel grid of an upscaled image
    Detect {
        input: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Downscale by majority color per tile
    Downscale {
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(long)]
        width: usize,

        #[arg(long)]
        height: usize,

        /// Colors clustered per tile (defaults to config)
        #[arg(long)]
        centroids: Option<usize>,
    },
    /// Detect the grid, downscale to native size and reduce colors
    Restore {
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Remove color speckles
    Denoise {
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        denoise: DenoiseArgs,
    },
    /// Suggest a palette size for an image
    BestK {
        input: PathBuf,

        /// Largest palette considered (defaults to config)
        #[arg(long)]
        max_k: Option<usize>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reduce the colors of one or more images
    Palettize {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory for the output PNGs
        #[arg(long, default_value = "palettized")]
        out_dir: PathBuf,

        /// Fixed number of colors
        #[arg(long, group = "source")]
        colors: Option<usize>,

        /// Pick the number of colors per image (the default without a source)
        #[arg(long, group = "source")]
        auto: bool,

        /// Use the colors of a local PNG
        #[arg(long, group = "source")]
        palette: Option<PathBuf>,

        /// Use the colors of a PNG at this URL
        #[arg(long, group = "source")]
        palette_url: Option<String>,

        /// Largest palette for automatic sizing (defaults to config)
        #[arg(long)]
        max_k: Option<usize>,

        /// Bayer matrix order (2, 4, 8, ...); enables dithering
        #[arg(long)]
        dither_order: Option<usize>,

        /// Dither strength (defaults to config)
        #[arg(long)]
        dither_strength: Option<f64>,

        /// Denoise before reducing
        #[arg(long)]
        denoise: bool,

        #[command(flatten)]
        denoise_args: DenoiseArgs,
    },
    /// Sample a palette from a horizontal color strip
    PaletteStrip {
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Number of cells in the strip
        #[arg(long)]
        colors: usize,
    },
}

#[derive(Args)]
struct DenoiseArgs {
    /// Required neighborhood support, 0 to 10 (defaults to config)
    #[arg(long)]
    smoothing: Option<f64>,

    /// Neighborhood quantization coarseness (defaults to config)
    #[arg(long)]
    intensity: Option<f64>,
}

impl DenoiseArgs {
    fn denoiser(&self, config: &AppConfig) -> anyhow::Result<Denoiser> {
        let smoothing = self.smoothing.unwrap_or(config.palettize.smoothing);
        let strength = self.intensity.unwrap_or(config.palettize.denoise_strength);
        Ok(Denoiser::new(smoothing, strength)?)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixelsmith=info,pixel_reduce=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("CONFIG_FILE").ok().map(PathBuf::from));
    let config = AppConfig::load(config_path.as_deref());
    let optimize = config.output.optimize && !cli.no_optimize;

    match cli.command {
        Commands::Detect { input, json } => run_detect(&input, json),
        Commands::Downscale {
            input,
            output,
            width,
            height,
            centroids,
        } => {
            let image = image_io::read_png(&input)?;
            let centroids = centroids.unwrap_or(config.downscale.centroids);
            let small = CentroidDownscaler::new().downscale(&image, width, height, centroids)?;
            image_io::save_image(&output, &small, optimize)?;
            tracing::info!(
                output = %output.display(),
                width,
                height,
                centroids,
                "Downscaled image"
            );
            Ok(())
        }
        Commands::Restore { input, output } => {
            let image = image_io::read_png(&input)?;
            let restored = restore_pixel_art(&image)?;
            image_io::save_reduced(&output, &restored.image, optimize)?;
            tracing::info!(
                output = %output.display(),
                width = restored.image.width(),
                height = restored.image.height(),
                colors = restored.color_count,
                "Restored pixel art"
            );
            Ok(())
        }
        Commands::Denoise {
            input,
            output,
            denoise,
        } => {
            let image = image_io::read_png(&input)?;
            let clean = denoise.denoiser(&config)?.denoise(&image)?;
            image_io::save_image(&output, &clean, optimize)?;
            tracing::info!(output = %output.display(), "Denoised image");
            Ok(())
        }
        Commands::BestK {
            input,
            max_k,
            json,
        } => run_best_k(&input, max_k.unwrap_or(config.palettize.max_k), json),
        Commands::Palettize {
            inputs,
            out_dir,
            colors,
            auto,
            palette,
            palette_url,
            max_k,
            dither_order,
            dither_strength,
            denoise,
            denoise_args,
        } => {
            let max_k = max_k.unwrap_or(config.palettize.max_k);
            let source = PaletteSource::select(colors, auto, palette, palette_url, max_k);

            let fetcher = PaletteFetcher::new(Duration::from_secs(config.fetch.timeout_secs))?;
            let policy = resolve_policy(&source, &fetcher, max_k)?;

            let dithering = Dithering::from_order(dither_order.or(config.palettize.dither_order));
            let mut mapper = PaletteMapper::new(policy)
                .dithering(dithering)
                .dither_strength(dither_strength.unwrap_or(config.palettize.dither_strength));
            if denoise || config.palettize.denoise {
                mapper = mapper.denoise(denoise_args.denoiser(&config)?);
            }

            let report = palettize_files(&inputs, &out_dir, &mapper, optimize)?;
            if !report.is_success() {
                anyhow::bail!(
                    "{} of {} images failed",
                    report.failed.len(),
                    inputs.len()
                );
            }
            Ok(())
        }
        Commands::PaletteStrip {
            input,
            output,
            colors,
        } => {
            let image = image_io::read_png(&input)?;
            let (strip, palette) = extract_palette_strip(&image, colors)?;
            image_io::save_image(&output, &strip, optimize)?;
            let hex: Vec<String> = palette.colors().iter().map(|c| c.to_hex()).collect();
            println!("{}", hex.join(","));
            Ok(())
        }
    }
}

fn run_detect(input: &Path, json: bool) -> anyhow::Result<()> {
    let image = image_io::read_png(input)?;
    let spacing = GridDetector::new().detect(&image)?;
    let (width, height) = spacing.target_size(image.width(), image.height());

    if json {
        let value = serde_json::json!({
            "cell_width": spacing.cell_width,
            "cell_height": spacing.cell_height,
            "width": width,
            "height": height,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!(
            "cell {}x{}, native size {}x{}",
            spacing.cell_width, spacing.cell_height, width, height
        );
    }
    Ok(())
}

fn run_best_k(input: &Path, max_k: usize, json: bool) -> anyhow::Result<()> {
    let image = image_io::read_png(input)?;
    let best = PaletteSizer::new().best_color_count_with_progress(&image, max_k, |done, total| {
        tracing::debug!(done, total, "Distortion sample");
    })?;

    if json {
        let value = serde_json::json!({ "best_k": best, "max_k": max_k });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{best}");
    }
    Ok(())
}
