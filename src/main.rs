use chrono::Datelike;
use clap::{Parser, Subcommand};
use framemark::imaging::{EstimatedTextMeasure, JsonRenderer, RustBackend};
use framemark::layout::Preset;
use framemark::process::{self, ImagePlan, PlanContext};
use framemark::{config, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let hash = env!("FRAMEMARK_GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup; called exactly once
        Box::leak(format!("{}@{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "framemark")]
#[command(about = "Plan framed, captioned exports of your photos")]
#[command(long_about = "\
Plan framed, captioned exports of your photos

framemark reads each photo's EXIF block, resolves the camera, lens and
exposure settings, and computes where everything goes on the exported
canvas:

  +--------------- canvas ---------------+
  |   +---------- scaled photo -------+  |
  |   |                               |  |
  |   +-------------------------------+  |
  |   NIKON Z 6 NIKKOR Z  [logo] (c) 2024|
  |   50mm F4  1/250s  ISO400            |
  +--------------------------------------+

Plans are emitted as JSON for a renderer to draw. Layout styles are
presets (classic, full-bleed, gallery) or a [layout] table in config.toml.

Logging goes to stderr; set RUST_LOG=debug for per-image details.

Run 'framemark gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Configuration file (missing file = stock defaults)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Shared flags for commands that compute layouts.
#[derive(clap::Args, Clone)]
struct LayoutArgs {
    /// Layout preset, overriding [layout] from the config file
    #[arg(long)]
    preset: Option<Preset>,
}

#[derive(Subcommand)]
enum Command {
    /// Plan every file and emit the plans as JSON
    Plan {
        /// Photos to plan
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Write a pretty JSON array here instead of JSON lines on stdout
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
    /// Show resolved metadata, caption and layout for one photo
    Inspect {
        file: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Plan {
            files,
            layout,
            manifest,
        } => {
            let framemark_config = config::load_config(&cli.config)?;
            init_thread_pool(&framemark_config.processing);
            let ctx = plan_context(&framemark_config, &cli.config, &layout);

            let placeholder = framemark_config.annotation.placeholder.clone();
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_plan_event(&event, &placeholder) {
                        eprintln!("{}", line);
                    }
                }
            });
            let results = process::plan_batch(
                &RustBackend::new(),
                &EstimatedTextMeasure::default(),
                &files,
                &ctx,
                Some(tx),
            );
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            let total = results.len();
            let plans: Vec<ImagePlan> = results.into_iter().filter_map(Result::ok).collect();
            let failed = total - plans.len();

            match manifest {
                Some(path) => {
                    process::write_manifest(&path, &plans)?;
                    eprintln!("Manifest: {}", path.display());
                }
                None => {
                    let renderer = JsonRenderer::new(std::io::stdout());
                    process::render_plans(&renderer, &plans)?;
                }
            }
            eprintln!("{}", output::format_plan_summary(plans.len(), failed));

            if failed > 0 {
                return Err(format!("{failed} of {total} images could not be planned").into());
            }
        }
        Command::Inspect { file, layout } => {
            let framemark_config = config::load_config(&cli.config)?;
            let ctx = plan_context(&framemark_config, &cli.config, &layout);
            let plan = process::plan_image(
                &RustBackend::new(),
                &EstimatedTextMeasure::default(),
                &file,
                &ctx,
            )?;
            output::print_inspect(&plan);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install an env-filtered fmt subscriber on stderr; stdout carries plans.
///
/// Defaults to `warn` when `RUST_LOG` is unset.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: logging disabled: {e}");
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Build the planning context: logo paths resolve next to the config file,
/// the copyright year is the current local year.
fn plan_context(
    framemark_config: &config::FramemarkConfig,
    config_path: &Path,
    layout: &LayoutArgs,
) -> PlanContext {
    let asset_root = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let year = chrono::Local::now().year();
    let ctx = PlanContext::new(framemark_config, asset_root, year);
    match layout.preset {
        Some(preset) => ctx.with_policy(preset.policy()),
        None => ctx,
    }
}
