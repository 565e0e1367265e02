use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod scene;

use scene::Scene;

#[derive(Parser, Debug)]
#[command(name = "trirast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a scene file to a PNG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Rasterize row bands on a rayon pool.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Rows per band (parallel mode only).
    #[arg(long, default_value_t = 16)]
    rows_per_band: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let scene = Scene::from_path(&args.in_path)?;
    let settings = trirast::RenderSettings {
        threading: trirast::RenderThreading {
            parallel: args.parallel,
            threads: args.threads,
            rows_per_band: args.rows_per_band,
        },
    };

    let mut pipeline = trirast::Pipeline::new(scene.width, scene.height, settings)?;
    let stats = pipeline
        .render(
            &scene.draw_call(),
            &scene.vertex_shader,
            &scene.fragment_shader,
            &scene.uniforms(),
        )
        .with_context(|| format!("render scene '{}'", args.in_path.display()))?;
    tracing::info!(
        triangles = stats.triangles_rasterized,
        fragments = stats.fragments_shaded,
        "rendered"
    );

    let fb = pipeline.framebuffer();
    let width = u32::try_from(fb.width()).context("image width exceeds u32")?;
    let height = u32::try_from(fb.height()).context("image height exceeds u32")?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &fb.to_rgba8_flipped(),
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
