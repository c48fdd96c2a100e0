use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use whitted::consts::{ DEFAULT_MAX_BOUNCES, DEFAULT_SEED };
use whitted::scene::Scene;
use whitted::{ imageio, parallel };

/// Renders a JSON scene description to an image.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// The JSON scene to render.
    scene: PathBuf,

    /// Output image. `.ppm` is written as plain PPM, `.png` and `.jpg` via
    /// the image encoder.
    #[clap(default_value = "output.png")]
    output: PathBuf,

    /// Reflection and refraction bounces per primary ray.
    #[clap(short, long, default_value_t = DEFAULT_MAX_BOUNCES)]
    bounces: usize,

    /// Worker threads, one per logical CPU when omitted.
    #[clap(short, long)]
    threads: Option<usize>,

    /// Seed for area light jitter.
    #[clap(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Render on the calling thread only.
    #[clap(long)]
    serial: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let Scene { world, mut camera } = Scene::load(&args.scene)
        .with_context(|| format!("failed to load scene {}", args.scene.display()))?;
    camera.max_bounces = args.bounces;
    camera.seed = args.seed;

    info!("loaded {} with {} shapes", args.scene.display(), world.shapes().len());

    let canvas = if args.serial {
        camera.render(&world)
    } else {
        parallel::render(&camera, &world, args.threads)
            .context("failed to start render threads")?
    };

    imageio::save(&canvas, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!("wrote {}", args.output.display());

    Ok(())
}
