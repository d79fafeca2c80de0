use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use brewscroll::frames::FrameStore;
use brewscroll::manifest::{load_and_validate_scene, resolved_sequence};
use brewscroll::overlay::{overlay_states, scroll_hint_visible};
use brewscroll::renderer::FrameRenderer;
use brewscroll::schema::Section;
use brewscroll::scroll::frame_index;
use brewscroll::text::TextCompositor;
use brewscroll::viewport::{DeviceClass, Viewport};

#[derive(Debug, Parser)]
#[command(name = "brewscroll")]
#[command(about = "Scroll-scrubbed frame-sequence engine for the Brewed landing experience")]
#[command(version = version_string())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a scene manifest and print a summary.
    Check { scene: PathBuf },
    /// Render a still at a given scroll progress and write it as PNG.
    Render {
        scene: PathBuf,
        #[arg(long, default_value_t = 0.0)]
        progress: f32,
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
        /// Logical viewport width.
        #[arg(long, default_value_t = 1280.0)]
        width: f32,
        /// Logical viewport height.
        #[arg(long, default_value_t = 720.0)]
        height: f32,
        /// Device pixel ratio.
        #[arg(long, default_value_t = 1.0)]
        scale: f32,
        /// Force the compact frame set regardless of width.
        #[arg(long)]
        compact: bool,
    },
    /// Report the frame index and overlay opacities at a progress value.
    Timeline {
        scene: PathBuf,
        #[arg(long)]
        progress: f32,
        #[arg(long)]
        json: bool,
    },
    /// Open an interactive preview window that scrubs the scroll region.
    #[cfg(feature = "play")]
    Play {
        scene: PathBuf,
        #[arg(long, default_value_t = 1280.0)]
        width: f32,
        #[arg(long, default_value_t = 720.0)]
        height: f32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { scene } => run_check(&scene),
        Commands::Render {
            scene,
            progress,
            output,
            width,
            height,
            scale,
            compact,
        } => run_render(&scene, progress, &output, width, height, scale, compact),
        Commands::Timeline {
            scene,
            progress,
            json,
        } => run_timeline(&scene, progress, json),
        #[cfg(feature = "play")]
        Commands::Play {
            scene,
            width,
            height,
        } => brewscroll::play::run_play(&scene, brewscroll::play::PlayArgs { width, height }),
    }
}

fn run_check(scene_path: &Path) -> Result<()> {
    let scene = load_and_validate_scene(scene_path)?;

    println!(
        "OK: {} ({} frames, breakpoint {}px, scroll {}x viewport, zoom {})",
        scene_path.display(),
        scene.hero.frames.count,
        scene.hero.compact_breakpoint,
        scene.hero.scroll_length,
        scene.hero.zoom
    );
    println!(
        "Overlays: {} ({} show on load, {} call-to-action)",
        scene.overlays.len(),
        scene
            .overlays
            .iter()
            .filter(|overlay| overlay.show_on_load)
            .count(),
        scene.overlays.iter().filter(|overlay| overlay.is_cta()).count()
    );
    for section in &scene.sections {
        match section {
            Section::Products { id, heading, items, .. } => {
                println!("Section '{id}': {heading} ({} products)", items.len());
            }
            Section::Story { id, heading, .. } => {
                println!("Section '{id}': {heading}");
            }
        }
    }
    if let Some(footer) = &scene.footer {
        println!("Footer: {} ({} link columns)", footer.brand, footer.columns.len());
    }
    Ok(())
}

fn run_render(
    scene_path: &Path,
    progress: f32,
    output: &Path,
    width: f32,
    height: f32,
    scale: f32,
    compact: bool,
) -> Result<()> {
    let scene = load_and_validate_scene(scene_path)?;
    validate_progress(progress)?;

    let class = if compact {
        DeviceClass::Compact
    } else {
        DeviceClass::classify(width, scene.hero.compact_breakpoint)
    };
    let sequence = resolved_sequence(&scene, scene_path);
    eprintln!(
        "[brew] loading {} {} frames from {}",
        sequence.count,
        class.label(),
        sequence.class_dir(class).display()
    );
    let mut store = FrameStore::start(sequence, class);
    store.wait_ready()?;
    eprintln!(
        "[brew] frames ready ({} of {} loaded)",
        store.loaded_count(),
        store.frame_count()
    );

    let viewport = Viewport::new(width, height, scale);
    let mut renderer = FrameRenderer::new(viewport, scene.hero.background, scene.hero.zoom)?;
    renderer.tick(progress, &store);

    let mut surface = renderer.surface().clone();
    if let Some(compositor) = TextCompositor::from_scene(&scene, scene_path)? {
        let states = overlay_states(&scene.overlays, progress);
        compositor.composite(&mut surface, viewport, &states, scroll_hint_visible(progress));
    }

    surface
        .save_png(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn run_timeline(scene_path: &Path, progress: f32, json: bool) -> Result<()> {
    let scene = load_and_validate_scene(scene_path)?;
    validate_progress(progress)?;

    let index = frame_index(progress, scene.hero.frames.count);
    let hint = scroll_hint_visible(progress);
    let states = overlay_states(&scene.overlays, progress);

    if json {
        let overlays = states
            .iter()
            .map(|state| {
                serde_json::json!({
                    "text": state.spec.text,
                    "start": state.spec.start,
                    "end": state.spec.end,
                    "opacity": state.opacity,
                    "visible": state.is_visible(),
                })
            })
            .collect::<Vec<_>>();
        let report = serde_json::json!({
            "progress": progress,
            "frame_index": index,
            "frame_count": scene.hero.frames.count,
            "scroll_hint": hint,
            "overlays": overlays,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "progress {progress:.3} -> frame {index} of {}",
        scene.hero.frames.count
    );
    println!("scroll hint: {}", if hint { "visible" } else { "hidden" });
    for state in &states {
        println!(
            "  [{:.2}, {:.2}] \"{}\" opacity {:.3}",
            state.spec.start, state.spec.end, state.spec.text, state.opacity
        );
    }
    Ok(())
}

fn validate_progress(progress: f32) -> Result<()> {
    if !progress.is_finite() || progress < 0.0 || progress > 1.0 {
        bail!("--progress must be within [0, 1], got {progress}");
    }
    Ok(())
}

fn version_string() -> &'static str {
    match option_env!("BREWSCROLL_GIT_HASH") {
        Some(hash) => Box::leak(format!("{} ({hash})", env!("CARGO_PKG_VERSION")).into_boxed_str()),
        None => env!("CARGO_PKG_VERSION"),
    }
}
