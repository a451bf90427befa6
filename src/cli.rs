use std::sync::Arc;

use anyhow::Context as _;
use indicatif::{ProgressBar, ProgressStyle};
use minitrace::{
    Camera, FrameRenderer, RenderSettings, Scene, SceneSettings,
    geometry::ScreenSize,
    renderer::{DiagnosticsSettings, FrameStats},
    scene::{Texture, demo},
};

const DEFAULT_FRAME_COUNT: u64 = 100;

/// Usage: minitrace-cli [FLOOR_TEXTURE] [FRAME_COUNT]
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let floor_texture = args
        .next()
        .filter(|path| !path.is_empty())
        .map(|path| Texture::open(&path).map(Arc::new))
        .transpose()?;
    let frame_count = args
        .next()
        .map(|count| count.parse::<u64>())
        .transpose()
        .context("Frame count must be a number")?
        .unwrap_or(DEFAULT_FRAME_COUNT);

    let scene = Scene::new(demo::room(floor_texture), SceneSettings::default());
    scene.bvh().print_statistics();

    let camera = Camera::room_view(ScreenSize::new(800, 800));
    let settings = RenderSettings::builder()
        .pin_workers(true)
        .diagnostics(DiagnosticsSettings {
            frame_time: true,
            intersection_stats: false,
        })
        .build();

    let mut renderer = FrameRenderer::new(scene, settings)?;

    let bar = ProgressBar::new(frame_count);
    bar.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} frames, {per_sec}")?);

    let mut last_stats = None;
    for _ in 0..frame_count {
        match renderer.render_frame(&camera) {
            Ok((_frame, stats)) => last_stats = Some(stats),
            Err(error) => {
                bar.abandon();
                log::error!("Rendering failed: {error}");
                std::process::exit(1);
            }
        }
        bar.inc(1);
    }
    bar.finish();

    if let Some(stats) = last_stats {
        FrameStats::from(&stats).log();
    }

    Ok(())
}
