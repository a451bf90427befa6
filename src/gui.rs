use std::sync::Arc;

use eframe::{App, CreationContext, Frame, egui};
use egui::{CentralPanel, ColorImage, Image, TextureOptions, TopBottomPanel};
use minitrace::{
    Camera, FrameRenderer, RenderSettings, Scene, SceneSettings,
    geometry::ScreenSize,
    renderer::FrameStats,
    scene::{Texture, demo},
};

pub struct MinitraceGui {
    renderer: FrameRenderer,
    camera: Camera,
    texture: egui::TextureHandle,
    last_stats: Option<FrameStats>,
}

impl MinitraceGui {
    pub fn new(
        scene: Scene,
        camera: Camera,
        render_settings: RenderSettings,
        cc: &CreationContext<'_>,
    ) -> anyhow::Result<Self> {
        let renderer = FrameRenderer::new(scene, render_settings)?;
        let resolution = camera.resolution();
        let texture = cc.egui_ctx.load_texture(
            "rendered",
            ColorImage::new(
                [resolution.x as usize, resolution.y as usize],
                egui::Color32::BLACK,
            ),
            TextureOptions::LINEAR,
        );

        Ok(MinitraceGui {
            renderer,
            camera,
            texture,
            last_stats: None,
        })
    }
}

impl App for MinitraceGui {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        match self.renderer.render_frame(&self.camera) {
            Ok((frame, stats)) => {
                let image = frame.to_rgba_image();
                self.texture.set(
                    ColorImage::from_rgba_unmultiplied(
                        [image.width() as usize, image.height() as usize],
                        image.as_raw(),
                    ),
                    TextureOptions::LINEAR,
                );
                self.last_stats = Some(FrameStats::from(&stats));
            }
            Err(error) => {
                log::error!("Rendering failed: {error}");
                std::process::exit(1);
            }
        }

        TopBottomPanel::bottom("stats").show(ctx, |ui| {
            if let Some(stats) = &self.last_stats {
                ui.label(format!(
                    "{} rays, {:.1} intersection tests per ray, {} workers",
                    stats.primary_rays,
                    stats.average_tests_per_ray,
                    self.renderer.worker_count()
                ));
            }
        });

        CentralPanel::default().show(ctx, |ui| {
            ui.centered_and_justified(|ui| {
                ui.add(Image::from_texture(&self.texture).shrink_to_fit())
            })
        });

        ctx.request_repaint();
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let floor_texture = std::env::args()
        .nth(1)
        .map(|path| Texture::open(&path).map(Arc::new))
        .transpose()?;

    eframe::run_native(
        "Minitrace",
        Default::default(),
        Box::new(move |cc| {
            let camera = Camera::room_view(ScreenSize::new(800, 800));
            let scene = Scene::new(demo::room(floor_texture), SceneSettings::default());
            scene.bvh().print_statistics();

            Ok(Box::new(MinitraceGui::new(
                scene,
                camera,
                RenderSettings::default(),
                cc,
            )?))
        }),
    )
    .map_err(|error| anyhow::anyhow!("{error}"))?;

    Ok(())
}
