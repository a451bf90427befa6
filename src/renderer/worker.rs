use std::ops::Range;

use crate::{
    camera::Camera,
    geometry::Color,
    renderer::{RenderSettings, TraceStats, Tracer},
    scene::{Scene, StackCache},
};

/// Per thread rendering state, reused across frames.
pub struct Worker {
    id: usize,
    bvh_stack_cache: StackCache,
}

impl Worker {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            bvh_stack_cache: Default::default(),
        }
    }

    /// Trace primary rays of the raster order pixel indices in `pixels`, appending their colors to `buffer`.
    pub fn render_batch(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        settings: &RenderSettings,
        pixels: Range<usize>,
        buffer: &mut Vec<Color>,
    ) -> TraceStats {
        log::trace!("Worker {} rendering pixels {:?}", self.id, pixels);

        let mut stats = TraceStats::default();
        let mut tracer = Tracer::new(scene, settings, &mut self.bvh_stack_cache);
        buffer.extend(pixels.map(|index| {
            let ray = camera.primary_ray_at(index);
            tracer.trace_primary(&ray, &mut stats)
        }));
        stats
    }
}

/// Maps a 0-1 f32 color to pixel type compatible with module image.
pub fn color_to_image(color: &Color) -> image::Rgba<u8> {
    let channel = |value: f32| (value * 255.0).round().clamp(0.0, 255.0) as u8;
    image::Rgba([channel(color.x), channel(color.y), channel(color.z), 255])
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::ScreenSize;
    use crate::scene::{SceneSettings, demo};
    use assert2::assert;

    #[test]
    fn color_conversion_clamps() {
        assert!(color_to_image(&Color::new(0.5, -1.0, 3.0)) == image::Rgba([128, 0, 255, 255]));
    }

    #[test]
    fn batch_fills_buffer_in_order() {
        let scene = Scene::new(demo::room(None), SceneSettings::default());
        let camera = Camera::room_view(ScreenSize::new(16, 16));
        let settings = RenderSettings::default();
        let mut worker = Worker::new(0);

        let mut whole = Vec::new();
        let stats = worker.render_batch(&scene, &camera, &settings, 0..256, &mut whole);
        assert!(whole.len() == 256);
        assert!(stats.primary_rays == 256);

        let mut part = Vec::new();
        worker.render_batch(&scene, &camera, &settings, 100..120, &mut part);
        assert!(part[..] == whole[100..120]);
    }
}
