use assert2::assert;
use bon::bon;
use nalgebra::Unit;

use crate::geometry::{EPSILON, FloatType, Ray, ScreenPoint, ScreenSize, WorldPoint, WorldVector};

/// Pinhole camera looking through a flat view plane.
/// `view_width` is the width of the plane in world units, `view_distance` its distance from the eye.
#[derive(Copy, Clone, Debug)]
pub struct Camera {
    center: WorldPoint,

    resolution: ScreenSize,

    up: Unit<WorldVector>,
    right: Unit<WorldVector>,

    /// Offset from the eye to the center of the top left pixel
    view_origin_offset: WorldVector,

    /// Distance between pixel centers on the view plane
    pixel_pitch: FloatType,
}

#[bon]
impl Camera {
    #[builder]
    pub fn new(
        center: WorldPoint,
        forward: WorldVector,
        up: WorldVector,
        resolution: ScreenSize,
        view_width: FloatType,
        view_distance: FloatType,
    ) -> Self {
        let forward = Unit::try_new(forward, EPSILON).expect("Forward vector must be non-zero");
        let up = Unit::try_new(up, EPSILON).expect("Up vector must be no-zero");
        let right = Unit::try_new(forward.cross(&up), EPSILON)
            .expect("`up` and `forward` must be linearly independent");
        let up = Unit::new_normalize(right.cross(&forward));

        assert!(resolution.x > 0);
        assert!(resolution.y > 0);
        assert!(view_width > 0.0);
        assert!(view_distance > 0.0);

        let pixel_pitch = view_width / (resolution.x as FloatType);
        let resolution_minus_one = ScreenSize::new(resolution.x - 1, resolution.y - 1);
        let view_origin_uv = resolution_minus_one.cast::<FloatType>() * pixel_pitch / 2.0;
        let view_origin_offset = forward.as_ref() * view_distance
            - right.as_ref() * view_origin_uv.x
            + up.as_ref() * view_origin_uv.y;

        Camera {
            center,
            resolution,
            up,
            right,
            view_origin_offset,
            pixel_pitch,
        }
    }
}

impl Camera {
    /// The 800x800 view of the demo room: a 20 wide plane 25 units in front of the eye at
    /// the origin, looking down -Z.
    pub fn room_view(resolution: ScreenSize) -> Camera {
        Camera::builder()
            .center(WorldPoint::origin())
            .forward(WorldVector::new(0.0, 0.0, -1.0))
            .up(WorldVector::new(0.0, 1.0, 0.0))
            .resolution(resolution)
            .view_width(20.0)
            .view_distance(25.0)
            .build()
    }

    pub fn resolution(&self) -> ScreenSize {
        self.resolution
    }

    pub fn pixel_count(&self) -> usize {
        self.resolution.x as usize * self.resolution.y as usize
    }

    /// Ray from the eye through the center of a pixel. Row 0 is at the top.
    pub fn primary_ray(&self, point: &ScreenPoint) -> Ray {
        let direction = self.view_origin_offset
            + self.right.as_ref() * (point.x as FloatType * self.pixel_pitch)
            - self.up.as_ref() * (point.y as FloatType * self.pixel_pitch);
        Ray::new(self.center, direction)
    }

    /// Primary ray of the pixel at the given raster order index.
    pub fn primary_ray_at(&self, index: usize) -> Ray {
        let width = self.resolution.x as usize;
        self.primary_ray(&ScreenPoint::new((index % width) as u32, (index / width) as u32))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::assert;

    #[test]
    fn left_right_up_down() {
        // X goes right, Y goes away, Z goes up
        let camera = Camera::builder()
            .center(WorldPoint::new(0.0, 0.0, 0.0))
            .forward(WorldVector::new(0.0, 1.0, 0.0))
            .up(WorldVector::new(0.0, 0.0, 1.0))
            .resolution(ScreenSize::new(801, 601))
            .view_width(2.0)
            .view_distance(2.0)
            .build();

        let ray_center = camera.primary_ray(&ScreenPoint::new(400, 300));
        let ray_left = camera.primary_ray(&ScreenPoint::new(0, 300));
        let ray_right = camera.primary_ray(&ScreenPoint::new(800, 300));
        let ray_up = camera.primary_ray(&ScreenPoint::new(400, 0));
        let ray_down = camera.primary_ray(&ScreenPoint::new(400, 600));

        assert!(ray_center.direction.x.abs() < 1e-5);
        assert!(ray_center.direction.z.abs() < 1e-5);
        assert!(ray_left.direction.x < ray_center.direction.x);
        assert!(ray_right.direction.x > ray_center.direction.x);
        assert!(ray_up.direction.z > ray_center.direction.z);
        assert!(ray_down.direction.z < ray_center.direction.z);
    }

    #[test]
    fn corner_pixels_span_the_view_plane() {
        let camera = Camera::room_view(ScreenSize::new(800, 800));
        let pitch = 20.0 / 800.0;

        let top_left = camera.primary_ray(&ScreenPoint::new(0, 0));
        let on_plane = top_left.point_at(25.0 / -top_left.direction.z);
        assert!((on_plane.x - (-10.0 + pitch / 2.0)).abs() < 1e-4);
        assert!((on_plane.y - (10.0 - pitch / 2.0)).abs() < 1e-4);
        assert!(top_left.origin == WorldPoint::origin());
    }

    #[test]
    fn raster_index() {
        let camera = Camera::room_view(ScreenSize::new(4, 3));
        assert!(camera.pixel_count() == 12);
        let a = camera.primary_ray_at(6);
        let b = camera.primary_ray(&ScreenPoint::new(2, 1));
        assert!(a.direction == b.direction);
    }
}
