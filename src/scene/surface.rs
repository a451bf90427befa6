use std::sync::Arc;

use nalgebra::Unit;

use crate::geometry::{Axis, Color, FloatType, TexturePoint, WorldPoint, WorldVector};
use crate::scene::texture::Texture;

/// Procedural color variation over a surface, evaluated in world space.
#[derive(Clone, Debug, Default)]
pub enum Pattern {
    /// Just the material color.
    #[default]
    Solid,

    /// Parallel bands cycling through `colors`, `width` apart along `direction`.
    Stripes {
        width: FloatType,
        direction: WorldVector,
        colors: Vec<Color>,
    },

    /// Squares of alternating color over the two axes.
    Checkered {
        width: FloatType,
        axes: [Unit<WorldVector>; 2],
        colors: [Color; 2],
    },
}

impl Pattern {
    /// Color of the pattern at `point`, `base` is used where the pattern has nothing to say.
    pub fn color_at(&self, point: &WorldPoint, base: &Color) -> Color {
        match self {
            Pattern::Solid => *base,
            Pattern::Stripes {
                width,
                direction,
                colors,
            } => {
                if colors.is_empty() || *width <= 0.0 {
                    return *base;
                }
                let projection = point.coords.dot(direction);
                let index = band_index(projection, *width).rem_euclid(colors.len() as i64);
                colors[index as usize]
            }
            Pattern::Checkered {
                width,
                axes,
                colors,
            } => {
                if *width <= 0.0 {
                    return *base;
                }
                let i1 = band_index(point.coords.dot(&axes[0]), *width);
                let i2 = band_index(point.coords.dot(&axes[1]), *width);
                let even = (i1.rem_euclid(2) == 0) ^ (i2.rem_euclid(2) == 0);
                if even { colors[0] } else { colors[1] }
            }
        }
    }
}

fn band_index(projection: FloatType, width: FloatType) -> i64 {
    (projection / width).floor() as i64
}

/// How hit points get turned into texture coordinates.
#[derive(Clone, Debug)]
pub enum Projection {
    /// Linear mapping of two world axes onto a rectangle; `min` maps to uv (0, 0), `max` to (1, 1).
    Planar {
        u_axis: Axis,
        v_axis: Axis,
        min: TexturePoint,
        max: TexturePoint,
    },

    /// Longitude/latitude of the surface normal.
    Spherical,
}

#[derive(Clone, Debug)]
pub struct TextureMapping {
    pub texture: Arc<Texture>,
    pub projection: Projection,
}

impl TextureMapping {
    /// Texture color at the point, or None if the point maps outside of the texture.
    pub fn color_at(&self, point: &WorldPoint, normal: &Unit<WorldVector>) -> Option<Color> {
        let uv = self.projection.uv(point, normal)?;
        Some(self.texture.color_at(uv.x, uv.y))
    }
}

impl Projection {
    /// Returns uv strictly inside the unit square, None otherwise.
    pub fn uv(&self, point: &WorldPoint, normal: &Unit<WorldVector>) -> Option<TexturePoint> {
        let uv = match self {
            Projection::Planar {
                u_axis,
                v_axis,
                min,
                max,
            } => {
                let du = max.x - min.x;
                let dv = max.y - min.y;
                if du == 0.0 || dv == 0.0 {
                    return None;
                }
                TexturePoint::new(
                    (point[u_axis.index()] - min.x) / du,
                    (point[v_axis.index()] - min.y) / dv,
                )
            }
            Projection::Spherical => TexturePoint::new(
                0.5 + normal.z.atan2(normal.x) / (2.0 * std::f32::consts::PI),
                0.5 + normal.y.clamp(-1.0, 1.0).asin() / std::f32::consts::PI,
            ),
        };

        if uv.x > 0.0 && uv.x < 1.0 && uv.y > 0.0 && uv.y < 1.0 {
            Some(uv)
        } else {
            None
        }
    }
}
