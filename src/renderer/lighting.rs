use nalgebra::Unit;

use crate::geometry::{Color, WorldVector, reflect};
use crate::scene::Material;

/// Fraction of the surface color that is visible without any direct light.
pub const AMBIENT: f32 = 0.2;

/// Phong lighting contributions at a surface point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightingResult {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
}

/// Phong model for a white point light.
/// `to_light` points from the surface to the light, `view` is the direction of the incoming ray.
pub fn phong(
    surface_color: &Color,
    material: &Material,
    normal: &Unit<WorldVector>,
    to_light: &Unit<WorldVector>,
    view: &WorldVector,
) -> LightingResult {
    let l_dot_n = to_light.dot(normal).max(0.0);

    let specular = if material.specular {
        let reflected = reflect(&-to_light.into_inner(), normal);
        let r_dot_v = reflected.dot(&-view);
        if r_dot_v > 0.0 {
            r_dot_v.powf(material.shininess)
        } else {
            0.0
        }
    } else {
        0.0
    };

    LightingResult {
        ambient: surface_color * AMBIENT,
        diffuse: surface_color * l_dot_n,
        specular: Color::repeat(specular),
    }
}
