use bon::Builder;

use crate::geometry::{Color, FloatType};
use crate::scene::surface::{Pattern, TextureMapping};

/// Refractive index of the medium between objects.
pub const AIR_REFRACTIVE_INDEX: FloatType = 1.0;

/// How light passes through a surface. Transparency and refraction are exclusive.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Transmission {
    #[default]
    Opaque,

    /// Light continues straight through.
    /// `coefficient` is the weight of the surface's own color in the blend.
    Transparent { coefficient: FloatType },

    /// Light bends according to Snell's law.
    /// `coefficient` is the weight of the surface's own color in the blend.
    Refractive {
        coefficient: FloatType,
        refractive_index: FloatType,
    },
}

impl Transmission {
    /// Factor a shadow cast by a surface with this transmission multiplies the lit color by.
    /// None for opaque surfaces, which block the light completely.
    pub fn shadow_attenuation(&self) -> Option<FloatType> {
        match self {
            Transmission::Opaque => None,
            Transmission::Transparent { coefficient }
            | Transmission::Refractive { coefficient, .. } => {
                Some(0.2 + 0.7 * (1.0 - coefficient))
            }
        }
    }
}

#[derive(Clone, Debug, Builder)]
pub struct Material {
    #[builder(default = Color::new(1.0, 1.0, 1.0))]
    pub color: Color,

    /// Whether the surface gets a Phong specular highlight.
    #[builder(default = true)]
    pub specular: bool,

    /// Phong shininess exponent.
    #[builder(default = 50.0)]
    pub shininess: FloatType,

    /// Mirror reflection coefficient, None for non-reflective surfaces.
    pub reflectivity: Option<FloatType>,

    #[builder(default)]
    pub transmission: Transmission,

    #[builder(default)]
    pub pattern: Pattern,

    /// Texture overlaid on top of the pattern where it maps.
    pub texture: Option<TextureMapping>,
}

impl Default for Material {
    fn default() -> Self {
        Material::builder().build()
    }
}

impl Material {
    pub fn is_reflective(&self) -> bool {
        self.reflectivity.is_some()
    }
}
