use std::path::Path;

use image::RgbImage;
use thiserror::Error;

use crate::geometry::{Color, FloatType};

/// A 2D color lookup surface, addressed by normalized (u, v) in [0, 1] x [0, 1].
/// v = 0 is the bottom row of the image.
#[derive(Clone, Debug)]
pub struct Texture {
    image: RgbImage,
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture {path} is empty")]
    Empty { path: String },
}

impl Texture {
    pub fn open(path: impl AsRef<Path>) -> Result<Texture, TextureError> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| TextureError::Load {
                path: path.display().to_string(),
                source,
            })?
            .to_rgb8();

        if image.width() == 0 || image.height() == 0 {
            return Err(TextureError::Empty {
                path: path.display().to_string(),
            });
        }

        log::debug!(
            "Loaded texture {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );

        Ok(Texture { image })
    }

    /// Panics if the image is empty.
    pub fn from_image(image: RgbImage) -> Texture {
        assert!(image.width() > 0 && image.height() > 0);
        Texture { image }
    }

    /// Nearest texel lookup, coordinates outside of the unit square are clamped.
    pub fn color_at(&self, u: FloatType, v: FloatType) -> Color {
        let (w, h) = (self.image.width(), self.image.height());
        let x = (u.clamp(0.0, 1.0) * (w - 1) as FloatType).round() as u32;
        let y = ((1.0 - v.clamp(0.0, 1.0)) * (h - 1) as FloatType).round() as u32;
        let pixel = self.image.get_pixel(x.min(w - 1), y.min(h - 1));
        Color::new(
            pixel.0[0] as FloatType / 255.0,
            pixel.0[1] as FloatType / 255.0,
            pixel.0[2] as FloatType / 255.0,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::{assert, let_assert};

    fn two_by_two() -> Texture {
        let mut image = RgbImage::new(2, 2);
        image.put_pixel(0, 0, image::Rgb([255, 0, 0])); // top left
        image.put_pixel(1, 0, image::Rgb([0, 255, 0])); // top right
        image.put_pixel(0, 1, image::Rgb([0, 0, 255])); // bottom left
        image.put_pixel(1, 1, image::Rgb([255, 255, 255])); // bottom right
        Texture::from_image(image)
    }

    #[test]
    fn corners() {
        let t = two_by_two();
        assert!(t.color_at(0.0, 1.0) == Color::new(1.0, 0.0, 0.0));
        assert!(t.color_at(1.0, 1.0) == Color::new(0.0, 1.0, 0.0));
        assert!(t.color_at(0.0, 0.0) == Color::new(0.0, 0.0, 1.0));
        assert!(t.color_at(1.0, 0.0) == Color::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn out_of_range_is_clamped() {
        let t = two_by_two();
        assert!(t.color_at(-3.0, 7.0) == t.color_at(0.0, 1.0));
    }

    #[test]
    fn missing_file() {
        let_assert!(Err(TextureError::Load { .. }) = Texture::open("/nonexistent/texture.bmp"));
    }
}
