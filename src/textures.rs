//! Point sprite texture.
//!
//! Every point is drawn as a quad sampling one RGBA sprite. The sprite
//! can come from an image file or be generated: the default is a soft
//! disc that fades from opaque center to transparent rim.
//!
//! # Supported Formats
//!
//! - PNG (recommended)
//! - JPEG

use std::path::Path;

use crate::error::TextureError;

/// RGBA8 sprite pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteTexture {
    /// Raw RGBA pixel data (width * height * 4 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl SpriteTexture {
    /// Load a sprite from an image file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let img = image::open(path.as_ref())?.into_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            data: img.into_raw(),
            width,
            height,
        })
    }

    /// A `size` x `size` white disc with a smooth alpha falloff.
    pub fn soft_disc(size: u32) -> Self {
        let size = size.max(2);
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        let half = (size - 1) as f32 / 2.0;
        for y in 0..size {
            for x in 0..size {
                let dx = (x as f32 - half) / half;
                let dy = (y as f32 - half) / half;
                let d = (dx * dx + dy * dy).sqrt();
                // smoothstep(1.0, 0.3, d)
                let t = ((1.0 - d) / 0.7).clamp(0.0, 1.0);
                let alpha = t * t * (3.0 - 2.0 * t);
                data.extend_from_slice(&[255, 255, 255, (alpha * 255.0).round() as u8]);
            }
        }
        Self {
            data,
            width: size,
            height: size,
        }
    }

    /// Bytes per row for upload.
    #[inline]
    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

impl Default for SpriteTexture {
    fn default() -> Self {
        Self::soft_disc(32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_at(tex: &SpriteTexture, x: u32, y: u32) -> u8 {
        tex.data[((y * tex.width + x) * 4 + 3) as usize]
    }

    #[test]
    fn test_soft_disc_falloff() {
        let tex = SpriteTexture::soft_disc(33);
        assert_eq!(tex.data.len(), 33 * 33 * 4);
        assert_eq!(alpha_at(&tex, 16, 16), 255);
        assert_eq!(alpha_at(&tex, 0, 0), 0);
        assert_eq!(alpha_at(&tex, 0, 16), 0);
        assert!(alpha_at(&tex, 8, 16) > 0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SpriteTexture::from_file("definitely/not/here.png").unwrap_err();
        assert!(matches!(err, TextureError::Io(_)));
    }
}
