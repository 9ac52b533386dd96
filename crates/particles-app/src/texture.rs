//! Particle texture sources: a PNG on disk or a generated soft dot.

use std::path::Path;

use particles_common::ParticlesError;

/// Edge length of the generated dot texture.
pub const DOT_SIZE: u32 = 64;

/// Tightly packed RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decode a PNG into RGBA8.
pub fn load_png(path: &Path) -> Result<TextureData, ParticlesError> {
    let image = image::open(path)
        .map_err(|e| ParticlesError::Texture(format!("{}: {e}", path.display())))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ParticlesError::Texture(format!(
            "{}: image is empty",
            path.display()
        )));
    }
    Ok(TextureData {
        width,
        height,
        pixels: image.into_raw(),
    })
}

/// White disc whose alpha falls off smoothly towards the edge.
pub fn soft_dot(size: u32) -> TextureData {
    let size = size.max(2);
    let center = (size as f32 - 1.0) / 2.0;
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);

    for y in 0..size {
        for x in 0..size {
            let dx = (x as f32 - center) / center;
            let dy = (y as f32 - center) / center;
            let d = (dx * dx + dy * dy).sqrt().min(1.0);
            let falloff = 1.0 - d * d * (3.0 - 2.0 * d);
            let alpha = (falloff * 255.0).round() as u8;
            pixels.extend_from_slice(&[255, 255, 255, alpha]);
        }
    }

    TextureData {
        width: size,
        height: size,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_at(t: &TextureData, x: u32, y: u32) -> u8 {
        t.pixels[((y * t.width + x) * 4 + 3) as usize]
    }

    #[test]
    fn soft_dot_dimensions() {
        let dot = soft_dot(DOT_SIZE);
        assert_eq!(dot.width, 64);
        assert_eq!(dot.height, 64);
        assert_eq!(dot.pixels.len(), 64 * 64 * 4);
    }

    #[test]
    fn soft_dot_is_opaque_in_the_middle_and_clear_at_corners() {
        let dot = soft_dot(65);
        assert_eq!(alpha_at(&dot, 32, 32), 255);
        assert_eq!(alpha_at(&dot, 0, 0), 0);
        assert_eq!(alpha_at(&dot, 64, 64), 0);
        assert!(alpha_at(&dot, 32, 16) > alpha_at(&dot, 32, 4));
    }

    #[test]
    fn soft_dot_is_white() {
        let dot = soft_dot(8);
        assert!(dot.pixels.chunks_exact(4).all(|px| px[..3] == [255, 255, 255]));
    }

    #[test]
    fn tiny_sizes_are_clamped() {
        assert_eq!(soft_dot(0).width, 2);
    }

    #[test]
    fn loads_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spark.png");
        let mut img = image::RgbaImage::new(3, 2);
        img.put_pixel(2, 1, image::Rgba([10, 20, 30, 40]));
        img.save(&path).unwrap();

        let tex = load_png(&path).unwrap();
        assert_eq!((tex.width, tex.height), (3, 2));
        assert_eq!(&tex.pixels[20..24], &[10, 20, 30, 40]);
    }

    #[test]
    fn missing_png_is_a_texture_error() {
        let err = load_png(Path::new("/nonexistent/spark.png")).unwrap_err();
        assert!(matches!(err, ParticlesError::Texture(_)));
        assert!(err.to_string().contains("spark.png"));
    }
}
