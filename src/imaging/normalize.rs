use image::{imageops, DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;

use crate::errors::LogoError;

/// Normalize arbitrary raster bytes to a `target_px` square RGBA PNG.
///
/// The source is scaled by `target_px / max(w, h)` so the longer edge fills
/// the canvas, then pasted centered on a fully transparent square. Offsets
/// floor, so an odd leftover pixel biases toward the top-left. Downstream
/// grid layout relies on every cached file having exactly these dimensions.
pub fn normalize_png(data: &[u8], target_px: u32) -> Result<Vec<u8>, LogoError> {
    let src = image::load_from_memory(data)?.to_rgba8();
    let (w, h) = src.dimensions();

    let scale = target_px as f64 / w.max(h) as f64;
    let new_w = ((w as f64 * scale).round() as u32).max(1);
    let new_h = ((h as f64 * scale).round() as u32).max(1);
    let resized = imageops::resize(&src, new_w, new_h, imageops::FilterType::Lanczos3);

    let mut canvas = RgbaImage::new(target_px, target_px);
    let ox = (target_px.saturating_sub(new_w)) / 2;
    let oy = (target_px.saturating_sub(new_h)) / 2;
    imageops::overlay(&mut canvas, &resized, i64::from(ox), i64::from(oy));

    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(canvas).write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba};

    fn solid_png(w: u32, h: u32, pixel: Rgba<u8>) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, pixel);
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn wide_source_becomes_square_and_vertically_centered() {
        let red = Rgba([255, 0, 0, 255]);
        let png = normalize_png(&solid_png(300, 100, red), 128).unwrap();
        let out = image::load_from_memory(&png).unwrap();
        assert_eq!(out.dimensions(), (128, 128));

        // 300x100 scales to 128x43; rows above y=42 and below y=85 stay clear
        assert_eq!(out.get_pixel(64, 5)[3], 0);
        assert_eq!(out.get_pixel(64, 122)[3], 0);
        // content fills full width at the vertical middle
        assert_eq!(out.get_pixel(0, 64), red);
        assert_eq!(out.get_pixel(127, 64), red);
    }

    #[test]
    fn small_source_is_upscaled_to_fill() {
        let blue = Rgba([0, 0, 255, 255]);
        let png = normalize_png(&solid_png(64, 64, blue), 128).unwrap();
        let out = image::load_from_memory(&png).unwrap();
        assert_eq!(out.dimensions(), (128, 128));
        assert_eq!(out.get_pixel(0, 0), blue);
        assert_eq!(out.get_pixel(127, 127), blue);
    }

    #[test]
    fn tall_source_is_horizontally_centered_with_floor_bias() {
        let png = normalize_png(
            &solid_png(10, 100, Rgba([0, 255, 0, 255])),
            101,
        )
        .unwrap();
        let out = image::load_from_memory(&png).unwrap();
        assert_eq!(out.dimensions(), (101, 101));
        // 10x100 -> 10x101; leftover 91 splits 45/46, biasing left
        assert_eq!(out.get_pixel(45, 50)[3], 255);
        assert_eq!(out.get_pixel(44, 50)[3], 0);
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = normalize_png(b"not an image", 128).unwrap_err();
        assert!(matches!(err, LogoError::Decode(_)));
    }
}
