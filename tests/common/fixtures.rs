//! Test images and helpers for writing them to disk.

use std::path::{Path, PathBuf};

use pixel_reduce::{Color, Image};
use pixelsmith::services::image_io;

/// Colors of the reference palette strip.
pub const STRIP_COLORS: [Color; 4] = [
    Color::new(20, 20, 20),
    Color::new(200, 40, 40),
    Color::new(40, 180, 60),
    Color::new(240, 240, 200),
];

/// 8x8 pixel art where neighboring cells always differ.
pub fn pixel_art() -> Image {
    let mut pixels = Vec::with_capacity(64);
    for y in 0..8u8 {
        for x in 0..8u8 {
            pixels.push(Color::new(x * 30, y * 30, ((x * y) % 4) * 60));
        }
    }
    Image::new(8, 8, pixels).expect("valid pixel art")
}

/// Nearest-neighbor upscale by an integer factor.
pub fn upscale(image: &Image, factor: usize) -> Image {
    let width = image.width() * factor;
    let height = image.height() * factor;
    let pixels = (0..width * height)
        .map(|i| image.pixel((i % width) / factor, (i / width) / factor))
        .collect();
    Image::new(width, height, pixels).expect("valid upscale")
}

/// Smooth gradient with many distinct colors.
pub fn gradient(width: usize, height: usize) -> Image {
    let pixels = (0..width * height)
        .map(|i| {
            let (x, y) = (i % width, i / width);
            Color::new(
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                ((x + y) * 127 / (width + height)) as u8,
            )
        })
        .collect();
    Image::new(width, height, pixels).expect("valid gradient")
}

/// Horizontal strip with one block per [`STRIP_COLORS`] entry.
pub fn palette_strip(cell: usize) -> Image {
    let width = STRIP_COLORS.len() * cell;
    let pixels = (0..width * cell)
        .map(|i| STRIP_COLORS[(i % width) / cell])
        .collect();
    Image::new(width, cell, pixels).expect("valid strip")
}

/// Encode `image` as PNG bytes.
pub fn png_bytes(image: &Image) -> Vec<u8> {
    image_io::encode_image(image).expect("encodable image")
}

/// Write `image` as `name` inside `dir` and return its path.
pub fn write_png(dir: &Path, name: &str, image: &Image) -> PathBuf {
    let path = dir.join(name);
    image_io::save_image(&path, image, false).expect("writable PNG");
    path
}
