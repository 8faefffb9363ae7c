//! PNG decoding and encoding.
//!
//! Inputs of any PNG color type are normalized to 8-bit RGB with an
//! optional alpha plane. Reduced images with at most 256 colors and no
//! alpha are written as indexed PNGs at the smallest fitting bit depth.

use std::io::Cursor;
use std::path::Path;

use pixel_reduce::{Image, ReducedImage};

use crate::error::AppError;

/// Decode PNG bytes into an [`Image`].
///
/// An alpha channel that is fully opaque is dropped.
pub fn decode_png(bytes: &[u8]) -> Result<Image, AppError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| AppError::PngDecode(e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| AppError::PngDecode(e.to_string()))?;
    let data = &buf[..info.buffer_size()];
    let width = info.width as usize;
    let height = info.height as usize;

    let image = match info.color_type {
        png::ColorType::Rgb => Image::from_rgb_bytes(width, height, data)?,
        png::ColorType::Rgba => Image::from_rgba_bytes(width, height, data)?,
        png::ColorType::Grayscale => {
            let rgb: Vec<u8> = data.iter().flat_map(|&v| [v, v, v]).collect();
            Image::from_rgb_bytes(width, height, &rgb)?
        }
        png::ColorType::GrayscaleAlpha => {
            let rgba: Vec<u8> = data
                .chunks_exact(2)
                .flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]])
                .collect();
            Image::from_rgba_bytes(width, height, &rgba)?
        }
        png::ColorType::Indexed => {
            return Err(AppError::PngDecode(
                "indexed PNG was not expanded".to_string(),
            ))
        }
    };

    if image.alpha().is_some_and(|alpha| alpha.iter().all(|&a| a == 255)) {
        return Ok(image.without_alpha());
    }
    Ok(image)
}

/// Encode an [`Image`] as 8-bit RGB, or RGBA when it carries alpha.
pub fn encode_image(image: &Image) -> Result<Vec<u8>, AppError> {
    let (color_type, data) = match image.alpha() {
        Some(_) => (png::ColorType::Rgba, image.to_rgba_bytes()),
        None => (png::ColorType::Rgb, image.to_rgb_bytes()),
    };
    encode_png(
        image.width(),
        image.height(),
        color_type,
        png::BitDepth::Eight,
        None,
        &data,
    )
}

/// Encode a [`ReducedImage`], as an indexed PNG when possible.
pub fn encode_reduced(image: &ReducedImage) -> Result<Vec<u8>, AppError> {
    let indices = match (image.alpha(), image.to_u8_indices()) {
        (None, Some(indices)) => indices,
        _ => return encode_image(&image.to_image()?),
    };

    let plte: Vec<u8> = image
        .palette()
        .colors()
        .iter()
        .flat_map(|c| c.to_bytes())
        .collect();

    let (depth, bits) = match image.palette().len() {
        0..=2 => (png::BitDepth::One, 1),
        3..=4 => (png::BitDepth::Two, 2),
        5..=16 => (png::BitDepth::Four, 4),
        _ => (png::BitDepth::Eight, 8),
    };
    let packed = if bits < 8 {
        pack_nbits(&indices, image.width(), bits)
    } else {
        indices
    };

    encode_png(
        image.width(),
        image.height(),
        png::ColorType::Indexed,
        depth,
        Some(&plte),
        &packed,
    )
}

/// Re-compress PNG bytes with oxipng; the input is returned unchanged if
/// optimization fails.
pub fn optimize(png_bytes: Vec<u8>) -> Vec<u8> {
    oxipng::optimize_from_memory(
        &png_bytes,
        &oxipng::Options {
            strip: oxipng::StripChunks::Safe,
            optimize_alpha: false,
            ..Default::default()
        },
    )
    .unwrap_or(png_bytes)
}

/// Read and decode a PNG file.
pub fn read_png(path: &Path) -> Result<Image, AppError> {
    let bytes = std::fs::read(path).map_err(|e| AppError::io(path, e))?;
    decode_png(&bytes)
}

/// Write an [`Image`] as PNG.
pub fn save_image(path: &Path, image: &Image, optimize_output: bool) -> Result<(), AppError> {
    write_png(path, encode_image(image)?, optimize_output)
}

/// Write a [`ReducedImage`] as PNG.
pub fn save_reduced(
    path: &Path,
    image: &ReducedImage,
    optimize_output: bool,
) -> Result<(), AppError> {
    write_png(path, encode_reduced(image)?, optimize_output)
}

fn write_png(path: &Path, bytes: Vec<u8>, optimize_output: bool) -> Result<(), AppError> {
    let bytes = if optimize_output { optimize(bytes) } else { bytes };
    std::fs::write(path, &bytes).map_err(|e| AppError::io(path, e))?;
    tracing::debug!(path = %path.display(), size = bytes.len(), "Wrote PNG");
    Ok(())
}

fn encode_png(
    width: usize,
    height: usize,
    color_type: png::ColorType,
    bit_depth: png::BitDepth,
    plte: Option<&[u8]>,
    data: &[u8],
) -> Result<Vec<u8>, AppError> {
    let width = u32::try_from(width).map_err(|e| AppError::PngEncode(e.to_string()))?;
    let height = u32::try_from(height).map_err(|e| AppError::PngEncode(e.to_string()))?;

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(color_type);
        encoder.set_depth(bit_depth);
        encoder.set_compression(png::Compression::Fast);
        encoder.set_filter(png::FilterType::NoFilter);
        if let Some(plte) = plte {
            encoder.set_palette(plte);
        }
        let mut writer = encoder
            .write_header()
            .map_err(|e| AppError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(data)
            .map_err(|e| AppError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// Pack palette indices into N-bit PNG row data (1, 2, or 4 bits per pixel).
fn pack_nbits(indices: &[u8], width: usize, bits: u8) -> Vec<u8> {
    let pixels_per_byte = 8 / bits as usize;
    let bytes_per_row = width.div_ceil(pixels_per_byte);
    let height = indices.len() / width;
    let mask = (1u8 << bits) - 1;
    let mut packed = Vec::with_capacity(bytes_per_row * height);

    for row in indices.chunks(width) {
        let mut byte = 0u8;
        for (i, &idx) in row.iter().enumerate() {
            let shift = (8 - bits) - (i % pixels_per_byte) as u8 * bits;
            byte |= (idx & mask) << shift;

            if (i % pixels_per_byte) == pixels_per_byte - 1 || i == row.len() - 1 {
                packed.push(byte);
                byte = 0;
            }
        }
    }

    packed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixel_reduce::{Color, Palette};

    #[test]
    fn test_pack_nbits_rows_are_padded() {
        // 3 pixels at 2 bits fit one byte per row
        let packed = pack_nbits(&[1, 2, 3, 3, 2, 1], 3, 2);
        assert_eq!(packed, vec![0b0110_1100, 0b1110_0100]);

        let packed = pack_nbits(&[1, 0, 1, 1, 0, 0, 0, 0, 1], 9, 1);
        assert_eq!(packed, vec![0b1011_0000, 0b1000_0000]);
    }

    #[test]
    fn test_grayscale_input_is_expanded() {
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, 2, 1);
            encoder.set_color(png::ColorType::Grayscale);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[10, 200]).unwrap();
        }
        let image = decode_png(&bytes).unwrap();
        assert_eq!(
            image.pixels(),
            &[Color::new(10, 10, 10), Color::new(200, 200, 200)]
        );
        assert!(image.alpha().is_none());
    }

    #[test]
    fn test_opaque_alpha_is_dropped() {
        let image = Image::filled(2, 2, Color::new(1, 2, 3))
            .unwrap()
            .with_alpha(vec![255; 4])
            .unwrap();
        let decoded = decode_png(&encode_image(&image).unwrap()).unwrap();
        assert!(decoded.alpha().is_none());
        assert_eq!(decoded.pixels(), image.pixels());
    }

    #[test]
    fn test_translucent_alpha_survives() {
        let image = Image::filled(2, 1, Color::new(9, 8, 7))
            .unwrap()
            .with_alpha(vec![0, 128])
            .unwrap();
        let decoded = decode_png(&encode_image(&image).unwrap()).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_reduced_image_written_as_indexed() {
        let palette = Palette::from_hex(&["#000", "#f00", "#0f0"]).unwrap();
        let reduced = ReducedImage::new(vec![0, 1, 2, 1, 0, 2], 3, 2, palette).unwrap();
        let bytes = encode_reduced(&reduced).unwrap();

        let decoder = png::Decoder::new(Cursor::new(&bytes));
        let reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().color_type, png::ColorType::Indexed);
        assert_eq!(reader.info().bit_depth, png::BitDepth::Two);

        let decoded = decode_png(&bytes).unwrap();
        assert_eq!(decoded, reduced.to_image().unwrap());
    }

    #[test]
    fn test_garbage_is_decode_error() {
        assert!(matches!(
            decode_png(b"not a png"),
            Err(AppError::PngDecode(_))
        ));
    }
}
