use tracing::debug;

use super::grid::ColorGrid;
use crate::error::CompareError;

/// Decode an encoded raster image into an RGB grid.
///
/// The format is sniffed from the bytes. Alpha and higher bit depths are
/// flattened to 8-bit RGB.
pub fn decode(bytes: &[u8]) -> Result<ColorGrid, CompareError> {
    let image = image::load_from_memory(bytes).map_err(CompareError::Decode)?;
    debug!(
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "decoded image"
    );
    ColorGrid::new(image.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use image::{ImageFormat, Rgb, Rgba, RgbaImage};

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn decodes_png_to_rgb() {
        let png = png_bytes(&RgbaImage::from_pixel(8, 6, Rgba([10, 20, 30, 128])));
        let grid = decode(&png).unwrap();
        assert_eq!(grid.dimensions(), (8, 6));
        assert_eq!(*grid.as_image().get_pixel(3, 3), Rgb([10, 20, 30]));
    }

    #[test]
    fn garbage_bytes_are_decode_error() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn truncated_png_is_decode_error() {
        // Varied pixels so the compressed payload dominates the file.
        let img = RgbaImage::from_fn(32, 32, |x, y| {
            Rgba([(x * 7 + y * 13) as u8, (x * y) as u8, (x ^ y) as u8, 255])
        });
        let png = png_bytes(&img);
        let err = decode(&png[..png.len() / 2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn empty_input_is_decode_error() {
        assert_eq!(decode(&[]).unwrap_err().kind(), ErrorKind::Decode);
    }
}
