pub mod color;

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use image::{ImageError, ImageFormat, Rgb, RgbImage};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::canvas::Canvas;

use self::color::ColorPalette;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("cannot create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot encode {}: {source}", .path.display())]
    Encode { path: PathBuf, source: ImageError },

    #[error("canvas is missing {missing} rows")]
    Incomplete { missing: usize },
}

/// Where and how the coordinator persists the gathered canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    pub path: PathBuf,
    pub palette: ColorPalette,
}

impl OutputSettings {
    pub fn new(path: impl Into<PathBuf>, palette: ColorPalette) -> Self {
        Self {
            path: path.into(),
            palette,
        }
    }
}

/// Colours every cell of a complete canvas.
pub fn render_pixels(canvas: &Canvas, palette: ColorPalette, iteration_limit: u32) -> RgbImage {
    let range = canvas.range();
    RgbImage::from_fn(canvas.width(), range.len(), |x, y| {
        let iterations = canvas.get(range.lower + y, x).unwrap_or(0);
        let (r, g, b) = palette.calculate_color(iterations, iteration_limit);
        Rgb([r, g, b])
    })
}

/// `P6` header followed by the raw RGB triples, row-major.
pub fn encode_ppm(image: &RgbImage) -> Vec<u8> {
    let header = format!("P6\n{} {}\n255\n", image.width(), image.height());
    let mut bytes = Vec::with_capacity(header.len() + image.as_raw().len());
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(image.as_raw());
    bytes
}

/// Writes the canvas to `settings.path`: binary PPM for `.ppm` or no
/// extension, any other format `image` recognises from the extension.
pub fn write_image(
    settings: &OutputSettings,
    canvas: &Canvas,
    iteration_limit: u32,
) -> Result<(), OutputError> {
    if !canvas.is_complete() {
        return Err(OutputError::Incomplete {
            missing: canvas.missing_rows().len(),
        });
    }

    let path = settings.path.as_path();
    let image = render_pixels(canvas, settings.palette, iteration_limit);

    if is_ppm(path) {
        write_ppm(path, &image)?;
    } else {
        write_encoded(path, &image)?;
    }

    info!(
        "Wrote {}x{} image to {} with the {} palette",
        image.width(),
        image.height(),
        path.display(),
        settings.palette
    );
    Ok(())
}

fn is_ppm(path: &Path) -> bool {
    match path.extension() {
        None => true,
        Some(extension) => extension.eq_ignore_ascii_case("ppm"),
    }
}

fn create(path: &Path) -> Result<BufWriter<File>, OutputError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| OutputError::Create {
            path: path.to_path_buf(),
            source,
        })
}

fn write_ppm(path: &Path, image: &RgbImage) -> Result<(), OutputError> {
    let mut writer = create(path)?;
    let bytes = encode_ppm(image);
    writer
        .write_all(&bytes)
        .and_then(|_| writer.flush())
        .map_err(|source| OutputError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("{} bytes written to {}", bytes.len(), path.display());
    Ok(())
}

/// Encodes through `image` in the format the extension names.
fn write_encoded(path: &Path, image: &RgbImage) -> Result<(), OutputError> {
    let encode_error = |source| OutputError::Encode {
        path: path.to_path_buf(),
        source,
    };
    let format = ImageFormat::from_path(path).map_err(encode_error)?;

    let mut writer = create(path)?;
    image.write_to(&mut writer, format).map_err(encode_error)?;
    writer.flush().map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        fractal::mandelbrot::Mandelbrot, grid_spec::GridSpec, range::RowRange,
    };

    fn small_canvas() -> (GridSpec, Canvas) {
        let grid = GridSpec::new(40, 30, 300).unwrap();
        let canvas = Canvas::compute(&grid, RowRange::new(0, 30), &Mandelbrot::default());
        (grid, canvas)
    }

    #[test]
    fn ppm_length_is_header_plus_triples() {
        let (grid, canvas) = small_canvas();
        let bytes = encode_ppm(&render_pixels(&canvas, ColorPalette::Classic, grid.iteration_limit));

        let header = b"P6\n40 30\n255\n";
        assert!(bytes.starts_with(header));
        assert_eq!(bytes.len(), header.len() + 40 * 30 * 3);
    }

    #[test]
    fn reference_header_is_fifteen_bytes() {
        let image = RgbImage::new(800, 600);
        let bytes = encode_ppm(&image);
        assert_eq!(&bytes[..15], b"P6\n800 600\n255\n");
        assert_eq!(bytes.len(), 15 + 800 * 600 * 3);
    }

    #[test]
    fn pixels_follow_row_major_order() {
        let mut canvas = Canvas::full(2, 2);
        canvas
            .place(&crate::models::fragments::message_block::MessageBlock {
                rank: crate::models::rank::Rank(0),
                range: RowRange::new(0, 2),
                width: 2,
                cells: vec![0, 1, 2, 200],
            })
            .unwrap();

        let bytes = encode_ppm(&render_pixels(&canvas, ColorPalette::Classic, 1000));
        let pixels = &bytes[b"P6\n2 2\n255\n".len()..];
        assert_eq!(pixels, &[0, 0, 0, 2, 1, 1, 4, 3, 2, 255, 255, 200]);
    }

    #[test]
    fn writes_ppm_file() {
        let (grid, canvas) = small_canvas();
        let dir = tempfile::tempdir().unwrap();
        let settings = OutputSettings::new(dir.path().join("field.ppm"), ColorPalette::Classic);

        write_image(&settings, &canvas, grid.iteration_limit).unwrap();

        let written = std::fs::read(&settings.path).unwrap();
        let expected = encode_ppm(&render_pixels(&canvas, ColorPalette::Classic, grid.iteration_limit));
        assert_eq!(written, expected);
    }

    #[test]
    fn writes_png_through_image() {
        let (grid, canvas) = small_canvas();
        let dir = tempfile::tempdir().unwrap();
        let settings = OutputSettings::new(dir.path().join("field.png"), ColorPalette::Grayscale);

        write_image(&settings, &canvas, grid.iteration_limit).unwrap();

        let decoded = image::open(&settings.path).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (40, 30));
    }

    #[test]
    fn unwritable_path_fails_before_writing() {
        let (grid, canvas) = small_canvas();
        let dir = tempfile::tempdir().unwrap();
        let settings = OutputSettings::new(dir.path().join("missing").join("field.ppm"), ColorPalette::Classic);

        assert!(matches!(
            write_image(&settings, &canvas, grid.iteration_limit),
            Err(OutputError::Create { .. })
        ));
    }

    #[test]
    fn unwritable_encoded_path_is_a_create_error() {
        let (grid, canvas) = small_canvas();
        let dir = tempfile::tempdir().unwrap();
        let settings = OutputSettings::new(dir.path().join("missing").join("field.png"), ColorPalette::Classic);

        assert!(matches!(
            write_image(&settings, &canvas, grid.iteration_limit),
            Err(OutputError::Create { .. })
        ));
    }

    #[test]
    fn unknown_extension_is_an_encode_error() {
        let (grid, canvas) = small_canvas();
        let dir = tempfile::tempdir().unwrap();
        let settings = OutputSettings::new(dir.path().join("field.notaformat"), ColorPalette::Classic);

        assert!(matches!(
            write_image(&settings, &canvas, grid.iteration_limit),
            Err(OutputError::Encode { .. })
        ));
        assert!(!settings.path.exists());
    }

    #[test]
    fn refuses_incomplete_canvas() {
        let canvas = Canvas::full(4, 4);
        let settings = OutputSettings::new("never-written.ppm", ColorPalette::Classic);
        assert!(matches!(
            write_image(&settings, &canvas, 10),
            Err(OutputError::Incomplete { missing: 4 })
        ));
    }
}
