use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use image::{codecs::jpeg::JpegEncoder, ExtendedColorType, ImageEncoder, ImageReader};

use crate::{AppError, AppResult};

pub const CONTENT_TYPE: &str = "image/jpeg";

/// Re-encodes the image at `src` as a JPEG of the given quality into `dst`.
/// Blocking; returns the size of `dst`.
pub fn recompress(src: &Path, dst: &Path, quality: u8) -> AppResult<u64> {
    let image = ImageReader::open(src)?
        .with_guessed_format()?
        .decode()
        .map_err(|err| {
            tracing::debug!(%err, "undecodable upload");
            AppError::InvalidImage
        })?;

    // jpeg has no alpha
    let rgb = image.to_rgb8();

    let mut out = BufWriter::new(File::create(dst)?);
    JpegEncoder::new_with_quality(&mut out, quality).write_image(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ExtendedColorType::Rgb8,
    )?;
    out.flush()?;

    Ok(fs::metadata(dst)?.len())
}
