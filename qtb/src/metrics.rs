//! Quality and size measurements for comparing an image to its reconstruction.

use crate::{error::{QtbError, Result}, raster::Raster};

/// Mean squared error between two images of identical dimensions.
pub fn mean_squared_error(original: &Raster, reconstructed: &Raster) -> Result<f64> {
    let a = (original.width(), original.height());
    let b = (reconstructed.width(), reconstructed.height());
    if a != b {
        return Err(QtbError::DimensionMismatch(a, b))
    }

    let sum: u64 = original
        .as_raw()
        .iter()
        .zip(reconstructed.as_raw())
        .map(|(&o, &r)| {
            let diff = o.abs_diff(r) as u64;
            diff * diff
        })
        .sum();

    Ok(sum as f64 / original.len() as f64)
}

/// Peak signal to noise ratio in decibels for 8 bit samples.
///
/// Infinite when the images are identical.
pub fn psnr(mse: f64) -> f64 {
    if mse == 0.0 {
        return f64::INFINITY
    }

    10.0 * f64::log10(255.0 * 255.0 / mse)
}

/// How much smaller the compressed file is, as a percentage of the original.
pub fn compression_ratio(original_bytes: u64, compressed_bytes: u64) -> f64 {
    (1.0 - compressed_bytes as f64 / original_bytes as f64) * 100.0
}
