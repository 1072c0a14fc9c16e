//! Encoding several independent images at once.

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::{
    encoder::{encode, EncodeOptions, EncodeStats},
    error::Result,
    raster::Raster,
};

/// One encoded image from a batch.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub stats: EncodeStats,
}

/// Encode every image in parallel.
///
/// Each image gets its own traversal stack and output buffer, and results are
/// returned in input order. A failure only affects its own entry.
pub fn encode_all(rasters: &[Raster], options: EncodeOptions) -> Vec<Result<Encoded>> {
    rasters
        .par_iter()
        .map(|raster| -> Result<Encoded> {
            let mut bytes: Vec<u8> = Vec::new();
            let stats = encode(raster, &mut bytes, options)?;

            Ok(Encoded { bytes, stats })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_to_vec;

    #[test]
    fn matches_sequential_encoding() {
        let rasters: Vec<Raster> = (1..=8)
            .map(|n| Raster::from_fn(n * 3, n * 2, |x, y| ((x / n) ^ (y / 2)) as u8).unwrap())
            .collect();

        let results = encode_all(&rasters, EncodeOptions::lossless());
        assert_eq!(results.len(), rasters.len());

        for (raster, result) in rasters.iter().zip(results) {
            let encoded = result.unwrap();
            assert_eq!(encoded.bytes, encode_to_vec(raster, EncodeOptions::lossless()).unwrap());
            assert_eq!(encoded.stats.bytes_written, encoded.bytes.len());
        }
    }
}
