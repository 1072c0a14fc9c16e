//! Tests deciding whether a region can be stored as a single leaf.

use crate::{raster::Raster, region::Region};

/// Decides whether a region is uniform enough to become a leaf.
///
/// Implementations return the value to store for the leaf, or `None` when the
/// region must be split. Only the part of the region inside the raster is
/// examined, and a region with no pixels inside the raster yields `None`.
pub trait UniformityTest {
    fn leaf_value(&self, raster: &Raster, region: &Region) -> Option<u8>;
}

/// Lossless test: every pixel must equal the top-left one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Exact;

impl UniformityTest for Exact {
    fn leaf_value(&self, raster: &Raster, region: &Region) -> Option<u8> {
        if !raster.overlaps(region) {
            return None
        }
        let first = raster.get(region.x, region.y);

        raster
            .region_rows(region)
            .all(|row| row.iter().all(|&v| v == first))
            .then_some(first)
    }
}

/// Lossy test: the spread between the darkest and brightest pixel may be at
/// most the tolerance. The leaf stores the rounded mean.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tolerance(pub u8);

impl UniformityTest for Tolerance {
    fn leaf_value(&self, raster: &Raster, region: &Region) -> Option<u8> {
        let mut min = u8::MAX;
        let mut max = u8::MIN;
        let mut sum = 0u64;
        let mut count = 0u64;

        for row in raster.region_rows(region) {
            for &v in row {
                min = min.min(v);
                max = max.max(v);
                if max - min > self.0 {
                    return None
                }

                sum += v as u64;
            }
            count += row.len() as u64;
        }

        if count == 0 {
            return None
        }

        Some(((sum + count / 2) / count) as u8)
    }
}

/// Whether every pixel of the region inside the raster has the same value.
///
/// A region with no pixels inside the raster is vacuously uniform.
pub fn is_uniform(raster: &Raster, region: &Region) -> bool {
    !raster.overlaps(region) || Exact.leaf_value(raster, region).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Raster {
        Raster::from_raw(4, 2, vec![
            10, 10, 11, 12,
            10, 10, 13, 30,
        ]).unwrap()
    }

    #[test]
    fn exact_accepts_uniform_block() {
        let raster = ramp();
        assert_eq!(Exact.leaf_value(&raster, &Region::new(0, 0, 2)), Some(10));
        assert_eq!(Exact.leaf_value(&raster, &Region::new(2, 0, 2)), None);
    }

    #[test]
    fn pixel_is_always_uniform() {
        let raster = ramp();
        for y in 0..2 {
            for x in 0..4 {
                assert!(is_uniform(&raster, &Region::new(x, y, 1)));
            }
        }
    }

    #[test]
    fn exact_ignores_padding() {
        // The bottom half of this region lies outside the image.
        let raster = ramp();
        let region = Region::new(0, 0, 4);
        assert!(!is_uniform(&raster, &region));

        let flat = Raster::filled(3, 1, 7).unwrap();
        assert_eq!(Exact.leaf_value(&flat, &Region::new(0, 0, 4)), Some(7));
    }

    #[test]
    fn region_in_padding() {
        let raster = Raster::filled(3, 3, 5).unwrap();

        for region in [Region::new(3, 0, 1), Region::new(0, 3, 1), Region::new(4, 4, 4)] {
            assert!(is_uniform(&raster, &region));
            assert_eq!(Exact.leaf_value(&raster, &region), None);
            assert_eq!(Tolerance(0).leaf_value(&raster, &region), None);
            assert_eq!(Tolerance(255).leaf_value(&raster, &region), None);
        }
    }

    #[test]
    fn tolerance_uses_rounded_mean() {
        let raster = ramp();
        // 11, 12, 13, 30: spread 19
        assert_eq!(Tolerance(18).leaf_value(&raster, &Region::new(2, 0, 2)), None);
        assert_eq!(Tolerance(19).leaf_value(&raster, &Region::new(2, 0, 2)), Some(17));
        assert_eq!(Tolerance(2).leaf_value(&raster, &Region::new(0, 0, 2)), Some(10));

        // 11.5 rounds up
        let pair = Raster::from_raw(2, 1, vec![11, 12]).unwrap();
        assert_eq!(Tolerance(1).leaf_value(&pair, &Region::new(0, 0, 2)), Some(12));
        assert_eq!(Tolerance(0).leaf_value(&pair, &Region::new(0, 0, 2)), None);
    }

    #[test]
    fn zero_tolerance_matches_exact() {
        let raster = ramp();
        for region in Region::root(4, 2).quadrants().unwrap() {
            if !raster.overlaps(&region) {
                continue
            }
            assert_eq!(
                Tolerance(0).leaf_value(&raster, &region),
                Exact.leaf_value(&raster, &region),
            );
        }
    }
}
