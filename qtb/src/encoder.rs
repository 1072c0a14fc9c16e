use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use byteorder::WriteBytesExt;
use log::{debug, trace};

use crate::{
    block::{BlockRecord, StreamHeader},
    error::{QtbError, Result},
    raster::Raster,
    region::Region,
    stack::TraversalStack,
    uniformity::{Exact, Tolerance, UniformityTest},
};

/// Parameters controlling how an image is encoded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Largest difference between pixels that still counts as uniform.
    ///
    /// `0` is lossless; anything higher trades accuracy for fewer blocks.
    pub tolerance: u8,
}

impl EncodeOptions {
    pub fn lossless() -> Self {
        Self::default()
    }

    pub fn lossy(tolerance: u8) -> Self {
        Self { tolerance }
    }
}

/// Information about a finished encode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EncodeStats {
    /// Number of block records written.
    pub leaves: usize,

    /// Edge length of the root region.
    pub covering_size: u32,

    /// Most regions pending on the stack at once.
    pub max_pending: usize,

    /// Total bytes written, header included.
    pub bytes_written: usize,
}

/// Walks the quadtree of an image depth-first, producing one record for each
/// uniform leaf.
///
/// Children are pushed top-left, top-right, bottom-left, bottom-right, so the
/// bottom-right quadrant of every split is visited first. Regions lying
/// entirely in the padding past the image edges produce nothing.
pub struct Decomposer<'a, T: UniformityTest> {
    raster: &'a Raster,
    test: T,
    stack: TraversalStack,
    max_pending: usize,
    finished: bool,
}

impl<'a, T: UniformityTest> Decomposer<'a, T> {
    pub fn new(raster: &'a Raster, test: T) -> Result<Self> {
        let root = Region::root(raster.width(), raster.height());
        Self::with_stack(raster, test, TraversalStack::for_covering_size(root.size))
    }

    /// Use a caller supplied stack instead of one sized for the image.
    pub fn with_stack(raster: &'a Raster, test: T, mut stack: TraversalStack) -> Result<Self> {
        stack.push(Region::root(raster.width(), raster.height()))?;

        Ok(Self {
            raster,
            test,
            max_pending: stack.len(),
            stack,
            finished: false,
        })
    }

    /// Most regions that have been pending at once so far.
    pub fn max_pending(&self) -> usize {
        self.max_pending
    }

    fn next_leaf(&mut self) -> Result<Option<BlockRecord>> {
        while let Some(region) = self.stack.pop() {
            if !self.raster.overlaps(&region) {
                trace!("pruned padding region {region:?}");
                continue
            }

            if let Some(value) = self.test.leaf_value(self.raster, &region) {
                return BlockRecord::from_region(&region, value).map(Some)
            }

            let Some(quadrants) = region.quadrants() else {
                return Err(QtbError::DegenerateLeaf { x: region.x, y: region.y })
            };

            for child in quadrants {
                self.stack.push(child)?;
            }
            self.max_pending = self.max_pending.max(self.stack.len());
        }

        Ok(None)
    }
}

impl<T: UniformityTest> Iterator for Decomposer<'_, T> {
    type Item = Result<BlockRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None
        }

        let result = self.next_leaf().transpose();
        if !matches!(result, Some(Ok(_))) {
            self.finished = true;
        }

        result
    }
}

/// Decompose an image into its leaf records without serializing them.
pub fn decompose(raster: &Raster, options: EncodeOptions) -> Result<Vec<BlockRecord>> {
    match options.tolerance {
        0 => Decomposer::new(raster, Exact)?.collect(),
        t => Decomposer::new(raster, Tolerance(t))?.collect(),
    }
}

/// Encode an image into anything that implements [`Write`].
pub fn encode<O: Write + WriteBytesExt>(
    raster: &Raster,
    output: &mut O,
    options: EncodeOptions,
) -> Result<EncodeStats> {
    match options.tolerance {
        0 => encode_with(raster, Exact, output),
        t => encode_with(raster, Tolerance(t), output),
    }
}

/// Encode an image using a custom [`UniformityTest`].
pub fn encode_with<T: UniformityTest, O: Write + WriteBytesExt>(
    raster: &Raster,
    test: T,
    output: &mut O,
) -> Result<EncodeStats> {
    let header = StreamHeader {
        width: raster.width(),
        height: raster.height(),
    };

    let mut stats = EncodeStats {
        covering_size: Region::root(header.width, header.height).size,
        ..Default::default()
    };
    debug!(
        "encoding {}×{} image, covering size {}",
        header.width, header.height, stats.covering_size
    );

    stats.bytes_written += header.write_into(output)?;

    let mut leaves = Decomposer::new(raster, test)?;
    for record in leaves.by_ref() {
        stats.bytes_written += record?.write_into(output)?;
        stats.leaves += 1;
    }
    stats.max_pending = leaves.max_pending();

    debug!(
        "wrote {} blocks ({} bytes), stack peaked at {} regions",
        stats.leaves, stats.bytes_written, stats.max_pending
    );

    Ok(stats)
}

/// Encode an image and write it out to a file.
pub fn save<P: AsRef<Path>>(raster: &Raster, path: P, options: EncodeOptions) -> Result<EncodeStats> {
    let mut output = BufWriter::new(File::create(path)?);
    let stats = encode(raster, &mut output, options)?;
    output.flush()?;

    Ok(stats)
}

/// Encode an image into a new byte buffer.
pub fn encode_to_vec(raster: &Raster, options: EncodeOptions) -> Result<Vec<u8>> {
    let mut output: Vec<u8> = Vec::new();
    encode(raster, &mut output, options)?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A test that never accepts anything, not even a single pixel.
    struct Never;

    impl UniformityTest for Never {
        fn leaf_value(&self, _: &Raster, _: &Region) -> Option<u8> {
            None
        }
    }

    #[test]
    fn uniform_image_is_one_block() {
        let raster = Raster::filled(5, 3, 42).unwrap();
        let leaves = decompose(&raster, EncodeOptions::lossless()).unwrap();

        assert_eq!(leaves, vec![BlockRecord { x: 0, y: 0, size: 8, value: 42 }]);
    }

    #[test]
    fn bottom_right_is_visited_first() {
        let raster = Raster::from_raw(2, 2, vec![1, 2, 3, 4]).unwrap();
        let leaves = decompose(&raster, EncodeOptions::lossless()).unwrap();

        let values: Vec<u8> = leaves.iter().map(|b| b.value).collect();
        assert_eq!(values, vec![4, 3, 2, 1]);
    }

    #[test]
    fn padding_regions_are_pruned() {
        // Covering size 8, but only the first row exists.
        let raster = Raster::from_fn(5, 1, |x, _| x as u8).unwrap();
        let leaves = decompose(&raster, EncodeOptions::lossless()).unwrap();

        // The top-right quadrant clips down to the single pixel at x = 4.
        assert_eq!(leaves[0], BlockRecord { x: 4, y: 0, size: 4, value: 4 });
        assert_eq!(leaves.len(), 5);
        assert!(leaves[1..].iter().all(|b| b.size == 1 && b.y == 0));
    }

    #[test]
    fn rejected_pixel_is_an_error() {
        let raster = Raster::filled(2, 2, 0).unwrap();
        let err = encode_with(&raster, Never, &mut Vec::<u8>::new()).unwrap_err();

        assert!(matches!(err, QtbError::DegenerateLeaf { .. }));
    }

    #[test]
    fn small_stack_is_reported() {
        let raster = Raster::from_fn(4, 4, |x, y| (x + y * 4) as u8).unwrap();
        let mut leaves = Decomposer::with_stack(&raster, Exact, TraversalStack::with_capacity(4)).unwrap();

        let err = leaves.find_map(|r| r.err()).unwrap();
        assert!(matches!(err, QtbError::StackCapacityExceeded { capacity: 4 }));
        assert!(leaves.next().is_none());
    }

    #[test]
    fn stack_reaches_its_worst_case() {
        let raster = Raster::from_fn(8, 8, |x, y| ((x ^ y) & 1) as u8).unwrap();
        let mut output: Vec<u8> = Vec::new();
        let stats = encode(&raster, &mut output, EncodeOptions::lossless()).unwrap();

        assert_eq!(stats.covering_size, 8);
        assert_eq!(stats.leaves, 64);
        assert_eq!(stats.max_pending, crate::stack::worst_case_depth(8));
        assert_eq!(stats.bytes_written, output.len());
        assert_eq!(output.len(), StreamHeader::LEN + 64 * BlockRecord::LEN);
    }

    #[test]
    fn stream_bytes() {
        let raster = Raster::from_raw(2, 1, vec![5, 6]).unwrap();
        let bytes = encode_to_vec(&raster, EncodeOptions::lossless()).unwrap();

        assert_eq!(
            bytes,
            [
                2, 0, 0, 0, 1, 0, 0, 0,
                1, 0, 0, 0, 1, 0, 6,
                0, 0, 0, 0, 1, 0, 5,
            ]
        );
    }
}
