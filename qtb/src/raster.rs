use crate::{error::{QtbError, Result}, region::Region};

/// Largest width or height accepted for a raster.
///
/// Block records store coordinates and sizes as `u16`, so the covering square
/// of any raster must not exceed `2^15`.
pub const MAX_DIMENSION: u32 = 1 << 15;

/// A single channel, 8 bit greyscale image held in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl Raster {
    /// Create a raster of the given size with every sample set to zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::filled(width, height, 0)
    }

    /// Create a raster of the given size with every sample set to `value`.
    pub fn filled(width: u32, height: u32, value: u8) -> Result<Self> {
        check_dimensions(width as i64, height as i64)?;

        Ok(Self {
            width,
            height,
            samples: vec![value; width as usize * height as usize],
        })
    }

    /// Wrap an existing row-major buffer.
    pub fn from_raw(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        check_dimensions(width as i64, height as i64)?;

        if samples.len() != width as usize * height as usize {
            return Err(QtbError::InvalidPgm(format!(
                "expected {} samples for a {width}×{height} image, got {}",
                width as usize * height as usize,
                samples.len(),
            )));
        }

        Ok(Self { width, height, samples })
    }

    /// Build a raster by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F: FnMut(u32, u32) -> u8>(width: u32, height: u32, mut f: F) -> Result<Self> {
        let mut raster = Self::new(width, height)?;
        for y in 0..height {
            for x in 0..width {
                raster.set(x, y, f(x, y));
            }
        }

        Ok(raster)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels in the image.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at column `x`, row `y`. Panics when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.samples[self.index(x, y)]
    }

    /// Set the sample at column `x`, row `y`. Panics when out of bounds.
    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        let i = self.index(x, y);
        self.samples[i] = value;
    }

    /// Whether the region has at least one pixel inside the image.
    pub fn overlaps(&self, region: &Region) -> bool {
        region.x < self.width && region.y < self.height
    }

    /// The rows of the region clipped to the image, as slices of samples.
    ///
    /// Yields nothing when the region lies entirely in the padding.
    pub fn region_rows<'a>(&'a self, region: &Region) -> impl Iterator<Item = &'a [u8]> + 'a {
        let (x0, y0, x1, y1) = self.clip(region);
        let width = self.width as usize;

        (y0..y1).map(move |y| &self.samples[y * width + x0..y * width + x1])
    }

    /// Paint `value` over the part of `region` that lies inside the image.
    pub fn fill_region(&mut self, region: &Region, value: u8) {
        let (x0, y0, x1, y1) = self.clip(region);
        let width = self.width as usize;

        for y in y0..y1 {
            self.samples[y * width + x0..y * width + x1].fill(value);
        }
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.samples
    }

    /// Clip a region to the image, returning the half open pixel range
    /// `(x0, y0, x1, y1)`.
    fn clip(&self, region: &Region) -> (usize, usize, usize, usize) {
        let x0 = region.x.min(self.width) as usize;
        let y0 = region.y.min(self.height) as usize;
        let x1 = (region.x as u64 + region.size as u64).min(self.width as u64) as usize;
        let y1 = (region.y as u64 + region.size as u64).min(self.height as u64) as usize;

        if x1 <= x0 || y1 <= y0 {
            return (x0, y0, x0, y0)
        }

        (x0, y0, x1, y1)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        y as usize * self.width as usize + x as usize
    }
}

/// Reject dimensions the codec cannot represent.
pub(crate) fn check_dimensions(width: i64, height: i64) -> Result<()> {
    let valid = 1..=MAX_DIMENSION as i64;
    if !valid.contains(&width) || !valid.contains(&height) {
        return Err(QtbError::InvalidDimensions { width, height })
    }

    Ok(())
}
