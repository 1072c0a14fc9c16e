/// A square area of the quadtree, which may extend past the image edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// Column of the top-left corner.
    pub x: u32,

    /// Row of the top-left corner.
    pub y: u32,

    /// Edge length, always a power of two.
    pub size: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, size: u32) -> Self {
        debug_assert!(size.is_power_of_two(), "region size {size} is not a power of two");
        Self { x, y, size }
    }

    /// The region covering an image of the given dimensions.
    pub fn root(width: u32, height: u32) -> Self {
        Self::new(0, 0, covering_size(width, height))
    }

    /// The four half-size quadrants, in the order top-left, top-right,
    /// bottom-left, bottom-right. `None` for a single pixel.
    pub fn quadrants(&self) -> Option<[Region; 4]> {
        let half = self.size / 2;
        if half == 0 {
            return None
        }

        Some([
            Region::new(self.x, self.y, half),
            Region::new(self.x + half, self.y, half),
            Region::new(self.x, self.y + half, half),
            Region::new(self.x + half, self.y + half, half),
        ])
    }
}

/// The smallest power of two greater than or equal to both dimensions.
pub fn covering_size(width: u32, height: u32) -> u32 {
    width.max(height).max(1).next_power_of_two()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covering_sizes() {
        assert_eq!(covering_size(1, 1), 1);
        assert_eq!(covering_size(2, 1), 2);
        assert_eq!(covering_size(3, 3), 4);
        assert_eq!(covering_size(4, 4), 4);
        assert_eq!(covering_size(5, 1), 8);
        assert_eq!(covering_size(640, 480), 1024);
        assert_eq!(covering_size(32768, 3), 32768);
    }

    #[test]
    fn quadrant_order() {
        let q = Region::new(4, 8, 4).quadrants().unwrap();
        assert_eq!(q[0], Region::new(4, 8, 2));
        assert_eq!(q[1], Region::new(6, 8, 2));
        assert_eq!(q[2], Region::new(4, 10, 2));
        assert_eq!(q[3], Region::new(6, 10, 2));
    }

    #[test]
    fn pixel_has_no_quadrants() {
        assert!(Region::new(3, 3, 1).quadrants().is_none());
    }
}
