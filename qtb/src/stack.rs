use crate::{error::{QtbError, Result}, region::Region};

/// A bounded LIFO of regions still waiting for a decision.
#[derive(Debug)]
pub struct TraversalStack {
    regions: Vec<Region>,
    capacity: usize,
}

impl TraversalStack {
    /// Create a stack holding at most `capacity` regions.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            regions: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Create a stack large enough to decompose a square of `size` pixels.
    ///
    /// Each split pops one region and pushes four, and only one of those four
    /// is expanded before its siblings, so at most `3 * log2(size) + 1`
    /// regions are ever pending.
    pub fn for_covering_size(size: u32) -> Self {
        Self::with_capacity(worst_case_depth(size))
    }

    pub fn push(&mut self, region: Region) -> Result<()> {
        if self.regions.len() >= self.capacity {
            return Err(QtbError::StackCapacityExceeded { capacity: self.capacity })
        }

        self.regions.push(region);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Region> {
        self.regions.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Maximum number of pending regions for a covering square of `size`.
pub fn worst_case_depth(size: u32) -> usize {
    3 * size.max(1).ilog2() as usize + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifo_order() {
        let mut stack = TraversalStack::with_capacity(4);
        stack.push(Region::new(0, 0, 1)).unwrap();
        stack.push(Region::new(1, 0, 1)).unwrap();

        assert_eq!(stack.pop(), Some(Region::new(1, 0, 1)));
        assert_eq!(stack.pop(), Some(Region::new(0, 0, 1)));
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn overflow_is_reported() {
        let mut stack = TraversalStack::with_capacity(1);
        stack.push(Region::new(0, 0, 2)).unwrap();

        let err = stack.push(Region::new(0, 0, 1)).unwrap_err();
        assert!(matches!(err, QtbError::StackCapacityExceeded { capacity: 1 }));
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.capacity(), 1);
    }

    #[test]
    fn sized_for_covering_square() {
        assert_eq!(TraversalStack::for_covering_size(8).capacity(), 10);
    }

    #[test]
    fn worst_case_depths() {
        assert_eq!(worst_case_depth(1), 1);
        assert_eq!(worst_case_depth(2), 4);
        assert_eq!(worst_case_depth(4), 7);
        assert_eq!(worst_case_depth(32768), 46);
    }
}
