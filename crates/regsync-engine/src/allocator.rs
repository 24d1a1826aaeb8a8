//! Monotonic GID allocator.

use tracing::debug;

/// Hands out unix GIDs above both the highest GID already in use and a
/// configured floor.  The watermark only moves forward, so two calls
/// never return the same value within a run.
#[derive(Debug)]
pub struct GidAllocator {
    next: i64,
}

impl GidAllocator {
    /// `highest` is the largest `osggid` observed in the snapshot;
    /// `floor` is the smallest GID this deployment may assign.
    #[must_use]
    pub fn new(highest: i64, floor: i64) -> Self {
        Self {
            next: (highest + 1).max(floor),
        }
    }

    pub fn allocate(&mut self) -> i64 {
        let gid = self.next;
        self.next += 1;
        debug!(gid, "allocated gid");
        gid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_wins_when_highest_is_below_it() {
        let mut alloc = GidAllocator::new(199_999, 200_000);
        assert_eq!(alloc.allocate(), 200_000);
        assert_eq!(alloc.allocate(), 200_001);
    }

    #[test]
    fn continues_past_an_established_range() {
        let mut alloc = GidAllocator::new(200_314, 200_000);
        assert_eq!(alloc.allocate(), 200_315);
    }

    #[test]
    fn empty_registry_starts_at_the_floor() {
        let mut alloc = GidAllocator::new(0, 200_000);
        assert_eq!(alloc.allocate(), 200_000);
    }
}
