//! Anchor retention
//!
//! Anchors are snapshots of the cached state at some log length. They are
//! kept at roughly geometric distances from the head: dense near it, sparse
//! far back. Undo then replays a short tail from the nearest anchor instead
//! of the whole log.

use serde::{Deserialize, Serialize};

/// Anchor policy configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorPolicy {
    /// Snapshot every this many appended actions (default: 32)
    pub anchor_interval: usize,
    /// Hard cap on kept anchors (default: 16)
    pub max_anchors: usize,
}

impl Default for AnchorPolicy {
    fn default() -> Self {
        Self {
            anchor_interval: 32,
            max_anchors: 16,
        }
    }
}

impl AnchorPolicy {
    /// Whether a snapshot should be taken at log length `len`
    pub fn is_anchor_point(&self, len: usize) -> bool {
        len > 0 && self.anchor_interval > 0 && len % self.anchor_interval == 0
    }

    /// Distance bucket of an anchor `distance` actions behind the head
    ///
    /// Bucket `k` covers `[interval * (2^k - 1), interval * (2^(k+1) - 1))`.
    pub fn bucket(&self, distance: usize) -> u32 {
        let interval = self.anchor_interval.max(1);
        (distance / interval + 1).ilog2()
    }

    /// Anchor positions to keep, given existing positions and the head
    ///
    /// Keeps the oldest anchor per bucket so anchors age into sparser
    /// buckets, then drops the oldest beyond `max_anchors`.
    pub fn retain(&self, positions: &[usize], head: usize) -> Vec<usize> {
        let mut sorted: Vec<usize> = positions.iter().copied().filter(|p| *p <= head).collect();
        sorted.sort_unstable();
        sorted.dedup();

        let mut kept = Vec::new();
        let mut last_bucket = None;
        for position in sorted {
            let bucket = self.bucket(head - position);
            if last_bucket != Some(bucket) {
                kept.push(position);
                last_bucket = Some(bucket);
            }
        }
        let excess = kept.len().saturating_sub(self.max_anchors);
        kept.drain(..excess);
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets_grow_geometrically() {
        let policy = AnchorPolicy {
            anchor_interval: 10,
            max_anchors: 8,
        };
        assert_eq!(policy.bucket(0), 0);
        assert_eq!(policy.bucket(9), 0);
        assert_eq!(policy.bucket(10), 1);
        assert_eq!(policy.bucket(29), 1);
        assert_eq!(policy.bucket(30), 2);
        assert_eq!(policy.bucket(69), 2);
        assert_eq!(policy.bucket(70), 3);
    }

    #[test]
    fn test_retain_thins_old_anchors() {
        let policy = AnchorPolicy {
            anchor_interval: 10,
            max_anchors: 8,
        };
        let positions: Vec<usize> = (1..=10).map(|i| i * 10).collect();
        assert_eq!(policy.retain(&positions, 100), vec![10, 40, 80, 100]);
    }

    #[test]
    fn test_retain_caps_count_and_drops_future_anchors() {
        let policy = AnchorPolicy {
            anchor_interval: 1,
            max_anchors: 2,
        };
        assert_eq!(policy.retain(&[1, 2, 3, 4, 9], 4), vec![2, 4]);
    }

    #[test]
    fn test_anchor_points() {
        let policy = AnchorPolicy::default();
        assert!(!policy.is_anchor_point(0));
        assert!(policy.is_anchor_point(32));
        assert!(!policy.is_anchor_point(33));
    }
}
