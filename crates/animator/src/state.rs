//! Derived per-frame polygon cache

use crate::error::AnimatorError;
use crate::geometry;
use crate::Result;
use geo::MultiPolygon;
use std::collections::BTreeMap;

/// Polygons drawn on one frame
#[derive(Debug, Clone, PartialEq)]
pub struct CachedFrame {
    /// Authoritative union of every add minus every erase
    pub merged_polygons: MultiPolygon<f64>,
    /// Simplified copy for scrub previews
    pub thumbnail: MultiPolygon<f64>,
}

impl CachedFrame {
    pub fn empty() -> Self {
        Self {
            merged_polygons: geometry::empty(),
            thumbnail: geometry::empty(),
        }
    }

    pub fn area(&self) -> f64 {
        geometry::area(&self.merged_polygons)
    }
}

/// Frames keyed by index; frame 0 always exists
#[derive(Debug, Clone, PartialEq)]
pub struct CachedState {
    pub frames: BTreeMap<u32, CachedFrame>,
}

/// State before any action: a single empty frame 0
pub fn initial_state() -> CachedState {
    let mut frames = BTreeMap::new();
    frames.insert(0, CachedFrame::empty());
    CachedState { frames }
}

impl CachedState {
    /// Largest frame index at or before `frame`
    ///
    /// Frames without drawings show the last drawn frame before them.
    pub fn find_frame_index(&self, frame: u32) -> Result<u32> {
        self.frames
            .range(..=frame)
            .next_back()
            .map(|(index, _)| *index)
            .ok_or(AnimatorError::MissingBaseFrame)
    }

    /// Frame shown when displaying `frame`
    pub fn display_frame(&self, frame: u32) -> Result<&CachedFrame> {
        let index = self.find_frame_index(frame)?;
        self.frames.get(&index).ok_or(AnimatorError::MissingBaseFrame)
    }
}
