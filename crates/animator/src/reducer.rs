//! Action log reducer
//!
//! Folds `ContentAction`s into a `CachedState`. Pure and synchronous; the
//! same log over the same anchor always yields the same state.

use crate::action::ContentAction;
use crate::geometry;
use crate::state::{CachedFrame, CachedState};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::warn;

/// Drawing parameters the reducer needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReducerConfig {
    /// `[width, height]` of the canvas
    pub drawing_size: [f64; 2],
}

impl ReducerConfig {
    /// Simplification tolerance for thumbnails
    pub fn thumbnail_tolerance(&self) -> f64 {
        self.drawing_size[0].min(self.drawing_size[1]) / 50.0
    }
}

/// Frames modified by a fold
pub type Touched = SmallVec<[u32; 4]>;

/// Fold `actions` onto a copy of `anchor`
pub fn apply_actions_to_state(
    actions: &[ContentAction],
    anchor: &CachedState,
    config: &ReducerConfig,
) -> CachedState {
    let mut state = anchor.clone();
    apply_actions(&mut state, actions, config);
    state
}

/// Fold `actions` into `state` in place; returns the touched frames
///
/// Degenerate polygons (see `geometry::polygon`) are logged and skipped.
pub fn apply_actions(
    state: &mut CachedState,
    actions: &[ContentAction],
    config: &ReducerConfig,
) -> Touched {
    let mut touched = Touched::new();

    for action in actions {
        let (ring, frame, erase) = match action {
            ContentAction::AddPolygon { polygon, frame } => (polygon, *frame, false),
            ContentAction::ErasePolygon { polygon, frame } => (polygon, *frame, true),
        };
        let polygon = match geometry::polygon(ring) {
            Ok(polygon) => polygon,
            Err(reason) => {
                warn!(frame, ?reason, "skipping degenerate polygon");
                continue;
            }
        };

        let cached = state.frames.entry(frame).or_insert_with(CachedFrame::empty);
        cached.merged_polygons = if erase {
            geometry::difference(&cached.merged_polygons, polygon)
        } else {
            geometry::union(&cached.merged_polygons, polygon)
        };
        if !touched.contains(&frame) {
            touched.push(frame);
        }
    }

    let tolerance = config.thumbnail_tolerance();
    for frame in &touched {
        if let Some(cached) = state.frames.get_mut(frame) {
            cached.thumbnail = geometry::thumbnail(&cached.merged_polygons, tolerance);
        }
    }
    touched
}
