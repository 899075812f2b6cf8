//! Animator actions
//!
//! `ContentAction`s are what the log stores. `Action` adds the editor-only
//! verbs that never reach the log.

use crate::geometry::Ring;
use serde::{Deserialize, Serialize};

/// Logged drawing edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentAction {
    AddPolygon { polygon: Ring, frame: u32 },
    ErasePolygon { polygon: Ring, frame: u32 },
}

impl ContentAction {
    pub fn frame(&self) -> u32 {
        match self {
            ContentAction::AddPolygon { frame, .. } | ContentAction::ErasePolygon { frame, .. } => {
                *frame
            }
        }
    }
}

/// Anything the editor can be asked to do
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    AddPolygon { polygon: Ring, frame: u32 },
    ErasePolygon { polygon: Ring, frame: u32 },
    Undo,
    SetFrame { frame: u32 },
}

impl From<ContentAction> for Action {
    fn from(action: ContentAction) -> Self {
        match action {
            ContentAction::AddPolygon { polygon, frame } => Action::AddPolygon { polygon, frame },
            ContentAction::ErasePolygon { polygon, frame } => Action::ErasePolygon { polygon, frame },
        }
    }
}
