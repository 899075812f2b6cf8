//! Editor state machine
//!
//! Draw actions append to the journal (fast path). Undo pops and replays.
//! `SetFrame` only moves the playhead.

use crate::action::{Action, ContentAction};
use crate::journal::ActionJournal;
use crate::state::{CachedFrame, CachedState};
use crate::Result;
use tracing::debug;

/// Editing session over one journal
#[derive(Debug, Clone)]
pub struct Animator {
    journal: ActionJournal,
    frame: u32,
    max_frame: u32,
}

impl Animator {
    pub fn new(journal: ActionJournal, max_frame: u32) -> Self {
        Self {
            journal,
            frame: 0,
            max_frame,
        }
    }

    /// Apply one action
    pub fn apply_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::AddPolygon { polygon, frame } => {
                self.journal.append(ContentAction::AddPolygon { polygon, frame });
            }
            Action::ErasePolygon { polygon, frame } => {
                self.journal.append(ContentAction::ErasePolygon { polygon, frame });
            }
            Action::Undo => {
                self.journal.pop()?;
            }
            Action::SetFrame { frame } => {
                self.frame = frame.min(self.max_frame);
                debug!(requested = frame, frame = self.frame, "playhead moved");
            }
        }
        Ok(())
    }

    /// Apply a batch; stops at the first failing action
    pub fn apply_all(&mut self, actions: impl IntoIterator<Item = Action>) -> Result<()> {
        actions
            .into_iter()
            .try_for_each(|action| self.apply_action(action))
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn max_frame(&self) -> u32 {
        self.max_frame
    }

    pub fn state(&self) -> &CachedState {
        self.journal.state()
    }

    pub fn journal(&self) -> &ActionJournal {
        &self.journal
    }

    pub fn into_journal(self) -> ActionJournal {
        self.journal
    }

    /// Frame content under the playhead
    pub fn current_frame(&self) -> Result<&CachedFrame> {
        self.journal.state().display_frame(self.frame)
    }
}
