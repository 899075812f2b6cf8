//! Action journal
//!
//! The log is the source of truth; the cached state is derived from it.
//! Appends fold just the new action into the current state. Undo truncates
//! the log and replays the tail from the nearest anchor, which yields exactly
//! the state a full replay of the truncated log would.

use crate::action::ContentAction;
use crate::error::AnimatorError;
use crate::reducer::{apply_actions, apply_actions_to_state, ReducerConfig, Touched};
use crate::retention::AnchorPolicy;
use crate::state::{initial_state, CachedState};
use crate::Result;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Append-only action log with its derived state
#[derive(Debug, Clone)]
pub struct ActionJournal {
    actions: Vec<ContentAction>,
    state: CachedState,
    /// Log length -> state after that many actions
    anchors: BTreeMap<usize, CachedState>,
    config: ReducerConfig,
    policy: AnchorPolicy,
}

impl ActionJournal {
    /// Empty journal
    pub fn new(config: ReducerConfig, policy: AnchorPolicy) -> Self {
        Self {
            actions: Vec::new(),
            state: initial_state(),
            anchors: BTreeMap::new(),
            config,
            policy,
        }
    }

    /// Rebuild a journal from a log, taking anchors along the way
    pub fn from_actions(actions: Vec<ContentAction>, config: ReducerConfig, policy: AnchorPolicy) -> Self {
        let mut journal = Self::new(config, policy);
        let mut start = 0;
        while start < actions.len() {
            let end = match policy.anchor_interval {
                0 => actions.len(),
                interval => ((start / interval + 1) * interval).min(actions.len()),
            };
            apply_actions(&mut journal.state, &actions[start..end], &config);
            journal.actions.extend_from_slice(&actions[start..end]);
            journal.maybe_anchor();
            start = end;
        }
        info!(
            actions = journal.actions.len(),
            anchors = journal.anchors.len(),
            "journal rebuilt"
        );
        journal
    }

    pub fn actions(&self) -> &[ContentAction] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Current derived state
    pub fn state(&self) -> &CachedState {
        &self.state
    }

    pub fn config(&self) -> &ReducerConfig {
        &self.config
    }

    /// Log lengths that currently have a snapshot
    pub fn anchor_positions(&self) -> Vec<usize> {
        self.anchors.keys().copied().collect()
    }

    /// Append an action and fold it into the current state
    pub fn append(&mut self, action: ContentAction) -> Touched {
        let touched = apply_actions(&mut self.state, std::slice::from_ref(&action), &self.config);
        self.actions.push(action);
        self.maybe_anchor();
        touched
    }

    /// Remove the last action and rederive the state without it
    pub fn pop(&mut self) -> Result<ContentAction> {
        let action = self.actions.pop().ok_or(AnimatorError::NothingToUndo)?;
        let len = self.actions.len();
        self.anchors.retain(|position, _| *position <= len);

        let (start, state) = match self.anchors.range(..=len).next_back() {
            Some((&start, anchor)) => (
                start,
                apply_actions_to_state(&self.actions[start..], anchor, &self.config),
            ),
            None => (
                0,
                apply_actions_to_state(&self.actions, &initial_state(), &self.config),
            ),
        };
        debug!(from = start, replayed = len - start, "undo replay");
        self.state = state;
        Ok(action)
    }

    /// Fold the whole log from the initial state, ignoring anchors
    pub fn replay_full(&self) -> CachedState {
        apply_actions_to_state(&self.actions, &initial_state(), &self.config)
    }

    /// Write the log as a JSON array, replacing `path` atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let io_err = |source| AnimatorError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        serde_json::to_writer_pretty(&mut file, &self.actions).map_err(|source| AnimatorError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        file.flush().map_err(io_err)?;
        file.persist(path).map_err(|e| io_err(e.error))?;
        debug!(path = %path.display(), actions = self.actions.len(), "journal saved");
        Ok(())
    }

    /// Read a log written by `save`
    pub fn load(path: &Path, config: ReducerConfig, policy: AnchorPolicy) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| AnimatorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let actions: Vec<ContentAction> =
            serde_json::from_str(&raw).map_err(|source| AnimatorError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_actions(actions, config, policy))
    }

    fn maybe_anchor(&mut self) {
        let len = self.actions.len();
        if !self.policy.is_anchor_point(len) {
            return;
        }
        self.anchors.insert(len, self.state.clone());

        let positions = self.anchor_positions();
        let keep = self.policy.retain(&positions, len);
        self.anchors.retain(|position, _| keep.contains(position));
        debug!(len, anchors = self.anchors.len(), "anchor created");
    }
}
