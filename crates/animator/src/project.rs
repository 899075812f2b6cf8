//! Project files
//!
//! A project directory holds `config.json` (canvas size, framerate,
//! attribution, audio path) and `actions.json` (the action log).

use crate::error::AnimatorError;
use crate::journal::ActionJournal;
use crate::reducer::ReducerConfig;
use crate::retention::AnchorPolicy;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const CONFIG_FILE: &str = "config.json";
pub const ACTIONS_FILE: &str = "actions.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Contents of `config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// `[width, height]`
    pub drawing_size: [f64; 2],
    pub framerate: f64,
    #[serde(default)]
    pub attribution: Attribution,
    /// Audio track, relative to the project directory
    #[serde(default)]
    pub audio: Option<String>,
}

impl ProjectConfig {
    pub fn validate(&self) -> Result<()> {
        let [width, height] = self.drawing_size;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(AnimatorError::InvalidProject(format!(
                "drawing_size must be positive, got [{}, {}]",
                width, height
            )));
        }
        if !(self.framerate.is_finite() && self.framerate > 0.0) {
            return Err(AnimatorError::InvalidProject(format!(
                "framerate must be positive, got {}",
                self.framerate
            )));
        }
        Ok(())
    }

    pub fn reducer_config(&self) -> ReducerConfig {
        ReducerConfig {
            drawing_size: self.drawing_size,
        }
    }

    /// Last frame index for a track of `duration_secs`
    pub fn max_frame(&self, duration_secs: f64) -> u32 {
        let frames = (duration_secs * self.framerate).ceil();
        if frames.is_finite() && frames > 0.0 {
            frames as u32
        } else {
            0
        }
    }
}

/// An opened project directory
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: ProjectConfig,
}

impl Project {
    /// Open a project, reading and validating `config.json`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let path = root.join(CONFIG_FILE);
        let raw = std::fs::read_to_string(&path).map_err(|source| AnimatorError::Io {
            path: path.clone(),
            source,
        })?;
        let config: ProjectConfig =
            serde_json::from_str(&raw).map_err(|source| AnimatorError::Json { path, source })?;
        config.validate()?;
        info!(root = %root.display(), "project opened");
        Ok(Self { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn audio_path(&self) -> Option<PathBuf> {
        self.config.audio.as_ref().map(|audio| self.root.join(audio))
    }

    pub fn actions_path(&self) -> PathBuf {
        self.root.join(ACTIONS_FILE)
    }

    /// Load the action log; a project without one starts empty
    pub fn load_journal(&self, policy: AnchorPolicy) -> Result<ActionJournal> {
        let path = self.actions_path();
        if !path.exists() {
            return Ok(ActionJournal::new(self.config.reducer_config(), policy));
        }
        ActionJournal::load(&path, self.config.reducer_config(), policy)
    }

    pub fn save_journal(&self, journal: &ActionJournal) -> Result<()> {
        journal.save(&self.actions_path())
    }
}
