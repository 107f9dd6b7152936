//! JSON configuration and report helpers for tracking runs.

use crate::{DetectError, FrameDetection, SpotTracker, TrackerParams};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum TrackIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Configuration of a tracking run over a sequence of frames.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Frame files, processed in order.
    #[serde(default)]
    pub frames: Vec<String>,
    #[serde(default)]
    pub output_path: Option<String>,
    /// Frame indices on which a calibration sample is requested.
    #[serde(default)]
    pub calibration_frames: Vec<usize>,
    #[serde(default)]
    pub params: TrackerParams,
}

impl TrackerConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, TrackIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), TrackIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("dodeca_track_report.json"))
    }

    pub fn build_tracker(&self) -> SpotTracker {
        SpotTracker::new(self.params)
    }

    pub fn is_calibration_frame(&self, index: usize) -> bool {
        self.calibration_frames.contains(&index)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameReport {
    pub frame_path: String,
    #[serde(default)]
    pub detection: Option<FrameDetection>,
    #[serde(default)]
    pub error: Option<String>,
}

impl FrameReport {
    pub fn new(frame_path: impl Into<String>) -> Self {
        Self {
            frame_path: frame_path.into(),
            detection: None,
            error: None,
        }
    }

    pub fn set_result(&mut self, res: Result<FrameDetection, DetectError>) {
        match res {
            Ok(det) => {
                self.detection = Some(det);
                self.error = None;
            }
            Err(err) => {
                self.detection = None;
                self.error = Some(err.to_string());
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackReport {
    pub config_path: String,
    pub frames: Vec<FrameReport>,
}

impl TrackReport {
    pub fn new(config_path: &Path) -> Self {
        Self {
            config_path: config_path.to_string_lossy().into_owned(),
            frames: Vec::new(),
        }
    }

    pub fn detected(&self) -> usize {
        self.frames.iter().filter(|f| f.detection.is_some()).count()
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, TrackIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), TrackIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
