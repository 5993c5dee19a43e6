//! JSON presets.
//!
//! A preset stores everything needed to reproduce a view: the generation
//! parameters, an optional seed, camera settings and the material.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::camera::{CameraMode, OrbitController};
use crate::error::PresetError;
use crate::params::GalaxyParameters;
use crate::visuals::BlendMode;

/// File name used by the panel's save button.
pub const DEFAULT_PRESET_FILE: &str = "galaxy-preset.json";

/// Camera settings stored in a preset.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraConfig {
    pub y_offset: f32,
    pub zoom: f32,
    pub mode: CameraMode,
    pub paused: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            y_offset: OrbitController::DEFAULT_Y_OFFSET,
            zoom: 1.0,
            mode: CameraMode::Follow,
            paused: false,
        }
    }
}

impl CameraConfig {
    /// Build a controller with these settings.
    pub fn to_controller(&self) -> OrbitController {
        let mut controller = OrbitController::new()
            .with_y_offset(self.y_offset)
            .with_zoom(self.zoom)
            .with_mode(self.mode);
        controller.set_paused(self.paused);
        controller
    }

    /// Capture a controller's current settings.
    pub fn from_controller(controller: &OrbitController) -> Self {
        Self {
            y_offset: controller.y_offset(),
            zoom: controller.zoom(),
            mode: controller.mode(),
            paused: controller.is_paused(),
        }
    }
}

/// Complete viewer configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GalaxyConfig {
    pub name: String,
    pub parameters: GalaxyParameters,
    /// Fixed seed; `None` draws fresh randomness on every regeneration.
    pub seed: Option<u64>,
    pub camera: CameraConfig,
    pub blend_mode: BlendMode,
    /// Sprite image; `None` uses the generated soft disc.
    pub sprite: Option<PathBuf>,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            name: "Untitled".into(),
            parameters: GalaxyParameters::default(),
            seed: None,
            camera: CameraConfig::default(),
            blend_mode: BlendMode::Additive,
            sprite: None,
        }
    }
}

impl GalaxyConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PresetError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a configuration from a JSON file.
    ///
    /// Parameters are pinned into the panel bounds.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PresetError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, PresetError> {
        let mut config: GalaxyConfig = serde_json::from_str(json)?;
        config.parameters = config.parameters.clamped();
        Ok(config)
    }
}
