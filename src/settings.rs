//! Project settings (realpx.yaml) parsing.
//!
//! Settings supply defaults for detection and transformation; command-line
//! flags override them. Every field is optional in the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::detect::{CandidateRange, DetectOptions, DEFAULT_CHANGE_THRESHOLD};
use crate::error::{PxError, Result};
use crate::types::{BitDepth, ColorExclusionSpec, SampleMode};

/// Settings file name looked up in the working directory.
pub const SETTINGS_FILENAME: &str = "realpx.yaml";

/// Default exclusion tolerance.
pub const DEFAULT_TOLERANCE: u32 = 10;

/// Grid detection defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Smallest cell size to try (default 2).
    pub min_size: Option<u32>,
    /// Largest cell size to try (default: half the region's smaller side).
    pub max_size: Option<u32>,
    /// Per-channel difference that counts as a colour change.
    pub change_threshold: u8,
    /// Search for the grid offset as well as the size.
    pub detect_offset: bool,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            min_size: None,
            max_size: None,
            change_threshold: DEFAULT_CHANGE_THRESHOLD,
            detect_offset: false,
        }
    }
}

/// Settings loaded from realpx.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub detection: DetectionSettings,

    /// Exclusion tolerance (Euclidean RGB distance).
    pub tolerance: u32,

    /// Output bits per channel: 1, 2, 4 or 8.
    pub bit_depth: u32,

    /// Colours made transparent, as hex or CSS names.
    pub exclude: Vec<String>,

    /// Cell sampling mode.
    pub sample: SampleMode,

    /// Suffix for restored images (`sprite.png` -> `sprite_real.png`).
    pub output_suffix: String,

    /// Suffix for grid overlay images.
    pub grid_suffix: String,

    /// Fit output into a square of this size (0 keeps the original).
    pub resize: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            detection: DetectionSettings::default(),
            tolerance: DEFAULT_TOLERANCE,
            bit_depth: BitDepth::Eight.bits(),
            exclude: vec![],
            sample: SampleMode::Center,
            output_suffix: "_real".to_string(),
            grid_suffix: "_grid".to_string(),
            resize: 0,
        }
    }
}

impl Settings {
    /// Load settings from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PxError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read settings: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse settings from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_yaml::from_str(content).map_err(|e| PxError::Config {
            message: format!("Invalid settings: {}", e),
            help: Some(format!("Check {} syntax", SETTINGS_FILENAME)),
        })?;
        settings.bit_depth()?;
        Ok(settings)
    }

    /// Configured bit depth.
    pub fn bit_depth(&self) -> Result<BitDepth> {
        BitDepth::try_from(self.bit_depth)
    }

    /// Load `explicit` if given, otherwise `realpx.yaml` from `dir` when it
    /// exists, otherwise defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        let candidate = dir.join(SETTINGS_FILENAME);
        if candidate.is_file() {
            return Ok((Self::load(&candidate)?, Some(candidate)));
        }
        Ok((Self::default(), None))
    }

    /// Detection options with optional overrides applied.
    pub fn detect_options(
        &self,
        min_size: Option<u32>,
        max_size: Option<u32>,
        detect_offset: bool,
    ) -> Result<DetectOptions> {
        let min = min_size.or(self.detection.min_size);
        let max = max_size.or(self.detection.max_size);
        let range = match (min, max) {
            (None, None) => None,
            (min, Some(max)) => Some(CandidateRange::new(min.unwrap_or(2), max)?),
            // Upper bound is filled in from the region at detection time
            (Some(min), None) => Some(CandidateRange::new(min, u32::MAX)?),
        };

        Ok(DetectOptions {
            range,
            change_threshold: self.detection.change_threshold,
            detect_offset: detect_offset || self.detection.detect_offset,
        })
    }

    /// Exclusion spec from configured colours plus `extra`, at `tolerance`
    /// or the configured default.
    pub fn exclusions(
        &self,
        extra: &[String],
        tolerance: Option<u32>,
    ) -> Result<ColorExclusionSpec> {
        let tolerance = tolerance.unwrap_or(self.tolerance);
        let all: Vec<&str> = self
            .exclude
            .iter()
            .chain(extra)
            .map(String::as_str)
            .collect();
        ColorExclusionSpec::parse_all(&all, tolerance)
    }
}

/// Commented default settings, as written by `realpx init`.
pub fn default_settings_yaml() -> String {
    let defaults = Settings::default();
    format!(
        "# realpx settings. Command-line flags override these values.\n\
         detection:\n\
         \x20 # min_size: 2\n\
         \x20 # max_size: 64\n\
         \x20 change_threshold: {threshold}\n\
         \x20 detect_offset: false\n\
         tolerance: {tolerance}\n\
         bit_depth: {bits}\n\
         exclude: []\n\
         sample: center\n\
         output_suffix: \"{out}\"\n\
         grid_suffix: \"{grid}\"\n\
         resize: 0\n",
        threshold = defaults.detection.change_threshold,
        tolerance = defaults.tolerance,
        bits = defaults.bit_depth,
        out = defaults.output_suffix,
        grid = defaults.grid_suffix,
    )
}
