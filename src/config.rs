use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, ExportResult};
use crate::integration::FieldSelection;
use crate::motion::ValidationThresholds;

/// Options of one export run.
///
/// Can be loaded from a TOML file; every key is optional:
///
/// ```toml
/// use_name_filter = true
/// name_identifier = "drone"
/// show_detailed_warnings = false
/// speed_limit = 3.0
/// distance_limit = 1.5
/// include_frame_number = true
/// include_xyz = true
/// include_yaw = false
/// include_rgb = true
/// output_directory = "animation"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Only export entities whose name contains `name_identifier`
    pub use_name_filter: bool,
    pub name_identifier: String,
    /// Report every violating frame, not only the per-drone summary
    pub show_detailed_warnings: bool,
    /// Maximum drone speed in m/s
    pub speed_limit: f64,
    /// Closest allowed distance between drones in meters
    pub distance_limit: f64,
    pub include_frame_number: bool,
    pub include_xyz: bool,
    pub include_yaw: bool,
    pub include_rgb: bool,
    pub output_directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            use_name_filter: false,
            name_identifier: "drone".to_string(),
            show_detailed_warnings: false,
            speed_limit: 3.0,
            distance_limit: 1.5,
            include_frame_number: true,
            include_xyz: true,
            include_yaw: false,
            include_rgb: true,
            output_directory: PathBuf::from("animation"),
        }
    }
}

impl ExportConfig {
    pub fn load_from_file(path: &Path) -> ExportResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ExportConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Validation thresholds, rejecting negative or non-finite limits.
    pub fn thresholds(&self) -> ExportResult<ValidationThresholds> {
        ValidationThresholds::new(
            self.speed_limit,
            self.distance_limit,
            self.show_detailed_warnings,
        )
    }

    /// Reject settings that cannot produce a valid export.
    pub fn validate(&self) -> ExportResult<()> {
        self.thresholds()?;
        if self.fields().width() == 0 {
            return Err(ExportError::config(
                "At least one of frame number, xyz, yaw or rgb must be exported",
            ));
        }
        Ok(())
    }

    pub fn fields(&self) -> FieldSelection {
        FieldSelection {
            frame_number: self.include_frame_number,
            xyz: self.include_xyz,
            yaw: self.include_yaw,
            rgb: self.include_rgb,
        }
    }

    /// Name filter to apply, if enabled.
    pub fn name_filter(&self) -> Option<&str> {
        self.use_name_filter.then_some(self.name_identifier.as_str())
    }
}
