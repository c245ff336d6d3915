use crate::error::{ExportError, ExportResult};

/// Limits the motion validator checks every frame against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationThresholds {
    speed_limit: f64,
    distance_limit: f64,
    verbose_warnings: bool,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            speed_limit: 3.0,
            distance_limit: 1.5,
            verbose_warnings: false,
        }
    }
}

impl ValidationThresholds {
    /// Create thresholds, rejecting negative or non-finite limits.
    pub fn new(
        speed_limit: f64,
        distance_limit: f64,
        verbose_warnings: bool,
    ) -> ExportResult<Self> {
        check_limit("speed_limit", speed_limit)?;
        check_limit("distance_limit", distance_limit)?;
        Ok(Self {
            speed_limit,
            distance_limit,
            verbose_warnings,
        })
    }

    /// Maximum allowed speed in m/s.
    pub fn speed_limit(&self) -> f64 {
        self.speed_limit
    }

    /// Closest allowed distance between two entities in meters.
    pub fn distance_limit(&self) -> f64 {
        self.distance_limit
    }

    pub fn verbose_warnings(&self) -> bool {
        self.verbose_warnings
    }
}

fn check_limit(name: &'static str, value: f64) -> ExportResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ExportError::config(format!(
            "{name} must be a finite value >= 0, got {value}"
        )))
    }
}
