use std::fmt;

use crate::motion::sample::Frame;

/// Motion constraint breached at a given frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// Entity moved faster than the speed limit since the previous frame
    Speed {
        entity: String,
        frame: Frame,
        speed: f64,
        limit: f64,
    },
    /// Entity came closer than the distance limit to another entity
    Proximity {
        entity: String,
        other: String,
        frame: Frame,
        distance: f64,
        limit: f64,
    },
}

impl Violation {
    pub fn frame(&self) -> Frame {
        match self {
            Self::Speed { frame, .. } | Self::Proximity { frame, .. } => *frame,
        }
    }

    pub fn is_speed(&self) -> bool {
        matches!(self, Self::Speed { .. })
    }

    pub fn is_proximity(&self) -> bool {
        matches!(self, Self::Proximity { .. })
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Speed {
                entity,
                frame,
                speed,
                limit,
            } => write!(
                f,
                "Speed of drone '{}' is greater than {} m/s ({} m/s) on frame {}",
                entity,
                round5(*limit),
                round5(*speed),
                frame
            ),
            Self::Proximity {
                entity,
                other,
                frame,
                distance,
                limit,
            } => write!(
                f,
                "Distance between drones '{}' and '{}' is less than {} m ({} m) on frame {}",
                entity,
                other,
                round5(*limit),
                round5(*distance),
                frame
            ),
        }
    }
}

/// Round to 5 decimal digits, the precision used for all exported numbers.
///
/// The result is the closest `f64` to the correctly rounded decimal, ties
/// going to even.
pub fn round5(value: f64) -> f64 {
    format!("{value:.5}").parse().unwrap_or(value)
}
