//! Speed and proximity validation of sampled drone motion.

use tracing::warn;

use crate::motion::proximity::{calc_distance, distances_to, pairs_within, pairwise_distances};
use crate::motion::sample::{Frame, Position};
use crate::motion::thresholds::ValidationThresholds;
use crate::motion::violation::Violation;

/// Seconds assumed between two consecutive frames when computing speed.
///
/// This is a fixed sampling convention (10 frames per second) and is not
/// derived from the scene frame rate. Exported speed warnings depend on it.
pub const SPEED_TIME_STEP: f64 = 0.1;

/// Speed reported for the first frame of a trajectory.
pub const FIRST_FRAME_SPEED: f64 = 1.0;

/// Speed between two consecutive samples, in m/s.
#[inline]
pub fn calc_speed(from: &Position, to: &Position) -> f64 {
    calc_distance(from, to) / SPEED_TIME_STEP
}

/// Result of validating one entity at one frame.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub speed: f64,
    /// Smallest distance to another entity this frame, if any was checked.
    pub nearest_distance: Option<f64>,
    pub violations: Vec<Violation>,
}

impl Evaluation {
    pub fn speed_violated(&self) -> bool {
        self.violations.iter().any(Violation::is_speed)
    }

    pub fn distance_violated(&self) -> bool {
        self.violations.iter().any(Violation::is_proximity)
    }
}

/// Stateless motion validator.
///
/// Running state (the previous position) lives with the caller, one per
/// trajectory.
#[derive(Debug, Clone, Default)]
pub struct MotionValidator {
    thresholds: ValidationThresholds,
}

impl MotionValidator {
    pub fn new(thresholds: ValidationThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ValidationThresholds {
        &self.thresholds
    }

    /// Validate `entity` at `frame`.
    ///
    /// `frame_positions` holds every tracked entity at this frame; the entry
    /// named `entity` is skipped. `previous` is the entity's position at the
    /// previous frame, `None` on the first frame of its trajectory.
    pub fn evaluate(
        &self,
        entity: &str,
        frame: Frame,
        position: &Position,
        frame_positions: &[(&str, Position)],
        previous: Option<&Position>,
    ) -> Evaluation {
        let mut violations = Vec::new();

        let speed = match previous {
            Some(prev) => calc_speed(prev, position),
            None => FIRST_FRAME_SPEED,
        };
        if speed > self.thresholds.speed_limit() {
            violations.push(Violation::Speed {
                entity: entity.to_string(),
                frame,
                speed,
                limit: self.thresholds.speed_limit(),
            });
        }

        let others: Vec<(&str, Position)> = frame_positions
            .iter()
            .filter(|(name, _)| *name != entity)
            .copied()
            .collect();
        let other_points: Vec<Position> = others.iter().map(|(_, p)| *p).collect();
        let dists = distances_to(position, &other_points);

        let mut nearest_distance: Option<f64> = None;
        for ((other, _), &distance) in others.iter().zip(dists.iter()) {
            nearest_distance = Some(nearest_distance.map_or(distance, |d| d.min(distance)));
            if distance < self.thresholds.distance_limit() {
                violations.push(Violation::Proximity {
                    entity: entity.to_string(),
                    other: other.to_string(),
                    frame,
                    distance,
                    limit: self.thresholds.distance_limit(),
                });
            }
        }

        if self.thresholds.verbose_warnings() {
            for violation in &violations {
                warn!("{violation}");
            }
        }

        Evaluation {
            speed,
            nearest_distance,
            violations,
        }
    }

    /// Check every unordered pair of entities at one frame.
    ///
    /// Each conflicting pair is reported once, with the entity listed first
    /// in `frame_positions` as `entity`.
    pub fn frame_conflicts(
        &self,
        frame: Frame,
        frame_positions: &[(&str, Position)],
    ) -> Vec<Violation> {
        let points: Vec<Position> = frame_positions.iter().map(|(_, p)| *p).collect();
        let dists = pairwise_distances(&points);

        pairs_within(&dists, self.thresholds.distance_limit())
            .into_iter()
            .map(|(i, j)| Violation::Proximity {
                entity: frame_positions[i].0.to_string(),
                other: frame_positions[j].0.to_string(),
                frame,
                distance: dists[[i, j]],
                limit: self.thresholds.distance_limit(),
            })
            .collect()
    }
}
