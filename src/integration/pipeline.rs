//! ExportPipeline driving a scene sampler through validation and CSV output.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::config::ExportConfig;
use crate::error::{ExportError, ExportResult};
use crate::integration::sampler::{Entity, SceneSampler};
use crate::integration::writer::{FieldSelection, TrajectoryWriter, ensure_output_dir};
use crate::motion::{
    Frame, FrameRange, FrameSample, MotionValidator, Position, Trajectory, Violation,
};

/// Aggregated result of exporting one drone.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub entity: String,
    pub path: PathBuf,
    /// Data rows written, excluding the header
    pub rows: usize,
    pub speed_violated: bool,
    pub distance_violated: bool,
    /// Highest speed computed between consecutive frames
    pub max_speed: Option<f64>,
    /// Closest distance to another drone over the whole range
    pub min_distance: Option<f64>,
    /// Per-frame warnings (detailed mode only), then the summary lines
    pub messages: Vec<String>,
}

/// Outcome of one drone within a run.
#[derive(Debug)]
pub struct EntityOutcome {
    pub entity: String,
    pub result: ExportResult<ExportReport>,
}

/// Outcome of a whole export run, one entry per selected drone.
#[derive(Debug, Default)]
pub struct ExportRun {
    pub outcomes: Vec<EntityOutcome>,
}

impl ExportRun {
    pub fn reports(&self) -> impl Iterator<Item = &ExportReport> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ExportError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.entity.as_str(), e)))
    }

    pub fn report(&self, entity: &str) -> Option<&ExportReport> {
        self.reports().find(|r| r.entity == entity)
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }
}

/// Result of a dry run that validates without writing files.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub entities: usize,
    pub frames: u64,
    pub violations: Vec<Violation>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Running state of one drone while its frames are processed.
#[derive(Debug, Default)]
struct EntityState {
    speed_violated: bool,
    distance_violated: bool,
    max_speed: Option<f64>,
    min_distance: Option<f64>,
    messages: Vec<String>,
}

/// Export orchestrator.
///
/// For every selected drone: open its CSV file, then for every frame move
/// the sampler's time cursor, sample, validate and write a row. Drones are
/// independent; one failing drone does not stop the others.
pub struct ExportPipeline<S: SceneSampler> {
    sampler: S,
    config: ExportConfig,
    validator: MotionValidator,
    fields: FieldSelection,
}

impl<S: SceneSampler> ExportPipeline<S> {
    /// Create a pipeline, rejecting invalid configuration up front.
    pub fn new(sampler: S, config: ExportConfig) -> ExportResult<Self> {
        config.validate()?;
        let validator = MotionValidator::new(config.thresholds()?);
        let fields = config.fields();
        Ok(Self {
            sampler,
            config,
            validator,
            fields,
        })
    }

    /// Create a pipeline with default configuration.
    pub fn with_default_config(sampler: S) -> Self {
        let config = ExportConfig::default();
        Self {
            sampler,
            validator: MotionValidator::default(),
            fields: config.fields(),
            config,
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    pub fn sampler_mut(&mut self) -> &mut S {
        &mut self.sampler
    }

    pub fn into_sampler(self) -> S {
        self.sampler
    }

    /// Visible entities passing the configured name filter.
    pub fn selected_entities(&self) -> Vec<Entity> {
        let entities = self.sampler.entities();
        match self.config.name_filter() {
            Some(identifier) => entities
                .into_iter()
                .filter(|e| e.matches_filter(identifier))
                .collect(),
            None => entities,
        }
    }

    /// Export every selected drone to `<output_directory>/<name>.csv`.
    ///
    /// Fails as a whole only when the run cannot start (bad frame range,
    /// output directory not creatable). Per-drone failures are reported in
    /// the returned [`ExportRun`].
    pub fn run(&mut self) -> ExportResult<ExportRun> {
        let range = self.sampler.checked_frame_range()?;
        let entities = self.selected_entities();
        let output_dir = self.config.output_directory.clone();
        ensure_output_dir(&output_dir)?;
        let source = self.sampler.source_identifier();

        info!(
            "Exporting {} drones over frames {}..={} to {}",
            entities.len(),
            range.start,
            range.end,
            output_dir.display()
        );

        let mut outcomes = Vec::with_capacity(entities.len());
        let mut written: HashMap<String, String> = HashMap::with_capacity(entities.len());
        for entity in &entities {
            let result = match written.get(&entity.file_name()) {
                Some(previous) => Err(ExportError::OutputCollision {
                    entity: entity.name().to_string(),
                    previous: previous.clone(),
                    file: entity.file_name(),
                }),
                None => {
                    written.insert(entity.file_name(), entity.name().to_string());
                    self.export_entity(entity, &entities, range, &source, &output_dir)
                }
            };
            if let Err(err) = &result {
                error!("Export of drone '{}' failed: {}", entity.name(), err);
            }
            outcomes.push(EntityOutcome {
                entity: entity.name().to_string(),
                result,
            });
        }

        Ok(ExportRun { outcomes })
    }

    fn export_entity(
        &mut self,
        entity: &Entity,
        entities: &[Entity],
        range: FrameRange,
        source: &str,
        output_dir: &Path,
    ) -> ExportResult<ExportReport> {
        let mut writer = TrajectoryWriter::open(output_dir, entity)?;
        writer.write_header(source)?;

        let mut trajectory = Trajectory::new(entity.name());
        let mut state = EntityState::default();

        for frame in range.frames() {
            self.sampler.set_time_cursor(frame);

            let sample = self.sample(entity, frame)?;
            let frame_positions = self.frame_positions(entity, &sample.position, entities, frame)?;
            let neighbours: Vec<(&str, Position)> = frame_positions
                .iter()
                .map(|(name, p)| (name.as_str(), *p))
                .collect();

            let previous = trajectory.previous_position();
            let evaluation = self.validator.evaluate(
                entity.name(),
                frame,
                &sample.position,
                &neighbours,
                previous.as_ref(),
            );

            if previous.is_some() {
                let speed = evaluation.speed;
                state.max_speed = Some(state.max_speed.map_or(speed, |s| s.max(speed)));
            }
            if let Some(d) = evaluation.nearest_distance {
                state.min_distance = Some(state.min_distance.map_or(d, |m| m.min(d)));
            }
            state.speed_violated |= evaluation.speed_violated();
            state.distance_violated |= evaluation.distance_violated();
            if self.validator.thresholds().verbose_warnings() {
                state
                    .messages
                    .extend(evaluation.violations.iter().map(ToString::to_string));
            }

            debug!(
                drone = entity.name(),
                frame,
                speed = evaluation.speed,
                "x={} y={} z={}",
                sample.position.x,
                sample.position.y,
                sample.position.z
            );

            trajectory.push(sample)?;
            writer.write_row(&sample, &self.fields)?;
        }

        if state.speed_violated {
            let message = format!("Drone '{}' speed limits exceeded", entity.name());
            warn!("{message}");
            state.messages.push(message);
        }
        if state.distance_violated {
            let message = format!("Drone '{}' distance limits exceeded", entity.name());
            warn!("{message}");
            state.messages.push(message);
        }

        let rows = writer.rows();
        let path = writer.close()?;
        let message = format!("Animation file exported for drone '{}'", entity.name());
        info!("{message}");
        state.messages.push(message);

        Ok(ExportReport {
            entity: entity.name().to_string(),
            path,
            rows,
            speed_violated: state.speed_violated,
            distance_violated: state.distance_violated,
            max_speed: state.max_speed,
            min_distance: state.min_distance,
            messages: state.messages,
        })
    }

    /// Sample `entity` at the current time cursor.
    fn sample(&self, entity: &Entity, frame: Frame) -> ExportResult<FrameSample> {
        let position = self
            .sampler
            .position(entity)
            .map_err(|e| ExportError::sampler(entity.name(), frame, e))?;
        let mut sample = FrameSample::new(frame, position);

        if self.fields.yaw {
            let heading = self
                .sampler
                .heading(entity)
                .map_err(|e| ExportError::sampler(entity.name(), frame, e))?;
            sample = sample.with_heading(heading);
        }
        if self.fields.rgb {
            sample = sample.with_color(self.sampler.color(entity));
        }
        Ok(sample)
    }

    /// Positions of every selected drone at the current time cursor.
    ///
    /// `own_position` is reused for `entity` instead of sampling it twice.
    fn frame_positions(
        &self,
        entity: &Entity,
        own_position: &Position,
        entities: &[Entity],
        frame: Frame,
    ) -> ExportResult<Vec<(String, Position)>> {
        entities
            .iter()
            .map(|other| {
                if other == entity {
                    return Ok((other.name().to_string(), *own_position));
                }
                self.sampler
                    .position(other)
                    .map(|p| (other.name().to_string(), p))
                    .map_err(|e| ExportError::sampler(other.name(), frame, e))
            })
            .collect()
    }

    /// Validate the whole range frame by frame without writing any file.
    ///
    /// Speed violations are reported per drone, proximity violations once
    /// per conflicting pair.
    pub fn check(&mut self) -> ExportResult<CheckReport> {
        let range = self.sampler.checked_frame_range()?;
        let entities = self.selected_entities();
        let mut previous: HashMap<String, Position> = HashMap::with_capacity(entities.len());
        let mut violations = Vec::new();

        for frame in range.frames() {
            self.sampler.set_time_cursor(frame);

            let mut frame_positions = Vec::with_capacity(entities.len());
            for entity in &entities {
                let position = self
                    .sampler
                    .position(entity)
                    .map_err(|e| ExportError::sampler(entity.name(), frame, e))?;
                frame_positions.push((entity.name(), position));
            }

            for (name, position) in &frame_positions {
                let evaluation =
                    self.validator
                        .evaluate(name, frame, position, &[], previous.get(*name));
                violations.extend(evaluation.violations);
            }
            violations.extend(self.validator.frame_conflicts(frame, &frame_positions));

            for (name, position) in frame_positions {
                previous.insert(name.to_string(), position);
            }
        }

        if violations.is_empty() {
            info!("No motion violations in {} drones", entities.len());
        } else {
            warn!("Found {} motion violations", violations.len());
        }

        Ok(CheckReport {
            entities: entities.len(),
            frames: range.len(),
            violations,
        })
    }
}
