mod proximity;
mod sample;
mod thresholds;
mod trajectory;
mod validator;
mod violation;

pub use proximity::{calc_distance, distances_to, pairs_within, pairwise_distances};
pub use sample::{Frame, FrameRange, FrameSample, Position, Rgb};
pub use thresholds::ValidationThresholds;
pub use trajectory::Trajectory;
pub use validator::{
    Evaluation, FIRST_FRAME_SPEED, MotionValidator, SPEED_TIME_STEP, calc_speed,
};
pub use violation::{Violation, round5};
