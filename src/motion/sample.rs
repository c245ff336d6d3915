//! Per-frame sample types shared by the validator, the sampler and the writer.

use nalgebra::Vector3;

/// World-space position in meters.
pub type Position = Vector3<f64>;

/// Scene frame index. Frames may be negative in the host scene.
pub type Frame = i64;

/// 8-bit RGB display color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Fallback color used whenever resolution fails.
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    #[inline]
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert linear float channels to 8-bit.
    ///
    /// Each channel is truncated after scaling by 255, then clamped into
    /// `[0, 255]`. NaN maps to 0.
    pub fn from_unit(channels: [f32; 3]) -> Self {
        let to_u8 = |c: f32| (c * 255.0).trunc().clamp(0.0, 255.0) as u8;
        Self {
            r: to_u8(channels[0]),
            g: to_u8(channels[1]),
            b: to_u8(channels[2]),
        }
    }

    #[inline]
    pub fn to_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Inclusive frame range of one export run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub start: Frame,
    pub end: Frame,
}

impl FrameRange {
    /// Create a range, returning `None` when `start > end`.
    pub fn new(start: Frame, end: Frame) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Iterate frames in increasing order.
    pub fn frames(&self) -> impl Iterator<Item = Frame> {
        self.start..=self.end
    }

    /// Number of frames in the range, saturating for the full `i64` span.
    pub fn len(&self) -> u64 {
        self.end.abs_diff(self.start).saturating_add(1)
    }

    pub fn contains(&self, frame: Frame) -> bool {
        (self.start..=self.end).contains(&frame)
    }
}

/// Immutable record of one entity at one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSample {
    pub frame: Frame,
    pub position: Position,
    /// Yaw in radians, when the sampler was asked for it.
    pub heading: Option<f64>,
    pub color: Rgb,
}

impl FrameSample {
    #[inline]
    pub fn new(frame: Frame, position: Position) -> Self {
        Self {
            frame,
            position,
            heading: None,
            color: Rgb::BLACK,
        }
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }
}
