//! CSV serialization of per-drone trajectories.
//!
//! Every file starts with a single-field row holding the source identifier,
//! followed by one row per frame. Rows are comma separated, quoted with `|`
//! only when needed and terminated with CRLF.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::{ExportError, ExportResult};
use crate::integration::sampler::Entity;
use crate::motion::{FrameSample, Trajectory, round5};

/// Which column groups each data row carries.
///
/// Groups are always written in the order frame, x/y/z, yaw, r/g/b.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub frame_number: bool,
    pub xyz: bool,
    pub yaw: bool,
    pub rgb: bool,
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self {
            frame_number: true,
            xyz: true,
            yaw: false,
            rgb: true,
        }
    }
}

impl FieldSelection {
    /// Every column group.
    pub fn all() -> Self {
        Self {
            frame_number: true,
            xyz: true,
            yaw: true,
            rgb: true,
        }
    }

    /// Number of fields in one data row.
    pub fn width(&self) -> usize {
        usize::from(self.frame_number)
            + 3 * usize::from(self.xyz)
            + usize::from(self.yaw)
            + 3 * usize::from(self.rgb)
    }

    /// Serialize the selected fields of `sample`.
    ///
    /// A missing heading is written as `0.0`.
    pub fn record(&self, sample: &FrameSample) -> Vec<String> {
        let mut record = Vec::with_capacity(self.width());
        if self.frame_number {
            record.push(sample.frame.to_string());
        }
        if self.xyz {
            record.extend(sample.position.iter().map(|c| format_number(*c)));
        }
        if self.yaw {
            record.push(format_number(sample.heading.unwrap_or(0.0)));
        }
        if self.rgb {
            record.extend(sample.color.to_array().iter().map(u8::to_string));
        }
        record
    }
}

/// Format a float rounded to 5 decimals.
///
/// Uses the shortest digits that read back to the same value, `.0` on
/// integral values and exponent notation (`5e-05`, `1e+16`) when the
/// decimal exponent is below -4 or at least 16.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let rounded = round5(value);
    let scientific = format!("{rounded:e}");
    let exponent = scientific
        .split_once('e')
        .and_then(|(mantissa, exp)| Some((mantissa, exp.parse::<i32>().ok()?)));

    match exponent {
        Some((mantissa, exp)) if !(-4..16).contains(&exp) => {
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
        }
        _ => {
            let plain = rounded.to_string();
            if plain.contains('.') {
                plain
            } else {
                format!("{plain}.0")
            }
        }
    }
}

/// Create the output directory and its parents if absent.
pub fn ensure_output_dir(dir: &Path) -> ExportResult<()> {
    fs::create_dir_all(dir).map_err(|source| ExportError::OutputDirectory {
        path: dir.to_path_buf(),
        source,
    })
}

/// Output path for `entity` inside `dir`.
pub fn output_path(dir: &Path, entity: &Entity) -> ExportResult<PathBuf> {
    let name = entity.name();
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return Err(ExportError::InvalidEntityName(name.to_string()));
    }
    Ok(dir.join(entity.file_name()))
}

/// Open CSV stream of one entity.
///
/// The file is flushed by [`TrajectoryWriter::close`]; dropping the writer
/// without closing it still releases the file but swallows flush errors.
pub struct TrajectoryWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl TrajectoryWriter {
    /// Create or truncate `<dir>/<lowercased name>.csv`.
    pub fn open(dir: &Path, entity: &Entity) -> ExportResult<Self> {
        let path = output_path(dir, entity)?;
        ensure_output_dir(dir)?;
        let writer = WriterBuilder::new()
            .delimiter(b',')
            .quote(b'|')
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::CRLF)
            .flexible(true)
            .from_path(&path)?;
        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written so far, excluding the header.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Write the single-field header row.
    pub fn write_header(&mut self, source_identifier: &str) -> ExportResult<()> {
        self.writer.write_record([source_identifier])?;
        Ok(())
    }

    /// Write one data row with the selected fields of `sample`.
    ///
    /// An empty selection is rejected: a zero-field record cannot be told
    /// apart from a row holding one empty field.
    pub fn write_row(&mut self, sample: &FrameSample, fields: &FieldSelection) -> ExportResult<()> {
        if fields.width() == 0 {
            return Err(ExportError::config("No columns selected for export"));
        }
        self.writer.write_record(fields.record(sample))?;
        self.rows += 1;
        Ok(())
    }

    /// Write every sample of `trajectory`.
    pub fn write_trajectory(
        &mut self,
        trajectory: &Trajectory,
        fields: &FieldSelection,
    ) -> ExportResult<()> {
        for sample in trajectory.samples() {
            self.write_row(sample, fields)?;
        }
        Ok(())
    }

    /// Flush and release the file, returning its path.
    pub fn close(mut self) -> ExportResult<PathBuf> {
        self.writer.flush()?;
        Ok(self.path)
    }
}
