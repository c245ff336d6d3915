use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use droneshow_export::{ExportConfig, ExportPipeline, RecordedScene};

#[derive(Parser)]
#[command(
    name = "droneshow-export",
    version,
    about = "Export drone show animation to per-drone CSV files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one CSV animation file per drone
    Export {
        /// Path to the recorded scene (.json)
        #[arg()]
        scene: PathBuf,

        /// Directory the CSV files are written to
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: ExportOptions,

        /// Report every violating frame, not only the per-drone summary
        #[arg(long)]
        detailed_warnings: bool,

        /// Add the yaw column
        #[arg(long)]
        include_yaw: bool,

        /// Drop the frame number column
        #[arg(long)]
        no_frame_number: bool,

        /// Drop the x, y, z columns
        #[arg(long)]
        no_xyz: bool,

        /// Drop the r, g, b columns
        #[arg(long)]
        no_rgb: bool,
    },

    /// Validate speeds and distances without writing any file
    Check {
        /// Path to the recorded scene (.json)
        #[arg()]
        scene: PathBuf,

        #[command(flatten)]
        options: ExportOptions,
    },
}

#[derive(Args)]
struct ExportOptions {
    /// TOML file with export options; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only consider objects whose name contains this identifier
    #[arg(long)]
    name_filter: Option<String>,

    /// Maximum drone speed (m/s)
    #[arg(long)]
    speed_limit: Option<f64>,

    /// Closest allowed distance between drones (m)
    #[arg(long)]
    distance_limit: Option<f64>,
}

impl ExportOptions {
    fn load(&self) -> Result<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ExportConfig::default(),
        };
        if let Some(identifier) = &self.name_filter {
            config.use_name_filter = true;
            config.name_identifier = identifier.clone();
        }
        if let Some(limit) = self.speed_limit {
            config.speed_limit = limit;
        }
        if let Some(limit) = self.distance_limit {
            config.distance_limit = limit;
        }
        Ok(config)
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Export {
            scene,
            output,
            options,
            detailed_warnings,
            include_yaw,
            no_frame_number,
            no_xyz,
            no_rgb,
        } => {
            let mut config = options.load()?;
            if let Some(dir) = output {
                config.output_directory = dir;
            }
            config.show_detailed_warnings |= detailed_warnings;
            config.include_yaw |= include_yaw;
            config.include_frame_number &= !no_frame_number;
            config.include_xyz &= !no_xyz;
            config.include_rgb &= !no_rgb;
            cmd_export(scene, config)
        }
        Commands::Check { scene, options } => cmd_check(scene, options.load()?),
    }
}

fn cmd_export(scene_path: PathBuf, config: ExportConfig) -> Result<ExitCode> {
    let scene = RecordedScene::load(&scene_path)
        .with_context(|| format!("Failed to load scene {}", scene_path.display()))?;
    let mut pipeline = ExportPipeline::new(scene, config)?;
    let run = pipeline.run().context("Export failed")?;

    for report in run.reports() {
        println!("{}", report.path.display());
    }

    let failed = run.failures().count();
    if failed > 0 {
        eprintln!("{} of {} drones failed to export", failed, run.outcomes.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_check(scene_path: PathBuf, config: ExportConfig) -> Result<ExitCode> {
    let scene = RecordedScene::load(&scene_path)
        .with_context(|| format!("Failed to load scene {}", scene_path.display()))?;
    let mut pipeline = ExportPipeline::new(scene, config)?;
    let report = pipeline.check().context("Check failed")?;

    for violation in &report.violations {
        println!("{violation}");
    }
    println!(
        "{} drones, {} frames, {} violations",
        report.entities,
        report.frames,
        report.violations.len()
    );

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
