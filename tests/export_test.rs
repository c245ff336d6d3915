use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use droneshow_export::integration::{Material, ObjectBuilder, ObjectKind, SceneBuilder};
use droneshow_export::{ExportConfig, ExportError, ExportPipeline, RecordedScene};
use tracing_subscriber::fmt::MakeWriter;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("droneshow-it-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn config(dir: &Path) -> ExportConfig {
    ExportConfig {
        output_directory: dir.to_path_buf(),
        ..Default::default()
    }
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quote(b'|')
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

/// Log sink shared between a test and the subscriber it installs.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn red() -> Material {
    Material::principled("led", [1.0, 0.0, 0.0])
}

#[test]
fn test_two_drones_distance_scenario() {
    let dir = temp_dir("distance");
    let scene = SceneBuilder::new("show")
        .frames(1, 2)
        .object(
            ObjectBuilder::new("drone_a")
                .material(red())
                .path(1, &[[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]),
        )
        .object(
            ObjectBuilder::new("drone_b")
                .material(red())
                .path(1, &[[2.0, 0.0, 0.0], [1.0, 0.0, 0.0]]),
        )
        .build()
        .unwrap();

    let config = ExportConfig {
        speed_limit: 100.0,
        distance_limit: 1.5,
        show_detailed_warnings: true,
        ..config(&dir)
    };
    let mut pipeline = ExportPipeline::new(scene, config).unwrap();
    let run = pipeline.run().unwrap();
    assert!(run.is_success());

    for (name, other) in [("drone_a", "drone_b"), ("drone_b", "drone_a")] {
        let report = run.report(name).unwrap();
        assert!(report.distance_violated);
        assert!(!report.speed_violated);
        assert_eq!(report.min_distance, Some(1.0));

        // Only frame 2 is too close
        let detailed: Vec<&String> = report
            .messages
            .iter()
            .filter(|m| m.starts_with("Distance between"))
            .collect();
        assert_eq!(detailed.len(), 1);
        assert_eq!(
            detailed[0],
            &format!(
                "Distance between drones '{}' and '{}' is less than 1.5 m (1 m) on frame 2",
                name, other
            )
        );
        assert!(
            report
                .messages
                .contains(&format!("Drone '{}' distance limits exceeded", name))
        );
    }

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_single_drone_speed_scenario() {
    let dir = temp_dir("speed");
    let scene = SceneBuilder::new("show")
        .frames(1, 3)
        .object(
            ObjectBuilder::new("Drone_1")
                .material(red())
                .path(1, &[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, 5.0]]),
        )
        .build()
        .unwrap();

    let config = ExportConfig {
        speed_limit: 3.0,
        show_detailed_warnings: true,
        ..config(&dir)
    };
    let mut pipeline = ExportPipeline::new(scene, config).unwrap();
    let run = pipeline.run().unwrap();
    let report = run.report("Drone_1").unwrap();

    assert!(report.speed_violated);
    assert!(!report.distance_violated);
    assert!((report.max_speed.unwrap() - 40.0).abs() < 1e-9);
    assert_eq!(report.min_distance, None);
    assert_eq!(
        report.messages,
        vec![
            "Speed of drone 'Drone_1' is greater than 3 m/s (10 m/s) on frame 2".to_string(),
            "Speed of drone 'Drone_1' is greater than 3 m/s (40 m/s) on frame 3".to_string(),
            "Drone 'Drone_1' speed limits exceeded".to_string(),
            "Animation file exported for drone 'Drone_1'".to_string(),
        ]
    );

    assert_eq!(report.path, dir.join("drone_1.csv"));
    let text = fs::read_to_string(&report.path).unwrap();
    assert_eq!(
        text,
        "show\r\n\
         1,0.0,0.0,0.0,255,0,0\r\n\
         2,0.0,0.0,1.0,255,0,0\r\n\
         3,0.0,0.0,5.0,255,0,0\r\n"
    );

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_summary_only_without_detailed_warnings() {
    let dir = temp_dir("summary");
    let scene = SceneBuilder::new("show")
        .frames(1, 2)
        .object(ObjectBuilder::new("drone").path(1, &[[0.0; 3], [9.0, 0.0, 0.0]]))
        .build()
        .unwrap();

    let mut pipeline = ExportPipeline::new(scene, config(&dir)).unwrap();
    let run = pipeline.run().unwrap();
    let report = run.report("drone").unwrap();
    assert_eq!(
        report.messages,
        vec![
            "Drone 'drone' speed limits exceeded".to_string(),
            "Animation file exported for drone 'drone'".to_string(),
        ]
    );

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_color_fallback_scenario() {
    let dir = temp_dir("color");
    let scene = SceneBuilder::new("show")
        .frames(1, 2)
        .object(ObjectBuilder::new("bare").path(1, &[[0.0; 3], [0.0, 0.0, 0.1]]))
        .object(
            ObjectBuilder::new("lamp")
                .kind(ObjectKind::Light)
                .material(red())
                .path(1, &[[5.0; 3], [5.0; 3]]),
        )
        .build()
        .unwrap();

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();

    let mut pipeline = ExportPipeline::new(scene, config(&dir)).unwrap();
    let run = tracing::subscriber::with_default(subscriber, || pipeline.run().unwrap());
    assert!(run.is_success());

    for name in ["bare", "lamp"] {
        let rows = read_rows(&dir.join(format!("{name}.csv")));
        assert_eq!(rows.len(), 3);
        for row in &rows[1..] {
            assert_eq!(&row[4..], ["0", "0", "0"]);
        }
    }

    let logs = logs.contents();
    assert!(logs.contains("WARN"));
    assert!(logs.contains("Could not resolve color of 'bare'"));
    assert!(logs.contains("Could not resolve color of 'lamp'"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_round_trip_rounding_and_order() {
    let dir = temp_dir("roundtrip");
    let locations = [
        [0.123_456_789, -1.000_004_9, 10.0],
        [30.318_595, -15.576_685, 10.000_005_1],
        [1.0 / 3.0, 2.0 / 3.0, -7.5],
    ];
    let expected = [
        ["0.12346", "-1.0", "10.0"],
        ["30.31859", "-15.57668", "10.00001"],
        ["0.33333", "0.66667", "-7.5"],
    ];
    let scene = SceneBuilder::new("roundtrip")
        .frames(-1, 1)
        .object(ObjectBuilder::new("drone").material(red()).path(-1, &locations))
        .build()
        .unwrap();

    let config = ExportConfig {
        speed_limit: 1000.0,
        include_yaw: true,
        ..config(&dir)
    };
    let mut pipeline = ExportPipeline::new(scene, config).unwrap();
    pipeline.run().unwrap();

    let rows = read_rows(&dir.join("drone.csv"));
    assert_eq!(rows[0], vec!["roundtrip".to_string()]);

    let frames: Vec<i64> = rows[1..].iter().map(|r| r[0].parse().unwrap()).collect();
    assert_eq!(frames, vec![-1, 0, 1]);

    for (row, xyz) in rows[1..].iter().zip(&expected) {
        assert_eq!(row.len(), 8);
        assert_eq!(&row[1..4], xyz);
        assert_eq!(row[4], "0.0");
        assert_eq!(&row[5..], ["255", "0", "0"]);
    }

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_rerun_is_byte_identical() {
    let dir = temp_dir("idempotent");
    let build = || {
        SceneBuilder::new("show")
            .frames(1, 3)
            .object(
                ObjectBuilder::new("drone_1")
                    .material(red())
                    .path(1, &[[0.1, 0.2, 0.3], [0.4, 0.5, 0.6], [0.7, 0.8, 0.9]]),
            )
            .object(
                ObjectBuilder::new("drone_2")
                    .material(Material::diffuse("blue", [0.0, 0.0, 1.0]))
                    .path(1, &[[3.0, 0.0, 1.0], [3.0, 0.0, 1.2], [3.0, 0.0, 1.4]]),
            )
            .build()
            .unwrap()
    };

    ExportPipeline::new(build(), config(&dir)).unwrap().run().unwrap();
    let first: Vec<Vec<u8>> = ["drone_1.csv", "drone_2.csv"]
        .iter()
        .map(|f| fs::read(dir.join(f)).unwrap())
        .collect();

    ExportPipeline::new(build(), config(&dir)).unwrap().run().unwrap();
    let second: Vec<Vec<u8>> = ["drone_1.csv", "drone_2.csv"]
        .iter()
        .map(|f| fs::read(dir.join(f)).unwrap())
        .collect();

    assert_eq!(first, second);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_single_frame_range() {
    let dir = temp_dir("single");
    let scene = SceneBuilder::new("show")
        .frames(42, 42)
        .object(ObjectBuilder::new("a").at(42, [0.0; 3]))
        .object(ObjectBuilder::new("b").at(42, [10.0; 3]))
        .build()
        .unwrap();

    let mut pipeline = ExportPipeline::new(scene, config(&dir)).unwrap();
    let run = pipeline.run().unwrap();
    for report in run.reports() {
        assert_eq!(report.rows, 1);
        assert_eq!(read_rows(&report.path).len(), 2);
        assert_eq!(report.max_speed, None);
    }
    assert_eq!(run.reports().count(), 2);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_failing_drone_does_not_stop_others() {
    let dir = temp_dir("isolation");
    let scene = SceneBuilder::new("show")
        .frames(1, 2)
        .object(ObjectBuilder::new("gap").at(1, [0.0; 3]))
        .object(ObjectBuilder::new("../escape").path(1, &[[5.0; 3], [5.0; 3]]))
        .build()
        .unwrap();

    let config = ExportConfig {
        use_name_filter: true,
        name_identifier: "a".into(),
        ..config(&dir)
    };
    let mut pipeline = ExportPipeline::new(scene, config).unwrap();
    let run = pipeline.run().unwrap();

    assert!(!run.is_success());
    let failures: Vec<_> = run.failures().collect();
    assert_eq!(failures.len(), 2);
    assert!(matches!(
        failures[0].1,
        ExportError::Sampler { frame: 2, .. }
    ));
    assert!(matches!(failures[1].1, ExportError::InvalidEntityName(_)));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_neighbour_failure_is_isolated() {
    let dir = temp_dir("neighbour");
    let scene = SceneBuilder::new("show")
        .frames(1, 2)
        .object(ObjectBuilder::new("drone_1").path(1, &[[0.0; 3], [0.0; 3]]))
        .object(ObjectBuilder::new("drone_2").at(1, [5.0; 3]))
        .object(ObjectBuilder::new("other").path(1, &[[9.0; 3], [9.0; 3]]))
        .build()
        .unwrap();

    let config = ExportConfig {
        use_name_filter: true,
        name_identifier: "drone".into(),
        ..config(&dir)
    };
    let mut pipeline = ExportPipeline::new(scene, config).unwrap();
    let run = pipeline.run().unwrap();

    assert_eq!(run.outcomes.len(), 2);
    assert_eq!(run.failures().count(), 2);
    for (_, err) in run.failures() {
        assert!(matches!(
            err,
            ExportError::Sampler { entity, frame: 2, .. } if entity == "drone_2"
        ));
    }
    assert!(!dir.join("other.csv").exists());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_load_scene_file() {
    let dir = temp_dir("load");
    fs::create_dir_all(&dir).unwrap();
    let scene_path = dir.join("finale.json");
    fs::write(
        &scene_path,
        r#"{
            "frame_start": 0,
            "frame_end": 1,
            "objects": [
                {
                    "name": "Drone",
                    "materials": [{"name": "m", "diffuse_color": [0.0, 1.0, 0.0]}],
                    "frames": [
                        {"frame": 0, "location": [1.0, 2.0, 3.0]},
                        {"frame": 1, "location": [1.0, 2.0, 3.05]}
                    ]
                }
            ]
        }"#,
    )
    .unwrap();

    let scene = RecordedScene::load(&scene_path).unwrap();
    let out = dir.join("out");
    let mut pipeline = ExportPipeline::new(scene, config(&out)).unwrap();
    let run = pipeline.run().unwrap();
    assert!(run.is_success());

    let text = fs::read_to_string(out.join("drone.csv")).unwrap();
    assert_eq!(text, "finale\r\n0,1.0,2.0,3.0,0,255,0\r\n1,1.0,2.0,3.05,0,255,0\r\n");

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_case_insensitive_file_name_collision() {
    let dir = temp_dir("collision");
    let scene = SceneBuilder::new("show")
        .object(ObjectBuilder::new("Drone").material(red()).at(1, [0.0; 3]))
        .object(ObjectBuilder::new("drone").material(red()).at(1, [9.0; 3]))
        .build()
        .unwrap();

    let mut pipeline = ExportPipeline::new(scene, config(&dir)).unwrap();
    let run = pipeline.run().unwrap();

    assert!(!run.is_success());
    assert!(run.report("Drone").is_some());
    let failures: Vec<_> = run.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "drone");
    assert!(matches!(
        failures[0].1,
        ExportError::OutputCollision { previous, file, .. }
            if previous == "Drone" && file == "drone.csv"
    ));

    // The first drone's file is left intact
    let text = fs::read_to_string(dir.join("drone.csv")).unwrap();
    assert_eq!(text, "show\r\n1,0.0,0.0,0.0,255,0,0\r\n");

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_huge_frame_range_fails_per_drone() {
    let dir = temp_dir("huge");
    let scene = SceneBuilder::new("show")
        .frames(0, 1_000_000_000_000)
        .object(ObjectBuilder::new("drone").at(0, [0.0; 3]))
        .build()
        .unwrap();

    let mut pipeline = ExportPipeline::new(scene, config(&dir)).unwrap();
    let run = pipeline.run().unwrap();

    let failures: Vec<_> = run.failures().collect();
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0].1, ExportError::Sampler { frame: 1, .. }));
    assert_eq!(read_rows(&dir.join("drone.csv")).len(), 2);

    fs::remove_dir_all(&dir).unwrap();
}
