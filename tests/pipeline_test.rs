//! Integration tests for the sampling, feature and session pipeline

use crossbeam_channel::unbounded;
use std::path::PathBuf;
use std::time::Duration;
use vibesense_agent::classifier::{classify, LinearModel};
use vibesense_agent::core::schema::{dataset_header, INFERENCE_ORDER};
use vibesense_agent::core::{
    compute_features, BasicStatFeatures, BlockSampler, ManualClock, TimingSampler,
};
use vibesense_agent::dataset::DatasetWriter;
use vibesense_agent::sensor::{Profile, SensorError, SimulatedSensor};
use vibesense_agent::session::{
    record_dataset, run_inference, InferenceOptions, SessionError, SessionStats,
};
use vibesense_agent::{Config, Label};

const FS: f64 = 200.0;
const BLOCK: usize = 64;

fn sampler(profile: Profile) -> BlockSampler<SimulatedSensor, ManualClock> {
    BlockSampler::with_clock(SimulatedSensor::new(profile), ManualClock::new(), FS, BLOCK)
        .expect("valid sampler")
}

fn test_dir() -> PathBuf {
    std::env::temp_dir().join(format!("vibesense-pipeline-{}", uuid::Uuid::new_v4()))
}

/// Vibration when the magnitude spread exceeds 10 counts.
fn threshold_model() -> LinearModel {
    let mut coefficients = vec![0.0; 11];
    let std_mag = INFERENCE_ORDER
        .iter()
        .position(|n| *n == "std_mag")
        .unwrap();
    coefficients[std_mag] = 1.0;

    LinearModel {
        features: INFERENCE_ORDER.iter().map(|s| s.to_string()).collect(),
        scaler_mean: vec![0.0; 11],
        scaler_scale: vec![1.0; 11],
        coefficients,
        intercept: -10.0,
    }
}

#[test]
fn test_block_from_simulated_sensor() {
    let clock = ManualClock::new();
    let mut sampler =
        BlockSampler::with_clock(SimulatedSensor::new(Profile::Idle), clock.clone(), FS, BLOCK)
            .unwrap();

    let block = sampler.acquire_block().unwrap();
    assert_eq!(block.len(), BLOCK);
    assert_eq!(sampler.sensor().reads(), BLOCK as u64);

    // Free reads: every iteration sleeps exactly one period.
    let sleeps = clock.sleeps();
    assert_eq!(sleeps.len(), BLOCK);
    assert!(sleeps.iter().all(|s| (s - 1.0 / FS).abs() < 1e-9));
    assert_eq!(sampler.overrun_count(), 0);
}

#[test]
fn test_profiles_separate_on_std_mag() {
    let idle = compute_features(&sampler(Profile::Idle).acquire_block().unwrap()).unwrap();
    let vib = compute_features(&sampler(Profile::Vibration).acquire_block().unwrap()).unwrap();

    assert!(idle.get("std_mag").unwrap() < 5.0);
    assert!(vib.get("std_mag").unwrap() > 20.0);

    let model = threshold_model();
    assert_eq!(classify(&model, &idle).unwrap(), Label::Idle);
    assert_eq!(classify(&model, &vib).unwrap(), Label::Vibration);
}

#[test]
fn test_record_then_classify_dataset() {
    let dir = test_dir();
    let path = dir.join("features.csv");
    let stats = SessionStats::new();
    let (_tx, rx) = unbounded();

    for (profile, label) in [
        (Profile::Idle, Label::Idle),
        (Profile::Vibration, Label::Vibration),
    ] {
        let mut sampler = sampler(profile);
        let mut writer = DatasetWriter::open(&path).unwrap();
        let outcome = record_dataset(
            &mut sampler,
            &BasicStatFeatures,
            &mut writer,
            label,
            3,
            &rx,
            &stats,
        )
        .unwrap();

        assert_eq!(outcome.blocks, 3);
        assert!(!outcome.cancelled);
        assert!(sampler.sensor().is_closed());
    }

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect();
    assert_eq!(headers, dataset_header());

    let labels: Vec<String> = reader
        .records()
        .map(|r| r.unwrap().get(12).unwrap().to_string())
        .collect();
    assert_eq!(labels, ["0", "0", "0", "1", "1", "1"]);

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.blocks_acquired, 6);
    assert_eq!(snapshot.records_written, 6);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_inference_session_with_model_file() {
    let dir = test_dir();
    std::fs::create_dir_all(&dir).unwrap();
    let model_path = dir.join("model.json");
    std::fs::write(
        &model_path,
        serde_json::to_string_pretty(&threshold_model()).unwrap(),
    )
    .unwrap();
    let model = LinearModel::load(&model_path).unwrap();

    let mut sampler = sampler(Profile::Vibration);
    let stats = SessionStats::new();
    let (_tx, rx) = unbounded();
    let options = InferenceOptions {
        pause: Duration::ZERO,
        max_blocks: Some(4),
    };

    let mut labels = Vec::new();
    let outcome = run_inference(
        &mut sampler,
        &BasicStatFeatures,
        &model,
        &rx,
        options,
        &stats,
        |_, label, _| labels.push(label),
    )
    .unwrap();

    assert_eq!(outcome.blocks, 4);
    assert_eq!(labels, vec![Label::Vibration; 4]);
    assert_eq!(stats.snapshot().vibration_predictions, 4);
    assert!(sampler.sensor().is_closed());

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_cancelled_inference_closes_sensor() {
    let mut sampler = sampler(Profile::Idle);
    let stats = SessionStats::new();
    let (tx, rx) = unbounded();
    tx.send(()).unwrap();

    let outcome = run_inference(
        &mut sampler,
        &BasicStatFeatures,
        &threshold_model(),
        &rx,
        InferenceOptions::default(),
        &stats,
        |_, _, _| panic!("no block should be classified"),
    )
    .unwrap();

    assert!(outcome.cancelled);
    assert_eq!(outcome.blocks, 0);
    assert!(sampler.sensor().is_closed());
}

#[test]
fn test_sensor_fault_ends_session() {
    let sensor = SimulatedSensor::new(Profile::Idle).failing_after(BLOCK as u64 + 10);
    let mut sampler = BlockSampler::with_clock(sensor, ManualClock::new(), FS, BLOCK).unwrap();
    let stats = SessionStats::new();
    let (_tx, rx) = unbounded();

    let result = run_inference(
        &mut sampler,
        &BasicStatFeatures,
        &threshold_model(),
        &rx,
        InferenceOptions {
            pause: Duration::ZERO,
            max_blocks: None,
        },
        &stats,
        |_, _, _| {},
    );

    assert!(matches!(
        result,
        Err(SessionError::Sensor(SensorError::Communication(_)))
    ));
    assert!(sampler.sensor().is_closed());
    assert_eq!(stats.snapshot().idle_predictions, 1);
}

#[test]
fn test_timing_on_ideal_clock() {
    let mut sampler =
        TimingSampler::with_clock(SimulatedSensor::new(Profile::Idle), ManualClock::new(), 256.0)
            .unwrap();

    sampler.run(50).unwrap();
    let stats = sampler.timing_stats().unwrap();

    assert_eq!(stats.target_period_ms, 3.90625);
    assert_eq!(stats.mean_period_ms, 3.90625);
    assert_eq!(stats.std_jitter_ms, 0.0);
    assert_eq!(stats.max_error_ms, 0.0);
}

#[test]
fn test_default_config_drives_sampler() {
    let config = Config::default();
    let (rate, _range) = config.validate().unwrap();

    let mut sampler = BlockSampler::with_clock(
        SimulatedSensor::new(Profile::Idle),
        ManualClock::new(),
        rate.hz() as f64,
        config.block_size,
    )
    .unwrap();

    assert_eq!(sampler.acquire_block().unwrap().len(), 256);
}
