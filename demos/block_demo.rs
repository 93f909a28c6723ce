//! Demonstration of block sampling and feature extraction.
//!
//! This example shows how to:
//! 1. Configure a sensor and wrap it in a paced block sampler
//! 2. Acquire blocks and reduce them to features
//! 3. Lay features out in dataset and inference order
//! 4. Measure sampling jitter
//!
//! Run with: cargo run --example block_demo
//!
//! Uses the simulated sensor, so no hardware is needed. Alternates idle and
//! vibration blocks for about ten seconds or until Ctrl+C.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use vibesense_agent::{
    core::{compute_features, BlockSampler, FeatureSchema, TimingSampler},
    sensor::{GRange, MotionSensor, Profile, SampleRate, SimulatedSensor},
    session::SessionStats,
};

const BLOCK_SIZE: usize = 128;

fn main() {
    println!("Vibesense Agent - Block Demo");
    println!("============================");
    println!();

    let rate = SampleRate::Hz200;
    let stats = SessionStats::new();

    // Set up stop flag
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    println!(
        "Sampling {BLOCK_SIZE}-sample blocks at {} Hz ({:.0} ms per block)",
        rate.hz(),
        BLOCK_SIZE as f64 * rate.period_secs() * 1000.0
    );
    println!();

    let start = std::time::Instant::now();
    let mut profile = Profile::Idle;

    while running.load(Ordering::SeqCst) && start.elapsed() < Duration::from_secs(10) {
        let mut sensor = SimulatedSensor::new(profile);
        sensor
            .configure(rate, GRange::G4)
            .expect("Failed to configure sensor");

        let mut sampler =
            BlockSampler::new(sensor, rate.hz() as f64, BLOCK_SIZE).expect("valid block shape");
        let block = match sampler.acquire_block() {
            Ok(block) => block,
            Err(e) => {
                eprintln!("Error reading block: {e}");
                break;
            }
        };
        stats.record_block();
        stats.record_overruns(sampler.overrun_count());
        sampler.close();

        let features = compute_features(&block).expect("block is non-empty");

        println!("=== {profile:?} block ===");
        println!(
            "  rms_mag: {:8.2}   std_mag: {:8.2}",
            features.get("rms_mag").unwrap_or_default(),
            features.get("std_mag").unwrap_or_default()
        );

        let row = FeatureSchema::inference()
            .row(&features)
            .expect("full feature set");
        let cells: Vec<String> = row.iter().map(|v| format!("{v:.1}")).collect();
        println!("  inference row: [{}]", cells.join(", "));
        println!();

        profile = match profile {
            Profile::Idle => Profile::Vibration,
            Profile::Vibration => Profile::Idle,
        };
    }

    // Jitter on the real clock
    println!("Measuring timing over 400 reads...");
    let mut timing = TimingSampler::new(SimulatedSensor::new(Profile::Idle), rate.hz() as f64)
        .expect("valid rate");
    let run = timing.run(400).map(|_| ());
    timing.close();
    match run {
        Ok(()) => match timing.timing_stats() {
            Ok(timing_stats) => println!("{timing_stats}"),
            Err(e) => eprintln!("Timing error: {e}"),
        },
        Err(e) => eprintln!("Sensor error: {e}"),
    }

    println!();
    println!("{}", stats.summary());
}
