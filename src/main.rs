//! Vibesense Agent CLI
//!
//! Samples an accelerometer in blocks and records or classifies vibration.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossbeam_channel::Receiver;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vibesense_agent::{
    classifier::LinearModel,
    config::Config,
    core::{
        schema::dataset_header, BasicStatFeatures, BlockSampler, FeatureSchema, Label,
        TimingSampler,
    },
    dataset::DatasetWriter,
    sensor::{MotionSensor, Profile, SimulatedSensor},
    session::{prepare_sensor, record_dataset, run_inference, InferenceOptions, SessionStats},
    VERSION,
};

#[derive(Parser)]
#[command(name = "vibesense")]
#[command(version = VERSION)]
#[command(about = "Block-based accelerometer sampler and vibration classifier", long_about = None)]
struct Cli {
    /// Simulated sensor profile (idle or vibration)
    #[arg(long, global = true, default_value = "idle")]
    profile: Profile,

    /// Output data rate in Hz (100, 200 or 400); overrides config
    #[arg(long, global = true)]
    rate: Option<u32>,

    /// Samples per block; overrides config
    #[arg(long, global = true)]
    block_size: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print raw acceleration vectors
    Read {
        /// Number of vectors to print
        #[arg(long, short, default_value = "20")]
        count: usize,
    },

    /// Record labelled feature blocks to a CSV dataset
    Record {
        /// Class of every recorded block (idle or vibration)
        #[arg(long)]
        label: LabelArg,

        /// Number of blocks to record
        #[arg(long, default_value = "10")]
        blocks: u64,

        /// Dataset file to append to; defaults to the configured path
        #[arg(long, short)]
        outfile: Option<PathBuf>,
    },

    /// Classify blocks continuously until Ctrl+C
    Infer {
        /// Model artifact; defaults to the configured path
        #[arg(long)]
        model: Option<PathBuf>,

        /// Stop after this many blocks
        #[arg(long)]
        blocks: Option<u64>,
    },

    /// Measure sampling jitter
    Timing {
        /// Number of paced reads
        #[arg(long, default_value = "1000")]
        samples: usize,
    },

    /// Print the dataset and inference column orders
    Schema,

    /// Show configuration
    Config,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum LabelArg {
    Idle,
    Vibration,
}

impl From<LabelArg> for Label {
    fn from(arg: LabelArg) -> Self {
        match arg {
            LabelArg::Idle => Label::Idle,
            LabelArg::Vibration => Label::Vibration,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load().context("loading configuration")?;
    if let Some(rate) = cli.rate {
        config.rate_hz = rate;
    }
    if let Some(block_size) = cli.block_size {
        config.block_size = block_size;
    }

    match cli.command {
        Commands::Read { count } => cmd_read(&config, cli.profile, count),
        Commands::Record {
            label,
            blocks,
            outfile,
        } => cmd_record(&config, cli.profile, label.into(), blocks, outfile),
        Commands::Infer { model, blocks } => cmd_infer(&config, cli.profile, model, blocks),
        Commands::Timing { samples } => cmd_timing(&config, cli.profile, samples),
        Commands::Schema => {
            cmd_schema();
            Ok(())
        }
        Commands::Config => cmd_config(&config),
    }
}

fn open_sensor(config: &Config, profile: Profile) -> Result<SimulatedSensor> {
    let sensor = prepare_sensor(SimulatedSensor::new(profile), config)
        .context("configuring sensor")?;
    Ok(sensor)
}

fn cmd_read(config: &Config, profile: Profile, count: usize) -> Result<()> {
    let mut sensor = open_sensor(config, profile)?;

    for _ in 0..count {
        match sensor.read_vector() {
            Ok(v) => println!("{:6} {:6} {:6}", v.x, v.y, v.z),
            Err(e) => {
                sensor.close();
                return Err(e).context("reading sensor");
            }
        }
    }

    sensor.close();
    Ok(())
}

fn cmd_record(
    config: &Config,
    profile: Profile,
    label: Label,
    blocks: u64,
    outfile: Option<PathBuf>,
) -> Result<()> {
    let sensor = open_sensor(config, profile)?;
    let mut sampler = BlockSampler::new(sensor, config.rate_hz as f64, config.block_size)?;
    let path = outfile.unwrap_or_else(|| config.dataset_path.clone());

    println!("Vibesense Agent v{VERSION}");
    println!("  Label: {label}");
    println!("  Blocks: {blocks} x {} samples", sampler.block_size());
    println!("  Rate: {} Hz", sampler.fs_hz());
    println!("  Dataset: {}", path.display());
    println!();
    println!("Press Ctrl+C to stop after the current block");
    println!();

    if let Err(e) = config.ensure_directories() {
        tracing::warn!("Could not create directories: {e}");
    }

    let mut writer = DatasetWriter::open(&path).context("opening dataset")?;
    let stats = SessionStats::with_persistence(config.stats_path());
    let cancel = cancel_channel()?;

    let outcome = record_dataset(
        &mut sampler,
        &BasicStatFeatures,
        &mut writer,
        label,
        blocks,
        &cancel,
        &stats,
    )?;

    if outcome.cancelled {
        println!("Stopped early after {} blocks", outcome.blocks);
    }
    println!(
        "Appended {} records to {}",
        writer.rows_written(),
        path.display()
    );

    if let Err(e) = stats.save() {
        tracing::warn!("Could not save session stats: {e}");
    }
    println!();
    println!("{}", stats.summary());
    Ok(())
}

fn cmd_infer(
    config: &Config,
    profile: Profile,
    model: Option<PathBuf>,
    blocks: Option<u64>,
) -> Result<()> {
    let model_path = model.unwrap_or_else(|| config.model_path.clone());
    let model = LinearModel::load(&model_path)
        .with_context(|| format!("loading model from {}", model_path.display()))?;

    let sensor = open_sensor(config, profile)?;
    let mut sampler = BlockSampler::new(sensor, config.rate_hz as f64, config.block_size)?;
    let stats = SessionStats::with_persistence(config.stats_path());
    let cancel = cancel_channel()?;

    println!("Vibesense Agent v{VERSION}");
    println!("  Model: {}", model_path.display());
    println!(
        "  Block: {} samples at {} Hz",
        sampler.block_size(),
        sampler.fs_hz()
    );
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let options = InferenceOptions {
        pause: config.inference_pause,
        max_blocks: blocks,
    };

    run_inference(
        &mut sampler,
        &BasicStatFeatures,
        &model,
        &cancel,
        options,
        &stats,
        |n, label, features| {
            let rms_mag = features.get("rms_mag").unwrap_or(f64::NAN);
            let std_mag = features.get("std_mag").unwrap_or(f64::NAN);
            println!(
                "[{}] block {n}: {label} (rms_mag {rms_mag:.1}, std_mag {std_mag:.1})",
                chrono::Local::now().format("%H:%M:%S")
            );
        },
    )?;

    if let Err(e) = stats.save() {
        tracing::warn!("Could not save session stats: {e}");
    }
    println!();
    println!("{}", stats.summary());
    Ok(())
}

fn cmd_timing(config: &Config, profile: Profile, samples: usize) -> Result<()> {
    let sensor = open_sensor(config, profile)?;
    let mut sampler = TimingSampler::new(sensor, config.rate_hz as f64)?;

    println!("Measuring {samples} reads at {} Hz...", sampler.target_hz());
    let result = sampler.run(samples).map(|_| ());
    sampler.close();
    result.context("timing run")?;

    let stats = sampler.timing_stats()?;
    println!();
    println!("{stats}");
    Ok(())
}

fn cmd_schema() {
    println!("Dataset columns:");
    println!("  {}", dataset_header().join(", "));
    println!();
    println!("Inference input order:");
    println!("  {}", FeatureSchema::inference().names().join(", "));
}

fn cmd_config(config: &Config) -> Result<()> {
    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(config)?);

    let (rate, range) = config.validate()?;
    println!();
    println!(
        "Effective device settings: {} Hz, ±{} g, period {:?}",
        rate.hz(),
        range.g(),
        Duration::from_secs_f64(rate.period_secs())
    );
    Ok(())
}

/// Route Ctrl+C into a channel that sessions poll between blocks.
fn cancel_channel() -> Result<Receiver<()>> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    ctrlc::set_handler(move || {
        let _ = tx.try_send(());
    })
    .context("setting Ctrl+C handler")?;
    Ok(rx)
}
