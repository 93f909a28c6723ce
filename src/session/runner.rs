//! Long-running recording and inference sessions.
//!
//! Both loops poll a cancellation channel between block acquisitions. A
//! block in progress always completes. Whatever way a session ends, the
//! sampler's sensor is closed before the function returns.

use crate::classifier::{classify, Classifier};
use crate::core::clock::Clock;
use crate::core::features::{FeatureExtractor, FeatureVector};
use crate::core::record::{FeatureRecord, Label};
use crate::core::sampler::BlockSampler;
use crate::dataset::DatasetWriter;
use crate::sensor::MotionSensor;
use crate::session::stats::SessionStats;
use crate::session::SessionError;
use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    /// Blocks fully processed.
    pub blocks: u64,
    /// True when the session stopped on a cancellation request.
    pub cancelled: bool,
}

/// Settings for [`run_inference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferenceOptions {
    /// Wait between blocks. Cancellation is also observed during it.
    pub pause: Duration,
    /// Stop after this many blocks; `None` runs until cancelled.
    pub max_blocks: Option<u64>,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            pause: Duration::from_millis(50),
            max_blocks: None,
        }
    }
}

/// Acquire `blocks` blocks, extract features and append them to `writer`
/// under a single label.
pub fn record_dataset<S, C, E>(
    sampler: &mut BlockSampler<S, C>,
    extractor: &E,
    writer: &mut DatasetWriter,
    label: Label,
    blocks: u64,
    cancel: &Receiver<()>,
    stats: &SessionStats,
) -> Result<SessionOutcome, SessionError>
where
    S: MotionSensor,
    C: Clock,
    E: FeatureExtractor + ?Sized,
{
    tracing::info!(%label, blocks, path = %writer.path().display(), "recording started");

    let result = record_blocks(sampler, extractor, writer, label, blocks, cancel, stats);
    sampler.close();

    match &result {
        Ok(outcome) => tracing::info!(
            blocks = outcome.blocks,
            cancelled = outcome.cancelled,
            "recording finished"
        ),
        Err(e) => tracing::error!("recording aborted: {e}"),
    }
    result
}

fn record_blocks<S, C, E>(
    sampler: &mut BlockSampler<S, C>,
    extractor: &E,
    writer: &mut DatasetWriter,
    label: Label,
    blocks: u64,
    cancel: &Receiver<()>,
    stats: &SessionStats,
) -> Result<SessionOutcome, SessionError>
where
    S: MotionSensor,
    C: Clock,
    E: FeatureExtractor + ?Sized,
{
    let mut outcome = SessionOutcome {
        blocks: 0,
        cancelled: false,
    };

    while outcome.blocks < blocks {
        if cancel_requested(cancel) {
            outcome.cancelled = true;
            break;
        }

        let features = next_features(sampler, extractor, stats)?;
        writer.append(&FeatureRecord::new(features, label))?;
        stats.record_written();
        outcome.blocks += 1;

        tracing::debug!(block = outcome.blocks, of = blocks, "record appended");
    }

    writer.flush()?;
    Ok(outcome)
}

/// Classify blocks until cancelled (or `max_blocks` is reached), handing
/// each prediction to `on_prediction`.
pub fn run_inference<S, C, E, K, F>(
    sampler: &mut BlockSampler<S, C>,
    extractor: &E,
    classifier: &K,
    cancel: &Receiver<()>,
    options: InferenceOptions,
    stats: &SessionStats,
    mut on_prediction: F,
) -> Result<SessionOutcome, SessionError>
where
    S: MotionSensor,
    C: Clock,
    E: FeatureExtractor + ?Sized,
    K: Classifier + ?Sized,
    F: FnMut(u64, Label, &FeatureVector),
{
    tracing::info!(
        pause_ms = options.pause.as_millis() as u64,
        max_blocks = ?options.max_blocks,
        "inference started"
    );

    let result = infer_blocks(
        sampler,
        extractor,
        classifier,
        cancel,
        options,
        stats,
        &mut on_prediction,
    );
    sampler.close();

    match &result {
        Ok(outcome) => tracing::info!(
            blocks = outcome.blocks,
            cancelled = outcome.cancelled,
            "inference finished"
        ),
        Err(e) => tracing::error!("inference aborted: {e}"),
    }
    result
}

fn infer_blocks<S, C, E, K, F>(
    sampler: &mut BlockSampler<S, C>,
    extractor: &E,
    classifier: &K,
    cancel: &Receiver<()>,
    options: InferenceOptions,
    stats: &SessionStats,
    on_prediction: &mut F,
) -> Result<SessionOutcome, SessionError>
where
    S: MotionSensor,
    C: Clock,
    E: FeatureExtractor + ?Sized,
    K: Classifier + ?Sized,
    F: FnMut(u64, Label, &FeatureVector),
{
    let mut outcome = SessionOutcome {
        blocks: 0,
        cancelled: false,
    };

    loop {
        if options.max_blocks.is_some_and(|max| outcome.blocks >= max) {
            break;
        }
        if cancel_requested(cancel) {
            outcome.cancelled = true;
            break;
        }

        let features = next_features(sampler, extractor, stats)?;
        let label = classify(classifier, &features)?;
        stats.record_prediction(label);
        outcome.blocks += 1;

        tracing::debug!(block = outcome.blocks, %label, "block classified");
        on_prediction(outcome.blocks, label, &features);

        if wait_or_cancel(cancel, options.pause) {
            outcome.cancelled = true;
            break;
        }
    }

    Ok(outcome)
}

fn next_features<S, C, E>(
    sampler: &mut BlockSampler<S, C>,
    extractor: &E,
    stats: &SessionStats,
) -> Result<FeatureVector, SessionError>
where
    S: MotionSensor,
    C: Clock,
    E: FeatureExtractor + ?Sized,
{
    let overruns_before = sampler.overrun_count();
    let block = sampler.acquire_block()?;
    stats.record_block();
    stats.record_overruns(sampler.overrun_count() - overruns_before);

    Ok(extractor.extract(&block)?)
}

/// Non-blocking check. A disconnected channel can never deliver a request.
fn cancel_requested(cancel: &Receiver<()>) -> bool {
    match cancel.try_recv() {
        Ok(()) => true,
        Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => false,
    }
}

/// Sleep for `pause`, returning early with `true` on a cancellation request.
fn wait_or_cancel(cancel: &Receiver<()>, pause: Duration) -> bool {
    if pause.is_zero() {
        return cancel_requested(cancel);
    }
    match cancel.recv_timeout(pause) {
        Ok(()) => true,
        Err(RecvTimeoutError::Timeout) => false,
        Err(RecvTimeoutError::Disconnected) => {
            std::thread::sleep(pause);
            false
        }
    }
}
