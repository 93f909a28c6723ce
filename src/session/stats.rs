//! Session statistics.
//!
//! Counts what a recording or inference session did so it can be reported
//! at exit and accumulated across runs.

use crate::core::record::Label;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Counters for the current session.
#[derive(Debug)]
pub struct SessionStats {
    /// Blocks read from the sensor
    blocks_acquired: AtomicU64,
    /// Feature records appended to a dataset
    records_written: AtomicU64,
    /// Blocks classified as idle
    idle_predictions: AtomicU64,
    /// Blocks classified as vibration
    vibration_predictions: AtomicU64,
    /// Reads that found their deadline already passed
    overruns: AtomicU64,
    session_id: Uuid,
    session_start: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            blocks_acquired: AtomicU64::new(0),
            records_written: AtomicU64::new(0),
            idle_predictions: AtomicU64::new(0),
            vibration_predictions: AtomicU64::new(0),
            overruns: AtomicU64::new(0),
            session_id: Uuid::new_v4(),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create session stats that continue the totals stored at `path`.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();
        stats.persist_path = Some(path);

        if let Err(e) = stats.load() {
            tracing::warn!("Could not load previous session stats: {e}");
        }

        stats
    }

    pub fn record_block(&self) {
        self.blocks_acquired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_written(&self) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prediction(&self, label: Label) {
        let counter = match label {
            Label::Idle => &self.idle_predictions,
            Label::Vibration => &self.vibration_predictions,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_overruns(&self, count: u64) {
        self.overruns.fetch_add(count, Ordering::Relaxed);
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Get the current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            session_id: self.session_id,
            blocks_acquired: self.blocks_acquired.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            idle_predictions: self.idle_predictions.load(Ordering::Relaxed),
            vibration_predictions: self.vibration_predictions.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        format!(
            "Session {}:\n\
             - Blocks acquired: {}\n\
             - Records written: {}\n\
             - Idle predictions: {}\n\
             - Vibration predictions: {}\n\
             - Sample overruns: {}\n\
             - Session duration: {} seconds",
            stats.session_id,
            stats.blocks_acquired,
            stats.records_written,
            stats.idle_predictions,
            stats.vibration_predictions,
            stats.overruns,
            stats.session_duration_secs
        )
    }

    /// Save stats to disk. Does nothing without a persistence path.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.snapshot();
            let persisted = PersistedStats {
                blocks_acquired: stats.blocks_acquired,
                records_written: stats.records_written,
                idle_predictions: stats.idle_predictions,
                vibration_predictions: stats.vibration_predictions,
                overruns: stats.overruns,
                last_session: stats.session_id,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }

    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats = serde_json::from_str(&content)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

                self.blocks_acquired
                    .store(persisted.blocks_acquired, Ordering::Relaxed);
                self.records_written
                    .store(persisted.records_written, Ordering::Relaxed);
                self.idle_predictions
                    .store(persisted.idle_predictions, Ordering::Relaxed);
                self.vibration_predictions
                    .store(persisted.vibration_predictions, Ordering::Relaxed);
                self.overruns.store(persisted.overruns, Ordering::Relaxed);
            }
        }
        Ok(())
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the session counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub session_id: Uuid,
    pub blocks_acquired: u64,
    pub records_written: u64,
    pub idle_predictions: u64,
    pub vibration_predictions: u64,
    pub overruns: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    blocks_acquired: u64,
    records_written: u64,
    idle_predictions: u64,
    vibration_predictions: u64,
    overruns: u64,
    last_session: Uuid,
    last_updated: DateTime<Utc>,
}
