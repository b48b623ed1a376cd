//! Statistics for glob streams.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Counters collected while a stream runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamStats {
    /// When the stream was created
    pub started_at: Option<DateTime<Utc>>,

    /// When the stream ended (exhausted or failed)
    pub completed_at: Option<DateTime<Utc>>,

    /// Listing calls that returned a page
    pub pages_fetched: usize,

    /// Entries returned by the store, before any processing
    pub entries_listed: usize,

    /// Entries skipped because they were already seen
    pub duplicates_skipped: usize,

    /// Entries rejected by a filter or the scope's glob
    pub entries_filtered: usize,

    /// Entries yielded to the consumer
    pub entries_emitted: usize,

    /// Prefixes listed to the end
    pub prefixes_exhausted: usize,
}

impl StreamStats {
    /// Create a new stats tracker with the current time as start time.
    pub fn new() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Mark the stream as ended with the current time.
    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Record a page of `entries` listed entries.
    pub fn record_page(&mut self, entries: usize) {
        self.pages_fetched += 1;
        self.entries_listed += entries;
    }

    pub fn record_emitted(&mut self) {
        self.entries_emitted += 1;
    }

    pub fn record_duplicate(&mut self) {
        self.duplicates_skipped += 1;
    }

    pub fn record_filtered(&mut self) {
        self.entries_filtered += 1;
    }

    pub fn record_exhausted(&mut self) {
        self.prefixes_exhausted += 1;
    }

    /// Get the duration of the run.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Get the listing throughput (entries listed per second).
    pub fn entries_per_second(&self) -> Option<f64> {
        self.duration().and_then(|d| {
            let secs = d.num_milliseconds() as f64 / 1000.0;
            if secs > 0.0 {
                Some(self.entries_listed as f64 / secs)
            } else {
                None
            }
        })
    }
}
