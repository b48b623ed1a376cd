//! Demand-driven glob stream over paginated listings.
//!
//! [`GlobStream`] owns a stack of [`ScanState`]s and lists them one page at
//! a time, last cursor first, draining each prefix completely before moving
//! to the previous one. Every entry goes through the [`EntryProcessor`] and
//! surviving outputs are yielded in page order.
//!
//! A poll that finds nothing buffered is a pull for `high_water_mark`
//! entries. Pages keep being fetched back to back until the raw entry count
//! of this pull's pages covers that demand or the cursors run out. Only one
//! listing call is ever outstanding: the call lives in a single slot and
//! further polls drive that same call instead of starting another.

use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::stream::FusedStream;
use futures::{FutureExt, Stream};
use gs_error::{GsError, Result};
use tracing::{debug, trace, warn};

use crate::config::GlobStreamOptions;
use crate::pattern::{Pattern, PatternSet};
use crate::processor::{Disposition, EntryProcessor, GlobOutput};
use crate::s3::{ListPage, ListingClient};
use crate::scan::ScanState;
use crate::stats::StreamStats;

/// Where a stream is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No call outstanding; the next empty-buffer poll starts one
    Idle,
    /// A listing call is in flight
    Fetching,
    /// Every cursor is exhausted; end-of-stream not yet reported
    Draining,
    /// Finished, either exhausted or failed
    Ended,
}

/// A stream of objects whose keys match a set of glob patterns.
///
/// # Example
///
/// ```ignore
/// use futures::StreamExt;
/// use gs_glob::{GlobStream, GlobStreamOptions, S3Config, S3ListingClient, create_s3_client};
///
/// let client = create_s3_client(&S3Config::new()).await?;
/// let mut stream = GlobStream::new(
///     ["s3://my-bucket/logs/{2024,2025}/*.json", "!**/tmp-*"],
///     GlobStreamOptions::new(),
///     Arc::new(S3ListingClient::new(client)),
/// )?;
///
/// while let Some(output) = stream.next().await {
///     println!("{:?}", output?.key());
/// }
/// ```
pub struct GlobStream {
    client: Arc<dyn ListingClient>,
    states: Vec<ScanState>,
    processor: EntryProcessor,
    high_water_mark: usize,
    demand: usize,
    in_flight: Option<BoxFuture<'static, Result<ListPage>>>,
    ready: VecDeque<Result<GlobOutput>>,
    phase: Phase,
    stats: StreamStats,
}

impl GlobStream {
    /// Build a stream from raw patterns.
    ///
    /// Fails with a validation error for invalid options, an empty or
    /// all-negated pattern list, or a pattern without a bucket or key.
    pub fn new<I, P>(
        patterns: I,
        options: GlobStreamOptions,
        client: Arc<dyn ListingClient>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        options.validate()?;
        let set = PatternSet::new(patterns, &options)?;
        Self::from_pattern_set(set, &options, client)
    }

    /// Build a stream from already classified patterns.
    pub fn from_pattern_set(
        set: PatternSet,
        options: &GlobStreamOptions,
        client: Arc<dyn ListingClient>,
    ) -> Result<Self> {
        options.validate()?;
        let (states, filters) = set.into_parts();

        debug!(
            prefixes = states.len(),
            filters = filters.len(),
            high_water_mark = options.high_water_mark,
            format = %options.format,
            unique = options.unique,
            "Created glob stream"
        );

        Ok(Self {
            client,
            states,
            processor: EntryProcessor::new(filters, options.unique, options.format),
            high_water_mark: options.high_water_mark,
            demand: 0,
            in_flight: None,
            ready: VecDeque::new(),
            phase: Phase::Idle,
            stats: StreamStats::new(),
        })
    }

    /// Start building a stream.
    pub fn builder() -> GlobStreamBuilder {
        GlobStreamBuilder::default()
    }

    /// Cursors not yet exhausted, in construction order.
    pub fn scan_states(&self) -> &[ScanState] {
        &self.states
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    pub fn processor(&self) -> &EntryProcessor {
        &self.processor
    }

    /// Issue the next call for the top cursor, or start draining.
    fn start_fetch(&mut self) {
        let Some(state) = self.states.last() else {
            self.phase = Phase::Draining;
            return;
        };

        let request = state.next_request(self.high_water_mark);
        trace!(
            bucket = %request.bucket,
            prefix = %request.prefix,
            marker = ?request.marker,
            demand = self.demand,
            "Listing page"
        );

        let client = Arc::clone(&self.client);
        self.in_flight = Some(async move { client.list(request).await }.boxed());
        self.phase = Phase::Fetching;
    }

    fn finish_fetch(&mut self, result: Result<ListPage>) {
        let page = match result {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "Listing failed, ending stream");
                self.phase = Phase::Ended;
                self.stats.complete();
                self.ready.push_back(Err(e));
                return;
            }
        };

        self.phase = Phase::Idle;
        let Some(state) = self.states.last_mut() else {
            return;
        };

        let returned = page.entries.len();
        let truncated = page.truncated;
        let more = state.advance(&page);
        self.stats.record_page(returned);

        for mut entry in page.entries {
            entry.bucket = state.bucket().to_string();
            match self.processor.process(state, entry) {
                Disposition::Emit(output) => {
                    self.stats.record_emitted();
                    self.ready.push_back(Ok(output));
                }
                Disposition::Duplicate => self.stats.record_duplicate(),
                Disposition::Filtered => self.stats.record_filtered(),
            }
        }

        debug!(
            bucket = %state.bucket(),
            prefix = %state.prefix(),
            entries = returned,
            truncated,
            "Listed page"
        );

        if !more {
            debug!(prefix = %state.prefix(), "Prefix exhausted");
            self.states.pop();
            self.stats.record_exhausted();
        }

        self.demand = self.demand.saturating_sub(returned);
        if self.demand > 0 && !self.states.is_empty() {
            self.start_fetch();
        }
    }
}

impl Stream for GlobStream {
    type Item = Result<GlobOutput>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(call) = this.in_flight.as_mut() {
                match call.poll_unpin(cx) {
                    Poll::Ready(result) => {
                        this.in_flight = None;
                        this.finish_fetch(result);
                        continue;
                    }
                    Poll::Pending if this.ready.is_empty() => return Poll::Pending,
                    Poll::Pending => {}
                }
            }

            if let Some(item) = this.ready.pop_front() {
                return Poll::Ready(Some(item));
            }

            match this.phase {
                Phase::Idle => {
                    this.demand = this.high_water_mark;
                    this.start_fetch();
                }
                Phase::Draining => {
                    this.phase = Phase::Ended;
                    this.stats.complete();
                    debug!(
                        pages = this.stats.pages_fetched,
                        emitted = this.stats.entries_emitted,
                        "Glob stream finished"
                    );
                    return Poll::Ready(None);
                }
                Phase::Ended => return Poll::Ready(None),
                // start_fetch always fills the slot alongside this phase
                Phase::Fetching => this.phase = Phase::Idle,
            }
        }
    }
}

impl FusedStream for GlobStream {
    fn is_terminated(&self) -> bool {
        self.phase == Phase::Ended && self.ready.is_empty()
    }
}

impl fmt::Debug for GlobStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobStream")
            .field("states", &self.states)
            .field("high_water_mark", &self.high_water_mark)
            .field("demand", &self.demand)
            .field("in_flight", &self.in_flight.is_some())
            .field("buffered", &self.ready.len())
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

/// Builder for [`GlobStream`] when the listing client is wired separately.
#[derive(Default)]
pub struct GlobStreamBuilder {
    patterns: Vec<Pattern>,
    options: GlobStreamOptions,
    client: Option<Arc<dyn ListingClient>>,
}

impl GlobStreamBuilder {
    /// Add one pattern.
    pub fn pattern(mut self, pattern: impl Into<Pattern>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Add several patterns.
    pub fn patterns<I, P>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        self.patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn options(mut self, options: GlobStreamOptions) -> Self {
        self.options = options;
        self
    }

    pub fn client(mut self, client: Arc<dyn ListingClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Validate and build. A listing client is required.
    pub fn build(self) -> Result<GlobStream> {
        let client = self
            .client
            .ok_or_else(|| GsError::validation("A listing client is required"))?;
        GlobStream::new(self.patterns, self.options, client)
    }
}
