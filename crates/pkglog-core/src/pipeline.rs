//! Line-by-line driver tying a parser to the queue.
//!
//! For each line:
//! 1. Ask the parser for a timestamp; skip the line if there is none
//! 2. Drop the transaction if it is before the start time or, with the boot
//!    cutoff, before the last boot
//! 3. Flush the queue when the gap since the previous transaction exceeds the
//!    configured gap (never in net installed mode)
//! 4. Append the parser's package changes to the queue

use chrono::{Duration, NaiveDateTime};

use crate::parser::LogParser;
use crate::queue::{OutputLine, Queue};

/// Default maximum gap between changes in one group.
pub const DEFAULT_GAP_MINUTES: u32 = 2;

/// Cutoffs and grouping for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Changes further apart than this start a new group.
    pub gap: Duration,
    /// Ignore transactions before this time.
    pub start: Option<NaiveDateTime>,
    /// Ignore transactions before this boot time.
    pub boot_cutoff: Option<NaiveDateTime>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            gap: Duration::minutes(i64::from(DEFAULT_GAP_MINUTES)),
            start: None,
            boot_cutoff: None,
        }
    }
}

/// A single pass over one chronological stream of log lines.
pub struct Pipeline {
    parser: Box<dyn LogParser>,
    queue: Queue,
    options: PipelineOptions,
    last: Option<NaiveDateTime>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("queue", &self.queue)
            .field("options", &self.options)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(parser: Box<dyn LogParser>, queue: Queue, options: PipelineOptions) -> Self {
        Self {
            parser,
            queue,
            options,
            last: None,
        }
    }

    /// Processes one raw log line, returning any group it completed.
    pub fn feed_line(&mut self, line: &str) -> Vec<OutputLine> {
        let line = line.trim();
        if line.is_empty() {
            return Vec::new();
        }

        let Some(timestamp) = self.parser.get_time(line) else {
            return Vec::new();
        };

        if self.is_before_cutoff(timestamp) {
            // Leave pending parser state behind with the dropped transaction
            self.parser.get_packages();
            return Vec::new();
        }

        let gap_exceeded = self
            .last
            .is_some_and(|last| timestamp - last > self.options.gap);
        let lines = if gap_exceeded
            && !self.queue.filter().defers_output()
            && !self.queue.is_empty()
        {
            self.queue.flush()
        } else {
            Vec::new()
        };

        self.last = Some(timestamp);
        for change in self.parser.get_packages() {
            self.queue.append(change.at(timestamp));
        }

        lines
    }

    /// Flushes the last group at end of input.
    pub fn finish(mut self) -> Vec<OutputLine> {
        tracing::debug!(last = ?self.last, "end of input");
        self.queue.finish()
    }

    fn is_before_cutoff(&self, timestamp: NaiveDateTime) -> bool {
        self.options.start.is_some_and(|start| timestamp < start)
            || self
                .options
                .boot_cutoff
                .is_some_and(|boot| timestamp < boot)
    }
}
