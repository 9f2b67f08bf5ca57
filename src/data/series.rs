//! Bounded telemetry history for charting and trend display.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Maximum number of samples the series retains.
pub const SERIES_CAPACITY: usize = 50;

/// One telemetry point reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Measured temperature in degrees Celsius.
    pub temperature: f64,
    /// Fan duty cycle as a percentage (0-100).
    pub fan_speed: u8,
    /// Sample time in epoch milliseconds.
    pub timestamp: u64,
}

/// Bounded, chronologically ordered history of samples.
///
/// Holds at most [`SERIES_CAPACITY`] entries, oldest first. Renderers may
/// reverse a snapshot for newest-first presentation; the buffer itself
/// always stays chronological and is safe to render at any time, empty
/// included.
#[derive(Debug, Clone, Default)]
pub struct SeriesBuffer {
    samples: VecDeque<Sample>,
}

impl SeriesBuffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(SERIES_CAPACITY),
        }
    }

    /// Replace the entire content with the given samples.
    ///
    /// The input may arrive in any order; it is sorted chronologically
    /// (stable, so equal timestamps keep their input order) and truncated
    /// to the most recent [`SERIES_CAPACITY`] entries.
    pub fn insert_batch(&mut self, mut samples: Vec<Sample>) {
        samples.sort_by_key(|s| s.timestamp);
        if samples.len() > SERIES_CAPACITY {
            samples.drain(..samples.len() - SERIES_CAPACITY);
        }
        self.samples = samples.into();
    }

    /// Append a sample as the newest entry.
    ///
    /// Arrival order is trusted: when the buffer is full the entry evicted
    /// is the oldest by insertion order, even if the incoming timestamp is
    /// out of order. Samples with equal timestamps are both kept.
    pub fn insert_one(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        if self.samples.len() > SERIES_CAPACITY {
            self.samples.pop_front();
        }
    }

    /// An order-preserving copy of the buffer, oldest first.
    ///
    /// The live structure is never handed out; mutations after a snapshot
    /// do not affect it.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }

    /// The most recent sample, if any.
    pub fn newest(&self) -> Option<Sample> {
        self.samples.back().copied()
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when no samples have been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(timestamp: u64) -> Sample {
        Sample {
            temperature: timestamp as f64 / 100.0,
            fan_speed: 40,
            timestamp,
        }
    }

    #[test]
    fn test_insert_batch_sorts_newest_first_input() {
        let mut buffer = SeriesBuffer::new();
        buffer.insert_batch(vec![sample(300), sample(200), sample(100)]);

        let timestamps: Vec<u64> = buffer.snapshot().iter().map(|s| s.timestamp).collect();
        assert_eq!(timestamps, vec![100, 200, 300]);
        assert_eq!(buffer.newest().unwrap().timestamp, 300);
    }

    #[test]
    fn test_insert_batch_keeps_most_recent_on_overflow() {
        let mut buffer = SeriesBuffer::new();
        let samples: Vec<Sample> = (1..=60).map(|i| sample(i * 10)).collect();
        buffer.insert_batch(samples);

        assert_eq!(buffer.len(), SERIES_CAPACITY);
        // The 10 oldest were dropped
        assert_eq!(buffer.snapshot()[0].timestamp, 110);
        assert_eq!(buffer.newest().unwrap().timestamp, 600);
    }

    #[test]
    fn test_insert_batch_replaces_previous_content() {
        let mut buffer = SeriesBuffer::new();
        buffer.insert_batch(vec![sample(100), sample(200)]);
        buffer.insert_batch(vec![sample(900)]);

        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.newest().unwrap().timestamp, 900);
    }

    #[test]
    fn test_insert_batch_empty_clears() {
        let mut buffer = SeriesBuffer::new();
        buffer.insert_batch(vec![sample(100)]);
        buffer.insert_batch(Vec::new());

        assert!(buffer.is_empty());
        assert!(buffer.newest().is_none());
    }

    #[test]
    fn test_insert_batch_stable_for_equal_timestamps() {
        let mut buffer = SeriesBuffer::new();
        let first = Sample {
            temperature: 21.0,
            fan_speed: 40,
            timestamp: 100,
        };
        let second = Sample {
            temperature: 22.0,
            fan_speed: 60,
            timestamp: 100,
        };
        buffer.insert_batch(vec![first, second]);

        assert_eq!(buffer.snapshot(), vec![first, second]);
    }

    #[test]
    fn test_insert_one_evicts_oldest_at_capacity() {
        let mut buffer = SeriesBuffer::new();
        for i in 1..=SERIES_CAPACITY as u64 {
            buffer.insert_one(sample(i));
        }
        assert_eq!(buffer.len(), SERIES_CAPACITY);

        buffer.insert_one(sample(999));

        assert_eq!(buffer.len(), SERIES_CAPACITY);
        assert_eq!(buffer.snapshot()[0].timestamp, 2);
        assert_eq!(buffer.newest().unwrap().timestamp, 999);
    }

    #[test]
    fn test_insert_one_keeps_duplicate_timestamps() {
        let mut buffer = SeriesBuffer::new();
        buffer.insert_one(sample(100));
        buffer.insert_one(sample(100));

        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_insert_one_trusts_arrival_order() {
        let mut buffer = SeriesBuffer::new();
        buffer.insert_one(sample(200));
        buffer.insert_one(sample(100));

        // No re-sorting on single inserts
        let timestamps: Vec<u64> = buffer.snapshot().iter().map(|s| s.timestamp).collect();
        assert_eq!(timestamps, vec![200, 100]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut buffer = SeriesBuffer::new();
        buffer.insert_one(sample(100));
        let snapshot = buffer.snapshot();

        buffer.insert_one(sample(200));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_empty_buffer_is_safe() {
        let buffer = SeriesBuffer::new();
        assert!(buffer.is_empty());
        assert!(buffer.snapshot().is_empty());
        assert!(buffer.newest().is_none());
    }
}
