//! Bounded rolling buffer for channel samples
//!
//! Keeps the most recent `capacity` samples in insertion order. The oldest
//! sample is evicted first when a push would exceed capacity.

use std::collections::VecDeque;

/// Default number of samples retained per channel
pub const DEFAULT_BUFFER_CAPACITY: usize = 120;

/// FIFO ring over the latest samples of one channel
#[derive(Debug, Clone)]
pub struct RollingBuffer<T> {
    samples: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> RollingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting from the front when full. O(1).
    pub fn push(&mut self, sample: T) {
        if self.capacity == 0 {
            return;
        }
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Append many samples in order
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, samples: I) {
        for sample in samples {
            self.push(sample);
        }
    }

    /// Copy of the last `n` samples (fewer if unavailable), oldest first
    pub fn recent(&self, n: usize) -> Vec<T> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip).cloned().collect()
    }

    /// Copy of every retained sample, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.samples.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&T> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl<T: Clone> Default for RollingBuffer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}
