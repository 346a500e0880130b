//! Fixed-capacity rolling average for a single scalar signal.
//!
//! Backed by a `heapless::Deque` ring so a full window never reallocates:
//! pushing into a full window evicts the oldest sample first.

use heapless::Deque;

/// Upper bound on the configurable smoothing window.
pub const MAX_SMOOTHING_WINDOW: usize = 32;

#[derive(Debug, Clone)]
pub struct RollingAverage {
    window: usize,
    samples: Deque<f32, MAX_SMOOTHING_WINDOW>,
}

impl RollingAverage {
    /// Create an empty window holding at most `window` samples.
    ///
    /// `window` is clamped to `1..=MAX_SMOOTHING_WINDOW`; the config layer
    /// rejects out-of-range sizes before an engine is ever built.
    pub fn new(window: usize) -> Self {
        Self {
            window: window.clamp(1, MAX_SMOOTHING_WINDOW),
            samples: Deque::new(),
        }
    }

    pub fn push(&mut self, value: f32) {
        if self.samples.len() >= self.window {
            self.samples.pop_front();
        }
        let pushed = self.samples.push_back(value);
        // len < window <= capacity after the eviction above.
        debug_assert!(pushed.is_ok(), "smoothing window overflow");
    }

    /// Arithmetic mean of the current contents, `0.0` when empty.
    pub fn average(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.samples.iter().sum();
        sum / self.samples.len() as f32
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.window
    }

    /// Most recently pushed sample.
    pub fn latest(&self) -> Option<f32> {
        self.samples.back().copied()
    }
}
