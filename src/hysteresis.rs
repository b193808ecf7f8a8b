//! Layer 1 of the flap-protection pipeline: per-channel sliding-window smoothing.
//!
//! Each of the three channels (local, remote, bgp) gets its own window of up to `W`
//! booleans. `Health::Unknown` observations never reach this layer — callers must
//! filter them out before calling [`HysteresisWindow::observe`] per §4.4/§4.5.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HysteresisMode {
    /// Report HEALTHY iff at least `threshold` of the window entries are true.
    Symmetric { threshold: usize },
    /// Direction-dependent: stays HEALTHY while >= 2 of W are true, flips to HEALTHY
    /// only when >= 4 of W are true. Thresholds are fixed in this mode.
    Asymmetric,
}

#[derive(Debug, Clone)]
pub struct HysteresisWindow {
    window: VecDeque<bool>,
    capacity: usize,
    mode: HysteresisMode,
    last_classification: Option<bool>,
}

impl HysteresisWindow {
    pub fn new(capacity: usize, mode: HysteresisMode) -> Self {
        assert!(capacity > 0, "hysteresis window capacity must be > 0");
        if let HysteresisMode::Symmetric { threshold } = mode {
            assert!(
                threshold >= 1 && threshold <= capacity,
                "symmetric threshold must be in 1..=capacity"
            );
        }
        Self { window: VecDeque::with_capacity(capacity), capacity, mode, last_classification: None }
    }

    /// Feed one KNOWN observation (HEALTHY=true) and return the smoothed classification.
    ///
    /// While the window has not yet reached `capacity` (warm-up), the raw observation
    /// is returned unsmoothed.
    pub fn observe(&mut self, healthy: bool) -> bool {
        self.window.push_back(healthy);
        if self.window.len() > self.capacity {
            self.window.pop_front();
        }

        let classified = if self.window.len() < self.capacity {
            healthy
        } else {
            match self.mode {
                HysteresisMode::Symmetric { threshold } => {
                    self.window.iter().filter(|&&v| v).count() >= threshold
                }
                HysteresisMode::Asymmetric => {
                    let true_count = self.window.iter().filter(|&&v| v).count();
                    match self.last_classification {
                        Some(true) => true_count >= 2,
                        Some(false) | None => true_count >= 4,
                    }
                }
            }
        };

        self.last_classification = Some(classified);
        classified
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn is_warmed_up(&self) -> bool {
        self.window.len() >= self.capacity
    }
}
