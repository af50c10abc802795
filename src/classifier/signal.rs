//! Pure analysis of a digital sample window.
//!
//! Everything here works on plain `&[bool]` slices so it can be driven by
//! real GPIO reads, simulated pins, or property tests alike.

use serde::Serialize;

/// Windows shorter than this are never reported as periodic.
pub const MIN_PERIODIC_WINDOW: usize = 6;

/// Number of adjacent sample pairs that differ.
pub fn transition_count(samples: &[bool]) -> usize {
    samples.windows(2).filter(|w| w[0] != w[1]).count()
}

/// The common level if every sample is identical, `None` otherwise.
///
/// An empty window has no level.
pub fn constant_level(samples: &[bool]) -> Option<bool> {
    let (&first, rest) = samples.split_first()?;
    rest.iter().all(|&s| s == first).then_some(first)
}

/// Smallest period `p` in `2..len/2` such that `s[i] == s[i - p]` for
/// every `i >= p`.
///
/// Periods are tried in ascending order, so the first hit is the smallest.
/// Brute force is O(n²) over a window bounded by
/// [`MAX_SAMPLES`](crate::config::MAX_SAMPLES).
pub fn smallest_period(samples: &[bool]) -> Option<usize> {
    if samples.len() < MIN_PERIODIC_WINDOW {
        return None;
    }
    (2..samples.len() / 2).find(|&p| (p..samples.len()).all(|i| samples[i] == samples[i - p]))
}

/// Summary of a sample window, computed once and consumed by the decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignalProfile {
    pub transitions: usize,
    pub constant_level: Option<bool>,
    pub period: Option<usize>,
}

impl SignalProfile {
    pub fn analyse(samples: &[bool]) -> Self {
        Self {
            transitions: transition_count(samples),
            constant_level: constant_level(samples),
            period: smallest_period(samples),
        }
    }

    pub fn is_stable(&self) -> bool {
        self.constant_level.is_some()
    }
}
