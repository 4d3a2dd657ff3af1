// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, warn};

use super::{push_bounded, CaseSnapshot};
use crate::errors::{ProbeError, ProbeResult};

/// Numeric-distribution classifier.
///
/// Each case caches the mean and population standard deviation of its
/// current window; both are recomputed after every insertion. Overlap
/// detection runs after every recorded observation, not just at
/// classification time, because a later observation can retroactively
/// invalidate an earlier confident decision.
#[derive(Debug, Default)]
pub struct NumericClassifier<R> {
    cases: HashMap<String, NumericCase<R>>,
}

#[derive(Debug)]
struct NumericCase<R> {
    rval: R,
    window: VecDeque<f64>,
    mean: f64,
    stddev: f64,
}

/// Mean and population standard deviation of a non-empty window.
fn window_stats(window: &VecDeque<f64>) -> (f64, f64) {
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

impl<R: Clone + PartialEq> NumericClassifier<R> {
    pub fn new() -> Self {
        Self {
            cases: HashMap::new(),
        }
    }

    /// Fold a value into the labeled case, refresh its cached statistics
    /// and verify that differently-valued cases are still separable.
    pub fn record(&mut self, label: &str, rval: R, value: f64) -> ProbeResult<()> {
        let case = self
            .cases
            .entry(label.to_string())
            .or_insert_with(|| NumericCase {
                rval,
                window: VecDeque::new(),
                mean: 0.0,
                stddev: 0.0,
            });
        push_bounded(&mut case.window, value);
        let (mean, stddev) = window_stats(&case.window);
        case.mean = mean;
        case.stddev = stddev;

        self.check_for_overlaps()
    }

    /// Cases with different rvals must keep their means separated by at
    /// least twice the average of their standard deviations. When they
    /// blend together the signal no longer distinguishes outcomes and we
    /// fail loudly rather than silently guess. Cases sharing an rval may
    /// blend freely.
    fn check_for_overlaps(&self) -> ProbeResult<()> {
        let cases: Vec<(&String, &NumericCase<R>)> = self.cases.iter().collect();
        for (i, (label_a, a)) in cases.iter().enumerate() {
            for (label_b, b) in cases.iter().skip(i + 1) {
                if a.rval == b.rval {
                    continue;
                }
                let threshold = 2.0 * ((a.stddev + b.stddev) / 2.0);
                let separation = (a.mean - b.mean).abs();
                if separation < threshold {
                    warn!(
                        "distributions overlap: '{}' (mean={:.2}, stddev={:.2}) vs \
                         '{}' (mean={:.2}, stddev={:.2})",
                        label_a, a.mean, a.stddev, label_b, b.mean, b.stddev
                    );
                    return Err(ProbeError::AmbiguousSignal {
                        case_a: (*label_a).clone(),
                        case_b: (*label_b).clone(),
                        separation,
                        threshold,
                    });
                }
            }
        }
        Ok(())
    }

    /// Assign a value to the case whose mean-midpoint interval contains it.
    ///
    /// Cases are scanned ascending by mean; each interval is bounded below
    /// by the midpoint with the previous mean (unbounded for the first) and
    /// above by the midpoint with the next mean (unbounded for the last).
    /// Both bounds are inclusive, so the lower case wins a tie at a shared
    /// midpoint.
    pub fn classify(&self, value: f64) -> ProbeResult<String> {
        if self.cases.is_empty() {
            return Err(ProbeError::NoReferenceCase);
        }

        let mut ordered: Vec<(&String, &NumericCase<R>)> = self.cases.iter().collect();
        ordered.sort_by(|a, b| a.1.mean.partial_cmp(&b.1.mean).unwrap_or(Ordering::Equal));

        for (index, (label, _)) in ordered.iter().enumerate() {
            let lower = (index > 0)
                .then(|| (ordered[index - 1].1.mean + ordered[index].1.mean) / 2.0);
            let upper = (index + 1 < ordered.len())
                .then(|| (ordered[index].1.mean + ordered[index + 1].1.mean) / 2.0);

            let above_lower = lower.map_or(true, |l| value >= l);
            let below_upper = upper.map_or(true, |u| value <= u);
            if above_lower && below_upper {
                debug!("value {:.2} falls to case '{}'", value, label);
                return Ok((*label).clone());
            }
        }

        // Unreachable while the overlap invariant holds; surfaced as a
        // defect rather than swallowed.
        Err(ProbeError::InvariantViolation(format!(
            "boundary scan exhausted without assigning value {}",
            value
        )))
    }

    pub fn rval_of(&self, label: &str) -> Option<R> {
        self.cases.get(label).map(|c| c.rval.clone())
    }

    /// Cached (mean, stddev) of a case's current window.
    pub fn stats_of(&self, label: &str) -> Option<(f64, f64)> {
        self.cases.get(label).map(|c| (c.mean, c.stddev))
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn snapshot(&self) -> Vec<CaseSnapshot<R>> {
        self.cases
            .iter()
            .map(|(label, case)| CaseSnapshot {
                label: label.clone(),
                rval: case.rval.clone(),
                values: case
                    .window
                    .iter()
                    .map(|v| super::ObservedValue::Number(*v))
                    .collect(),
                mean: Some(case.mean),
                stddev: Some(case.stddev),
            })
            .collect()
    }
}
