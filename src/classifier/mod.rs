// Copyright (c) 2026 Bountyy Oy. All rights reserved.
//
// Response Classification Engine
//
// A probe's response is reduced to a single comparison value (size, timing,
// body text or status) and matched against previously-learned cases. Each
// case binds a label to the caller's return value (rval) and keeps a bounded
// sliding window of the values observed for it, so per-case signatures are
// learned online and old outliers age out as the remote's behavior drifts.
//
// Three variants:
// - exact: a value belongs to a case iff it appears verbatim in the window
// - numeric: cases are separated by the midpoints between their window means,
//   with overlap detection guarding the decision boundary
// - text: nearest stored value by normalized sequence similarity

pub mod numeric;
pub mod text;

pub use numeric::NumericClassifier;
pub use text::TextClassifier;

use std::collections::{HashMap, VecDeque};
use std::fmt;
use tracing::debug;

use crate::errors::{ProbeError, ProbeResult};

/// Sliding window capacity per case. Bounds memory and lets old outliers
/// age out as the remote system drifts.
pub const WINDOW_CAP: usize = 10;

/// Append newest, evict oldest once the window exceeds capacity.
pub(crate) fn push_bounded<T>(window: &mut VecDeque<T>, value: T) {
    window.push_back(value);
    if window.len() > WINDOW_CAP {
        window.pop_front();
    }
}

/// The single comparison value extracted from one completed probe.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedValue {
    Number(f64),
    Text(String),
}

impl ObservedValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ObservedValue::Number(n) => Some(*n),
            ObservedValue::Text(_) => None,
        }
    }

    /// Short loggable form; long bodies are truncated.
    pub fn summary(&self) -> String {
        match self {
            ObservedValue::Number(n) => n.to_string(),
            ObservedValue::Text(s) if s.chars().count() > 64 => {
                format!("{:?}...", s.chars().take(64).collect::<String>())
            }
            ObservedValue::Text(s) => format!("{:?}", s),
        }
    }
}

impl fmt::Display for ObservedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservedValue::Number(n) => write!(f, "{}", n),
            ObservedValue::Text(s) => f.write_str(s),
        }
    }
}

/// Result of one exact-match classification.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyOutcome {
    /// The value is present in this case's window.
    Matched(String),
    /// No known case fits. Not an error: this is how new cases get
    /// bootstrapped by the driver.
    Unmatched,
}

/// Read-only view of one learned case, for driver introspection and tests.
#[derive(Debug, Clone)]
pub struct CaseSnapshot<R> {
    pub label: String,
    pub rval: R,
    pub values: Vec<ObservedValue>,
    pub mean: Option<f64>,
    pub stddev: Option<f64>,
}

/// Base classifier: strict verbatim comparison.
///
/// A new observation matches case C iff its value is present in C's current
/// window. Sizes must be identical, bodies byte-equal, and so on.
#[derive(Debug, Default)]
pub struct ExactClassifier<R> {
    cases: HashMap<String, ExactCase<R>>,
}

#[derive(Debug)]
struct ExactCase<R> {
    rval: R,
    window: VecDeque<ObservedValue>,
}

impl<R: Clone> ExactClassifier<R> {
    pub fn new() -> Self {
        Self {
            cases: HashMap::new(),
        }
    }

    /// `classify(observation) -> label | unmatched`
    pub fn classify(&self, value: &ObservedValue) -> ClassifyOutcome {
        for (label, case) in &self.cases {
            if case.window.contains(value) {
                return ClassifyOutcome::Matched(label.clone());
            }
        }
        ClassifyOutcome::Unmatched
    }

    /// Create the case if absent, append the value, trim to the window cap.
    pub fn record(&mut self, label: &str, rval: R, value: ObservedValue) {
        let case = self
            .cases
            .entry(label.to_string())
            .or_insert_with(|| ExactCase {
                rval,
                window: VecDeque::new(),
            });
        push_bounded(&mut case.window, value);
    }

    pub fn rval_of(&self, label: &str) -> Option<R> {
        self.cases.get(label).map(|c| c.rval.clone())
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
                values: case.window.iter().cloned().collect(),
                mean: None,
                stddev: None,
            })
            .collect()
    }
}

/// The classifier variant a requester runs. Dispatch is resolved here once;
/// variants never re-inspect configuration per call.
#[derive(Debug)]
pub enum Classifier<R> {
    Exact(ExactClassifier<R>),
    Numeric(NumericClassifier<R>),
    Text(TextClassifier<R>),
}

impl<R: Clone + PartialEq> Classifier<R> {
    /// Resolve an observation to a case label.
    pub fn classify(&self, value: &ObservedValue) -> ProbeResult<String> {
        match self {
            Classifier::Exact(c) => {
                if c.is_empty() {
                    return Err(ProbeError::NoReferenceCase);
                }
                match c.classify(value) {
                    ClassifyOutcome::Matched(label) => {
                        debug!("exact match: {} -> '{}'", value.summary(), label);
                        Ok(label)
                    }
                    ClassifyOutcome::Unmatched => Err(ProbeError::UnmatchedObservation {
                        observed: value.summary(),
                    }),
                }
            }
            Classifier::Numeric(c) => {
                let n = value.as_number().ok_or_else(|| {
                    ProbeError::Config(
                        "numeric classifier requires a numeric comparison attribute".into(),
                    )
                })?;
                c.classify(n)
            }
            Classifier::Text(c) => c.classify(&value.to_string()),
        }
    }

    /// Fold an observation into the labeled case. For the numeric variant
    /// this recomputes the case's statistics and re-runs overlap detection,
    /// so a late observation can retroactively surface `AmbiguousSignal`.
    pub fn record(&mut self, label: &str, rval: R, value: ObservedValue) -> ProbeResult<()> {
        match self {
            Classifier::Exact(c) => {
                c.record(label, rval, value);
                Ok(())
            }
            Classifier::Numeric(c) => {
                let n = value.as_number().ok_or_else(|| {
                    ProbeError::Config(
                        "numeric classifier requires a numeric comparison attribute".into(),
                    )
                })?;
                c.record(label, rval, n)
            }
            Classifier::Text(c) => {
                c.record(label, rval, value.to_string());
                Ok(())
            }
        }
    }

    pub fn rval_of(&self, label: &str) -> Option<R> {
        match self {
            Classifier::Exact(c) => c.rval_of(label),
            Classifier::Numeric(c) => c.rval_of(label),
            Classifier::Text(c) => c.rval_of(label),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Classifier::Exact(c) => c.is_empty(),
            Classifier::Numeric(c) => c.is_empty(),
            Classifier::Text(c) => c.is_empty(),
        }
    }

    pub fn snapshot(&self) -> Vec<CaseSnapshot<R>> {
        match self {
            Classifier::Exact(c) => c.snapshot(),
            Classifier::Numeric(c) => c.snapshot(),
            Classifier::Text(c) => c.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_bound() {
        let mut classifier = ExactClassifier::new();
        for i in 0..25 {
            classifier.record("c", true, ObservedValue::Number(i as f64));
        }
        let snap = classifier.snapshot();
        assert_eq!(snap.len(), 1);
        let expected: Vec<ObservedValue> =
            (15..25).map(|i| ObservedValue::Number(i as f64)).collect();
        assert_eq!(snap[0].values, expected);
    }

    #[test]
    fn test_exact_match_idempotence() {
        let mut classifier = ExactClassifier::new();
        classifier.record("true_case", true, ObservedValue::Number(5120.0));
        assert_eq!(
            classifier.classify(&ObservedValue::Number(5120.0)),
            ClassifyOutcome::Matched("true_case".to_string())
        );
    }

    #[test]
    fn test_exact_unmatched() {
        let mut classifier = ExactClassifier::new();
        classifier.record("c", false, ObservedValue::Number(100.0));
        assert_eq!(
            classifier.classify(&ObservedValue::Number(101.0)),
            ClassifyOutcome::Unmatched
        );
    }

    #[test]
    fn test_exact_matches_text_verbatim() {
        let mut classifier = ExactClassifier::new();
        classifier.record("err", false, ObservedValue::Text("500 oops".into()));
        assert_eq!(
            classifier.classify(&ObservedValue::Text("500 oops".into())),
            ClassifyOutcome::Matched("err".to_string())
        );
        assert_eq!(
            classifier.classify(&ObservedValue::Text("500 Oops".into())),
            ClassifyOutcome::Unmatched
        );
    }

    #[test]
    fn test_evicted_value_stops_matching() {
        let mut classifier = ExactClassifier::new();
        classifier.record("c", true, ObservedValue::Number(1.0));
        for _ in 0..WINDOW_CAP {
            classifier.record("c", true, ObservedValue::Number(2.0));
        }
        // 1.0 has been pushed out of the window
        assert_eq!(
            classifier.classify(&ObservedValue::Number(1.0)),
            ClassifyOutcome::Unmatched
        );
    }

    #[test]
    fn test_facade_empty_store() {
        let classifier: Classifier<bool> = Classifier::Exact(ExactClassifier::new());
        assert!(matches!(
            classifier.classify(&ObservedValue::Number(1.0)),
            Err(ProbeError::NoReferenceCase)
        ));
    }

    #[test]
    fn test_facade_unmatched_is_typed() {
        let mut classifier: Classifier<bool> = Classifier::Exact(ExactClassifier::new());
        classifier
            .record("t", true, ObservedValue::Number(10.0))
            .unwrap();
        assert!(matches!(
            classifier.classify(&ObservedValue::Number(11.0)),
            Err(ProbeError::UnmatchedObservation { .. })
        ));
    }

    #[test]
    fn test_facade_numeric_rejects_text_value() {
        let mut classifier: Classifier<bool> = Classifier::Numeric(NumericClassifier::new());
        assert!(matches!(
            classifier.record("t", true, ObservedValue::Text("body".into())),
            Err(ProbeError::Config(_))
        ));
    }

    #[test]
    fn test_facade_text_accepts_numeric_display() {
        let mut classifier: Classifier<bool> = Classifier::Text(TextClassifier::new());
        classifier
            .record("t", true, ObservedValue::Number(200.0))
            .unwrap();
        let label = classifier.classify(&ObservedValue::Number(200.0)).unwrap();
        assert_eq!(label, "t");
    }

    #[test]
    fn test_summary_truncates_long_text() {
        let long = "x".repeat(500);
        let summary = ObservedValue::Text(long).summary();
        assert!(summary.len() < 100);
        assert!(summary.ends_with("..."));
    }
}
