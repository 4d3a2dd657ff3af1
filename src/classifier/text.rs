// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use similar::TextDiff;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

use super::{push_bounded, CaseSnapshot, ObservedValue};
use crate::errors::{ProbeError, ProbeResult};

/// Text-similarity classifier.
///
/// Scores the new value against every stored value of every case with a
/// normalized sequence-similarity ratio (symmetric, 0..=1, higher is more
/// similar) and assigns the globally best-scoring case. There is no
/// per-case aggregate and no minimum-confidence floor: even a weak best
/// match wins.
#[derive(Debug, Default)]
pub struct TextClassifier<R> {
    cases: HashMap<String, TextCase<R>>,
}

#[derive(Debug)]
struct TextCase<R> {
    rval: R,
    window: VecDeque<String>,
}

/// Character-level similarity ratio between two strings.
fn similarity(a: &str, b: &str) -> f32 {
    TextDiff::from_chars(a, b).ratio()
}

impl<R: Clone> TextClassifier<R> {
    pub fn new() -> Self {
        Self {
            cases: HashMap::new(),
        }
    }

    pub fn record(&mut self, label: &str, rval: R, value: String) {
        let case = self
            .cases
            .entry(label.to_string())
            .or_insert_with(|| TextCase {
                rval,
                window: VecDeque::new(),
            });
        push_bounded(&mut case.window, value);
    }

    /// Assign to the case holding the single most similar stored value.
    pub fn classify(&self, value: &str) -> ProbeResult<String> {
        if self.cases.is_empty() {
            return Err(ProbeError::NoReferenceCase);
        }

        let mut best: Option<(f32, &str)> = None;
        for (label, case) in &self.cases {
            for stored in &case.window {
                let ratio = similarity(value, stored);
                if best.map_or(true, |(top, _)| ratio > top) {
                    best = Some((ratio, label.as_str()));
                }
            }
        }

        match best {
            Some((ratio, label)) => {
                debug!("best similarity {:.3} -> case '{}'", ratio, label);
                Ok(label.to_string())
            }
            // Every case holds at least one value from its creating record.
            None => Err(ProbeError::InvariantViolation(
                "no stored values to score against".into(),
            )),
        }
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
                values: case
                    .window
                    .iter()
                    .map(|v| ObservedValue::Text(v.clone()))
                    .collect(),
                mean: None,
                stddev: None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_range() {
        assert_eq!(similarity("hello", "hello"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        let partial = similarity("hello world", "hello wrld");
        assert!(partial > 0.8 && partial < 1.0);
    }

    #[test]
    fn test_closest_case_wins() {
        let mut classifier = TextClassifier::new();
        classifier.record("x", true, "hello world".to_string());
        classifier.record("y", false, "goodbye".to_string());

        assert_eq!(classifier.classify("hello wrld").unwrap(), "x");
        assert_eq!(classifier.classify("goodby").unwrap(), "y");
    }

    #[test]
    fn test_global_best_not_per_case_aggregate() {
        // "y" holds mostly poor matches plus one excellent one; the single
        // best stored value decides, not the case average.
        let mut classifier = TextClassifier::new();
        classifier.record("x", true, "login successful, welcome".to_string());
        classifier.record("y", false, "zzzzzzzzzz".to_string());
        classifier.record("y", false, "qqqqqqqqqq".to_string());
        classifier.record("y", false, "error: invalid credentials".to_string());

        assert_eq!(
            classifier.classify("error: invalid credential").unwrap(),
            "y"
        );
    }

    #[test]
    fn test_classify_empty_store() {
        let classifier: TextClassifier<bool> = TextClassifier::new();
        assert!(matches!(
            classifier.classify("anything"),
            Err(ProbeError::NoReferenceCase)
        ));
    }

    #[test]
    fn test_window_bound() {
        let mut classifier = TextClassifier::new();
        for i in 0..20 {
            classifier.record("c", true, format!("body-{i}"));
        }
        let snap = classifier.snapshot();
        assert_eq!(snap[0].values.len(), 10);
        assert_eq!(snap[0].values[0], ObservedValue::Text("body-10".into()));
        assert_eq!(snap[0].values[9], ObservedValue::Text("body-19".into()));
    }
}
