// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Probe Error Types
 * Typed failure taxonomy for the classification engine
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use thiserror::Error;

/// Errors surfaced across the probe boundary.
///
/// Every failure the probe driver can observe is a typed variant here;
/// nothing is reported as a silent `None`.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Request dispatch did not complete. No classification state was
    /// mutated; the caller may retry at its own discretion.
    #[error("transport failure: {source}")]
    TransportFailure {
        #[from]
        source: reqwest::Error,
    },

    /// The numeric distributions of differently-valued cases have collapsed
    /// into overlap. The signal no longer distinguishes outcomes; fatal for
    /// the whole extraction job.
    #[error(
        "ambiguous signal: cases '{case_a}' and '{case_b}' overlap \
         (mean separation {separation:.2} < threshold {threshold:.2})"
    )]
    AmbiguousSignal {
        case_a: String,
        case_b: String,
        separation: f64,
        threshold: f64,
    },

    /// The requester was poisoned by an earlier `AmbiguousSignal`; the case
    /// store is no longer trustworthy and this result was discarded.
    #[error("classifier poisoned by earlier ambiguous signal; result discarded")]
    Poisoned,

    /// Exact-match classification found no case whose window contains the
    /// observed value. Indeterminate rather than wrong; the driver should
    /// seed a case for this outcome via an explicit (label, rval) probe.
    #[error("observation {observed} matched no known case")]
    UnmatchedObservation { observed: String },

    /// Automatic classification was attempted before any reference case was
    /// seeded. There is nothing to compare against.
    #[error("no reference case seeded; probe with an explicit label/rval first")]
    NoReferenceCase,

    /// The boundary scan exhausted every interval without a match. The
    /// overlap invariant was violated without being detected; this is a
    /// defect, never recovered from.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),

    /// Malformed query template.
    #[error("template error: {0}")]
    Template(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ProbeError {
    /// True when the extraction job must stop issuing probes.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ProbeError::AmbiguousSignal { .. }
                | ProbeError::Poisoned
                | ProbeError::InvariantViolation(_)
        )
    }

    /// True when the caller may reasonably retry the same probe.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProbeError::TransportFailure { .. })
    }
}

/// Result type for probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let ambiguous = ProbeError::AmbiguousSignal {
            case_a: "true".into(),
            case_b: "false".into(),
            separation: 30.0,
            threshold: 120.0,
        };
        assert!(ambiguous.is_fatal());
        assert!(!ambiguous.is_retryable());

        let unmatched = ProbeError::UnmatchedObservation {
            observed: "512".into(),
        };
        assert!(!unmatched.is_fatal());

        assert!(ProbeError::Poisoned.is_fatal());
        assert!(ProbeError::InvariantViolation("scan exhausted".into()).is_fatal());
        assert!(!ProbeError::NoReferenceCase.is_fatal());
    }

    #[test]
    fn test_error_messages() {
        let err = ProbeError::AmbiguousSignal {
            case_a: "t".into(),
            case_b: "f".into(),
            separation: 30.0,
            threshold: 120.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("30.00"));
        assert!(msg.contains("120.00"));
    }
}
