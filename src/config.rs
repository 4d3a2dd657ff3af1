// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::classifier::ObservedValue;
use crate::http_client::HttpResponse;

/// Probe configuration.
///
/// Deserializable from the attack-config documents the driver loads;
/// validated before a requester is built from it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProbeConfig {
    /// Which response attribute drives classification.
    #[serde(default)]
    pub comparison_attr: ComparisonAttr,

    /// Tolerance parameter carried for the probabilistic variants.
    ///
    /// Reserved: accepted and validated, but not consulted by the current
    /// classifiers. Kept so existing attack configs keep deserializing.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_acceptable_deviation")]
    pub acceptable_deviation: f64,

    /// Degree of parallel probing. Scheduling is the probe driver's
    /// concern; the classifier only has to survive it.
    #[validate(range(min = 1))]
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Name of the extraction strategy the driver runs (binary_search,
    /// frequency_search, ...). Opaque to this crate.
    #[serde(default = "default_technique")]
    pub technique: String,

    /// Transport timeout in seconds.
    #[validate(range(min = 1))]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            comparison_attr: ComparisonAttr::default(),
            acceptable_deviation: default_acceptable_deviation(),
            concurrency: default_concurrency(),
            technique: default_technique(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_acceptable_deviation() -> f64 {
    0.6
}

fn default_concurrency() -> usize {
    30
}

fn default_technique() -> String {
    "binary_search".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// The response attribute used for comparing probes.
///
/// A closed set resolved once when the requester is built; there is no
/// by-name attribute dispatch at classification time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonAttr {
    /// Byte size of the response body (0 when the body has no length).
    #[default]
    Size,
    /// Wall-clock milliseconds from dispatch to completion.
    Time,
    /// The response body itself.
    Text,
    /// HTTP status code.
    StatusCode,
}

impl ComparisonAttr {
    /// Whether this attribute yields a numeric observation.
    pub fn is_numeric(self) -> bool {
        !matches!(self, ComparisonAttr::Text)
    }

    /// Extract the comparison value from a completed response.
    pub fn extract(self, response: &HttpResponse) -> ObservedValue {
        match self {
            ComparisonAttr::Size => ObservedValue::Number(response.size() as f64),
            ComparisonAttr::Time => ObservedValue::Number(response.duration_ms as f64),
            ComparisonAttr::Text => ObservedValue::Text(response.body.clone()),
            ComparisonAttr::StatusCode => ObservedValue::Number(response.status_code as f64),
        }
    }
}
