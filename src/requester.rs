// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Probe Execution Contract
 * Renders a probe value into the request templates, dispatches it, and
 * routes the observed response through the classification engine
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use parking_lot::Mutex;
use reqwest::Method;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};
use validator::Validate;

use crate::classifier::{
    CaseSnapshot, Classifier, ExactClassifier, NumericClassifier, TextClassifier,
};
use crate::config::{ComparisonAttr, ProbeConfig};
use crate::errors::{ProbeError, ProbeResult};
use crate::http_client::HttpClient;
use crate::template::QueryTemplate;

/// Drives one probe at a time against a remote endpoint and learns what its
/// TRUE and FALSE responses look like.
///
/// The case store sits behind a single synchronous mutex. Rendering and
/// dispatch never hold it; the classify/record/overlap-check cycle runs
/// under one acquisition so concurrent probes serialize their updates and
/// overlap detection always sees a consistent snapshot of every case.
///
/// Once an `AmbiguousSignal` fires the requester is poisoned: probes still
/// in flight complete their HTTP exchange but their results are discarded,
/// and every later probe fails fast with `Poisoned`.
pub struct Requester<R> {
    client: HttpClient,
    method: Method,
    url: QueryTemplate,
    body: Option<QueryTemplate>,
    attr: ComparisonAttr,
    store: Mutex<Classifier<R>>,
    poisoned: AtomicBool,
}

impl<R: Clone + PartialEq> Requester<R> {
    /// Strict requester: observations must repeat verbatim to match a case.
    pub fn exact(url: QueryTemplate, config: &ProbeConfig) -> ProbeResult<Self> {
        Self::build(url, config, Classifier::Exact(ExactClassifier::new()))
    }

    /// Numeric-distribution requester over size, time or status code.
    pub fn loose_numeric(url: QueryTemplate, config: &ProbeConfig) -> ProbeResult<Self> {
        if !config.comparison_attr.is_numeric() {
            return Err(ProbeError::Config(format!(
                "comparison attribute {:?} is not numeric",
                config.comparison_attr
            )));
        }
        Self::build(url, config, Classifier::Numeric(NumericClassifier::new()))
    }

    /// Text-similarity requester. Numeric attributes are admitted through
    /// their display form.
    pub fn loose_text(url: QueryTemplate, config: &ProbeConfig) -> ProbeResult<Self> {
        Self::build(url, config, Classifier::Text(TextClassifier::new()))
    }

    fn build(
        url: QueryTemplate,
        config: &ProbeConfig,
        classifier: Classifier<R>,
    ) -> ProbeResult<Self> {
        config
            .validate()
            .map_err(|e| ProbeError::Config(e.to_string()))?;

        Ok(Self {
            client: HttpClient::new(config.timeout_secs)?,
            method: Method::GET,
            url,
            body: None,
            attr: config.comparison_attr,
            store: Mutex::new(classifier),
            poisoned: AtomicBool::new(false),
        })
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Attach a body template; its placeholders receive the probe value too.
    pub fn with_body(mut self, body: QueryTemplate) -> Self {
        self.body = Some(body);
        self
    }

    /// Probe with automatic classification: render, dispatch, classify the
    /// observation against the learned cases, fold it into the matched
    /// case's window and return that case's rval.
    pub async fn probe(&self, value: &str) -> ProbeResult<R> {
        self.probe_inner(value, None).await
    }

    /// Probe under an explicit (label, rval): classification is skipped and
    /// the observation recorded directly. This is how the reference cases
    /// ("known true", "known false") are established before automatic
    /// classification is trusted.
    pub async fn probe_as(&self, value: &str, label: &str, rval: R) -> ProbeResult<R> {
        self.probe_inner(value, Some((label, rval))).await
    }

    async fn probe_inner(&self, value: &str, seed: Option<(&str, R)>) -> ProbeResult<R> {
        if self.poisoned.load(Ordering::Acquire) {
            return Err(ProbeError::Poisoned);
        }

        let url = {
            let mut template = self.url.clone();
            template.set_all(value);
            template.render()
        };
        let body = self.body.as_ref().map(|b| {
            let mut template = b.clone();
            template.set_all(value);
            template.render()
        });

        // Long-latency section: no lock held while the probe is in flight.
        let response = self.client.execute(self.method.clone(), &url, body).await?;

        let observed = self.attr.extract(&response);

        let mut store = self.store.lock();

        // A concurrent probe may have poisoned the store while we waited.
        // The poisoner raises the flag while still holding this lock, so a
        // check made under it leaves no window: an in-flight result that
        // lost the acquisition race is discarded, never recorded.
        if self.poisoned.load(Ordering::Acquire) {
            debug!("discarding in-flight result for probe {:?}", value);
            return Err(ProbeError::Poisoned);
        }

        let (label, rval) = match seed {
            Some((label, rval)) => (label.to_string(), rval),
            None => {
                let label = store.classify(&observed)?;
                let rval = store.rval_of(&label).ok_or_else(|| {
                    ProbeError::InvariantViolation(format!(
                        "classified into unknown case '{label}'"
                    ))
                })?;
                (label, rval)
            }
        };

        if let Err(err) = store.record(&label, rval, observed) {
            if matches!(err, ProbeError::AmbiguousSignal { .. }) {
                warn!("ambiguous signal, halting extraction: {err}");
                self.poisoned.store(true, Ordering::Release);
            }
            return Err(err);
        }

        // A seed may re-use an existing label; the binding that sticks is
        // the one the store holds, so the returned rval is read back from it.
        let rval = store.rval_of(&label).ok_or_else(|| {
            ProbeError::InvariantViolation(format!("case '{label}' missing after record"))
        })?;

        debug!("probe {:?} resolved to case '{}'", value, label);
        Ok(rval)
    }

    /// Whether an `AmbiguousSignal` has shut this requester down.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::Acquire)
    }

    /// Read-only view of every learned case.
    pub fn snapshot(&self) -> Vec<CaseSnapshot<R>> {
        self.store.lock().snapshot()
    }
}
