// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use reqwest::{Client, Method};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::errors::ProbeResult;

/// Maximum response body size (10MB) to prevent memory exhaustion
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

const DEFAULT_POOL_IDLE_PER_HOST: usize = 32;
const DEFAULT_POOL_MAX_IDLE_TIMEOUT: u64 = 90;

/// Transport collaborator.
///
/// Dispatches one rendered request and measures wall-clock time from
/// dispatch to completion of the body read, which is the timing the
/// time-based comparison attribute classifies on. There is no retry or
/// backoff here: a failed dispatch is reported as `TransportFailure` and
/// classification state stays untouched.
#[derive(Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    max_body_size: usize,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> ProbeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .pool_max_idle_per_host(DEFAULT_POOL_IDLE_PER_HOST)
            .pool_idle_timeout(Duration::from_secs(DEFAULT_POOL_MAX_IDLE_TIMEOUT))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            max_body_size: MAX_BODY_SIZE,
        })
    }

    /// Dispatch a rendered request and expose the completed observation.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
    ) -> ProbeResult<HttpResponse> {
        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body {
            request = request
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(body);
        }

        let start = Instant::now();
        let response = request.send().await?;

        let status_code = response.status().as_u16();
        let headers_map = {
            let headers = response.headers();
            let mut map = HashMap::with_capacity(headers.len());
            for (k, v) in headers.iter() {
                if let Ok(value_str) = v.to_str() {
                    map.insert(k.as_str().to_string(), value_str.to_string());
                }
            }
            map
        };

        let body_bytes = response.bytes().await?;
        let elapsed = start.elapsed();

        let body = if body_bytes.len() > self.max_body_size {
            String::from_utf8_lossy(&body_bytes[..self.max_body_size]).to_string()
        } else {
            String::from_utf8_lossy(&body_bytes).to_string()
        };

        debug!(
            "{} {} -> status={}, size={}, elapsed={}ms",
            method,
            url,
            status_code,
            body.len(),
            elapsed.as_millis()
        );

        Ok(HttpResponse {
            status_code,
            body,
            headers: headers_map,
            duration_ms: elapsed.as_millis() as u64,
        })
    }

}

/// A completed probe result with the attributes classification reads.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
    pub headers: HashMap<String, String>,
    pub duration_ms: u64,
}

impl HttpResponse {
    /// Byte size of the body; 0 when the body has no measurable length.
    pub fn size(&self) -> usize {
        self.body.len()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers.get(&name.to_lowercase()).cloned()
    }
}
