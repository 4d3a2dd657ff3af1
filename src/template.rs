// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Query Template Renderer
 * ${name:default} placeholder substitution for probe payloads
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use tracing::debug;

use crate::errors::{ProbeError, ProbeResult};

/// `${name}` or `${name:default}`
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::([^}]*))?\}").unwrap()
});

/// A query template with named placeholders, each carrying a default.
///
/// The probe contract sets every placeholder to the same probe value before
/// rendering; an extraction driver may also steer individual placeholders
/// (row index, character index, comparator) through `set_options`.
#[derive(Debug, Clone)]
pub struct QueryTemplate {
    raw: String,
    options: HashMap<String, String>,
    url_encode: bool,
}

impl QueryTemplate {
    /// Parse a template, seeding each placeholder's current value from its
    /// default (empty string when no default is given).
    pub fn parse(raw: &str) -> ProbeResult<Self> {
        Self::check_delimiters(raw)?;

        let mut options = HashMap::new();
        for caps in PLACEHOLDER_RE.captures_iter(raw) {
            let name = caps[1].to_string();
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("").to_string();
            options.entry(name).or_insert(default);
        }

        Ok(Self {
            raw: raw.to_string(),
            options,
            url_encode: false,
        })
    }

    /// URL-encode substituted values at render time. Used when the template
    /// lands in a URL query string.
    pub fn with_url_encoding(mut self) -> Self {
        self.url_encode = true;
        self
    }

    /// Every `${` must open a well-formed placeholder.
    fn check_delimiters(raw: &str) -> ProbeResult<()> {
        let mut rest = raw;
        while let Some(idx) = rest.find("${") {
            let tail = &rest[idx..];
            match PLACEHOLDER_RE.find(tail) {
                Some(m) if m.start() == 0 => rest = &tail[m.end()..],
                _ => {
                    return Err(ProbeError::Template(format!(
                        "malformed placeholder at byte {} of {:?}",
                        raw.len() - rest.len() + idx,
                        raw
                    )))
                }
            }
        }
        Ok(())
    }

    /// Current value of every placeholder.
    pub fn get_options(&self) -> HashMap<String, String> {
        self.options.clone()
    }

    /// Update placeholder values. Names the template does not contain are
    /// logged and skipped.
    pub fn set_options(&mut self, options: &HashMap<String, String>) {
        for (name, value) in options {
            match self.options.get_mut(name) {
                Some(slot) => *slot = value.clone(),
                None => debug!("ignoring unknown template option '{}'", name),
            }
        }
    }

    /// Set every placeholder to the same value. This is what the probe
    /// contract does with the probe value.
    pub fn set_all(&mut self, value: &str) {
        for slot in self.options.values_mut() {
            *slot = value.to_string();
        }
    }

    /// Substitute current values into the template.
    pub fn render(&self) -> String {
        PLACEHOLDER_RE
            .replace_all(&self.raw, |caps: &Captures| {
                let value = self
                    .options
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_default();
                if self.url_encode {
                    urlencoding::encode(&value).into_owned()
                } else {
                    value
                }
            })
            .into_owned()
    }
}
