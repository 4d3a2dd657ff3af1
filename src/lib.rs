// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Blind-Injection Truth Inference Library
 * Statistical response classification for boolean-blind extraction
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod classifier;
pub mod config;
pub mod errors;
pub mod http_client;
pub mod requester;
pub mod template;

pub use config::{ComparisonAttr, ProbeConfig};
pub use errors::{ProbeError, ProbeResult};
pub use requester::Requester;
pub use template::QueryTemplate;
