// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame-rate throttling for continuously updating sources.

use crate::resource::ResourceId;
use std::collections::HashMap;

/// Minimum interval between reprocessing a live source, in milliseconds
/// (roughly 30 fps).
pub const LIVE_FRAME_INTERVAL_MS: u64 = 33;

/// Bounds how often a given output may be reprocessed while its source
/// updates continuously.
#[derive(Debug, Default)]
pub struct ThrottleGovernor {
    last_processed: HashMap<ResourceId, u64>,
}

impl ThrottleGovernor {
    /// Create a governor with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `output_id` may be reprocessed at `now_millis`.
    ///
    /// Live sources within [`LIVE_FRAME_INTERVAL_MS`] of their last
    /// processing are refused, and the refusal does not update the
    /// timestamp — the caller reuses the previous buffer contents.
    /// Static sources always pass; their reprocessing is already gated
    /// by value propagation.
    pub fn should_process(&mut self, output_id: &ResourceId, is_live: bool, now_millis: u64) -> bool {
        if is_live {
            let last = self.last_processed.get(output_id).copied().unwrap_or(0);
            if now_millis.saturating_sub(last) < LIVE_FRAME_INTERVAL_MS {
                return false;
            }
        }
        self.record(output_id, now_millis);
        true
    }

    /// Record a processing time directly. Used when a refused frame is
    /// rendered anyway because no previous buffer exists to reuse.
    pub fn record(&mut self, output_id: &ResourceId, now_millis: u64) {
        self.last_processed.insert(output_id.clone(), now_millis);
    }

    /// Forget an output's history when its owning node is removed.
    pub fn forget(&mut self, output_id: &ResourceId) {
        self.last_processed.remove(output_id);
    }
}
