//! Confidence filtering.

use crate::model::ConfidenceThreshold;
use crate::types::ValidationResult;
use tracing::debug;

/// Drops violations whose confidence is below `threshold`.
///
/// Violations without a confidence count as [`crate::DEFAULT_CONFIDENCE`].
/// With no threshold the results are returned unchanged. `passed` is
/// re-derived for every result, so a result left without violations passes
/// unless its validator failed to execute.
#[must_use]
pub fn filter_by_threshold(
    mut results: Vec<ValidationResult>,
    threshold: Option<ConfidenceThreshold>,
) -> Vec<ValidationResult> {
    let Some(threshold) = threshold else {
        return results;
    };
    let min = threshold.value();

    let mut dropped = 0;
    for result in &mut results {
        dropped += result.retain_violations(|v| v.effective_confidence() >= min);
    }
    if dropped > 0 {
        debug!("Dropped {} violation(s) below confidence {}", dropped, threshold);
    }
    results
}
