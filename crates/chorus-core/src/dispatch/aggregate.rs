//! Assembly of ordered results into the final comparison set.

use crate::types::{ComparisonSet, GenerationResult, Prompt};

/// Bundle the ordered results for one dispatch into a `ComparisonSet`.
///
/// `results` must already be in input provider order, one entry per
/// dispatched spec. A count mismatch means the dispatcher lost or invented
/// an entry, which is a bug in this crate, not a recoverable condition.
pub fn aggregate(prompt: &Prompt, expected: usize, results: Vec<GenerationResult>) -> ComparisonSet {
    assert_eq!(
        results.len(),
        expected,
        "dispatcher settled {} results for {expected} providers",
        results.len(),
    );
    ComparisonSet::new(prompt.text().to_string(), results)
}
