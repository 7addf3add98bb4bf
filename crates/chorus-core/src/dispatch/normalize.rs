//! Conversion of raw adapter outcomes into uniform result records.

use crate::error::ProviderError;
use crate::types::{CallTiming, GenerationResult, Payload, ProviderSpec, ResultError};

/// Convert one settled adapter outcome into a `GenerationResult`.
///
/// Total over every possible outcome: any payload becomes a success entry,
/// any error becomes a failure entry carrying the error's kind and message.
/// No network or filesystem side effects.
pub fn normalize(
    spec: ProviderSpec,
    outcome: Result<Payload, ProviderError>,
    timing: CallTiming,
) -> GenerationResult {
    match outcome {
        Ok(payload) => GenerationResult::success(spec, payload, timing),
        Err(err) => GenerationResult::failure(spec, ResultError::from(&err), timing),
    }
}
