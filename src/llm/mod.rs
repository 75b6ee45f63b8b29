use std::collections::HashMap;

use crate::error::Result;

pub mod constrained;
pub mod quantized_gguf;

pub use constrained::ConstrainedStep;
pub use quantized_gguf::GgufGenerator;

/// Trait for model runtimes able to produce one constrained token.
///
/// The healing algorithm is backend-agnostic: any runtime capable of a
/// single constrained decoding step satisfies this contract.
pub trait ConstrainedGenerator: Send + Sync {
    /// Generate exactly one token id drawn from `allowed`.
    ///
    /// `bias` entries nudge the selection between candidates without the
    /// caller implementing sampling itself. An empty `context` means
    /// "generate from the model's start-of-sequence context".
    fn generate_one(
        &mut self,
        context: &[u32],
        allowed: &[u32],
        bias: &HashMap<u32, f32>,
    ) -> Result<u32>;
}
