pub mod params;
pub mod masking;
pub mod bounds;
pub mod sign;
pub mod codec;
pub mod kat_drbg;

use thiserror::Error;

/// Errors surfaced by the serialization layer. Verification itself reports
/// only a boolean; the reason is never exposed to callers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RaccError {
    /// Serialized input is too short for the parameter set.
    #[error("serialized input too short")]
    InvalidLength,
    /// Infinity or scaled-L2 bound exceeded.
    #[error("signature bounds exceeded")]
    BoundsFail,
    /// Recomputed challenge hash does not match the signature.
    #[error("challenge hash mismatch")]
    BadChallenge,
}
