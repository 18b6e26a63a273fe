use crate::caps::Capabilities;
use thiserror::Error;

/// Runtime failures raised by sequences and combinators.
///
/// Every variant carries the type name of the offending sequence so a
/// caller-side messaging layer can render prose without re-inspecting
/// the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An operation needs a capability the sequence does not expose.
    #[error("`{sequence}` does not support {missing}")]
    UnsupportedCapability {
        sequence: &'static str,
        missing: Capabilities,
    },

    /// An operation needs provable finiteness and the sequence cannot
    /// guarantee it.
    #[error("`{sequence}` is not provably bounded")]
    NotBounded { sequence: &'static str },

    /// Malformed call arguments. Raised by the validation layer in
    /// front of this crate; the core surfaces it by construction
    /// failure only.
    #[error("invalid arguments to `{operation}`: {reason}")]
    InvalidArguments {
        operation: &'static str,
        reason: &'static str,
    },
}

impl Error {
    pub fn unsupported(sequence: &'static str, missing: Capabilities) -> Self {
        Error::UnsupportedCapability { sequence, missing }
    }

    pub fn not_bounded(sequence: &'static str) -> Self {
        Error::NotBounded { sequence }
    }
}

/// Registration-time failures of the conversion registry. Fatal and
/// immediate; nothing retries a failed registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("converter `{name}` is already registered")]
    Duplicate { name: &'static str },

    /// Two converters' before/after constraints are mutually
    /// contradictory.
    #[error("ordering conflict between converters `{a}` and `{b}`")]
    Conflict {
        a: &'static str,
        b: &'static str,
    },

    #[error("no registered converter matches `{input}` input")]
    NoMatch { input: &'static str },
}
