use crate::error::Error;
use bitflags::bitflags;
use core::fmt;

bitflags! {
    /// The optional operations a sequence instance exposes.
    ///
    /// Computed once in every constructor and stored; capability
    /// queries read the stored descriptor and never re-inspect the
    /// source chain.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// `back` / `advance_back`.
        const BIDIRECTIONAL = 1 << 0;
        /// `len` / `remaining` without consuming the sequence.
        const LENGTH = 1 << 1;
        /// `at` random access by position.
        const INDEX = 1 << 2;
        /// `slice` sub-sequence views that leave the original intact.
        const SLICE = 1 << 3;
        /// `has_key` / `get_key` associative or positional lookup.
        const KEYED = 1 << 4;
        /// `duplicate` with an independent cursor.
        const COPY = 1 << 5;
        /// `reset` the cursor to its initial position.
        const RESET = 1 << 6;
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(none)");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str(" | ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

/// Declarative capability propagation for a combinator type.
///
/// Each combinator declares one of these as a `const` and resolves it
/// against its sources' descriptors in the constructor:
///
/// - `always`: exposed unconditionally.
/// - `with_source`: exposed iff every source exposes the same bit.
/// - `derived`: `(grant, requires)` pairs; `grant` is exposed iff
///   every source exposes all of `requires`.
/// - `required`: construction fails unless every source exposes them.
///
/// With zero sources the intersection is vacuously full, which gives
/// degenerate combinators (an empty concatenation, a zero-way zip)
/// their full declared capability set.
pub struct CapSpec {
    pub always: Capabilities,
    pub with_source: Capabilities,
    pub derived: &'static [(Capabilities, Capabilities)],
    pub required: Capabilities,
}

impl CapSpec {
    /// Resolves without a `required` check. For combinators whose
    /// strategy was already selected against the source's descriptor.
    pub fn apply(&self, sources: impl IntoIterator<Item = Capabilities>) -> Capabilities {
        self.grant(Self::common(sources))
    }

    /// Resolves, failing with [`Error::UnsupportedCapability`] when a
    /// `required` bit is missing from the sources' intersection.
    pub fn resolve(
        &self,
        sequence: &'static str,
        sources: impl IntoIterator<Item = Capabilities>,
    ) -> Result<Capabilities, Error> {
        let common = Self::common(sources);
        let missing = self.required.difference(common);
        if !missing.is_empty() {
            return Err(Error::unsupported(sequence, missing));
        }
        Ok(self.grant(common))
    }

    fn common(sources: impl IntoIterator<Item = Capabilities>) -> Capabilities {
        sources
            .into_iter()
            .fold(Capabilities::all(), |acc, caps| acc.intersection(caps))
    }

    fn grant(&self, common: Capabilities) -> Capabilities {
        let mut caps = self
            .always
            .union(self.required)
            .union(self.with_source.intersection(common));
        for &(grant, requires) in self.derived {
            if common.contains(requires) {
                caps = caps.union(grant);
            }
        }
        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: CapSpec = CapSpec {
        always: Capabilities::RESET,
        with_source: Capabilities::BIDIRECTIONAL.union(Capabilities::COPY),
        derived: &[(
            Capabilities::INDEX,
            Capabilities::INDEX.union(Capabilities::LENGTH),
        )],
        required: Capabilities::empty(),
    };

    #[test]
    fn mirrors_common_subset() {
        let a = Capabilities::BIDIRECTIONAL | Capabilities::COPY | Capabilities::LENGTH;
        let b = Capabilities::BIDIRECTIONAL | Capabilities::LENGTH;
        let caps = SPEC.apply([a, b]);
        assert!(caps.contains(Capabilities::BIDIRECTIONAL));
        assert!(caps.contains(Capabilities::RESET));
        assert!(!caps.contains(Capabilities::COPY));
    }

    #[test]
    fn derived_needs_every_bit() {
        let with_len = Capabilities::INDEX | Capabilities::LENGTH;
        assert!(SPEC.apply([with_len]).contains(Capabilities::INDEX));
        assert!(!SPEC.apply([Capabilities::INDEX]).contains(Capabilities::INDEX));
    }

    #[test]
    fn zero_sources_grant_everything_declared() {
        let caps = SPEC.apply([]);
        assert!(caps.contains(Capabilities::RESET));
        assert!(caps.contains(Capabilities::BIDIRECTIONAL | Capabilities::COPY));
        assert!(caps.contains(Capabilities::INDEX));
    }

    #[test]
    fn required_failure_names_missing_bits() {
        const STRICT: CapSpec = CapSpec {
            always: Capabilities::empty(),
            with_source: Capabilities::empty(),
            derived: &[],
            required: Capabilities::BIDIRECTIONAL.union(Capabilities::LENGTH),
        };
        let err = STRICT
            .resolve("strict", [Capabilities::LENGTH])
            .expect_err("missing bidirectional");
        assert_eq!(
            err,
            Error::unsupported("strict", Capabilities::BIDIRECTIONAL)
        );
    }

    #[test]
    fn resolution_is_a_function_of_source_caps_only() {
        let caps = Capabilities::BIDIRECTIONAL | Capabilities::LENGTH | Capabilities::INDEX;
        assert_eq!(SPEC.apply([caps]), SPEC.apply([caps]));
    }

    #[test]
    fn display_joins_names() {
        let caps = Capabilities::BIDIRECTIONAL | Capabilities::SLICE;
        assert_eq!(format!("{caps}"), "BIDIRECTIONAL | SLICE");
        assert_eq!(format!("{}", Capabilities::empty()), "(none)");
    }
}
