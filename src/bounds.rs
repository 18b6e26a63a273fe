use core::cmp::Ordering;

/// Whether draining a sequence front-to-back provably terminates.
///
/// `Bounded` guarantees exhaustion after finitely many
/// `advance_front` calls; `Unbounded` guarantees it never happens;
/// `Unknown` asserts neither. The three-state enum encodes the
/// "never both flags" invariant by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundedness {
    Bounded,
    Unbounded,
    Unknown,
}

impl Boundedness {
    #[inline]
    pub fn is_bounded(self) -> bool {
        matches!(self, Boundedness::Bounded)
    }

    #[inline]
    pub fn is_unbounded(self) -> bool {
        matches!(self, Boundedness::Unbounded)
    }

    /// Concatenation rule: bounded iff every part is bounded,
    /// unbounded as soon as any part is.
    ///
    /// A bounded part that follows an unbounded one is not
    /// special-cased; the unbounded part decides on its own, since
    /// traversal never reaches whatever comes after it. An empty part
    /// list is bounded.
    pub fn concat_of(parts: impl IntoIterator<Item = Boundedness>) -> Boundedness {
        let mut all_bounded = true;
        for part in parts {
            match part {
                Boundedness::Unbounded => return Boundedness::Unbounded,
                Boundedness::Unknown => all_bounded = false,
                Boundedness::Bounded => {}
            }
        }
        if all_bounded {
            Boundedness::Bounded
        } else {
            Boundedness::Unknown
        }
    }

    /// Shortest-source rule for multi-source combinators that stop at
    /// the first exhausted source: bounded as soon as any source is,
    /// unbounded only when every source is. An empty source list is
    /// bounded (the combinator is born exhausted).
    pub fn zip_of(parts: impl IntoIterator<Item = Boundedness>) -> Boundedness {
        let mut saw_any = false;
        let mut all_unbounded = true;
        for part in parts {
            saw_any = true;
            match part {
                Boundedness::Bounded => return Boundedness::Bounded,
                Boundedness::Unknown => all_unbounded = false,
                Boundedness::Unbounded => {}
            }
        }
        if !saw_any {
            Boundedness::Bounded
        } else if all_unbounded {
            Boundedness::Unbounded
        } else {
            Boundedness::Unknown
        }
    }
}

/// A finite-or-infinite element count: repetition counts and padding
/// targets.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Extent {
    Finite(usize),
    Infinite,
}

impl Extent {
    #[inline]
    pub fn is_finite(self) -> bool {
        matches!(self, Extent::Finite(_))
    }
}

impl PartialOrd for Extent {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(Ord::cmp(self, other))
    }
}

impl Ord for Extent {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Extent::Finite(n), Extent::Finite(m)) => n.cmp(m),
            (Extent::Finite(_), Extent::Infinite) => Ordering::Less,
            (Extent::Infinite, Extent::Finite(_)) => Ordering::Greater,
            (Extent::Infinite, Extent::Infinite) => Ordering::Equal,
        }
    }
}
