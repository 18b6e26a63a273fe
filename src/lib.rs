//! Lazy, capability-tagged sequences over vectors, text, key–value
//! entries, and plain iterators.
//!
//! A [`Sequence`] is a cursor over an ordered series of elements.
//! Three operations are always available: `is_exhausted`, `front`,
//! and `advance_front`. Everything else (back traversal, length,
//! indexing, slicing, keyed lookup, duplication, reset) is an
//! optional capability, declared in a [`Capabilities`] descriptor
//! computed once when the sequence is constructed. Combinators
//! propagate capabilities from their sources declaratively (see
//! [`CapSpec`]), so a transform over an indexable source is itself
//! indexable, while the same transform over a one-shot iterator is
//! not.
//!
//! Alongside capabilities, every sequence tracks [`Boundedness`]:
//! provably finite, provably infinite, or unknown. Operations that
//! must finish, such as folding to a final value, buffering, or
//! reversing a forward-only source, demand provable finiteness and
//! fail with [`Error::NotBounded`] instead of looping forever.
//!
//! Transformations are deferred: nothing is computed until the
//! cursor moves, and nothing is buffered except at the single
//! sanctioned point, [`eager()`].
//!
//! # Example
//! ```
//! use lazy_seq::{range, SequenceExt};
//!
//! let squares = range(10)
//!     .filter(|n| n % 2 == 0)
//!     .map(|n| n * n);
//!
//! assert_eq!(squares.into_vec(), Ok(vec![0, 4, 16, 36, 64]));
//! ```

mod adapters;
mod bounds;
mod caps;
mod eager;
mod error;
mod registry;
mod sequences;
mod slicing;

use sealed::sealed;

pub use crate::adapters::{
    chunk, concat, pad_left, pad_right, reverse, zip_map, Assume, Concat, Enumerate, Filter,
    ForwardChunks, IndexedChunks, Map, Reductions, Reversed, SeededReductions, Window, ZipMap,
};
pub use crate::bounds::{Boundedness, Extent};
pub use crate::caps::{CapSpec, Capabilities};
pub use crate::eager::{eager, Eager, MATERIALIZED};
pub use crate::error::{Error, RegistryError};
pub use crate::registry::{Converter, Input, Registry};
pub use crate::sequences::{
    empty, from_fn, into_string, range, repeat, replicate, text, EntriesSeq, FromFn,
    IntoIteratorExt, ItemsSeq, IterSeq, Range, Repeat, VecExt,
};
pub use crate::slicing::{slice, SliceBound};

/// A lookup key for sequences with keyed access: positional for
/// list-shaped sources, named for entry-shaped ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    Index(usize),
    Name(&'a str),
}

/// A boxed, dynamically-dispatched sequence. Combinators that juggle
/// several sources of differing concrete types hold these.
pub type BoxSeq<T> = Box<dyn Sequence<Item = T>>;

impl<T> core::fmt::Debug for dyn Sequence<Item = T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct(self.type_name())
            .field("caps", &self.caps())
            .field("boundedness", &self.boundedness())
            .finish()
    }
}

/// A cursor over an ordered series of elements.
///
/// The three required operations drive front-to-back traversal.
/// Every optional operation has an always-present method whose
/// default body reports [`Error::UnsupportedCapability`];
/// implementations override exactly the methods their constructor
/// enabled in the [`Capabilities`] descriptor, and callers who want
/// to avoid the error check [`caps`](Sequence::caps) first. The
/// descriptor is fixed at construction; it is never recomputed on
/// the traversal path.
///
/// Peeking takes `&mut self` for the same reason
/// `std::iter::Peekable::peek` does: lazily-initialized cursors may
/// need to settle before they can answer.
pub trait Sequence {
    type Item;

    /// A short stable name for error context, not for dispatch.
    fn type_name(&self) -> &'static str;

    /// The optional operations this instance supports.
    fn caps(&self) -> Capabilities;

    /// Whether front-to-back traversal provably terminates.
    fn boundedness(&self) -> Boundedness;

    /// True when no front elements remain.
    fn is_exhausted(&mut self) -> bool;

    /// The element at the front cursor, without consuming it.
    fn front(&mut self) -> Option<Self::Item>;

    /// Consumes one element from the front.
    fn advance_front(&mut self);

    /// The element at the back cursor. [`Capabilities::BIDIRECTIONAL`].
    fn back(&mut self) -> Result<Option<Self::Item>, Error> {
        Err(Error::unsupported(
            self.type_name(),
            Capabilities::BIDIRECTIONAL,
        ))
    }

    /// Consumes one element from the back. [`Capabilities::BIDIRECTIONAL`].
    fn advance_back(&mut self) -> Result<(), Error> {
        Err(Error::unsupported(
            self.type_name(),
            Capabilities::BIDIRECTIONAL,
        ))
    }

    /// Total elements in the view, consumed or not.
    /// [`Capabilities::LENGTH`].
    fn len(&self) -> Result<usize, Error> {
        Err(Error::unsupported(self.type_name(), Capabilities::LENGTH))
    }

    /// Elements left between the cursors. [`Capabilities::LENGTH`].
    fn remaining(&self) -> Result<usize, Error> {
        Err(Error::unsupported(self.type_name(), Capabilities::LENGTH))
    }

    /// The element at `index`, independent of cursor state. Out of
    /// range is `Ok(None)`, not an error, to keep hot indexing
    /// branch-free. [`Capabilities::INDEX`].
    fn at(&self, index: usize) -> Result<Option<Self::Item>, Error> {
        let _ = index;
        Err(Error::unsupported(self.type_name(), Capabilities::INDEX))
    }

    /// A sub-sequence view of positions `[lo, hi)` of the full view,
    /// leaving this sequence untouched. Bounds are clamped to the
    /// view. [`Capabilities::SLICE`].
    fn slice(&self, lo: usize, hi: usize) -> Result<BoxSeq<Self::Item>, Error> {
        let _ = (lo, hi);
        Err(Error::unsupported(self.type_name(), Capabilities::SLICE))
    }

    /// Whether `key` addresses an element. [`Capabilities::KEYED`].
    fn has_key(&self, key: Key<'_>) -> Result<bool, Error> {
        let _ = key;
        Err(Error::unsupported(self.type_name(), Capabilities::KEYED))
    }

    /// The element addressed by `key`, or `Ok(None)` when absent.
    /// [`Capabilities::KEYED`].
    fn get_key(&self, key: Key<'_>) -> Result<Option<Self::Item>, Error> {
        let _ = key;
        Err(Error::unsupported(self.type_name(), Capabilities::KEYED))
    }

    /// An independent cursor over the same logical elements. Backing
    /// storage may be shared; cursor state never is.
    /// [`Capabilities::COPY`].
    fn duplicate(&self) -> Result<BoxSeq<Self::Item>, Error> {
        Err(Error::unsupported(self.type_name(), Capabilities::COPY))
    }

    /// Returns both cursors to their initial positions.
    /// [`Capabilities::RESET`].
    fn reset(&mut self) -> Result<(), Error> {
        Err(Error::unsupported(self.type_name(), Capabilities::RESET))
    }

    /// Checks `needed` against the stored descriptor, reporting the
    /// missing bits under this sequence's name.
    fn require(&self, needed: Capabilities) -> Result<(), Error> {
        let missing = needed.difference(self.caps());
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::unsupported(self.type_name(), missing))
        }
    }
}

impl<S: Sequence + ?Sized> Sequence for Box<S> {
    type Item = S::Item;

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn caps(&self) -> Capabilities {
        (**self).caps()
    }

    fn boundedness(&self) -> Boundedness {
        (**self).boundedness()
    }

    fn is_exhausted(&mut self) -> bool {
        (**self).is_exhausted()
    }

    fn front(&mut self) -> Option<Self::Item> {
        (**self).front()
    }

    fn advance_front(&mut self) {
        (**self).advance_front();
    }

    fn back(&mut self) -> Result<Option<Self::Item>, Error> {
        (**self).back()
    }

    fn advance_back(&mut self) -> Result<(), Error> {
        (**self).advance_back()
    }

    fn len(&self) -> Result<usize, Error> {
        (**self).len()
    }

    fn remaining(&self) -> Result<usize, Error> {
        (**self).remaining()
    }

    fn at(&self, index: usize) -> Result<Option<Self::Item>, Error> {
        (**self).at(index)
    }

    fn slice(&self, lo: usize, hi: usize) -> Result<BoxSeq<Self::Item>, Error> {
        (**self).slice(lo, hi)
    }

    fn has_key(&self, key: Key<'_>) -> Result<bool, Error> {
        (**self).has_key(key)
    }

    fn get_key(&self, key: Key<'_>) -> Result<Option<Self::Item>, Error> {
        (**self).get_key(key)
    }

    fn duplicate(&self) -> Result<BoxSeq<Self::Item>, Error> {
        (**self).duplicate()
    }

    fn reset(&mut self) -> Result<(), Error> {
        (**self).reset()
    }
}

/// A draining iterator over a sequence's remaining front elements.
pub struct Drain<S> {
    seq: S,
}

impl<S: Sequence> Iterator for Drain<S> {
    type Item = S::Item;

    fn next(&mut self) -> Option<S::Item> {
        let v = self.seq.front();
        self.seq.advance_front();
        v
    }
}

/// Combinator constructors and consuming helpers for every
/// [`Sequence`]. Sealed: implement [`Sequence`] to participate; the
/// blanket implementation does the rest.
#[sealed]
pub trait SequenceExt: Sequence {
    /// Transforms every element with `f`. Mirrors all source
    /// capabilities; positional reads re-invoke `f`.
    fn map<U, F>(self, f: F) -> Map<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Item) -> U + Clone,
    {
        Map::new(self, f)
    }

    /// Keeps elements matching `pred`, skipping lazily on demand.
    ///
    /// Over an unbounded source whose predicate stops matching, the
    /// next peek never returns. That risk stays with the caller.
    fn filter<P>(self, pred: P) -> Filter<Self, P>
    where
        Self: Sized,
        P: Fn(&Self::Item) -> bool + Clone,
    {
        Filter::new(self, pred)
    }

    /// Pairs every element with its position.
    fn enumerate(self) -> Enumerate<Self>
    where
        Self: Sized,
    {
        Enumerate::new(self)
    }

    /// Slices with end-relative and open bounds; see
    /// [`slice()`](crate::slice) for the case table.
    fn sliced(
        self,
        lo: impl Into<SliceBound>,
        hi: impl Into<SliceBound>,
    ) -> Result<BoxSeq<Self::Item>, Error>
    where
        Self: Sized + 'static,
        Self::Item: Clone + 'static,
    {
        crate::slicing::slice(self, lo.into(), hi.into())
    }

    /// Groups elements into runs of `size`; see [`chunk`].
    fn chunks(self, size: usize) -> BoxSeq<Vec<Self::Item>>
    where
        Self: Sized + 'static,
        Self::Item: Clone + 'static,
    {
        chunk(self, size)
    }

    /// Pads the front out to `target` elements; see [`pad_left`].
    fn padded_left(self, target: Extent, elem: Self::Item) -> Result<BoxSeq<Self::Item>, Error>
    where
        Self: Sized + 'static,
        Self::Item: Clone + 'static,
    {
        pad_left(self, target, elem)
    }

    /// Pads the back out to `target` elements; see [`pad_right`].
    fn padded_right(self, target: Extent, elem: Self::Item) -> Result<BoxSeq<Self::Item>, Error>
    where
        Self: Sized + 'static,
        Self::Item: Clone + 'static,
    {
        pad_right(self, target, elem)
    }

    /// Successive partial combinations of the elements.
    fn reductions<F>(self, combine: F) -> Reductions<Self, F, Self::Item>
    where
        Self: Sized,
        F: Fn(Self::Item, Self::Item) -> Self::Item + Clone,
    {
        Reductions::new(self, combine)
    }

    /// Seeded partial combinations; the seed is yielded first.
    fn reductions_from<A, F>(self, seed: A, combine: F) -> SeededReductions<Self, F, A>
    where
        Self: Sized,
        A: Clone,
        F: Fn(A, Self::Item) -> A + Clone,
    {
        SeededReductions::new(self, seed, combine)
    }

    /// Reverses the sequence; see [`reverse`] for the fallback rules.
    fn reversed(self) -> Result<BoxSeq<Self::Item>, Error>
    where
        Self: Sized + 'static,
        Self::Item: Clone + 'static,
    {
        reverse(self)
    }

    /// Buffers on demand; see [`eager()`](crate::eager()).
    fn eager(self) -> Result<BoxSeq<Self::Item>, Error>
    where
        Self: Sized + 'static,
        Self::Item: Clone + 'static,
    {
        crate::eager::eager(self)
    }

    /// Asserts boundedness the library cannot prove. Trusted, never
    /// verified.
    fn assume(self, bounds: Boundedness) -> Assume<Self>
    where
        Self: Sized,
    {
        Assume::new(self, bounds)
    }

    /// Erases the concrete type.
    fn boxed(self) -> BoxSeq<Self::Item>
    where
        Self: Sized + 'static,
        Self::Item: 'static,
    {
        Box::new(self)
    }

    /// Bridges the remaining front elements into an [`Iterator`].
    fn drain(self) -> Drain<Self>
    where
        Self: Sized,
    {
        Drain { seq: self }
    }

    /// Drains to the final element. Demands provable boundedness:
    /// an infinite sequence has no last element.
    fn last_element(&mut self) -> Result<Option<Self::Item>, Error> {
        if !self.boundedness().is_bounded() {
            return Err(Error::not_bounded(self.type_name()));
        }
        let mut last = None;
        while let Some(v) = self.front() {
            last = Some(v);
            self.advance_front();
        }
        Ok(last)
    }

    /// Drains the remaining elements into a vector. Refuses provably
    /// unbounded sequences; unknown boundedness is the caller's risk.
    fn into_vec(mut self) -> Result<Vec<Self::Item>, Error>
    where
        Self: Sized,
    {
        if self.boundedness().is_unbounded() {
            return Err(Error::not_bounded(self.type_name()));
        }
        Ok(self.drain().collect())
    }
}

#[sealed]
impl<S: Sequence> SequenceExt for S {}
