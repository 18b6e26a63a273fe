use crate::bounds::Boundedness;
use crate::caps::Capabilities;
use crate::error::Error;
use crate::sequences::ItemsSeq;
use crate::{BoxSeq, Key, Sequence};
use std::cell::{RefCell, RefMut};

/// The capability set a source must already have for [`eager`] to be
/// a no-op.
pub const MATERIALIZED: Capabilities = Capabilities::LENGTH
    .union(Capabilities::BIDIRECTIONAL)
    .union(Capabilities::INDEX)
    .union(Capabilities::SLICE)
    .union(Capabilities::COPY)
    .union(Capabilities::RESET);

/// The sanctioned laziness break.
///
/// Sources that already expose the [`MATERIALIZED`] set pass through
/// unchanged. Anything else must be provably bounded (else
/// [`Error::NotBounded`]) and is wrapped so that plain front
/// traversal stays lazy, while the first capability-gated call drains
/// the remainder into an items buffer and rebases every later
/// operation onto it.
pub fn eager<S>(source: S) -> Result<BoxSeq<S::Item>, Error>
where
    S: Sequence + 'static,
    S::Item: Clone + 'static,
{
    if source.caps().contains(MATERIALIZED) {
        return Ok(Box::new(source));
    }
    if !source.boundedness().is_bounded() {
        return Err(Error::not_bounded(source.type_name()));
    }
    Ok(Box::new(Eager {
        state: RefCell::new(EagerState::Raw {
            source: Box::new(source),
            // Elements consumed before materialization, kept so the
            // buffer still covers the full view.
            prefix: Vec::new(),
        }),
    }))
}

enum EagerState<T> {
    Raw { source: BoxSeq<T>, prefix: Vec<T> },
    Buffered(ItemsSeq<T>),
}

/// A bounded sequence that synthesizes every capability by buffering
/// its source on first demand.
pub struct Eager<T> {
    state: RefCell<EagerState<T>>,
}

impl<T: Clone + 'static> Eager<T> {
    fn materialized(&self) -> RefMut<'_, ItemsSeq<T>> {
        {
            let mut state = self.state.borrow_mut();
            if let EagerState::Raw { source, prefix } = &mut *state {
                let consumed = prefix.len();
                let mut items = std::mem::take(prefix);
                while let Some(v) = source.front() {
                    items.push(v);
                    source.advance_front();
                }
                let mut buffer = ItemsSeq::new(items);
                for _ in 0..consumed {
                    buffer.advance_front();
                }
                *state = EagerState::Buffered(buffer);
            }
        }
        RefMut::map(self.state.borrow_mut(), |state| match state {
            EagerState::Buffered(buffer) => buffer,
            EagerState::Raw { .. } => unreachable!("materialization just ran"),
        })
    }
}

impl<T: Clone + 'static> Sequence for Eager<T> {
    type Item = T;

    fn type_name(&self) -> &'static str {
        "eager"
    }

    fn caps(&self) -> Capabilities {
        Capabilities::all()
    }

    fn boundedness(&self) -> Boundedness {
        Boundedness::Bounded
    }

    fn is_exhausted(&mut self) -> bool {
        match self.state.get_mut() {
            EagerState::Raw { source, .. } => source.is_exhausted(),
            EagerState::Buffered(buffer) => buffer.is_exhausted(),
        }
    }

    fn front(&mut self) -> Option<T> {
        match self.state.get_mut() {
            EagerState::Raw { source, .. } => source.front(),
            EagerState::Buffered(buffer) => buffer.front(),
        }
    }

    fn advance_front(&mut self) {
        match self.state.get_mut() {
            EagerState::Raw { source, prefix } => {
                if let Some(v) = source.front() {
                    prefix.push(v);
                }
                source.advance_front();
            }
            EagerState::Buffered(buffer) => buffer.advance_front(),
        }
    }

    fn back(&mut self) -> Result<Option<T>, Error> {
        self.materialized().back()
    }

    fn advance_back(&mut self) -> Result<(), Error> {
        self.materialized().advance_back()
    }

    fn len(&self) -> Result<usize, Error> {
        self.materialized().len()
    }

    fn remaining(&self) -> Result<usize, Error> {
        self.materialized().remaining()
    }

    fn at(&self, index: usize) -> Result<Option<T>, Error> {
        self.materialized().at(index)
    }

    fn slice(&self, lo: usize, hi: usize) -> Result<BoxSeq<T>, Error> {
        self.materialized().slice(lo, hi)
    }

    fn has_key(&self, key: Key<'_>) -> Result<bool, Error> {
        self.materialized().has_key(key)
    }

    fn get_key(&self, key: Key<'_>) -> Result<Option<T>, Error> {
        self.materialized().get_key(key)
    }

    fn duplicate(&self) -> Result<BoxSeq<T>, Error> {
        self.materialized().duplicate()
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.materialized().reset()
    }
}
