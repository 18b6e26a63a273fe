use crate::bounds::{Boundedness, Extent};
use crate::caps::{CapSpec, Capabilities};
use crate::eager::eager;
use crate::error::Error;
use crate::sequences::{repeat, replicate};
use crate::{BoxSeq, Key, Sequence, SequenceExt};
use core::marker::PhantomData;

const MAP_SPEC: CapSpec = CapSpec {
    always: Capabilities::empty(),
    with_source: Capabilities::all(),
    derived: &[],
    required: Capabilities::empty(),
};

/// A one-to-one transform view over a single source.
///
/// Mirrors every capability of the source; positional and keyed reads
/// re-invoke the transform, which is why it must be `Fn` and `Clone`
/// rather than `FnMut`.
pub struct Map<S, F> {
    source: S,
    f: F,
    caps: Capabilities,
}

impl<S: Sequence, F> Map<S, F> {
    pub fn new(source: S, f: F) -> Self {
        let caps = MAP_SPEC.apply([source.caps()]);
        Map { source, f, caps }
    }
}

impl<U, S, F> Sequence for Map<S, F>
where
    S: Sequence,
    S::Item: 'static,
    F: Fn(S::Item) -> U + Clone + 'static,
    U: 'static,
{
    type Item = U;

    fn type_name(&self) -> &'static str {
        "map"
    }

    fn caps(&self) -> Capabilities {
        self.caps
    }

    fn boundedness(&self) -> Boundedness {
        self.source.boundedness()
    }

    fn is_exhausted(&mut self) -> bool {
        self.source.is_exhausted()
    }

    fn front(&mut self) -> Option<U> {
        self.source.front().map(&self.f)
    }

    fn advance_front(&mut self) {
        self.source.advance_front();
    }

    fn back(&mut self) -> Result<Option<U>, Error> {
        self.require(Capabilities::BIDIRECTIONAL)?;
        Ok(self.source.back()?.map(&self.f))
    }

    fn advance_back(&mut self) -> Result<(), Error> {
        self.require(Capabilities::BIDIRECTIONAL)?;
        self.source.advance_back()
    }

    fn len(&self) -> Result<usize, Error> {
        self.require(Capabilities::LENGTH)?;
        self.source.len()
    }

    fn remaining(&self) -> Result<usize, Error> {
        self.require(Capabilities::LENGTH)?;
        self.source.remaining()
    }

    fn at(&self, index: usize) -> Result<Option<U>, Error> {
        self.require(Capabilities::INDEX)?;
        Ok(self.source.at(index)?.map(&self.f))
    }

    fn slice(&self, lo: usize, hi: usize) -> Result<BoxSeq<U>, Error> {
        self.require(Capabilities::SLICE)?;
        Ok(Box::new(Map::new(self.source.slice(lo, hi)?, self.f.clone())))
    }

    fn has_key(&self, key: Key<'_>) -> Result<bool, Error> {
        self.require(Capabilities::KEYED)?;
        self.source.has_key(key)
    }

    fn get_key(&self, key: Key<'_>) -> Result<Option<U>, Error> {
        self.require(Capabilities::KEYED)?;
        Ok(self.source.get_key(key)?.map(&self.f))
    }

    fn duplicate(&self) -> Result<BoxSeq<U>, Error> {
        self.require(Capabilities::COPY)?;
        Ok(Box::new(Map::new(self.source.duplicate()?, self.f.clone())))
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.require(Capabilities::RESET)?;
        self.source.reset()
    }
}

const ZIP_MAP_SPEC: CapSpec = CapSpec {
    always: Capabilities::empty(),
    with_source: Capabilities::LENGTH
        .union(Capabilities::INDEX)
        .union(Capabilities::SLICE)
        .union(Capabilities::COPY)
        .union(Capabilities::RESET),
    derived: &[],
    required: Capabilities::empty(),
};

/// An N-way transform: one element from every source per step.
///
/// Exhausted as soon as any source is, so the result is as long as
/// the shortest source. A capability is exposed only when every
/// source exposes it. Zero sources give the degenerate empty
/// sequence.
pub struct ZipMap<T, U, F> {
    sources: Vec<BoxSeq<T>>,
    f: F,
    caps: Capabilities,
    bounds: Boundedness,
    _out: PhantomData<fn() -> U>,
}

/// Builds a [`ZipMap`] over `sources`.
pub fn zip_map<T, U, F>(sources: Vec<BoxSeq<T>>, f: F) -> ZipMap<T, U, F>
where
    F: Fn(Vec<T>) -> U + Clone,
{
    let caps = ZIP_MAP_SPEC.apply(sources.iter().map(|s| s.caps()));
    let bounds = Boundedness::zip_of(sources.iter().map(|s| s.boundedness()));
    ZipMap {
        sources,
        f,
        caps,
        bounds,
        _out: PhantomData,
    }
}

impl<T, U, F> Sequence for ZipMap<T, U, F>
where
    T: Clone + 'static,
    U: 'static,
    F: Fn(Vec<T>) -> U + Clone + 'static,
{
    type Item = U;

    fn type_name(&self) -> &'static str {
        "zip_map"
    }

    fn caps(&self) -> Capabilities {
        self.caps
    }

    fn boundedness(&self) -> Boundedness {
        self.bounds
    }

    fn is_exhausted(&mut self) -> bool {
        if self.sources.is_empty() {
            return true;
        }
        self.sources.iter_mut().any(|s| s.is_exhausted())
    }

    fn front(&mut self) -> Option<U> {
        if self.sources.is_empty() {
            return None;
        }
        let mut row = Vec::with_capacity(self.sources.len());
        for source in &mut self.sources {
            row.push(source.front()?);
        }
        Some((self.f)(row))
    }

    fn advance_front(&mut self) {
        if self.is_exhausted() {
            return;
        }
        for source in &mut self.sources {
            source.advance_front();
        }
    }

    fn len(&self) -> Result<usize, Error> {
        self.require(Capabilities::LENGTH)?;
        let mut shortest: Option<usize> = None;
        for source in &self.sources {
            let n = source.len()?;
            shortest = Some(shortest.map_or(n, |s| s.min(n)));
        }
        Ok(shortest.unwrap_or(0))
    }

    fn remaining(&self) -> Result<usize, Error> {
        self.require(Capabilities::LENGTH)?;
        let mut shortest: Option<usize> = None;
        for source in &self.sources {
            let n = source.remaining()?;
            shortest = Some(shortest.map_or(n, |s| s.min(n)));
        }
        Ok(shortest.unwrap_or(0))
    }

    fn at(&self, index: usize) -> Result<Option<U>, Error> {
        self.require(Capabilities::INDEX)?;
        if self.sources.is_empty() {
            return Ok(None);
        }
        let mut row = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            match source.at(index)? {
                Some(v) => row.push(v),
                None => return Ok(None),
            }
        }
        Ok(Some((self.f)(row)))
    }

    fn slice(&self, lo: usize, hi: usize) -> Result<BoxSeq<U>, Error> {
        self.require(Capabilities::SLICE)?;
        let mut parts = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            parts.push(source.slice(lo, hi)?);
        }
        Ok(Box::new(zip_map(parts, self.f.clone())))
    }

    fn duplicate(&self) -> Result<BoxSeq<U>, Error> {
        self.require(Capabilities::COPY)?;
        let mut parts = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            parts.push(source.duplicate()?);
        }
        Ok(Box::new(zip_map(parts, self.f.clone())))
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.require(Capabilities::RESET)?;
        for source in &mut self.sources {
            source.reset()?;
        }
        Ok(())
    }
}

const ENUMERATE_SPEC: CapSpec = CapSpec {
    always: Capabilities::empty(),
    with_source: Capabilities::LENGTH
        .union(Capabilities::COPY)
        .union(Capabilities::RESET),
    derived: &[
        (Capabilities::INDEX, Capabilities::INDEX),
        (Capabilities::SLICE, Capabilities::SLICE),
        (
            Capabilities::BIDIRECTIONAL,
            Capabilities::BIDIRECTIONAL.union(Capabilities::LENGTH),
        ),
    ],
    required: Capabilities::empty(),
};

/// Pairs every element with its position. Slices carry their offset
/// so positions stay absolute.
pub struct Enumerate<S> {
    source: S,
    offset: usize,
    front_index: usize,
    back_taken: usize,
    caps: Capabilities,
}

impl<S: Sequence> Enumerate<S> {
    pub fn new(source: S) -> Self {
        Self::with_offset(source, 0)
    }

    fn with_offset(source: S, offset: usize) -> Self {
        let caps = ENUMERATE_SPEC.apply([source.caps()]);
        Enumerate {
            source,
            offset,
            front_index: offset,
            back_taken: 0,
            caps,
        }
    }
}

impl<S> Sequence for Enumerate<S>
where
    S: Sequence,
    S::Item: 'static,
{
    type Item = (usize, S::Item);

    fn type_name(&self) -> &'static str {
        "enumerate"
    }

    fn caps(&self) -> Capabilities {
        self.caps
    }

    fn boundedness(&self) -> Boundedness {
        self.source.boundedness()
    }

    fn is_exhausted(&mut self) -> bool {
        self.source.is_exhausted()
    }

    fn front(&mut self) -> Option<(usize, S::Item)> {
        let index = self.front_index;
        self.source.front().map(|v| (index, v))
    }

    fn advance_front(&mut self) {
        if !self.source.is_exhausted() {
            self.source.advance_front();
            self.front_index += 1;
        }
    }

    fn back(&mut self) -> Result<Option<(usize, S::Item)>, Error> {
        self.require(Capabilities::BIDIRECTIONAL)?;
        if self.source.is_exhausted() {
            return Ok(None);
        }
        let index = self.offset + self.source.len()? - 1 - self.back_taken;
        Ok(self.source.back()?.map(|v| (index, v)))
    }

    fn advance_back(&mut self) -> Result<(), Error> {
        self.require(Capabilities::BIDIRECTIONAL)?;
        if !self.source.is_exhausted() {
            self.source.advance_back()?;
            self.back_taken += 1;
        }
        Ok(())
    }

    fn len(&self) -> Result<usize, Error> {
        self.require(Capabilities::LENGTH)?;
        self.source.len()
    }

    fn remaining(&self) -> Result<usize, Error> {
        self.require(Capabilities::LENGTH)?;
        self.source.remaining()
    }

    fn at(&self, index: usize) -> Result<Option<(usize, S::Item)>, Error> {
        self.require(Capabilities::INDEX)?;
        Ok(self.source.at(index)?.map(|v| (self.offset + index, v)))
    }

    fn slice(&self, lo: usize, hi: usize) -> Result<BoxSeq<(usize, S::Item)>, Error> {
        self.require(Capabilities::SLICE)?;
        Ok(Box::new(Enumerate::with_offset(
            self.source.slice(lo, hi)?,
            self.offset + lo,
        )))
    }

    fn duplicate(&self) -> Result<BoxSeq<(usize, S::Item)>, Error> {
        self.require(Capabilities::COPY)?;
        let mut copy = Enumerate::with_offset(self.source.duplicate()?, self.offset);
        copy.front_index = self.front_index;
        copy.back_taken = self.back_taken;
        Ok(Box::new(copy))
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.require(Capabilities::RESET)?;
        self.source.reset()?;
        self.front_index = self.offset;
        self.back_taken = 0;
        Ok(())
    }
}

const FILTER_SPEC: CapSpec = CapSpec {
    always: Capabilities::empty(),
    with_source: Capabilities::BIDIRECTIONAL
        .union(Capabilities::COPY)
        .union(Capabilities::RESET),
    derived: &[],
    required: Capabilities::empty(),
};

/// Lazily skips elements the predicate rejects.
///
/// The cursor settles onto the next match when peeked, not when
/// constructed. Positions are unknowable without a full scan, so no
/// length, index, or slice capability survives filtering.
///
/// Filtering an unbounded source with a predicate that stops matching
/// makes the next peek run forever. That is the caller's contract,
/// not a guarded condition.
pub struct Filter<S, P> {
    source: S,
    pred: P,
    caps: Capabilities,
}

impl<S: Sequence, P> Filter<S, P> {
    pub fn new(source: S, pred: P) -> Self {
        let caps = FILTER_SPEC.apply([source.caps()]);
        Filter { source, pred, caps }
    }
}

impl<S, P> Filter<S, P>
where
    S: Sequence,
    P: Fn(&S::Item) -> bool,
{
    fn settle_front(&mut self) {
        while let Some(v) = self.source.front() {
            if (self.pred)(&v) {
                break;
            }
            self.source.advance_front();
        }
    }

    fn settle_back(&mut self) -> Result<(), Error> {
        while let Some(v) = self.source.back()? {
            if (self.pred)(&v) {
                break;
            }
            self.source.advance_back()?;
        }
        Ok(())
    }
}

impl<S, P> Sequence for Filter<S, P>
where
    S: Sequence,
    S::Item: 'static,
    P: Fn(&S::Item) -> bool + Clone + 'static,
{
    type Item = S::Item;

    fn type_name(&self) -> &'static str {
        "filter"
    }

    fn caps(&self) -> Capabilities {
        self.caps
    }

    fn boundedness(&self) -> Boundedness {
        self.source.boundedness()
    }

    fn is_exhausted(&mut self) -> bool {
        self.settle_front();
        self.source.is_exhausted()
    }

    fn front(&mut self) -> Option<S::Item> {
        self.settle_front();
        self.source.front()
    }

    fn advance_front(&mut self) {
        self.settle_front();
        self.source.advance_front();
    }

    fn back(&mut self) -> Result<Option<S::Item>, Error> {
        self.require(Capabilities::BIDIRECTIONAL)?;
        self.settle_back()?;
        self.source.back()
    }

    fn advance_back(&mut self) -> Result<(), Error> {
        self.require(Capabilities::BIDIRECTIONAL)?;
        self.settle_back()?;
        self.source.advance_back()
    }

    fn duplicate(&self) -> Result<BoxSeq<S::Item>, Error> {
        self.require(Capabilities::COPY)?;
        Ok(Box::new(Filter::new(
            self.source.duplicate()?,
            self.pred.clone(),
        )))
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.require(Capabilities::RESET)?;
        self.source.reset()
    }
}

const WINDOW_SPEC: CapSpec = CapSpec {
    always: Capabilities::empty(),
    with_source: Capabilities::COPY.union(Capabilities::RESET),
    derived: &[],
    required: Capabilities::empty(),
};

/// Forward-only skip/take window: the tracking fallback for slicing
/// sources that cannot produce views.
pub struct Window<S> {
    source: S,
    skip: usize,
    take: Extent,
    skipped: bool,
    taken: usize,
    caps: Capabilities,
}

impl<S: Sequence> Window<S> {
    pub fn new(source: S, skip: usize, take: Extent) -> Self {
        let caps = WINDOW_SPEC.apply([source.caps()]);
        Window {
            source,
            skip,
            take,
            skipped: false,
            taken: 0,
            caps,
        }
    }

    fn ensure_skipped(&mut self) {
        if self.skipped {
            return;
        }
        for _ in 0..self.skip {
            if self.source.is_exhausted() {
                break;
            }
            self.source.advance_front();
        }
        self.skipped = true;
    }
}

impl<S> Sequence for Window<S>
where
    S: Sequence,
    S::Item: 'static,
{
    type Item = S::Item;

    fn type_name(&self) -> &'static str {
        "window"
    }

    fn caps(&self) -> Capabilities {
        self.caps
    }

    fn boundedness(&self) -> Boundedness {
        match self.take {
            Extent::Finite(_) => Boundedness::Bounded,
            Extent::Infinite => self.source.boundedness(),
        }
    }

    fn is_exhausted(&mut self) -> bool {
        self.ensure_skipped();
        match self.take {
            Extent::Finite(n) if self.taken >= n => true,
            _ => self.source.is_exhausted(),
        }
    }

    fn front(&mut self) -> Option<S::Item> {
        if self.is_exhausted() {
            return None;
        }
        self.source.front()
    }

    fn advance_front(&mut self) {
        if self.is_exhausted() {
            return;
        }
        self.source.advance_front();
        self.taken += 1;
    }

    fn duplicate(&self) -> Result<BoxSeq<S::Item>, Error> {
        self.require(Capabilities::COPY)?;
        Ok(Box::new(Window {
            source: self.source.duplicate()?,
            skip: self.skip,
            take: self.take,
            skipped: self.skipped,
            taken: self.taken,
            caps: self.caps,
        }))
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.require(Capabilities::RESET)?;
        self.source.reset()?;
        self.skipped = false;
        self.taken = 0;
        Ok(())
    }
}

const CONCAT_SPEC: CapSpec = CapSpec {
    always: Capabilities::empty(),
    with_source: Capabilities::BIDIRECTIONAL
        .union(Capabilities::COPY)
        .union(Capabilities::RESET),
    derived: &[
        (Capabilities::LENGTH, Capabilities::LENGTH),
        (
            Capabilities::INDEX,
            Capabilities::INDEX.union(Capabilities::LENGTH),
        ),
        (
            Capabilities::SLICE,
            Capabilities::SLICE.union(Capabilities::LENGTH),
        ),
    ],
    required: Capabilities::empty(),
};

/// Parts laid end to end. Bounded iff every part is; unbounded as
/// soon as any part is.
pub struct Concat<T> {
    parts: Vec<BoxSeq<T>>,
    caps: Capabilities,
    bounds: Boundedness,
}

/// Builds a [`Concat`] over `parts`. No parts gives the empty
/// bounded sequence with the full declared capability set.
pub fn concat<T: 'static>(parts: Vec<BoxSeq<T>>) -> Concat<T> {
    let caps = CONCAT_SPEC.apply(parts.iter().map(|p| p.caps()));
    let bounds = Boundedness::concat_of(parts.iter().map(|p| p.boundedness()));
    Concat {
        parts,
        caps,
        bounds,
    }
}

impl<T: Clone + 'static> Sequence for Concat<T> {
    type Item = T;

    fn type_name(&self) -> &'static str {
        "concat"
    }

    fn caps(&self) -> Capabilities {
        self.caps
    }

    fn boundedness(&self) -> Boundedness {
        self.bounds
    }

    fn is_exhausted(&mut self) -> bool {
        self.parts.iter_mut().all(|p| p.is_exhausted())
    }

    fn front(&mut self) -> Option<T> {
        for part in &mut self.parts {
            if !part.is_exhausted() {
                return part.front();
            }
        }
        None
    }

    fn advance_front(&mut self) {
        for part in &mut self.parts {
            if !part.is_exhausted() {
                part.advance_front();
                return;
            }
        }
    }

    fn back(&mut self) -> Result<Option<T>, Error> {
        self.require(Capabilities::BIDIRECTIONAL)?;
        for part in self.parts.iter_mut().rev() {
            if !part.is_exhausted() {
                return part.back();
            }
        }
        Ok(None)
    }

    fn advance_back(&mut self) -> Result<(), Error> {
        self.require(Capabilities::BIDIRECTIONAL)?;
        for part in self.parts.iter_mut().rev() {
            if !part.is_exhausted() {
                return part.advance_back();
            }
        }
        Ok(())
    }

    fn len(&self) -> Result<usize, Error> {
        self.require(Capabilities::LENGTH)?;
        let mut total = 0usize;
        for part in &self.parts {
            total += part.len()?;
        }
        Ok(total)
    }

    fn remaining(&self) -> Result<usize, Error> {
        self.require(Capabilities::LENGTH)?;
        let mut total = 0usize;
        for part in &self.parts {
            total += part.remaining()?;
        }
        Ok(total)
    }

    fn at(&self, index: usize) -> Result<Option<T>, Error> {
        self.require(Capabilities::INDEX)?;
        let mut index = index;
        for part in &self.parts {
            let n = part.len()?;
            if index < n {
                return part.at(index);
            }
            index -= n;
        }
        Ok(None)
    }

    fn slice(&self, lo: usize, hi: usize) -> Result<BoxSeq<T>, Error> {
        self.require(Capabilities::SLICE)?;
        let total = self.len()?;
        let hi = hi.min(total);
        let lo = lo.min(hi);
        let mut out: Vec<BoxSeq<T>> = Vec::new();
        let mut pos = 0usize;
        for part in &self.parts {
            let n = part.len()?;
            let start = lo.saturating_sub(pos).min(n);
            let end = hi.saturating_sub(pos).min(n);
            if start < end {
                out.push(part.slice(start, end)?);
            }
            pos += n;
            if pos >= hi {
                break;
            }
        }
        Ok(Box::new(concat(out)))
    }

    fn duplicate(&self) -> Result<BoxSeq<T>, Error> {
        self.require(Capabilities::COPY)?;
        let mut parts = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            parts.push(part.duplicate()?);
        }
        Ok(Box::new(concat(parts)))
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.require(Capabilities::RESET)?;
        for part in &mut self.parts {
            part.reset()?;
        }
        Ok(())
    }
}

/// Groups elements into runs of `size`, picking the cheapest strategy
/// the source's capabilities allow.
///
/// `size == 0` degenerates to an unbounded repetition of empty
/// chunks. A final short chunk keeps whatever elements remain.
pub fn chunk<S>(source: S, size: usize) -> BoxSeq<Vec<S::Item>>
where
    S: Sequence + 'static,
    S::Item: Clone + 'static,
{
    if size == 0 {
        return Box::new(repeat(Vec::new()));
    }
    if source
        .caps()
        .contains(Capabilities::INDEX.union(Capabilities::LENGTH))
    {
        Box::new(IndexedChunks::new(source, size))
    } else {
        Box::new(ForwardChunks::new(source, size))
    }
}

const INDEXED_CHUNKS_SPEC: CapSpec = CapSpec {
    always: Capabilities::BIDIRECTIONAL
        .union(Capabilities::LENGTH)
        .union(Capabilities::INDEX)
        .union(Capabilities::RESET),
    with_source: Capabilities::COPY,
    derived: &[(Capabilities::SLICE, Capabilities::SLICE)],
    required: Capabilities::empty(),
};

/// Chunking by direct index arithmetic. Never moves the source's
/// cursors, so reset is free and both ends are addressable.
pub struct IndexedChunks<S> {
    source: S,
    size: usize,
    front: usize,
    back_taken: usize,
    caps: Capabilities,
}

impl<S: Sequence> IndexedChunks<S> {
    fn new(source: S, size: usize) -> Self {
        let caps = INDEXED_CHUNKS_SPEC.apply([source.caps()]);
        IndexedChunks {
            source,
            size,
            front: 0,
            back_taken: 0,
            caps,
        }
    }
}

impl<S> IndexedChunks<S>
where
    S: Sequence,
    S::Item: Clone,
{
    fn total(&self) -> Result<usize, Error> {
        Ok(self.source.len()?.div_ceil(self.size))
    }

    fn chunk_at(&self, chunk: usize) -> Result<Option<Vec<S::Item>>, Error> {
        let n = self.source.len()?;
        let start = chunk * self.size;
        if start >= n {
            return Ok(None);
        }
        let end = (start + self.size).min(n);
        let mut out = Vec::with_capacity(end - start);
        for i in start..end {
            if let Some(v) = self.source.at(i)? {
                out.push(v);
            }
        }
        Ok(Some(out))
    }
}

impl<S> Sequence for IndexedChunks<S>
where
    S: Sequence + 'static,
    S::Item: Clone + 'static,
{
    type Item = Vec<S::Item>;

    fn type_name(&self) -> &'static str {
        "chunks"
    }

    fn caps(&self) -> Capabilities {
        self.caps
    }

    fn boundedness(&self) -> Boundedness {
        self.source.boundedness()
    }

    fn is_exhausted(&mut self) -> bool {
        match self.total() {
            Ok(total) => self.front + self.back_taken >= total,
            Err(_) => true,
        }
    }

    fn front(&mut self) -> Option<Vec<S::Item>> {
        if self.is_exhausted() {
            return None;
        }
        match self.chunk_at(self.front) {
            Ok(chunk) => chunk,
            Err(_) => None,
        }
    }

    fn advance_front(&mut self) {
        if !self.is_exhausted() {
            self.front += 1;
        }
    }

    fn back(&mut self) -> Result<Option<Vec<S::Item>>, Error> {
        if self.is_exhausted() {
            return Ok(None);
        }
        let total = self.total()?;
        self.chunk_at(total - 1 - self.back_taken)
    }

    fn advance_back(&mut self) -> Result<(), Error> {
        if !self.is_exhausted() {
            self.back_taken += 1;
        }
        Ok(())
    }

    fn len(&self) -> Result<usize, Error> {
        self.total()
    }

    fn remaining(&self) -> Result<usize, Error> {
        Ok(self.total()?.saturating_sub(self.front + self.back_taken))
    }

    fn at(&self, index: usize) -> Result<Option<Vec<S::Item>>, Error> {
        self.chunk_at(index)
    }

    fn slice(&self, lo: usize, hi: usize) -> Result<BoxSeq<Vec<S::Item>>, Error> {
        self.require(Capabilities::SLICE)?;
        let n = self.source.len()?;
        let start = (lo * self.size).min(n);
        let end = (hi * self.size).min(n).max(start);
        Ok(chunk(self.source.slice(start, end)?, self.size))
    }

    fn duplicate(&self) -> Result<BoxSeq<Vec<S::Item>>, Error> {
        self.require(Capabilities::COPY)?;
        let mut copy = IndexedChunks::new(self.source.duplicate()?, self.size);
        copy.front = self.front;
        copy.back_taken = self.back_taken;
        Ok(Box::new(copy))
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.front = 0;
        self.back_taken = 0;
        Ok(())
    }
}

const FORWARD_CHUNKS_SPEC: CapSpec = CapSpec {
    always: Capabilities::empty(),
    with_source: Capabilities::COPY.union(Capabilities::RESET),
    derived: &[],
    required: Capabilities::empty(),
};

/// Copy-based forward-only chunking for sources without positional
/// access. Buffers one chunk at a time.
pub struct ForwardChunks<S, T> {
    source: S,
    size: usize,
    slot: Option<Vec<T>>,
    caps: Capabilities,
}

impl<T, S: Sequence<Item = T>> ForwardChunks<S, T> {
    fn new(source: S, size: usize) -> Self {
        let caps = FORWARD_CHUNKS_SPEC.apply([source.caps()]);
        ForwardChunks {
            source,
            size,
            slot: None,
            caps,
        }
    }
}

impl<T, S> ForwardChunks<S, T>
where
    T: Clone,
    S: Sequence<Item = T>,
{
    fn fill(&mut self) {
        if self.slot.is_some() || self.source.is_exhausted() {
            return;
        }
        let mut chunk = Vec::with_capacity(self.size);
        while chunk.len() < self.size {
            match self.source.front() {
                Some(v) => {
                    chunk.push(v);
                    self.source.advance_front();
                }
                None => break,
            }
        }
        self.slot = Some(chunk);
    }
}

impl<T, S> Sequence for ForwardChunks<S, T>
where
    T: Clone + 'static,
    S: Sequence<Item = T> + 'static,
{
    type Item = Vec<T>;

    fn type_name(&self) -> &'static str {
        "chunks"
    }

    fn caps(&self) -> Capabilities {
        self.caps
    }

    fn boundedness(&self) -> Boundedness {
        self.source.boundedness()
    }

    fn is_exhausted(&mut self) -> bool {
        self.fill();
        self.slot.is_none()
    }

    fn front(&mut self) -> Option<Vec<T>> {
        self.fill();
        self.slot.clone()
    }

    fn advance_front(&mut self) {
        self.fill();
        self.slot = None;
    }

    fn duplicate(&self) -> Result<BoxSeq<Vec<T>>, Error> {
        self.require(Capabilities::COPY)?;
        let mut copy = ForwardChunks::new(self.source.duplicate()?, self.size);
        copy.slot = self.slot.clone();
        Ok(Box::new(copy))
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.require(Capabilities::RESET)?;
        self.source.reset()?;
        self.slot = None;
        Ok(())
    }
}

/// Pads the front of `source` out to `target` elements.
///
/// Bounded source and finite target: the pad run is
/// `max(0, target - len)` copies of `elem`. An infinite target makes
/// the result unbounded. An unbounded source is returned unchanged;
/// padding cannot lengthen infinity.
pub fn pad_left<S>(source: S, target: Extent, elem: S::Item) -> Result<BoxSeq<S::Item>, Error>
where
    S: Sequence + 'static,
    S::Item: Clone + 'static,
{
    match pad_run(source, target, elem)? {
        (None, source) => Ok(source),
        (Some(run), source) => Ok(Box::new(concat(vec![run, source]))),
    }
}

/// Pads the back of `source` out to `target` elements. Same rules as
/// [`pad_left`].
pub fn pad_right<S>(source: S, target: Extent, elem: S::Item) -> Result<BoxSeq<S::Item>, Error>
where
    S: Sequence + 'static,
    S::Item: Clone + 'static,
{
    match pad_run(source, target, elem)? {
        (None, source) => Ok(source),
        (Some(run), source) => Ok(Box::new(concat(vec![source, run]))),
    }
}

/// Computes the pad segment, eagerly sizing the source when it is
/// bounded but cannot report a length.
#[allow(clippy::type_complexity)]
fn pad_run<S>(
    source: S,
    target: Extent,
    elem: S::Item,
) -> Result<(Option<BoxSeq<S::Item>>, BoxSeq<S::Item>), Error>
where
    S: Sequence + 'static,
    S::Item: Clone + 'static,
{
    if source.boundedness().is_unbounded() {
        return Ok((None, Box::new(source)));
    }
    match target {
        Extent::Infinite => Ok((Some(repeat(elem).boxed()), Box::new(source))),
        Extent::Finite(want) => {
            let source: BoxSeq<S::Item> = if source.caps().contains(Capabilities::LENGTH) {
                Box::new(source)
            } else {
                eager(source)?
            };
            let have = source.len()?;
            let pad = want.saturating_sub(have);
            if pad == 0 {
                return Ok((None, source));
            }
            Ok((Some(replicate(elem, pad).boxed()), source))
        }
    }
}

const REDUCTIONS_SPEC: CapSpec = CapSpec {
    always: Capabilities::empty(),
    with_source: Capabilities::LENGTH
        .union(Capabilities::COPY)
        .union(Capabilities::RESET),
    derived: &[],
    required: Capabilities::empty(),
};

/// Successive partial combinations of the source's elements.
///
/// The first yielded element is the source's first element; each
/// later one folds the next element into the running accumulator.
/// Collapse to the final accumulator with
/// [`SequenceExt::last_element`].
pub struct Reductions<S, F, T> {
    source: S,
    combine: F,
    acc: Option<T>,
    slot: Option<T>,
    caps: Capabilities,
}

impl<S: Sequence, F> Reductions<S, F, S::Item> {
    pub fn new(source: S, combine: F) -> Self {
        let caps = REDUCTIONS_SPEC.apply([source.caps()]);
        Reductions {
            source,
            combine,
            acc: None,
            slot: None,
            caps,
        }
    }
}

impl<T, S, F> Reductions<S, F, T>
where
    T: Clone,
    S: Sequence<Item = T>,
    F: Fn(T, T) -> T,
{
    fn fill(&mut self) {
        if self.slot.is_some() {
            return;
        }
        let Some(v) = self.source.front() else {
            return;
        };
        self.source.advance_front();
        let next = match self.acc.take() {
            Some(acc) => (self.combine)(acc, v),
            None => v,
        };
        self.acc = Some(next.clone());
        self.slot = Some(next);
    }
}

impl<T, S, F> Sequence for Reductions<S, F, T>
where
    T: Clone + 'static,
    S: Sequence<Item = T> + 'static,
    F: Fn(T, T) -> T + Clone + 'static,
{
    type Item = T;

    fn type_name(&self) -> &'static str {
        "reductions"
    }

    fn caps(&self) -> Capabilities {
        self.caps
    }

    fn boundedness(&self) -> Boundedness {
        self.source.boundedness()
    }

    fn is_exhausted(&mut self) -> bool {
        self.fill();
        self.slot.is_none()
    }

    fn front(&mut self) -> Option<T> {
        self.fill();
        self.slot.clone()
    }

    fn advance_front(&mut self) {
        self.fill();
        self.slot = None;
    }

    fn len(&self) -> Result<usize, Error> {
        self.require(Capabilities::LENGTH)?;
        self.source.len()
    }

    fn remaining(&self) -> Result<usize, Error> {
        self.require(Capabilities::LENGTH)?;
        Ok(self.source.remaining()? + usize::from(self.slot.is_some()))
    }

    fn duplicate(&self) -> Result<BoxSeq<T>, Error> {
        self.require(Capabilities::COPY)?;
        let mut copy = Reductions::new(self.source.duplicate()?, self.combine.clone());
        copy.acc = self.acc.clone();
        copy.slot = self.slot.clone();
        Ok(Box::new(copy))
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.require(Capabilities::RESET)?;
        self.source.reset()?;
        self.acc = None;
        self.slot = None;
        Ok(())
    }
}

/// Seeded partial combinations: yields the seed first, then each
/// fold of the next source element into the accumulator.
pub struct SeededReductions<S, F, A> {
    source: S,
    combine: F,
    seed: A,
    acc: A,
    slot: Option<A>,
    started: bool,
    caps: Capabilities,
}

impl<S: Sequence, F, A: Clone> SeededReductions<S, F, A> {
    pub fn new(source: S, seed: A, combine: F) -> Self {
        let caps = REDUCTIONS_SPEC.apply([source.caps()]);
        SeededReductions {
            source,
            combine,
            acc: seed.clone(),
            seed,
            slot: None,
            started: false,
            caps,
        }
    }
}

impl<S, F, A> SeededReductions<S, F, A>
where
    S: Sequence,
    F: Fn(A, S::Item) -> A,
    A: Clone,
{
    fn fill(&mut self) {
        if self.slot.is_some() {
            return;
        }
        if !self.started {
            self.started = true;
            self.slot = Some(self.acc.clone());
            return;
        }
        let Some(v) = self.source.front() else {
            return;
        };
        self.source.advance_front();
        let next = (self.combine)(self.acc.clone(), v);
        self.acc = next.clone();
        self.slot = Some(next);
    }
}

impl<S, F, A> Sequence for SeededReductions<S, F, A>
where
    S: Sequence + 'static,
    S::Item: 'static,
    F: Fn(A, S::Item) -> A + Clone + 'static,
    A: Clone + 'static,
{
    type Item = A;

    fn type_name(&self) -> &'static str {
        "reductions"
    }

    fn caps(&self) -> Capabilities {
        self.caps
    }

    fn boundedness(&self) -> Boundedness {
        self.source.boundedness()
    }

    fn is_exhausted(&mut self) -> bool {
        self.fill();
        self.slot.is_none()
    }

    fn front(&mut self) -> Option<A> {
        self.fill();
        self.slot.clone()
    }

    fn advance_front(&mut self) {
        self.fill();
        self.slot = None;
    }

    fn len(&self) -> Result<usize, Error> {
        self.require(Capabilities::LENGTH)?;
        Ok(self.source.len()? + 1)
    }

    fn remaining(&self) -> Result<usize, Error> {
        self.require(Capabilities::LENGTH)?;
        let pending = if self.started {
            usize::from(self.slot.is_some())
        } else {
            1
        };
        Ok(self.source.remaining()? + pending)
    }

    fn duplicate(&self) -> Result<BoxSeq<A>, Error> {
        self.require(Capabilities::COPY)?;
        let mut copy = SeededReductions::new(
            self.source.duplicate()?,
            self.seed.clone(),
            self.combine.clone(),
        );
        copy.acc = self.acc.clone();
        copy.slot = self.slot.clone();
        copy.started = self.started;
        Ok(Box::new(copy))
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.require(Capabilities::RESET)?;
        self.source.reset()?;
        self.acc = self.seed.clone();
        self.slot = None;
        self.started = false;
        Ok(())
    }
}

const REVERSED_SPEC: CapSpec = CapSpec {
    always: Capabilities::BIDIRECTIONAL,
    with_source: Capabilities::LENGTH
        .union(Capabilities::COPY)
        .union(Capabilities::RESET),
    derived: &[
        (
            Capabilities::INDEX,
            Capabilities::INDEX.union(Capabilities::LENGTH),
        ),
        (
            Capabilities::SLICE,
            Capabilities::SLICE.union(Capabilities::LENGTH),
        ),
    ],
    required: Capabilities::BIDIRECTIONAL,
};

/// The source traversed back to front. Construction fails without
/// bidirectional access; use [`reverse`] for the buffering fallback.
pub struct Reversed<S> {
    source: S,
    caps: Capabilities,
}

impl<S: Sequence> Reversed<S> {
    pub fn new(source: S) -> Result<Self, Error> {
        let caps = REVERSED_SPEC.resolve("reversed", [source.caps()])?;
        Ok(Reversed { source, caps })
    }
}

impl<S> Sequence for Reversed<S>
where
    S: Sequence + 'static,
    S::Item: Clone + 'static,
{
    type Item = S::Item;

    fn type_name(&self) -> &'static str {
        "reversed"
    }

    fn caps(&self) -> Capabilities {
        self.caps
    }

    fn boundedness(&self) -> Boundedness {
        self.source.boundedness()
    }

    fn is_exhausted(&mut self) -> bool {
        self.source.is_exhausted()
    }

    fn front(&mut self) -> Option<S::Item> {
        match self.source.back() {
            Ok(v) => v,
            Err(_) => None,
        }
    }

    fn advance_front(&mut self) {
        // Construction required bidirectional access on the source.
        let _ = self.source.advance_back();
    }

    fn back(&mut self) -> Result<Option<S::Item>, Error> {
        Ok(self.source.front())
    }

    fn advance_back(&mut self) -> Result<(), Error> {
        self.source.advance_front();
        Ok(())
    }

    fn len(&self) -> Result<usize, Error> {
        self.require(Capabilities::LENGTH)?;
        self.source.len()
    }

    fn remaining(&self) -> Result<usize, Error> {
        self.require(Capabilities::LENGTH)?;
        self.source.remaining()
    }

    fn at(&self, index: usize) -> Result<Option<S::Item>, Error> {
        self.require(Capabilities::INDEX)?;
        let n = self.source.len()?;
        if index >= n {
            return Ok(None);
        }
        self.source.at(n - 1 - index)
    }

    fn slice(&self, lo: usize, hi: usize) -> Result<BoxSeq<S::Item>, Error> {
        self.require(Capabilities::SLICE)?;
        let n = self.source.len()?;
        let hi = hi.min(n);
        let lo = lo.min(hi);
        let sub = self.source.slice(n - hi, n - lo)?;
        Ok(Box::new(Reversed::new(sub)?))
    }

    fn duplicate(&self) -> Result<BoxSeq<S::Item>, Error> {
        self.require(Capabilities::COPY)?;
        Ok(Box::new(Reversed::new(self.source.duplicate()?)?))
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.require(Capabilities::RESET)?;
        self.source.reset()
    }
}

/// Reverses `source`, buffering it first when it cannot be walked
/// backwards. Sources that are neither bidirectional nor provably
/// bounded fail: the former route never errors, the latter surfaces
/// the eager boundary's [`Error::NotBounded`].
pub fn reverse<S>(source: S) -> Result<BoxSeq<S::Item>, Error>
where
    S: Sequence + 'static,
    S::Item: Clone + 'static,
{
    if source.caps().contains(Capabilities::BIDIRECTIONAL) {
        Ok(Box::new(Reversed::new(source)?))
    } else {
        Ok(Box::new(Reversed::new(eager(source)?)?))
    }
}

/// A caller-asserted boundedness override. The wrapped sequence is
/// otherwise untouched; the assertion is trusted, never verified.
pub struct Assume<S> {
    source: S,
    bounds: Boundedness,
}

impl<S> Assume<S> {
    pub fn new(source: S, bounds: Boundedness) -> Self {
        Assume { source, bounds }
    }
}

impl<S> Sequence for Assume<S>
where
    S: Sequence,
    S::Item: 'static,
{
    type Item = S::Item;

    fn type_name(&self) -> &'static str {
        "assume"
    }

    fn caps(&self) -> Capabilities {
        self.source.caps()
    }

    fn boundedness(&self) -> Boundedness {
        self.bounds
    }

    fn is_exhausted(&mut self) -> bool {
        self.source.is_exhausted()
    }

    fn front(&mut self) -> Option<S::Item> {
        self.source.front()
    }

    fn advance_front(&mut self) {
        self.source.advance_front();
    }

    fn back(&mut self) -> Result<Option<S::Item>, Error> {
        self.source.back()
    }

    fn advance_back(&mut self) -> Result<(), Error> {
        self.source.advance_back()
    }

    fn len(&self) -> Result<usize, Error> {
        self.source.len()
    }

    fn remaining(&self) -> Result<usize, Error> {
        self.source.remaining()
    }

    fn at(&self, index: usize) -> Result<Option<S::Item>, Error> {
        self.source.at(index)
    }

    fn slice(&self, lo: usize, hi: usize) -> Result<BoxSeq<S::Item>, Error> {
        Ok(Box::new(Assume::new(self.source.slice(lo, hi)?, self.bounds)))
    }

    fn has_key(&self, key: Key<'_>) -> Result<bool, Error> {
        self.source.has_key(key)
    }

    fn get_key(&self, key: Key<'_>) -> Result<Option<S::Item>, Error> {
        self.source.get_key(key)
    }

    fn duplicate(&self) -> Result<BoxSeq<S::Item>, Error> {
        Ok(Box::new(Assume::new(self.source.duplicate()?, self.bounds)))
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.source.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequences::{from_fn, range, text, IntoIteratorExt, VecExt};

    #[test]
    fn map_mirrors_source_caps() {
        let over_items = vec![1, 2, 3].into_seq().map(|n| n * 2);
        assert_eq!(over_items.caps(), Capabilities::all());

        let over_iter = (0..3).iter_seq().map(|n| n * 2);
        assert!(over_iter.caps().is_empty());
    }

    #[test]
    fn map_recomputes_through_positional_reads() {
        let mut seq = vec![1, 2, 3].into_seq().map(|n| n + 10);
        assert_eq!(seq.at(1), Ok(Some(12)));
        assert_eq!(seq.back().unwrap(), Some(13));
        let sub = seq.slice(0, 2).unwrap();
        assert_eq!(sub.into_vec(), Ok(vec![11, 12]));
    }

    #[test]
    fn zip_map_stops_at_shortest() {
        let sources: Vec<crate::BoxSeq<i32>> = vec![
            vec![1, 2, 3, 4].into_seq().boxed(),
            vec![10, 20].into_seq().boxed(),
        ];
        let seq = zip_map(sources, |row| row.iter().sum::<i32>());
        assert_eq!(seq.len(), Ok(2));
        assert_eq!(seq.into_vec(), Ok(vec![11, 22]));
    }

    #[test]
    fn zip_map_over_no_sources_is_empty_and_bounded() {
        let mut seq = zip_map(Vec::<crate::BoxSeq<i32>>::new(), |row| row.len());
        assert!(seq.is_exhausted());
        assert_eq!(seq.boundedness(), Boundedness::Bounded);
        assert_eq!(seq.len(), Ok(0));
        assert_eq!(seq.front(), None);
    }

    #[test]
    fn zip_map_caps_need_every_source() {
        let sources: Vec<crate::BoxSeq<i32>> = vec![
            vec![1].into_seq().boxed(),
            (0..).iter_seq().assume(Boundedness::Unbounded).boxed(),
        ];
        let seq = zip_map(sources, |row| row[0]);
        assert!(seq.caps().is_empty());
        assert_eq!(seq.boundedness(), Boundedness::Bounded);
    }

    #[test]
    fn enumerate_pairs_positions() {
        let seq = text("abc").enumerate();
        assert_eq!(seq.into_vec(), Ok(vec![(0, 'a'), (1, 'b'), (2, 'c')]));
    }

    #[test]
    fn enumerate_slice_keeps_absolute_positions() {
        let seq = text("abcde").enumerate();
        let sub = seq.slice(2, 4).unwrap();
        assert_eq!(sub.into_vec(), Ok(vec![(2, 'c'), (3, 'd')]));
    }

    #[test]
    fn enumerate_back_positions_ignore_front_consumption() {
        let mut seq = text("abcd").enumerate();
        seq.advance_front();
        assert_eq!(seq.back().unwrap(), Some((3, 'd')));
        seq.advance_back().unwrap();
        assert_eq!(seq.back().unwrap(), Some((2, 'c')));
    }

    #[test]
    fn filter_skips_lazily_from_both_ends() {
        let mut seq = range(10).filter(|n| n % 3 == 0);
        assert_eq!(seq.front(), Some(0));
        assert_eq!(seq.back().unwrap(), Some(9));
        seq.advance_back().unwrap();
        assert_eq!(seq.back().unwrap(), Some(6));
    }

    #[test]
    fn filter_drops_positional_caps() {
        let seq = range(10).filter(|n| n % 2 == 0);
        assert!(seq.len().is_err());
        assert!(seq.at(0).is_err());
        assert!(seq.slice(0, 1).is_err());
        assert!(seq
            .caps()
            .contains(Capabilities::BIDIRECTIONAL | Capabilities::COPY | Capabilities::RESET));
    }

    #[test]
    fn filter_duplicate_is_independent() {
        let mut seq = range(6).filter(|n| n % 2 == 0);
        seq.advance_front();
        let mut copy = seq.duplicate().unwrap();
        assert_eq!(copy.front(), Some(2));
        copy.advance_front();
        assert_eq!(seq.front(), Some(2));
        assert_eq!(copy.front(), Some(4));
    }

    #[test]
    fn window_skips_then_takes() {
        let seq = Window::new((0..100).iter_seq(), 5, Extent::Finite(3));
        assert_eq!(seq.boundedness(), Boundedness::Bounded);
        assert_eq!(seq.into_vec(), Ok(vec![5, 6, 7]));
    }

    #[test]
    fn window_over_short_source_just_ends() {
        let seq = Window::new((0..4).iter_seq(), 10, Extent::Finite(3));
        assert_eq!(seq.into_vec(), Ok(vec![]));
    }

    #[test]
    fn concat_walks_parts_in_order() {
        let seq = concat(vec![
            vec![1, 2].into_seq().boxed(),
            vec![].into_seq().boxed(),
            vec![3, 4].into_seq().boxed(),
        ]);
        assert_eq!(seq.len(), Ok(4));
        assert_eq!(seq.at(2), Ok(Some(3)));
        assert_eq!(seq.into_vec(), Ok(vec![1, 2, 3, 4]));
    }

    #[test]
    fn concat_of_nothing_is_empty() {
        let mut seq = concat(Vec::<crate::BoxSeq<i32>>::new());
        assert!(seq.is_exhausted());
        assert_eq!(seq.len(), Ok(0));
        assert_eq!(seq.boundedness(), Boundedness::Bounded);
        assert_eq!(seq.slice(0, 5).unwrap().into_vec(), Ok(vec![]));
    }

    #[test]
    fn concat_boundedness_rules() {
        let bounded = concat(vec![vec![1].into_seq().boxed(), vec![2].into_seq().boxed()]);
        assert_eq!(bounded.boundedness(), Boundedness::Bounded);

        let with_unbounded = concat(vec![vec![1].into_seq().boxed(), repeat(9).boxed()]);
        assert_eq!(with_unbounded.boundedness(), Boundedness::Unbounded);

        let with_unknown = concat(vec![vec![1].into_seq().boxed(), (0..2).iter_seq().boxed()]);
        assert_eq!(with_unknown.boundedness(), Boundedness::Unknown);
    }

    #[test]
    fn concat_slice_crosses_part_boundaries() {
        let seq = concat(vec![
            vec![1, 2, 3].into_seq().boxed(),
            vec![4, 5, 6].into_seq().boxed(),
        ]);
        let sub = seq.slice(2, 5).unwrap();
        assert_eq!(sub.into_vec(), Ok(vec![3, 4, 5]));
    }

    #[test]
    fn concat_back_traversal_spans_parts() {
        let mut seq = concat(vec![vec![1, 2].into_seq().boxed(), vec![3].into_seq().boxed()]);
        assert_eq!(seq.back().unwrap(), Some(3));
        seq.advance_back().unwrap();
        assert_eq!(seq.back().unwrap(), Some(2));
    }

    #[test]
    fn chunk_splits_with_a_short_tail() {
        let seq = chunk(vec![1, 2, 3, 4, 5, 6, 7, 8].into_seq(), 3);
        assert_eq!(
            seq.into_vec(),
            Ok(vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8]])
        );
    }

    #[test]
    fn chunk_indexed_strategy_is_bidirectional() {
        let mut seq = chunk(vec![1, 2, 3, 4, 5].into_seq(), 2);
        assert_eq!(seq.len(), Ok(3));
        assert_eq!(seq.back().unwrap(), Some(vec![5]));
        assert_eq!(seq.at(1), Ok(Some(vec![3, 4])));
    }

    #[test]
    fn chunk_forward_strategy_over_plain_iterators() {
        let seq = chunk((1..=5).iter_seq(), 2);
        assert!(seq.len().is_err());
        assert_eq!(seq.into_vec(), Ok(vec![vec![1, 2], vec![3, 4], vec![5]]));
    }

    #[test]
    fn chunk_size_zero_repeats_empty_chunks() {
        let mut seq = chunk(vec![1, 2].into_seq(), 0);
        assert_eq!(seq.boundedness(), Boundedness::Unbounded);
        assert_eq!(seq.front(), Some(vec![]));
        seq.advance_front();
        assert_eq!(seq.front(), Some(vec![]));
    }

    #[test]
    fn chunk_slice_rechunks_the_sub_view() {
        let seq = chunk(vec![1, 2, 3, 4, 5, 6, 7].into_seq(), 2);
        let sub = seq.slice(1, 3).unwrap();
        assert_eq!(sub.into_vec(), Ok(vec![vec![3, 4], vec![5, 6]]));
    }

    #[test]
    fn pad_left_fills_to_target() {
        let padded = pad_left(text("123"), Extent::Finite(5), '0').unwrap();
        assert_eq!(crate::sequences::into_string(padded), Ok("00123".to_string()));
    }

    #[test]
    fn pad_left_at_target_is_a_no_op() {
        let padded = pad_left(text("beep"), Extent::Finite(4), '_').unwrap();
        assert_eq!(crate::sequences::into_string(padded), Ok("beep".to_string()));
    }

    #[test]
    fn pad_right_appends() {
        let padded = pad_right(text("ab"), Extent::Finite(4), '.').unwrap();
        assert_eq!(crate::sequences::into_string(padded), Ok("ab..".to_string()));
    }

    #[test]
    fn pad_to_infinity_is_unbounded() {
        let padded = pad_right(vec![1].into_seq(), Extent::Infinite, 0).unwrap();
        assert_eq!(padded.boundedness(), Boundedness::Unbounded);
    }

    #[test]
    fn pad_of_unbounded_source_is_identity() {
        let padded = pad_left(repeat(7), Extent::Finite(100), 0).unwrap();
        assert_eq!(padded.boundedness(), Boundedness::Unbounded);
        assert_eq!(padded.type_name(), "repeat");
    }

    #[test]
    fn pad_sizes_a_lengthless_bounded_source_eagerly() {
        let source = (1..=2).iter_seq().assume(Boundedness::Bounded);
        let padded = pad_left(source, Extent::Finite(4), 0).unwrap();
        assert_eq!(padded.into_vec(), Ok(vec![0, 0, 1, 2]));
    }

    #[test]
    fn reductions_yield_partials() {
        let seq = vec![1, 2, 3, 4, 10].into_seq().reductions(|a, b| a + b);
        assert_eq!(seq.into_vec(), Ok(vec![1, 3, 6, 10, 20]));
    }

    #[test]
    fn reductions_last_element_folds() {
        let mut seq = vec![1, 2, 3, 4, 10].into_seq().reductions(|a, b| a + b);
        assert_eq!(seq.last_element(), Ok(Some(20)));
    }

    #[test]
    fn seeded_reductions_yield_the_seed_first() {
        let seq = vec![1, 2, 3].into_seq().reductions_from(100, |a, b| a + b);
        assert_eq!(seq.len(), Ok(4));
        assert_eq!(seq.into_vec(), Ok(vec![100, 101, 103, 106]));
    }

    #[test]
    fn last_element_demands_boundedness() {
        let mut seq = from_fn(|i| i).reductions(|a, b| a + b);
        assert_eq!(seq.last_element(), Err(Error::not_bounded("reductions")));
    }

    #[test]
    fn reversed_swaps_ends() {
        let seq = Reversed::new(range(4)).unwrap();
        assert_eq!(seq.into_vec(), Ok(vec![3, 2, 1, 0]));
    }

    #[test]
    fn reversed_index_rebases_through_length() {
        let seq = Reversed::new(range(5)).unwrap();
        assert_eq!(seq.at(0), Ok(Some(4)));
        assert_eq!(seq.at(4), Ok(Some(0)));
        assert_eq!(seq.at(5), Ok(None));
    }

    #[test]
    fn reversed_slice_mirrors_bounds() {
        let seq = Reversed::new(range(6)).unwrap();
        // Reversed is [5,4,3,2,1,0]; positions [1,4) are [4,3,2].
        let sub = seq.slice(1, 4).unwrap();
        assert_eq!(sub.into_vec(), Ok(vec![4, 3, 2]));
    }

    #[test]
    fn reverse_falls_back_to_buffering() {
        let seq = reverse((1..=4).iter_seq().assume(Boundedness::Bounded)).unwrap();
        assert_eq!(seq.into_vec(), Ok(vec![4, 3, 2, 1]));
    }

    #[test]
    fn reverse_of_unprovable_source_fails() {
        let err = reverse((0..).iter_seq()).expect_err("unknown boundedness");
        assert_eq!(err, Error::not_bounded("iter"));
    }

    #[test]
    fn assume_overrides_only_the_flags() {
        let seq = (0..3).iter_seq().assume(Boundedness::Bounded);
        assert_eq!(seq.boundedness(), Boundedness::Bounded);
        assert!(seq.caps().is_empty());
        assert_eq!(seq.into_vec(), Ok(vec![0, 1, 2]));
    }
}
