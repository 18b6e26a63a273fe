use crate::adapters::Window;
use crate::bounds::Extent;
use crate::caps::Capabilities;
use crate::eager::eager;
use crate::error::Error;
use crate::sequences::empty;
use crate::{BoxSeq, Sequence};

/// One end of a slice.
///
/// `FromEnd` counts back from the final element; `FromEnd(0)` is the
/// "through the end" sentinel (host languages with signed zero spell
/// it `-0`). `Unbounded` as a high bound means "no upper limit"; as a
/// low bound it starts past every element, yielding nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceBound {
    FromStart(usize),
    FromEnd(usize),
    Unbounded,
}

impl From<usize> for SliceBound {
    #[inline]
    fn from(i: usize) -> Self {
        SliceBound::FromStart(i)
    }
}

impl SliceBound {
    fn resolve(self, len: usize) -> usize {
        match self {
            SliceBound::FromStart(i) => i.min(len),
            SliceBound::FromEnd(k) => len.saturating_sub(k),
            SliceBound::Unbounded => len,
        }
    }
}

/// The slice entry point: an explicit case table over bound shapes
/// and source capabilities.
///
/// | lo        | hi          | source                  | strategy                         |
/// |-----------|-------------|-------------------------|----------------------------------|
/// | start     | start       | sliceable               | capability slice (view)          |
/// | start     | start       | anything else           | forward skip/take window         |
/// | start     | unbounded   | provably unbounded      | error: needs back traversal      |
/// | start     | unbounded   | length-known            | resolve high bound, re-enter     |
/// | start     | unbounded   | other                   | forward skip window, open-ended  |
/// | any       | end-relative| provably unbounded      | error: needs back traversal      |
/// | end-rel.  | any         | length-known            | resolve both bounds, re-enter    |
/// | end-rel.  | any         | bounded, no length      | eager materialization, re-enter  |
/// | end-rel.  | any         | unknown boundedness     | error: not provably bounded      |
/// | unbounded | any         | anything                | empty                            |
///
/// Bounds that normalize to `lo >= hi` yield the empty sequence.
pub fn slice<S>(source: S, lo: SliceBound, hi: SliceBound) -> Result<BoxSeq<S::Item>, Error>
where
    S: Sequence + 'static,
    S::Item: Clone + 'static,
{
    if matches!(lo, SliceBound::Unbounded) {
        return Ok(Box::new(empty()));
    }

    match (lo, hi) {
        (SliceBound::FromStart(a), SliceBound::FromStart(b)) => forward_window(source, a, b),

        (SliceBound::FromStart(a), SliceBound::Unbounded) => {
            if source.boundedness().is_unbounded() {
                return Err(Error::unsupported(
                    source.type_name(),
                    Capabilities::BIDIRECTIONAL,
                ));
            }
            if source.caps().contains(Capabilities::LENGTH) {
                let n = source.len()?;
                forward_window(source, a, n)
            } else {
                Ok(Box::new(Window::new(source, a, Extent::Infinite)))
            }
        }

        // At least one end-relative bound remains.
        (lo, hi) => {
            if source.boundedness().is_unbounded() {
                return Err(Error::unsupported(
                    source.type_name(),
                    Capabilities::BIDIRECTIONAL,
                ));
            }
            let source: BoxSeq<S::Item> = if source.caps().contains(Capabilities::LENGTH) {
                Box::new(source)
            } else {
                // Bounded sources are drained to learn their length;
                // unknown boundedness fails here.
                eager(source)?
            };
            let n = source.len()?;
            let a = lo.resolve(n);
            let b = hi.resolve(n);
            forward_window(source, a, b)
        }
    }
}

fn forward_window<S>(source: S, a: usize, b: usize) -> Result<BoxSeq<S::Item>, Error>
where
    S: Sequence + 'static,
    S::Item: Clone + 'static,
{
    if a >= b {
        return Ok(Box::new(empty()));
    }
    if source.caps().contains(Capabilities::SLICE) {
        source.slice(a, b)
    } else {
        Ok(Box::new(Window::new(source, a, Extent::Finite(b - a))))
    }
}
