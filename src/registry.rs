use crate::error::RegistryError;
use crate::sequences::{text, EntriesSeq, ItemsSeq, IterSeq};
use crate::BoxSeq;

/// A raw container value awaiting adaptation.
///
/// The variants overlap structurally: an `Items` or `Entries` payload
/// is also perfectly consumable as a plain iterator, which is why
/// converter ordering matters.
pub enum Input<T> {
    Items(Vec<T>),
    /// Key–value pairs; by convention `T` is the pair type itself.
    Entries(Vec<T>),
    Text(String),
    Iter(Box<dyn Iterator<Item = T>>),
}

impl<T> Input<T> {
    pub fn kind(&self) -> &'static str {
        match self {
            Input::Items(_) => "items",
            Input::Entries(_) => "entries",
            Input::Text(_) => "text",
            Input::Iter(_) => "iter",
        }
    }
}

/// A named adapter selection rule: a structural predicate, a
/// constructor, and ordering constraints against other converters.
pub struct Converter<T> {
    pub name: &'static str,
    /// Names this converter must be tried before.
    pub before: &'static [&'static str],
    /// Names this converter must be tried after.
    pub after: &'static [&'static str],
    pub matches: fn(&Input<T>) -> bool,
    pub build: fn(Input<T>) -> BoxSeq<T>,
}

/// An ordered converter list. Built once at initialization and
/// passed wherever adapter selection happens; nothing global.
pub struct Registry<T> {
    converters: Vec<Converter<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Registry::new()
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Registry {
            converters: Vec::new(),
        }
    }

    /// Inserts `converter` at the latest position that satisfies
    /// every ordering constraint: after each entry that must precede
    /// it, before each entry that must follow it. Unconstrained
    /// entries keep registration order. Contradictory constraints and
    /// duplicate names fail registration.
    pub fn register(&mut self, converter: Converter<T>) -> Result<(), RegistryError> {
        if self.converters.iter().any(|c| c.name == converter.name) {
            return Err(RegistryError::Duplicate {
                name: converter.name,
            });
        }

        let mut lowest = 0usize;
        let mut highest = self.converters.len();
        let mut highest_by = converter.name;
        for (i, existing) in self.converters.iter().enumerate() {
            let precedes_new = converter.after.contains(&existing.name)
                || existing.before.contains(&converter.name);
            let follows_new = converter.before.contains(&existing.name)
                || existing.after.contains(&converter.name);
            if precedes_new && follows_new {
                return Err(RegistryError::Conflict {
                    a: converter.name,
                    b: existing.name,
                });
            }
            if precedes_new && i + 1 > lowest {
                lowest = i + 1;
            }
            if follows_new && i < highest {
                highest = i;
                highest_by = existing.name;
            }
        }
        if lowest > highest {
            return Err(RegistryError::Conflict {
                a: converter.name,
                b: highest_by,
            });
        }

        self.converters.insert(highest, converter);
        Ok(())
    }

    /// Adapts `input` with the first converter, in priority order,
    /// whose predicate matches.
    pub fn convert(&self, input: Input<T>) -> Result<BoxSeq<T>, RegistryError> {
        for converter in &self.converters {
            if (converter.matches)(&input) {
                return Ok((converter.build)(input));
            }
        }
        Err(RegistryError::NoMatch {
            input: input.kind(),
        })
    }

    /// Converter names in priority order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.converters.iter().map(|c| c.name)
    }
}

impl<T: Clone + 'static> Registry<T> {
    /// The stock registry: dedicated `items` conversion tried before
    /// the catch-all `iter` conversion, which would otherwise claim
    /// every iterable payload.
    pub fn standard() -> Self {
        let mut registry = Registry::new();
        registry
            .register(iter_converter())
            .expect("standard converter constraints are consistent");
        registry
            .register(items_converter())
            .expect("standard converter constraints are consistent");
        registry
    }
}

impl<V: Clone + 'static> Registry<(String, V)> {
    /// The stock registry for pair elements, with the `entries`
    /// conversion (sorted key–value adaptation) ahead of both
    /// list-shaped conversions.
    pub fn standard_with_entries() -> Self {
        let mut registry = Registry::standard();
        registry
            .register(entries_converter())
            .expect("entries converter constraints are consistent");
        registry
    }
}

impl Registry<char> {
    /// The stock registry for characters, with the `text` conversion
    /// registered ahead of the catch-all.
    pub fn standard_with_text() -> Self {
        let mut registry = Registry::standard();
        registry
            .register(text_converter())
            .expect("text converter constraints are consistent");
        registry
    }
}

fn items_converter<T: Clone + 'static>() -> Converter<T> {
    Converter {
        name: "items",
        before: &["iter"],
        after: &[],
        matches: |input| matches!(input, Input::Items(_)),
        build: |input| match input {
            Input::Items(items) => Box::new(ItemsSeq::new(items)),
            _ => unreachable!("guarded by matches"),
        },
    }
}

fn entries_converter<V: Clone + 'static>() -> Converter<(String, V)> {
    Converter {
        name: "entries",
        before: &["items", "iter"],
        after: &[],
        matches: |input| matches!(input, Input::Entries(_)),
        build: |input| match input {
            Input::Entries(entries) => Box::new(EntriesSeq::new(entries)),
            _ => unreachable!("guarded by matches"),
        },
    }
}

fn text_converter() -> Converter<char> {
    Converter {
        name: "text",
        before: &["iter"],
        after: &[],
        matches: |input| matches!(input, Input::Text(_)),
        build: |input| match input {
            Input::Text(s) => Box::new(text(&s)),
            _ => unreachable!("guarded by matches"),
        },
    }
}

/// The catch-all: anything structurally iterable becomes a
/// single-pass [`IterSeq`]. Must sort after the dedicated
/// conversions, which its predicate overlaps.
fn iter_converter<T: Clone + 'static>() -> Converter<T> {
    Converter {
        name: "iter",
        before: &[],
        after: &[],
        matches: |input| !matches!(input, Input::Text(_)),
        build: |input| match input {
            Input::Items(items) | Input::Entries(items) => {
                Box::new(IterSeq::new(items.into_iter()))
            }
            Input::Iter(iter) => Box::new(IterSeq::new(iter)),
            Input::Text(_) => unreachable!("guarded by matches"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Sequence, SequenceExt};

    fn noop<T>(name: &'static str, before: &'static [&'static str], after: &'static [&'static str]) -> Converter<T> {
        Converter {
            name,
            before,
            after,
            matches: |_| false,
            build: |_| unreachable!("never matches"),
        }
    }

    #[test]
    fn items_win_over_the_catch_all() {
        let registry = Registry::<i32>::standard();
        assert_eq!(registry.names().collect::<Vec<_>>(), ["items", "iter"]);

        let seq = registry.convert(Input::Items(vec![1, 2, 3])).unwrap();
        assert_eq!(seq.type_name(), "items");
        assert_eq!(seq.into_vec(), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn plain_iterators_fall_through_to_the_catch_all() {
        let registry = Registry::<i32>::standard();
        let seq = registry.convert(Input::Iter(Box::new(0..3))).unwrap();
        assert_eq!(seq.type_name(), "iter");
    }

    #[test]
    fn entries_sort_ahead_of_both_list_conversions() {
        let registry = Registry::<(String, i32)>::standard_with_entries();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            ["entries", "items", "iter"]
        );

        let seq = registry
            .convert(Input::Entries(vec![
                ("b".to_string(), 2),
                ("a".to_string(), 1),
            ]))
            .unwrap();
        assert_eq!(seq.type_name(), "entries");
        assert_eq!(
            seq.into_vec(),
            Ok(vec![("a".to_string(), 1), ("b".to_string(), 2)])
        );
    }

    #[test]
    fn text_conversion_for_characters() {
        let registry = Registry::standard_with_text();
        let seq = registry.convert(Input::Text("hi".to_string())).unwrap();
        assert_eq!(seq.into_vec(), Ok(vec!['h', 'i']));
    }

    #[test]
    fn text_without_a_text_converter_matches_nothing() {
        let registry = Registry::<char>::standard();
        let err = registry
            .convert(Input::Text("hi".to_string()))
            .expect_err("no text converter");
        assert_eq!(err, RegistryError::NoMatch { input: "text" });
    }

    #[test]
    fn after_constraint_places_later() {
        let mut registry = Registry::<i32>::new();
        registry.register(noop("a", &[], &[])).unwrap();
        registry.register(noop("b", &[], &["a"])).unwrap();
        registry.register(noop("c", &[], &["a"])).unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn before_constraint_places_earlier() {
        let mut registry = Registry::<i32>::new();
        registry.register(noop("z", &[], &[])).unwrap();
        registry.register(noop("a", &["z"], &[])).unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), ["a", "z"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = Registry::<i32>::new();
        registry.register(noop("a", &[], &[])).unwrap();
        assert_eq!(
            registry.register(noop("a", &[], &[])),
            Err(RegistryError::Duplicate { name: "a" })
        );
    }

    #[test]
    fn direct_contradiction_is_a_conflict() {
        let mut registry = Registry::<i32>::new();
        registry.register(noop("a", &[], &[])).unwrap();
        assert_eq!(
            registry.register(noop("b", &["a"], &["a"])),
            Err(RegistryError::Conflict { a: "b", b: "a" })
        );
    }

    #[test]
    fn transitive_contradiction_is_a_conflict() {
        let mut registry = Registry::<i32>::new();
        registry.register(noop("a", &[], &[])).unwrap();
        registry.register(noop("b", &[], &["a"])).unwrap();
        // Must follow "b" but precede "a", which sits before "b".
        let err = registry.register(noop("c", &["a"], &["b"])).expect_err("conflict");
        assert!(matches!(err, RegistryError::Conflict { .. }));
    }

    #[test]
    fn mutual_before_works_when_registered_in_either_order() {
        let mut registry = Registry::<i32>::new();
        registry.register(noop("late", &[], &[])).unwrap();
        registry.register(noop("early", &["late"], &[])).unwrap();
        registry.register(noop("middle", &["late"], &["early"])).unwrap();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            ["early", "middle", "late"]
        );
    }
}
