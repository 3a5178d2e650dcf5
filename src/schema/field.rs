use std::fmt;
use std::marker::PhantomData;

/// A named index (schema) in the search engine. Implemented by zero-sized
/// markers so fields and plans are tied to one collection at compile time.
pub trait Collection: fmt::Debug + Clone + Copy + PartialEq + Eq + std::hash::Hash + Send + Sync + 'static {
    const KIND: &'static str;
}

/// Symbolic name of an engine field within collection `C`.
///
/// Only constructible as a `const` in the collection's registry, so a query
/// against one collection can not reference another collection's fields.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaField<C: Collection> {
    name: &'static str,
    _collection: PhantomData<C>,
}

impl<C: Collection> SchemaField<C> {
    pub(crate) const fn new(name: &'static str) -> Self {
        SchemaField { name, _collection: PhantomData }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn collection_kind(&self) -> &'static str {
        C::KIND
    }
}

impl<C: Collection> fmt::Debug for SchemaField<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", C::KIND, self.name)
    }
}

impl<C: Collection> fmt::Display for SchemaField<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
