//! the handle-indexed object store
//!
//! Every object in a session lives in one [`ObjectStore`] and is addressed
//! exclusively through its [`Handle`]. Handles are append-only indexes: they
//! are never reused and stay valid for the whole lifetime of the store.

use crate::evaluator::{
    AggregateEvaluator, ArgumentEvaluator, ConstantEvaluator, Evaluator, ExternalEvaluator,
    ParameterEvaluator, PiecewiseEvaluator, ReferenceEvaluator,
};
use crate::object::{FieldmlObject, ObjectPayload, ObjectTag};
use crate::{DataResource, DataSource};

use std::fmt;

/// Opaque reference to one object owned by an [`ObjectStore`].
///
/// A `Handle` is only meaningful against the store that issued it. Optional
/// references use `Option<Handle>` rather than a sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(u32);

impl Handle {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arena owning every [`FieldmlObject`] of one session.
///
/// Objects are appended and never removed; the store destroys them all when
/// it is dropped. Lookups are bounds-checked and degrade to `None`, never
/// panic. Enumeration and name lookup are linear scans: object counts are
/// model-sized, not record-store-sized.
#[derive(Debug, Default)]
pub struct ObjectStore {
    objects: Vec<FieldmlObject>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an object, returning its fresh handle. Handles increase
    /// monotonically and are stable for the life of the store.
    pub fn add(&mut self, object: FieldmlObject) -> Handle {
        let handle = Handle(self.objects.len() as u32);
        self.objects.push(object);
        handle
    }

    pub fn get(&self, handle: Handle) -> Option<&FieldmlObject> {
        self.objects.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut FieldmlObject> {
        self.objects.get_mut(handle.index())
    }

    pub fn count(&self) -> usize {
        self.objects.len()
    }

    /// Handle of the `i`-th object added, if any.
    pub fn by_index(&self, i: usize) -> Option<Handle> {
        (i < self.objects.len()).then(|| Handle(i as u32))
    }

    /// First object with the given declared name.
    pub fn by_name(&self, name: &str) -> Option<Handle> {
        self.handles().find(|h| self.objects[h.index()].name == name)
    }

    pub fn count_of_tag(&self, tag: ObjectTag) -> usize {
        self.objects.iter().filter(|o| o.tag() == tag).count()
    }

    /// Handle of the `i`-th object carrying `tag`, in insertion order.
    pub fn nth_of_tag(&self, tag: ObjectTag, i: usize) -> Option<Handle> {
        self.handles()
            .filter(|h| self.objects[h.index()].tag() == tag)
            .nth(i)
    }

    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        (0..self.objects.len() as u32).map(Handle)
    }

    pub fn name(&self, handle: Handle) -> Option<&str> {
        self.get(handle).map(|o| o.name.as_str())
    }

    /// Downcast to any evaluator kind. `None` on a missing handle or an
    /// object that is not an evaluator.
    pub fn evaluator(&self, handle: Handle) -> Option<&Evaluator> {
        match self.get(handle)?.payload {
            ObjectPayload::Evaluator(ref e) => Some(e),
            _ => None,
        }
    }

    pub fn evaluator_mut(&mut self, handle: Handle) -> Option<&mut Evaluator> {
        match self.get_mut(handle)?.payload {
            ObjectPayload::Evaluator(ref mut e) => Some(e),
            _ => None,
        }
    }

    pub fn data_source(&self, handle: Handle) -> Option<&DataSource> {
        match self.get(handle)?.payload {
            ObjectPayload::DataSource(ref s) => Some(s),
            _ => None,
        }
    }

    pub fn data_resource(&self, handle: Handle) -> Option<&DataResource> {
        match self.get(handle)?.payload {
            ObjectPayload::DataResource(ref r) => Some(r),
            _ => None,
        }
    }
}

macro_rules! evaluator_accessor {
    ($(#[$meta:meta])* $name:ident, $variant:ident, $concrete:ty) => {
        impl ObjectStore {
            $(#[$meta])*
            pub fn $name(&self, handle: Handle) -> Option<&$concrete> {
                match self.evaluator(handle)?.kind {
                    crate::evaluator::EvaluatorKind::$variant(ref inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

evaluator_accessor!(
    /// Downcast to a constant evaluator; `None` on any other kind.
    constant, Constant, ConstantEvaluator
);
evaluator_accessor!(argument, Argument, ArgumentEvaluator);
evaluator_accessor!(external, External, ExternalEvaluator);
evaluator_accessor!(reference, Reference, ReferenceEvaluator);
evaluator_accessor!(parameter, Parameter, ParameterEvaluator);
evaluator_accessor!(piecewise, Piecewise, PiecewiseEvaluator);
evaluator_accessor!(aggregate, Aggregate, AggregateEvaluator);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ContinuousType;

    fn continuous(name: &str) -> FieldmlObject {
        FieldmlObject::new(name, ObjectPayload::ContinuousType(ContinuousType::scalar()))
    }

    #[test]
    fn handles_stay_valid_after_later_adds() {
        let mut store = ObjectStore::new();
        let first = store.add(continuous("first"));

        for i in 0..100 {
            store.add(continuous(&format!("filler.{i}")));
        }

        assert_eq!(store.name(first), Some("first"));
        assert_eq!(store.by_name("first"), Some(first));
        assert_eq!(store.count(), 101);
    }

    #[test]
    fn lookup_degrades_to_none() {
        let mut store = ObjectStore::new();
        let handle = store.add(continuous("only"));

        assert!(store.by_index(1).is_none());
        assert!(store.by_name("missing").is_none());
        // wrong-kind downcast is silent
        assert!(store.evaluator(handle).is_none());
    }

    #[test]
    fn tag_enumeration() {
        let mut store = ObjectStore::new();
        let a = store.add(continuous("a"));
        store.add(FieldmlObject::new("b", ObjectPayload::BooleanType));
        let c = store.add(continuous("c"));

        assert_eq!(store.count_of_tag(ObjectTag::ContinuousType), 2);
        assert_eq!(store.nth_of_tag(ObjectTag::ContinuousType, 0), Some(a));
        assert_eq!(store.nth_of_tag(ObjectTag::ContinuousType, 1), Some(c));
        assert_eq!(store.nth_of_tag(ObjectTag::ContinuousType, 2), None);
    }
}
