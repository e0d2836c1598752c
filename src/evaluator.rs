//! the evaluator variant family
//!
//! Evaluators are the nodes of the field-description graph. Each variant
//! knows exactly one non-trivial thing beyond its data: which handles it
//! directly delegates to ([`Evaluator::add_delegates`]). The session
//! resolver builds every transitive computation on top of that one method.

use crate::map::SimpleMap;
use crate::Handle;

use std::collections::BTreeSet;

/// Ordered set of object handles, as produced by the resolver.
pub type HandleSet = BTreeSet<Handle>;

/// An evaluator: a graph node that conceptually produces a value of
/// `value_type` when evaluated. How the value is derived is the variant's
/// business; this crate only models the structure.
///
/// Construction is permissive by design: missing binds, defaults, or data
/// descriptions are not errors until a validation pass runs, so a document
/// parse can build objects incrementally.
#[derive(Debug)]
pub struct Evaluator {
    pub value_type: Handle,
    pub kind: EvaluatorKind,
}

#[derive(Debug)]
pub enum EvaluatorKind {
    Constant(ConstantEvaluator),
    Argument(ArgumentEvaluator),
    External(ExternalEvaluator),
    Reference(ReferenceEvaluator),
    Parameter(ParameterEvaluator),
    Piecewise(PiecewiseEvaluator),
    Aggregate(AggregateEvaluator),
}

/// Leaf evaluator holding an opaque literal. Parsing the literal is the
/// consumer's concern.
#[derive(Debug)]
pub struct ConstantEvaluator {
    pub value_string: String,
}

/// A named placeholder that must be bound before the graph containing it
/// can be evaluated. Its own `arguments` are nested placeholders it is
/// declared over - they are not its delegates.
#[derive(Debug, Default)]
pub struct ArgumentEvaluator {
    pub arguments: HandleSet,
}

/// Externally-defined named behavior (an interpolator, a shape predicate).
/// Opaque to this crate apart from the arguments it is declared over.
#[derive(Debug, Default)]
pub struct ExternalEvaluator {
    pub arguments: HandleSet,
}

/// Delegation to another evaluator, with per-use argument bindings.
#[derive(Debug)]
pub struct ReferenceEvaluator {
    pub source: Handle,
    /// argument evaluator -> evaluator supplying its value in this context
    pub binds: SimpleMap<Handle, Handle>,
}

/// Evaluator backed by a stored parameter table. Its delegates are the
/// index evaluators of its data layout.
#[derive(Debug)]
pub struct ParameterEvaluator {
    pub description: DataDescription,
}

/// Per-index-value dispatch to a chosen evaluator, with an optional default
/// carried by the map itself.
#[derive(Debug)]
pub struct PiecewiseEvaluator {
    pub index: Handle,
    pub binds: SimpleMap<Handle, Handle>,
    pub evaluators: SimpleMap<i64, Handle>,
}

/// Per-component aggregation: same shape as piecewise, but the index is the
/// component ensemble and is bound by the iteration context itself.
#[derive(Debug)]
pub struct AggregateEvaluator {
    pub index: Handle,
    pub binds: SimpleMap<Handle, Handle>,
    pub evaluators: SimpleMap<i64, Handle>,
}

/// Array layout of a parameter evaluator's stored data.
#[derive(Debug, Default)]
pub enum DataDescription {
    #[default]
    Unknown,
    /// Fully dense array: one value per combination of the dense indexes.
    DenseArray {
        data: Option<Handle>,
        dense_indexes: Vec<Handle>,
    },
    /// Dictionary-of-keys layout: sparse index tuples come from `key_data`,
    /// the dense blocks they address from `value_data`.
    DokArray {
        key_data: Option<Handle>,
        value_data: Option<Handle>,
        sparse_indexes: Vec<Handle>,
        dense_indexes: Vec<Handle>,
    },
}

impl DataDescription {
    /// Index evaluators this layout references, sparse before dense.
    pub fn index_evaluators(&self) -> impl Iterator<Item = Handle> + '_ {
        let (sparse, dense): (&[Handle], &[Handle]) = match self {
            Self::Unknown => (&[], &[]),
            Self::DenseArray { dense_indexes, .. } => (&[], dense_indexes.as_slice()),
            Self::DokArray {
                sparse_indexes,
                dense_indexes,
                ..
            } => (sparse_indexes.as_slice(), dense_indexes.as_slice()),
        };
        sparse.iter().chain(dense.iter()).copied()
    }
}

impl Evaluator {
    pub fn constant(value_type: Handle, value_string: impl Into<String>) -> Self {
        Self {
            value_type,
            kind: EvaluatorKind::Constant(ConstantEvaluator {
                value_string: value_string.into(),
            }),
        }
    }

    pub fn argument(value_type: Handle) -> Self {
        Self {
            value_type,
            kind: EvaluatorKind::Argument(ArgumentEvaluator::default()),
        }
    }

    pub fn external(value_type: Handle) -> Self {
        Self {
            value_type,
            kind: EvaluatorKind::External(ExternalEvaluator::default()),
        }
    }

    pub fn reference(value_type: Handle, source: Handle) -> Self {
        Self {
            value_type,
            kind: EvaluatorKind::Reference(ReferenceEvaluator {
                source,
                binds: SimpleMap::new(),
            }),
        }
    }

    pub fn parameter(value_type: Handle) -> Self {
        Self {
            value_type,
            kind: EvaluatorKind::Parameter(ParameterEvaluator {
                description: DataDescription::Unknown,
            }),
        }
    }

    pub fn piecewise(value_type: Handle, index: Handle) -> Self {
        Self {
            value_type,
            kind: EvaluatorKind::Piecewise(PiecewiseEvaluator {
                index,
                binds: SimpleMap::new(),
                evaluators: SimpleMap::new(),
            }),
        }
    }

    pub fn aggregate(value_type: Handle, index: Handle) -> Self {
        Self {
            value_type,
            kind: EvaluatorKind::Aggregate(AggregateEvaluator {
                index,
                binds: SimpleMap::new(),
                evaluators: SimpleMap::new(),
            }),
        }
    }

    /// Insert this evaluator's direct delegate handles into `out`.
    ///
    /// Returns whether any were inserted - `false` for the pure leaves
    /// (constant, argument, external). Delegates are direct only; the
    /// transitive closure lives in the session resolver.
    pub fn add_delegates(&self, out: &mut HandleSet) -> bool {
        let before = out.len();
        match &self.kind {
            EvaluatorKind::Constant(_) => {}
            // an argument's declared arguments are placeholders, not delegates
            EvaluatorKind::Argument(_) => {}
            EvaluatorKind::External(_) => {}
            EvaluatorKind::Reference(r) => {
                out.insert(r.source);
                out.extend(r.binds.iter().map(|(_, v)| v));
            }
            EvaluatorKind::Parameter(p) => {
                out.extend(p.description.index_evaluators());
            }
            EvaluatorKind::Piecewise(p) => {
                out.extend(p.evaluators.iter().map(|(_, v)| v));
                out.extend(p.evaluators.default_value());
                out.insert(p.index);
                out.extend(p.binds.iter().map(|(_, v)| v));
            }
            EvaluatorKind::Aggregate(a) => {
                out.extend(a.evaluators.iter().map(|(_, v)| v));
                out.extend(a.evaluators.default_value());
                out.insert(a.index);
                out.extend(a.binds.iter().map(|(_, v)| v));
            }
        }
        out.len() > before
    }

    pub fn bind(&mut self, argument: Handle, source: Option<Handle>) -> Option<Handle> {
        match &mut self.kind {
            EvaluatorKind::Reference(r) => r.binds.set(argument, source),
            EvaluatorKind::Piecewise(p) => p.binds.set(argument, source),
            EvaluatorKind::Aggregate(a) => a.binds.set(argument, source),
            _ => None,
        }
    }

    pub fn binds(&self) -> Option<&SimpleMap<Handle, Handle>> {
        match &self.kind {
            EvaluatorKind::Reference(r) => Some(&r.binds),
            EvaluatorKind::Piecewise(p) => Some(&p.binds),
            EvaluatorKind::Aggregate(a) => Some(&a.binds),
            _ => None,
        }
    }
}
