//! the object family stored in a session
//!
//! Every declared thing - types, data resources and sources, evaluators -
//! is one [`FieldmlObject`] in the session store. The payload is a closed
//! enum so the resolver's per-kind dispatch is checked for exhaustiveness
//! by the compiler instead of by runtime tag tests.

use crate::bitset::SparseBitSet;
use crate::data::{DataResource, DataSource};
use crate::evaluator::{Evaluator, EvaluatorKind};
use crate::Handle;

use derive_more::Display;

/// One named object owned by the session store.
///
/// `is_virtual` marks objects synthesized implicitly (a mesh's auto-created
/// element ensemble and chart type) rather than user-declared. It affects
/// only serialization visibility, never resolution.
#[derive(Debug)]
pub struct FieldmlObject {
    pub name: String,
    pub is_virtual: bool,
    pub payload: ObjectPayload,
}

impl FieldmlObject {
    pub fn new(name: impl Into<String>, payload: ObjectPayload) -> Self {
        Self {
            name: name.into(),
            is_virtual: false,
            payload,
        }
    }

    /// An implicitly synthesized object, hidden from serialization.
    pub fn synthetic(name: impl Into<String>, payload: ObjectPayload) -> Self {
        Self {
            name: name.into(),
            is_virtual: true,
            payload,
        }
    }

    pub fn tag(&self) -> ObjectTag {
        self.payload.tag()
    }
}

#[derive(Debug)]
pub enum ObjectPayload {
    BooleanType,
    ContinuousType(ContinuousType),
    EnsembleType(EnsembleType),
    MeshType(MeshType),
    DataResource(DataResource),
    DataSource(DataSource),
    Evaluator(Evaluator),
}

impl ObjectPayload {
    pub fn tag(&self) -> ObjectTag {
        match self {
            Self::BooleanType => ObjectTag::BooleanType,
            Self::ContinuousType(_) => ObjectTag::ContinuousType,
            Self::EnsembleType(_) => ObjectTag::EnsembleType,
            Self::MeshType(_) => ObjectTag::MeshType,
            Self::DataResource(_) => ObjectTag::DataResource,
            Self::DataSource(_) => ObjectTag::DataSource,
            Self::Evaluator(e) => match e.kind {
                EvaluatorKind::Constant(_) => ObjectTag::ConstantEvaluator,
                EvaluatorKind::Argument(_) => ObjectTag::ArgumentEvaluator,
                EvaluatorKind::External(_) => ObjectTag::ExternalEvaluator,
                EvaluatorKind::Reference(_) => ObjectTag::ReferenceEvaluator,
                EvaluatorKind::Parameter(_) => ObjectTag::ParameterEvaluator,
                EvaluatorKind::Piecewise(_) => ObjectTag::PiecewiseEvaluator,
                EvaluatorKind::Aggregate(_) => ObjectTag::AggregateEvaluator,
            },
        }
    }

    pub fn as_evaluator(&self) -> Option<&Evaluator> {
        match self {
            Self::Evaluator(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_ensemble(&self) -> Option<&EnsembleType> {
        match self {
            Self::EnsembleType(e) => Some(e),
            _ => None,
        }
    }
}

/// Kind tag of an object, used for filtered enumeration.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ObjectTag {
    #[display(fmt = "boolean type")]
    BooleanType,
    #[display(fmt = "continuous type")]
    ContinuousType,
    #[display(fmt = "ensemble type")]
    EnsembleType,
    #[display(fmt = "mesh type")]
    MeshType,
    #[display(fmt = "data resource")]
    DataResource,
    #[display(fmt = "data source")]
    DataSource,
    #[display(fmt = "constant evaluator")]
    ConstantEvaluator,
    #[display(fmt = "argument evaluator")]
    ArgumentEvaluator,
    #[display(fmt = "external evaluator")]
    ExternalEvaluator,
    #[display(fmt = "reference evaluator")]
    ReferenceEvaluator,
    #[display(fmt = "parameter evaluator")]
    ParameterEvaluator,
    #[display(fmt = "piecewise evaluator")]
    PiecewiseEvaluator,
    #[display(fmt = "aggregate evaluator")]
    AggregateEvaluator,
}

impl ObjectTag {
    pub fn is_evaluator(self) -> bool {
        matches!(
            self,
            Self::ConstantEvaluator
                | Self::ArgumentEvaluator
                | Self::ExternalEvaluator
                | Self::ReferenceEvaluator
                | Self::ParameterEvaluator
                | Self::PiecewiseEvaluator
                | Self::AggregateEvaluator
        )
    }
}

/// Real-valued type, optionally with a component ensemble for vector values.
#[derive(Debug, Clone)]
pub struct ContinuousType {
    pub component_type: Option<Handle>,
    pub component_count: usize,
}

impl ContinuousType {
    pub fn scalar() -> Self {
        Self {
            component_type: None,
            component_count: 1,
        }
    }

    pub fn with_components(component_type: Handle, component_count: usize) -> Self {
        Self {
            component_type: Some(component_type),
            component_count,
        }
    }
}

/// Discrete indexable type: element numbers, component numbers.
#[derive(Debug, Clone)]
pub struct EnsembleType {
    pub is_component: bool,
    pub members: Members,
}

impl EnsembleType {
    pub fn range(min: i64, max: i64, stride: i64) -> Self {
        Self {
            is_component: false,
            members: Members::Range { min, max, stride },
        }
    }
}

/// Member set of an ensemble type.
#[derive(Debug, Clone, Default)]
pub enum Members {
    #[default]
    Empty,
    /// Contiguous strided range, inclusive on both ends.
    Range {
        min: i64,
        max: i64,
        stride: i64,
    },
    /// Explicit sparse member list.
    List(SparseBitSet),
}

impl Members {
    pub fn count(&self) -> u64 {
        match self {
            Self::Empty => 0,
            Self::Range { min, max, stride } => {
                if max < min || *stride <= 0 {
                    0
                } else {
                    ((max - min) / stride + 1) as u64
                }
            }
            Self::List(bits) => bits.count(),
        }
    }

    pub fn contains(&self, member: i64) -> bool {
        match self {
            Self::Empty => false,
            Self::Range { min, max, stride } => {
                member >= *min && member <= *max && *stride > 0 && (member - min) % stride == 0
            }
            Self::List(bits) => member >= 0 && bits.get_bit(member as u64),
        }
    }
}

/// Mesh: an element ensemble paired with a per-element chart type.
///
/// Both member types are synthesized as virtual objects when the mesh is
/// created through [`Session::create_mesh_type`](crate::Session::create_mesh_type).
#[derive(Debug, Clone)]
pub struct MeshType {
    pub element_type: Handle,
    pub chart_type: Handle,
    /// boolean-valued evaluator describing element shapes, if declared
    pub shapes: Option<Handle>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_member_count() {
        assert_eq!(Members::Range { min: 1, max: 10, stride: 1 }.count(), 10);
        assert_eq!(Members::Range { min: 1, max: 10, stride: 3 }.count(), 4);
        assert_eq!(Members::Range { min: 5, max: 4, stride: 1 }.count(), 0);
        assert_eq!(Members::Empty.count(), 0);
    }

    #[test]
    fn range_membership() {
        let members = Members::Range { min: 2, max: 10, stride: 2 };
        assert!(members.contains(2));
        assert!(members.contains(10));
        assert!(!members.contains(5));
        assert!(!members.contains(12));
    }

    #[test]
    fn list_members_use_the_bitset() {
        let members = Members::List([5, 300].into_iter().collect());
        assert_eq!(members.count(), 2);
        assert!(members.contains(300));
        assert!(!members.contains(-1));
    }
}
