//! Common traits and types that are useful for working with `fieldml`
#![allow(unused_imports)]

pub use crate::{Error, Handle, HandleSet, ObjectStore};

pub use crate::{SimpleMap, SparseBitSet};

pub use crate::{ContinuousType, EnsembleType, Members, MeshType};
pub use crate::{FieldmlObject, ObjectPayload, ObjectTag};

pub use crate::{DataDescription, Evaluator, EvaluatorKind};

pub use crate::{DataResource, DataSource, ResourceStorage};

pub use crate::{Arguments, CoreError, Region, RegionId, Session, SessionRegistry};

pub use crate::io::{ArrayBackend, ArrayReader, ArrayWriter, BackendRegistry, FromSlab, IoError};
