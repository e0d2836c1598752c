#![doc = include_str!("../README.md")]

pub mod bitset;
pub mod io;
pub mod map;
pub mod prelude;

mod data;
mod evaluator;
mod handle;
mod object;
mod region;
mod session;

pub use handle::Handle;
pub use handle::ObjectStore;

pub use bitset::SparseBitSet;
pub use map::SimpleMap;

pub use object::{ContinuousType, EnsembleType, Members, MeshType};
pub use object::{FieldmlObject, ObjectPayload, ObjectTag};

pub use evaluator::{
    AggregateEvaluator, ArgumentEvaluator, ConstantEvaluator, ExternalEvaluator,
    ParameterEvaluator, PiecewiseEvaluator, ReferenceEvaluator,
};
pub use evaluator::{DataDescription, Evaluator, EvaluatorKind, HandleSet};

pub use data::{DataResource, DataSource, ResourceStorage};
pub use data::{FORMAT_HDF5, FORMAT_PHDF5, FORMAT_PLAIN_TEXT};

pub use region::{ImportEntry, ImportSource, Region};

pub use session::{Arguments, CoreError, RegionId, Session, SessionHandle, SessionRegistry};
pub use session::{LIBRARY_HREF, LIBRARY_NAME};

pub use io::{ArrayBackend, ArrayReader, ArrayWriter, BackendRegistry};
pub use io::{FromSlab, IoError, TextBackend};

pub use ndarray;

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("object graph error: {0}")]
    Core(#[from] CoreError),
    #[error("array data error: {0}")]
    Io(#[from] IoError),
}

/// Code reserved for success across both error bands.
pub const NO_ERROR: u32 = 0;

impl Error {
    /// Error code in the reserved numeric bands: 100s for object-graph
    /// errors, 200s for array I/O, 0 for success.
    pub fn code(&self) -> u32 {
        match self {
            Self::Core(e) => e.code(),
            Self::Io(e) => e.code(),
        }
    }
}
