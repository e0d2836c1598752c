use derive_more::{Constructor, Display, From};

/// Errors of the array-I/O layer. Every variant maps into the 200 error
/// code band, distinct from the core band; 0 is reserved for success.
#[derive(Debug, thiserror::Error, From)]
pub enum IoError {
    #[error("An io error occured: `{0}`")]
    Io(std::io::Error),
    #[error("unsupported array format `{0}`")]
    UnsupportedFormat(String),
    #[error("{0}")]
    BadLocation(BadLocation),
    #[error("{0}")]
    RankMismatch(RankMismatch),
    #[error("{0}")]
    SlabOutOfBounds(SlabOutOfBounds),
    #[error("{0}")]
    BufferSize(BufferSize),
    #[error("{0}")]
    UnexpectedEof(UnexpectedEof),
    #[error("{0}")]
    MalformedData(MalformedData),
    #[error("{0}")]
    WriteOutOfSequence(WriteOutOfSequence),
    #[error("{0}")]
    PartialInnerSlab(PartialInnerSlab),
    #[error("writing to an inline resource is not supported")]
    #[from(ignore)]
    InlineWrite,
    #[error("resource is closed")]
    #[from(ignore)]
    ResourceClosed,
}

impl IoError {
    pub fn code(&self) -> u32 {
        match self {
            Self::Io(_) => 201,
            Self::UnsupportedFormat(_) => 202,
            Self::BadLocation(_) => 203,
            Self::RankMismatch(_) => 204,
            Self::SlabOutOfBounds(_) => 205,
            Self::BufferSize(_) => 206,
            Self::UnexpectedEof(_) => 207,
            Self::MalformedData(_) => 208,
            Self::WriteOutOfSequence(_) => 209,
            Self::PartialInnerSlab(_) => 210,
            Self::InlineWrite => 211,
            Self::ResourceClosed => 212,
        }
    }
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "data source location `{location}` is not a starting line number")]
pub struct BadLocation {
    location: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "slab rank mismatch: data source has rank {expected}, request has rank {actual}")]
pub struct RankMismatch {
    expected: usize,
    actual: usize,
}

#[derive(Display, Debug, Constructor)]
#[display(
    fmt = "slab overruns dimension {dim}: offset {offset} + size {size} exceeds extent {extent}"
)]
pub struct SlabOutOfBounds {
    dim: usize,
    offset: usize,
    size: usize,
    extent: usize,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "slab holds {expected} values but the buffer holds {actual}")]
pub struct BufferSize {
    expected: usize,
    actual: usize,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "data ended early: expected {expected} more token(s)")]
pub struct UnexpectedEof {
    expected: usize,
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "could not parse token `{token}`")]
pub struct MalformedData {
    token: String,
}

#[derive(Display, Debug, Constructor)]
#[display(
    fmt = "text output is sequential: expected outermost offset {expected}, got {actual}"
)]
pub struct WriteOutOfSequence {
    expected: usize,
    actual: usize,
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "text output writes whole inner slices: dimension {dim} is windowed")]
pub struct PartialInnerSlab {
    dim: usize,
}
