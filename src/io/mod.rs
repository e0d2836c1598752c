//! reading and writing raw array data behind a data source
//!
//! Readers and writers are opened through a [`BackendRegistry`] that
//! dispatches on the resource's declared format string. The registry ships
//! with the whitespace-token text backend; other backends (HDF5 and
//! friends) are registered at runtime by embedders, and an unrecognized
//! format is an ordinary runtime error, never a crash.
//!
//! All slab access is rank-aware: `offsets` and `sizes` arrays of length
//! equal to the data source's rank select a rectangular window, relative to
//! the window the source itself exposes.

mod error;
mod text;

pub use error::IoError;
pub use error::{
    BadLocation, BufferSize, MalformedData, PartialInnerSlab, RankMismatch, SlabOutOfBounds,
    UnexpectedEof, WriteOutOfSequence,
};
pub use text::TextBackend;

use crate::data::{DataResource, DataSource};

use std::path::Path;

use ndarray::{ArrayD, IxDyn};

/// Typed slab reads over one data source. Implementations own their
/// backing file or cursor and release it on [`close`](ArrayReader::close)
/// or drop, whichever comes first.
pub trait ArrayReader {
    fn read_int_slab(&mut self, offsets: &[usize], sizes: &[usize], out: &mut [i32])
        -> Result<(), IoError>;

    fn read_double_slab(
        &mut self,
        offsets: &[usize],
        sizes: &[usize],
        out: &mut [f64],
    ) -> Result<(), IoError>;

    fn read_boolean_slab(
        &mut self,
        offsets: &[usize],
        sizes: &[usize],
        out: &mut [bool],
    ) -> Result<(), IoError>;

    /// Release the backing resource. Idempotent: closing twice is a no-op
    /// success.
    fn close(&mut self) -> Result<(), IoError>;
}

/// Typed slab writes over one data source. Same ownership and close
/// semantics as [`ArrayReader`].
pub trait ArrayWriter {
    fn write_int_slab(&mut self, offsets: &[usize], sizes: &[usize], data: &[i32])
        -> Result<(), IoError>;

    fn write_double_slab(
        &mut self,
        offsets: &[usize],
        sizes: &[usize],
        data: &[f64],
    ) -> Result<(), IoError>;

    fn write_boolean_slab(
        &mut self,
        offsets: &[usize],
        sizes: &[usize],
        data: &[bool],
    ) -> Result<(), IoError>;

    /// Flush and release the backing resource. Idempotent.
    fn close(&mut self) -> Result<(), IoError>;
}

/// One array storage backend, answering to a format string.
pub trait ArrayBackend {
    fn format(&self) -> &str;

    fn open_reader(
        &self,
        root: &Path,
        source: &DataSource,
        resource: &DataResource,
    ) -> Result<Box<dyn ArrayReader>, IoError>;

    fn open_writer(
        &self,
        root: &Path,
        source: &DataSource,
        resource: &DataResource,
    ) -> Result<Box<dyn ArrayWriter>, IoError>;
}

/// Runtime strategy registry keyed by format string.
///
/// [`BackendRegistry::new`] registers the text backend; registering another
/// backend under the same format string replaces the old one.
pub struct BackendRegistry {
    backends: Vec<Box<dyn ArrayBackend>>,
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.backends.iter().map(|b| b.format()))
            .finish()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendRegistry {
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(TextBackend));
        registry
    }

    pub fn empty() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    pub fn register(&mut self, backend: Box<dyn ArrayBackend>) {
        self.backends.retain(|b| b.format() != backend.format());
        self.backends.push(backend);
    }

    fn backend(&self, format: &str) -> Result<&dyn ArrayBackend, IoError> {
        self.backends
            .iter()
            .map(|b| b.as_ref())
            .find(|b| b.format() == format)
            .ok_or_else(|| IoError::UnsupportedFormat(format.to_string()))
    }

    pub fn open_reader(
        &self,
        root: &Path,
        source: &DataSource,
        resource: &DataResource,
    ) -> Result<Box<dyn ArrayReader>, IoError> {
        self.backend(&resource.format)?.open_reader(root, source, resource)
    }

    pub fn open_writer(
        &self,
        root: &Path,
        source: &DataSource,
        resource: &DataResource,
    ) -> Result<Box<dyn ArrayWriter>, IoError> {
        self.backend(&resource.format)?.open_writer(root, source, resource)
    }
}

/// Shape a slab buffer into a caller-friendly container.
pub trait FromSlab<T>: Sized {
    fn from_slab(buffer: Vec<T>, sizes: &[usize]) -> Self;
}

impl<T> FromSlab<T> for Vec<T> {
    fn from_slab(buffer: Vec<T>, _sizes: &[usize]) -> Self {
        buffer
    }
}

impl<T> FromSlab<T> for ArrayD<T> {
    fn from_slab(buffer: Vec<T>, sizes: &[usize]) -> Self {
        // the slab contract guarantees buffer length == product of sizes
        Self::from_shape_vec(IxDyn(sizes), buffer).unwrap()
    }
}

/// Read a double slab into a freshly shaped [`ArrayD`].
pub fn read_double_array(
    reader: &mut dyn ArrayReader,
    offsets: &[usize],
    sizes: &[usize],
) -> Result<ArrayD<f64>, IoError> {
    let mut buffer = vec![0.0; sizes.iter().product()];
    reader.read_double_slab(offsets, sizes, &mut buffer)?;
    Ok(ArrayD::from_slab(buffer, sizes))
}

/// Validate a slab request against the window a source exposes. Shared by
/// backends so every one reports the same errors for the same misuse.
pub(crate) fn check_slab(
    rank: usize,
    window_sizes: &[usize],
    offsets: &[usize],
    sizes: &[usize],
    buffer_len: usize,
) -> Result<(), IoError> {
    if offsets.len() != rank || sizes.len() != rank {
        let actual = if offsets.len() != rank {
            offsets.len()
        } else {
            sizes.len()
        };
        return Err(RankMismatch::new(rank, actual).into());
    }
    for (dim, ((&offset, &size), &extent)) in
        offsets.iter().zip(sizes).zip(window_sizes).enumerate()
    {
        if offset + size > extent {
            return Err(SlabOutOfBounds::new(dim, offset, size, extent).into());
        }
    }
    let expected: usize = sizes.iter().product();
    if expected != buffer_len {
        return Err(BufferSize::new(expected, buffer_len).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FORMAT_PLAIN_TEXT;

    fn inline_source(text: &str, raw_sizes: Vec<usize>) -> (DataSource, DataResource) {
        let mut store = crate::ObjectStore::new();
        let resource_handle = store.add(crate::FieldmlObject::new(
            "r",
            crate::ObjectPayload::DataResource(DataResource::inline(text)),
        ));
        (
            DataSource::whole(resource_handle, "1", raw_sizes),
            DataResource::inline(text),
        )
    }

    #[test]
    fn unknown_format_is_a_creation_failure() {
        let registry = BackendRegistry::new();
        let (source, mut resource) = inline_source("1 2 3", vec![3]);
        resource.format = "NOT_A_FORMAT".into();

        let result = registry.open_reader(Path::new(""), &source, &resource);
        assert!(matches!(result, Err(IoError::UnsupportedFormat(_))));
    }

    #[test]
    fn registering_replaces_same_format() {
        let mut registry = BackendRegistry::new();
        registry.register(Box::new(TextBackend));
        assert_eq!(registry.backends.len(), 1);
        assert_eq!(registry.backends[0].format(), FORMAT_PLAIN_TEXT);
    }

    #[test]
    fn check_slab_reports_each_misuse_distinctly() {
        let window = [3, 4];

        assert!(matches!(
            check_slab(2, &window, &[0], &[1, 1], 1),
            Err(IoError::RankMismatch(_))
        ));
        assert!(matches!(
            check_slab(2, &window, &[2, 0], &[2, 1], 2),
            Err(IoError::SlabOutOfBounds(_))
        ));
        assert!(matches!(
            check_slab(2, &window, &[0, 0], &[2, 2], 3),
            Err(IoError::BufferSize(_))
        ));
        assert!(check_slab(2, &window, &[1, 1], &[2, 3], 6).is_ok());
    }

    #[test]
    fn from_slab_shapes_an_arrayd() {
        let arr: ArrayD<i32> = FromSlab::from_slab(vec![1, 2, 3, 4, 5, 6], &[2, 3]);
        assert_eq!(arr.shape(), &[2, 3]);
        assert_eq!(arr[[1, 2]], 6);
    }

    #[test]
    fn dispatch_uses_the_format_string_alone() {
        let registry = BackendRegistry::new();
        let (source, resource) = inline_source("1 2 3", vec![3]);
        assert!(registry
            .open_reader(Path::new(""), &source, &resource)
            .is_ok());
    }
}
