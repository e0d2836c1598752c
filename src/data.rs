//! declared locations of raw array data
//!
//! A [`DataResource`] is a named byte container - an external file with a
//! declared format string, or inline text carried in the document itself.
//! A [`DataSource`] is a named rectangular view into one resource; several
//! sources may window the same resource. Neither knows how to perform I/O:
//! that is the [`io`](crate::io) layer's job, dispatched on the format.

use crate::Handle;

/// Format string of the built-in whitespace-token text backend.
pub const FORMAT_PLAIN_TEXT: &str = "PLAIN_TEXT";
/// Format strings the HDF5 backends answer to. No backend for these ships
/// with the crate; embedders register one at runtime.
pub const FORMAT_HDF5: &str = "HDF5";
pub const FORMAT_PHDF5: &str = "PHDF5";

/// A named byte container holding raw array data.
#[derive(Debug, Clone)]
pub struct DataResource {
    /// backend selector, e.g. `"PLAIN_TEXT"` or `"HDF5"`
    pub format: String,
    pub storage: ResourceStorage,
}

#[derive(Debug, Clone)]
pub enum ResourceStorage {
    /// External file, resolved relative to the owning region's root.
    Href { href: String },
    /// Text carried inline in the document.
    Inline { text: String },
}

impl DataResource {
    pub fn href(format: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            storage: ResourceStorage::Href { href: href.into() },
        }
    }

    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            format: FORMAT_PLAIN_TEXT.into(),
            storage: ResourceStorage::Inline { text: text.into() },
        }
    }

    /// Append to an inline resource's text. Appending to an href resource
    /// does nothing; whether that matters is the caller's to check.
    pub fn append_inline(&mut self, more: &str) {
        if let ResourceStorage::Inline { text } = &mut self.storage {
            text.push_str(more);
        }
    }
}

/// A rectangular view into one resource's raw array.
///
/// `raw_sizes` are the dimensions of the stored array itself; `offsets` and
/// `sizes` carve the window this source exposes. Slab requests against a
/// reader are relative to the window, not the raw array. `location` is
/// backend-specific addressing: a 1-based starting line number for the text
/// backend, a dataset path for HDF5.
#[derive(Debug, Clone)]
pub struct DataSource {
    pub resource: Handle,
    pub location: String,
    pub rank: usize,
    pub raw_sizes: Vec<usize>,
    pub offsets: Vec<usize>,
    pub sizes: Vec<usize>,
}

impl DataSource {
    /// A source exposing the whole raw array.
    pub fn whole(resource: Handle, location: impl Into<String>, raw_sizes: Vec<usize>) -> Self {
        let rank = raw_sizes.len();
        Self {
            resource,
            location: location.into(),
            rank,
            offsets: vec![0; rank],
            sizes: raw_sizes.clone(),
            raw_sizes,
        }
    }

    /// Restrict the exposed window. Lengths are validated when a reader or
    /// writer is opened, not here - construction stays permissive.
    pub fn with_window(mut self, offsets: Vec<usize>, sizes: Vec<usize>) -> Self {
        self.offsets = offsets;
        self.sizes = sizes;
        self
    }
}
