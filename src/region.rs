//! regions: named scopes of declared objects, composable via imports
//!
//! A region corresponds to one parsed document. It owns the handles of the
//! objects declared inside it and a list of named imports - aliases for
//! objects declared in other regions. Imported handles are shared
//! references into the session-wide store, never copies: an object is local
//! to exactly one region but may be visible in many.

use crate::Handle;

use derive_more::Constructor;

/// One namespace of declared objects.
#[derive(Debug)]
pub struct Region {
    pub name: String,
    /// location of the document this region was parsed from
    pub href: String,
    /// base path for resolving relative data-resource hrefs
    pub root: String,
    locals: Vec<Handle>,
    imports: Vec<ImportSource>,
}

/// One remote region imported from, with its alias entries.
#[derive(Debug)]
pub struct ImportSource {
    pub href: String,
    pub region_name: String,
    pub entries: Vec<ImportEntry>,
}

/// A single imported object: visible here as `local_name`, declared in the
/// remote region as `remote_name`.
#[derive(Debug, Constructor)]
pub struct ImportEntry {
    pub local_name: String,
    pub remote_name: String,
    pub handle: Handle,
}

impl Region {
    pub fn new(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
            root: String::new(),
            locals: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// Record a handle as declared in this region. Idempotent.
    pub fn add_local(&mut self, handle: Handle) {
        if !self.locals.contains(&handle) {
            self.locals.push(handle);
        }
    }

    pub fn is_local(&self, handle: Handle) -> bool {
        self.locals.contains(&handle)
    }

    /// Declared handles in declaration order.
    pub fn locals(&self) -> &[Handle] {
        &self.locals
    }

    /// Find or create the import source for `(href, region_name)`, returning
    /// its index.
    pub fn import_source(&mut self, href: &str, region_name: &str) -> usize {
        if let Some(i) = self
            .imports
            .iter()
            .position(|s| s.href == href && s.region_name == region_name)
        {
            return i;
        }
        self.imports.push(ImportSource {
            href: href.into(),
            region_name: region_name.into(),
            entries: Vec::new(),
        });
        self.imports.len() - 1
    }

    pub fn add_import(&mut self, source: usize, entry: ImportEntry) {
        if let Some(s) = self.imports.get_mut(source) {
            s.entries.push(entry);
        }
    }

    pub fn import_sources(&self) -> &[ImportSource] {
        &self.imports
    }

    /// Handle an import alias resolves to, if any.
    pub fn imported_by_name(&self, local_name: &str) -> Option<Handle> {
        self.imports
            .iter()
            .flat_map(|s| s.entries.iter())
            .find(|e| e.local_name == local_name)
            .map(|e| e.handle)
    }

    /// Alias an imported handle is visible under in this region.
    pub fn import_alias(&self, handle: Handle) -> Option<&str> {
        self.imports
            .iter()
            .flat_map(|s| s.entries.iter())
            .find(|e| e.handle == handle)
            .map(|e| e.local_name.as_str())
    }

    /// Whether the serializer for this region would emit the object: local
    /// and user-declared.
    pub fn is_serializable(&self, handle: Handle, is_virtual: bool) -> bool {
        self.is_local(handle) && !is_virtual
    }
}
