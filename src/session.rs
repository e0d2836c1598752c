//! sessions: the object store, regions, and the dependency resolver
//!
//! A [`Session`] owns one [`ObjectStore`], the regions populated into it,
//! the array-I/O backend registry, and an append-only error log. The two
//! resolver algorithms - transitive delegate closure and unbound-argument
//! computation - live here, walking the evaluator graph through the single
//! [`add_delegates`](crate::Evaluator::add_delegates) extension point.

use crate::evaluator::{Evaluator, EvaluatorKind, HandleSet};
use crate::handle::{Handle, ObjectStore};
use crate::io::{ArrayReader, ArrayWriter, BackendRegistry};
use crate::map::SimpleMap;
use crate::object::{ContinuousType, EnsembleType, FieldmlObject, ObjectPayload};
use crate::region::{ImportEntry, Region};
use crate::Error;

use std::path::Path;

use derive_more::{Constructor, Display, From};

/// Reserved href designating the built-in shared library region. Importing
/// it never touches the filesystem: the region is compiled in.
pub const LIBRARY_HREF: &str = "fieldml_library";
/// Name of the built-in library region.
pub const LIBRARY_NAME: &str = "library";

/// Index of one region within its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionId(usize);

/// Result of an argument resolution pass: every argument evaluator the
/// graph references, and the subset still unbound after binds are applied.
/// `unbound` is always a subset of `used`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Arguments {
    pub used: HandleSet,
    pub unbound: HandleSet,
}

/// Errors of the object-graph layer. Every variant maps into the 100 error
/// code band; 0 is reserved for success.
#[derive(Debug, thiserror::Error, From)]
pub enum CoreError {
    #[error("{0}")]
    CyclicDelegates(CyclicDelegates),
    #[error("{0}")]
    UnboundArguments(UnboundArguments),
    #[error("{0}")]
    RecursiveImport(RecursiveImport),
    #[error("{0}")]
    ImportFailed(ImportFailed),
    #[error("{0}")]
    DuplicateName(DuplicateName),
    #[error("{0}")]
    UnknownRegion(UnknownRegion),
    #[error("{0}")]
    WrongObjectKind(WrongObjectKind),
}

impl CoreError {
    pub fn code(&self) -> u32 {
        match self {
            Self::CyclicDelegates(_) => 101,
            Self::UnboundArguments(_) => 102,
            Self::RecursiveImport(_) => 103,
            Self::ImportFailed(_) => 104,
            Self::DuplicateName(_) => 105,
            Self::UnknownRegion(_) => 106,
            Self::WrongObjectKind(_) => 107,
        }
    }
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "cyclic delegate graph detected at evaluator `{evaluator}`")]
pub struct CyclicDelegates {
    evaluator: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "evaluator `{evaluator}` has unbound arguments: {arguments}")]
pub struct UnboundArguments {
    evaluator: String,
    arguments: String,
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "recursive import of `{href}`")]
pub struct RecursiveImport {
    href: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "import of `{href}` failed: {detail}")]
pub struct ImportFailed {
    href: String,
    detail: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "an object named `{name}` is already visible in region `{region}`")]
pub struct DuplicateName {
    name: String,
    region: String,
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "unknown region index {index}")]
pub struct UnknownRegion {
    index: usize,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "object {handle} is not a {expected}")]
pub struct WrongObjectKind {
    handle: String,
    expected: &'static str,
}

/// Log an error against the session with the reporting call site attached,
/// then hand the error back for propagation.
macro_rules! report {
    ($session:expr, $err:expr) => {{
        let err = $err;
        $session.log_error_at(err.code(), err.to_string(), file!(), line!());
        err
    }};
}

/// One model-editing session: the shared object store, its regions, the
/// backend registry, and the error log.
///
/// Sessions are single-threaded and carry no internal synchronization;
/// distinct sessions are fully independent.
#[derive(Debug)]
pub struct Session {
    store: ObjectStore,
    regions: Vec<Region>,
    /// hrefs currently mid-import, innermost last
    import_stack: Vec<String>,
    backends: BackendRegistry,
    last_code: u32,
    log: Vec<String>,
    debug: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            store: ObjectStore::new(),
            regions: Vec::new(),
            import_stack: Vec::new(),
            backends: BackendRegistry::new(),
            last_code: 0,
            log: Vec::new(),
            debug: false,
        }
    }

    /// When set, logged errors are additionally echoed as `tracing` events
    /// as they occur.
    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ObjectStore {
        &mut self.store
    }

    pub fn backends_mut(&mut self) -> &mut BackendRegistry {
        &mut self.backends
    }

    // ------------------------------------------------------------------
    // error log

    pub fn log_error_at(&mut self, code: u32, message: String, file: &'static str, line: u32) {
        if self.debug {
            tracing::error!(target: "fieldml", code, file, line, "{message}");
        }
        self.last_code = code;
        self.log.push(message);
    }

    /// Code of the most recently logged error, 0 when clear.
    pub fn last_error_code(&self) -> u32 {
        self.last_code
    }

    /// Human-readable messages in logging order.
    pub fn error_log(&self) -> &[String] {
        &self.log
    }

    pub fn clear_errors(&mut self) {
        self.last_code = 0;
        self.log.clear();
    }

    // ------------------------------------------------------------------
    // regions

    pub fn create_region(&mut self, name: impl Into<String>, href: impl Into<String>) -> RegionId {
        self.regions.push(Region::new(name, href));
        RegionId(self.regions.len() - 1)
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.0)
    }

    pub fn region_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.regions.get_mut(id.0)
    }

    pub fn regions(&self) -> impl Iterator<Item = RegionId> + '_ {
        (0..self.regions.len()).map(RegionId)
    }

    pub fn find_region(&self, href: &str, name: &str) -> Option<RegionId> {
        self.regions
            .iter()
            .position(|r| r.href == href && r.name == name)
            .map(RegionId)
    }

    /// Declare `object` in `region`. Fails if another object is already
    /// visible there under the same name.
    pub fn add_object(&mut self, region: RegionId, object: FieldmlObject) -> Result<Handle, CoreError> {
        let region_name = match self.regions.get(region.0) {
            Some(region_ref) => region_ref.name.clone(),
            None => {
                let unknown = CoreError::from(UnknownRegion::new(region.0));
                return Err(report!(self, unknown));
            }
        };

        if self.object_by_name(region, &object.name).is_some() {
            let duplicate = DuplicateName::new(object.name.clone(), region_name);
            return Err(report!(self, CoreError::DuplicateName(duplicate)));
        }

        let handle = self.store.add(object);
        self.regions[region.0].add_local(handle);
        Ok(handle)
    }

    /// Resolve a name visible in `region`: declared objects first, then
    /// import aliases, then dotted children of imported objects
    /// (`"alias.element"` finds the element type of an imported mesh).
    pub fn object_by_name(&self, region: RegionId, name: &str) -> Option<Handle> {
        let region_ref = self.region(region)?;

        region_ref
            .locals()
            .iter()
            .copied()
            .find(|&h| self.store.name(h) == Some(name))
            .or_else(|| region_ref.imported_by_name(name))
            .or_else(|| {
                let (prefix, suffix) = name.rsplit_once('.')?;
                let parent = region_ref.imported_by_name(prefix)?;
                let parent_name = self.store.name(parent)?;
                self.store.by_name(&format!("{parent_name}.{suffix}"))
            })
    }

    /// The name `handle` is visible under in `region`: its declared name
    /// for locals, its alias for imports, and the alias-shortened dotted
    /// name for virtual children of imported objects.
    pub fn local_name(&self, region: RegionId, handle: Handle) -> Option<String> {
        let region_ref = self.region(region)?;
        let object = self.store.get(handle)?;

        if region_ref.is_local(handle) {
            return Some(object.name.clone());
        }
        if let Some(alias) = region_ref.import_alias(handle) {
            return Some(alias.to_string());
        }

        let (parent, suffix) = object.name.rsplit_once('.')?;
        let parent_handle = self.store.by_name(parent)?;
        let alias = region_ref.import_alias(parent_handle)?;
        Some(format!("{alias}.{suffix}"))
    }

    /// Create a mesh type plus its two synthesized member types: the
    /// element ensemble `<name>.element` over `1..=element_count` and the
    /// `dimensions`-component chart type `<name>.chart`. Both children are
    /// virtual: resolvable, never serialized.
    pub fn create_mesh_type(
        &mut self,
        region: RegionId,
        name: &str,
        element_count: i64,
        dimensions: usize,
    ) -> Result<Handle, CoreError> {
        if self.object_by_name(region, name).is_some() {
            let region_name = self
                .region(region)
                .map(|r| r.name.clone())
                .unwrap_or_default();
            let duplicate = DuplicateName::new(name.to_string(), region_name);
            return Err(report!(self, CoreError::DuplicateName(duplicate)));
        }

        let element_type = self.add_object(
            region,
            FieldmlObject::synthetic(
                format!("{name}.element"),
                ObjectPayload::EnsembleType(EnsembleType::range(1, element_count, 1)),
            ),
        )?;
        let chart_type = self.add_object(
            region,
            FieldmlObject::synthetic(
                format!("{name}.chart"),
                ObjectPayload::ContinuousType(ContinuousType {
                    component_type: None,
                    component_count: dimensions,
                }),
            ),
        )?;

        self.add_object(
            region,
            FieldmlObject::new(
                name,
                ObjectPayload::MeshType(crate::object::MeshType {
                    element_type,
                    chart_type,
                    shapes: None,
                }),
            ),
        )
    }

    // ------------------------------------------------------------------
    // imports

    /// Resolve the region for `(href, name)`, loading it if necessary.
    ///
    /// `loader` performs the external document parse: it must create and
    /// populate a region for `href` (or fail). The built-in library href
    /// bypasses the loader entirely. An href already mid-resolution is a
    /// recursive import: the attempt fails and any partially created
    /// regions are discarded.
    pub fn import_region<F>(&mut self, href: &str, name: &str, loader: F) -> Result<RegionId, CoreError>
    where
        F: FnOnce(&mut Session) -> Result<RegionId, CoreError>,
    {
        if self.import_stack.iter().any(|h| h == href) {
            return Err(report!(self, CoreError::from(RecursiveImport::new(href.into()))));
        }
        if let Some(id) = self.find_region(href, name) {
            return Ok(id);
        }

        self.import_stack.push(href.to_string());
        let regions_before = self.regions.len();

        let result = if href == LIBRARY_HREF {
            self.build_library()
        } else {
            loader(self)
        };

        self.import_stack.pop();

        match result {
            Ok(id) => Ok(id),
            Err(err) => {
                // discard whatever the failed load half-built; the store is
                // an arena, so stray objects are unreachable but harmless
                self.regions.truncate(regions_before);
                Err(report!(self, err))
            }
        }
    }

    /// Import one object from an already-loaded region into `into` under
    /// `local_name`. The object stays owned by its declaring region; only
    /// an alias entry is added.
    pub fn add_import(
        &mut self,
        into: RegionId,
        href: &str,
        region_name: &str,
        local_name: &str,
        remote_name: &str,
    ) -> Result<Handle, CoreError> {
        let source_region = self.find_region(href, region_name).ok_or_else(|| {
            report!(
                self,
                CoreError::from(ImportFailed::new(href.into(), format!("region `{region_name}` is not loaded")))
            )
        })?;

        let handle = self.object_by_name(source_region, remote_name).ok_or_else(|| {
            report!(
                self,
                CoreError::from(ImportFailed::new(
                    href.into(),
                    format!("no object named `{remote_name}` in region `{region_name}`"),
                ))
            )
        })?;

        let region_ref = self
            .regions
            .get_mut(into.0)
            .ok_or_else(|| UnknownRegion::new(into.0))?;
        let source = region_ref.import_source(href, region_name);
        region_ref.add_import(
            source,
            ImportEntry::new(local_name.into(), remote_name.into(), handle),
        );
        Ok(handle)
    }

    /// Build the compiled-in shared library region: the boolean type, the
    /// 1D real chart type with its standard argument, and the standard
    /// unit interpolators declared over it.
    fn build_library(&mut self) -> Result<RegionId, CoreError> {
        let region = self.create_region(LIBRARY_NAME, LIBRARY_HREF);

        let boolean = self.add_object(region, FieldmlObject::new("boolean", ObjectPayload::BooleanType))?;
        let real = self.add_object(
            region,
            FieldmlObject::new("real.1d", ObjectPayload::ContinuousType(ContinuousType::scalar())),
        )?;

        let chart_argument = self.add_object(
            region,
            FieldmlObject::new("real.1d.argument", ObjectPayload::Evaluator(Evaluator::argument(real))),
        )?;

        for name in [
            "interpolator.1d.unit.linearLagrange",
            "interpolator.1d.unit.cubicHermite",
        ] {
            let mut interpolator = Evaluator::external(real);
            if let EvaluatorKind::External(external) = &mut interpolator.kind {
                external.arguments.insert(chart_argument);
            }
            self.add_object(region, FieldmlObject::new(name, ObjectPayload::Evaluator(interpolator)))?;
        }

        let mut line_shape = Evaluator::external(boolean);
        if let EvaluatorKind::External(external) = &mut line_shape.kind {
            external.arguments.insert(chart_argument);
        }
        self.add_object(
            region,
            FieldmlObject::new("shape.unit.line", ObjectPayload::Evaluator(line_shape)),
        )?;

        Ok(region)
    }

    // ------------------------------------------------------------------
    // resolver

    /// Every evaluator transitively reachable from `start` via delegate
    /// edges. `None` is a no-op success: optional evaluator fields use it
    /// as "unset". A handle that is missing or not an evaluator contributes
    /// nothing.
    ///
    /// Cycle policy: ancestor-only. The visit path is popped on return, so
    /// diamond-shaped sharing (one evaluator validly reached along two
    /// paths) is accepted; only a handle recurring on its own ancestor path
    /// aborts the whole computation - a cyclic evaluator graph is always an
    /// authoring error, and a partial result would hide it.
    pub fn delegate_evaluators(&mut self, start: Option<Handle>) -> Result<HandleSet, CoreError> {
        let mut out = HandleSet::new();
        let Some(start) = start else {
            return Ok(out);
        };
        let mut path = Vec::new();
        match delegates_into(&self.store, start, &mut path, &mut out) {
            Ok(()) => Ok(out),
            Err(err) => Err(report!(self, err)),
        }
    }

    /// Argument evaluators referenced by the graph under `handle`, and the
    /// subset left unbound after binds are applied. With `add_self`, an
    /// argument evaluator reports itself as used and unbound.
    pub fn arguments(&mut self, handle: Handle, add_self: bool) -> Result<Arguments, CoreError> {
        let mut result = Arguments::default();
        let mut path = Vec::new();
        match arguments_into(
            &self.store,
            handle,
            add_self,
            &mut path,
            &mut result.used,
            &mut result.unbound,
        ) {
            Ok(()) => Ok(result),
            Err(err) => Err(report!(self, err)),
        }
    }

    /// Check that `handle` is a directly-evaluable evaluator: all arguments
    /// its graph references are satisfied by binds. An unbound argument at
    /// top level is a configuration error, reported with the offending
    /// names.
    pub fn validate_top_level(&mut self, handle: Handle) -> Result<(), CoreError> {
        if self.store.evaluator(handle).is_none() {
            let wrong = WrongObjectKind::new(describe(&self.store, handle), "evaluator");
            return Err(report!(self, CoreError::WrongObjectKind(wrong)));
        }

        let arguments = self.arguments(handle, false)?;
        if arguments.unbound.is_empty() {
            return Ok(());
        }

        let names = arguments
            .unbound
            .iter()
            .map(|&h| describe(&self.store, h))
            .collect::<Vec<_>>()
            .join(", ");
        let unbound = UnboundArguments::new(describe(&self.store, handle), names);
        Err(report!(self, CoreError::UnboundArguments(unbound)))
    }

    // ------------------------------------------------------------------
    // array I/O

    /// Open a slab reader for a data-source object, dispatching on its
    /// resource's format string. Failures are logged and returned.
    pub fn open_reader(&mut self, region: RegionId, source: Handle) -> Result<Box<dyn ArrayReader>, Error> {
        match self.try_open_reader(region, source) {
            Ok(reader) => Ok(reader),
            Err(err) => {
                self.log_error_at(err.code(), err.to_string(), file!(), line!());
                Err(err)
            }
        }
    }

    /// Open a slab writer for a data-source object. Same dispatch and
    /// failure handling as [`open_reader`](Session::open_reader).
    pub fn open_writer(&mut self, region: RegionId, source: Handle) -> Result<Box<dyn ArrayWriter>, Error> {
        match self.try_open_writer(region, source) {
            Ok(writer) => Ok(writer),
            Err(err) => {
                self.log_error_at(err.code(), err.to_string(), file!(), line!());
                Err(err)
            }
        }
    }

    fn try_open_reader(&self, region: RegionId, source: Handle) -> Result<Box<dyn ArrayReader>, Error> {
        let (root, source_ref, resource) = self.io_target(region, source)?;
        Ok(self.backends.open_reader(root, source_ref, resource)?)
    }

    fn try_open_writer(&self, region: RegionId, source: Handle) -> Result<Box<dyn ArrayWriter>, Error> {
        let (root, source_ref, resource) = self.io_target(region, source)?;
        Ok(self.backends.open_writer(root, source_ref, resource)?)
    }

    fn io_target(
        &self,
        region: RegionId,
        source: Handle,
    ) -> Result<(&Path, &crate::DataSource, &crate::DataResource), CoreError> {
        let region_ref = self.region(region).ok_or_else(|| UnknownRegion::new(region.0))?;
        let source_ref = self
            .store
            .data_source(source)
            .ok_or_else(|| WrongObjectKind::new(describe(&self.store, source), "data source"))?;
        let resource = self.store.data_resource(source_ref.resource).ok_or_else(|| {
            WrongObjectKind::new(describe(&self.store, source_ref.resource), "data resource")
        })?;
        Ok((Path::new(&region_ref.root), source_ref, resource))
    }
}

/// Object name for diagnostics, falling back to the handle number.
fn describe(store: &ObjectStore, handle: Handle) -> String {
    store
        .name(handle)
        .map(str::to_string)
        .unwrap_or_else(|| handle.to_string())
}

fn delegates_into(
    store: &ObjectStore,
    handle: Handle,
    path: &mut Vec<Handle>,
    out: &mut HandleSet,
) -> Result<(), CoreError> {
    if path.contains(&handle) {
        return Err(CyclicDelegates::new(describe(store, handle)).into());
    }
    let Some(evaluator) = store.evaluator(handle) else {
        return Ok(());
    };

    let mut direct = HandleSet::new();
    if !evaluator.add_delegates(&mut direct) {
        return Ok(());
    }

    path.push(handle);
    for delegate in direct {
        if let Err(err) = delegates_into(store, delegate, path, out) {
            path.pop();
            return Err(err);
        }
        // a delegate joins the result only once its subtree succeeds
        out.insert(delegate);
    }
    path.pop();
    Ok(())
}

fn arguments_into(
    store: &ObjectStore,
    handle: Handle,
    add_self: bool,
    path: &mut Vec<Handle>,
    used: &mut HandleSet,
    unbound: &mut HandleSet,
) -> Result<(), CoreError> {
    if path.contains(&handle) {
        return Err(CyclicDelegates::new(describe(store, handle)).into());
    }
    let Some(evaluator) = store.evaluator(handle) else {
        return Ok(());
    };

    path.push(handle);
    let result = arguments_of(store, handle, evaluator, add_self, path, used, unbound);
    path.pop();
    result
}

fn arguments_of(
    store: &ObjectStore,
    handle: Handle,
    evaluator: &Evaluator,
    add_self: bool,
    path: &mut Vec<Handle>,
    used: &mut HandleSet,
    unbound: &mut HandleSet,
) -> Result<(), CoreError> {
    match &evaluator.kind {
        EvaluatorKind::Constant(_) => {}
        EvaluatorKind::Argument(argument) => {
            if add_self {
                used.insert(handle);
                unbound.insert(handle);
            }
            for &nested in &argument.arguments {
                used.insert(nested);
                unbound.insert(nested);
            }
        }
        // external evaluators are not bindable targets themselves
        EvaluatorKind::External(external) => {
            for &declared in &external.arguments {
                used.insert(declared);
                unbound.insert(declared);
            }
        }
        EvaluatorKind::Reference(reference) => {
            arguments_into(store, reference.source, true, path, used, unbound)?;
            merge_binds(store, &reference.binds, path, used, unbound)?;
        }
        EvaluatorKind::Parameter(parameter) => {
            for index in parameter.description.index_evaluators() {
                arguments_into(store, index, true, path, used, unbound)?;
            }
        }
        EvaluatorKind::Piecewise(piecewise) => {
            for (_, value) in piecewise.evaluators.iter() {
                arguments_into(store, value, true, path, used, unbound)?;
            }
            if let Some(default) = piecewise.evaluators.default_value() {
                arguments_into(store, default, true, path, used, unbound)?;
            }
            arguments_into(store, piecewise.index, true, path, used, unbound)?;
            used.insert(piecewise.index);
            merge_binds(store, &piecewise.binds, path, used, unbound)?;
        }
        EvaluatorKind::Aggregate(aggregate) => {
            for (_, value) in aggregate.evaluators.iter() {
                arguments_into(store, value, true, path, used, unbound)?;
            }
            if let Some(default) = aggregate.evaluators.default_value() {
                arguments_into(store, default, true, path, used, unbound)?;
            }
            arguments_into(store, aggregate.index, true, path, used, unbound)?;
            // the component index is supplied by the aggregation itself
            unbound.remove(&aggregate.index);
            used.insert(aggregate.index);
            merge_binds(store, &aggregate.binds, path, used, unbound)?;
        }
    }
    Ok(())
}

/// Fold a bind map into an in-progress argument resolution. A bind always
/// consumes its argument: the key leaves both outgoing sets, the supplying
/// evaluator's own arguments take its place, and the bound argument's
/// nested placeholders are satisfied along with it.
fn merge_binds(
    store: &ObjectStore,
    binds: &SimpleMap<Handle, Handle>,
    path: &mut Vec<Handle>,
    used: &mut HandleSet,
    unbound: &mut HandleSet,
) -> Result<(), CoreError> {
    for (argument, source) in binds.iter() {
        if unbound.contains(&argument) {
            arguments_into(store, source, true, path, used, unbound)?;
            if let Some(bound) = store.argument(argument) {
                for nested in &bound.arguments {
                    unbound.remove(nested);
                }
            }
        }
        unbound.remove(&argument);
        used.remove(&argument);
    }
    Ok(())
}

/// Slot table mapping small integer handles to live sessions, for embedders
/// exposing a flat handle-based API. Slots are nulled on close and never
/// reused, so a stale handle can only miss, not alias a newer session.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    slots: Vec<Option<Session>>,
}

/// Opaque reference to a session owned by a [`SessionRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHandle(u32);

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) -> SessionHandle {
        self.slots.push(Some(Session::new()));
        SessionHandle(self.slots.len() as u32 - 1)
    }

    pub fn get(&self, handle: SessionHandle) -> Option<&Session> {
        self.slots.get(handle.0 as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, handle: SessionHandle) -> Option<&mut Session> {
        self.slots.get_mut(handle.0 as usize)?.as_mut()
    }

    /// Destroy the session, freeing all regions and stored objects. Returns
    /// whether a live session occupied the slot.
    pub fn close(&mut self, handle: SessionHandle) -> bool {
        match self.slots.get_mut(handle.0 as usize) {
            Some(slot) => slot.take().is_some(),
            None => false,
        }
    }
}
