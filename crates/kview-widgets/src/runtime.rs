#![forbid(unsafe_code)]

//! The view runtime: interprets descriptor trees against live models.
//!
//! # Mount algorithm
//!
//! 1. Fetch the model's shared [`Observer`] from the registry.
//! 2. Use the parent's post-init queue for nested mounts, or a fresh one.
//! 3. Dispatch every descriptor in order; each builder appends output
//!    elements to a local buffer and teardowns to the new handle.
//! 4. Append the buffered elements to the container, in order.
//! 5. For root mounts only, drain the post-init queue.
//!
//! Nested mounts (single view, list elements, dialog and menu content)
//! pass the parent's queue down during the parent's build, so custom
//! initialisers run only once the whole outer tree is attached.
//!
//! # Invariants
//!
//! 1. One observer per state object, shared by every mounted view.
//! 2. A handle keeps its model alive until stopped. [`RuntimeHandle::stop`]
//!    is idempotent and runs DOM teardowns, then releases data
//!    subscriptions, then the model; a panicking teardown does not stop
//!    the others.
//! 3. Stopping a handle never evicts the observer; only
//!    [`Runtime::forget`] does.
//! 4. View lookup is first-registered-wins on the object's concrete type.
//!
//! # Failure Modes
//!
//! - Binding a non-configurable field fails the mount with
//!   [`ViewError::Observe`]; the partially built handle is stopped.
//! - Lookup misses inside nested nodes render nothing.

use std::any::type_name;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use kview_core::{Element, Event, EventKind, ListenerId, Surface, contain};
use kview_reactive::{
    BindingScope, Model, ModelRef, Observer, ObserverRegistry, State, Subscription, Value,
};

use crate::builder;
use crate::config::RuntimeConfig;
use crate::error::ViewError;
use crate::node::Node;
use crate::view::{ErasedView, TypedView, View};

// ---------------------------------------------------------------------------
// Mount targets
// ---------------------------------------------------------------------------

/// Where a root mount goes.
#[derive(Debug, Clone, PartialEq)]
pub enum MountTarget {
    /// Selector resolved against the surface.
    Selector(String),
    Element(Element),
}

impl From<&str> for MountTarget {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_owned())
    }
}

impl From<String> for MountTarget {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<Element> for MountTarget {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<&Element> for MountTarget {
    fn from(element: &Element) -> Self {
        Self::Element(element.clone())
    }
}

// ---------------------------------------------------------------------------
// Post-init queue
// ---------------------------------------------------------------------------

type Task = Box<dyn FnOnce()>;

/// Deferred callbacks that run once a root mount is fully attached.
#[derive(Clone, Default)]
pub(crate) struct PostInitQueue {
    tasks: Rc<RefCell<Vec<Task>>>,
}

impl PostInitQueue {
    pub(crate) fn push(&self, task: impl FnOnce() + 'static) {
        self.tasks.borrow_mut().push(Box::new(task));
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Run everything queued, including tasks queued while draining.
    pub(crate) fn drain(&self) -> usize {
        let mut ran = 0;
        loop {
            let batch = std::mem::take(&mut *self.tasks.borrow_mut());
            if batch.is_empty() {
                return ran;
            }
            for task in batch {
                contain("runtime.post_init", task);
                ran += 1;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// RuntimeHandle
// ---------------------------------------------------------------------------

struct HandleInner {
    view: &'static str,
    observer: Observer,
    model: RefCell<Option<ModelRef>>,
    elements: RefCell<Vec<Element>>,
    dom: RefCell<Vec<Task>>,
    data: RefCell<BindingScope>,
    stopped: Cell<bool>,
}

impl HandleInner {
    fn stop(&self) {
        if self.stopped.replace(true) {
            return;
        }
        let dom = std::mem::take(&mut *self.dom.borrow_mut());
        let dom_count = dom.len();
        for teardown in dom {
            contain("runtime.teardown", teardown);
        }
        let mut data = std::mem::take(&mut *self.data.borrow_mut());
        let data_count = data.binding_count();
        data.clear();
        let model = self.model.borrow_mut().take();
        drop(model);
        tracing::debug!(
            target: "kview::runtime",
            view = self.view,
            dom_count,
            data_count,
            "view stopped"
        );
    }
}

impl Drop for HandleInner {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A mounted view: its elements, data subscriptions and listener
/// teardowns.
///
/// Clones share the same mount. The mount is stopped by [`stop`](Self::stop)
/// or when the last clone is dropped.
#[derive(Clone)]
#[must_use = "dropping the last handle stops the view"]
pub struct RuntimeHandle {
    inner: Rc<HandleInner>,
}

/// Non-owning reference to a [`RuntimeHandle`].
#[derive(Clone)]
pub struct WeakRuntimeHandle(Weak<HandleInner>);

impl WeakRuntimeHandle {
    pub fn upgrade(&self) -> Option<RuntimeHandle> {
        self.0.upgrade().map(|inner| RuntimeHandle { inner })
    }
}

impl RuntimeHandle {
    fn new(view: &'static str, observer: Observer, model: ModelRef) -> Self {
        Self {
            inner: Rc::new(HandleInner {
                view,
                observer,
                model: RefCell::new(Some(model)),
                elements: RefCell::new(Vec::new()),
                dom: RefCell::new(Vec::new()),
                data: RefCell::new(BindingScope::new()),
                stopped: Cell::new(false),
            }),
        }
    }

    /// Type name of the mounted model.
    #[must_use]
    pub fn view_name(&self) -> &'static str {
        self.inner.view
    }

    /// The model's shared observer.
    #[must_use]
    pub fn observer(&self) -> &Observer {
        &self.inner.observer
    }

    /// The mounted model. Held until the view is stopped.
    #[must_use]
    pub fn model(&self) -> Option<ModelRef> {
        self.inner.model.borrow().clone()
    }

    /// Top-level elements produced by the mount, in order.
    #[must_use]
    pub fn elements(&self) -> Vec<Element> {
        self.inner.elements.borrow().clone()
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.get()
    }

    /// Live data subscriptions.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.inner.data.borrow().binding_count()
    }

    /// Pending DOM teardowns.
    #[must_use]
    pub fn teardown_count(&self) -> usize {
        self.inner.dom.borrow().len()
    }

    /// Run every teardown and release every subscription. Safe to call
    /// repeatedly.
    pub fn stop(&self) {
        self.inner.stop();
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakRuntimeHandle {
        WeakRuntimeHandle(Rc::downgrade(&self.inner))
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn hold(&self, sub: Subscription) {
        if self.is_stopped() {
            drop(sub);
            return;
        }
        self.inner.data.borrow_mut().hold(sub);
    }

    pub(crate) fn on_teardown(&self, teardown: impl FnOnce() + 'static) {
        if self.is_stopped() {
            contain("runtime.teardown", teardown);
            return;
        }
        self.inner.dom.borrow_mut().push(Box::new(teardown));
    }

    fn set_elements(&self, elements: Vec<Element>) {
        *self.inner.elements.borrow_mut() = elements;
    }
}

impl fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeHandle")
            .field("view", &self.inner.view)
            .field("elements", &self.inner.elements.borrow().len())
            .field("bindings", &self.binding_count())
            .field("teardowns", &self.teardown_count())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Build context
// ---------------------------------------------------------------------------

/// What a node builder works with while one descriptor tree is dispatched.
pub(crate) struct Ctx<'a, T: Model> {
    pub(crate) runtime: &'a Runtime,
    pub(crate) model: &'a Rc<T>,
    pub(crate) observer: &'a Observer,
    pub(crate) handle: &'a RuntimeHandle,
    pub(crate) post_inits: &'a PostInitQueue,
    out: &'a mut Vec<Element>,
}

impl<'a, T: Model> Ctx<'a, T> {
    /// Emit a top-level element for the current output buffer.
    pub(crate) fn add(&mut self, element: Element) {
        self.out.push(element);
    }

    /// Same context with a different output buffer.
    pub(crate) fn redirect<'b>(&'b self, out: &'b mut Vec<Element>) -> Ctx<'b, T> {
        Ctx {
            runtime: self.runtime,
            model: self.model,
            observer: self.observer,
            handle: self.handle,
            post_inits: self.post_inits,
            out,
        }
    }

    pub(crate) fn create(&self, tag: &str) -> Element {
        self.runtime.surface().create_element(tag)
    }

    pub(crate) fn state(&self) -> &State {
        self.model.state()
    }

    pub(crate) fn weak_model(&self) -> Weak<T> {
        Rc::downgrade(self.model)
    }

    pub(crate) fn config(&self) -> &RuntimeConfig {
        self.runtime.config()
    }

    /// Observe `field` for the life of the mount.
    pub(crate) fn observe(
        &self,
        field: &str,
        handler: impl Fn(&Value, &Value) + 'static,
    ) -> Result<(), ViewError> {
        let sub = self.observer.observe(field, handler)?;
        self.handle.hold(sub);
        Ok(())
    }

    /// Listen on `element` for the life of the mount.
    pub(crate) fn listen(
        &self,
        element: &Element,
        kind: EventKind,
        listener: impl Fn(&Event) + 'static,
    ) -> ListenerId {
        let id = element.add_listener(kind, listener);
        let weak = element.downgrade();
        self.handle.on_teardown(move || {
            if let Some(element) = weak.upgrade() {
                element.remove_listener(id);
            }
        });
        id
    }

    pub(crate) fn on_teardown(&self, teardown: impl FnOnce() + 'static) {
        self.handle.on_teardown(teardown);
    }
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

struct RootMount {
    container: Element,
    handle: RuntimeHandle,
}

struct RuntimeInner {
    surface: Surface,
    config: RuntimeConfig,
    views: RefCell<Vec<Rc<dyn ErasedView>>>,
    observers: ObserverRegistry,
    roots: RefCell<Vec<RootMount>>,
    boot_container: RefCell<Option<Element>>,
}

/// Registry of views plus the interpreter that mounts them.
///
/// Clones share the same runtime. Root mounts are owned by the runtime
/// until the container is mounted again, [`unmount`](Self::unmount)ed, or
/// the runtime is dropped.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

/// Non-owning reference to a [`Runtime`], held by node closures.
#[derive(Clone)]
pub(crate) struct WeakRuntime(Weak<RuntimeInner>);

impl WeakRuntime {
    pub(crate) fn upgrade(&self) -> Option<Runtime> {
        self.0.upgrade().map(|inner| Runtime { inner })
    }
}

impl Runtime {
    #[must_use]
    pub fn new(surface: Surface) -> Self {
        Self::with_config(surface, RuntimeConfig::default())
    }

    #[must_use]
    pub fn with_config(surface: Surface, config: RuntimeConfig) -> Self {
        Self {
            inner: Rc::new(RuntimeInner {
                surface,
                config,
                views: RefCell::new(Vec::new()),
                observers: ObserverRegistry::new(),
                roots: RefCell::new(Vec::new()),
                boot_container: RefCell::new(None),
            }),
        }
    }

    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.inner.surface
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    pub(crate) fn downgrade(&self) -> WeakRuntime {
        WeakRuntime(Rc::downgrade(&self.inner))
    }

    // --- view registry ---

    /// Define the descriptor tree for model type `T`.
    ///
    /// Views are matched in definition order; defining a second view for
    /// the same type leaves the first one in charge.
    pub fn define_view<T: Model>(&self, build: impl FnOnce(&mut View<T>)) -> &Self {
        let mut view = View::new();
        build(&mut view);
        let count = view.len();
        self.inner
            .views
            .borrow_mut()
            .push(Rc::new(TypedView::new(view)));
        tracing::debug!(
            target: "kview::runtime",
            view = type_name::<T>(),
            nodes = count,
            "view defined"
        );
        self
    }

    #[must_use]
    pub fn view_count(&self) -> usize {
        self.inner.views.borrow().len()
    }

    /// Whether `value` is an object some defined view targets.
    #[must_use]
    pub fn has_view_for(&self, value: &Value) -> bool {
        self.find_view_for(value).is_some()
    }

    pub(crate) fn find_view_for(&self, value: &Value) -> Option<Rc<dyn ErasedView>> {
        let model = value.as_object()?;
        self.find_view_for_model(model)
    }

    pub(crate) fn find_view_for_model(&self, model: &ModelRef) -> Option<Rc<dyn ErasedView>> {
        let target = model.type_id();
        self.inner
            .views
            .borrow()
            .iter()
            .find(|view| view.target() == target)
            .cloned()
    }

    // --- observers ---

    /// The shared observer for `state`, created on first request.
    pub fn observer_for(&self, state: &State) -> Observer {
        self.inner.observers.get_or_create(state)
    }

    #[must_use]
    pub fn has_observer(&self, state: &State) -> bool {
        self.inner.observers.has(state)
    }

    /// Restore every instrumented field of `state` and drop its observer.
    pub fn forget(&self, state: &State) -> bool {
        self.inner.observers.forget(state)
    }

    // --- mounting ---

    /// Mount the view for `model` into `target`, replacing its contents.
    ///
    /// The container becomes the boot container. A previous root mount in
    /// the same container is stopped.
    pub fn mount<T: Model>(
        &self,
        model: &Rc<T>,
        target: impl Into<MountTarget>,
    ) -> Result<RuntimeHandle, ViewError> {
        self.mount_model(&ModelRef::new(Rc::clone(model)), target)
    }

    /// [`mount`](Self::mount) for a type-erased model.
    pub fn mount_model(
        &self,
        model: &ModelRef,
        target: impl Into<MountTarget>,
    ) -> Result<RuntimeHandle, ViewError> {
        let container = self.resolve(target.into())?;
        self.mount_root(model, container)
    }

    /// Mount the view for `model` into the boot container, replacing
    /// whatever was shown there.
    pub fn boot_in_container(&self, model: &ModelRef) -> Result<RuntimeHandle, ViewError> {
        let container = self
            .inner
            .boot_container
            .borrow()
            .clone()
            .ok_or_else(|| ViewError::ContainerNotFound("boot container".to_owned()))?;
        self.mount_root(model, container)
    }

    /// Mount the view for `model` at the end of `container`, without
    /// clearing it. The caller owns the returned handle.
    pub fn mount_view(
        &self,
        model: &ModelRef,
        container: &Element,
    ) -> Result<RuntimeHandle, ViewError> {
        let view = self
            .find_view_for_model(model)
            .ok_or_else(|| ViewError::NoViewRegistered(model.type_name().to_owned()))?;
        view.mount(self, model, container, None)
    }

    /// Stop the root mount in `target`. Returns whether there was one.
    pub fn unmount(&self, target: impl Into<MountTarget>) -> bool {
        let Ok(container) = self.resolve(target.into()) else {
            return false;
        };
        let removed = {
            let mut roots = self.inner.roots.borrow_mut();
            let index = roots.iter().position(|root| root.container == container);
            index.map(|index| roots.remove(index))
        };
        match removed {
            Some(root) => {
                root.handle.stop();
                true
            }
            None => false,
        }
    }

    /// Container of the most recent root mount.
    #[must_use]
    pub fn boot_container(&self) -> Option<Element> {
        self.inner.boot_container.borrow().clone()
    }

    /// Handle of the root mount in `container`, if any.
    #[must_use]
    pub fn root_handle(&self, container: &Element) -> Option<RuntimeHandle> {
        self.inner
            .roots
            .borrow()
            .iter()
            .find(|root| &root.container == container)
            .map(|root| root.handle.clone())
    }

    fn resolve(&self, target: MountTarget) -> Result<Element, ViewError> {
        match target {
            MountTarget::Element(element) => Ok(element),
            MountTarget::Selector(selector) => self
                .inner
                .surface
                .query_selector(&selector)
                .ok_or(ViewError::ContainerNotFound(selector)),
        }
    }

    fn mount_root(&self, model: &ModelRef, container: Element) -> Result<RuntimeHandle, ViewError> {
        let view = self
            .find_view_for_model(model)
            .ok_or_else(|| ViewError::NoViewRegistered(model.type_name().to_owned()))?;

        *self.inner.boot_container.borrow_mut() = Some(container.clone());
        let previous = {
            let mut roots = self.inner.roots.borrow_mut();
            let index = roots.iter().position(|root| root.container == container);
            index.map(|index| roots.remove(index))
        };
        if let Some(previous) = previous {
            previous.handle.stop();
        }

        container.clear_children();
        let handle = view.mount(self, model, &container, None)?;
        self.inner.roots.borrow_mut().push(RootMount {
            container,
            handle: handle.clone(),
        });
        Ok(handle)
    }

    /// Mount whatever view matches `value` into `container`. `Ok(None)` for
    /// a lookup miss.
    pub(crate) fn mount_nested(
        &self,
        value: &Value,
        container: &Element,
        post_inits: Option<&PostInitQueue>,
    ) -> Result<Option<RuntimeHandle>, ViewError> {
        let (Some(model), Some(view)) = (value.as_object(), self.find_view_for(value)) else {
            return Ok(None);
        };
        view.mount(self, model, container, post_inits).map(Some)
    }

    pub(crate) fn mount_tree<T: Model>(
        &self,
        nodes: &[Node<T>],
        model: Rc<T>,
        container: &Element,
        parent_queue: Option<&PostInitQueue>,
    ) -> Result<RuntimeHandle, ViewError> {
        let observer = self.inner.observers.get_or_create(model.state());
        let handle = RuntimeHandle::new(
            type_name::<T>(),
            observer.clone(),
            ModelRef::new(Rc::clone(&model)),
        );

        let own_queue;
        let post_inits = match parent_queue {
            Some(queue) => queue,
            None => {
                own_queue = PostInitQueue::default();
                &own_queue
            }
        };

        let mut out = Vec::new();
        let built = {
            let mut ctx = Ctx {
                runtime: self,
                model: &model,
                observer: &observer,
                handle: &handle,
                post_inits,
                out: &mut out,
            };
            builder::build_nodes(nodes, &mut ctx)
        };
        if let Err(err) = built {
            handle.stop();
            return Err(err);
        }

        container.append_all(&out);
        let element_count = out.len();
        handle.set_elements(out);
        tracing::debug!(
            target: "kview::runtime",
            view = type_name::<T>(),
            elements = element_count,
            nested = parent_queue.is_some(),
            "view mounted"
        );

        if parent_queue.is_none() {
            let ran = post_inits.drain();
            if ran > 0 {
                tracing::trace!(target: "kview::runtime", ran, "post-inits drained");
            }
        }
        Ok(handle)
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let views: Vec<_> = self
            .inner
            .views
            .borrow()
            .iter()
            .map(|view| view.target_name())
            .collect();
        f.debug_struct("Runtime")
            .field("views", &views)
            .field("observers", &self.inner.observers.len())
            .field("roots", &self.inner.roots.borrow().len())
            .finish()
    }
}
