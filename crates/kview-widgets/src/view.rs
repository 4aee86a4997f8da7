#![forbid(unsafe_code)]

//! Fluent construction of a node descriptor tree.
//!
//! A [`View<T>`] accumulates [`Node`]s into an ordered list. Entering a flow
//! pushes a fresh accumulation target; leaving it pops back to the parent
//! list, so nested layout reads top to bottom without the caller building
//! child vectors by hand:
//!
//! ```ignore
//! runtime.define_view::<Counter>(|v| {
//!     v.flow(FlowNode::row().gap(8), |v| {
//!         v.input(InputNode::new("count").update(Counter::recompute));
//!         v.button(ButtonNode::new("+1", Counter::increment));
//!     })
//!     .label(LabelNode::new("summary"));
//! });
//! ```

use std::any::{TypeId, type_name};
use std::fmt;
use std::rc::Rc;

use kview_core::Element;
use kview_reactive::{Model, ModelRef};

use crate::error::ViewError;
use crate::node::{
    BootNode, ButtonNode, CustomNode, FlowNode, ImageNode, InputNode, LabelNode, ListNode,
    ModalNode, Node, SelectNode, SingleNode,
};
use crate::runtime::{PostInitQueue, Runtime, RuntimeHandle};

/// Builder for the descriptor tree of one model type.
pub struct View<T> {
    root: Vec<Node<T>>,
    stack: Vec<Vec<Node<T>>>,
}

impl<T> Default for View<T> {
    fn default() -> Self {
        Self {
            root: Vec::new(),
            stack: Vec::new(),
        }
    }
}

impl<T> View<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn cursor(&mut self) -> &mut Vec<Node<T>> {
        match self.stack.last_mut() {
            Some(children) => children,
            None => &mut self.root,
        }
    }

    /// Append any descriptor at the current position.
    pub fn node(&mut self, node: Node<T>) -> &mut Self {
        self.cursor().push(node);
        self
    }

    pub fn input(&mut self, node: InputNode<T>) -> &mut Self {
        self.node(Node::Input(node))
    }

    pub fn button(&mut self, node: ButtonNode<T>) -> &mut Self {
        self.node(Node::Button(node))
    }

    pub fn label(&mut self, node: LabelNode) -> &mut Self {
        self.node(Node::Label(node))
    }

    pub fn image(&mut self, node: ImageNode) -> &mut Self {
        self.node(Node::Image(node))
    }

    pub fn select(&mut self, node: SelectNode<T>) -> &mut Self {
        self.node(Node::Select(node))
    }

    /// Append a flow whose children are the descriptors `children` adds.
    pub fn flow(&mut self, mut node: FlowNode<T>, children: impl FnOnce(&mut Self)) -> &mut Self {
        self.stack.push(Vec::new());
        children(self);
        node.children.extend(self.stack.pop().unwrap_or_default());
        self.node(Node::Flow(node))
    }

    pub fn single(&mut self, node: SingleNode) -> &mut Self {
        self.node(Node::Single(node))
    }

    pub fn list(&mut self, node: ListNode) -> &mut Self {
        self.node(Node::List(node))
    }

    pub fn dialog(&mut self, node: ModalNode<T>) -> &mut Self {
        self.node(Node::Dialog(node))
    }

    pub fn menu(&mut self, node: ModalNode<T>) -> &mut Self {
        self.node(Node::Menu(node))
    }

    pub fn custom(&mut self, node: CustomNode<T>) -> &mut Self {
        self.node(Node::Custom(node))
    }

    pub fn boot(&mut self, node: BootNode<T>) -> &mut Self {
        self.node(Node::Boot(node))
    }

    /// Top-level descriptors built so far.
    #[must_use]
    pub fn tree(&self) -> &[Node<T>] {
        &self.root
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.root.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub(crate) fn into_tree(self) -> Vec<Node<T>> {
        self.root
    }
}

impl<T> fmt::Debug for View<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("target", &type_name::<T>())
            .field("tree", &self.root)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Type-erased registry entries
// ---------------------------------------------------------------------------

/// A defined view with its model type erased, as stored by the runtime.
pub(crate) trait ErasedView {
    fn target(&self) -> TypeId;
    fn target_name(&self) -> &'static str;
    fn mount(
        &self,
        runtime: &Runtime,
        model: &ModelRef,
        container: &Element,
        post_inits: Option<&PostInitQueue>,
    ) -> Result<RuntimeHandle, ViewError>;
}

pub(crate) struct TypedView<T> {
    nodes: Vec<Node<T>>,
}

impl<T> TypedView<T> {
    pub(crate) fn new(view: View<T>) -> Self {
        Self {
            nodes: view.into_tree(),
        }
    }
}

impl<T: Model> ErasedView for TypedView<T> {
    fn target(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn target_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn mount(
        &self,
        runtime: &Runtime,
        model: &ModelRef,
        container: &Element,
        post_inits: Option<&PostInitQueue>,
    ) -> Result<RuntimeHandle, ViewError> {
        let model: Rc<T> = model.downcast::<T>().ok_or(ViewError::ModelTypeMismatch {
            expected: type_name::<T>(),
        })?;
        runtime.mount_tree(&self.nodes, model, container, post_inits)
    }
}
