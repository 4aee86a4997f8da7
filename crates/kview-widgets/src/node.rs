#![forbid(unsafe_code)]

//! Node descriptors.
//!
//! A [`Node`] is one declarative instruction: which element to create, which
//! fields of the model drive it, and which model methods user interaction
//! calls. Fields are referenced by name; methods are typed closures over the
//! model type `T`, so a method that does not exist on `T` does not compile.
//!
//! Descriptors are built once per model type (see [`View`](crate::View)),
//! shared by every mounted instance, and never mutated after the view is
//! defined.
//!
//! # Example
//!
//! ```ignore
//! let save = ButtonNode::new("Save", |m: &Editor| m.save())
//!     .id("save")
//!     .class("primary wide")
//!     .enable("dirty");
//! ```

use std::fmt;
use std::rc::Rc;

use kview_core::{Element, format_number};
use kview_reactive::{ModelRef, Value};

use crate::error::ViewError;

/// A zero-argument model method.
pub type Method<T> = Rc<dyn Fn(&T)>;
/// Per-item display function for choice lists.
pub type DisplayFn<T> = Rc<dyn Fn(&T, &Value) -> String>;
/// Model method producing a custom element.
pub type ElementFactory<T> = Rc<dyn Fn(&T) -> Result<Element, ViewError>>;
/// Model method producing an object to boot. `Ok(None)` means "nothing".
pub type ModelFactory<T> = Rc<dyn Fn(&T) -> Result<Option<ModelRef>, ViewError>>;

// ---------------------------------------------------------------------------
// Shared option types
// ---------------------------------------------------------------------------

/// A width or height: pixels, or any CSS length verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Length {
    Px(f64),
    Css(String),
}

impl Length {
    /// CSS text for this length.
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Px(n) => format!("{}px", format_number(*n)),
            Self::Css(text) => text.clone(),
        }
    }
}

impl From<f64> for Length {
    fn from(n: f64) -> Self {
        Self::Px(n)
    }
}

impl From<i32> for Length {
    fn from(n: i32) -> Self {
        Self::Px(f64::from(n))
    }
}

impl From<u32> for Length {
    fn from(n: u32) -> Self {
        Self::Px(f64::from(n))
    }
}

impl From<&str> for Length {
    fn from(text: &str) -> Self {
        Self::Css(text.to_owned())
    }
}

impl From<String> for Length {
    fn from(text: String) -> Self {
        Self::Css(text)
    }
}

/// How a button or trigger renders its label source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentType {
    /// Plain text.
    #[default]
    Text,
    /// Raw markup.
    Html,
    /// An image whose URL is the label source.
    Image,
}

/// Control type of an input node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputType {
    /// Guess from the field's value at mount time.
    #[default]
    Auto,
    Text,
    Number,
    Checkbox,
}

/// Selection mode of a choice list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectMode {
    /// One visible row, single selection.
    Dropdown,
    /// Several visible rows, single selection.
    #[default]
    List,
    /// Several visible rows, multiple selection.
    MultiList,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    Row,
    #[default]
    Column,
}

impl Orientation {
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Column => "column",
        }
    }
}

/// Cross-axis alignment of flex children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Start,
    Center,
    End,
    Stretch,
}

impl Align {
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Start => "flex-start",
            Self::Center => "center",
            Self::End => "flex-end",
            Self::Stretch => "stretch",
        }
    }
}

/// Main-axis distribution of flex children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

impl Justify {
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Start => "flex-start",
            Self::Center => "center",
            Self::End => "flex-end",
            Self::SpaceBetween => "space-between",
            Self::SpaceAround => "space-around",
            Self::SpaceEvenly => "space-evenly",
        }
    }
}

/// A fixed string or the name of a string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caption {
    Text(String),
    Field(String),
}

/// Options every node kind accepts. `visible` and `enable` name boolean
/// fields; nodes without a single interactive element ignore them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Common {
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub visible: Option<String>,
    pub enable: Option<String>,
}

/// Layout options shared by flow containers and lists of views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlexLayout {
    pub orientation: Orientation,
    pub gap: Option<Length>,
    pub align: Option<Align>,
    pub justify: Option<Justify>,
    pub wrap: bool,
    pub style: Vec<(String, String)>,
    pub panel: bool,
}

macro_rules! identity_setters {
    () => {
        /// Element id.
        #[must_use]
        pub fn id(mut self, id: impl Into<String>) -> Self {
            self.common.id = Some(id.into());
            self
        }

        /// Add classes from a whitespace-separated string.
        #[must_use]
        pub fn class(mut self, classes: &str) -> Self {
            self.common
                .classes
                .extend(classes.split_whitespace().map(str::to_owned));
            self
        }

        /// Add classes from a list.
        #[must_use]
        pub fn classes<I, S>(mut self, classes: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.common
                .classes
                .extend(classes.into_iter().map(Into::into));
            self
        }

        #[must_use]
        pub fn width(mut self, width: impl Into<Length>) -> Self {
            self.common.width = Some(width.into());
            self
        }

        #[must_use]
        pub fn height(mut self, height: impl Into<Length>) -> Self {
            self.common.height = Some(height.into());
            self
        }
    };
}

macro_rules! toggle_setters {
    () => {
        /// Boolean field driving visibility.
        #[must_use]
        pub fn visible(mut self, field: impl Into<String>) -> Self {
            self.common.visible = Some(field.into());
            self
        }

        /// Boolean field driving the enabled state.
        #[must_use]
        pub fn enable(mut self, field: impl Into<String>) -> Self {
            self.common.enable = Some(field.into());
            self
        }
    };
}

macro_rules! layout_setters {
    () => {
        #[must_use]
        pub fn orientation(mut self, orientation: Orientation) -> Self {
            self.layout.orientation = orientation;
            self
        }

        #[must_use]
        pub fn gap(mut self, gap: impl Into<Length>) -> Self {
            self.layout.gap = Some(gap.into());
            self
        }

        #[must_use]
        pub fn align(mut self, align: Align) -> Self {
            self.layout.align = Some(align);
            self
        }

        #[must_use]
        pub fn justify(mut self, justify: Justify) -> Self {
            self.layout.justify = Some(justify);
            self
        }

        #[must_use]
        pub fn wrap(mut self, wrap: bool) -> Self {
            self.layout.wrap = wrap;
            self
        }

        /// Extra inline style on the container.
        #[must_use]
        pub fn style(mut self, property: &str, value: &str) -> Self {
            self.layout
                .style
                .push((property.to_owned(), value.to_owned()));
            self
        }

        /// Add the `panel` class.
        #[must_use]
        pub fn panel(mut self, panel: bool) -> Self {
            self.layout.panel = panel;
            self
        }
    };
}

// ---------------------------------------------------------------------------
// Leaf nodes
// ---------------------------------------------------------------------------

/// Two-way bound form control.
pub struct InputNode<T> {
    pub common: Common,
    pub name: String,
    pub update: Option<Method<T>>,
    pub label: Option<String>,
    pub input_type: InputType,
    pub muted: bool,
}

impl<T> InputNode<T> {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: Common::default(),
            name: name.into(),
            update: None,
            label: None,
            input_type: InputType::Auto,
            muted: false,
        }
    }

    identity_setters!();
    toggle_setters!();

    /// Method called after every write-back.
    #[must_use]
    pub fn update(mut self, update: impl Fn(&T) + 'static) -> Self {
        self.update = Some(Rc::new(update));
        self
    }

    /// Text shown before the control.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    /// Write back silently and run `update` with every field muted.
    #[must_use]
    pub fn muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }
}

/// A button running a model action.
///
/// With a [`Caption::Text`] label the button shows that text, unless a
/// non-text content type is set, in which case the optional `name` field
/// supplies the markup or image URL. With a [`Caption::Field`] label the
/// content comes from `name`, or else from the label field itself.
pub struct ButtonNode<T> {
    pub common: Common,
    pub caption: Caption,
    pub action: Method<T>,
    pub muted: bool,
    pub content: ContentType,
    pub name: Option<String>,
}

impl<T> ButtonNode<T> {
    /// Button with a fixed label.
    #[must_use]
    pub fn new(label: impl Into<String>, action: impl Fn(&T) + 'static) -> Self {
        Self::with_caption(Caption::Text(label.into()), action)
    }

    /// Button whose label is read from a string field.
    #[must_use]
    pub fn bound(label_field: impl Into<String>, action: impl Fn(&T) + 'static) -> Self {
        Self::with_caption(Caption::Field(label_field.into()), action)
    }

    fn with_caption(caption: Caption, action: impl Fn(&T) + 'static) -> Self {
        Self {
            common: Common::default(),
            caption,
            action: Rc::new(action),
            muted: false,
            content: ContentType::Text,
            name: None,
        }
    }

    identity_setters!();
    toggle_setters!();

    /// Run the action with every field muted.
    #[must_use]
    pub fn muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    #[must_use]
    pub fn content(mut self, content: ContentType) -> Self {
        self.content = content;
        self
    }

    /// String field holding the markup or image URL.
    #[must_use]
    pub fn name(mut self, field: impl Into<String>) -> Self {
        self.name = Some(field.into());
        self
    }
}

/// One-way text projection.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelNode {
    pub common: Common,
    pub caption: Caption,
}

impl LabelNode {
    /// Label showing a string field.
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            common: Common::default(),
            caption: Caption::Field(field.into()),
        }
    }

    /// Label showing fixed text.
    #[must_use]
    pub fn fixed(text: impl Into<String>) -> Self {
        Self {
            common: Common::default(),
            caption: Caption::Text(text.into()),
        }
    }

    identity_setters!();
    toggle_setters!();
}

/// Image whose URL is a string field.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageNode {
    pub common: Common,
    pub url: String,
    pub alt: Option<String>,
}

impl ImageNode {
    #[must_use]
    pub fn new(url_field: impl Into<String>) -> Self {
        Self {
            common: Common::default(),
            url: url_field.into(),
            alt: None,
        }
    }

    identity_setters!();
    toggle_setters!();

    #[must_use]
    pub fn alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }
}

/// Choice list over a list field with a separate selected-indices field.
pub struct SelectNode<T> {
    pub common: Common,
    pub list: String,
    pub display: Option<DisplayFn<T>>,
    pub selection: String,
    pub update: Option<Method<T>>,
    pub mode: SelectMode,
    pub muted: bool,
}

impl<T> SelectNode<T> {
    #[must_use]
    pub fn new(list: impl Into<String>, selection: impl Into<String>) -> Self {
        Self {
            common: Common::default(),
            list: list.into(),
            display: None,
            selection: selection.into(),
            update: None,
            mode: SelectMode::List,
            muted: false,
        }
    }

    identity_setters!();
    toggle_setters!();

    /// Option text for one item. Items display as their string form when
    /// unset or when the function panics.
    #[must_use]
    pub fn display(mut self, display: impl Fn(&T, &Value) -> String + 'static) -> Self {
        self.display = Some(Rc::new(display));
        self
    }

    #[must_use]
    pub fn update(mut self, update: impl Fn(&T) + 'static) -> Self {
        self.update = Some(Rc::new(update));
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: SelectMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// Flex container around a fixed set of child descriptors.
pub struct FlowNode<T> {
    pub common: Common,
    pub layout: FlexLayout,
    pub children: Vec<Node<T>>,
}

impl<T> Default for FlowNode<T> {
    fn default() -> Self {
        Self {
            common: Common::default(),
            layout: FlexLayout::default(),
            children: Vec::new(),
        }
    }
}

impl<T> FlowNode<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn row() -> Self {
        Self::default().orientation(Orientation::Row)
    }

    #[must_use]
    pub fn column() -> Self {
        Self::default()
    }

    identity_setters!();
    layout_setters!();
}

/// Nested view of whatever object a field holds.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleNode {
    pub common: Common,
    pub name: String,
}

impl SingleNode {
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            common: Common::default(),
            name: field.into(),
        }
    }

    identity_setters!();
}

/// One nested view per object of a list field.
#[derive(Debug, Clone, PartialEq)]
pub struct ListNode {
    pub common: Common,
    pub list: String,
    pub layout: FlexLayout,
    pub element_style: Vec<(String, String)>,
    pub element_width: Option<Length>,
    pub element_height: Option<Length>,
}

impl ListNode {
    /// List of views; wraps by default.
    #[must_use]
    pub fn new(list: impl Into<String>) -> Self {
        Self {
            common: Common::default(),
            list: list.into(),
            layout: FlexLayout {
                wrap: true,
                ..FlexLayout::default()
            },
            element_style: Vec::new(),
            element_width: None,
            element_height: None,
        }
    }

    identity_setters!();
    layout_setters!();

    /// Inline style on each element wrapper.
    #[must_use]
    pub fn element_style(mut self, property: &str, value: &str) -> Self {
        self.element_style
            .push((property.to_owned(), value.to_owned()));
        self
    }

    #[must_use]
    pub fn element_width(mut self, width: impl Into<Length>) -> Self {
        self.element_width = Some(width.into());
        self
    }

    #[must_use]
    pub fn element_height(mut self, height: impl Into<Length>) -> Self {
        self.element_height = Some(height.into());
        self
    }
}

/// A trigger button opening a dialog or menu around the view of the object
/// a field holds.
///
/// `width` and `height` size the dialog or menu panel; the trigger has its
/// own `button_width` and `button_height`. Unset `close_on_escape` and
/// `modal` fall back to the runtime config.
pub struct ModalNode<T> {
    pub common: Common,
    pub name: String,
    pub label: String,
    pub content: ContentType,
    pub button_width: Option<Length>,
    pub button_height: Option<Length>,
    pub close_on_backdrop: bool,
    pub close_on_escape: Option<bool>,
    pub modal: Option<bool>,
    pub action: Option<Method<T>>,
}

impl<T> ModalNode<T> {
    #[must_use]
    pub fn new(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            common: Common::default(),
            name: field.into(),
            label: label.into(),
            content: ContentType::Text,
            button_width: None,
            button_height: None,
            close_on_backdrop: false,
            close_on_escape: None,
            modal: None,
            action: None,
        }
    }

    identity_setters!();
    toggle_setters!();

    /// How the trigger renders `label`.
    #[must_use]
    pub fn content(mut self, content: ContentType) -> Self {
        self.content = content;
        self
    }

    #[must_use]
    pub fn button_width(mut self, width: impl Into<Length>) -> Self {
        self.button_width = Some(width.into());
        self
    }

    #[must_use]
    pub fn button_height(mut self, height: impl Into<Length>) -> Self {
        self.button_height = Some(height.into());
        self
    }

    #[must_use]
    pub fn close_on_backdrop(mut self, close: bool) -> Self {
        self.close_on_backdrop = close;
        self
    }

    #[must_use]
    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.close_on_escape = Some(close);
        self
    }

    #[must_use]
    pub fn modal(mut self, modal: bool) -> Self {
        self.modal = Some(modal);
        self
    }

    /// Method run on open, before the field is read.
    #[must_use]
    pub fn action(mut self, action: impl Fn(&T) + 'static) -> Self {
        self.action = Some(Rc::new(action));
        self
    }
}

/// Element created by a model method.
pub struct CustomNode<T> {
    pub common: Common,
    pub factory: ElementFactory<T>,
    pub init: Option<Method<T>>,
}

impl<T> CustomNode<T> {
    #[must_use]
    pub fn new(factory: impl Fn(&T) -> Result<Element, ViewError> + 'static) -> Self {
        Self {
            common: Common::default(),
            factory: Rc::new(factory),
            init: None,
        }
    }

    identity_setters!();
    toggle_setters!();

    /// Method run once the whole mounted tree is attached.
    #[must_use]
    pub fn init(mut self, init: impl Fn(&T) + 'static) -> Self {
        self.init = Some(Rc::new(init));
        self
    }
}

/// Button replacing the boot container's content with the view of a freshly
/// produced object.
pub struct BootNode<T> {
    pub common: Common,
    pub caption: Caption,
    pub content: ContentType,
    pub factory: ModelFactory<T>,
}

impl<T> BootNode<T> {
    /// Boot trigger with a fixed label.
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        factory: impl Fn(&T) -> Result<Option<ModelRef>, ViewError> + 'static,
    ) -> Self {
        Self::with_caption(Caption::Text(label.into()), factory)
    }

    /// Boot trigger whose label is read from a string field.
    #[must_use]
    pub fn bound(
        label_field: impl Into<String>,
        factory: impl Fn(&T) -> Result<Option<ModelRef>, ViewError> + 'static,
    ) -> Self {
        Self::with_caption(Caption::Field(label_field.into()), factory)
    }

    fn with_caption(
        caption: Caption,
        factory: impl Fn(&T) -> Result<Option<ModelRef>, ViewError> + 'static,
    ) -> Self {
        Self {
            common: Common::default(),
            caption,
            content: ContentType::Text,
            factory: Rc::new(factory),
        }
    }

    identity_setters!();
    toggle_setters!();

    #[must_use]
    pub fn content(mut self, content: ContentType) -> Self {
        self.content = content;
        self
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// One node descriptor.
pub enum Node<T> {
    Input(InputNode<T>),
    Button(ButtonNode<T>),
    Label(LabelNode),
    Image(ImageNode),
    Select(SelectNode<T>),
    Flow(FlowNode<T>),
    Single(SingleNode),
    List(ListNode),
    Dialog(ModalNode<T>),
    Menu(ModalNode<T>),
    Custom(CustomNode<T>),
    Boot(BootNode<T>),
}

impl<T> Node<T> {
    /// Kind tag, as used in logs and outlines.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Input(_) => "input",
            Self::Button(_) => "button",
            Self::Label(_) => "label",
            Self::Image(_) => "image",
            Self::Select(_) => "select",
            Self::Flow(_) => "flow",
            Self::Single(_) => "single",
            Self::List(_) => "list",
            Self::Dialog(_) => "dialog",
            Self::Menu(_) => "menu",
            Self::Custom(_) => "custom",
            Self::Boot(_) => "boot",
        }
    }

    #[must_use]
    pub fn common(&self) -> &Common {
        match self {
            Self::Input(n) => &n.common,
            Self::Button(n) => &n.common,
            Self::Label(n) => &n.common,
            Self::Image(n) => &n.common,
            Self::Select(n) => &n.common,
            Self::Flow(n) => &n.common,
            Self::Single(n) => &n.common,
            Self::List(n) => &n.common,
            Self::Dialog(n) | Self::Menu(n) => &n.common,
            Self::Custom(n) => &n.common,
            Self::Boot(n) => &n.common,
        }
    }

    /// Child descriptors of a flow; empty for every other kind.
    #[must_use]
    pub fn children(&self) -> &[Node<T>] {
        match self {
            Self::Flow(flow) => &flow.children,
            _ => &[],
        }
    }
}

impl<T> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        s.field("kind", &self.kind());
        if let Some(id) = &self.common().id {
            s.field("id", id);
        }
        if let Self::Flow(flow) = self {
            s.field("children", &flow.children);
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy;

    #[test]
    fn lengths_render_as_css() {
        assert_eq!(Length::from(120).to_css(), "120px");
        assert_eq!(Length::from(12.5).to_css(), "12.5px");
        assert_eq!(Length::from("50%").to_css(), "50%");
    }

    #[test]
    fn class_string_is_split_on_whitespace() {
        let node = LabelNode::fixed("x").class("  a b\tc ").classes(["d"]);
        assert_eq!(node.common.classes, ["a", "b", "c", "d"]);
    }

    #[test]
    fn list_wraps_by_default_flow_does_not() {
        assert!(ListNode::new("items").layout.wrap);
        assert!(!FlowNode::<Dummy>::new().layout.wrap);
        assert_eq!(FlowNode::<Dummy>::new().layout.orientation, Orientation::Column);
        assert_eq!(FlowNode::<Dummy>::row().layout.orientation, Orientation::Row);
    }

    #[test]
    fn css_keyword_maps() {
        assert_eq!(Justify::SpaceBetween.as_css(), "space-between");
        assert_eq!(Justify::Start.as_css(), "flex-start");
        assert_eq!(Align::End.as_css(), "flex-end");
    }

    #[test]
    fn button_constructors_pick_caption() {
        let fixed = ButtonNode::new("Go", |_: &Dummy| {});
        assert_eq!(fixed.caption, Caption::Text("Go".into()));
        let bound = ButtonNode::bound("title", |_: &Dummy| {}).content(ContentType::Html);
        assert_eq!(bound.caption, Caption::Field("title".into()));
        assert_eq!(bound.content, ContentType::Html);
    }

    #[test]
    fn debug_shows_kind_and_children() {
        let mut flow = FlowNode::<Dummy>::row().id("bar");
        flow.children.push(Node::Label(LabelNode::fixed("a")));
        let text = format!("{:?}", Node::Flow(flow));
        assert!(text.contains("flow"));
        assert!(text.contains("bar"));
        assert!(text.contains("label"));
    }
}
