#![forbid(unsafe_code)]

//! A surface with an `#app` container and a runtime over it.

use std::rc::Rc;

use kview_core::{Element, Size, Surface};
use kview_reactive::Model;
use kview_widgets::{Runtime, RuntimeConfig, RuntimeHandle, ViewError};

/// Id of the container every fixture mounts into.
pub const APP_ID: &str = "app";

/// Headless page for integration tests.
pub struct Fixture {
    runtime: Runtime,
    app: Element,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// 1024x768 viewport, default config.
    #[must_use]
    pub fn new() -> Self {
        Self::build(Surface::default(), RuntimeConfig::default())
    }

    #[must_use]
    pub fn with_viewport(width: f64, height: f64) -> Self {
        Self::build(Surface::new(Size::new(width, height)), RuntimeConfig::default())
    }

    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self::build(Surface::default(), config)
    }

    fn build(surface: Surface, config: RuntimeConfig) -> Self {
        let app = surface.create_element("div");
        app.set_id(APP_ID);
        surface.body().append_child(&app);
        Self {
            runtime: Runtime::with_config(surface, config),
            app,
        }
    }

    #[must_use]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    #[must_use]
    pub fn surface(&self) -> &Surface {
        self.runtime.surface()
    }

    /// The `#app` container.
    #[must_use]
    pub fn app(&self) -> Element {
        self.app.clone()
    }

    /// Mount `model` into `#app`.
    pub fn mount<T: Model>(&self, model: &Rc<T>) -> Result<RuntimeHandle, ViewError> {
        self.runtime.mount(model, &self.app)
    }

    /// First element under `#app` matching `selector`.
    ///
    /// # Panics
    ///
    /// When nothing matches.
    #[must_use]
    pub fn find(&self, selector: &str) -> Element {
        self.app
            .query_selector(selector)
            .unwrap_or_else(|| panic!("no element under #{APP_ID} matches {selector:?}"))
    }

    /// First element anywhere on the surface matching `selector`.
    ///
    /// # Panics
    ///
    /// When nothing matches.
    #[must_use]
    pub fn find_on_page(&self, selector: &str) -> Element {
        self.surface()
            .query_selector(selector)
            .unwrap_or_else(|| panic!("no element on the page matches {selector:?}"))
    }

    /// Text of every element under `#app` matching `selector`.
    #[must_use]
    pub fn texts(&self, selector: &str) -> Vec<String> {
        self.app
            .query_selector_all(selector)
            .iter()
            .map(Element::text_content)
            .collect()
    }

    /// Run zero-delay timers and animation frames until both queues are
    /// empty.
    pub fn settle(&self) {
        self.surface().flush();
    }
}
