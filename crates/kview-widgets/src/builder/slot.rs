#![forbid(unsafe_code)]

//! A host element holding at most one nested view at a time.

use std::cell::RefCell;

use kview_core::Element;
use kview_reactive::Value;

use crate::error::ViewError;
use crate::runtime::{PostInitQueue, RuntimeHandle, WeakRuntime};

pub(super) struct Slot {
    runtime: WeakRuntime,
    host: Element,
    child: RefCell<Option<RuntimeHandle>>,
}

impl Slot {
    pub(super) fn new(runtime: WeakRuntime, host: Element) -> Self {
        Self {
            runtime,
            host,
            child: RefCell::new(None),
        }
    }

    /// Stop the current child, then empty the host.
    pub(super) fn clear(&self) {
        let child = self.child.borrow_mut().take();
        if let Some(child) = child {
            child.stop();
        }
        self.host.clear_children();
    }

    /// Replace the content with the view of `value`, mounted into a fresh
    /// wrapper. `Ok(false)` when no view matches; the host is left empty.
    pub(super) fn show(
        &self,
        value: &Value,
        post_inits: Option<&PostInitQueue>,
    ) -> Result<bool, ViewError> {
        self.clear();
        let Some(runtime) = self.runtime.upgrade() else {
            return Ok(false);
        };
        if !runtime.has_view_for(value) {
            return Ok(false);
        }
        let wrapper = runtime.surface().create_element("div");
        self.host.append_child(&wrapper);
        let child = runtime.mount_nested(value, &wrapper, post_inits)?;
        let mounted = child.is_some();
        *self.child.borrow_mut() = child;
        Ok(mounted)
    }
}
