#![forbid(unsafe_code)]

//! State-object trait and type-erased model references.

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::state::State;

/// Upcasting helpers, implemented for every `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// An application state object.
///
/// Implementors expose their named fields through a [`State`]; typed
/// accessors on the implementing struct usually wrap `state().get(..)`.
///
/// ```ignore
/// struct Counter {
///     state: State,
/// }
///
/// impl Model for Counter {
///     fn state(&self) -> &State {
///         &self.state
///     }
/// }
/// ```
pub trait Model: AsAny {
    fn state(&self) -> &State;
}

/// Shared, type-erased reference to a model. Equality is identity.
#[derive(Clone)]
pub struct ModelRef(Rc<dyn Model>);

impl ModelRef {
    pub fn new<T: Model>(model: Rc<T>) -> Self {
        Self(model)
    }

    #[must_use]
    pub fn state(&self) -> &State {
        self.0.state()
    }

    /// Concrete type of the referenced model.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        (*self.0).as_any().type_id()
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        (*self.0).type_name()
    }

    #[must_use]
    pub fn is<T: Model>(&self) -> bool {
        (*self.0).as_any().is::<T>()
    }

    /// Recover the concrete model.
    #[must_use]
    pub fn downcast<T: Model>(&self) -> Option<Rc<T>> {
        Rc::clone(&self.0).into_any_rc().downcast::<T>().ok()
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakModelRef {
        WeakModelRef(Rc::downgrade(&self.0))
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0).cast::<()>()
    }
}

impl PartialEq for ModelRef {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for ModelRef {}

impl fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:p}", self.type_name(), self.addr())
    }
}

/// Non-owning [`ModelRef`].
#[derive(Clone)]
pub struct WeakModelRef(Weak<dyn Model>);

impl WeakModelRef {
    #[must_use]
    pub fn upgrade(&self) -> Option<ModelRef> {
        self.0.upgrade().map(ModelRef)
    }
}

impl fmt::Debug for WeakModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(m) => write!(f, "WeakModelRef({m:?})"),
            None => f.write_str("WeakModelRef(<dropped>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A {
        state: State,
    }

    impl Model for A {
        fn state(&self) -> &State {
            &self.state
        }
    }

    struct B {
        state: State,
    }

    impl Model for B {
        fn state(&self) -> &State {
            &self.state
        }
    }

    #[test]
    fn identity_and_downcast() {
        let a = Rc::new(A { state: State::new() });
        let r1 = ModelRef::new(Rc::clone(&a));
        let r2 = ModelRef::new(Rc::clone(&a));
        let other = ModelRef::new(Rc::new(A { state: State::new() }));
        assert_eq!(r1, r2);
        assert_ne!(r1, other);
        assert!(r1.is::<A>());
        assert!(!r1.is::<B>());
        assert!(Rc::ptr_eq(&r1.downcast::<A>().unwrap(), &a));
        assert!(r1.downcast::<B>().is_none());
        assert_eq!(r1.type_id(), TypeId::of::<A>());
    }

    #[test]
    fn weak_ref_does_not_keep_model_alive() {
        let b = ModelRef::new(Rc::new(B { state: State::new() }));
        let weak = b.downgrade();
        assert!(weak.upgrade().is_some());
        drop(b);
        assert!(weak.upgrade().is_none());
    }
}
