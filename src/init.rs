use std::{any::Any, rc::Rc};

use crate::{Object, Value};

type InitFn<S> = dyn Fn(&Object<S>) -> anyhow::Result<Value>;

/// The computation rule behind a lazy attribute.
///
/// It receives the object the attribute is read on, so it can use that
/// object's state and its other lazy attributes.
pub struct Initializer<S>(Rc<InitFn<S>>);

impl<S> Clone for Initializer<S> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<S> std::fmt::Debug for Initializer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Initializer({:p})", Rc::as_ptr(&self.0))
    }
}

impl<S: 'static> Initializer<S> {
    pub fn new<T, F>(f: F) -> Self
    where
        T: Any,
        F: Fn(&Object<S>) -> T + 'static,
    {
        Self(Rc::new(move |obj| Ok(Rc::new(f(obj)) as Value)))
    }

    pub fn fallible<T, F>(f: F) -> Self
    where
        T: Any,
        F: Fn(&Object<S>) -> anyhow::Result<T> + 'static,
    {
        Self(Rc::new(move |obj| f(obj).map(|it| Rc::new(it) as Value)))
    }

    /// for initializers that hand out an already shared value
    pub fn shared<F>(f: F) -> Self
    where
        F: Fn(&Object<S>) -> anyhow::Result<Value> + 'static,
    {
        Self(Rc::new(f))
    }
}

impl<S> Initializer<S> {
    #[inline]
    pub fn apply(&self, obj: &Object<S>) -> anyhow::Result<Value> {
        (self.0)(obj)
    }
}
