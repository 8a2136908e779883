use std::{any::Any, rc::Rc};

use tap::Pipe;

use crate::{lazy::Slots, AttrSet, Class, Ident, LzErr, LzResult, Value};

/// An instance of a [`Class`], holding user state `S` next to the cached
/// values of its lazy attributes.
///
/// Neither `Send` nor `Sync`, so the first read of an attribute never races.
///
/// ```compile_fail
/// fn send<T: Send>() {}
/// send::<lazy_attrs::Object<()>>();
/// ```
///
/// ```compile_fail
/// fn sync<T: Sync>() {}
/// sync::<lazy_attrs::Object<()>>();
/// ```
pub struct Object<S> {
    class: Class<S>,
    state: S,
    slots: Slots,
}

impl<S: std::fmt::Debug> std::fmt::Debug for Object<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(Object))
            .field("class", self.class.name())
            .field("state", &self.state)
            .field("slots", &self.slots)
            .finish()
    }
}

impl<S> Object<S> {
    pub(crate) fn new(class: Class<S>, state: S) -> Self {
        Self {
            class,
            state,
            slots: Slots::default(),
        }
    }

    pub const fn class(&self) -> &Class<S> {
        &self.class
    }

    pub const fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Reads a lazy attribute, running its initializer on the first read only.
    ///
    /// A failing initializer leaves the attribute unset, so the next read
    /// runs it again. The exception is a value written through the accessor
    /// while the initializer ran: it stays, and later reads return it.
    pub fn get(&self, name: &str) -> LzResult<Value> {
        let Some(reader) = self.class.find_reader(name) else {
            return Err(LzErr::NoSuchAttribute {
                class: self.class.name().clone(),
                name: name.into(),
            });
        };

        if let Some(val) = self.slots.get(name) {
            tracing::trace!(class = %self.class.name(), name, "lazy attribute cached");
            return Ok(val);
        }

        let name = Ident::from(name);
        let init = reader.ok_or_else(|| LzErr::MissingInitializer(name.clone()))?;

        self.slots.begin(&name)?;
        tracing::trace!(class = %self.class.name(), %name, "initializing lazy attribute");

        match init.apply(self) {
            Ok(val) => self.slots.finish(&name, val).pipe(Ok),
            Err(err) => {
                self.slots.abandon(&name);
                Err(LzErr::from_init(err))
            }
        }
    }

    /// [`get`](Self::get), downcast to `T`.
    pub fn get_as<T: Any>(&self, name: &str) -> LzResult<Rc<T>> {
        self.get(name)?
            .downcast::<T>()
            .map_err(|_| LzErr::TypeMismatch {
                name: name.into(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Writes an attribute declared with
    /// [`lazy_attr_accessor`](Class::lazy_attr_accessor).
    /// The initializer is skipped, now and on later reads.
    pub fn set<T: Any>(&self, name: &str, val: T) -> LzResult<()> {
        self.set_value(name, Rc::new(val))
    }

    pub fn set_value(&self, name: &str, val: Value) -> LzResult<()> {
        if !self.class.has_writer(name) {
            return Err(LzErr::NoWriter {
                class: self.class.name().clone(),
                name: name.into(),
            });
        }

        self.slots.write(name.into(), val);
        Ok(())
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.slots.is_loaded(name)
    }

    /// attributes whose value is cached on this object
    pub fn loaded_attributes(&self) -> AttrSet {
        self.slots.loaded()
    }

    /// Reads every lazy attribute of this object's class and its ancestors
    /// and returns their names.
    ///
    /// Stops at the first failing initializer. Attributes loaded before it
    /// stay loaded.
    #[tracing::instrument(level = "debug", skip(self), fields(class = %self.class.name()))]
    pub fn eager_load_attributes(&self) -> LzResult<AttrSet> {
        self.class.require_policy()?;

        let attrs = self.class.all_lazy_attributes();

        for name in &attrs {
            self.get(name)?;
        }

        Ok(attrs)
    }
}
