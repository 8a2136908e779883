use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fxhash::{FxHashMap, FxHashSet};
use tap::Pipe;

use crate::{AttrSet, Ident, Initializer, LzErr, LzResult, Object, Policy};

/// A reader installed on a class. `None` only happens under [`Policy::Loose`],
/// where declaring without an initializer is allowed and fails on read.
pub(crate) type Reader<S> = Option<Initializer<S>>;

pub(crate) struct Inner<S> {
    pub(crate) name: Ident,
    pub(crate) parent: Option<Class<S>>,
    /// set on the class `attach` was called on, inherited by lookup
    pub(crate) policy: Cell<Option<Policy>>,
    /// own lazy attributes, created on first registration
    pub(crate) registry: RefCell<Option<AttrSet>>,
    pub(crate) readers: RefCell<FxHashMap<Ident, Reader<S>>>,
    pub(crate) writers: RefCell<FxHashSet<Ident>>,
}

impl<S> std::fmt::Debug for Inner<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Class::Inner")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("policy", &self.policy.get())
            .field("registry", &self.registry.borrow())
            .finish_non_exhaustive()
    }
}

/// A type descriptor with an explicit parent link.
///
/// Cheap to clone, all clones refer to the same class.
/// Single threaded: a class can't be sent or shared across threads.
///
/// ```compile_fail
/// fn send<T: Send>() {}
/// send::<lazy_attrs::Class<()>>();
/// ```
///
/// ```compile_fail
/// fn sync<T: Sync>() {}
/// sync::<lazy_attrs::Class<()>>();
/// ```
pub struct Class<S>(Rc<Inner<S>>);

impl<S> std::fmt::Debug for Class<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Class").field(&self.0).finish()
    }
}

impl<S> Clone for Class<S> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<S> PartialEq for Class<S> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<S> Eq for Class<S> {}

impl<S> Class<S> {
    #[must_use]
    pub fn new(name: impl Into<Ident>) -> Self {
        Self::with_parent(name, None)
    }

    #[must_use]
    pub fn with_parent(name: impl Into<Ident>, parent: Option<Self>) -> Self {
        Self(Rc::new(Inner {
            name: name.into(),
            parent,
            policy: Cell::default(),
            registry: RefCell::default(),
            readers: RefCell::default(),
            writers: RefCell::default(),
        }))
    }

    #[must_use]
    pub fn subclass(&self, name: impl Into<Ident>) -> Self {
        Self::with_parent(name, Some(self.clone()))
    }

    pub fn name(&self) -> &Ident {
        &self.0.name
    }

    pub fn parent(&self) -> Option<&Self> {
        self.0.parent.as_ref()
    }

    /// `self` first, then each parent up to the root
    pub fn ancestors(&self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(self.clone()), |it| it.parent().cloned())
    }

    /// Opts this class and all of its subclasses into lazy attributes.
    /// Calling it again only replaces the policy.
    pub fn attach(&self, policy: Policy) -> &Self {
        tracing::debug!(class = %self.name(), ?policy, "attaching lazy attributes");
        self.0.policy.set(Some(policy));
        self
    }

    /// policy of the nearest attached class, `None` if there is none
    pub fn policy(&self) -> Option<Policy> {
        self.ancestors().find_map(|it| it.0.policy.get())
    }

    pub fn is_attached(&self) -> bool {
        self.policy().is_some()
    }

    pub(crate) fn require_policy(&self) -> LzResult<Policy> {
        self.policy()
            .ok_or_else(|| LzErr::NotAttached(self.name().clone()))
    }

    pub(crate) fn register(&self, name: Ident) {
        self.0
            .registry
            .borrow_mut()
            .get_or_insert_with(AttrSet::new)
            .insert(name);
    }

    /// Lazy attributes declared on exactly this class.
    pub fn lazy_attributes(&self) -> AttrSet {
        self.0.registry.borrow().clone().unwrap_or_default()
    }

    /// Lazy attributes of this class and every ancestor, each once.
    pub fn all_lazy_attributes(&self) -> AttrSet {
        self.ancestors()
            // ancestors that never registered anything have no registry
            .filter_map(|it| it.0.registry.borrow().clone())
            .pipe(AttrSet::unions)
    }

    /// Declares `name` as a lazy attribute of this class.
    ///
    /// Redeclaring it, here or on a subclass, replaces the initializer for
    /// instances of that class; instances of ancestors keep theirs.
    ///
    /// ```
    /// use lazy_attrs::{Class, Initializer, Object, Policy};
    ///
    /// let class = Class::<i64>::new("A");
    /// class.attach(Policy::Strict);
    /// class.lazy_attr_reader("double", Initializer::new(|obj: &Object<i64>| *obj.state() * 2))?;
    ///
    /// let obj = class.new_object(21);
    /// assert_eq!(*obj.get_as::<i64>("double")?, 42);
    /// # Ok::<(), lazy_attrs::LzErr>(())
    /// ```
    #[tracing::instrument(level = "debug", skip(self, init), fields(class = %self.name()))]
    pub fn lazy_attr_reader(
        &self,
        name: &str,
        init: impl Into<Option<Initializer<S>>>,
    ) -> LzResult<()> {
        let policy = self.require_policy()?;
        let name = policy.validate(name)?;
        let init = init.into();

        if policy == Policy::Strict && init.is_none() {
            return Err(LzErr::MissingInitializer(name));
        }

        self.register(name.clone());
        self.0.readers.borrow_mut().insert(name, init);

        Ok(())
    }

    /// [`lazy_attr_reader`](Self::lazy_attr_reader) plus a plain writer,
    /// see [`Object::set`].
    pub fn lazy_attr_accessor(
        &self,
        name: &str,
        init: impl Into<Option<Initializer<S>>>,
    ) -> LzResult<()> {
        self.lazy_attr_reader(name, init)?;

        tracing::debug!(class = %self.name(), name, "installing writer");
        self.0.writers.borrow_mut().insert(name.into());

        Ok(())
    }

    /// Nearest reader for `name`, walking up from this class.
    pub(crate) fn find_reader(&self, name: &str) -> Option<Reader<S>> {
        self.ancestors()
            .find_map(|it| it.0.readers.borrow().get(name).cloned())
    }

    pub fn has_reader(&self, name: &str) -> bool {
        self.find_reader(name).is_some()
    }

    pub fn has_writer(&self, name: &str) -> bool {
        self.ancestors()
            .any(|it| it.0.writers.borrow().contains(name))
    }

    #[must_use]
    pub fn new_object(&self, state: S) -> Object<S> {
        Object::new(self.clone(), state)
    }
}
