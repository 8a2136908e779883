#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

//! Attributes that are computed on first read and cached per object.
//!
//! A [`Class`] declares lazy attributes with an [`Initializer`] each.
//! Subclasses see the attributes of all their ancestors and may redeclare
//! them. An [`Object`] of a class runs each initializer at most once, or all
//! of them at once with [`Object::eager_load_attributes`].

use std::{any::Any, rc::Rc};

pub use class::Class;
pub use error::{LzErr, LzResult};
pub use ident::{Ident, Policy};
pub use init::Initializer;
pub use object::Object;

/// cached attribute value, shared between every read
pub type Value = Rc<dyn Any>;

/// names of lazy attributes, no order
pub type AttrSet = im::HashSet<Ident>;

pub mod class;
pub mod error;
pub mod ident;
pub mod init;
pub mod object;
pub mod print;
mod lazy;
