use std::sync::LazyLock;

use ecow::EcoString;
use regex::Regex;
use tap::Pipe;

use crate::{LzErr, LzResult};

pub type Ident = EcoString;

/// lowercase letters, digits and underscores, nothing else
static ATTR_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A[a-z0-9_]+\z").expect("attribute name pattern is valid"));

/// How strictly declarations are checked.
///
/// Picked once per class with [`Class::attach`](crate::Class::attach),
/// subclasses inherit the policy of their nearest attached ancestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// names must match `[a-z0-9_]+` and an initializer must be given
    #[default]
    Strict,
    /// anything goes at declaration time, a missing initializer only fails when read
    Loose,
}

impl Policy {
    pub fn validate(self, name: &str) -> LzResult<Ident> {
        match self {
            Self::Strict if !ATTR_NAME.is_match(name) => Err(LzErr::BadName(name.into())),
            _ => Ident::from(name).pipe(Ok),
        }
    }
}
