use thiserror::Error;

use crate::Ident;

pub type LzResult<T> = Result<T, LzErr>;

#[derive(Error, Debug)]
pub enum LzErr {
    #[error("bad attribute name '{0}' (use a-z, 0-9, _)")]
    BadName(Ident),

    #[error("no initializer block given in lazy-loaded attribute definition")]
    MissingInitializer(Ident),

    #[error("class {0} does not extend lazy attributes")]
    NotAttached(Ident),

    #[error("undefined lazy attribute '{name}' for {class}")]
    NoSuchAttribute { class: Ident, name: Ident },

    #[error("no writer for attribute '{name}' on {class}")]
    NoWriter { class: Ident, name: Ident },

    #[error("lazy attribute '{0}' depends on itself")]
    Cycle(Ident),

    #[error("lazy attribute '{name}' is not a {expected}")]
    TypeMismatch { name: Ident, expected: &'static str },

    /// whatever the initializer returned, untouched
    #[error(transparent)]
    Init(#[from] anyhow::Error),
}

impl LzErr {
    /// Turns an initializer failure back into an `LzErr`.
    /// A nested read that failed inside the initializer keeps its own variant
    /// instead of being wrapped once per level.
    pub(crate) fn from_init(err: anyhow::Error) -> Self {
        err.downcast::<Self>().unwrap_or_else(Self::Init)
    }
}
