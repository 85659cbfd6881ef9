use core::fmt::{self, Display, Formatter};

/// Lifetime of a registration inside the container
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// One instance per root container, shared by every scope
    Singleton,
    /// One instance per container (root or scope)
    Scoped,
    /// New instance per resolution, never cached
    Transient,
}

impl Lifetime {
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Lifetime::Singleton => "singleton",
            Lifetime::Scoped => "scoped",
            Lifetime::Transient => "transient",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        matches!(self, Lifetime::Singleton | Lifetime::Scoped)
    }
}

impl Display for Lifetime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
