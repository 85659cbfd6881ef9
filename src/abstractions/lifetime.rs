use core::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use super::errors::LifetimeErrorKind;

/// Lifetime of a described service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ServiceLifetime {
    Singleton = 0,
    Scoped = 1,
    Transient = 2,
}

impl ServiceLifetime {
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            ServiceLifetime::Singleton => "singleton",
            ServiceLifetime::Scoped => "scoped",
            ServiceLifetime::Transient => "transient",
        }
    }
}

impl Display for ServiceLifetime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ServiceLifetime {
    type Err = LifetimeErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [ServiceLifetime::Singleton, ServiceLifetime::Scoped, ServiceLifetime::Transient]
            .into_iter()
            .find(|lifetime| lifetime.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LifetimeErrorKind::Unknown(s.to_owned()))
    }
}

impl TryFrom<u8> for ServiceLifetime {
    type Error = LifetimeErrorKind;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ServiceLifetime::Singleton),
            1 => Ok(ServiceLifetime::Scoped),
            2 => Ok(ServiceLifetime::Transient),
            _ => Err(LifetimeErrorKind::Unknown(value.to_string())),
        }
    }
}
