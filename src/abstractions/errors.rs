use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LifetimeErrorKind {
    #[error("Unknown service lifetime `{0}`. Expected one of: singleton, scoped, transient")]
    Unknown(String),
}

#[derive(thiserror::Error, Debug)]
pub enum ServiceErrorKind {
    /// Error of the container behind the provider, it can be got back by [`anyhow::Error::downcast_ref`]
    #[error(transparent)]
    Resolve(anyhow::Error),
    #[error("Incorrect service type. Expected: `{}`", expected.name)]
    IncorrectType { expected: TypeInfo },
    #[error(transparent)]
    Factory(anyhow::Error),
}
