use super::dependency_resolver::ResolveErrorKind;

#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error(transparent)]
    Resolve(Box<ResolveErrorKind>),
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

impl From<ResolveErrorKind> for InstantiateErrorKind {
    #[inline]
    fn from(err: ResolveErrorKind) -> Self {
        Self::Resolve(Box::new(err))
    }
}
