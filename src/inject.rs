use std::sync::Arc;

use crate::{dependency_resolver::DependencyResolver, Container, ResolveErrorKind};

/// Required dependency, resolution fails if it isn't registered
pub struct Inject<Dep: ?Sized>(pub Arc<Dep>);

impl<Dep: ?Sized + Send + Sync + 'static> DependencyResolver for Inject<Dep> {
    fn resolve(container: &Container) -> Result<Self, ResolveErrorKind> {
        container.resolve().map(Self)
    }
}

/// Optional dependency, `None` if it can't be resolved
pub struct InjectOptional<Dep: ?Sized>(pub Option<Arc<Dep>>);

impl<Dep: ?Sized + Send + Sync + 'static> DependencyResolver for InjectOptional<Dep> {
    fn resolve(container: &Container) -> Result<Self, ResolveErrorKind> {
        Ok(Self(container.try_resolve()))
    }
}

/// Every registration of the dependency in registration order
pub struct InjectAll<Dep: ?Sized>(pub Vec<Arc<Dep>>);

impl<Dep: ?Sized + Send + Sync + 'static> DependencyResolver for InjectAll<Dep> {
    fn resolve(container: &Container) -> Result<Self, ResolveErrorKind> {
        container.resolve_all().map(Self)
    }
}
