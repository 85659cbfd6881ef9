use core::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use super::{errors::ServiceErrorKind, lifetime::ServiceLifetime, provider::ServiceProvider};
use crate::{
    any::{erase, Instance, TypeInfo},
    instantiator::{ImplementationType, Implements, Injectable},
};

/// Factory of a described service.
///
/// It gets the provider of the resolution in progress, so it can resolve other services,
/// and must return an [`Instance`] of the service it's described for.
pub type ImplementationFactory = Arc<dyn Fn(&dyn ServiceProvider) -> Result<Instance, ServiceErrorKind> + Send + Sync>;

/// How a described service is created
#[derive(Clone)]
pub enum ServiceImplementation {
    Type(ImplementationType),
    Instance(Instance),
    Factory(ImplementationFactory),
}

impl Debug for ServiceImplementation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(implementation) => f.debug_tuple("Type").field(implementation).finish(),
            Self::Instance(_) => f.write_str("Instance"),
            Self::Factory(_) => f.write_str("Factory"),
        }
    }
}

/// Registration of one service: its type, how it's created and its lifetime
#[derive(Clone, Debug)]
pub struct ServiceDescriptor {
    service_type: TypeInfo,
    implementation: ServiceImplementation,
    lifetime: ServiceLifetime,
}

impl ServiceDescriptor {
    #[inline]
    #[must_use]
    pub fn new(service_type: TypeInfo, implementation: ServiceImplementation, lifetime: ServiceLifetime) -> Self {
        Self {
            service_type,
            implementation,
            lifetime,
        }
    }

    #[must_use]
    pub fn describe<S, I>(lifetime: ServiceLifetime) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<S>,
    {
        Self::new(
            TypeInfo::of::<S>(),
            ServiceImplementation::Type(ImplementationType::of::<S, I>()),
            lifetime,
        )
    }

    #[must_use]
    pub fn describe_factory<S, F>(factory: F, lifetime: ServiceLifetime) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&dyn ServiceProvider) -> Result<Arc<S>, ServiceErrorKind> + Send + Sync + 'static,
    {
        Self::new(
            TypeInfo::of::<S>(),
            ServiceImplementation::Factory(Arc::new(move |provider: &dyn ServiceProvider| factory(provider).map(erase))),
            lifetime,
        )
    }

    #[inline]
    #[must_use]
    pub fn singleton<S, I>() -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<S>,
    {
        Self::describe::<S, I>(ServiceLifetime::Singleton)
    }

    #[inline]
    #[must_use]
    pub fn scoped<S, I>() -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<S>,
    {
        Self::describe::<S, I>(ServiceLifetime::Scoped)
    }

    #[inline]
    #[must_use]
    pub fn transient<S, I>() -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<S>,
    {
        Self::describe::<S, I>(ServiceLifetime::Transient)
    }

    #[inline]
    #[must_use]
    pub fn singleton_factory<S, F>(factory: F) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&dyn ServiceProvider) -> Result<Arc<S>, ServiceErrorKind> + Send + Sync + 'static,
    {
        Self::describe_factory(factory, ServiceLifetime::Singleton)
    }

    #[inline]
    #[must_use]
    pub fn scoped_factory<S, F>(factory: F) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&dyn ServiceProvider) -> Result<Arc<S>, ServiceErrorKind> + Send + Sync + 'static,
    {
        Self::describe_factory(factory, ServiceLifetime::Scoped)
    }

    #[inline]
    #[must_use]
    pub fn transient_factory<S, F>(factory: F) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&dyn ServiceProvider) -> Result<Arc<S>, ServiceErrorKind> + Send + Sync + 'static,
    {
        Self::describe_factory(factory, ServiceLifetime::Transient)
    }

    /// Describes a pre-built value, it's always a singleton
    #[inline]
    #[must_use]
    pub fn instance<S>(instance: Arc<S>) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        Self::new(
            TypeInfo::of::<S>(),
            ServiceImplementation::Instance(erase(instance)),
            ServiceLifetime::Singleton,
        )
    }

    #[inline]
    #[must_use]
    pub fn service_type(&self) -> TypeInfo {
        self.service_type
    }

    #[inline]
    #[must_use]
    pub fn implementation(&self) -> &ServiceImplementation {
        &self.implementation
    }

    #[inline]
    #[must_use]
    pub fn lifetime(&self) -> ServiceLifetime {
        self.lifetime
    }
}
