use std::sync::Arc;
use tracing::debug;

use crate::{
    any::{erase, Instance, TypeInfo},
    dependency_resolver::DependencyResolver,
    errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind},
    Container,
};

/// Type that the container can construct by itself.
///
/// Dependencies are declared as a tuple of [`crate::Inject`], [`crate::InjectOptional`] and [`crate::InjectAll`]
/// and resolved from the container before [`Injectable::inject`] is called.
///
/// # Examples
/// ```rust
/// use vessel::{Inject, InstantiateErrorKind, Injectable};
/// use std::sync::Arc;
///
/// struct Config;
///
/// impl Injectable for Config {
///     type Deps = ();
///
///     fn inject((): Self::Deps) -> Result<Self, InstantiateErrorKind> {
///         Ok(Self)
///     }
/// }
///
/// struct Repo(Arc<Config>);
///
/// impl Injectable for Repo {
///     type Deps = (Inject<Config>,);
///
///     fn inject((Inject(config),): Self::Deps) -> Result<Self, InstantiateErrorKind> {
///         Ok(Self(config))
///     }
/// }
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    type Deps: DependencyResolver;

    #[allow(clippy::missing_errors_doc)]
    fn inject(dependencies: Self::Deps) -> Result<Self, InstantiateErrorKind>;
}

/// Upcast from an implementation to the service it's registered for.
///
/// Every type implements itself. Use [`crate::implements!`] to bind a type to trait objects.
pub trait Implements<S: ?Sized>: Send + Sync + 'static {
    fn upcast(self: Arc<Self>) -> Arc<S>;
}

impl<T: Send + Sync + 'static> Implements<T> for T {
    #[inline]
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Implements [`Implements`] for a type and each of the listed services.
///
/// # Syntax
/// ```text
/// implements!(Type => Service1 [, Service2 ...])
/// ```
///
/// # Examples
/// ```rust
/// use vessel::implements;
///
/// trait UserRepo: Send + Sync {}
///
/// struct PostgresUserRepo;
///
/// impl UserRepo for PostgresUserRepo {}
///
/// implements!(PostgresUserRepo => dyn UserRepo);
/// ```
#[macro_export]
macro_rules! implements {
    ($ty:ty => $($service:ty),+ $(,)?) => {
        $(
            impl $crate::Implements<$service> for $ty {
                #[inline]
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$service> {
                    self
                }
            }
        )+
    };
}

pub(crate) type InstantiatorResult = Result<Instance, InstantiatorErrorKind<Box<ResolveErrorKind>, InstantiateErrorKind>>;

pub(crate) type BoxedInstantiator = Arc<dyn Fn(&Container) -> InstantiatorResult + Send + Sync>;

/// Constructible implementation of a service.
///
/// Created from an [`Injectable`] type and the service it's upcast to,
/// the container uses it for type-to-type registrations.
#[derive(Clone)]
pub struct ImplementationType {
    pub(crate) type_info: TypeInfo,
    pub(crate) provides: TypeInfo,
    pub(crate) instantiator: BoxedInstantiator,
}

impl ImplementationType {
    #[must_use]
    pub fn of<S, I>() -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<S>,
    {
        Self {
            type_info: TypeInfo::of::<I>(),
            provides: TypeInfo::of::<S>(),
            instantiator: Arc::new(|container: &Container| -> InstantiatorResult {
                let dependencies = match I::Deps::resolve(container) {
                    Ok(dependencies) => dependencies,
                    Err(err) => return Err(InstantiatorErrorKind::Deps(Box::new(err))),
                };
                let implementation = match I::inject(dependencies) {
                    Ok(implementation) => implementation,
                    Err(err) => return Err(InstantiatorErrorKind::Factory(err)),
                };

                debug!("Injected");

                Ok(erase(<I as Implements<S>>::upcast(Arc::new(implementation))))
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub fn provides(&self) -> TypeInfo {
        self.provides
    }
}

impl core::fmt::Debug for ImplementationType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ImplementationType")
            .field("type_info", &self.type_info)
            .field("provides", &self.provides)
            .finish_non_exhaustive()
    }
}
