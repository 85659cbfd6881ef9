use core::sync::atomic::{AtomicBool, Ordering};
use parking_lot::Mutex;
use std::{cell::RefCell, sync::Arc};
use tracing::{debug, error, info_span};

use crate::{
    any::{downcast, Instance, TypeInfo},
    cache::Cache,
    config::Config,
    errors::{InstantiatorErrorKind, ResolveErrorKind},
    instantiator::BoxedInstantiator,
    lifetime::Lifetime,
    registry::{Registration, Registry, Source},
};

std::thread_local! {
    static RESOLVING: RefCell<Vec<(*const ContainerInner, usize, TypeInfo)>> = const { RefCell::new(Vec::new()) };
}

/// Marks a registration of a container as being instantiated on the current thread until dropped.
/// The same registration resolved in another container (e.g. a new scope) isn't a cycle.
struct ResolvingGuard;

impl ResolvingGuard {
    fn enter(container: &Container, registration: &Registration) -> Result<Self, ResolveErrorKind> {
        let container = Arc::as_ptr(&container.inner);

        RESOLVING.with(|resolving| {
            let mut resolving = resolving.borrow_mut();
            if let Some(position) = resolving
                .iter()
                .position(|(inner, id, _)| *inner == container && *id == registration.id)
            {
                let graph = resolving[position..]
                    .iter()
                    .map(|(_, _, type_info)| *type_info)
                    .chain([registration.service_type])
                    .collect();
                return Err(ResolveErrorKind::CyclicDependency { graph });
            }
            resolving.push((container, registration.id, registration.service_type));
            Ok(Self)
        })
    }
}

impl Drop for ResolvingGuard {
    fn drop(&mut self) {
        RESOLVING.with(|resolving| {
            resolving.borrow_mut().pop();
        });
    }
}

/// Built object graph.
///
/// Cloning is cheap and gives another handle to the same container.
/// A root container is created by [`crate::ContainerBuilder::build`], child containers by [`Container::create_scope`].
#[derive(Clone)]
pub struct Container {
    pub(crate) inner: Arc<ContainerInner>,
}

impl Container {
    #[inline]
    #[must_use]
    pub(crate) fn new(registry: Registry, config: Config) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                locks: activation_locks(registry.len()),
                registry: Arc::new(registry),
                config,
                cache: Mutex::new(Cache::new()),
                root: None,
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Creates child container.
    ///
    /// The child shares registrations and singletons with the root, but has its own cache for scoped registrations.
    /// Scopes aren't nested: a scope created from a child container is a child of the root too.
    #[must_use]
    pub fn create_scope(&self) -> Container {
        let root = self.root().clone();

        debug!("Scope created");

        Container {
            inner: Arc::new(ContainerInner {
                locks: activation_locks(root.inner.registry.len()),
                registry: root.inner.registry.clone(),
                config: root.inner.config,
                cache: Mutex::new(Cache::new()),
                root: Some(root),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Gets an instance of the service registered for `service_type`.
    /// If the service is registered several times, the last registration is used.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::NoRegistration`] if the service isn't registered
    /// - Returns [`ResolveErrorKind::Disposed`] if the container or its root is disposed
    /// - Returns [`ResolveErrorKind::ScopedFromRoot`] if scopes validation is enabled and a scoped service is resolved from the root
    /// - Returns [`ResolveErrorKind::CyclicDependency`] if the service depends on itself
    /// - Returns [`ResolveErrorKind::Instantiator`] if the service or one of its dependencies can't be created
    pub fn resolve_instance(&self, service_type: &TypeInfo) -> Result<Instance, ResolveErrorKind> {
        let span = info_span!("resolve", service = service_type.name, root = self.is_root());
        let _guard = span.enter();

        let Some(registration) = self.inner.registry.get(service_type) else {
            let err = ResolveErrorKind::NoRegistration {
                service_type: *service_type,
            };
            error!("{}", err);
            return Err(err);
        };

        self.get(registration)
    }

    /// Gets an instance of the service registered for `service_type` or `None` if it can't be resolved
    #[must_use]
    pub fn try_resolve_instance(&self, service_type: &TypeInfo) -> Option<Instance> {
        let span = info_span!("try_resolve", service = service_type.name, root = self.is_root());
        let _guard = span.enter();

        let registration = self.inner.registry.get(service_type)?;
        match self.get(registration) {
            Ok(instance) => Some(instance),
            Err(err) => {
                debug!(%err, "Resolution failed");
                None
            }
        }
    }

    /// Gets instances of every registration of `service_type` in registration order.
    /// Returns an empty list if the service isn't registered.
    ///
    /// # Errors
    /// Returns the first error of [`Self::resolve_instance`] except [`ResolveErrorKind::NoRegistration`]
    pub fn resolve_all_instances(&self, service_type: &TypeInfo) -> Result<Vec<Instance>, ResolveErrorKind> {
        let span = info_span!("resolve_all", service = service_type.name, root = self.is_root());
        let _guard = span.enter();

        self.inner
            .registry
            .get_all(service_type)
            .map(|registration| self.get(registration))
            .collect()
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn resolve<S: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<S>, ResolveErrorKind> {
        let service_type = TypeInfo::of::<S>();
        let instance = self.resolve_instance(&service_type)?;
        downcast_or_err(&instance, service_type)
    }

    #[must_use]
    pub fn try_resolve<S: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<S>> {
        self.try_resolve_instance(&TypeInfo::of::<S>())
            .and_then(|instance| downcast(&instance))
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn resolve_all<S: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<S>>, ResolveErrorKind> {
        let service_type = TypeInfo::of::<S>();
        self.resolve_all_instances(&service_type)?
            .iter()
            .map(|instance| downcast_or_err::<S>(instance, service_type))
            .collect()
    }

    /// Checks the registrations without creating anything
    #[inline]
    #[must_use]
    pub fn is_registered(&self, service_type: &TypeInfo) -> bool {
        self.inner.registry.contains(service_type)
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.inner.root.is_none()
    }

    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Disposes the container, dropping its cached instances.
    /// Disposing the root doesn't dispose already created scopes, but their singletons become unavailable.
    ///
    /// # Warning
    /// This method can be called multiple times, only the first call has effect
    pub fn dispose(&self) {
        self.inner.dispose();
    }
}

impl Container {
    #[inline]
    fn root(&self) -> &Container {
        self.inner.root.as_ref().unwrap_or(self)
    }

    fn get(&self, registration: &Registration) -> Result<Instance, ResolveErrorKind> {
        if self.is_disposed() {
            let err = ResolveErrorKind::Disposed;
            error!("{}", err);
            return Err(err);
        }

        let instantiator = match &registration.source {
            Source::Instance(instance) => {
                debug!("Found instance");
                return Ok(instance.clone());
            }
            Source::Instantiator(instantiator) => instantiator,
        };

        match registration.lifetime {
            Lifetime::Singleton if !self.is_root() => return self.root().get(registration),
            Lifetime::Scoped if self.is_root() && self.inner.config.validate_scopes => {
                let err = ResolveErrorKind::ScopedFromRoot {
                    service_type: registration.service_type,
                };
                error!("{}", err);
                return Err(err);
            }
            _ => {}
        }

        if registration.lifetime.is_cached() {
            if let Some(instance) = self.inner.cache.lock().get(registration.id) {
                debug!("Found in cache");
                return Ok(instance);
            }
            debug!("Not found in cache");
        }

        // Entered before the activation lock, so a re-entrant resolution fails instead of deadlocking
        let _resolving = ResolvingGuard::enter(self, registration).map_err(|err| {
            error!("{}", err);
            err
        })?;

        if !registration.lifetime.is_cached() {
            return self.activate(instantiator);
        }

        let _activating = self.inner.locks[registration.id].lock();
        if let Some(instance) = self.inner.cache.lock().get(registration.id) {
            debug!("Created by another thread");
            return Ok(instance);
        }

        let instance = self.activate(instantiator)?;
        let replaced = self.inner.cache.lock().insert(registration.id, instance.clone());
        drop(replaced);
        debug!(lifetime = %registration.lifetime, "Cached");

        Ok(instance)
    }

    fn activate(&self, instantiator: &BoxedInstantiator) -> Result<Instance, ResolveErrorKind> {
        match instantiator(self) {
            Ok(instance) => Ok(instance),
            Err(InstantiatorErrorKind::Deps(err)) => {
                error!("{}", err);
                Err(ResolveErrorKind::Instantiator(InstantiatorErrorKind::Deps(err)))
            }
            Err(InstantiatorErrorKind::Factory(err)) => {
                error!("{}", err);
                Err(ResolveErrorKind::Instantiator(InstantiatorErrorKind::Factory(err)))
            }
        }
    }
}

fn downcast_or_err<S: ?Sized + Send + Sync + 'static>(instance: &Instance, service_type: TypeInfo) -> Result<Arc<S>, ResolveErrorKind> {
    downcast(instance).ok_or_else(|| {
        let err = ResolveErrorKind::IncorrectType { expected: service_type };
        error!("{}", err);
        err
    })
}

#[inline]
fn activation_locks(registrations: usize) -> Box<[Mutex<()>]> {
    (0..registrations).map(|_| Mutex::new(())).collect()
}

pub(crate) struct ContainerInner {
    pub(crate) registry: Arc<Registry>,
    /// One lock per registration, held while a cached instance is created
    pub(crate) locks: Box<[Mutex<()>]>,
    pub(crate) config: Config,
    pub(crate) cache: Mutex<Cache>,
    pub(crate) root: Option<Container>,
    pub(crate) disposed: AtomicBool,
}

impl ContainerInner {
    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            debug!("Container already disposed");
            return;
        }

        // Instances are dropped out of the lock, their `Drop` may touch the container
        let instances = self.cache.lock().take();
        debug!(instances = instances.len(), "Container disposed");
        drop(instances);
    }
}

impl Drop for ContainerInner {
    fn drop(&mut self) {
        self.dispose();
    }
}
