use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info_span, warn};

use crate::{
    abstractions::{
        ServiceCollection, ServiceDescriptor, ServiceErrorKind, ServiceImplementation, ServiceLifetime, ServiceProvider,
        ServiceProviderIsService, ServiceScope, ServiceScopeFactory,
    },
    any::{Instance, TypeInfo},
    config::Config,
    errors::{BuildErrorKind, InstantiateErrorKind},
    lifetime::Lifetime,
    registry::ContainerBuilder,
    Container,
};

impl From<ServiceLifetime> for Lifetime {
    #[inline]
    fn from(lifetime: ServiceLifetime) -> Self {
        match lifetime {
            ServiceLifetime::Singleton => Lifetime::Singleton,
            ServiceLifetime::Scoped => Lifetime::Scoped,
            ServiceLifetime::Transient => Lifetime::Transient,
        }
    }
}

/// Options of a provider built from a [`ServiceCollection`]
#[derive(Clone, Copy, Debug, Default)]
pub struct ProviderOptions {
    /// Reject scoped services resolved from the root provider
    pub validate_scopes: bool,
}

impl From<ProviderOptions> for Config {
    #[inline]
    fn from(ProviderOptions { validate_scopes }: ProviderOptions) -> Self {
        Config { validate_scopes }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ProviderBuildErrorKind {
    #[error("Service `{}` is provided by the container itself and can't be registered", service_type.name)]
    ReservedServiceType { service_type: TypeInfo },
    #[error(transparent)]
    Build(#[from] BuildErrorKind),
}

/// Services registered by [`ContainerBuilder::build_service_provider`] before the described ones
#[inline]
#[must_use]
fn reserved_service_types() -> [TypeInfo; 3] {
    [
        TypeInfo::of::<dyn ServiceProvider>(),
        TypeInfo::of::<dyn ServiceScopeFactory>(),
        TypeInfo::of::<dyn ServiceProviderIsService>(),
    ]
}

/// Registers a described service in the builder.
///
/// An instance is registered as is and its declared lifetime is ignored.
/// A factory gets the provider of the container that resolves the service.
pub(crate) fn add_service(builder: &mut ContainerBuilder, descriptor: &ServiceDescriptor) {
    let service_type = descriptor.service_type();
    let lifetime: Lifetime = descriptor.lifetime().into();

    match descriptor.implementation() {
        ServiceImplementation::Instance(instance) => {
            builder.register_instance(service_type, instance.clone());
        }
        ServiceImplementation::Factory(factory) => {
            let factory = factory.clone();
            builder.register_factory(
                service_type,
                Arc::new(move |container: &Container| -> Result<Instance, InstantiateErrorKind> {
                    let provider = container.resolve::<dyn ServiceProvider>()?;
                    factory(&*provider).map_err(|err| InstantiateErrorKind::Custom(err.into()))
                }),
                lifetime,
            );
        }
        ServiceImplementation::Type(implementation) => {
            builder.register_type(service_type, implementation.clone(), lifetime);
        }
    }

    debug!(service = service_type.name, %lifetime, "Service added");
}

fn provider_facade(container: &Container) -> Result<Arc<dyn ServiceProvider>, InstantiateErrorKind> {
    Ok(Arc::new(ContainerServiceProvider::new(container.clone())))
}

fn scope_factory_facade(container: &Container) -> Result<Arc<dyn ServiceScopeFactory>, InstantiateErrorKind> {
    Ok(Arc::new(ContainerScopeFactory::new(container.clone())))
}

fn is_service_facade(container: &Container) -> Result<Arc<dyn ServiceProviderIsService>, InstantiateErrorKind> {
    Ok(Arc::new(ContainerIsService::new(container.clone())))
}

impl ContainerBuilder {
    /// Registers the described services and builds a root provider over the container.
    ///
    /// The provider, the scope factory and the is-service check are registered first as
    /// `dyn ServiceProvider`, `dyn ServiceScopeFactory` and `dyn ServiceProviderIsService`,
    /// so factories and implementations can depend on them.
    /// They're transient: each resolution wraps the container that resolves them.
    /// Two resolutions of the same facade, e.g. `dyn ServiceScopeFactory`, return different objects.
    ///
    /// # Errors
    /// - Returns [`ProviderBuildErrorKind::ReservedServiceType`] if the collection describes one of the services above
    /// - Returns [`ProviderBuildErrorKind::Build`] if the container can't be built
    pub fn build_service_provider(mut self, services: &ServiceCollection) -> Result<ContainerServiceProvider, ProviderBuildErrorKind> {
        let span = info_span!("build_service_provider", services = services.len());
        let _guard = span.enter();

        self.provide_factory::<dyn ServiceProvider, _>(provider_facade, Lifetime::Transient)
            .provide_factory::<dyn ServiceScopeFactory, _>(scope_factory_facade, Lifetime::Transient)
            .provide_factory::<dyn ServiceProviderIsService, _>(is_service_facade, Lifetime::Transient);

        let reserved = reserved_service_types();
        for descriptor in services {
            let service_type = descriptor.service_type();
            if reserved.contains(&service_type) {
                let err = ProviderBuildErrorKind::ReservedServiceType { service_type };
                warn!("{}", err);
                return Err(err);
            }

            add_service(&mut self, descriptor);
        }

        let container = self.build()?;

        debug!("Service provider built");

        Ok(ContainerServiceProvider::new(container))
    }
}

impl ServiceCollection {
    /// Builds a root provider with default options
    ///
    /// # Errors
    /// See [`ContainerBuilder::build_service_provider`]
    pub fn create_service_provider(&self) -> Result<ContainerServiceProvider, ProviderBuildErrorKind> {
        self.create_service_provider_with_options(ProviderOptions::default())
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn create_service_provider_with_options(&self, options: ProviderOptions) -> Result<ContainerServiceProvider, ProviderBuildErrorKind> {
        ContainerBuilder::new_with_config(options.into()).build_service_provider(self)
    }
}

/// [`ServiceProvider`] over a [`Container`].
///
/// Disposing the provider disposes the container, only the first call has effect.
pub struct ContainerServiceProvider {
    container: Container,
    disposed: AtomicBool,
}

impl ContainerServiceProvider {
    #[inline]
    #[must_use]
    pub fn new(container: Container) -> Self {
        Self {
            container,
            disposed: AtomicBool::new(false),
        }
    }

    #[inline]
    #[must_use]
    pub fn container(&self) -> &Container {
        &self.container
    }

    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl ServiceProvider for ContainerServiceProvider {
    #[inline]
    fn get_service(&self, service_type: &TypeInfo) -> Option<Instance> {
        self.container.try_resolve_instance(service_type)
    }

    #[inline]
    fn get_required_service(&self, service_type: &TypeInfo) -> Result<Instance, ServiceErrorKind> {
        self.container
            .resolve_instance(service_type)
            .map_err(|err| ServiceErrorKind::Resolve(err.into()))
    }

    #[inline]
    fn get_services(&self, service_type: &TypeInfo) -> Result<Vec<Instance>, ServiceErrorKind> {
        self.container
            .resolve_all_instances(service_type)
            .map_err(|err| ServiceErrorKind::Resolve(err.into()))
    }

    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            debug!("Provider already disposed");
            return;
        }

        self.container.dispose();
    }
}

/// [`ServiceScopeFactory`] that creates child containers of the root
pub struct ContainerScopeFactory {
    container: Container,
}

impl ContainerScopeFactory {
    #[inline]
    #[must_use]
    pub fn new(container: Container) -> Self {
        Self { container }
    }
}

impl ServiceScopeFactory for ContainerScopeFactory {
    fn create_scope(&self) -> Box<dyn ServiceScope> {
        Box::new(ContainerScope::new(self.container.create_scope()))
    }
}

/// [`ServiceScope`] owning a child container.
///
/// The scope is disposed when dropped.
pub struct ContainerScope {
    provider: ContainerServiceProvider,
}

impl ContainerScope {
    #[inline]
    #[must_use]
    pub fn new(container: Container) -> Self {
        Self {
            provider: ContainerServiceProvider::new(container),
        }
    }
}

impl ServiceScope for ContainerScope {
    #[inline]
    fn service_provider(&self) -> &dyn ServiceProvider {
        &self.provider
    }

    #[inline]
    fn dispose(&self) {
        self.provider.dispose();
    }
}

impl Drop for ContainerScope {
    fn drop(&mut self) {
        self.provider.dispose();
    }
}

/// [`ServiceProviderIsService`] that checks registrations of the container, nothing is created
pub struct ContainerIsService {
    container: Container,
}

impl ContainerIsService {
    #[inline]
    #[must_use]
    pub fn new(container: Container) -> Self {
        Self { container }
    }
}

impl ServiceProviderIsService for ContainerIsService {
    #[inline]
    fn is_service(&self, service_type: &TypeInfo) -> bool {
        self.container.is_registered(service_type)
    }
}

#[cfg(test)]
mod tests {
    use super::{add_service, ContainerScope, ContainerServiceProvider, ProviderBuildErrorKind};
    use crate::{
        abstractions::{
            ServiceCollection, ServiceDescriptor, ServiceErrorKind, ServiceImplementation, ServiceLifetime, ServiceProvider,
            ServiceProviderExt, ServiceProviderIsService, ServiceScope, ServiceScopeFactory,
        },
        any::TypeInfo,
        errors::{BuildErrorKind, InstantiateErrorKind},
        instantiator::{ImplementationType, Injectable},
        Config, ContainerBuilder, Lifetime, ResolveErrorKind,
    };

    use std::sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    };
    use tracing_test::traced_test;

    struct Connection;

    impl Injectable for Connection {
        type Deps = ();

        fn inject((): Self::Deps) -> Result<Self, InstantiateErrorKind> {
            Ok(Self)
        }
    }

    #[test]
    fn test_lifetime_mapping() {
        assert_eq!(Lifetime::from(ServiceLifetime::Singleton), Lifetime::Singleton);
        assert_eq!(Lifetime::from(ServiceLifetime::Scoped), Lifetime::Scoped);
        assert_eq!(Lifetime::from(ServiceLifetime::Transient), Lifetime::Transient);
    }

    #[test]
    #[traced_test]
    fn test_add_service_instance_ignores_lifetime() {
        let mut builder = ContainerBuilder::new_with_config(Config { validate_scopes: true });
        add_service(
            &mut builder,
            &ServiceDescriptor::new(
                TypeInfo::of::<u8>(),
                ServiceImplementation::Instance(Arc::new(Arc::new(7u8))),
                ServiceLifetime::Scoped,
            ),
        );
        let container = builder.build().unwrap();

        // Resolvable from the root even with scopes validation, so it isn't registered as scoped
        assert_eq!(*container.resolve::<u8>().unwrap(), 7);
    }

    #[test]
    #[traced_test]
    fn test_add_service_incompatible_type() {
        let mut builder = ContainerBuilder::new();
        add_service(
            &mut builder,
            &ServiceDescriptor::new(
                TypeInfo::of::<u8>(),
                ServiceImplementation::Type(ImplementationType::of::<Connection, Connection>()),
                ServiceLifetime::Transient,
            ),
        );

        assert!(matches!(builder.build(), Err(BuildErrorKind::IncompatibleImplementation { .. })));
    }

    #[test]
    #[traced_test]
    fn test_reserved_service_type() {
        let mut services = ServiceCollection::new();
        services.add_transient_factory::<dyn ServiceProvider, _>(|_: &dyn ServiceProvider| {
            Err(ServiceErrorKind::Factory(anyhow::anyhow!("unreachable")))
        });

        assert!(matches!(
            services.create_service_provider(),
            Err(ProviderBuildErrorKind::ReservedServiceType { service_type }) if service_type == TypeInfo::of::<dyn ServiceProvider>()
        ));
    }

    #[test]
    #[traced_test]
    fn test_framework_services() {
        let provider = ServiceCollection::new().create_service_provider().unwrap();

        assert!(provider.get::<dyn ServiceProvider>().is_some());
        assert!(provider.get::<dyn ServiceScopeFactory>().is_some());

        let is_service = provider.get_required::<dyn ServiceProviderIsService>().unwrap();
        assert!(is_service.is_service(&TypeInfo::of::<dyn ServiceProvider>()));
        assert!(is_service.is_service(&TypeInfo::of::<dyn ServiceScopeFactory>()));
        assert!(is_service.is_service(&TypeInfo::of::<dyn ServiceProviderIsService>()));
        assert!(!is_service.is_service(&TypeInfo::of::<Connection>()));
    }

    #[test]
    #[traced_test]
    fn test_framework_services_not_cached() {
        let provider = ServiceCollection::new().create_service_provider().unwrap();

        let scope_factory_1 = provider.get_required::<dyn ServiceScopeFactory>().unwrap();
        let scope_factory_2 = provider.get_required::<dyn ServiceScopeFactory>().unwrap();
        assert!(!Arc::ptr_eq(&scope_factory_1, &scope_factory_2));

        let provider_1 = provider.get_required::<dyn ServiceProvider>().unwrap();
        let provider_2 = provider.get_required::<dyn ServiceProvider>().unwrap();
        assert!(!Arc::ptr_eq(&provider_1, &provider_2));
    }

    #[test]
    #[traced_test]
    fn test_is_service_constructs_nothing() {
        let call_count = Arc::new(AtomicU8::new(0));

        let mut services = ServiceCollection::new();
        services.add_singleton_factory::<Connection, _>({
            let call_count = call_count.clone();
            move |_: &dyn ServiceProvider| {
                call_count.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(Connection))
            }
        });
        let provider = services.create_service_provider().unwrap();

        let is_service = provider.get_required::<dyn ServiceProviderIsService>().unwrap();
        assert!(is_service.is_service(&TypeInfo::of::<Connection>()));
        assert_eq!(call_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    #[traced_test]
    fn test_provider_dispose_idempotent() {
        let provider = ServiceCollection::new().create_service_provider().unwrap();

        provider.dispose();
        provider.dispose();

        assert!(provider.is_disposed());
        assert!(provider.container().is_disposed());
        assert!(matches!(
            provider.get_required::<dyn ServiceProvider>(),
            Err(ServiceErrorKind::Resolve(err)) if matches!(err.downcast_ref::<ResolveErrorKind>(), Some(ResolveErrorKind::Disposed))
        ));
    }

    #[test]
    #[traced_test]
    fn test_scope_dispose_forwards_to_child() {
        let mut services = ServiceCollection::new();
        services.add_scoped::<Connection, Connection>();
        let provider = services.create_service_provider().unwrap();

        let scope = ContainerScope::new(provider.container().create_scope());
        let connection = scope.service_provider().get_required::<Connection>().unwrap();
        assert_eq!(Arc::strong_count(&connection), 2);

        scope.dispose();

        assert_eq!(Arc::strong_count(&connection), 1);
        assert!(!provider.is_disposed());
        assert!(scope.service_provider().get::<Connection>().is_none());
    }

    #[test]
    #[traced_test]
    fn test_scope_drop_disposes() {
        let mut services = ServiceCollection::new();
        services.add_scoped::<Connection, Connection>();
        let provider = services.create_service_provider().unwrap();

        let connection = {
            let scope = provider.create_scope().unwrap();
            scope.service_provider().get_required::<Connection>().unwrap()
        };

        assert_eq!(Arc::strong_count(&connection), 1);
    }

    #[test]
    fn test_thread_safe() {
        fn impl_bounds<T: Send + Sync + 'static>() {}

        impl_bounds::<(ContainerServiceProvider, ContainerScope, ProviderBuildErrorKind)>();
    }
}
