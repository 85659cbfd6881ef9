use std::sync::Arc;

use super::errors::ServiceErrorKind;
use crate::any::{downcast, Instance, TypeInfo};

/// Resolves services by their type.
///
/// Instances are type-erased, use [`ServiceProviderExt`] to get typed ones.
pub trait ServiceProvider: Send + Sync {
    /// Gets the service or `None` if it isn't registered or can't be created.
    /// This method never fails.
    fn get_service(&self, service_type: &TypeInfo) -> Option<Instance>;

    /// Gets the service.
    ///
    /// # Errors
    /// Returns [`ServiceErrorKind::Resolve`] with the error of the underlying container
    /// if the service isn't registered or can't be created
    fn get_required_service(&self, service_type: &TypeInfo) -> Result<Instance, ServiceErrorKind>;

    /// Gets every registered implementation of the service in registration order.
    /// Returns an empty list if the service isn't registered.
    ///
    /// # Errors
    /// Returns [`ServiceErrorKind::Resolve`] if one of the implementations can't be created
    fn get_services(&self, service_type: &TypeInfo) -> Result<Vec<Instance>, ServiceErrorKind>;

    /// Releases the instances owned by the provider.
    /// Repeated calls have no effect.
    fn dispose(&self);
}

/// Bounded resolution context.
///
/// Scoped services resolved from [`ServiceScope::service_provider`] live until the scope is disposed,
/// singletons are shared with the provider the scope was created from.
pub trait ServiceScope: Send + Sync {
    fn service_provider(&self) -> &dyn ServiceProvider;

    fn dispose(&self);
}

pub trait ServiceScopeFactory: Send + Sync {
    fn create_scope(&self) -> Box<dyn ServiceScope>;
}

/// Checks whether a service can be got from the provider without creating it
pub trait ServiceProviderIsService: Send + Sync {
    fn is_service(&self, service_type: &TypeInfo) -> bool;
}

/// Typed helpers over any [`ServiceProvider`]
pub trait ServiceProviderExt: ServiceProvider {
    #[must_use]
    fn get<S: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<S>> {
        self.get_service(&TypeInfo::of::<S>())
            .and_then(|instance| downcast(&instance))
    }

    /// # Errors
    /// - Returns [`ServiceErrorKind::Resolve`] if the service can't be resolved
    /// - Returns [`ServiceErrorKind::IncorrectType`] if the provider returned an instance of another type
    fn get_required<S: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<S>, ServiceErrorKind> {
        let service_type = TypeInfo::of::<S>();
        let instance = self.get_required_service(&service_type)?;
        downcast(&instance).ok_or(ServiceErrorKind::IncorrectType { expected: service_type })
    }

    #[allow(clippy::missing_errors_doc)]
    fn get_all<S: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<S>>, ServiceErrorKind> {
        let service_type = TypeInfo::of::<S>();
        self.get_services(&service_type)?
            .iter()
            .map(|instance| downcast::<S>(instance).ok_or(ServiceErrorKind::IncorrectType { expected: service_type }))
            .collect()
    }

    /// Creates a scope with the provider's [`ServiceScopeFactory`].
    ///
    /// # Errors
    /// Returns [`ServiceErrorKind::Resolve`] if the provider has no scope factory
    fn create_scope(&self) -> Result<Box<dyn ServiceScope>, ServiceErrorKind> {
        Ok(self.get_required::<dyn ServiceScopeFactory>()?.create_scope())
    }
}

impl<P: ServiceProvider + ?Sized> ServiceProviderExt for P {}

#[cfg(test)]
mod tests {
    use super::{ServiceProvider, ServiceProviderExt};
    use crate::{
        abstractions::ServiceErrorKind,
        any::{erase, Instance, TypeInfo},
        ResolveErrorKind,
    };

    use std::sync::Arc;

    /// Provider with a single `u8` and a `u16` registered as `u32`
    struct StubProvider;

    impl ServiceProvider for StubProvider {
        fn get_service(&self, service_type: &TypeInfo) -> Option<Instance> {
            self.get_required_service(service_type).ok()
        }

        fn get_required_service(&self, service_type: &TypeInfo) -> Result<Instance, ServiceErrorKind> {
            if *service_type == TypeInfo::of::<u8>() {
                Ok(erase(Arc::new(1u8)))
            } else if *service_type == TypeInfo::of::<u32>() {
                Ok(erase(Arc::new(1u16)))
            } else {
                Err(ServiceErrorKind::Resolve(
                    ResolveErrorKind::NoRegistration {
                        service_type: *service_type,
                    }
                    .into(),
                ))
            }
        }

        fn get_services(&self, service_type: &TypeInfo) -> Result<Vec<Instance>, ServiceErrorKind> {
            Ok(self.get_service(service_type).into_iter().collect())
        }

        fn dispose(&self) {}
    }

    #[test]
    fn test_typed_get() {
        let provider: &dyn ServiceProvider = &StubProvider;

        assert_eq!(*provider.get::<u8>().unwrap(), 1);
        assert_eq!(*provider.get_required::<u8>().unwrap(), 1);
        assert_eq!(provider.get_all::<u8>().unwrap().len(), 1);
        assert!(provider.get::<u64>().is_none());
        assert!(provider.get_all::<u64>().unwrap().is_empty());
    }

    #[test]
    fn test_typed_get_incorrect_type() {
        assert!(StubProvider.get::<u32>().is_none());
        assert!(matches!(
            StubProvider.get_required::<u32>(),
            Err(ServiceErrorKind::IncorrectType { expected }) if expected == TypeInfo::of::<u32>()
        ));
    }

    #[test]
    fn test_create_scope_without_factory() {
        assert!(matches!(StubProvider.create_scope(), Err(ServiceErrorKind::Resolve(_))));
    }
}
