use std::{collections::BTreeMap, sync::Arc};
use tracing::debug;

use crate::{
    any::{erase, Instance, TypeInfo},
    config::Config,
    errors::{BuildErrorKind, InstantiateErrorKind, InstantiatorErrorKind},
    instantiator::{BoxedInstantiator, ImplementationType, Implements, Injectable, InstantiatorResult},
    lifetime::Lifetime,
    Container,
};

/// Type-erased factory, it must return an [`Instance`] of the service it's registered for
pub type Factory = Arc<dyn Fn(&Container) -> Result<Instance, InstantiateErrorKind> + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Source {
    Instance(Instance),
    Instantiator(BoxedInstantiator),
}

#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) id: usize,
    pub(crate) service_type: TypeInfo,
    pub(crate) lifetime: Lifetime,
    pub(crate) source: Source,
}

/// Builder of a [`Container`].
///
/// Registrations keep their order. If a service is registered several times,
/// the last registration wins for single resolution, and all of them are used by [`Container::resolve_all`].
pub struct ContainerBuilder {
    registrations: Vec<Registration>,
    incompatible: Option<BuildErrorKind>,
    config: Config,
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_config(Config::default())
    }

    #[inline]
    #[must_use]
    pub fn new_with_config(config: Config) -> Self {
        Self {
            registrations: Vec::new(),
            incompatible: None,
            config,
        }
    }

    /// Registers a type-to-type binding.
    ///
    /// # Warning
    /// If the implementation provides another service than `service_type`, [`Self::build`] fails
    /// with [`BuildErrorKind::IncompatibleImplementation`].
    pub fn register_type(&mut self, service_type: TypeInfo, implementation: ImplementationType, lifetime: Lifetime) -> &mut Self {
        if implementation.provides != service_type && self.incompatible.is_none() {
            self.incompatible = Some(BuildErrorKind::IncompatibleImplementation {
                service_type,
                implementation: implementation.type_info,
                provides: implementation.provides,
            });
        }

        self.push(service_type, lifetime, Source::Instantiator(implementation.instantiator))
    }

    pub fn register_factory(&mut self, service_type: TypeInfo, factory: Factory, lifetime: Lifetime) -> &mut Self {
        let instantiator: BoxedInstantiator = Arc::new(move |container: &Container| -> InstantiatorResult {
            let instance = factory(container).map_err(InstantiatorErrorKind::Factory)?;

            debug!("Created by factory");

            Ok(instance)
        });

        self.push(service_type, lifetime, Source::Instantiator(instantiator))
    }

    /// Registers a pre-built value, the same instance is returned from every container
    pub fn register_instance(&mut self, service_type: TypeInfo, instance: Instance) -> &mut Self {
        self.push(service_type, Lifetime::Singleton, Source::Instance(instance))
    }

    pub fn provide<S, I>(&mut self, lifetime: Lifetime) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<S>,
    {
        self.register_type(TypeInfo::of::<S>(), ImplementationType::of::<S, I>(), lifetime)
    }

    pub fn provide_factory<S, F>(&mut self, factory: F, lifetime: Lifetime) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<S>, InstantiateErrorKind> + Send + Sync + 'static,
    {
        self.register_factory(
            TypeInfo::of::<S>(),
            Arc::new(move |container: &Container| factory(container).map(erase)),
            lifetime,
        )
    }

    pub fn provide_instance<S>(&mut self, instance: Arc<S>) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.register_instance(TypeInfo::of::<S>(), erase(instance))
    }

    #[inline]
    #[must_use]
    pub fn is_registered(&self, service_type: &TypeInfo) -> bool {
        self.registrations
            .iter()
            .any(|registration| registration.service_type == *service_type)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Finalizes registrations into a root container.
    ///
    /// # Errors
    /// - Returns [`BuildErrorKind::IncompatibleImplementation`] if a type-to-type registration
    ///   provides another service than it's registered for
    pub fn build(self) -> Result<Container, BuildErrorKind> {
        if let Some(err) = self.incompatible {
            return Err(err);
        }

        debug!(registrations = self.registrations.len(), "Container built");

        Ok(Container::new(Registry::new(self.registrations), self.config))
    }
}

impl ContainerBuilder {
    fn push(&mut self, service_type: TypeInfo, lifetime: Lifetime, source: Source) -> &mut Self {
        let id = self.registrations.len();
        self.registrations.push(Registration {
            id,
            service_type,
            lifetime,
            source,
        });
        self
    }
}

pub(crate) struct Registry {
    registrations: Vec<Registration>,
    by_service_type: BTreeMap<TypeInfo, Vec<usize>>,
}

impl Registry {
    pub(crate) fn new(registrations: Vec<Registration>) -> Self {
        let mut by_service_type: BTreeMap<TypeInfo, Vec<usize>> = BTreeMap::new();
        for registration in &registrations {
            by_service_type
                .entry(registration.service_type)
                .or_default()
                .push(registration.id);
        }

        Self {
            registrations,
            by_service_type,
        }
    }

    /// Gets the registration that wins single resolution
    #[inline]
    pub(crate) fn get(&self, service_type: &TypeInfo) -> Option<&Registration> {
        self.by_service_type
            .get(service_type)
            .and_then(|ids| ids.last())
            .map(|id| &self.registrations[*id])
    }

    #[inline]
    pub(crate) fn get_all(&self, service_type: &TypeInfo) -> impl Iterator<Item = &Registration> {
        self.by_service_type
            .get(service_type)
            .into_iter()
            .flatten()
            .map(|id| &self.registrations[*id])
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.registrations.len()
    }

    #[inline]
    pub(crate) fn contains(&self, service_type: &TypeInfo) -> bool {
        self.by_service_type.contains_key(service_type)
    }
}
