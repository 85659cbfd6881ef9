use std::{slice, sync::Arc, vec};

use super::{
    descriptor::ServiceDescriptor, errors::ServiceErrorKind, lifetime::ServiceLifetime, provider::ServiceProvider,
};
use crate::{
    any::TypeInfo,
    instantiator::{Implements, Injectable},
};

/// Ordered list of service descriptors.
///
/// The order is kept when the collection is turned into a provider,
/// so the last descriptor of a service type wins for single resolution.
#[derive(Clone, Debug, Default)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceCollection {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Adds the descriptor only if its service type isn't described yet
    pub fn try_add(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        if !self.contains(&descriptor.service_type()) {
            self.descriptors.push(descriptor);
        }
        self
    }

    pub fn add_singleton<S, I>(&mut self) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<S>,
    {
        self.add(ServiceDescriptor::singleton::<S, I>())
    }

    pub fn add_scoped<S, I>(&mut self) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<S>,
    {
        self.add(ServiceDescriptor::scoped::<S, I>())
    }

    pub fn add_transient<S, I>(&mut self) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<S>,
    {
        self.add(ServiceDescriptor::transient::<S, I>())
    }

    pub fn add_singleton_factory<S, F>(&mut self, factory: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&dyn ServiceProvider) -> Result<Arc<S>, ServiceErrorKind> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::describe_factory(factory, ServiceLifetime::Singleton))
    }

    pub fn add_scoped_factory<S, F>(&mut self, factory: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&dyn ServiceProvider) -> Result<Arc<S>, ServiceErrorKind> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::describe_factory(factory, ServiceLifetime::Scoped))
    }

    pub fn add_transient_factory<S, F>(&mut self, factory: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&dyn ServiceProvider) -> Result<Arc<S>, ServiceErrorKind> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::describe_factory(factory, ServiceLifetime::Transient))
    }

    pub fn add_instance<S>(&mut self, instance: Arc<S>) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::instance(instance))
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, service_type: &TypeInfo) -> bool {
        self.descriptors
            .iter()
            .any(|descriptor| descriptor.service_type() == *service_type)
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, ServiceDescriptor> {
        self.descriptors.iter()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl<'a> IntoIterator for &'a ServiceCollection {
    type Item = &'a ServiceDescriptor;
    type IntoIter = slice::Iter<'a, ServiceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for ServiceCollection {
    type Item = ServiceDescriptor;
    type IntoIter = vec::IntoIter<ServiceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}

impl FromIterator<ServiceDescriptor> for ServiceCollection {
    fn from_iter<T: IntoIterator<Item = ServiceDescriptor>>(iter: T) -> Self {
        Self {
            descriptors: iter.into_iter().collect(),
        }
    }
}

impl Extend<ServiceDescriptor> for ServiceCollection {
    fn extend<T: IntoIterator<Item = ServiceDescriptor>>(&mut self, iter: T) {
        self.descriptors.extend(iter);
    }
}
