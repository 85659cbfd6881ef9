#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod cache;
pub(crate) mod config;
pub(crate) mod container;
pub(crate) mod dependency_resolver;
pub(crate) mod errors;
pub(crate) mod inject;
pub(crate) mod instantiator;
pub(crate) mod integrations;
pub(crate) mod lifetime;
pub(crate) mod registry;

pub mod abstractions;

pub use any::{Instance, TypeInfo};
pub use config::Config;
pub use container::Container;
pub use dependency_resolver::DependencyResolver;
pub use errors::{BuildErrorKind, InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind};
pub use inject::{Inject, InjectAll, InjectOptional};
pub use instantiator::{Implements, ImplementationType, Injectable};
pub use integrations::service_provider::{
    ContainerIsService, ContainerScope, ContainerScopeFactory, ContainerServiceProvider, ProviderBuildErrorKind, ProviderOptions,
};
pub use lifetime::Lifetime;
pub use registry::{ContainerBuilder, Factory};
