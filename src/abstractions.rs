//! Standard service-provider contracts.
//!
//! Application code describes its services with a [`ServiceCollection`] and consumes them
//! through [`ServiceProvider`], [`ServiceScopeFactory`] and [`ServiceProviderIsService`]
//! without knowing which container stands behind them.

mod collection;
mod descriptor;
mod errors;
mod lifetime;
mod provider;

pub use collection::ServiceCollection;
pub use descriptor::{ImplementationFactory, ServiceDescriptor, ServiceImplementation};
pub use errors::{LifetimeErrorKind, ServiceErrorKind};
pub use lifetime::ServiceLifetime;
pub use provider::{ServiceProvider, ServiceProviderExt, ServiceProviderIsService, ServiceScope, ServiceScopeFactory};
