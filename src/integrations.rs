pub mod service_provider;
