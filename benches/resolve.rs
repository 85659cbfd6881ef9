#![allow(dead_code)]

use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use vessel::{
    abstractions::{ServiceCollection, ServiceProvider, ServiceProviderExt},
    Container, ContainerBuilder, Inject, Injectable, InstantiateErrorKind, Lifetime,
};

struct A(Arc<B>, Arc<C>);
struct B(i32);
struct C(Arc<CA>);
struct CA(Arc<CAA>);
struct CAA;

impl Injectable for A {
    type Deps = (Inject<B>, Inject<C>);

    fn inject((Inject(b), Inject(c)): Self::Deps) -> Result<Self, InstantiateErrorKind> {
        Ok(Self(b, c))
    }
}

impl Injectable for B {
    type Deps = ();

    fn inject((): Self::Deps) -> Result<Self, InstantiateErrorKind> {
        Ok(Self(2))
    }
}

impl Injectable for C {
    type Deps = (Inject<CA>,);

    fn inject((Inject(ca),): Self::Deps) -> Result<Self, InstantiateErrorKind> {
        Ok(Self(ca))
    }
}

impl Injectable for CA {
    type Deps = (Inject<CAA>,);

    fn inject((Inject(caa),): Self::Deps) -> Result<Self, InstantiateErrorKind> {
        Ok(Self(caa))
    }
}

impl Injectable for CAA {
    type Deps = ();

    fn inject((): Self::Deps) -> Result<Self, InstantiateErrorKind> {
        Ok(Self)
    }
}

#[inline]
fn container_new(lifetime: Lifetime) -> Container {
    let mut builder = ContainerBuilder::new();
    builder
        .provide::<CAA, CAA>(lifetime)
        .provide::<CA, CA>(lifetime)
        .provide::<C, C>(lifetime)
        .provide::<B, B>(lifetime)
        .provide::<A, A>(lifetime);
    builder.build().unwrap()
}

#[inline]
fn services() -> ServiceCollection {
    let mut services = ServiceCollection::new();
    services
        .add_scoped::<CAA, CAA>()
        .add_scoped::<CA, CA>()
        .add_scoped::<C, C>()
        .add_singleton::<B, B>()
        .add_scoped::<A, A>();
    services
}

#[inline]
fn container_resolve(container: &Container) {
    let _ = container.resolve::<A>().unwrap();
}

#[inline]
fn scope_resolve(root: &Container) {
    let scope = root.create_scope();
    let _ = scope.resolve::<A>().unwrap();
    scope.dispose();
}

#[inline]
fn provider_scope_resolve(provider: &dyn ServiceProvider) {
    let scope = provider.create_scope().unwrap();
    let _ = scope.service_provider().get_required::<A>().unwrap();
}

fn criterion_benchmark(c: &mut Criterion) {
    let transient = container_new(Lifetime::Transient);
    let scoped = container_new(Lifetime::Scoped);
    let provider = services().create_service_provider().unwrap();

    c.bench_function("container_build", |b| b.iter(|| container_new(Lifetime::Scoped)))
        .bench_function("container_resolve_transient", |b| b.iter(|| container_resolve(&transient)))
        .bench_function("container_resolve_with_cache", |b| b.iter(|| container_resolve(&scoped)))
        .bench_function("container_scope_resolve", |b| b.iter(|| scope_resolve(&scoped)))
        .bench_function("service_provider_build", |b| {
            let services = services();
            b.iter(|| services.create_service_provider().unwrap())
        })
        .bench_function("service_provider_scope_resolve", |b| b.iter(|| provider_scope_resolve(&provider)));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
