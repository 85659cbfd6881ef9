use core::fmt::{self, Display, Formatter};

use super::{instantiate::InstantiateErrorKind, instantiator::InstantiatorErrorKind};
use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Registration for `{}` not found in container", service_type.name)]
    NoRegistration { service_type: TypeInfo },
    #[error("Container is disposed")]
    Disposed,
    #[error(
        "\
        Scoped registration for `{}` can't be resolved from the root container. \
        Create a scope and resolve it from there\
        ",
        service_type.name,
    )]
    ScopedFromRoot { service_type: TypeInfo },
    #[error("Incorrect instance type. Expected: `{}`", expected.name)]
    IncorrectType { expected: TypeInfo },
    #[error("Cyclic dependency detected: {}", DependencyGraph(graph))]
    CyclicDependency { graph: Box<[TypeInfo]> },
    #[error(transparent)]
    Instantiator(InstantiatorErrorKind<Box<ResolveErrorKind>, InstantiateErrorKind>),
}

struct DependencyGraph<'a>(&'a [TypeInfo]);

impl Display for DependencyGraph<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut type_infos = self.0.iter();
        if let Some(type_info) = type_infos.next() {
            write!(f, "{}", type_info.short_name())?;
        }
        for type_info in type_infos {
            write!(f, " -> {}", type_info.short_name())?;
        }
        Ok(())
    }
}
