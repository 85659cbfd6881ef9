use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum BuildErrorKind {
    #[error(
        "Implementation `{}` provides `{}`, but it's registered for `{}`",
        implementation.name, provides.name, service_type.name,
    )]
    IncompatibleImplementation {
        service_type: TypeInfo,
        implementation: TypeInfo,
        provides: TypeInfo,
    },
}
