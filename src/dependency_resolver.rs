use super::errors::ResolveErrorKind;
use crate::Container;

pub trait DependencyResolver: Sized {
    #[allow(clippy::missing_errors_doc)]
    fn resolve(container: &Container) -> Result<Self, ResolveErrorKind>;
}

macro_rules! impl_dependency_resolver {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case, unused_mut)]
        impl<$($ty,)*> DependencyResolver for ($($ty,)*)
        where
            $( $ty: DependencyResolver, )*
        {
            #[inline]
            #[allow(unused_variables)]
            fn resolve(container: &Container) -> Result<Self, ResolveErrorKind> {
                Ok(($($ty::resolve(container)?,)*))
            }
        }
    };
}

all_the_tuples!(impl_dependency_resolver);
