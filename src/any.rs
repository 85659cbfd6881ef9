use core::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};
use std::sync::Arc;

/// Type-erased service value.
///
/// The concrete content is always `Arc<S>`, where `S` is the registered service type.
/// Keeping the inner `Arc` lets `S` be unsized, so trait objects like `dyn Repo` can be services.
pub type Instance = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit_once("::").map_or(self.name, |(_, name)| name)
    }
}

/// Wraps a service value into an [`Instance`].
#[inline]
#[must_use]
pub(crate) fn erase<S: ?Sized + Send + Sync + 'static>(service: Arc<S>) -> Instance {
    Arc::new(service)
}

/// Gets the service value back from an [`Instance`], returns `None` if it was created for another service type.
#[inline]
#[must_use]
pub(crate) fn downcast<S: ?Sized + Send + Sync + 'static>(instance: &Instance) -> Option<Arc<S>> {
    instance.downcast_ref::<Arc<S>>().cloned()
}

#[cfg(test)]
mod tests {
    use super::{downcast, erase, TypeInfo};

    use std::sync::Arc;

    trait Named: Send + Sync {
        fn name(&self) -> &'static str;
    }

    struct Repo;

    impl Named for Repo {
        fn name(&self) -> &'static str {
            "repo"
        }
    }

    #[test]
    fn test_type_info_eq_by_id() {
        assert_eq!(TypeInfo::of::<Repo>(), TypeInfo::of::<Repo>());
        assert_ne!(TypeInfo::of::<Repo>(), TypeInfo::of::<dyn Named>());
        assert_eq!(TypeInfo::of::<Repo>().short_name(), "Repo");
    }

    #[test]
    fn test_erase_unsized() {
        let instance = erase::<dyn Named>(Arc::new(Repo));

        assert_eq!(downcast::<dyn Named>(&instance).unwrap().name(), "repo");
        assert!(downcast::<Repo>(&instance).is_none());
    }
}
