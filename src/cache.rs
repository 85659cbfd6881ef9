use std::{collections::BTreeMap, mem};

use crate::any::Instance;

/// Instances of cached lifetimes, keyed by registration id
#[derive(Default)]
pub(crate) struct Cache {
    pub(crate) map: BTreeMap<usize, Instance>,
}

impl Cache {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self { map: BTreeMap::new() }
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, registration_id: usize) -> Option<Instance> {
        self.map.get(&registration_id).cloned()
    }

    /// Stores the instance and returns the replaced one.
    /// The replaced instance must be dropped after the cache lock is released, its `Drop` may resolve from the container.
    #[inline]
    #[must_use]
    pub(crate) fn insert(&mut self, registration_id: usize, instance: Instance) -> Option<Instance> {
        self.map.insert(registration_id, instance)
    }

    #[inline]
    #[must_use]
    pub(crate) fn take(&mut self) -> BTreeMap<usize, Instance> {
        mem::take(&mut self.map)
    }
}
