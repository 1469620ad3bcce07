use std::{collections::BTreeMap, sync::Arc};

use crate::module::Instance;

/// Call-scoped dependency substitutions for a single resolution.
///
/// A name present here is used directly wherever it appears in the resolved
/// subtree: the registry is not consulted for it and nothing resolved under
/// a non-empty override set is ever stored in the persistent cache.
#[derive(Default, Clone)]
pub struct Overrides {
    map: Option<Box<BTreeMap<String, Instance>>>,
}

impl Overrides {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { map: None }
    }

    #[inline]
    pub fn insert<T: Send + Sync + 'static>(&mut self, name: impl Into<String>, value: T) -> Option<Instance> {
        self.insert_instance(name, Arc::new(value))
    }

    #[inline]
    pub fn insert_instance(&mut self, name: impl Into<String>, instance: Instance) -> Option<Instance> {
        self.map.get_or_insert_with(Box::default).insert(name.into(), instance)
    }

    #[inline]
    #[must_use]
    pub fn with<T: Send + Sync + 'static>(mut self, name: impl Into<String>, value: T) -> Self {
        self.insert(name, value);
        self
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, name: &str) -> Option<&Instance> {
        self.map.as_ref().and_then(|map| map.get(name))
    }

    #[inline]
    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.map.as_ref().map_or(true, |map| map.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::Overrides;

    #[test]
    fn test_empty_by_default() {
        assert!(Overrides::new().is_empty());
        assert!(Overrides::default().is_empty());
    }

    #[test]
    fn test_insert_returns_displaced_handle() {
        let mut overrides = Overrides::new();

        assert!(overrides.insert("db", 1i32).is_none());
        let displaced = overrides.insert("db", 2i32).unwrap();
        assert_eq!(*displaced.downcast::<i32>().unwrap(), 1);

        assert!(!overrides.is_empty());
        assert_eq!(*overrides.get("db").unwrap().clone().downcast::<i32>().unwrap(), 2);
        assert!(overrides.get("queue").is_none());
    }

    #[test]
    fn test_with_builder() {
        let overrides = Overrides::new().with("db", 1i32).with("queue", "amqp".to_string());

        assert!(overrides.get("db").is_some());
        assert!(overrides.get("queue").is_some());
    }
}
