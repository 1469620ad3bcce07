use std::collections::{BTreeMap, BTreeSet};

use crate::{
    errors::RegistryErrorKind,
    module::{DefinitionView, Factory, Instance, Module},
};

/// One registered module: its factory, ordered dependency names, resolved or
/// pending cache flag, tag set, and the cache slot.
///
/// `cache` starts as the registered tri-state option; the policy resolver
/// memoizes the inherited flag into it on first access.
pub(crate) struct Definition {
    pub(crate) factory: Factory,
    pub(crate) dependencies: Vec<String>,
    pub(crate) cache: Option<bool>,
    pub(crate) tags: BTreeSet<String>,
    pub(crate) cached_instance: Option<Instance>,
}

impl Definition {
    #[must_use]
    fn view(&self) -> DefinitionView {
        DefinitionView {
            kind: self.factory.kind(),
            dependencies: self.dependencies.clone(),
            cache: self.cache,
            tags: self.tags.clone(),
            has_cached_instance: self.cached_instance.is_some(),
        }
    }
}

/// Name-keyed definition store. Names are opaque, case-sensitive and unique
/// at any point in time.
pub(crate) struct Registry {
    definitions: BTreeMap<String, Definition>,
}

impl Registry {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            definitions: BTreeMap::new(),
        }
    }

    pub(crate) fn register(&mut self, name: &str, module: Module) -> Result<(), RegistryErrorKind> {
        if name.is_empty() {
            return Err(RegistryErrorKind::EmptyModule);
        }
        if self.definitions.contains_key(name) {
            return Err(RegistryErrorKind::DuplicateModule { name: name.into() });
        }

        let Module {
            factory,
            dependencies,
            options,
        } = module;
        self.definitions.insert(
            name.into(),
            Definition {
                factory,
                dependencies,
                cache: options.cache,
                tags: options.tags,
                cached_instance: None,
            },
        );

        Ok(())
    }

    /// Removes any definition under `name`, then registers. The displaced
    /// definition's cached instance is discarded with it.
    pub(crate) fn replace(&mut self, name: &str, module: Module) -> Result<(), RegistryErrorKind> {
        self.definitions.remove(name);
        self.register(name, module)
    }

    pub(crate) fn unregister(&mut self, name: &str) {
        self.definitions.remove(name);
    }

    pub(crate) fn clear(&mut self) {
        self.definitions.clear();
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(name)
    }

    #[inline]
    #[must_use]
    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Definition> {
        self.definitions.get_mut(name)
    }

    #[must_use]
    pub(crate) fn names_with_tag(&self, tag: &str) -> Vec<String> {
        self.definitions
            .iter()
            .filter(|(_, definition)| definition.tags.contains(tag))
            .map(|(name, _)| name.clone())
            .collect()
    }

    #[must_use]
    pub(crate) fn views(&self) -> BTreeMap<String, DefinitionView> {
        self.definitions
            .iter()
            .map(|(name, definition)| (name.clone(), definition.view()))
            .collect()
    }
}
