use core::any::type_name;
use core::fmt::{self, Display, Formatter};
use std::{collections::BTreeMap, sync::Arc};

use parking_lot::Mutex;
use tracing::{debug, error, info_span};

use crate::{
    cache,
    errors::{RegistryErrorKind, ResolveErrorKind},
    module::{Args, DefinitionView, Factory, Instance, Module},
    overrides::Overrides,
    registry::Registry,
};

/// Reserved name under which every container registers itself, so any module
/// may declare the container as a dependency.
pub const CONTAINER_MODULE: &str = "container";

/// Ordered chain of in-progress module names within one resolution, used for
/// cycle detection and error reporting. Discarded when the resolution
/// completes or fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionPath(Vec<String>);

impl ResolutionPath {
    #[inline]
    pub(crate) fn push(&mut self, name: &str) {
        self.0.push(name.into());
    }

    #[inline]
    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }

    #[inline]
    #[must_use]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|segment| segment == name)
    }

    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl Display for ResolutionPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut segments = self.0.iter();
        if let Some(segment) = segments.next() {
            write!(f, "{segment}")?;
            for segment in segments {
                write!(f, " > {segment}")?;
            }
        }
        Ok(())
    }
}

/// A name-keyed IoC container.
///
/// Modules are registered under unique names with explicit ordered
/// dependency lists and are instantiated lazily on [`Container::get`].
/// Whether an instance is shared across calls is decided per module: an
/// explicit cache flag wins, an unset flag is inherited from the dependency
/// graph (any fresh-per-use dependency makes the dependent fresh-per-use).
///
/// Cloning the container clones a handle; all clones share the same
/// registry and cache.
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    registry: Mutex<Registry>,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    /// Creates an empty container holding only its own self-registration
    /// under [`CONTAINER_MODULE`].
    #[must_use]
    pub fn new() -> Self {
        let container = Self {
            inner: Arc::new(ContainerInner {
                registry: Mutex::new(Registry::new()),
            }),
        };
        let handle: Instance = Arc::new(container.clone());
        container
            .inner
            .registry
            .lock()
            .register(CONTAINER_MODULE, Module::artifact_instance(handle).cache(true))
            .expect("new registry cannot hold the reserved name");
        container
    }

    /// Registers a module under a unique name.
    ///
    /// # Errors
    /// - Returns [`RegistryErrorKind::EmptyModule`] if `name` is empty
    /// - Returns [`RegistryErrorKind::DuplicateModule`] if `name` is taken
    pub fn register(&self, name: &str, module: Module) -> Result<(), RegistryErrorKind> {
        self.inner.registry.lock().register(name, module)
    }

    /// Replaces any definition under `name` with a fresh registration. Never
    /// fails on duplicates; the displaced definition's cached instance is
    /// discarded. This is the only sanctioned way to swap a definition.
    ///
    /// # Errors
    /// Returns [`RegistryErrorKind::EmptyModule`] if `name` is empty
    pub fn replace(&self, name: &str, module: Module) -> Result<(), RegistryErrorKind> {
        self.inner.registry.lock().replace(name, module)
    }

    /// Removes the definition under `name`; no-op if absent.
    pub fn unregister(&self, name: &str) {
        self.inner.registry.lock().unregister(name);
    }

    /// Removes all definitions, then re-establishes the self-registration
    /// entry in the same critical section.
    pub fn clear(&self) {
        let handle: Instance = Arc::new(self.clone());
        let mut registry = self.inner.registry.lock();
        registry.clear();
        registry
            .register(CONTAINER_MODULE, Module::artifact_instance(handle).cache(true))
            .expect("cleared registry cannot hold the reserved name");
    }

    /// Resolves a module instance by name.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::ModuleNotFound`] if `name` is unregistered
    /// - Returns [`ResolveErrorKind::DependencyNotFound`] if a dependency name has no registration
    /// - Returns [`ResolveErrorKind::CircularDependency`] if a name recurs within the resolution path
    /// - Returns [`ResolveErrorKind::InstantiationFailed`] if the factory raised
    pub fn get(&self, name: &str) -> Result<Instance, ResolveErrorKind> {
        self.get_with(name, &Overrides::new())
    }

    /// Resolves a module instance with call-scoped dependency substitutions.
    ///
    /// Overrides apply transitively to every dependency in the subtree for
    /// this one call. A non-empty override set bypasses the cache in both
    /// directions: no cached instance is returned and nothing is stored.
    ///
    /// # Errors
    /// Same as [`Container::get`].
    pub fn get_with(&self, name: &str, overrides: &Overrides) -> Result<Instance, ResolveErrorKind> {
        let span = info_span!("get", module = name);
        let _guard = span.enter();

        self.resolve(name, overrides, &mut ResolutionPath::default())
    }

    /// Resolves a module and downcasts it to its concrete type.
    ///
    /// # Errors
    /// Same as [`Container::get`], plus [`ResolveErrorKind::IncorrectType`]
    /// if the instance is not a `T`.
    pub fn get_as<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, ResolveErrorKind> {
        self.get(name)?.downcast().map_err(|instance| {
            let err = ResolveErrorKind::IncorrectType {
                expected: type_name::<T>(),
                actual: (*instance).type_id(),
            };
            error!("{err}");
            err
        })
    }

    /// Resolves every module whose tag set contains `tag`, each under its own
    /// cache policy, into a name-to-instance mapping.
    ///
    /// # Errors
    /// Same as [`Container::get`], for the first tagged module that fails.
    pub fn get_by_tag(&self, tag: &str) -> Result<BTreeMap<String, Instance>, ResolveErrorKind> {
        let names = self.inner.registry.lock().names_with_tag(tag);

        let mut instances = BTreeMap::new();
        for name in names {
            let instance = self.get(&name)?;
            instances.insert(name, instance);
        }
        Ok(instances)
    }

    /// Read-only snapshot of every registered definition, for introspection.
    #[must_use]
    pub fn get_all(&self) -> BTreeMap<String, DefinitionView> {
        self.inner.registry.lock().views()
    }
}

impl Container {
    fn resolve(&self, name: &str, overrides: &Overrides, path: &mut ResolutionPath) -> Result<Instance, ResolveErrorKind> {
        if path.contains(name) {
            path.push(name);
            let err = ResolveErrorKind::CircularDependency { path: path.clone() };
            error!("{err}");
            return Err(err);
        }
        path.push(name);

        // The lock is held only while reading the definition and writing the
        // cache slot, never across dependency recursion or factory
        // invocation, so a factory holding the container handle may re-enter
        // `get`.
        let (factory, dependencies, should_store) = {
            let mut registry = self.inner.registry.lock();

            let Some(definition) = registry.get(name) else {
                let err = if path.len() == 1 {
                    ResolveErrorKind::ModuleNotFound { name: name.into() }
                } else {
                    ResolveErrorKind::DependencyNotFound {
                        name: name.into(),
                        path: path.clone(),
                    }
                };
                error!("{err}");
                return Err(err);
            };
            let factory = definition.factory.clone();
            let dependencies = definition.dependencies.clone();
            let flag = definition.cache;
            let cached_instance = definition.cached_instance.clone();

            let flag = match flag {
                Some(flag) => flag,
                None => {
                    // Independent path list: the flag walk is a separate pass
                    // from the instantiation walk.
                    let flag = cache::resolve_flag(&registry, name, &mut ResolutionPath::default())?;
                    if let Some(definition) = registry.get_mut(name) {
                        definition.cache = Some(flag);
                    }
                    flag
                }
            };

            let should_store = overrides.is_empty() && flag;
            if should_store {
                if let Some(instance) = cached_instance {
                    debug!("Found in cache");
                    path.pop();
                    return Ok(instance);
                }
                debug!("Not found in cache");
            }

            (factory, dependencies, should_store)
        };

        let mut resolved = Vec::with_capacity(dependencies.len());
        for dependency in &dependencies {
            if let Some(instance) = overrides.get(dependency) {
                resolved.push(instance.clone());
            } else {
                resolved.push(self.resolve(dependency, overrides, path)?);
            }
        }

        let instance = match factory {
            Factory::Artifact(instance) => instance,
            Factory::Constant(clone) => clone(),
            Factory::Function(function) => match function(Args(resolved)) {
                Ok(instance) => instance,
                Err(source) => {
                    let err = ResolveErrorKind::InstantiationFailed {
                        name: name.into(),
                        source,
                    };
                    error!("{err}");
                    return Err(err);
                }
            },
        };

        if should_store {
            let mut registry = self.inner.registry.lock();
            if let Some(definition) = registry.get_mut(name) {
                definition.cached_instance = Some(instance.clone());
                debug!("Cached");
            }
        }

        path.pop();
        Ok(instance)
    }
}
