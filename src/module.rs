use core::any::{type_name, Any};
use std::{collections::BTreeSet, sync::Arc};

use anyhow::anyhow;

/// A resolved module value, shared as a type-erased handle.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Wraps a value into an [`Instance`] handle.
#[inline]
#[must_use]
pub fn instance<T: Send + Sync + 'static>(value: T) -> Instance {
    Arc::new(value)
}

/// Ordered factory arguments, positionally mapped from the module's
/// dependency list.
pub struct Args(pub(crate) Vec<Instance>);

impl Args {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Downcasts the argument at `index` to its concrete type.
    ///
    /// # Errors
    /// Returns an error if the position is out of range or the argument
    /// is not a `T`.
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> anyhow::Result<Arc<T>> {
        let instance = self
            .0
            .get(index)
            .ok_or_else(|| anyhow!("no argument at position {index}"))?;
        instance
            .clone()
            .downcast()
            .map_err(|_| anyhow!("argument at position {index} is not a `{}`", type_name::<T>()))
    }

    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<Instance> {
        self.0
    }
}

pub(crate) type FactoryFn = Arc<dyn Fn(Args) -> anyhow::Result<Instance> + Send + Sync>;
pub(crate) type CloneFn = Arc<dyn Fn() -> Instance + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Factory {
    /// Value-returning function invoked with resolved positional arguments.
    Function(FactoryFn),
    /// Captured constant; every invocation produces a fresh deep copy.
    Constant(CloneFn),
    /// Exposed as-is: resolution returns the stored handle without invocation.
    Artifact(Instance),
}

impl Factory {
    #[inline]
    #[must_use]
    pub(crate) fn kind(&self) -> FactoryKind {
        match self {
            Self::Function(_) => FactoryKind::Function,
            Self::Constant(_) => FactoryKind::Constant,
            Self::Artifact(_) => FactoryKind::Artifact,
        }
    }
}

/// How a module's value is produced during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryKind {
    Function,
    Constant,
    Artifact,
}

/// Registration options recognized by the registry.
///
/// ## Fields
/// - `cache`:
///   Tri-state. `Some(true)`/`Some(false)` is authoritative; `None` means
///   "inherit from the dependency graph" and is resolved lazily on first
///   access.
/// - `tags`:
///   Labels for bulk retrieval via [`crate::Container::get_by_tag`].
#[derive(Clone, Default)]
pub struct Options {
    pub cache: Option<bool>,
    pub tags: BTreeSet<String>,
}

/// A module pending registration: a factory, an ordered dependency list and
/// registration [`Options`].
///
/// Dependency names are always declared explicitly and are positionally
/// mapped to the factory's [`Args`].
pub struct Module {
    pub(crate) factory: Factory,
    pub(crate) dependencies: Vec<String>,
    pub(crate) options: Options,
}

impl Module {
    /// A module produced by invoking `factory` with the resolved values of
    /// `dependencies`, in declaration order.
    #[must_use]
    pub fn factory<F>(dependencies: &[&str], factory: F) -> Self
    where
        F: Fn(Args) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        Self {
            factory: Factory::Function(Arc::new(factory)),
            dependencies: dependencies.iter().map(ToString::to_string).collect(),
            options: Options::default(),
        }
    }

    /// A constant module. Every non-cached resolution yields an independent
    /// deep copy produced by `Clone`, so mutable constant data is never
    /// aliased across resolutions by accident.
    #[must_use]
    pub fn constant<T>(value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        Self {
            factory: Factory::Constant(Arc::new(move || Arc::new(value.clone()) as Instance)),
            dependencies: Vec::new(),
            options: Options::default(),
        }
    }

    /// A module whose resolution yields the registered value itself, without
    /// invocation or copying. Used to expose a constructor-like value as an
    /// injectable artifact.
    #[must_use]
    pub fn artifact<T: Send + Sync + 'static>(value: T) -> Self {
        Self::artifact_instance(Arc::new(value))
    }

    #[must_use]
    pub(crate) fn artifact_instance(instance: Instance) -> Self {
        Self {
            factory: Factory::Artifact(instance),
            dependencies: Vec::new(),
            options: Options::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn cache(mut self, cache: bool) -> Self {
        self.options.cache = Some(cache);
        self
    }

    #[inline]
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.options.tags.insert(tag.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.options.tags.extend(tags.iter().map(ToString::to_string));
        self
    }

    #[inline]
    #[must_use]
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }
}

/// Read-only view of a registered definition, as returned by
/// [`crate::Container::get_all`].
#[derive(Debug, Clone)]
pub struct DefinitionView {
    pub kind: FactoryKind,
    pub dependencies: Vec<String>,
    pub cache: Option<bool>,
    pub tags: BTreeSet<String>,
    pub has_cached_instance: bool,
}
