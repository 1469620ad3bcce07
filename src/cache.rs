use tracing::error;

use crate::{container::ResolutionPath, errors::ResolveErrorKind, registry::Registry};

/// Decides whether `name`'s instance should be shared across calls.
///
/// An explicit flag is authoritative and final. An unset flag inherits from
/// the dependency graph: the module caches only if every transitive
/// dependency caches, so a single fresh-per-use dependency makes every
/// dependent fresh-per-use as well.
///
/// Runs with its own path list, independent of the instantiation pass; a
/// cycle met while resolving the flag is fatal.
pub(crate) fn resolve_flag(registry: &Registry, name: &str, path: &mut ResolutionPath) -> Result<bool, ResolveErrorKind> {
    if path.contains(name) {
        path.push(name);
        let err = ResolveErrorKind::CircularDependency { path: path.clone() };
        error!("{err}");
        return Err(err);
    }
    path.push(name);

    let Some(definition) = registry.get(name) else {
        let err = ResolveErrorKind::DependencyNotFound {
            name: name.into(),
            path: path.clone(),
        };
        error!("{err}");
        return Err(err);
    };

    if let Some(cache) = definition.cache {
        path.pop();
        return Ok(cache);
    }

    let mut cache = true;
    for dependency in &definition.dependencies {
        if !resolve_flag(registry, dependency, path)? {
            cache = false;
            break;
        }
    }

    path.pop();
    Ok(cache)
}
