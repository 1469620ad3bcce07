pub(crate) mod cache;
pub(crate) mod container;
pub(crate) mod errors;
pub(crate) mod module;
pub(crate) mod overrides;
pub(crate) mod registry;

pub use container::{Container, ResolutionPath, CONTAINER_MODULE};
pub use errors::{RegistryErrorKind, ResolveErrorKind};
pub use module::{instance, Args, DefinitionView, FactoryKind, Instance, Module, Options};
pub use overrides::Overrides;
