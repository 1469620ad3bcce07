use core::any::TypeId;

use crate::container::ResolutionPath;

#[derive(thiserror::Error, Debug)]
pub enum RegistryErrorKind {
    #[error("Unable to register empty module")]
    EmptyModule,
    #[error("Module is already registered: {name}")]
    DuplicateModule { name: String },
}

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Module does not exist: {name}")]
    ModuleNotFound { name: String },
    #[error("Dependency does not exist: {name} ({path})")]
    DependencyNotFound { name: String, path: ResolutionPath },
    #[error("Circular dependency: {path}")]
    CircularDependency { path: ResolutionPath },
    #[error("Cannot create an instance of: {name}. Error: {source}")]
    InstantiationFailed {
        name: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("Incorrect instance type. Expected: {expected}, actual: {actual:?}")]
    IncorrectType { expected: &'static str, actual: TypeId },
}
