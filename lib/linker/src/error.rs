//! The errors the linker can produce.
//!
//! Failures are split in two phases: a [`LinkError`] means the registry could
//! not satisfy (or accept) a binding, while [`InstantiationError::Trap`] means
//! the module itself failed while running its `start` function.
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use wasmer::{ExternType, RuntimeError};
use wasmer_types::ImportError;

/// Malformed caller input.
///
/// Type errors are always detected before the registry is touched, so the
/// linker is left exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// The value is not a function, global, memory or table.
    #[error("cannot define {module:?}.{name:?}: unsupported extern kind {ty}")]
    UnsupportedExtern {
        /// Module part of the key.
        module: String,
        /// Item part of the key.
        name: String,
        /// The engine's description of the rejected value.
        ty: String,
    },

    /// The value was created in a store other than the one the linker is
    /// bound to.
    #[error("cannot define {module:?}.{name:?}: value belongs to a different store")]
    ForeignStore {
        /// Module part of the key.
        module: String,
        /// Item part of the key.
        name: String,
    },

    /// An untyped input (a manifest) held a value of the wrong shape.
    #[error("invalid manifest: {0}")]
    Manifest(String),
}

/// An error while registering or resolving a binding.
#[derive(Error, Debug)]
pub enum LinkError {
    /// The input was rejected before any mutation.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// The key is already bound and shadowing is disabled.
    #[error("{module:?}.{name:?} is already defined")]
    DuplicateDefinition {
        /// Module part of the key.
        module: String,
        /// Item part of the key.
        name: String,
    },

    /// No binding exists for an import.
    #[error("unknown import {module:?}.{name:?}: expected {expected:?}")]
    UnresolvedImport {
        /// Module part of the key.
        module: String,
        /// Item part of the key.
        name: String,
        /// What the module declared.
        expected: ExternType,
    },

    /// A binding exists but its type does not match the import.
    #[error("incompatible import type for {module:?}.{name:?}: expected {expected:?} but received {found:?}")]
    ImportTypeMismatch {
        /// Module part of the key.
        module: String,
        /// Item part of the key.
        name: String,
        /// What the module declared.
        expected: ExternType,
        /// What the registry holds.
        found: ExternType,
    },

    /// Any other import failure reported by the engine.
    #[error("error while importing {module:?}.{name:?}: {message}")]
    Import {
        /// Module part of the key.
        module: String,
        /// Item part of the key.
        name: String,
        /// The engine's message.
        message: String,
    },

    /// A link failure that is not attributable to a single import.
    #[error("link error: {0}")]
    Engine(String),
}

impl LinkError {
    /// Whether the error was caused by malformed input rather than by the
    /// registry contents.
    pub fn is_type_error(&self) -> bool {
        matches!(self, Self::Type(_))
    }

    /// The `(module, name)` key the error refers to, if any.
    pub fn key(&self) -> Option<(&str, &str)> {
        match self {
            Self::Type(TypeError::UnsupportedExtern { module, name, .. })
            | Self::Type(TypeError::ForeignStore { module, name })
            | Self::DuplicateDefinition { module, name }
            | Self::UnresolvedImport { module, name, .. }
            | Self::ImportTypeMismatch { module, name, .. }
            | Self::Import { module, name, .. } => Some((module.as_str(), name.as_str())),
            Self::Type(TypeError::Manifest(_)) | Self::Engine(_) => None,
        }
    }

    fn from_import(module: String, name: String, error: ImportError) -> Self {
        match error {
            ImportError::UnknownImport(expected) => Self::UnresolvedImport {
                module,
                name,
                expected,
            },
            ImportError::IncompatibleType(expected, found) => Self::ImportTypeMismatch {
                module,
                name,
                expected,
                found,
            },
            #[allow(unreachable_patterns)]
            other => Self::Import {
                module,
                name,
                message: other.to_string(),
            },
        }
    }
}

/// An error while instantiating a module.
///
/// [`InstantiationError::Link`] is reported before any sandboxed code runs.
/// [`InstantiationError::Trap`] means the `start` function trapped; no
/// instance is handed out in that case.
#[derive(Error, Debug)]
pub enum InstantiationError {
    /// An import could not be satisfied.
    #[error(transparent)]
    Link(#[from] LinkError),

    /// The module's `start` function trapped.
    #[error("start function trapped: {0}")]
    Trap(RuntimeError),

    /// The engine refused the module for a reason unrelated to linking.
    #[error("instantiation failed: {0}")]
    Engine(String),
}

impl InstantiationError {
    /// Whether the module itself failed while running its `start` function.
    pub fn is_trap(&self) -> bool {
        matches!(self, Self::Trap(_))
    }

    /// Whether the failure happened while linking imports.
    pub fn is_link(&self) -> bool {
        matches!(self, Self::Link(_))
    }
}

impl From<wasmer::InstantiationError> for InstantiationError {
    fn from(other: wasmer::InstantiationError) -> Self {
        match other {
            wasmer::InstantiationError::Link(wasmer::LinkError::Import(module, name, error)) => {
                Self::Link(LinkError::from_import(module, name, error))
            }
            wasmer::InstantiationError::Link(other) => {
                Self::Link(LinkError::Engine(other.to_string()))
            }
            wasmer::InstantiationError::Start(trap) => Self::Trap(trap),
            other => Self::Engine(other.to_string()),
        }
    }
}

/// An error while loading or applying a link manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest or one of its modules could not be read.
    #[error("unable to read {}", path.display())]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// A module failed to compile.
    #[error("unable to compile {}", path.display())]
    Compile {
        /// The module that failed.
        path: PathBuf,
        /// The engine's error.
        #[source]
        error: wasmer::CompileError,
    },

    /// An alias pointed at a binding that does not exist.
    #[error("alias {module:?}.{name:?} refers to undefined {from_module:?}.{from_name:?}")]
    DanglingAlias {
        /// Module part of the new key.
        module: String,
        /// Item part of the new key.
        name: String,
        /// Module part of the source key.
        from_module: String,
        /// Item part of the source key.
        from_name: String,
    },

    /// A definition was rejected.
    #[error(transparent)]
    Link(#[from] LinkError),

    /// A module failed to instantiate.
    #[error("unable to instantiate {}", path.display())]
    Instantiation {
        /// The module that failed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        error: InstantiationError,
    },
}

impl From<TypeError> for ManifestError {
    fn from(error: TypeError) -> Self {
        Self::Link(LinkError::Type(error))
    }
}
