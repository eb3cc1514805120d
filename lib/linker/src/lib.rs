//! Name-based linking for Wasmer.
//!
//! A [`Linker`] keeps a namespace of `(module, name)` bindings to functions,
//! globals, memories and tables, and uses it to satisfy the imports of the
//! modules it instantiates:
//!
//! ```
//! # use wasmer::{Module, Store};
//! # use wasmer_linker::{InstantiationError, Linker};
//! # fn main() -> anyhow::Result<()> {
//! let mut store = Store::default();
//! let mut linker = Linker::new(&mut store);
//!
//! // Register a whole instance under "math"...
//! let math = Module::new(
//!     linker.store(),
//!     r#"(module (func (export "add") (param i32 i32) (result i32)
//!           local.get 0 local.get 1 i32.add))"#,
//! )?;
//! linker.module("math", &math)?;
//!
//! // ...and satisfy another module's imports with it.
//! let app = Module::new(
//!     linker.store(),
//!     r#"(module (import "math" "add" (func (param i32 i32) (result i32))))"#,
//! )?;
//! linker.instantiate(&app)?;
//!
//! // A trapping start function is reported apart from link errors.
//! let broken = Module::new(linker.store(), "(module (func unreachable) (start 0))")?;
//! assert!(matches!(
//!     linker.instantiate(&broken),
//!     Err(InstantiationError::Trap(_))
//! ));
//! # Ok(())
//! # }
//! ```
//!
//! Redefining a key fails unless shadowing is allowed with
//! [`Linker::allow_shadowing`].

#![deny(missing_docs, unused_extern_crates)]
#![warn(unused_import_braces)]

pub mod error;
mod host;
mod kind;
mod linker;
pub mod manifest;
mod namespace;

pub use crate::error::{InstantiationError, LinkError, ManifestError, TypeError};
pub use crate::host::HostInstance;
pub use crate::kind::{ExternKind, Linkable};
pub use crate::linker::Linker;
pub use crate::manifest::LinkManifest;
pub use crate::namespace::{Namespace, NamespaceIter, Shadowing};
