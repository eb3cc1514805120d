//! The four kinds of values that can cross the linking boundary.
use std::fmt;

use wasmer::{AsStoreRef, Extern, ExternType};

use crate::error::TypeError;

/// The kind of an [`Extern`] the linker knows how to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternKind {
    /// A host or guest function.
    Function,
    /// A global variable.
    Global,
    /// A linear memory.
    Memory,
    /// A table of references.
    Table,
}

impl ExternKind {
    /// Classifies an extern type, or returns `None` for kinds the linker does
    /// not bind.
    ///
    /// With the default engine features every `ExternType` is one of the four
    /// kinds. The fallback arm covers kinds that engine extensions add, such
    /// as exception tags.
    pub fn of(ty: &ExternType) -> Option<Self> {
        match ty {
            ExternType::Function(_) => Some(Self::Function),
            ExternType::Global(_) => Some(Self::Global),
            ExternType::Memory(_) => Some(Self::Memory),
            ExternType::Table(_) => Some(Self::Table),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

impl fmt::Display for ExternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Function => "function",
            Self::Global => "global",
            Self::Memory => "memory",
            Self::Table => "table",
        })
    }
}

/// The capability the registry needs from a bound value.
pub trait Linkable {
    /// The value's full type, as seen by `store`.
    fn extern_type(&self, store: &impl AsStoreRef) -> ExternType;

    /// Whether the value was created in `store`.
    fn belongs_to(&self, store: &impl AsStoreRef) -> bool;

    /// The value's kind, or a [`TypeError`] if the linker cannot bind it.
    fn kind(
        &self,
        store: &impl AsStoreRef,
        module: &str,
        name: &str,
    ) -> Result<ExternKind, TypeError> {
        let ty = self.extern_type(store);
        ExternKind::of(&ty).ok_or_else(|| TypeError::UnsupportedExtern {
            module: module.to_string(),
            name: name.to_string(),
            ty: format!("{ty:?}"),
        })
    }

    /// Checks the value against the type an import declares.
    ///
    /// Kinds must agree. Functions must have identical signatures and globals
    /// identical value type and mutability. Memory and table limits depend on
    /// runtime sizes and are left to the engine.
    fn is_compatible_with(&self, store: &impl AsStoreRef, expected: &ExternType) -> bool {
        match (expected, &self.extern_type(store)) {
            (ExternType::Function(a), ExternType::Function(b)) => a == b,
            (ExternType::Global(a), ExternType::Global(b)) => a == b,
            (ExternType::Memory(_), ExternType::Memory(_)) => true,
            (ExternType::Table(a), ExternType::Table(b)) => a.ty == b.ty,
            _ => false,
        }
    }
}

impl Linkable for Extern {
    fn extern_type(&self, store: &impl AsStoreRef) -> ExternType {
        self.ty(store)
    }

    fn belongs_to(&self, store: &impl AsStoreRef) -> bool {
        self.is_from_store(store)
    }
}
