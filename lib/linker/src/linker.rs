use wasmer::{Extern, ExternType, Function, ImportType, Instance, Module, RuntimeError, Store};

use crate::error::{InstantiationError, LinkError, TypeError};
use crate::host::HostInstance;
use crate::kind::Linkable;
use crate::namespace::{Namespace, NamespaceIter, Shadowing};

/// Resolves module imports by name and instantiates modules.
///
/// A `Linker` is bound to one [`Store`] for its whole lifetime. Every value
/// it holds lives in that store, and the borrow guarantees the store
/// outlives the linker.
///
/// ```
/// # use wasmer::{Function, Module, Store};
/// # use wasmer_linker::Linker;
/// # fn main() -> anyhow::Result<()> {
/// let mut store = Store::default();
/// let mut linker = Linker::new(&mut store);
///
/// let log = Function::new_typed(linker.store_mut(), |x: i32| println!("{x}"));
/// linker.define("env", "log", log)?;
///
/// let module = Module::new(
///     linker.store(),
///     r#"(module (import "env" "log" (func (param i32))))"#,
/// )?;
/// linker.instantiate(&module)?;
/// # Ok(())
/// # }
/// ```
pub struct Linker<'s> {
    store: &'s mut Store,
    namespace: Namespace,
    shadowing: Shadowing,
}

impl<'s> Linker<'s> {
    /// Creates an empty linker bound to `store`. Shadowing is disabled.
    pub fn new(store: &'s mut Store) -> Self {
        Self {
            store,
            namespace: Namespace::new(),
            shadowing: Shadowing::default(),
        }
    }

    /// The store values must be created in.
    pub fn store(&self) -> &Store {
        &*self.store
    }

    /// Mutable access to the bound store, to create functions, globals,
    /// memories and tables for it.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut *self.store
    }

    /// Configures whether later definitions may replace existing ones.
    ///
    /// Takes effect for every following definition. Bindings made before the
    /// change are not revisited.
    pub fn allow_shadowing(&mut self, allow: bool) -> &mut Self {
        self.shadowing = Shadowing::from(allow);
        self
    }

    /// Whether redefinitions currently replace existing bindings.
    pub fn shadowing_allowed(&self) -> bool {
        self.shadowing == Shadowing::Allow
    }

    /// Defines `value` under `(module, name)`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Type`] if the value is not a function, global,
    /// memory or table of the bound store, and
    /// [`LinkError::DuplicateDefinition`] if the key exists and shadowing is
    /// disabled. In both cases the registry is unchanged.
    pub fn define(
        &mut self,
        module: &str,
        name: &str,
        value: impl Into<Extern>,
    ) -> Result<&mut Self, LinkError> {
        let value = value.into();
        if !value.belongs_to(&*self.store) {
            return Err(TypeError::ForeignStore {
                module: module.to_string(),
                name: name.to_string(),
            }
            .into());
        }
        let kind = value.kind(&*self.store, module, name)?;

        match self.namespace.insert(module, name, value, self.shadowing)? {
            Some(_) => {
                tracing::debug!(module, name, %kind, "shadowed an existing definition")
            }
            None => tracing::trace!(module, name, %kind, "defined"),
        }
        Ok(self)
    }

    /// Defines every export of `instance` under `module`.
    ///
    /// Each export is defined as if by [`Linker::define`], in the instance's
    /// export order, honoring the current shadowing setting.
    ///
    /// This is not atomic: when an export collides with an existing binding,
    /// the exports defined before it stay registered. Allow shadowing first
    /// (or check [`Linker::contains_namespace`]) when that matters.
    pub fn define_instance(
        &mut self,
        module: &str,
        instance: &Instance,
    ) -> Result<&mut Self, LinkError> {
        let exports = instance
            .exports
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect::<Vec<_>>();
        self.define_exports(module, exports)
    }

    /// Defines each `(name, value)` pair under `module`, stopping at the first
    /// failure. Definitions made before the failure are kept.
    pub fn define_exports(
        &mut self,
        module: &str,
        exports: impl IntoIterator<Item = (String, Extern)>,
    ) -> Result<&mut Self, LinkError> {
        for (name, value) in exports {
            self.define(module, &name, value)?;
        }
        Ok(self)
    }

    /// Registers a host-provided capability under its namespace.
    pub fn define_host(&mut self, host: &HostInstance) -> Result<&mut Self, LinkError> {
        let exports = host
            .exports()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect::<Vec<_>>();
        self.define_exports(host.namespace(), exports)
    }

    /// Registers a WASI capability under its well-known namespace
    /// (`wasi_unstable`, `wasi_snapshot_preview1`, ...).
    pub fn define_wasi(&mut self, wasi: &HostInstance) -> Result<&mut Self, LinkError> {
        tracing::debug!(namespace = wasi.namespace(), "defining WASI imports");
        self.define_host(wasi)
    }

    /// Gets the value bound to `(module, name)`.
    pub fn get(&self, module: &str, name: &str) -> Option<&Extern> {
        self.namespace.get(module, name)
    }

    /// Returns if a value is bound to `(module, name)`.
    pub fn contains(&self, module: &str, name: &str) -> bool {
        self.namespace.exists(module, name)
    }

    /// Returns true if anything is defined under `module`.
    pub fn contains_namespace(&self, module: &str) -> bool {
        self.namespace.contains_namespace(module)
    }

    /// Iterates over every `(module, name, value)` binding.
    pub fn iter(&self) -> NamespaceIter<'_> {
        self.namespace.iter()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.namespace.len()
    }

    /// Whether nothing is defined.
    pub fn is_empty(&self) -> bool {
        self.namespace.is_empty()
    }

    /// Resolve and return the values for `module`'s imports, in the order
    /// they are declared.
    ///
    /// Stops at the first import that is missing or whose binding has the
    /// wrong type.
    pub fn resolve(&self, module: &Module) -> Result<Vec<Extern>, LinkError> {
        let mut resolved = Vec::new();
        for import in module.imports() {
            let expected = import.ty();
            let value = self
                .namespace
                .get(import.module(), import.name())
                .ok_or_else(|| LinkError::UnresolvedImport {
                    module: import.module().to_string(),
                    name: import.name().to_string(),
                    expected: expected.clone(),
                })?;
            if !value.is_compatible_with(&*self.store, expected) {
                return Err(LinkError::ImportTypeMismatch {
                    module: import.module().to_string(),
                    name: import.name().to_string(),
                    expected: expected.clone(),
                    found: value.extern_type(&*self.store),
                });
            }
            resolved.push(value.clone());
        }
        Ok(resolved)
    }

    /// Every import of `module` that has no binding, in declaration order.
    pub fn unresolved_imports(&self, module: &Module) -> Vec<ImportType> {
        module
            .imports()
            .filter(|import| !self.namespace.exists(import.module(), import.name()))
            .collect()
    }

    /// Defines each unresolved function import of `module` as a function
    /// that traps when called.
    ///
    /// Imports of other kinds are left alone.
    pub fn define_unknown_imports_as_traps(
        &mut self,
        module: &Module,
    ) -> Result<&mut Self, LinkError> {
        for import in self.unresolved_imports(module) {
            let ExternType::Function(ty) = import.ty() else {
                continue;
            };
            let message = format!(
                "unknown import: `{}::{}` has not been defined",
                import.module(),
                import.name()
            );
            let trap = Function::new(&mut *self.store, ty.clone(), move |_| {
                Err(RuntimeError::new(message.clone()))
            });
            self.define(import.module(), import.name(), trap)?;
        }
        Ok(self)
    }

    /// Instantiates `module`, feeding it the values its imports resolve to.
    ///
    /// # Errors
    ///
    /// [`InstantiationError::Link`] if an import is missing or has the wrong
    /// type; nothing has run at that point. [`InstantiationError::Trap`] if
    /// the module's `start` function trapped; no instance is returned.
    pub fn instantiate(&mut self, module: &Module) -> Result<Instance, InstantiationError> {
        let span = tracing::debug_span!("instantiate", module = module.name());
        let _enter = span.enter();

        let externs = self.resolve(module).inspect_err(|error| {
            tracing::debug!(%error, "unable to resolve imports");
        })?;
        tracing::trace!(imports = externs.len(), "resolved imports");

        match Instance::new_by_index(&mut *self.store, module, &externs) {
            Ok(instance) => {
                tracing::debug!("instantiated");
                Ok(instance)
            }
            Err(error) => {
                let error = InstantiationError::from(error);
                tracing::debug!(%error, trap = error.is_trap(), "instantiation failed");
                Err(error)
            }
        }
    }

    /// Instantiates `module` and defines its exports under `name`, so later
    /// modules can import from it.
    ///
    /// # Errors
    ///
    /// With shadowing disabled, an export that collides with an existing
    /// binding is reported as [`LinkError::DuplicateDefinition`] before the
    /// module is instantiated, so its `start` function never runs.
    pub fn module(
        &mut self,
        name: &str,
        module: &Module,
    ) -> Result<Instance, InstantiationError> {
        if self.shadowing == Shadowing::Reject {
            if let Some(export) = module
                .exports()
                .find(|export| self.namespace.exists(name, export.name()))
            {
                let error = LinkError::DuplicateDefinition {
                    module: name.to_string(),
                    name: export.name().to_string(),
                };
                tracing::debug!(%error, "export collides with an existing definition");
                return Err(error.into());
            }
        }

        let instance = self.instantiate(module)?;
        self.define_instance(name, &instance)?;
        Ok(instance)
    }
}

impl std::fmt::Debug for Linker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Linker")
            .field("namespace", &self.namespace)
            .field("shadowing", &self.shadowing)
            .finish()
    }
}
