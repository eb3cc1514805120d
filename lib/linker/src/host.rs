//! Host-provided capability instances, such as a WASI shim.
use wasmer::{Exports, Extern, Imports};

/// A set of host values registered together under one module name.
///
/// Its exports have the same `(name, Extern)` shape as a module instance, so
/// the linker flattens it the same way.
#[derive(Debug, Clone)]
pub struct HostInstance {
    namespace: String,
    exports: Exports,
}

impl HostInstance {
    /// Create an empty capability registered under `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            exports: Exports::new(),
        }
    }

    /// Takes the entries of `namespace` out of an [`Imports`] object.
    ///
    /// Returns `None` if `imports` defines nothing under `namespace`.
    pub fn from_imports(imports: &Imports, namespace: &str) -> Option<Self> {
        imports
            .get_namespace_exports(namespace)
            .map(|exports| Self {
                namespace: namespace.to_string(),
                exports,
            })
    }

    /// Builds the WASI capability for `version` from a prepared environment.
    #[cfg(feature = "wasi")]
    pub fn wasi(
        store: &mut impl wasmer::AsStoreMut,
        env: &wasmer::FunctionEnv<wasmer_wasix::WasiEnv>,
        version: wasmer_wasix::WasiVersion,
    ) -> Self {
        let namespace = version.get_namespace_str();
        let imports = wasmer_wasix::generate_import_object_from_env(store, env, version);
        Self::from_imports(&imports, namespace).unwrap_or_else(|| Self::new(namespace))
    }

    /// Adds or replaces an export.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Extern>) -> &mut Self {
        self.exports.insert(name, value);
        self
    }

    /// The module name the exports are registered under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The capability's exports.
    pub fn exports(&self) -> &Exports {
        &self.exports
    }
}
