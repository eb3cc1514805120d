//! Link manifests describe a whole link session in TOML.
//!
//! ```toml
//! allow_shadowing = false
//! main = "main.wat"
//!
//! [[preload]]
//! name = "math"
//! path = "math.wasm"
//!
//! [[alias]]
//! module = "env"
//! name = "add"
//! from = ["math", "add"]
//! ```
//!
//! A manifest is fully parsed and checked before it touches a [`Linker`], so
//! a malformed one leaves the linker unchanged.
use std::path::{Path, PathBuf};

use serde::Deserialize;
use wasmer::{Instance, Module, Store};

use crate::Linker;
use crate::error::{ManifestError, TypeError};

/// A module to instantiate and register under `name`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Preload {
    /// The module name its exports are registered under.
    pub name: String,
    /// A `.wasm` or `.wat` file, relative to the manifest.
    pub path: PathBuf,
}

/// Re-exports an existing binding under another key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Alias {
    /// Module part of the new key.
    pub module: String,
    /// Item part of the new key.
    pub name: String,
    /// The `(module, name)` key to copy from.
    pub from: (String, String),
}

/// A parsed link manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkManifest {
    /// Shadowing setting to apply before anything is defined. Left as is
    /// when absent.
    #[serde(default)]
    pub allow_shadowing: Option<bool>,
    /// Module instantiated last.
    #[serde(default)]
    pub main: Option<PathBuf>,
    /// Modules registered in order.
    #[serde(default, rename = "preload")]
    pub preloads: Vec<Preload>,
    /// Aliases defined after every preload.
    #[serde(default, rename = "alias")]
    pub aliases: Vec<Alias>,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl LinkManifest {
    /// Parses a manifest. Relative paths resolve against the current
    /// directory.
    pub fn from_toml_str(source: &str) -> Result<Self, TypeError> {
        toml::from_str(source).map_err(|e| TypeError::Manifest(e.message().to_string()))
    }

    /// Reads and parses a manifest. Relative paths resolve against the
    /// manifest's directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|error| ManifestError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        let mut manifest = Self::from_toml_str(&source)?;
        manifest.base_dir = path.parent().map(Path::to_path_buf);
        Ok(manifest)
    }

    /// Where a path from the manifest points to.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Applies the manifest: shadowing, then preloads, then aliases, then
    /// `main`. Returns the `main` instance if one was requested.
    ///
    /// Stops at the first failure. Everything defined before it stays
    /// registered.
    pub fn apply(&self, linker: &mut Linker<'_>) -> Result<Option<Instance>, ManifestError> {
        if let Some(allow) = self.allow_shadowing {
            linker.allow_shadowing(allow);
        }

        for preload in &self.preloads {
            let path = self.resolve_path(&preload.path);
            let module = load_module(linker.store(), &path)?;
            tracing::debug!(name = %preload.name, path = %path.display(), "preloading");
            linker
                .module(&preload.name, &module)
                .map_err(|error| ManifestError::Instantiation { path, error })?;
        }

        for alias in &self.aliases {
            let (from_module, from_name) = &alias.from;
            let value = linker
                .get(from_module, from_name)
                .cloned()
                .ok_or_else(|| ManifestError::DanglingAlias {
                    module: alias.module.clone(),
                    name: alias.name.clone(),
                    from_module: from_module.clone(),
                    from_name: from_name.clone(),
                })?;
            linker.define(&alias.module, &alias.name, value)?;
        }

        let Some(main) = &self.main else {
            return Ok(None);
        };
        let path = self.resolve_path(main);
        let module = load_module(linker.store(), &path)?;
        let instance = linker
            .instantiate(&module)
            .map_err(|error| ManifestError::Instantiation { path, error })?;
        Ok(Some(instance))
    }
}

/// Compiles a `.wasm` or `.wat` file.
pub fn load_module(store: &Store, path: &Path) -> Result<Module, ManifestError> {
    let bytes = std::fs::read(path).map_err(|error| ManifestError::Io {
        path: path.to_path_buf(),
        error,
    })?;
    let mut module = Module::new(store, bytes).map_err(|error| ManifestError::Compile {
        path: path.to_path_buf(),
        error,
    })?;
    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
        module.set_name(stem);
    }
    Ok(module)
}
