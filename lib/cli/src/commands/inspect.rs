use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use wasmer::Store;
use wasmer_linker::manifest::{Preload, load_module};
use wasmer_linker::{Linkable, Linker};

use super::{parse_preload, preload_all};

#[derive(Debug, Parser)]
/// The options for the `wasm-link inspect` subcommand
pub struct Inspect {
    /// Instantiate a module first and register its exports under NAME
    #[clap(long = "preload", value_name = "NAME=PATH", value_parser = parse_preload)]
    preloads: Vec<Preload>,

    /// File to inspect
    #[clap(name = "FILE")]
    path: PathBuf,
}

impl Inspect {
    /// Runs logic for the `inspect` subcommand
    pub fn execute(&self) -> Result<()> {
        self.inner_execute()
            .with_context(|| format!("failed to inspect `{}`", self.path.display()))
    }

    fn inner_execute(&self) -> Result<()> {
        let mut store = Store::default();
        let mut linker = Linker::new(&mut store);
        preload_all(&mut linker, &self.preloads)?;

        let module = load_module(linker.store(), &self.path)?;
        println!("Imports:");
        for import in module.imports() {
            let status = match linker.get(import.module(), import.name()) {
                None => "unresolved",
                Some(value) if value.is_compatible_with(linker.store(), import.ty()) => "ok",
                Some(_) => "type mismatch",
            };
            println!(
                "  \"{}\".\"{}\": {:?} [{}]",
                import.module(),
                import.name(),
                import.ty(),
                status
            );
        }
        println!("Exports:");
        for export in module.exports() {
            println!("  \"{}\": {:?}", export.name(), export.ty());
        }
        Ok(())
    }
}
