use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use wasmer::Store;
use wasmer_linker::Linker;
use wasmer_linker::manifest::{Preload, load_module};

use super::{invoke_and_print, parse_preload, preload_all};

#[derive(Debug, Parser)]
/// The options for the `wasm-link run` subcommand
pub struct Run {
    /// Instantiate a module first and register its exports under NAME
    #[clap(long = "preload", value_name = "NAME=PATH", value_parser = parse_preload)]
    preloads: Vec<Preload>,

    /// Let later definitions replace earlier ones
    #[clap(long)]
    allow_shadowing: bool,

    /// Define every missing function import as a function that traps
    #[clap(long)]
    trap_unknown_imports: bool,

    /// The function to invoke after instantiation
    #[clap(short, long)]
    invoke: Option<String>,

    /// File to run
    #[clap(name = "FILE")]
    path: PathBuf,

    /// Arguments passed to the invoked function
    args: Vec<String>,
}

impl Run {
    /// Runs logic for the `run` subcommand
    pub fn execute(&self) -> Result<()> {
        self.inner_execute()
            .with_context(|| format!("failed to run `{}`", self.path.display()))
    }

    #[tracing::instrument(level = "debug", name = "wasm_link_run", skip_all)]
    fn inner_execute(&self) -> Result<()> {
        let mut store = Store::default();
        let mut linker = Linker::new(&mut store);
        linker.allow_shadowing(self.allow_shadowing);

        preload_all(&mut linker, &self.preloads)?;

        let module = load_module(linker.store(), &self.path)?;
        if self.trap_unknown_imports {
            linker.define_unknown_imports_as_traps(&module)?;
        }
        let instance = linker.instantiate(&module)?;
        tracing::info!(bindings = linker.len(), "instantiated");

        match &self.invoke {
            Some(name) => invoke_and_print(&instance, linker.store_mut(), name, &self.args),
            None => Ok(()),
        }
    }
}
