use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use wasmer::Store;
use wasmer_linker::{LinkManifest, Linker};

use super::invoke_and_print;

#[derive(Debug, Parser)]
/// The options for the `wasm-link manifest` subcommand
pub struct Manifest {
    /// The TOML manifest describing the link session
    #[clap(name = "MANIFEST")]
    path: PathBuf,

    /// The function to invoke on the `main` module
    #[clap(short, long)]
    invoke: Option<String>,

    /// Arguments passed to the invoked function
    args: Vec<String>,
}

impl Manifest {
    /// Runs logic for the `manifest` subcommand
    pub fn execute(&self) -> Result<()> {
        self.inner_execute()
            .with_context(|| format!("failed to link `{}`", self.path.display()))
    }

    fn inner_execute(&self) -> Result<()> {
        let manifest = LinkManifest::from_path(&self.path)?;

        let mut store = Store::default();
        let mut linker = Linker::new(&mut store);
        let instance = manifest.apply(&mut linker)?;

        match (&self.invoke, instance) {
            (None, _) => Ok(()),
            (Some(name), Some(instance)) => {
                invoke_and_print(&instance, linker.store_mut(), name, &self.args)
            }
            (Some(_), None) => bail!("`--invoke` needs a `main` module in the manifest"),
        }
    }
}
