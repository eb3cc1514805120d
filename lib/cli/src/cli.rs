//! The logic for the `wasm-link` CLI tool.

use anyhow::Error;
use clap::{Parser, Subcommand};
use wasmer_linker::{InstantiationError, LinkError, ManifestError, TypeError};

use crate::commands::{Inspect, Manifest, Run};
use crate::logging;

/// Exit status for a failure that is neither a link error nor a trap.
pub const EXIT_FAILURE: i32 = 1;
/// Exit status when an import could not be linked.
pub const EXIT_LINK_ERROR: i32 = 2;
/// Exit status when a module trapped while starting.
pub const EXIT_TRAP: i32 = 3;

#[derive(Parser, Debug)]
#[clap(
    name = "wasm-link",
    about = "Resolve WebAssembly imports by name and run the result.",
    version
)]
struct Args {
    /// Log more (repeat for more detail). Ignored when `RUST_LOG` is set.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[clap(short, long, global = true)]
    quiet: bool,

    #[clap(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Link and run a WebAssembly file. Formats accepted: wasm, wat
    Run(Run),

    /// Link and run the modules described by a TOML manifest
    Manifest(Manifest),

    /// Show a module's imports and whether they resolve
    Inspect(Inspect),
}

/// The main function for the `wasm-link` CLI tool.
pub fn wasm_link_main() -> ! {
    let args = Args::parse();
    logging::set_up_logging(args.verbose, args.quiet);

    let result = match args.cmd {
        Cmd::Run(cmd) => cmd.execute(),
        Cmd::Manifest(cmd) => cmd.execute(),
        Cmd::Inspect(cmd) => cmd.execute(),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(error) => {
            eprintln!("error: {error:?}");
            std::process::exit(exit_code(&error));
        }
    }
}

/// Picks the exit status for `error`, telling link errors and traps apart.
pub fn exit_code(error: &Error) -> i32 {
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<InstantiationError>() {
            return instantiation_exit_code(e);
        }
        if let Some(e) = cause.downcast_ref::<LinkError>() {
            return link_exit_code(e);
        }
        match cause.downcast_ref::<ManifestError>() {
            Some(ManifestError::Link(e)) => return link_exit_code(e),
            Some(ManifestError::Instantiation { error, .. }) => {
                return instantiation_exit_code(error);
            }
            _ => {}
        }
    }
    EXIT_FAILURE
}

fn instantiation_exit_code(error: &InstantiationError) -> i32 {
    match error {
        InstantiationError::Trap(_) => EXIT_TRAP,
        InstantiationError::Link(e) => link_exit_code(e),
        InstantiationError::Engine(_) => EXIT_FAILURE,
    }
}

fn link_exit_code(error: &LinkError) -> i32 {
    if error.is_type_error() {
        EXIT_FAILURE
    } else {
        EXIT_LINK_ERROR
    }
}
