//! The commands available in the `wasm-link` binary.
mod inspect;
mod manifest;
mod run;

use std::path::PathBuf;

use anyhow::{Context, Error, bail};
use wasmer::{Instance, Store, Type, Value};
use wasmer_linker::Linker;
use wasmer_linker::manifest::{Preload, load_module};

pub use self::{inspect::*, manifest::*, run::*};

/// Parses a `NAME=PATH` preload argument.
fn parse_preload(s: &str) -> Result<Preload, String> {
    match s.split_once('=') {
        Some((name, path)) if !path.is_empty() => Ok(Preload {
            name: name.to_string(),
            path: PathBuf::from(path),
        }),
        _ => Err(format!("expected NAME=PATH, got {s:?}")),
    }
}

fn preload_all(linker: &mut Linker<'_>, preloads: &[Preload]) -> Result<(), Error> {
    for preload in preloads {
        let module = load_module(linker.store(), &preload.path)?;
        linker
            .module(&preload.name, &module)
            .with_context(|| format!("failed to preload `{}`", preload.path.display()))?;
    }
    Ok(())
}

/// Calls `name` on `instance` and prints each result on its own line.
fn invoke_and_print(
    instance: &Instance,
    store: &mut Store,
    name: &str,
    args: &[String],
) -> Result<(), Error> {
    let func = instance
        .exports
        .get_function(name)
        .with_context(|| format!("no exported function named `{name}`"))?;
    let params = func.ty(store).params().to_vec();
    if params.len() != args.len() {
        bail!(
            "`{name}` takes {} argument(s) but {} were given",
            params.len(),
            args.len()
        );
    }

    let call_args = params
        .iter()
        .zip(args)
        .enumerate()
        .map(|(index, (ty, arg))| {
            arg_to_value(arg, *ty).with_context(|| format!("argument {index} of `{name}`"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    for value in func.call(store, &call_args)?.iter() {
        println!("{}", display_value(value));
    }
    Ok(())
}

/// Converts a command line argument into a value of the parameter's type.
///
/// Only numeric parameters can be passed from the command line.
fn arg_to_value(arg: &str, ty: Type) -> Result<Value, Error> {
    Ok(match ty {
        Type::I32 => Value::I32(arg.parse().with_context(|| format!("{arg:?} is not an i32"))?),
        Type::I64 => Value::I64(arg.parse().with_context(|| format!("{arg:?} is not an i64"))?),
        Type::F32 => Value::F32(arg.parse().with_context(|| format!("{arg:?} is not an f32"))?),
        Type::F64 => Value::F64(arg.parse().with_context(|| format!("{arg:?} is not an f64"))?),
        other => bail!("{other:?} parameters cannot be passed from the command line"),
    })
}

fn display_value(value: &Value) -> String {
    match value {
        Value::I32(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::F32(v) => v.to_string(),
        Value::F64(v) => v.to_string(),
        other => format!("{other:?}"),
    }
}
