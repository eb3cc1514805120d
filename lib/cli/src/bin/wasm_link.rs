use wasmer_linker_cli::cli::wasm_link_main;

fn main() {
    wasm_link_main();
}
