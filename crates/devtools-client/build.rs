//! Generates `bindings.rs` from the protocol schema.
//!
//! The bundled `protocol/browser_protocol.json` is used unless
//! `DEVTOOLS_PROTOCOL_JSON` points at another schema file (for example the
//! full file shipped with a browser build).

use std::path::PathBuf;

use anyhow::Context;
use devtools_codegen::{generate, GeneratorOptions};
use devtools_core::Schema;

fn main() -> anyhow::Result<()> {
    println!("cargo:rerun-if-env-changed=DEVTOOLS_PROTOCOL_JSON");

    let schema_path = match std::env::var_os("DEVTOOLS_PROTOCOL_JSON") {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?)
            .join("protocol")
            .join("browser_protocol.json"),
    };
    println!("cargo:rerun-if-changed={}", schema_path.display());

    let schema = Schema::load(&schema_path)
        .with_context(|| format!("loading {}", schema_path.display()))?;
    let code = generate(&schema, &GeneratorOptions::default())?;

    let out = PathBuf::from(std::env::var("OUT_DIR")?).join("bindings.rs");
    std::fs::write(&out, code).with_context(|| format!("writing {}", out.display()))?;
    Ok(())
}
