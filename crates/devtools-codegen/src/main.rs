//! `devtools-gen`: writes typed bindings for a protocol schema file.
//!
//! # Usage
//!
//! ```text
//! devtools-gen --schema browser_protocol.json --out bindings.rs [--runtime-path ::devtools_client]
//! ```
//!
//! The client crate runs the same generator from its build script, so this
//! binary is only needed to inspect the output or to vendor bindings into
//! another crate.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use devtools_codegen::{generate, GeneratorOptions};
use devtools_core::Schema;

/// Generate async Rust bindings from a DevTools protocol schema.
#[derive(Debug, Parser)]
#[command(
    name = "devtools-gen",
    about = "Generate typed DevTools protocol bindings from a schema file",
    version
)]
struct Cli {
    /// Protocol schema (e.g. `browser_protocol.json`).
    #[arg(long, default_value = "browser_protocol.json", env = "DEVTOOLS_SCHEMA")]
    schema: PathBuf,

    /// Destination for the generated Rust source.
    #[arg(long, default_value = "bindings.rs")]
    out: PathBuf,

    /// Module path that exports `Session`, `CallArgs`, and `ClientError`.
    #[arg(long, default_value = "crate")]
    runtime_path: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let schema = Schema::load(&cli.schema)
        .with_context(|| format!("loading schema {}", cli.schema.display()))?;
    let options = GeneratorOptions {
        runtime_path: cli.runtime_path,
    };
    let code = generate(&schema, &options).context("generating bindings")?;

    std::fs::write(&cli.out, &code)
        .with_context(|| format!("writing {}", cli.out.display()))?;

    info!(
        "wrote {} domains (protocol {}) to {}",
        schema.domains.len(),
        schema.version,
        cli.out.display()
    );
    Ok(())
}
